//! Property specifications for vertices and edges.
//!
//! A property is either absent, drawn uniformly from `[min, max)`, or looked
//! up from an explicit value list. List lookups are addressed by vertex id for
//! vertices and by `from * n + to` for edges, so list lengths are validated
//! against the largest index a run can address before anything is produced.

use std::{fmt, sync::Arc};

use rand::Rng;

use crate::{
    Result,
    document::{PropertyValue, VertexId},
    error::GeneratorError,
};

/// What a [`PropertySpec`] decorates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyTarget {
    /// Vertex documents.
    Vertex,
    /// Edge documents.
    Edge,
}

impl fmt::Display for PropertyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Edge => "edge",
        })
    }
}

/// How property values are attached to generated documents.
///
/// # Examples
/// ```
/// use cliquegen_core::PropertySpec;
///
/// let spec = PropertySpec::list(["a", "b", "c"]);
/// assert!(matches!(spec, PropertySpec::List(ref values) if values.len() == 3));
/// assert_eq!(PropertySpec::default(), PropertySpec::None);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PropertySpec {
    /// No property is attached.
    #[default]
    None,
    /// A fresh value is drawn uniformly from `[min, max)` per document.
    Random {
        /// Inclusive lower bound.
        min: f64,
        /// Exclusive upper bound.
        max: f64,
    },
    /// Values are looked up from an explicit list.
    List(Arc<[String]>),
}

impl PropertySpec {
    /// Builds a list property from any iterator of string-like values.
    #[must_use]
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// Checks random bounds.
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidRandomBounds`] when either bound is not
    /// finite or `min > max`.
    pub fn validate_bounds(&self, target: PropertyTarget) -> Result<()> {
        if let Self::Random { min, max } = *self {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(GeneratorError::InvalidRandomBounds { target, min, max });
            }
        }
        Ok(())
    }

    /// Checks that a list property can address `required` entities.
    ///
    /// # Errors
    /// Returns [`GeneratorError::PropertyListTooShort`] when the list holds
    /// fewer than `required` values.
    ///
    /// # Examples
    /// ```
    /// use cliquegen_core::{GeneratorError, PropertySpec, PropertyTarget};
    ///
    /// let spec = PropertySpec::list(["1", "2", "3"]);
    /// let err = spec.require_len(PropertyTarget::Edge, 25).unwrap_err();
    /// assert!(matches!(err, GeneratorError::PropertyListTooShort { required: 25, actual: 3, .. }));
    /// ```
    pub fn require_len(&self, target: PropertyTarget, required: u128) -> Result<()> {
        match self {
            Self::List(values) if (values.len() as u128) < required => {
                Err(GeneratorError::PropertyListTooShort {
                    target,
                    required,
                    actual: values.len(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Produces the value for the entity at `index`.
    ///
    /// List lookups beyond the list yield `None`; callers validate lengths up
    /// front with [`Self::require_len`].
    pub fn value_at<R: Rng>(&self, index: u128, rng: &mut R) -> Option<PropertyValue> {
        match self {
            Self::None => None,
            Self::Random { min, max } => Some(PropertyValue::Number(draw_uniform(*min, *max, rng))),
            Self::List(values) => usize::try_from(index)
                .ok()
                .and_then(|idx| values.get(idx))
                .map(|value| PropertyValue::Text(value.clone())),
        }
    }

    /// Produces the value for vertex `id`.
    pub fn vertex_value<R: Rng>(&self, id: VertexId, rng: &mut R) -> Option<PropertyValue> {
        self.value_at(u128::from(id), rng)
    }

    /// Produces the value for the edge `from -> to` in a graph of `n` vertices.
    pub fn edge_value<R: Rng>(
        &self,
        from: VertexId,
        to: VertexId,
        n: u64,
        rng: &mut R,
    ) -> Option<PropertyValue> {
        self.value_at(edge_index(from, to, n), rng)
    }
}

/// Linear list index of the edge `from -> to` for `n` vertices.
#[must_use]
pub const fn edge_index(from: VertexId, to: VertexId, n: u64) -> u128 {
    (from as u128) * (n as u128) + (to as u128)
}

fn draw_uniform<R: Rng>(min: f64, max: f64, rng: &mut R) -> f64 {
    if min < max { rng.gen_range(min..max) } else { min }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{SeedableRng, rngs::SmallRng};
    use rstest::rstest;

    #[rstest]
    #[case(f64::NAN, 1.0)]
    #[case(0.0, f64::INFINITY)]
    #[case(2.0, 1.0)]
    fn validate_bounds_rejects_bad_ranges(#[case] min: f64, #[case] max: f64) {
        let err = PropertySpec::Random { min, max }
            .validate_bounds(PropertyTarget::Vertex)
            .expect_err("bounds must be rejected");
        assert!(matches!(err, GeneratorError::InvalidRandomBounds { .. }));
    }

    #[test]
    fn degenerate_random_range_yields_the_bound() {
        let mut rng = SmallRng::seed_from_u64(3);
        let spec = PropertySpec::Random { min: 4.0, max: 4.0 };
        assert_eq!(spec.value_at(0, &mut rng), Some(PropertyValue::Number(4.0)));
    }

    #[test]
    fn random_values_stay_in_range() {
        let mut rng = SmallRng::seed_from_u64(11);
        let spec = PropertySpec::Random { min: -1.0, max: 2.0 };
        for index in 0..500 {
            match spec.value_at(index, &mut rng) {
                Some(PropertyValue::Number(value)) => assert!((-1.0..2.0).contains(&value)),
                other => panic!("unexpected value: {other:?}"),
            }
        }
    }

    #[test]
    fn list_values_are_addressed_by_edge_index() {
        let mut rng = SmallRng::seed_from_u64(0);
        let spec = PropertySpec::list((0..9).map(|v| v.to_string()));
        assert_eq!(
            spec.edge_value(1, 2, 3, &mut rng),
            Some(PropertyValue::Text("5".to_owned()))
        );
        assert_eq!(spec.edge_value(3, 0, 3, &mut rng), None);
    }

    #[rstest]
    #[case(25, true)]
    #[case(3, false)]
    fn require_len_compares_against_list_length(#[case] required: u128, #[case] fails: bool) {
        let spec = PropertySpec::list(["a", "b", "c"]);
        assert_eq!(spec.require_len(PropertyTarget::Edge, required).is_err(), fails);
        assert!(PropertySpec::None.require_len(PropertyTarget::Edge, required).is_ok());
    }
}
