//! Property-test run profile read from the environment.
//!
//! CI raises case counts for nightly runs and can fork each case into its own
//! process; local runs keep the per-suite defaults.

use std::env;

/// Environment variable overriding proptest case counts.
pub const CASES_ENV_KEY: &str = "CLIQUEGEN_PROPTEST_CASES";
/// Environment variable enabling forked proptest cases.
pub const FORK_ENV_KEY: &str = "CLIQUEGEN_PBT_FORK";

/// Runtime profile for property-test execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Loads the profile, falling back to the given defaults for missing or
    /// malformed overrides.
    ///
    /// # Examples
    /// ```
    /// use cliquegen_test_support::ci::property_test_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(64, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self {
            cases: override_or(CASES_ENV_KEY, default_cases, parse_cases),
            fork: override_or(FORK_ENV_KEY, default_fork, parse_flag),
        }
    }

    /// Number of cases to run per property.
    #[must_use]
    pub const fn cases(&self) -> u32 {
        self.cases
    }

    /// Whether each case runs in a forked subprocess.
    #[must_use]
    pub const fn fork(&self) -> bool {
        self.fork
    }
}

fn override_or<T: Copy>(key: &'static str, default: T, parse: fn(&str) -> Option<T>) -> T {
    let Ok(raw) = env::var(key) else {
        return default;
    };
    parse(raw.trim()).unwrap_or_else(|| {
        tracing::warn!(env = key, raw = %raw, "ignoring malformed property-test override");
        default
    })
}

fn parse_cases(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|cases| *cases > 0)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
