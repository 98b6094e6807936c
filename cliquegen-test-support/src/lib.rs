//! Shared test utilities used across cliquegen crates.

pub mod tracing {
    //! Recording layer for asserting spans and events emitted by a run.
    use std::{
        collections::HashMap,
        fmt,
        sync::{Arc, Mutex, MutexGuard, PoisonError},
    };

    use tracing::{
        Event, Level, Subscriber,
        field::{Field, Visit},
        span::{Attributes, Id, Record},
    };
    use tracing_subscriber::{Layer, layer::Context, prelude::*, registry::LookupSpan};

    /// Layer that keeps closed spans and emitted events in memory.
    ///
    /// Clones share the same storage, so a clone can be installed in a
    /// subscriber while the original is kept for assertions.
    #[derive(Clone, Default)]
    pub struct RecordingLayer {
        spans: Arc<Mutex<Vec<SpanRecord>>>,
        events: Arc<Mutex<Vec<EventRecord>>>,
    }

    /// A span recorded when it closed.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SpanRecord {
        /// Span name from the callsite metadata.
        pub name: String,
        /// Fields recorded at creation or later through `Span::record`.
        pub fields: HashMap<String, String>,
    }

    /// An emitted event.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct EventRecord {
        /// Event level.
        pub level: Level,
        /// Event target, usually the emitting module path.
        pub target: String,
        /// Event fields; the formatted message is stored under `message`.
        pub fields: HashMap<String, String>,
    }

    impl EventRecord {
        /// Returns the formatted message, if any.
        #[must_use]
        pub fn message(&self) -> Option<&str> {
            self.fields.get("message").map(String::as_str)
        }
    }

    impl RecordingLayer {
        /// Runs `f` with a fresh recording subscriber as the thread default.
        ///
        /// Events and spans entered on other threads are only captured when
        /// those threads inherit the dispatcher, so callers that spawn worker
        /// pools should prefer [`capture_global`].
        ///
        /// # Examples
        /// ```
        /// use cliquegen_test_support::tracing::RecordingLayer;
        ///
        /// let (value, layer) = RecordingLayer::capture(|| {
        ///     tracing::info_span!("outer").in_scope(|| tracing::info!("inside"));
        ///     7
        /// });
        /// assert_eq!(value, 7);
        /// assert_eq!(layer.span_names(), vec!["outer".to_owned()]);
        /// assert_eq!(layer.messages(), vec!["inside".to_owned()]);
        /// ```
        pub fn capture<T>(f: impl FnOnce() -> T) -> (T, Self) {
            let layer = Self::default();
            let subscriber = tracing_subscriber::registry().with(layer.clone());
            let value = tracing::subscriber::with_default(subscriber, f);
            (value, layer)
        }

        /// Returns the closed spans in completion order.
        #[must_use]
        pub fn spans(&self) -> Vec<SpanRecord> {
            lock(&self.spans).clone()
        }

        /// Returns the emitted events in emission order.
        #[must_use]
        pub fn events(&self) -> Vec<EventRecord> {
            lock(&self.events).clone()
        }

        /// Returns the names of the closed spans in completion order.
        #[must_use]
        pub fn span_names(&self) -> Vec<String> {
            lock(&self.spans).iter().map(|span| span.name.clone()).collect()
        }

        /// Returns the first closed span called `name`.
        #[must_use]
        pub fn span_named(&self, name: &str) -> Option<SpanRecord> {
            lock(&self.spans).iter().find(|span| span.name == name).cloned()
        }

        /// Returns the messages of all events in emission order.
        #[must_use]
        pub fn messages(&self) -> Vec<String> {
            lock(&self.events)
                .iter()
                .filter_map(|event| event.message().map(str::to_owned))
                .collect()
        }

        /// Returns the events emitted at `level`.
        #[must_use]
        pub fn events_at(&self, level: Level) -> Vec<EventRecord> {
            lock(&self.events)
                .iter()
                .filter(|event| event.level == level)
                .cloned()
                .collect()
        }
    }

    /// Variant of [`RecordingLayer::capture`] for code that logs from worker
    /// threads. Installs the subscriber globally the first time it is called;
    /// later calls share that subscriber, so assertions should look for
    /// records rather than count them.
    ///
    /// # Examples
    /// ```
    /// use cliquegen_test_support::tracing::capture_global;
    ///
    /// let layer = capture_global();
    /// std::thread::spawn(|| tracing::warn!("from a worker"))
    ///     .join()
    ///     .expect("thread must not panic");
    /// assert!(layer.messages().iter().any(|m| m == "from a worker"));
    /// ```
    #[must_use]
    pub fn capture_global() -> RecordingLayer {
        static GLOBAL: std::sync::OnceLock<RecordingLayer> = std::sync::OnceLock::new();
        GLOBAL
            .get_or_init(|| {
                let layer = RecordingLayer::default();
                let subscriber = tracing_subscriber::registry().with(layer.clone());
                // Another subscriber may already be global; records then go there.
                let _installed = tracing::subscriber::set_global_default(subscriber).is_ok();
                layer
            })
            .clone()
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }

    struct OpenSpan {
        name: &'static str,
        fields: HashMap<String, String>,
    }

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut open = OpenSpan {
                name: attrs.metadata().name(),
                fields: HashMap::new(),
            };
            attrs.record(&mut FieldRecorder(&mut open.fields));
            span.extensions_mut().insert(open);
        }

        fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            if let Some(open) = span.extensions_mut().get_mut::<OpenSpan>() {
                values.record(&mut FieldRecorder(&mut open.fields));
            }
        }

        fn on_close(&self, id: Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(&id) else {
                return;
            };
            let Some(open) = span.extensions_mut().remove::<OpenSpan>() else {
                return;
            };
            lock(&self.spans).push(SpanRecord {
                name: open.name.to_owned(),
                fields: open.fields,
            });
        }

        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut FieldRecorder(&mut fields));
            lock(&self.events).push(EventRecord {
                level: *event.metadata().level(),
                target: event.metadata().target().to_owned(),
                fields,
            });
        }
    }

    /// Integers, floats and booleans reach `record_debug` through the default
    /// `Visit` methods and render the same as `Display`.
    struct FieldRecorder<'a>(&'a mut HashMap<String, String>);

    impl Visit for FieldRecorder<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_owned(), value.to_owned());
        }

        fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
            self.0.insert(field.name().to_owned(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_owned(), format!("{value:?}"));
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        use rstest::rstest;

        #[test]
        fn span_fields_include_late_records() {
            let ((), layer) = RecordingLayer::capture(|| {
                let span = tracing::info_span!("job", edges = tracing::field::Empty, kind = "clique");
                span.record("edges", 12_u64);
            });
            let span = layer.span_named("job").expect("span must be recorded");
            assert_eq!(span.fields.get("edges").map(String::as_str), Some("12"));
            assert_eq!(span.fields.get("kind").map(String::as_str), Some("clique"));
        }

        #[rstest]
        #[case(Level::INFO, 1)]
        #[case(Level::WARN, 2)]
        #[case(Level::ERROR, 0)]
        fn events_can_be_filtered_by_level(#[case] level: Level, #[case] expected: usize) {
            let ((), layer) = RecordingLayer::capture(|| {
                tracing::info!(count = 3_u64, "done");
                tracing::warn!("first");
                tracing::warn!(flag = true, "second");
            });
            assert_eq!(layer.events_at(level).len(), expected);
        }

        #[test]
        fn event_fields_render_like_display() {
            let ((), layer) = RecordingLayer::capture(|| {
                tracing::info!(count = 3_u64, ratio = 0.5_f64, ok = true, "done");
            });
            let event = layer.events().pop().expect("event must be recorded");
            assert_eq!(event.message(), Some("done"));
            assert_eq!(event.fields.get("count").map(String::as_str), Some("3"));
            assert_eq!(event.fields.get("ratio").map(String::as_str), Some("0.5"));
            assert_eq!(event.fields.get("ok").map(String::as_str), Some("true"));
        }
    }
}

pub mod ci;
