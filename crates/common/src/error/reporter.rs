//! Error reporting side effects.
//!
//! Normalizing a failure is pure; everything observable about it happens
//! here. The reporter keeps a bounded in-memory log of recent errors, fans
//! each one out to registered listeners, pushes a human-readable message to
//! the user notification channel (except for 401s, which the refresh flow
//! resolves silently), and forwards to a crash-reporting sink when one is
//! registered.
//!
//! The reporter is constructed once at the composition root and injected
//! into everything that reports errors; tests substitute recording sinks.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::warn;

use super::{ErrorShape, NormalizedError};

/// Maximum number of errors retained in the in-memory log. Oldest entries
/// are evicted first.
pub const ERROR_LOG_CAPACITY: usize = 100;

/// User-facing notification channel (toast, status line, ...).
pub trait Notifier: Send + Sync {
    /// Surface a human-readable error message to the user.
    fn notify(&self, message: &str);
}

/// Optional crash-reporting / telemetry sink.
pub trait TelemetrySink: Send + Sync {
    /// Forward a normalized error to the external collector.
    fn capture(&self, error: &NormalizedError);
}

/// Listener invoked for every reported error.
pub type ErrorListener = Arc<dyn Fn(&NormalizedError) + Send + Sync>;

/// Identifies the call site a failure is reported from.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Reporting façade, e.g. `"invoicing"`.
    pub service: &'static str,
    /// Operation description, e.g. `"GET invoicing/invoices"`.
    pub operation: String,
}

impl ErrorContext {
    /// Build a context tag for a façade operation.
    pub fn new(service: &'static str, operation: impl Into<String>) -> Self {
        Self { service, operation: operation.into() }
    }
}

/// Central error reporting pipeline.
pub struct ErrorReporter {
    log: Mutex<VecDeque<NormalizedError>>,
    listeners: Mutex<Vec<ErrorListener>>,
    notifier: Option<Arc<dyn Notifier>>,
    telemetry: Mutex<Option<Arc<dyn TelemetrySink>>>,
}

impl ErrorReporter {
    /// Reporter without a notification channel (headless usage).
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: Mutex::new(VecDeque::with_capacity(ERROR_LOG_CAPACITY)),
            listeners: Mutex::new(Vec::new()),
            notifier: None,
            telemetry: Mutex::new(None),
        }
    }

    /// Reporter wired to a user notification channel.
    #[must_use]
    pub fn with_notifier(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier: Some(notifier), ..Self::new() }
    }

    /// Register a crash-reporting sink. Absence of a sink is not an error;
    /// forwarding is best-effort.
    pub fn set_telemetry(&self, sink: Arc<dyn TelemetrySink>) {
        if let Ok(mut slot) = self.telemetry.lock() {
            *slot = Some(sink);
        }
    }

    /// Register a listener invoked for every reported error.
    pub fn add_listener(&self, listener: ErrorListener) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(listener);
        }
    }

    /// Normalize a failure and run the reporting side effects.
    ///
    /// The error is appended to the bounded log, handed to every listener,
    /// surfaced through the notifier unless its status is exactly 401, and
    /// forwarded to telemetry when a sink is registered. Returns the
    /// normalized error so call sites can propagate it with `?`.
    pub fn report(
        &self,
        failure: impl Into<ErrorShape>,
        context: &ErrorContext,
    ) -> NormalizedError {
        let error = failure.into().normalize();

        warn!(
            service = context.service,
            operation = %context.operation,
            status = error.status,
            code = error.code.as_str(),
            request_id = error.request_id.as_deref(),
            "api call failed: {}",
            error.message,
        );

        if let Ok(mut log) = self.log.lock() {
            if log.len() == ERROR_LOG_CAPACITY {
                let _ = log.pop_front();
            }
            log.push_back(error.clone());
        }

        if let Ok(listeners) = self.listeners.lock() {
            for listener in listeners.iter() {
                listener(&error);
            }
        }

        // 401s resolve either transparently (refresh + replay) or via the
        // forced redirect to login; notifying would double-report them.
        if error.status != 401 {
            if let Some(notifier) = &self.notifier {
                notifier.notify(&error.message);
            }
        }

        if let Ok(telemetry) = self.telemetry.lock() {
            if let Some(sink) = telemetry.as_ref() {
                sink.capture(&error);
            }
        }

        error
    }

    /// Snapshot of the retained error log, oldest first.
    #[must_use]
    pub fn recent_errors(&self) -> Vec<NormalizedError> {
        self.log
            .lock()
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop all retained errors.
    pub fn clear_log(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("retained", &self.recent_errors().len())
            .field("notifier", &self.notifier.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::error::NormalizedError;

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    fn context() -> ErrorContext {
        ErrorContext::new("testing", "GET testing/things")
    }

    #[test]
    fn log_is_bounded_to_capacity_oldest_evicted() {
        let reporter = ErrorReporter::new();
        for n in 0..150 {
            let error = NormalizedError::unknown(format!("failure {n}"));
            let _ = reporter.report(error, &context());
        }

        let log = reporter.recent_errors();
        assert_eq!(log.len(), ERROR_LOG_CAPACITY);
        assert_eq!(log[0].message, "failure 50");
        assert_eq!(log[99].message, "failure 149");
    }

    #[test]
    fn notifier_receives_every_error_except_401() {
        let notifier = Arc::new(RecordingNotifier::default());
        let reporter = ErrorReporter::with_notifier(notifier.clone());

        let _ = reporter.report(NormalizedError::from_response(500, None, None), &context());
        let _ = reporter.report(NormalizedError::from_response(401, None, None), &context());
        let _ = reporter.report(NormalizedError::from_response(404, None, None), &context());

        let messages = notifier.messages.lock().unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| !m.contains("Authentication required")));
    }

    #[test]
    fn listeners_observe_reported_errors() {
        let reporter = ErrorReporter::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        reporter.add_listener(Arc::new(move |_| {
            let _ = counter.fetch_add(1, Ordering::SeqCst);
        }));

        let _ = reporter.report(NormalizedError::unknown("one"), &context());
        let _ = reporter.report(NormalizedError::unknown("two"), &context());

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn telemetry_sink_is_optional_and_best_effort() {
        struct CountingSink(AtomicUsize);
        impl TelemetrySink for CountingSink {
            fn capture(&self, _: &NormalizedError) {
                let _ = self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let reporter = ErrorReporter::new();
        // No sink registered: reporting still works.
        let _ = reporter.report(NormalizedError::unknown("no sink"), &context());

        let sink = Arc::new(CountingSink(AtomicUsize::new(0)));
        reporter.set_telemetry(sink.clone());
        let _ = reporter.report(NormalizedError::unknown("with sink"), &context());

        assert_eq!(sink.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn report_returns_the_normalized_error() {
        let reporter = ErrorReporter::new();
        let error = reporter.report("plain string failure", &context());
        assert_eq!(error.message, "plain string failure");
        assert_eq!(error.status, 500);
    }
}
