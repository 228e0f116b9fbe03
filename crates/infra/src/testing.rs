//! Recording test doubles for the injected boundaries.
//!
//! These mirror the production traits with observable state so tests can
//! assert on side effects (navigation, notifications, telemetry) without
//! a UI shell. They live in the library rather than behind `cfg(test)` so
//! downstream crates can use them in their own suites.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use ledgerline_common::error::{NormalizedError, Notifier, TelemetrySink};

use crate::http::Navigator;

/// Navigator that counts redirects instead of navigating.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    /// Number of login redirects performed so far.
    #[must_use]
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self) {
        let _ = self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

/// Notifier that records messages instead of displaying them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    /// Snapshot of the notified messages, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

/// Telemetry sink that keeps captured errors in memory.
#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    captured: Mutex<Vec<NormalizedError>>,
}

impl RecordingTelemetry {
    /// Snapshot of the captured errors, in order.
    #[must_use]
    pub fn captured(&self) -> Vec<NormalizedError> {
        self.captured.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn capture(&self, error: &NormalizedError) {
        if let Ok(mut captured) = self.captured.lock() {
            captured.push(error.clone());
        }
    }
}
