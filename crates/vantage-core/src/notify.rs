//! Debounced view-change notification.
//!
//! Rapid pan/zoom mutates the view many times per second; the persistence
//! collaborator only needs the value once per quiet period. Shape-position
//! events are never routed through here (the renderer must stay live).

use crate::view::ViewState;
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Default quiet period before a pending change fires.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Coalesces view-state changes onto a short timer.
///
/// Every [`note`](Self::note) overwrites the pending snapshot and resets the
/// timer; [`poll_at`](Self::poll_at) fires at most once per quiet period.
#[derive(Debug, Clone)]
pub struct ViewChangeDebouncer {
    quiet: Duration,
    pending: Option<ViewState>,
    last_change: Option<Instant>,
}

impl Default for ViewChangeDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewChangeDebouncer {
    pub fn new() -> Self {
        Self::with_quiet_period(DEFAULT_QUIET_PERIOD)
    }

    pub fn with_quiet_period(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            last_change: None,
        }
    }

    /// Record a change, resetting the timer.
    pub fn note(&mut self, view: ViewState) {
        self.note_at(view, Instant::now());
    }

    /// [`ViewChangeDebouncer::note`] with an explicit clock.
    pub fn note_at(&mut self, view: ViewState, now: Instant) {
        self.pending = Some(view);
        self.last_change = Some(now);
    }

    /// Whether a change is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Fire the pending change if the quiet period has elapsed.
    pub fn poll(&mut self) -> Option<ViewState> {
        self.poll_at(Instant::now())
    }

    /// [`ViewChangeDebouncer::poll`] with an explicit clock.
    pub fn poll_at(&mut self, now: Instant) -> Option<ViewState> {
        let last = self.last_change?;
        if now.saturating_duration_since(last) >= self.quiet {
            self.last_change = None;
            self.pending.take()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Vec2;

    fn view(x: f64) -> ViewState {
        ViewState {
            offset: Vec2::new(x, 0.0),
            zoom: 1.0,
        }
    }

    #[test]
    fn test_nothing_pending_fires_nothing() {
        let mut debouncer = ViewChangeDebouncer::new();
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll_at(Instant::now()), None);
    }

    #[test]
    fn test_fires_after_quiet_period() {
        let mut debouncer = ViewChangeDebouncer::new();
        let start = Instant::now();
        debouncer.note_at(view(1.0), start);

        assert_eq!(debouncer.poll_at(start + Duration::from_millis(100)), None);
        assert_eq!(
            debouncer.poll_at(start + Duration::from_millis(350)),
            Some(view(1.0))
        );
        // Fired once; nothing remains.
        assert_eq!(debouncer.poll_at(start + Duration::from_millis(999)), None);
    }

    #[test]
    fn test_new_change_resets_timer_and_coalesces() {
        let mut debouncer = ViewChangeDebouncer::new();
        let start = Instant::now();
        debouncer.note_at(view(1.0), start);
        debouncer.note_at(view(2.0), start + Duration::from_millis(250));

        // Quiet period restarts at the second change.
        assert_eq!(debouncer.poll_at(start + Duration::from_millis(400)), None);
        // Only the latest value fires.
        assert_eq!(
            debouncer.poll_at(start + Duration::from_millis(600)),
            Some(view(2.0))
        );
    }
}
