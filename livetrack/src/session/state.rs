//! Per-session mutable state.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::request::SessionRequest;
use crate::orchestrator::{FetchRequest, ParkingPhase, TimeWindow};
use crate::tracker::ObjectHistory;

/// State owned by one session task.
#[derive(Debug)]
pub struct SessionState {
    pub request: SessionRequest,
    pub history: ObjectHistory,
    previous_end: DateTime<Utc>,
    current_end: DateTime<Utc>,
    parking: ParkingPhase,
}

impl SessionState {
    /// Initial state: the first window is `(start - period, start]`.
    pub fn new(request: SessionRequest, period: Duration) -> Self {
        let period =
            chrono::Duration::from_std(period).unwrap_or_else(|_| chrono::Duration::zero());
        let start = request.start;
        Self {
            request,
            history: ObjectHistory::new(),
            previous_end: start - period,
            current_end: start,
            parking: ParkingPhase::Prime,
        }
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.previous_end, self.current_end)
    }

    pub fn parking_phase(&self) -> ParkingPhase {
        self.parking
    }

    pub fn fetch_request(&self) -> FetchRequest<'_> {
        FetchRequest {
            facility_id: &self.request.facility_id,
            level_id: &self.request.level_id,
            window: self.window(),
            session_start: self.request.start,
            parking: self.parking,
        }
    }

    /// Slide the window after a delivered tick.
    ///
    /// The window end never moves backwards.
    pub fn advance(&mut self, next_end: DateTime<Utc>) {
        self.previous_end = self.current_end;
        self.current_end = next_end.max(self.current_end);
        self.parking = ParkingPhase::Delta;
    }
}

/// Maps monotonic elapsed time onto the session's logical timeline.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    start: DateTime<Utc>,
    opened: tokio::time::Instant,
}

impl SessionClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            start,
            opened: tokio::time::Instant::now(),
        }
    }

    /// `start` plus the time elapsed since the session opened.
    pub fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.opened.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.start + elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request() -> SessionRequest {
        SessionRequest::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            "garage1",
            "L1",
        )
    }

    #[test]
    fn test_first_window_ends_at_start() {
        let state = SessionState::new(request(), Duration::from_secs(1));
        let window = state.window();
        assert_eq!(window.end, request().start);
        assert_eq!(window.duration(), chrono::Duration::seconds(1));
        assert_eq!(state.parking_phase(), ParkingPhase::Prime);
    }

    #[test]
    fn test_advance_slides_window() {
        let mut state = SessionState::new(request(), Duration::from_secs(1));
        let next = request().start + chrono::Duration::milliseconds(1005);
        state.advance(next);

        assert_eq!(state.window().start, request().start);
        assert_eq!(state.window().end, next);
        assert_eq!(state.parking_phase(), ParkingPhase::Delta);
    }

    #[test]
    fn test_advance_never_moves_backwards() {
        let mut state = SessionState::new(request(), Duration::from_secs(1));
        state.advance(request().start - chrono::Duration::seconds(10));
        assert_eq!(state.window().end, request().start);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_follows_elapsed_time() {
        let clock = SessionClock::new(request().start);
        tokio::time::advance(Duration::from_millis(1500)).await;
        assert_eq!(clock.now(), request().start + chrono::Duration::milliseconds(1500));
    }
}
