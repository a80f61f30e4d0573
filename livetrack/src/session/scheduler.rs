//! Per-session tick loop.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::StreamConfig;
use super::error::{InputError, SessionError, SessionId};
use super::message::{truncate_for_log, ErrorMessage, TickMessage};
use super::request::SessionRequest;
use super::state::{SessionClock, SessionState};
use super::transport::Transport;
use crate::object::{format_timestamp, ObjectNormalizer, SourcedRow, TrackedObject};
use crate::orchestrator::QueryOrchestrator;
use crate::store::EventStore;
use crate::tracker::StateTracker;

/// Shortest tick period accepted; zero would spin.
const MIN_SEND_PERIOD: Duration = Duration::from_millis(1);

/// Process-wide pieces every session shares.
#[derive(Clone)]
pub struct SessionContext {
    pub config: Arc<StreamConfig>,
    pub orchestrator: Arc<QueryOrchestrator>,
}

impl SessionContext {
    pub fn new(config: StreamConfig, store: Arc<dyn EventStore>) -> Self {
        let orchestrator = QueryOrchestrator::new(store, config.sources.clone());
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
        }
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for a valid open request.
    Starting,
    /// Ticking.
    Running,
    /// Terminal.
    Closed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Starting => "starting",
            SessionPhase::Running => "running",
            SessionPhase::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Outcome of a session that ended by cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: SessionId,
    pub ticks_sent: u64,
}

/// Drives one client session from open request to close.
///
/// Ticks run one at a time on the task that calls [`run`](Self::run): the
/// next tick cannot start before the previous one has been sent, and a tick
/// that overruns the period makes the interval skip instead of bursting.
pub struct SessionScheduler {
    id: SessionId,
    context: SessionContext,
    normalizer: ObjectNormalizer,
    tracker: StateTracker,
    transport: Arc<dyn Transport>,
    cancellation: CancellationToken,
    phase: SessionPhase,
}

impl SessionScheduler {
    pub fn new(context: SessionContext, transport: Arc<dyn Transport>) -> Self {
        Self::with_cancellation(context, transport, CancellationToken::new())
    }

    /// Create a scheduler that also stops when `cancellation` fires.
    pub fn with_cancellation(
        context: SessionContext,
        transport: Arc<dyn Transport>,
        cancellation: CancellationToken,
    ) -> Self {
        let normalizer = ObjectNormalizer::new(context.config.transform());
        let tracker = StateTracker::new(context.config.removal_period);
        Self {
            id: SessionId::next(),
            context,
            normalizer,
            tracker,
            transport,
            cancellation,
            phase: SessionPhase::Starting,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Token that closes this session when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Validate the open request and tick until cancelled or failed.
    ///
    /// An invalid request is answered with a single error message and no
    /// ticks. Store and transport failures end the session; nothing is
    /// retried.
    pub async fn run(&mut self, request_text: &str) -> Result<SessionSummary, SessionError> {
        let request = match SessionRequest::parse(request_text) {
            Ok(request) => request,
            Err(source) => {
                warn!(session = %self.id, error = %source, "Rejecting session request");
                self.reject(&source).await;
                self.close();
                return Err(SessionError::Input {
                    session: self.id,
                    source,
                });
            }
        };

        info!(
            session = %self.id,
            facility = %request.facility_id,
            level = %request.level_id,
            start = %format_timestamp(&request.start),
            "Session started"
        );
        self.transition(SessionPhase::Running);

        let period = self.context.config.send_period.max(MIN_SEND_PERIOD);
        let clock = SessionClock::new(request.start);
        let mut state = SessionState::new(request, period);
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks_sent = 0u64;

        loop {
            tokio::select! {
                biased;

                _ = self.cancellation.cancelled() => {
                    debug!(session = %self.id, "Session cancelled");
                    break;
                }

                _ = interval.tick() => {}
            }

            if let Err(e) = self.tick(&mut state).await {
                self.log_failure(&e);
                self.close();
                return Err(e);
            }
            ticks_sent += 1;
            state.advance(clock.now());
        }

        self.close();
        info!(session = %self.id, ticks = ticks_sent, "Session closed");
        Ok(SessionSummary {
            id: self.id,
            ticks_sent,
        })
    }

    /// Query, normalize, track, encode and send one tick.
    async fn tick(&self, state: &mut SessionState) -> Result<(), SessionError> {
        let tick = state.window().end;
        let rows = self
            .context
            .orchestrator
            .fetch(&state.fetch_request())
            .await
            .map_err(|source| SessionError::Store {
                session: self.id,
                tick,
                source,
            })?;

        let objects = self.normalize(&rows, &state.request);
        let tracked = self.tracker.track(&mut state.history, objects, tick);
        let count = tracked.objects.len();

        let payload = TickMessage::new(tick, &state.request.level_id, tracked.objects)
            .encode()
            .map_err(|source| SessionError::Encode {
                session: self.id,
                tick,
                source,
            })?;
        let snapshot =
            truncate_for_log(&payload, self.context.config.log_payload_limit).into_owned();
        debug!(session = %self.id, payload = %snapshot, "Tick payload");

        self.transport
            .send(payload)
            .await
            .map_err(|source| SessionError::Transport {
                session: self.id,
                tick,
                snapshot,
                source,
            })?;

        info!(
            session = %self.id,
            tick = %format_timestamp(&tick),
            rows = rows.len(),
            objects = count,
            retired = tracked.retired,
            "Tick sent"
        );
        Ok(())
    }

    /// Rows that cannot be normalized are dropped.
    fn normalize(&self, rows: &[SourcedRow], request: &SessionRequest) -> Vec<TrackedObject> {
        rows.iter()
            .filter_map(|sourced| {
                match self
                    .normalizer
                    .normalize(sourced, &request.facility_id, &request.level_id)
                {
                    Ok(object) => Some(object),
                    Err(e) => {
                        warn!(
                            session = %self.id,
                            source = %sourced.source,
                            error = %e,
                            "Dropping row"
                        );
                        None
                    }
                }
            })
            .collect()
    }

    async fn reject(&self, reason: &InputError) {
        let payload = match ErrorMessage::new(reason.to_string()).encode() {
            Ok(payload) => payload,
            Err(e) => {
                error!(session = %self.id, error = %e, "Failed to encode error reply");
                return;
            }
        };
        if let Err(e) = self.transport.send(payload).await {
            warn!(session = %self.id, error = %e, "Failed to send error reply");
        }
    }

    fn log_failure(&self, err: &SessionError) {
        match err {
            SessionError::Transport { snapshot, .. } => {
                error!(session = %self.id, error = %err, payload = %snapshot, "Session failed");
            }
            _ => error!(session = %self.id, error = %err, "Session failed"),
        }
    }

    fn transition(&mut self, next: SessionPhase) {
        debug!(session = %self.id, from = %self.phase, to = %next, "Session phase");
        self.phase = next;
    }

    /// Enter the terminal phase and cancel the token, once.
    fn close(&mut self) {
        if self.phase != SessionPhase::Closed {
            self.transition(SessionPhase::Closed);
            self.cancellation.cancel();
        }
    }
}
