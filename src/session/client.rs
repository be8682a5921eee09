use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::{
    Condition, EdgeId, Frame, FrameBlob, InputEvent, MatchResult, NodeId, Routine,
    ScreenDimensions,
};
use crate::error::{AppError, AppResult, SessionError};

use super::correlation::CorrelationTable;
use super::protocol::{
    ConfigurationMessage, Envelope, FrameOperation, FrameOperationMessage, GotoMessage,
    InputEventMessage, QueueEdgeMessage, RoutineMessage, SampleConditionMessage, SetCurrMessage,
    WireMessage, decode_envelope, probe_kind,
};
use super::state::SessionState;
use super::store::RoutineStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Give up on a correlated query after this long. `None` waits forever.
    pub query_timeout: Option<Duration>,
    /// Limit on the WebSocket handshake. `None` uses
    /// [`DEFAULT_CONNECT_TIMEOUT`](super::DEFAULT_CONNECT_TIMEOUT).
    pub connect_timeout: Option<Duration>,
}

/// Client side of the session protocol.
///
/// Cloning is cheap; all clones share the outbound queue, pending queries
/// and published state.
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    outbound: mpsc::UnboundedSender<Envelope>,
    queries: CorrelationTable<Vec<MatchResult>>,
    state: SessionState,
    store: Arc<dyn RoutineStore>,
    options: SessionOptions,
}

impl fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClient")
            .field("queries", &self.inner.queries)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

impl SessionClient {
    /// Builds a client that writes envelopes into `outbound`. The caller owns
    /// the transport draining it.
    #[must_use]
    pub fn new(
        outbound: mpsc::UnboundedSender<Envelope>,
        store: Arc<dyn RoutineStore>,
        options: SessionOptions,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                outbound,
                queries: CorrelationTable::new(),
                state: SessionState::default(),
                store,
                options,
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.inner.state
    }

    #[must_use]
    pub fn pending_queries(&self) -> usize {
        self.inner.queries.len()
    }

    fn send(&self, envelope: Envelope) -> AppResult<()> {
        let kind = envelope.message.kind();
        self.inner
            .outbound
            .send(envelope)
            .map_err(|_closed| AppError::session(SessionError::OutboundClosed))?;
        debug!("Queued {} envelope", kind);
        Ok(())
    }

    /// Asks the runtime for its screen configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::OutboundClosed`] when the transport is gone.
    pub fn request_configuration(&self) -> AppResult<()> {
        self.send(Envelope::new(WireMessage::Configuration(
            ConfigurationMessage::default(),
        )))
    }

    /// Requests the live frame, or a stored frame when `id` is given.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::OutboundClosed`] when the transport is gone.
    pub fn request_frame(&self, id: Option<i32>) -> AppResult<()> {
        self.send(Envelope::new(WireMessage::FrameOperation(
            FrameOperationMessage {
                operation: FrameOperation::Get,
                frame_id: id,
                frames: Vec::new(),
            },
        )))
    }

    /// Requests every stored frame.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::OutboundClosed`] when the transport is gone.
    pub fn request_frame_batch(&self) -> AppResult<()> {
        self.send(Envelope::new(WireMessage::FrameOperation(
            FrameOperationMessage {
                operation: FrameOperation::BatchGet,
                frame_id: None,
                frames: Vec::new(),
            },
        )))
    }

    /// Asks the runtime to store `frame` durably.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::OutboundClosed`] when the transport is gone.
    pub fn persist_frame(&self, frame: Frame) -> AppResult<()> {
        self.send(Envelope::new(WireMessage::FrameOperation(
            FrameOperationMessage {
                operation: FrameOperation::Save,
                frame_id: frame.id,
                frames: vec![frame],
            },
        )))
    }

    /// Moves the runtime to `node`. Unknown ids are ignored remotely.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::OutboundClosed`] when the transport is gone.
    pub fn goto_node(&self, node: NodeId) -> AppResult<()> {
        self.send(Envelope::new(WireMessage::Goto(GotoMessage { node })))
    }

    /// Queues `edge` for traversal. Unknown ids are ignored remotely.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::OutboundClosed`] when the transport is gone.
    pub fn queue_edge(&self, edge: EdgeId) -> AppResult<()> {
        self.send(Envelope::new(WireMessage::QueueEdge(QueueEdgeMessage {
            edge,
        })))
    }

    /// Relays a locally captured event to the runtime unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::OutboundClosed`] when the transport is gone.
    pub fn forward_input_event(&self, event: InputEvent) -> AppResult<()> {
        self.send(Envelope::new(WireMessage::InputEvent(InputEventMessage {
            event,
        })))
    }

    /// Sends the local routine graph to the runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::OutboundClosed`] when the transport is gone.
    pub fn push_routine(&self, routine: &Routine) -> AppResult<()> {
        self.send(Envelope::new(WireMessage::GetRoutine(Box::new(
            RoutineMessage {
                routine: routine.clone(),
            },
        ))))
    }

    /// Evaluates `condition` remotely and waits for the match candidates.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::OutboundClosed`] when the request cannot be
    /// sent, [`SessionError::QueryTimeout`] when a configured timeout expires
    /// and [`SessionError::QueryAbandoned`] if the pending entry is dropped.
    pub async fn query_condition(&self, condition: Condition) -> AppResult<Vec<MatchResult>> {
        let (id, reply) = self.inner.queries.register();
        let envelope = Envelope::correlated(
            id,
            WireMessage::SampleCondition(Box::new(SampleConditionMessage {
                condition: Some(condition),
                results: Vec::new(),
            })),
        );
        if let Err(err) = self.send(envelope) {
            self.inner.queries.cancel(id);
            return Err(err);
        }

        let outcome = match self.inner.options.query_timeout {
            Some(limit) => match tokio::time::timeout(limit, reply).await {
                Ok(outcome) => outcome,
                Err(_elapsed) => {
                    self.inner.queries.cancel(id);
                    warn!("Condition query {} timed out", id);
                    return Err(AppError::session(SessionError::QueryTimeout {
                        id,
                        timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    }));
                }
            },
            None => reply.await,
        };
        outcome.map_err(|_dropped| AppError::session(SessionError::QueryAbandoned { id }))
    }

    /// Decodes and dispatches one inbound payload. Undecodable payloads are
    /// logged and dropped.
    pub fn handle_payload(&self, payload: &[u8]) {
        match decode_envelope(payload) {
            Ok(envelope) => self.dispatch(envelope),
            Err(err) => match probe_kind(payload) {
                Some(kind) => warn!("Dropping '{}' envelope: {}", kind, err),
                None => warn!("Dropping malformed envelope: {}", err),
            },
        }
    }

    /// Applies one inbound envelope to the published state or a pending query.
    pub fn dispatch(&self, envelope: Envelope) {
        let Envelope { id, message } = envelope;
        match message {
            WireMessage::Configuration(config) => self.apply_configuration(&config),
            WireMessage::FrameOperation(operation) => self.apply_frames(&operation),
            WireMessage::GetRoutine(message) => self.sync_routine(&message.routine),
            WireMessage::SetCurr(SetCurrMessage { node, edge }) => {
                debug!("Runtime position node={:?} edge={:?}", node, edge);
                self.inner.state.merge_runtime(node, edge);
            }
            WireMessage::SampleCondition(reply) => self.resolve_query(id, reply.results),
            message @ (WireMessage::Goto(_)
            | WireMessage::QueueEdge(_)
            | WireMessage::InputEvent(_)) => {
                warn!("Ignoring '{}' envelope from runtime", message.kind());
            }
        }
    }

    fn apply_configuration(&self, config: &ConfigurationMessage) {
        match (config.width, config.height) {
            (Some(width), Some(height)) => {
                info!("Runtime screen is {}x{}", width, height);
                self.inner
                    .state
                    .set_screen(ScreenDimensions { width, height });
            }
            (None, _) | (_, None) => warn!("Configuration reply without dimensions"),
        }
    }

    fn apply_frames(&self, message: &FrameOperationMessage) {
        match message.operation {
            FrameOperation::Get | FrameOperation::BatchGet => {
                let received = message.frames.len();
                let blobs: Vec<FrameBlob> = message
                    .frames
                    .iter()
                    .filter_map(|frame| match frame.to_blob() {
                        Ok(blob) => Some(blob),
                        Err(err) => {
                            warn!("Skipping frame: {}", err);
                            None
                        }
                    })
                    .collect();
                debug!("Publishing {} of {} frames", blobs.len(), received);
                self.inner.state.set_frames(blobs);
            }
            FrameOperation::Save => warn!("Ignoring frame save request from runtime"),
        }
    }

    fn sync_routine(&self, routine: &Routine) {
        info!(
            "Routine sync: {} nodes, {} edges",
            routine.nodes.len(),
            routine.edges.len()
        );
        self.inner.state.set_routine(routine.clone());
        let store = &self.inner.store;
        if let Err(err) = store.save(routine) {
            warn!("Failed to persist synced routine: {}", err);
            return;
        }
        match store.load() {
            Ok(Some(reloaded)) => self.inner.state.set_routine(reloaded),
            Ok(None) => warn!("Routine store was empty right after saving"),
            Err(err) => warn!("Failed to reload synced routine: {}", err),
        }
    }

    fn resolve_query(&self, id: Option<i32>, results: Vec<MatchResult>) {
        let Some(id) = id else {
            warn!("Dropping uncorrelated condition reply");
            return;
        };
        if self.inner.queries.resolve(id, results) {
            debug!("Resolved condition query {}", id);
        } else {
            warn!("Dropping condition reply for unknown query {}", id);
        }
    }
}
