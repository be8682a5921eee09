use serde::{Deserialize, Serialize};

use crate::domain::{Condition, EdgeId, Frame, InputEvent, MatchResult, NodeId, Routine};

/// One message on the wire, optionally tagged with a correlation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub message: WireMessage,
}

impl Envelope {
    #[must_use]
    pub const fn new(message: WireMessage) -> Self {
        Self { id: None, message }
    }

    #[must_use]
    pub const fn correlated(id: i32, message: WireMessage) -> Self {
        Self {
            id: Some(id),
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireMessage {
    Configuration(ConfigurationMessage),
    FrameOperation(FrameOperationMessage),
    GetRoutine(Box<RoutineMessage>),
    SetCurr(SetCurrMessage),
    Goto(GotoMessage),
    QueueEdge(QueueEdgeMessage),
    InputEvent(InputEventMessage),
    SampleCondition(Box<SampleConditionMessage>),
}

impl WireMessage {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            WireMessage::Configuration(_) => "configuration",
            WireMessage::FrameOperation(_) => "frame_operation",
            WireMessage::GetRoutine(_) => "get_routine",
            WireMessage::SetCurr(_) => "set_curr",
            WireMessage::Goto(_) => "goto",
            WireMessage::QueueEdge(_) => "queue_edge",
            WireMessage::InputEvent(_) => "input_event",
            WireMessage::SampleCondition(_) => "sample_condition",
        }
    }
}

/// Empty on request; the runtime answers with its screen size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrameOperation {
    Get,
    BatchGet,
    Save,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameOperationMessage {
    pub operation: FrameOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<Frame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineMessage {
    pub routine: Routine,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCurrMessage {
    #[serde(default)]
    pub node: Option<NodeId>,
    #[serde(default)]
    pub edge: Option<EdgeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GotoMessage {
    pub node: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEdgeMessage {
    pub edge: EdgeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEventMessage {
    pub event: InputEvent,
}

/// Carries a condition on request and the match candidates on reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleConditionMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<MatchResult>,
}
