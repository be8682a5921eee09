use serde::{Deserialize, Serialize};

use super::geometry::{Point, Region};
use super::input::InputReplay;

pub type NodeId = i32;
pub type EdgeId = i32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenDimensions {
    pub width: u32,
    pub height: u32,
}

/// Image-match condition evaluated remotely against frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub frame_id: Option<i32>,
    #[serde(default)]
    pub region: Region,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

const fn default_threshold() -> f32 {
    0.9
}

/// One candidate returned by a `sample_condition` query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(default)]
    pub frame_id: Option<i32>,
    pub score: f32,
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub frame_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub replay: Option<InputReplay>,
}

/// The routine graph: screen states and the transitions between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Routine {
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|edge| edge.id == id)
    }
}

/// Remote execution position mirrored locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeContext {
    pub current_node: Option<NodeId>,
    pub current_edge: Option<EdgeId>,
}

impl RuntimeContext {
    /// Applies a position update: the node only moves when one is given,
    /// the edge is always overwritten (absent clears it).
    pub const fn merge(&mut self, node: Option<NodeId>, edge: Option<EdgeId>) {
        if let Some(node) = node {
            self.current_node = Some(node);
        }
        self.current_edge = edge;
    }
}
