use tokio::sync::watch;

use crate::domain::{FrameBlob, Routine, RuntimeContext, ScreenDimensions};

/// State published to observers of the session.
///
/// Each value lives in its own watch channel, so a renderer can subscribe
/// to just what it shows.
#[derive(Debug)]
pub struct SessionState {
    screen: watch::Sender<Option<ScreenDimensions>>,
    frames: watch::Sender<Vec<FrameBlob>>,
    routine: watch::Sender<Routine>,
    runtime: watch::Sender<RuntimeContext>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            screen: watch::channel(None).0,
            frames: watch::channel(Vec::new()).0,
            routine: watch::channel(Routine::default()).0,
            runtime: watch::channel(RuntimeContext::default()).0,
        }
    }
}

impl SessionState {
    #[must_use]
    pub fn screen(&self) -> Option<ScreenDimensions> {
        *self.screen.borrow()
    }

    #[must_use]
    pub fn frames(&self) -> Vec<FrameBlob> {
        self.frames.borrow().clone()
    }

    #[must_use]
    pub fn routine(&self) -> Routine {
        self.routine.borrow().clone()
    }

    #[must_use]
    pub fn runtime(&self) -> RuntimeContext {
        *self.runtime.borrow()
    }

    #[must_use]
    pub fn subscribe_screen(&self) -> watch::Receiver<Option<ScreenDimensions>> {
        self.screen.subscribe()
    }

    #[must_use]
    pub fn subscribe_frames(&self) -> watch::Receiver<Vec<FrameBlob>> {
        self.frames.subscribe()
    }

    #[must_use]
    pub fn subscribe_routine(&self) -> watch::Receiver<Routine> {
        self.routine.subscribe()
    }

    #[must_use]
    pub fn subscribe_runtime(&self) -> watch::Receiver<RuntimeContext> {
        self.runtime.subscribe()
    }

    /// Local edit of the routine graph, e.g. writing a captured replay into
    /// an edge.
    pub fn update_routine<F>(&self, edit: F)
    where
        F: FnOnce(&mut Routine),
    {
        self.routine.send_modify(edit);
    }

    pub(super) fn set_screen(&self, dimensions: ScreenDimensions) {
        self.screen.send_replace(Some(dimensions));
    }

    pub(super) fn set_frames(&self, frames: Vec<FrameBlob>) {
        self.frames.send_replace(frames);
    }

    pub(super) fn set_routine(&self, routine: Routine) {
        self.routine.send_replace(routine);
    }

    pub(super) fn merge_runtime(&self, node: Option<i32>, edge: Option<i32>) {
        self.runtime.send_modify(|context| context.merge(node, edge));
    }
}
