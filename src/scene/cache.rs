//! Single-entry memoization of the collected pose scene for the
//! interactive viewport draw loop.

use std::rc::Rc;

use log::debug;

use super::collect::{collect, PoseScene};
use super::source::{FrameSink, SceneId, SceneSource, ViewLayerId};

/// Memoizes the most recent [`PoseScene`] keyed by
/// `(scene, view layer)`.
///
/// At most one entry is live at a time: switching scene or view layer
/// replaces it. The cache is an owned component (no module globals) so
/// hosts and tests can inject fake scene sources; the host's
/// change-notification callback must refresh with `force = true` after
/// any scene-graph mutation — staleness beyond one notification is a
/// correctness bug, not acceptable cache lag.
#[derive(Default)]
pub struct ViewportCache {
    key: Option<(SceneId, ViewLayerId)>,
    scene: Option<Rc<PoseScene>>,
}

impl ViewportCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached scene, or recollect.
    ///
    /// A cache hit (same key, `force == false`) returns the stored
    /// `Rc` without recollecting. Any refresh stores the new scene and
    /// asks `sink` to redraw the visible 3D viewports.
    pub fn get_or_refresh(
        &mut self,
        source: &dyn SceneSource,
        scene: SceneId,
        view_layer: ViewLayerId,
        force: bool,
        sink: &dyn FrameSink,
    ) -> Rc<PoseScene> {
        if !force && self.key == Some((scene, view_layer)) {
            if let Some(cached) = &self.scene {
                return Rc::clone(cached);
            }
        }

        debug!(
            "refreshing viewport pose scene (scene {:?}, layer {:?}, force {force})",
            scene, view_layer
        );
        let collected = Rc::new(collect(source, scene, view_layer));
        self.key = Some((scene, view_layer));
        self.scene = Some(Rc::clone(&collected));
        sink.request_redraw();
        collected
    }

    /// Drop the cached entry; the next get recollects.
    pub fn invalidate(&mut self) {
        self.key = None;
        self.scene = None;
    }

    /// The currently cached scene, if any.
    #[must_use]
    pub fn cached(&self) -> Option<&Rc<PoseScene>> {
        self.scene.as_ref()
    }
}
