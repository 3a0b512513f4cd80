//! Host-facing scene oracle.
//!
//! The host application owns scenes; NavDeck only ever sees opaque ids plus
//! the few per-scene facts the navigation strip needs. [`SceneDirectory`] is
//! the seam: the core treats it as a volatile external oracle and never caches
//! what it returns.

/// A user currently viewing a scene, as shown on navigation badges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Viewer {
    /// First letter of the user's name.
    pub letter: char,
    /// The user's display color (hex).
    pub color: String,
}

/// The host's view of the current scene set.
///
/// `scene_ids` is the source of truth for what exists right now; the
/// remaining methods are pass-through host policy (visibility, activity,
/// privilege) that the core consumes without re-deriving.
pub trait SceneDirectory: Send + Sync {
    /// Current live scene ids, in navigation order.
    fn scene_ids(&self) -> Vec<String>;

    /// Display name for a scene, `None` when the id is unknown to the host.
    fn scene_name(&self, scene_id: &str) -> Option<String>;

    /// Whether the calling user may manage presets (GM-equivalent).
    fn is_privileged(&self) -> bool;

    /// Host visibility predicate used only when filtering the preset list
    /// for non-privileged callers.
    fn is_scene_visible(&self, scene_id: &str) -> bool;

    /// Whether the host currently has this scene active.
    fn is_scene_active(&self, scene_id: &str) -> bool;

    /// Users currently viewing the scene.
    fn viewers(&self, _scene_id: &str) -> Vec<Viewer> {
        Vec::new()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use fixture::FixedDirectory;

#[cfg(any(test, feature = "test-helpers"))]
mod fixture {
    use super::*;

    #[derive(Clone, Debug)]
    struct FixedScene {
        id: String,
        name: String,
        visible: bool,
        active: bool,
        viewers: Vec<Viewer>,
    }

    /// In-memory [`SceneDirectory`] for tests.
    ///
    /// Builder-style: start from [`privileged`](Self::privileged) or
    /// [`player`](Self::player) and chain `with_*` calls.
    #[derive(Clone, Debug, Default)]
    pub struct FixedDirectory {
        scenes: Vec<FixedScene>,
        privileged: bool,
    }

    impl FixedDirectory {
        /// Directory whose caller may manage presets.
        #[must_use]
        pub fn privileged() -> Self {
            Self {
                scenes: Vec::new(),
                privileged: true,
            }
        }

        /// Directory for a non-privileged player.
        #[must_use]
        pub fn player() -> Self {
            Self::default()
        }

        /// Add a visible scene named after its id.
        #[must_use]
        pub fn with_scene(mut self, id: &str) -> Self {
            self.scenes.push(FixedScene {
                id: id.to_owned(),
                name: id.to_owned(),
                visible: true,
                active: false,
                viewers: Vec::new(),
            });
            self
        }

        /// Add a visible scene with an explicit display name.
        #[must_use]
        pub fn with_named_scene(mut self, id: &str, name: &str) -> Self {
            self.scenes.push(FixedScene {
                id: id.to_owned(),
                name: name.to_owned(),
                visible: true,
                active: false,
                viewers: Vec::new(),
            });
            self
        }

        /// Add a scene the host visibility predicate rejects.
        #[must_use]
        pub fn with_hidden_scene(mut self, id: &str) -> Self {
            self.scenes.push(FixedScene {
                id: id.to_owned(),
                name: id.to_owned(),
                visible: false,
                active: false,
                viewers: Vec::new(),
            });
            self
        }

        /// Mark a previously added scene as host-active.
        #[must_use]
        pub fn with_active(mut self, id: &str) -> Self {
            if let Some(scene) = self.scenes.iter_mut().find(|s| s.id == id) {
                scene.active = true;
            }
            self
        }

        /// Attach a viewer badge to a previously added scene.
        #[must_use]
        pub fn with_viewer(mut self, id: &str, letter: char, color: &str) -> Self {
            if let Some(scene) = self.scenes.iter_mut().find(|s| s.id == id) {
                scene.viewers.push(Viewer {
                    letter,
                    color: color.to_owned(),
                });
            }
            self
        }
    }

    impl SceneDirectory for FixedDirectory {
        fn scene_ids(&self) -> Vec<String> {
            self.scenes.iter().map(|s| s.id.clone()).collect()
        }

        fn scene_name(&self, scene_id: &str) -> Option<String> {
            self.scenes
                .iter()
                .find(|s| s.id == scene_id)
                .map(|s| s.name.clone())
        }

        fn is_privileged(&self) -> bool {
            self.privileged
        }

        fn is_scene_visible(&self, scene_id: &str) -> bool {
            self.scenes
                .iter()
                .find(|s| s.id == scene_id)
                .is_some_and(|s| s.visible)
        }

        fn is_scene_active(&self, scene_id: &str) -> bool {
            self.scenes
                .iter()
                .find(|s| s.id == scene_id)
                .is_some_and(|s| s.active)
        }

        fn viewers(&self, scene_id: &str) -> Vec<Viewer> {
            self.scenes
                .iter()
                .find(|s| s.id == scene_id)
                .map(|s| s.viewers.clone())
                .unwrap_or_default()
        }
    }
}
