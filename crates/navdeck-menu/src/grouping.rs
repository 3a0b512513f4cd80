//! Scene grouping for the preset edit dialog.
//!
//! The dialog shows every scene currently in the navigation strip, split into
//! scenes already claimed by a non-default preset and scenes still sitting in
//! (or destined for) the default bucket.

use navdeck_core::preset::PresetCollection;
use navdeck_core::SceneDirectory;

/// A scene as the edit dialog lists it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneRef {
    /// Opaque scene id.
    pub id: String,
    /// Display name; falls back to the id when the host has no name for it.
    pub name: String,
}

/// Live scenes split by assignment status, alpha-sorted by display name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupedScenes {
    /// Scenes owned by some non-default preset.
    pub assigned: Vec<SceneRef>,
    /// Scenes owned by the default preset or by nobody yet.
    pub unassigned: Vec<SceneRef>,
}

impl GroupedScenes {
    /// Group the live scene set against the collection's assignments.
    #[must_use]
    pub fn build(collection: &PresetCollection, directory: &dyn SceneDirectory) -> Self {
        let mut assigned = Vec::new();
        let mut unassigned = Vec::new();

        for scene_id in directory.scene_ids() {
            let scene = SceneRef {
                name: directory.scene_name(&scene_id).unwrap_or_else(|| scene_id.clone()),
                id: scene_id,
            };
            let claimed = collection
                .owner_of(&scene.id)
                .is_some_and(|owner| !owner.is_default());
            if claimed {
                assigned.push(scene);
            } else {
                unassigned.push(scene);
            }
        }

        assigned.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        unassigned.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Self { assigned, unassigned }
    }
}
