//! Structural edits to the preset collection.
//!
//! Every mutation is one read of the stored collection, an in-memory rebuild,
//! and a single save - either the whole update is persisted or none of it is.
//! The single-owner invariant (a scene id lives in at most one preset) is
//! enforced on every edit by scanning all presets for the current owner rather
//! than trusting a caller-supplied hint.

use std::fmt;

use tracing::{debug, info};

use crate::error::{PresetError, PresetResult};
use crate::preset::{DEFAULT_PRESET_ID, HIDDEN_PRESET_ID, Preset, normalize_color};
use crate::registry::PresetRegistry;

/// User-facing feedback produced by a mutation.
///
/// `Display` renders the exact notification strings the navigation UI shows,
/// with distinct singular and plural phrasing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Scenes were taken away from other presets while being added.
    ScenesMoved(usize),
    /// Scenes removed from a preset were returned to the default preset.
    ScenesReturnedToDefault(usize),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ScenesMoved(1) => write!(f, "Removing 1 scene from another preset"),
            Notice::ScenesMoved(n) => write!(f, "Removing {n} scenes from other presets"),
            Notice::ScenesReturnedToDefault(1) => write!(f, "Adding 1 scene to default preset"),
            Notice::ScenesReturnedToDefault(n) => {
                write!(f, "Adding {n} scenes to default preset")
            }
        }
    }
}

/// Performs all structural edits: create/update, scene reassignment, delete.
#[derive(Clone, Debug)]
pub struct PresetMutationService {
    registry: PresetRegistry,
}

impl PresetMutationService {
    /// Create a mutation service writing through the given registry.
    #[must_use]
    pub fn new(registry: PresetRegistry) -> Self {
        Self { registry }
    }

    /// Insert or update `preset`, moving scenes in and out of it.
    ///
    /// Scenes in `scenes_to_add` are taken from whichever preset currently
    /// holds them (full scan) and appended to `preset`. Scenes in
    /// `scenes_to_remove` are taken from `preset` and appended to the default
    /// preset. Title and color are applied last; an empty color normalizes to
    /// the canonical neutral value. The collection persists as one write.
    ///
    /// Returned notices count cross-preset moves (moves out of the reserved
    /// hidden bucket are not reported) and scenes returned to default.
    pub fn create_or_update(
        &self,
        preset: &Preset,
        scenes_to_add: &[String],
        scenes_to_remove: &[String],
    ) -> PresetResult<Vec<Notice>> {
        let mut collection = self.registry.collection()?;
        if !collection.contains(&preset.id) {
            let mut fresh = preset.clone();
            fresh.color = normalize_color(&fresh.color);
            collection.insert(fresh);
            debug!(preset = preset.id.as_str(), "inserting new preset");
        }

        let mut moved = 0usize;
        for scene in scenes_to_add {
            for other in collection.iter_mut() {
                if other.remove_scene(scene) {
                    debug!(
                        scene = scene.as_str(),
                        from = other.id.as_str(),
                        "removing scene from previous preset"
                    );
                    if other.id != preset.id && other.id != HIDDEN_PRESET_ID {
                        moved += 1;
                    }
                }
            }
            collection
                .get_mut(&preset.id)
                .ok_or_else(|| PresetError::UnknownPreset(preset.id.clone()))?
                .scenes
                .push(scene.clone());
        }

        let mut returned = 0usize;
        for scene in scenes_to_remove {
            let was_held = collection
                .get_mut(&preset.id)
                .ok_or_else(|| PresetError::UnknownPreset(preset.id.clone()))?
                .remove_scene(scene);
            if !was_held {
                continue;
            }
            collection
                .default_preset_mut()
                .ok_or_else(|| PresetError::UnknownPreset(DEFAULT_PRESET_ID.to_owned()))?
                .scenes
                .push(scene.clone());
            returned += 1;
        }

        if let Some(target) = collection.get_mut(&preset.id) {
            target.title = preset.title.clone();
            target.color = normalize_color(&preset.color);
        }

        self.registry.save(&collection)?;

        let mut notices = Vec::new();
        if moved > 0 {
            notices.push(Notice::ScenesMoved(moved));
        }
        if returned > 0 {
            notices.push(Notice::ScenesReturnedToDefault(returned));
        }
        Ok(notices)
    }

    /// Delete `preset_id`, migrating its scenes into the default preset.
    ///
    /// The default preset keeps its existing scenes first; migrated scenes are
    /// appended after them. Fails with [`PresetError::ProtectedPreset`] for
    /// the default preset and [`PresetError::UnknownPreset`] for missing ids;
    /// in both cases nothing is written.
    pub fn delete(&self, preset_id: &str) -> PresetResult<()> {
        if preset_id == DEFAULT_PRESET_ID {
            return Err(PresetError::ProtectedPreset(preset_id.to_owned()));
        }

        let mut collection = self.registry.collection()?;
        let removed = collection
            .remove(preset_id)
            .ok_or_else(|| PresetError::UnknownPreset(preset_id.to_owned()))?;
        collection
            .default_preset_mut()
            .ok_or_else(|| PresetError::UnknownPreset(DEFAULT_PRESET_ID.to_owned()))?
            .scenes
            .extend(removed.scenes.iter().cloned());

        self.registry.save(&collection)?;
        info!(
            preset = preset_id,
            migrated = removed.scenes.len(),
            "deleted preset"
        );
        Ok(())
    }
}
