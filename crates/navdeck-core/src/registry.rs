//! Preset collection ownership and reconciliation against the live scene set.
//!
//! The registry is the only component that reads and writes the stored
//! collection. Every operation re-reads current state from the settings store
//! before acting, so interleaved callbacks and external writers never work
//! from a stale in-memory copy.

use navdeck_settings::{Scope, Settings};
use tracing::{debug, info};

use crate::error::{PresetError, PresetResult};
use crate::keys;
use crate::preset::{DEFAULT_PRESET_ID, Preset, PresetCollection};

/// Owns the stored [`PresetCollection`] and its invariants.
#[derive(Clone, Debug)]
pub struct PresetRegistry {
    settings: Settings,
}

impl PresetRegistry {
    /// Create a registry over the given settings handle.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Load the stored collection. An unset key reads as the empty
    /// (uninitialized) collection.
    pub fn collection(&self) -> PresetResult<PresetCollection> {
        Ok(self
            .settings
            .get::<PresetCollection>(Scope::World, keys::PRESETS)?
            .unwrap_or_default())
    }

    /// Persist the full collection as a single store write.
    pub fn save(&self, collection: &PresetCollection) -> PresetResult<()> {
        self.settings.set(Scope::World, keys::PRESETS, collection)?;
        Ok(())
    }

    /// First-run construction: when the stored collection is empty, create it
    /// with only the default preset seeded from `scene_ids`.
    ///
    /// Idempotent: returns `Ok(false)` without writing when the collection is
    /// already populated.
    pub fn initialize(&self, scene_ids: &[String]) -> PresetResult<bool> {
        let mut collection = self.collection()?;
        if !collection.is_empty() {
            return Ok(false);
        }
        collection.insert(Preset::default_preset(scene_ids.to_vec()));
        self.save(&collection)?;
        info!(scenes = scene_ids.len(), "initialized preset collection");
        Ok(true)
    }

    /// Fold scene ids unknown to every preset into the default preset.
    ///
    /// Scenes referenced by a preset but absent from `scene_ids` are left
    /// untouched: stale references persist until an explicit mutation removes
    /// them. Writes only when something changed; returns the number of scenes
    /// folded in.
    pub fn reconcile(&self, scene_ids: &[String]) -> PresetResult<usize> {
        let mut collection = self.collection()?;
        let unassigned: Vec<String> = {
            let assigned = collection.assigned_scene_ids();
            scene_ids
                .iter()
                .filter(|id| !assigned.contains(id.as_str()))
                .cloned()
                .collect()
        };
        if unassigned.is_empty() {
            return Ok(0);
        }
        let default = collection
            .default_preset_mut()
            .ok_or_else(|| PresetError::UnknownPreset(DEFAULT_PRESET_ID.to_owned()))?;
        default.scenes.extend(unassigned.iter().cloned());
        self.save(&collection)?;
        debug!(
            folded = unassigned.len(),
            "assigned drifted scenes to default preset"
        );
        Ok(unassigned.len())
    }

    /// The collection as seen by a caller.
    ///
    /// Privileged callers get everything. Non-privileged callers only see
    /// presets containing at least one scene accepted by `visible` - a host
    /// policy predicate the registry passes through without interpreting.
    pub fn list(
        &self,
        privileged: bool,
        visible: impl Fn(&str) -> bool,
    ) -> PresetResult<PresetCollection> {
        let collection = self.collection()?;
        if privileged {
            return Ok(collection);
        }
        Ok(collection.filtered(|preset| preset.scenes.iter().any(|s| visible(s))))
    }

    /// The default preset entry.
    pub fn default_preset(&self) -> PresetResult<Preset> {
        self.collection()?
            .remove(DEFAULT_PRESET_ID)
            .ok_or_else(|| PresetError::UnknownPreset(DEFAULT_PRESET_ID.to_owned()))
    }
}
