//! Client-local active preset pointer.
//!
//! The pointer is the authoritative "which preset is displayed" state. It is
//! client-scoped (each session points where it likes) and self-healing: preset
//! deletion on another session can leave a stale pointer behind, so
//! [`ensure_valid`](ActivePresetTracker::ensure_valid) runs before every
//! display/filter pass.
//!
//! Operations take an already-loaded [`PresetCollection`] so that one
//! consistent snapshot drives both validation and healing.

use navdeck_settings::{Scope, Settings};
use tracing::{debug, warn};

use crate::error::{PresetError, PresetResult};
use crate::keys;
use crate::preset::PresetCollection;

/// Owns the active-preset pointer and its fallback rule.
#[derive(Clone, Debug)]
pub struct ActivePresetTracker {
    settings: Settings,
}

impl ActivePresetTracker {
    /// Create a tracker over the given settings handle.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    fn stored(&self) -> PresetResult<Option<String>> {
        Ok(self.settings.get::<String>(Scope::Client, keys::ACTIVE_PRESET)?)
    }

    /// The stored pointer, or the collection's fallback id when unset.
    ///
    /// Does not validate liveness; callers that are about to display should
    /// use [`ensure_valid`](Self::ensure_valid) instead. `None` only for an
    /// empty (uninitialized) collection.
    pub fn active_id(&self, collection: &PresetCollection) -> PresetResult<Option<String>> {
        Ok(self.stored()?.or_else(|| collection.fallback_id()))
    }

    /// Validate the pointer against `collection`, healing it when stale.
    ///
    /// A pointer referencing a missing preset (or no pointer at all) is reset
    /// to the fallback id and persisted. Returns the id the pointer resolves
    /// to after healing.
    pub fn ensure_valid(&self, collection: &PresetCollection) -> PresetResult<Option<String>> {
        let stored = self.stored()?;
        if let Some(id) = &stored {
            if collection.contains(id) {
                return Ok(stored);
            }
        }

        let fallback = collection.fallback_id();
        if let Some(fallback_id) = &fallback {
            warn!(
                stale = stored.as_deref().unwrap_or("<unset>"),
                fallback = fallback_id.as_str(),
                "active preset no longer exists, switching to fallback"
            );
            self.settings
                .set(Scope::Client, keys::ACTIVE_PRESET, fallback_id)?;
        }
        Ok(fallback)
    }

    /// Persist `preset_id` as the new pointer.
    ///
    /// Fails with [`PresetError::UnknownPreset`] when the id is not present in
    /// `collection`; the stored pointer is left untouched in that case.
    pub fn activate(&self, collection: &PresetCollection, preset_id: &str) -> PresetResult<()> {
        if !collection.contains(preset_id) {
            return Err(PresetError::UnknownPreset(preset_id.to_owned()));
        }
        self.settings
            .set(Scope::Client, keys::ACTIVE_PRESET, preset_id)?;
        debug!(preset = preset_id, "activated preset");
        Ok(())
    }
}
