//! Navigation dropdown view model.
//!
//! Pure construction: the host renders however it likes, this module only
//! decides *what* appears. The rules mirror the strip's behavior:
//!
//! - the active preset is the dropdown header, not a menu entry
//! - remaining presets list alpha-sorted by title
//! - the default preset is skipped while it owns no scenes
//! - presets containing the host-active scene carry a marker
//! - viewer badges aggregate over member scenes in navigation order

use navdeck_core::preset::{DEFAULT_PRESET_ID, Preset, PresetCollection};
use navdeck_core::service::DeckOptions;
use navdeck_core::{SceneDirectory, Viewer};

use crate::label::{NAV_LABEL_MAX, truncate_label};

/// One selectable preset in the navigation strip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    /// Id of the preset this entry activates.
    pub preset_id: String,
    /// Display label, truncated per world options.
    pub title: String,
    /// Background color (hex, never empty).
    pub color: String,
    /// Whether a member scene is currently host-active.
    pub has_active_scene: bool,
    /// Badges for users viewing member scenes.
    pub viewers: Vec<Viewer>,
}

/// The whole dropdown: header entry plus the selectable rest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationMenu {
    /// The active preset, shown as the dropdown header. `None` only for an
    /// uninitialized collection.
    pub active: Option<MenuEntry>,
    /// The other presets, in display order.
    pub entries: Vec<MenuEntry>,
    /// Whether the caller gets create/edit/delete affordances.
    pub can_manage: bool,
}

impl NavigationMenu {
    /// Build the dropdown model for the given collection state.
    #[must_use]
    pub fn build(
        collection: &PresetCollection,
        active_id: Option<&str>,
        directory: &dyn SceneDirectory,
        options: &DeckOptions,
    ) -> Self {
        let active = active_id
            .and_then(|id| collection.get(id))
            .map(|preset| entry_for(preset, directory, options));

        let entries = collection
            .sorted_by_title()
            .into_iter()
            .filter(|preset| Some(preset.id.as_str()) != active_id)
            .filter(|preset| !(preset.id == DEFAULT_PRESET_ID && preset.scenes.is_empty()))
            .map(|preset| entry_for(preset, directory, options))
            .collect();

        Self {
            active,
            entries,
            can_manage: directory.is_privileged(),
        }
    }
}

fn entry_for(preset: &Preset, directory: &dyn SceneDirectory, options: &DeckOptions) -> MenuEntry {
    let title = if options.truncate_names {
        truncate_label(&preset.title, NAV_LABEL_MAX)
    } else {
        preset.title.clone()
    };

    let has_active_scene = preset
        .scenes
        .iter()
        .any(|scene| directory.is_scene_active(scene));

    // Nav order, not preset order, so badges line up with the strip.
    let viewers = directory
        .scene_ids()
        .into_iter()
        .filter(|scene| preset.contains_scene(scene))
        .flat_map(|scene| directory.viewers(&scene))
        .collect();

    MenuEntry {
        preset_id: preset.id.clone(),
        title,
        color: preset.color.clone(),
        has_active_scene,
        viewers,
    }
}
