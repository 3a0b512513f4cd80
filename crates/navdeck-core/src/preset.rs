//! Preset data model and the collection that owns it.
//!
//! A [`Preset`] is a named, colored group of scene ids; the
//! [`PresetCollection`] maps preset ids to presets and answers the ownership
//! queries the registry and mutation service need.
//!
//! # Durable format
//!
//! The collection persists as a JSON object keyed by preset id. Preset field
//! names (`id`, `titleText`, `colorText`, `sceneList`, `isActive`) are part of
//! the durable format and must not change: worlds written by earlier versions
//! of the system deserialize into these types unchanged.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Id of the mandatory default preset. Always exists once initialized and can
/// never be deleted; receives unassigned and migrated scenes.
pub const DEFAULT_PRESET_ID: &str = "default";

/// Id of the reserved hidden bucket. Sibling tooling parks scenes here;
/// scenes leaving it are not reported as cross-preset moves.
pub const HIDDEN_PRESET_ID: &str = "hidden";

/// Canonical neutral color a preset falls back to when none is chosen.
pub const NEUTRAL_COLOR: &str = "#000000";

/// Display title of the default preset.
pub const DEFAULT_PRESET_TITLE: &str = "Default";

/// Display title given to freshly created presets.
pub const NEW_PRESET_TITLE: &str = "New Preset";

/// Normalize a display color for persistence: the empty string becomes the
/// canonical neutral value, anything else is kept verbatim.
#[must_use]
pub fn normalize_color(color: &str) -> String {
    if color.is_empty() {
        NEUTRAL_COLOR.to_owned()
    } else {
        color.to_owned()
    }
}

/// A named, colored group owning a disjoint subset of scene ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    /// Unique preset id; opaque to consumers.
    pub id: String,
    /// Display name.
    #[serde(rename = "titleText")]
    pub title: String,
    /// Display color (hex). Persisted values are never empty.
    #[serde(rename = "colorText")]
    pub color: String,
    /// Ordered scene ids owned by this preset. A scene id appears in at most
    /// one preset's list at any time.
    #[serde(rename = "sceneList")]
    pub scenes: Vec<String>,
    /// Denormalized mirror of "currently selected". The client-scoped active
    /// pointer is authoritative; nothing reads this field to make decisions.
    #[serde(rename = "isActive", default)]
    pub active: bool,
}

impl Preset {
    /// Create a preset with an explicit id.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, color: &str) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            color: normalize_color(color),
            scenes: Vec::new(),
            active: false,
        }
    }

    /// Create a fresh user preset with a generated id and no scenes.
    #[must_use]
    pub fn create(title: impl Into<String>, color: &str) -> Self {
        Self::new(generate_preset_id(), title, color)
    }

    /// Build the default preset seeded with the given scenes.
    #[must_use]
    pub fn default_preset(scenes: Vec<String>) -> Self {
        Self {
            id: DEFAULT_PRESET_ID.to_owned(),
            title: DEFAULT_PRESET_TITLE.to_owned(),
            color: NEUTRAL_COLOR.to_owned(),
            scenes,
            active: true,
        }
    }

    /// Whether this is the protected default preset.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_PRESET_ID
    }

    /// Whether this preset currently owns `scene_id`.
    #[must_use]
    pub fn contains_scene(&self, scene_id: &str) -> bool {
        self.scenes.iter().any(|s| s == scene_id)
    }

    /// Remove `scene_id` from this preset's list. Returns whether it was held.
    pub fn remove_scene(&mut self, scene_id: &str) -> bool {
        let before = self.scenes.len();
        self.scenes.retain(|s| s != scene_id);
        self.scenes.len() != before
    }
}

/// Generate an opaque id for a new preset.
#[must_use]
fn generate_preset_id() -> String {
    format!("npreset-{}", Uuid::new_v4().simple())
}

/// Mapping from preset id to [`Preset`].
///
/// Insertion order carries no meaning; display consumers alpha-sort by title
/// via [`sorted_by_title`](Self::sorted_by_title).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetCollection {
    presets: HashMap<String, Preset>,
}

impl PresetCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of presets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Whether the collection holds no presets (uninitialized state).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Whether a preset with `id` exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.presets.contains_key(id)
    }

    /// Look up a preset by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.get(id)
    }

    /// Look up a preset by id, mutably.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Preset> {
        self.presets.get_mut(id)
    }

    /// Insert a preset, keyed by its id. Replaces any existing entry.
    pub fn insert(&mut self, preset: Preset) {
        self.presets.insert(preset.id.clone(), preset);
    }

    /// Remove and return the preset with `id`, if present.
    pub fn remove(&mut self, id: &str) -> Option<Preset> {
        self.presets.remove(id)
    }

    /// Iterate over all presets in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.values()
    }

    /// Iterate over all presets mutably, in arbitrary order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Preset> {
        self.presets.values_mut()
    }

    /// The default preset, if the collection has been initialized.
    #[must_use]
    pub fn default_preset(&self) -> Option<&Preset> {
        self.presets.get(DEFAULT_PRESET_ID)
    }

    /// The default preset, mutably.
    pub fn default_preset_mut(&mut self) -> Option<&mut Preset> {
        self.presets.get_mut(DEFAULT_PRESET_ID)
    }

    /// The preset currently owning `scene_id`, if any.
    #[must_use]
    pub fn owner_of(&self, scene_id: &str) -> Option<&Preset> {
        self.presets.values().find(|p| p.contains_scene(scene_id))
    }

    /// Union of every preset's scene list.
    #[must_use]
    pub fn assigned_scene_ids(&self) -> HashSet<&str> {
        self.presets
            .values()
            .flat_map(|p| p.scenes.iter().map(String::as_str))
            .collect()
    }

    /// Presets alpha-sorted by title (ties broken by id for determinism).
    #[must_use]
    pub fn sorted_by_title(&self) -> Vec<&Preset> {
        let mut sorted: Vec<&Preset> = self.presets.values().collect();
        sorted.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        sorted
    }

    /// Keep only presets accepted by `keep`.
    #[must_use]
    pub fn filtered(&self, keep: impl Fn(&Preset) -> bool) -> PresetCollection {
        PresetCollection {
            presets: self
                .presets
                .iter()
                .filter(|(_, p)| keep(p))
                .map(|(id, p)| (id.clone(), p.clone()))
                .collect(),
        }
    }

    /// The id a stale or unset active pointer falls back to: the default
    /// preset when present, otherwise the smallest preset id (deterministic
    /// "first"), otherwise `None` for an empty collection.
    #[must_use]
    pub fn fallback_id(&self) -> Option<String> {
        if self.presets.contains_key(DEFAULT_PRESET_ID) {
            return Some(DEFAULT_PRESET_ID.to_owned());
        }
        self.presets.keys().min().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_color_normalizes_to_neutral() {
        assert_eq!(normalize_color(""), NEUTRAL_COLOR);
        assert_eq!(normalize_color("#ff8800"), "#ff8800");

        let preset = Preset::new("p1", "Dungeons", "");
        assert_eq!(preset.color, NEUTRAL_COLOR);
    }

    #[test]
    fn created_presets_get_distinct_ids() {
        let a = Preset::create(NEW_PRESET_TITLE, "");
        let b = Preset::create(NEW_PRESET_TITLE, "");
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("npreset-"));
        assert!(a.scenes.is_empty());
        assert!(!a.active);
    }

    #[test]
    fn durable_field_names_are_preserved() {
        let mut preset = Preset::new("p1", "Wilds", "#224422");
        preset.scenes.push("s1".to_owned());
        let json = serde_json::to_string(&preset).unwrap();
        for field in ["\"id\"", "\"titleText\"", "\"colorText\"", "\"sceneList\"", "\"isActive\""] {
            assert!(json.contains(field), "missing durable field {field} in {json}");
        }
    }

    #[test]
    fn deserializes_documents_written_by_earlier_versions() {
        let stored = r##"{
            "default": {
                "id": "default",
                "titleText": "Default",
                "colorText": "#000000",
                "sceneList": ["s1", "s2"],
                "isActive": true
            },
            "npreset-aa11": {
                "id": "npreset-aa11",
                "titleText": "Caves",
                "colorText": "#332211",
                "sceneList": ["s3"],
                "isActive": false
            }
        }"##;
        let collection: PresetCollection = serde_json::from_str(stored).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.default_preset().unwrap().scenes, vec!["s1", "s2"]);
        assert_eq!(collection.get("npreset-aa11").unwrap().title, "Caves");
    }

    #[test]
    fn owner_queries() {
        let mut collection = PresetCollection::new();
        collection.insert(Preset::default_preset(vec!["s1".to_owned()]));
        let mut caves = Preset::new("p-caves", "Caves", "");
        caves.scenes.push("s2".to_owned());
        collection.insert(caves);

        assert_eq!(collection.owner_of("s1").unwrap().id, DEFAULT_PRESET_ID);
        assert_eq!(collection.owner_of("s2").unwrap().id, "p-caves");
        assert!(collection.owner_of("s9").is_none());

        let assigned = collection.assigned_scene_ids();
        assert!(assigned.contains("s1") && assigned.contains("s2"));
    }

    #[test]
    fn sorted_by_title_is_alphabetical_and_deterministic() {
        let mut collection = PresetCollection::new();
        collection.insert(Preset::new("p2", "Bog", ""));
        collection.insert(Preset::new("p1", "Attic", ""));
        collection.insert(Preset::new("p0", "Bog", ""));

        let titles: Vec<&str> = collection
            .sorted_by_title()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(titles, vec!["p1", "p0", "p2"]);
    }

    #[test]
    fn fallback_prefers_default_then_smallest_id() {
        let mut collection = PresetCollection::new();
        assert!(collection.fallback_id().is_none());

        collection.insert(Preset::new("zz", "Z", ""));
        collection.insert(Preset::new("aa", "A", ""));
        assert_eq!(collection.fallback_id().as_deref(), Some("aa"));

        collection.insert(Preset::default_preset(Vec::new()));
        assert_eq!(collection.fallback_id().as_deref(), Some(DEFAULT_PRESET_ID));
    }
}
