//! The facade the UI layer binds to.
//!
//! [`PresetService`] wires the registry, tracker, and mutation service to a
//! [`SceneDirectory`] and a settings handle, and adds the two things only the
//! facade can own: the bootstrap lifecycle ([`refresh`](PresetService::refresh))
//! and the change-notification hook the presentation layer re-renders on.
//!
//! The service holds no collection state of its own; every call re-reads
//! through the registry.

use std::sync::{Arc, RwLock};

use navdeck_settings::{Scope, Settings, StoreError};
use tracing::{debug, warn};

use crate::directory::SceneDirectory;
use crate::error::{PresetError, PresetResult};
use crate::keys;
use crate::mutation::{Notice, PresetMutationService};
use crate::preset::{Preset, PresetCollection};
use crate::registry::PresetRegistry;
use crate::tracker::ActivePresetTracker;

/// World-scoped behavior flags.
///
/// Stored as individual settings under their original key names; missing or
/// unreadable values fall back to the defaults below rather than erroring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeckOptions {
    /// Non-privileged users may see and switch presets (never edit them).
    pub player_enabled: bool,
    /// Truncate navigation labels for display (32 columns).
    pub truncate_names: bool,
}

impl Default for DeckOptions {
    fn default() -> Self {
        Self {
            player_enabled: false,
            truncate_names: true,
        }
    }
}

impl DeckOptions {
    /// Load options from world settings, defaulting per field.
    pub fn load(settings: &Settings) -> PresetResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            player_enabled: read_flag(settings, keys::PLAYER_ENABLED, defaults.player_enabled)?,
            truncate_names: read_flag(settings, keys::TRUNCATE_NAMES, defaults.truncate_names)?,
        })
    }

    /// Persist both flags to world settings.
    pub fn store(&self, settings: &Settings) -> PresetResult<()> {
        settings.set(Scope::World, keys::PLAYER_ENABLED, &self.player_enabled)?;
        settings.set(Scope::World, keys::TRUNCATE_NAMES, &self.truncate_names)?;
        Ok(())
    }
}

/// Read a boolean flag, tolerating unreadable stored values.
fn read_flag(settings: &Settings, key: &str, default: bool) -> PresetResult<bool> {
    match settings.get::<bool>(Scope::World, key) {
        Ok(value) => Ok(value.unwrap_or(default)),
        Err(StoreError::Serialization(msg)) => {
            warn!(key, %msg, "unreadable option value, using default");
            Ok(default)
        }
        Err(e) => Err(e.into()),
    }
}

/// What changed, as reported to [`PresetService::on_change`] listeners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
    /// First-run initialization wrote the seeded collection.
    Initialized,
    /// Reconciliation folded drifted scenes into the default preset.
    Reconciled {
        /// Number of scenes folded in.
        folded: usize,
    },
    /// A preset was created or updated.
    Updated {
        /// Id of the affected preset.
        preset_id: String,
    },
    /// A preset was deleted (its scenes migrated to default).
    Deleted {
        /// Id of the removed preset.
        preset_id: String,
    },
    /// The active pointer moved.
    Activated {
        /// Id of the newly active preset.
        preset_id: String,
    },
}

type ChangeListener = Box<dyn Fn(&Change) + Send + Sync>;

/// The exposed interface of the preset system.
pub struct PresetService {
    settings: Settings,
    directory: Arc<dyn SceneDirectory>,
    registry: PresetRegistry,
    tracker: ActivePresetTracker,
    mutations: PresetMutationService,
    listeners: RwLock<Vec<ChangeListener>>,
}

impl PresetService {
    /// Wire the service over a settings handle and the host's scene oracle.
    #[must_use]
    pub fn new(settings: Settings, directory: Arc<dyn SceneDirectory>) -> Self {
        let registry = PresetRegistry::new(settings.clone());
        let tracker = ActivePresetTracker::new(settings.clone());
        let mutations = PresetMutationService::new(registry.clone());
        Self {
            settings,
            directory,
            registry,
            tracker,
            mutations,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Register a listener invoked after every successful mutating operation.
    ///
    /// Listeners run after the store write succeeded, in registration order.
    pub fn on_change(&self, listener: impl Fn(&Change) + Send + Sync + 'static) {
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.push(Box::new(listener));
        }
    }

    fn emit(&self, change: &Change) {
        debug!(?change, "preset collection changed");
        if let Ok(listeners) = self.listeners.read() {
            for listener in listeners.iter() {
                listener(change);
            }
        }
    }

    /// Whether the preset strip applies to the calling user at all:
    /// privileged users always, players only when the world enables them.
    pub fn is_enabled(&self) -> PresetResult<bool> {
        Ok(self.directory.is_privileged() || self.options()?.player_enabled)
    }

    /// The first-ready/first-render lifecycle pass.
    ///
    /// Records the nav snapshot when unset, initializes the collection on
    /// first run (seeding the default preset with every live scene),
    /// reconciles drifted scenes for privileged callers, and self-heals the
    /// active pointer. Returns the id the pointer resolves to.
    pub fn refresh(&self) -> PresetResult<Option<String>> {
        let scene_ids = self.directory.scene_ids();

        let snapshot: Option<Vec<String>> =
            self.settings.get(Scope::World, keys::NAV_SNAPSHOT)?;
        if snapshot.is_none_or(|s| s.is_empty()) {
            self.settings
                .set(Scope::World, keys::NAV_SNAPSHOT, &scene_ids)?;
        }

        if self.registry.initialize(&scene_ids)? {
            self.emit(&Change::Initialized);
        }
        if self.directory.is_privileged() {
            let folded = self.registry.reconcile(&scene_ids)?;
            if folded > 0 {
                self.emit(&Change::Reconciled { folded });
            }
        }

        let collection = self.registry.collection()?;
        self.tracker.ensure_valid(&collection)
    }

    /// The preset collection as the calling user may see it.
    pub fn presets(&self) -> PresetResult<PresetCollection> {
        self.registry.list(self.directory.is_privileged(), |scene| {
            self.directory.is_scene_visible(scene)
        })
    }

    /// The id the active pointer currently resolves to.
    pub fn active_preset_id(&self) -> PresetResult<Option<String>> {
        let collection = self.registry.collection()?;
        self.tracker.active_id(&collection)
    }

    /// Point this client at `preset_id`.
    pub fn activate(&self, preset_id: &str) -> PresetResult<()> {
        let collection = self.registry.collection()?;
        self.tracker.activate(&collection, preset_id)?;
        self.emit(&Change::Activated {
            preset_id: preset_id.to_owned(),
        });
        Ok(())
    }

    /// Create or update a preset; see [`PresetMutationService::create_or_update`].
    pub fn create_or_update(
        &self,
        preset: &Preset,
        scenes_to_add: &[String],
        scenes_to_remove: &[String],
    ) -> PresetResult<Vec<Notice>> {
        let notices = self
            .mutations
            .create_or_update(preset, scenes_to_add, scenes_to_remove)?;
        self.emit(&Change::Updated {
            preset_id: preset.id.clone(),
        });
        Ok(notices)
    }

    /// Delete a preset; see [`PresetMutationService::delete`].
    pub fn delete(&self, preset_id: &str) -> PresetResult<()> {
        self.mutations.delete(preset_id)?;
        self.emit(&Change::Deleted {
            preset_id: preset_id.to_owned(),
        });
        Ok(())
    }

    /// Live scene ids filtered to the active preset's membership - the set the
    /// navigation strip should display. Heals the pointer first.
    pub fn visible_scene_ids(&self) -> PresetResult<Vec<String>> {
        let collection = self.registry.collection()?;
        let Some(active_id) = self.tracker.ensure_valid(&collection)? else {
            // Uninitialized collection: nothing to filter by.
            return Ok(self.directory.scene_ids());
        };
        let active = collection
            .get(&active_id)
            .ok_or_else(|| PresetError::UnknownPreset(active_id.clone()))?;
        Ok(self
            .directory
            .scene_ids()
            .into_iter()
            .filter(|scene| active.contains_scene(scene))
            .collect())
    }

    /// Current world options.
    pub fn options(&self) -> PresetResult<DeckOptions> {
        DeckOptions::load(&self.settings)
    }

    /// Persist world options.
    pub fn set_options(&self, options: DeckOptions) -> PresetResult<()> {
        options.store(&self.settings)
    }
}

impl std::fmt::Debug for PresetService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresetService")
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::FixedDirectory;
    use crate::preset::DEFAULT_PRESET_ID;
    use std::sync::Mutex;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_owned()).collect()
    }

    fn service(directory: FixedDirectory) -> PresetService {
        PresetService::new(Settings::in_memory(), Arc::new(directory))
    }

    #[test]
    fn refresh_bootstraps_an_empty_world() {
        let svc = service(FixedDirectory::privileged().with_scene("s1").with_scene("s2"));

        let active = svc.refresh().unwrap();
        assert_eq!(active.as_deref(), Some(DEFAULT_PRESET_ID));

        let presets = svc.presets().unwrap();
        assert_eq!(presets.len(), 1);
        assert_eq!(
            presets.default_preset().unwrap().scenes,
            ids(&["s1", "s2"])
        );

        // Nav snapshot recorded on first run.
        let snapshot: Option<Vec<String>> = svc
            .settings
            .get(Scope::World, keys::NAV_SNAPSHOT)
            .unwrap();
        assert_eq!(snapshot, Some(ids(&["s1", "s2"])));
    }

    #[test]
    fn refresh_reconciles_new_scenes_for_privileged_users() {
        let svc = service(FixedDirectory::privileged().with_scene("s1"));
        svc.refresh().unwrap();

        // A new scene appears in the host.
        let svc = PresetService::new(
            svc.settings.clone(),
            Arc::new(FixedDirectory::privileged().with_scene("s1").with_scene("s2")),
        );
        svc.refresh().unwrap();
        assert_eq!(
            svc.presets().unwrap().default_preset().unwrap().scenes,
            ids(&["s1", "s2"])
        );
    }

    #[test]
    fn refresh_does_not_reconcile_for_players() {
        let settings = Settings::in_memory();
        let gm = PresetService::new(
            settings.clone(),
            Arc::new(FixedDirectory::privileged().with_scene("s1")),
        );
        gm.refresh().unwrap();

        let player = PresetService::new(
            settings.clone(),
            Arc::new(FixedDirectory::player().with_scene("s1").with_scene("s2")),
        );
        player.refresh().unwrap();

        // s2 stays unassigned until a privileged refresh sees it.
        let collection = PresetRegistry::new(settings).collection().unwrap();
        assert_eq!(collection.default_preset().unwrap().scenes, ids(&["s1"]));
    }

    #[test]
    fn visible_scene_ids_follow_the_active_preset() {
        let svc = service(
            FixedDirectory::privileged()
                .with_scene("s1")
                .with_scene("s2")
                .with_scene("s3"),
        );
        svc.refresh().unwrap();

        let caves = Preset::new("p-caves", "Caves", "");
        svc.create_or_update(&caves, &ids(&["s2"]), &[]).unwrap();

        // Default is active: everything but s2.
        assert_eq!(svc.visible_scene_ids().unwrap(), ids(&["s1", "s3"]));

        svc.activate("p-caves").unwrap();
        assert_eq!(svc.visible_scene_ids().unwrap(), ids(&["s2"]));
    }

    #[test]
    fn deleting_the_active_preset_heals_the_pointer() {
        let svc = service(FixedDirectory::privileged().with_scene("s1").with_scene("s2"));
        svc.refresh().unwrap();

        let caves = Preset::new("p-caves", "Caves", "");
        svc.create_or_update(&caves, &ids(&["s2"]), &[]).unwrap();
        svc.activate("p-caves").unwrap();

        svc.delete("p-caves").unwrap();
        assert_eq!(svc.refresh().unwrap().as_deref(), Some(DEFAULT_PRESET_ID));
        assert_eq!(svc.visible_scene_ids().unwrap(), ids(&["s1", "s2"]));
    }

    #[test]
    fn listeners_observe_every_mutation() {
        let svc = service(FixedDirectory::privileged().with_scene("s1"));
        let seen: Arc<Mutex<Vec<Change>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        svc.on_change(move |change| sink.lock().unwrap().push(change.clone()));

        svc.refresh().unwrap();
        let caves = Preset::new("p-caves", "Caves", "");
        svc.create_or_update(&caves, &[], &[]).unwrap();
        svc.activate("p-caves").unwrap();
        svc.delete("p-caves").unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                Change::Initialized,
                Change::Updated {
                    preset_id: "p-caves".to_owned()
                },
                Change::Activated {
                    preset_id: "p-caves".to_owned()
                },
                Change::Deleted {
                    preset_id: "p-caves".to_owned()
                },
            ]
        );
    }

    #[test]
    fn failed_mutations_do_not_notify() {
        let svc = service(FixedDirectory::privileged().with_scene("s1"));
        svc.refresh().unwrap();

        let seen: Arc<Mutex<usize>> = Arc::new(Mutex::new(0));
        let sink = seen.clone();
        svc.on_change(move |_| *sink.lock().unwrap() += 1);

        assert!(svc.delete(DEFAULT_PRESET_ID).is_err());
        assert!(svc.activate("nope").is_err());
        assert_eq!(*seen.lock().unwrap(), 0);
    }

    #[test]
    fn player_visibility_filter_is_passed_through() {
        let settings = Settings::in_memory();
        let gm = PresetService::new(
            settings.clone(),
            Arc::new(FixedDirectory::privileged().with_scene("s1").with_scene("s2")),
        );
        gm.refresh().unwrap();
        let caves = Preset::new("p-caves", "Caves", "");
        gm.create_or_update(&caves, &ids(&["s2"]), &[]).unwrap();

        // The player can only see s2, so only the preset containing it lists.
        let player = PresetService::new(
            settings,
            Arc::new(
                FixedDirectory::player()
                    .with_hidden_scene("s1")
                    .with_scene("s2"),
            ),
        );
        let listed = player.presets().unwrap();
        assert!(listed.contains("p-caves"));
        assert!(!listed.contains(DEFAULT_PRESET_ID));
    }

    #[test]
    fn options_default_and_round_trip() {
        let svc = service(FixedDirectory::player());
        assert_eq!(svc.options().unwrap(), DeckOptions::default());
        assert!(!svc.is_enabled().unwrap());

        svc.set_options(DeckOptions {
            player_enabled: true,
            truncate_names: false,
        })
        .unwrap();
        let options = svc.options().unwrap();
        assert!(options.player_enabled);
        assert!(!options.truncate_names);
        assert!(svc.is_enabled().unwrap());
    }

    #[test]
    fn unreadable_option_values_fall_back_to_defaults() {
        let svc = service(FixedDirectory::player());
        svc.settings
            .set(Scope::World, keys::TRUNCATE_NAMES, &"not-a-bool")
            .unwrap();
        assert_eq!(svc.options().unwrap(), DeckOptions::default());
    }
}
