#![forbid(unsafe_code)]

//! NavDeck Core
//!
//! The preset/scene assignment engine: a fixed set of host-owned "scenes" is
//! grouped into named, colored presets, with exactly one preset owning each
//! scene and a client-local pointer selecting which preset's scenes the
//! navigation strip displays.
//!
//! # Key Components
//!
//! - [`Preset`] / [`PresetCollection`] - the data model and its durable format
//! - [`PresetRegistry`] - collection ownership and scene-set reconciliation
//! - [`ActivePresetTracker`] - the self-healing active pointer
//! - [`PresetMutationService`] - create/update/delete with scene migration
//! - [`PresetService`] - the facade the UI layer binds to, with change
//!   notifications
//! - [`SceneDirectory`] - the host's scene oracle, injected at the seam
//!
//! # Role in NavDeck
//!
//! `navdeck-core` is pure bookkeeping: it consumes a scene-list query and a
//! scoped key/value settings store (`navdeck-settings`) and emits a normalized
//! preset collection plus an active-preset id. Rendering belongs to whatever
//! presentation layer binds to [`PresetService`]; view-model construction for
//! the navigation strip lives in `navdeck-menu`.
//!
//! # Invariants
//!
//! 1. Every live scene id belongs to exactly one preset's scene list once
//!    reconciliation has run.
//! 2. The default preset always exists after initialization and can never be
//!    deleted; deleting any other preset migrates its scenes into it.
//! 3. The active pointer always resolves to a live preset id (self-healing).

pub mod directory;
pub mod error;
pub mod keys;
pub mod mutation;
pub mod preset;
pub mod registry;
pub mod service;
pub mod tracker;

pub use directory::{SceneDirectory, Viewer};
pub use error::{PresetError, PresetResult};
pub use mutation::{Notice, PresetMutationService};
pub use preset::{
    DEFAULT_PRESET_ID, DEFAULT_PRESET_TITLE, HIDDEN_PRESET_ID, NEUTRAL_COLOR, NEW_PRESET_TITLE,
    Preset, PresetCollection, normalize_color,
};
pub use registry::PresetRegistry;
pub use service::{Change, DeckOptions, PresetService};
pub use tracker::ActivePresetTracker;

#[cfg(any(test, feature = "test-helpers"))]
pub use directory::FixedDirectory;
