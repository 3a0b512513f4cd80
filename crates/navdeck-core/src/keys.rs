//! Well-known setting keys.
//!
//! These names are part of the durable format: worlds written by earlier
//! versions of the system are read back under the same keys.

/// World-scoped preset collection (JSON object keyed by preset id).
pub const PRESETS: &str = "npresets";

/// Client-scoped active preset pointer (preset id string).
pub const ACTIVE_PRESET: &str = "active-preset";

/// World-scoped snapshot of the scene ids seen on first run.
pub const NAV_SNAPSHOT: &str = "current-navids";

/// World-scoped flag: non-privileged users may use the preset strip.
pub const PLAYER_ENABLED: &str = "player-enabled";

/// World-scoped flag: truncate scene/preset labels for display.
pub const TRUNCATE_NAMES: &str = "truncate-name";
