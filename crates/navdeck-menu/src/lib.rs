#![forbid(unsafe_code)]

//! Navigation strip view models for NavDeck.
//!
//! Everything here is pure construction over `navdeck-core` state: the crate
//! decides what the navigation dropdown and the preset edit dialog display,
//! never how it is drawn. A presentation layer binds these models to its
//! toolkit and re-renders whenever the core signals a change.

pub mod grouping;
pub mod label;
pub mod menu;

pub use grouping::{GroupedScenes, SceneRef};
pub use label::{NAV_LABEL_MAX, truncate_label};
pub use menu::{MenuEntry, NavigationMenu};
