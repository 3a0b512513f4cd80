//! Error taxonomy for preset operations.

use std::fmt;

use navdeck_settings::StoreError;

/// Errors raised by preset registry, tracker, and mutation operations.
#[derive(Debug)]
pub enum PresetError {
    /// A preset id was referenced that does not exist in the collection.
    UnknownPreset(String),
    /// An attempt was made to delete the protected default preset.
    ProtectedPreset(String),
    /// The settings store failed; no partial state was written.
    Store(StoreError),
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::UnknownPreset(id) => write!(f, "unknown preset `{id}`"),
            PresetError::ProtectedPreset(id) => {
                write!(f, "preset `{id}` is protected and cannot be deleted")
            }
            PresetError::Store(e) => write!(f, "settings store failure: {e}"),
        }
    }
}

impl std::error::Error for PresetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PresetError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for PresetError {
    fn from(e: StoreError) -> Self {
        PresetError::Store(e)
    }
}

/// Result type for preset operations.
pub type PresetResult<T> = Result<T, PresetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_preset() {
        let unknown = PresetError::UnknownPreset("npreset-abc".into());
        assert!(unknown.to_string().contains("npreset-abc"));

        let protected = PresetError::ProtectedPreset("default".into());
        assert!(protected.to_string().contains("default"));
        assert!(protected.to_string().contains("protected"));
    }

    #[test]
    fn store_errors_keep_their_source() {
        use std::error::Error;
        let err = PresetError::from(StoreError::Corruption("lock poisoned".into()));
        assert!(err.source().is_some());
    }
}
