//! Kind-scoped identifiers.
//!
//! Every collection keys its records by an opaque short string. Separate
//! newtypes keep an object id from being handed where a view id belongs.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sixteen hex characters of v4 entropy, plenty for per-document scopes.
fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(16);
    id
}

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generates a fresh random id.
            pub fn generate() -> Self {
                Self(short_id())
            }

            /// Wraps an id read from stored data or received from a peer.
            pub fn from_string(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_type! {
    /// Identifies an object record.
    ObjectId
}

id_type! {
    /// Identifies a container (layer or group).
    ContainerId
}

id_type! {
    /// Identifies a view (page).
    ViewId
}

id_type! {
    /// Identifies a named style definition.
    StyleId
}

id_type! {
    /// Identifies a palette.
    PaletteId
}

id_type! {
    /// Identifies a template.
    TemplateId
}

id_type! {
    /// Identifies a rich-text buffer.
    TextId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_short_and_unique() {
        let a = ObjectId::generate();
        let b = ObjectId::generate();
        assert_eq!(a.as_str().len(), 16);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_round_trip() {
        let id = ViewId::generate();
        let back = ViewId::from_string(id.to_string());
        assert_eq!(id, back);
    }
}
