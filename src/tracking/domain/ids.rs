//! Identifier and validated scalar types for the tracking domain.

use super::TrackingDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a tracked item, assigned by the store at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Creates a new random item identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an item identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }

    /// Returns the last four hex digits of the identifier.
    ///
    /// Presentation adapters append this to surface names that would
    /// otherwise collide.
    #[must_use]
    pub fn short_suffix(self) -> String {
        let simple = self.0.simple().to_string();
        simple
            .get(simple.len().saturating_sub(4)..)
            .unwrap_or_default()
            .to_owned()
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for ItemId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self)
    }
}

/// Declares a validated, non-empty string identifier newtype.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $error:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a validated identifier.
            ///
            /// # Errors
            ///
            /// Returns a [`TrackingDomainError`] when the value is empty after
            /// trimming.
            pub fn new(value: impl Into<String>) -> Result<Self, TrackingDomainError> {
                let raw = value.into();
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err($error);
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Returns the identifier as `str`.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of the community (guild) that owns an item.
    ScopeId,
    TrackingDomainError::EmptyIdentifier("scope")
);

string_id!(
    /// Platform identity of a person acting on an item.
    ActorId,
    TrackingDomainError::EmptyIdentifier("actor")
);

string_id!(
    /// Reference to an external presentation surface (channel-like object).
    SurfaceId,
    TrackingDomainError::EmptyIdentifier("surface")
);

string_id!(
    /// Reference to a message posted on a presentation surface.
    MessageId,
    TrackingDomainError::EmptyIdentifier("message")
);

/// A person acting on an item: claimant, update author, or reopener.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// Platform identity.
    pub id: ActorId,
    /// Human-readable name captured at the time of the action.
    pub display_name: String,
}

impl Actor {
    /// Creates an actor from an identity and display name.
    #[must_use]
    pub fn new(id: ActorId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.id)
    }
}
