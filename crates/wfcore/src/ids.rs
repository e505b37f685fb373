//! Identifier types used across the mutable-state engine.
//!
//! Two shapes show up in the data model (spec.md §3/§6):
//!
//! - UUID-backed identifiers (`DomainId`, `RunId`) — the replication
//!   contract requires these parse as UUIDs (§6 `ReplicateEventsV2`
//!   validation rules), so they wrap [`uuid::Uuid`] directly rather than
//!   the fixed-width inline buffer used elsewhere in the corpus.
//! - Free-form, caller-supplied identifiers (`WorkflowId`, `TaskListId`,
//!   `ActivityId`, `TimerId`, `SignalName`) — these have no length or
//!   format constraint, so they wrap [`smol_str::SmolStr`] for cheap
//!   clones without a heap allocation in the common (short) case.

use std::borrow::Borrow;
use std::fmt;

use smol_str::SmolStr;
use uuid::Uuid;

/// Error returned when a string fails to parse as a UUID-backed identifier.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} is not a valid UUID: {value:?}")]
pub struct IdParseError {
    pub kind: &'static str,
    pub value: String,
}

/// Define a newtype identifier backed by a [`uuid::Uuid`].
///
/// Generates `new()` (random v4), `from_uuid()`, `parse_str()`, `nil()`,
/// `as_uuid()`, `Display`, and the `From`/`PartialEq` conversions the
/// rest of the crate expects from an identifier type.
macro_rules! define_uuid_id {
    ($(#[$meta:meta])* pub struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse from its string form; fails unless the string is a valid UUID.
            pub fn parse_str(s: &str) -> Result<Self, IdParseError> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| IdParseError { kind: stringify!($name), value: s.to_string() })
            }

            /// The all-zero sentinel identifier (`EmptyUUID` in spec.md §6).
            pub const fn nil() -> Self {
                Self(Uuid::nil())
            }

            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }

            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::nil()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

define_uuid_id! {
    /// A domain (tenant/namespace) identifier. Must be a UUID (spec.md §6).
    pub struct DomainId;
}

define_uuid_id! {
    /// A single workflow execution's run identifier. Must be a UUID (spec.md §6).
    pub struct RunId;
}

/// Define a newtype identifier backed by a [`smol_str::SmolStr`] with no
/// format constraint (caller-supplied names, not generated IDs).
macro_rules! define_string_id {
    ($(#[$meta:meta])* pub struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub SmolStr);

        impl $name {
            pub fn new(s: impl AsRef<str>) -> Self {
                Self(SmolStr::new(s.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self(SmolStr::default())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(SmolStr::new(s))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0.as_str() == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0.as_str() == *other
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.0.as_str()
            }
        }
    };
}

define_string_id! {
    /// Caller-supplied workflow identifier (unique per `(domain, workflow_id)` "current" slot).
    pub struct WorkflowId;
}

define_string_id! {
    /// Task list (queue) name a decision/activity task is dispatched on.
    pub struct TaskListId;
}

define_string_id! {
    /// Workflow type name.
    pub struct WorkflowTypeName;
}

define_string_id! {
    /// Caller-supplied activity identifier, unique within one workflow execution.
    pub struct ActivityId;
}

define_string_id! {
    /// Caller-supplied user-timer identifier, unique within one workflow execution.
    pub struct TimerId;
}

define_string_id! {
    /// Signal name carried by a signal-external-workflow request.
    pub struct SignalName;
}

define_string_id! {
    /// A request correlation identifier (cancel/signal/create dedup key).
    pub struct RequestId;
}

define_string_id! {
    /// Opaque history-branch token.
    pub struct BranchToken;
}

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
