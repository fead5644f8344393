//! Error kinds surfaced by collections, the aggregate and the facade.
//!
//! # Invariants
//! - A returned error means the store was left exactly as before the call.
//! - Errors carry the offending identity in display form so callers can
//!   compose messages without re-reading the store.

use crate::model::delivery::DeliveryId;
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ModelResult<T> = Result<T, ModelError>;

/// Which entity collection an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Client,
    Delivery,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Delivery => "delivery",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store-level error returned to command handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Insert/replace would make two entities share one identity.
    DuplicateIdentity { kind: EntityKind, identity: String },
    /// Replace/remove/lookup target is absent.
    NotFound { kind: EntityKind, identity: String },
    /// A delivery names a client that is not in the client collection.
    UnknownClientReference { client_name: String },
    /// An edit tried to give a delivery another id.
    DeliveryIdChanged {
        target: DeliveryId,
        edited: DeliveryId,
    },
    /// The next delivery id would not fit in `DeliveryId`.
    DeliveryIdsExhausted,
    /// `undo` was called with empty history.
    NoMoreUndo,
    /// Field value rejected before mutation.
    Validation(ValidationError),
}

impl ModelError {
    pub(crate) fn duplicate(kind: EntityKind, identity: impl Display) -> Self {
        Self::DuplicateIdentity {
            kind,
            identity: identity.to_string(),
        }
    }

    pub(crate) fn not_found(kind: EntityKind, identity: impl Display) -> Self {
        Self::NotFound {
            kind,
            identity: identity.to_string(),
        }
    }
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateIdentity { kind, identity } => {
                write!(f, "duplicate {kind}: `{identity}` already exists")
            }
            Self::NotFound { kind, identity } => write!(f, "{kind} not found: `{identity}`"),
            Self::UnknownClientReference { client_name } => {
                write!(f, "delivery references unknown client `{client_name}`")
            }
            Self::DeliveryIdChanged { target, edited } => write!(
                f,
                "delivery ids cannot change: edit of `{target}` carries id `{edited}`"
            ),
            Self::DeliveryIdsExhausted => write!(f, "no delivery ids left to assign"),
            Self::NoMoreUndo => write!(f, "no more commands to undo"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ModelError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
