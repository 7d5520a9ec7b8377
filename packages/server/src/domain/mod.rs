//! Domain layer: entities, the participant roster, the per-connection
//! session record, and the collaborator traits the relay consumes.
//!
//! The collaborator traits ([`IdentityVerifier`], [`MessageStore`]) are
//! defined here and implemented in the infrastructure layer, keeping the
//! use cases independent of the concrete providers (dependency inversion).

mod identity;
mod message;
mod roster;
mod session;

pub use identity::{IdentityVerifier, VerifiedIdentity, VerifyError};
pub use message::{ChatMessage, MessageStore, StoreError, StoredMessage};
pub use roster::{ConnectionId, ParticipantRegistry, RosterEntry};
pub use session::{ANONYMOUS_NAME, Session, SessionState, resolve_display_name};
