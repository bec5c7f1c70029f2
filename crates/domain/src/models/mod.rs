//! Domain models for the Family Visits backend.

pub mod dashboard;
pub mod invite;
pub mod magic_link;
pub mod notification;
pub mod profile;
pub mod registration;
pub mod visit_slot;

pub use invite::Invite;
pub use magic_link::MagicLinkToken;
pub use notification::Notification;
pub use profile::FamilyProfile;
pub use registration::RegistrationRequest;
pub use visit_slot::VisitSlot;

use thiserror::Error;

/// Error returned when a stored string does not match any enum variant.
#[derive(Debug, Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
