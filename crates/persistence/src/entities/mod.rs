//! Database entity definitions.
//!
//! Entities mirror table rows (`sqlx::FromRow`) and convert into domain
//! models with `TryFrom`, failing with a decode error when a stored enum
//! string no longer matches a known variant.

pub mod family_profile;
pub mod invite;
pub mod magic_link_token;
pub mod notification;
pub mod registration_request;
pub mod visit_slot;

pub use family_profile::FamilyProfileEntity;
pub use invite::InviteEntity;
pub use magic_link_token::MagicLinkTokenEntity;
pub use notification::{NotificationEntity, PendingNotificationEntity};
pub use registration_request::RegistrationRequestEntity;
pub use visit_slot::{ScheduleSlotEntity, VisitSlotEntity};

/// Maps an enum-parse failure into a sqlx decode error.
pub(crate) fn decode_error(err: domain::models::UnknownVariant) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}
