//! Business logic services.

pub mod calendar;
pub mod dialogue;
pub mod messaging;
pub mod templates;

pub use messaging::{MockWhatsAppSender, SendOutcome, WhatsAppSender};
