//! Application services.

mod coverage;
mod dispatcher;
mod magic_link;
mod registration;
mod whatsapp;

pub use coverage::CoverageService;
pub use dispatcher::NotificationDispatcher;
pub use magic_link::MagicLinkService;
pub use registration::{AdminAction, RegistrationAction, RegistrationService};
pub use whatsapp::TwilioWhatsAppService;
