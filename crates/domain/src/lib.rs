//! Domain layer for the Family Visits backend.
//!
//! This crate contains:
//! - Domain models (profiles, visit slots, notifications, registration
//!   requests, invites, magic-link tokens)
//! - Pure business rules (Sabbath blocking, message templates, the
//!   registration dialogue, token validation)
//! - The outbound messaging abstraction

pub mod models;
pub mod services;
