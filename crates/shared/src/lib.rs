//! Shared utilities and common types for the Family Visits backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cryptographic utilities (token and invite-code generation)
//! - Phone number normalization and lookup variants
//! - Session JWT encoding/validation

pub mod crypto;
pub mod jwt;
pub mod phone;
