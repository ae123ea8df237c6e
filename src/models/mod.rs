//! Mail registry data models
//!
//! Defines the incoming and outgoing mail records exchanged between the
//! storage backends and the rest of the application, plus the persisted
//! license record.

pub mod license;
pub mod mail;

pub use license::*;
pub use mail::*;
