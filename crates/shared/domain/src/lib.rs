//! # Domain Models
//!
//! Pure types shared by every crate of the service: configuration, constants and
//! the slice registry. Keep it lean: no I/O, networking, or heavy logic.

pub mod config;
pub mod constants;
pub mod registry;
