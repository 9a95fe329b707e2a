//! # DevConnect Core
//!
//! The domain layer of the DevConnect backend.
//! This crate holds the entities, the tag and slug rules, the session resolver
//! and the ports that infrastructure implements. It has no I/O of its own.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
