//! Core types and trait definitions for the privacy dashboard.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod application;
pub mod consent;
pub mod error;
pub mod message;
pub mod notice;
pub mod notification;
pub mod questionnaire;
pub mod request;
pub mod role;
pub mod store;
pub mod user;

pub use error::{Entity, Error, Result};
