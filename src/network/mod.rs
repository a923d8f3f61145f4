//! Network layer - backend API client and the actor that drives it
//!
//! The Network actor receives API commands and sends back decoded replies.

pub mod actor;
pub mod client;
pub mod error;

pub use actor::NetworkActor;
pub use client::{ApiClient, LoginOutcome};
pub use error::ApiError;
