//! Client for Llama-Stack-compatible services
//!
//! Architecture follows the project pattern (trait + impl + mock):
//! - `StackClient` trait: async interface to the service's probe-relevant
//!   endpoints (provider listing, vector-db registration, health, read-back)
//! - `HttpStackClient`: real implementation over HTTP
//! - `MockStackClient`: scripted mock with a call log for tests

pub mod client;
pub mod mock;
pub mod models;
pub mod traits;

pub use client::HttpStackClient;
pub use mock::MockStackClient;
pub use models::*;
pub use traits::StackClient;
