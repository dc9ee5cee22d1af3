//! Shared types, models and the pure recommendation engine for TreeMatch
//!
//! This crate contains everything that is synchronous and side-effect free:
//! the domain models shared between the backend and the browser (via WASM),
//! input validation, and the scoring, seasonal and success estimation logic.

pub mod engine;
pub mod models;
pub mod types;
pub mod validation;

pub use engine::*;
pub use models::*;
pub use types::*;
pub use validation::*;
