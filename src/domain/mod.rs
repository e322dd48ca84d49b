//! Domain layer - Core business entities and logic
//!
//! Contains the core domain models that represent business concepts
//! independent of infrastructure concerns, including the partial-update
//! field merge.

pub mod user;

pub use user::{User, UserDraft, UserPatch, UserResponse};
