//! Core engine for automated Maven POM version upgrades: version ordering
//! strategies, candidate selection and a minimal-diff XML rewriter. The
//! binary in `main.rs` is a thin driver over these modules.

pub mod cli;
pub mod error;
pub mod maven;
pub mod ordering;
pub mod pom;
pub mod repository;
pub mod rewrite;
pub mod select;
pub mod workflow;

pub use error::{PomupError, Result};
