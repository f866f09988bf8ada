//! coursetrack-core — progress, scoring, and deadline engine.
//!
//! This crate defines the fundamental data model, trait seams, and the
//! progress/deadline logic that the entire coursetrack system builds on.

pub mod classify;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod progress;
pub mod scoring;
pub mod traits;
