//! coursetrack-report — read-side dashboard aggregation.
//!
//! Summarizes progress, classification, and attempt activity across the
//! whole population. Strictly read-only; a store failure degrades to an
//! empty snapshot instead of propagating.

pub mod dashboard;

pub use dashboard::{DashboardAggregator, DashboardSnapshot};
