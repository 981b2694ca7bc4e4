//! Allocation and conflict engine for construction-project scheduling.
//!
//! Measures the current schedule and flags violations for a human to
//! resolve. It never chooses assignments or fixes conflicts on its own.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Interval`, `Assignment`, `Phase`, `Task`, `Project`
//! - **`allocation`**: Per-member workload totals, snapshots, and timelines
//! - **`conflict`**: Phase-overlap and resource over-allocation detection
//! - **`concurrency`**: Optimistic concurrency via version counters
//! - **`quota`**: Append-only modification ledger with a hard count cap
//! - **`validation`**: Input integrity checks (duplicate IDs, phase refs, percentages)
//! - **`store`**: Storage collaborator trait and an in-memory implementation
//! - **`engine`**: Facade binding the components to a store
//!
//! # Architecture
//!
//! Every component is a pure function over caller-supplied data and holds
//! no shared mutable state, so it can be called from any number of request
//! threads without locking. The only race lives at the storage boundary,
//! where the store must provide compare-and-swap on version.
//!
//! Over-allocation and overlapping phases are valid, representable states:
//! they are reported, never rejected. Only malformed input, stale versions,
//! missing records and an exhausted modification quota are hard errors.

pub mod allocation;
pub mod concurrency;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod models;
pub mod quota;
pub mod store;
pub mod validation;

pub use engine::SchedulingEngine;
pub use error::{EngineError, ErrorKind, Result};
