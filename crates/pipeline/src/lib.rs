//! Change-triggered pricing pipeline.
//!
//! This crate provides:
//! - Content fingerprints of the input tables (SHA-256) and change detection
//! - Streaming CSV readers for the products and sales tables
//! - Atomic (write-then-rename) output of the priced table
//! - [`Pipeline`]: one pass per detected change, with per-row failure isolation
//! - A `notify`-backed trigger source and the async watch loop

pub mod error;
pub mod fingerprint;
pub mod orchestrator;
pub mod service;
pub mod table;
pub mod watcher;

pub use error::{PassError, WatchError};
pub use fingerprint::{fingerprint, has_changed, ChangeDetector, Fingerprint};
pub use orchestrator::{PassOutcome, PassReport, PricedRows, Pipeline, PipelineStats, RowOutcome};
pub use service::{shutdown_signal, watch_loop};
pub use watcher::TriggerSource;
