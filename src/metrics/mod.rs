//! Stats collection across many containers.
//!
//! A [`RequestBatch`] is built from the enumerated containers minus the
//! excluded ones and handed to [`collect_metrics`], which dispatches the
//! requests through a fixed-size pool and waits for all of them.
mod batch;
mod fanout;

pub use batch::{RequestBatch, StatsRequest, build_batch};
pub use fanout::{BatchReport, DEFAULT_WORKERS, FetchError, FetchFailure, collect_metrics};
