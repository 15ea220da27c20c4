//! # Crate termux-rs
//!
//! ## termux-rs
//!
//! The `termux-rs` crate samples the hardware sensors of an Android phone
//! through the [`Termux:API`](https://wiki.termux.com/wiki/Termux-sensor)
//! `termux-sensor` command, keeps a bounded rolling window of normalized
//! readings in memory, appends the full history to a CSV log in batches, and
//! republishes the data to viewers as one-shot snapshots and independent
//! live feeds.
//!
//! Features include:
//! - Normalization of heterogeneous device sensor names onto a canonical
//!   group/axis schema, with zero-padding for missing data.
//! - A fixed-cadence sampling loop that tolerates per-tick failures.
//! - Batched durable CSV history with a final flush on shutdown.
//! - One independent push feed per subscriber, on the sampling cadence.
//! - A mock probe for development and tests without a device.

pub mod adapters;
pub(crate) mod constants;
mod log_writer;
pub mod models;
mod normalizer;
pub mod config;
pub mod ports;
pub mod services;
