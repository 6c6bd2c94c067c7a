//! # desk-core
//!
//! Core types and scheduling for the service desk queue monitor.
//!
//! This crate provides:
//! - [`types`] - The ticket model and refresh batches
//! - [`generator`] - Mock ticket generation
//! - [`alert`] - Flash and chime scheduling for unassigned tickets
//! - [`refresh`] - The periodic queue refresh task
//! - [`chime`] - Audible alert backends
//! - [`client`] - External service client handle
//! - [`config`] - YAML configuration
//! - [`DeskError`] and [`logging`] - Errors and tracing setup
//!
//! ## Example
//!
//! ```no_run
//! use desk_core::{RefreshLoop, TicketGenerator};
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let (_refresh, mut batches) =
//!         RefreshLoop::start(TicketGenerator::new(), Duration::from_secs(10));
//!
//!     while let Some(batch) = batches.recv().await {
//!         println!("{} tickets, {} unassigned", batch.tickets.len(), batch.unassigned());
//!     }
//! }
//! ```

pub mod alert;
pub mod chime;
pub mod client;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod refresh;
pub mod types;

pub use alert::{AlertScheduler, AlertState};
pub use chime::{Chime, SilentChime, TerminalBell, Tone, chime_for};
pub use client::ServiceClient;
pub use config::{DeskConfig, SoundBackend};
pub use error::{DeskError, Result};
pub use generator::TicketGenerator;
pub use logging::{LogGuard, init_logging};
pub use refresh::RefreshLoop;
pub use types::{Batch, Priority, Ticket, TicketStatus, unassigned_count};
