//! # Scanlist Architecture
//!
//! Scanlist is the ingestion core behind a barcode-scanning keyboard. A capture
//! surface decodes codes; they either land in a named list on disk or get typed
//! into whatever field the keyboard is attached to. This crate is the library;
//! the `scanlist` binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (scanlist crate)                                       │
//! │  - Parses arguments, renders CmdResult, owns exit codes     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Normalizes inputs (positions → ids, defaults from config)│
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Business logic, returns CmdResult                        │
//! └─────────────────────────────────────────────────────────────┘
//!              │                                  │
//!              ▼                                  ▼
//! ┌──────────────────────────────┐  ┌───────────────────────────┐
//! │  Ingestion (ingest.rs)       │  │  Handoff (handoff/)       │
//! │  - debounce + bucketed upsert│  │  - pending batch, last    │
//! │  - only writer of items      │  │    mode/list, known lists │
//! └──────────────────────────────┘  └───────────────────────────┘
//!              │
//!              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - DataStore trait; FsBackend (production), MemBackend      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward nothing writes to stdout/stderr or exits the process.
//! Diagnostics go through `tracing`; the binary decides whether anyone sees them.
//!
//! ## Module Overview
//!
//! - [`api`]: The facade
//! - [`commands`]: Business logic per area
//! - [`ingest`]: Deduplicating ingestion service
//! - [`store`]: Durable lists and items
//! - [`handoff`]: Cross-process channel
//! - [`export`]: CSV serializer
//! - [`text`]: Text projection for insertion
//! - [`route`]: Activation addresses
//! - [`config`]: Configuration
//! - [`init`]: Directory resolution and wiring
//! - [`clock`], [`telemetry`]: Injectable time source and outcome sink
//! - [`model`], [`error`]: Core types

pub mod api;
pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod handoff;
pub mod ingest;
pub mod init;
pub mod model;
pub mod route;
pub mod store;
pub mod telemetry;
pub mod text;
