//! # Daybook Architecture
//!
//! Daybook is a **UI-agnostic journal engine**. This is not a CLI
//! application that happens to have some library code, it is a library
//! that happens to ship a CLI client.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns one load → mutate → save cycle                      │
//! │  - Backup, hook dispatch, single full-file write            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Pure business logic returning structured CmdResult       │
//! │  - No I/O assumptions whatsoever                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine (store/, filter/, tags/, format.rs, model.rs)       │
//! │  - ContentStore with id-addressed mutation                  │
//! │  - Filter engine with ordering and truncation contracts     │
//! │  - Span-based tag mutation and the autotagger               │
//! │  - Lossless text round-trip                                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: deterministic, explicit effects
//!
//! From `api.rs` inward, code takes regular arguments (including an
//! explicit `now` for anything date-shaped), returns regular values, and
//! never prints. The single externally observable side effect of a
//! command execution is the journal file write in `Daybook::save`, which
//! serializes the whole store in memory and writes it in one shot.
//!
//! ## Module Overview
//!
//! - [`api`]: the facade owning the load → mutate → save cycle
//! - [`commands`]: business logic per operation
//! - [`store`]: the content store and archive/rotate selection
//! - [`format`]: text parsing and serialization, round-trip safe
//! - [`filter`]: criteria evaluation and date resolution
//! - [`tags`]: tag tokenizer, primitives, and the autotagger
//! - [`model`]: `Item`, `Note`, `Section` value types
//! - [`config`]: JSON configuration and saved views
//! - [`export`]: renderer and import adapter contracts
//! - [`hooks`]: synchronous observer extension points
//! - [`editor`]: external editor round-trips
//! - [`error`]: the error enum
//! - `cli`: argument parsing and terminal rendering for the binary

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod filter;
pub mod format;
pub mod hooks;
pub mod model;
pub mod store;
pub mod tags;
