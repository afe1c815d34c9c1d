//! HTTP tile server for `PMTiles` and `MBTiles` sources.
//!
//! The server exposes three kinds of resources:
//! - `/data/{source_id}/{z}/{x}/{y}.{format}` tiles, always gzip-encoded
//! - `/data/{source_id}.json` `TileJSON` documents with absolute tile URLs
//! - `/catalog` and `/health`
//!
//! Tile logic lives in [`tessera_core`]. This crate only reads the configuration,
//! starts the server, and maps pipeline outcomes to HTTP statuses.
#![forbid(unsafe_code)]

pub mod config;
pub mod logging;
pub mod srv;

mod utils;
pub use utils::{IdResolver, TesseraError, TesseraResult};
