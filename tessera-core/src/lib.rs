//! Core building blocks of the Tessera tile server.
//!
//! Everything here is transport-agnostic: the HTTP layer in the `tessera`
//! crate only translates [`tiles::TileReply`] and [`tiles::TileError`] into
//! responses.
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

/// Tile sources, the request pipeline, and metadata assembly
pub mod tiles;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;
