use std::fmt::Write as _;
use std::io;

use tessera_core::tiles::TileError;

use crate::config::file::ConfigFileError;

/// A convenience [`Result`] for the Tessera crate.
pub type TesseraResult<T> = Result<T, TesseraError>;

fn elide_vec(vec: &[String], max_items: usize, max_len: usize) -> String {
    let mut s = String::new();
    for (i, v) in vec.iter().enumerate() {
        if i > max_items {
            let _ = write!(s, " and {} more", vec.len() - i);
            break;
        }
        if i > 0 {
            s.push(' ');
        }
        if let Some((cut, _)) = v.char_indices().nth(max_len) {
            s.push_str(&v[..cut]);
            s.push('…');
        } else {
            s.push_str(v);
        }
    }
    s
}

#[derive(thiserror::Error, Debug)]
pub enum TesseraError {
    #[error("The --config and the file parameters cannot be used together. Please remove unsupported parameters '{}'", elide_vec(.0, 3, 15))]
    ConfigAndConnectionsError(Vec<String>),

    #[error("Unrecognizable tile files: {0:?}. Use a .pmtiles or .mbtiles file, or an http(s) URL of a PMTiles archive")]
    UnrecognizableConnections(Vec<String>),

    #[error("Public URL must be an absolute http(s) URL, but is '{0}'")]
    PublicUrlError(String),

    #[error("Unable to bind to {1}: {0}")]
    BindingError(io::Error, String),

    #[error("Unable to register source {0}: {1}")]
    SourceError(String, #[source] TileError),

    #[error(transparent)]
    ConfigFileError(#[from] ConfigFileError),

    #[error(transparent)]
    IoError(#[from] io::Error),
}
