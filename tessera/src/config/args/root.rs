use std::path::{Path, PathBuf};

use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use url::Url;

use crate::config::file::{Config, SourceConfig};
use crate::config::args::srv::SrvArgs;
use crate::{IdResolver, TesseraError, TesseraResult};

/// Defines the styles used for the CLI help output.
const HELP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Blue.on_default().bold())
    .usage(AnsiColor::Blue.on_default().bold())
    .literal(AnsiColor::White.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug, PartialEq, Default)]
#[command(
    about,
    version,
    after_help = "Use RUST_LOG environment variable to control logging level, e.g. RUST_LOG=debug or RUST_LOG=tessera=debug, and TESSERA_FORMAT to pick the log format (full, compact, pretty or json).",
    styles = HELP_STYLES
)]
pub struct Args {
    #[command(flatten)]
    pub meta: MetaArgs,
    #[command(flatten)]
    pub srv: SrvArgs,
}

// None of these params will be transferred to the config
#[derive(Parser, Debug, Clone, PartialEq, Default)]
#[command(about, version)]
pub struct MetaArgs {
    /// Path to config file. If set, no tile files are allowed on the command line.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Save resulting config to a file or use "-" to print to stdout.
    #[arg(long)]
    pub save_config: Option<PathBuf>,
    /// Tile files to serve, e.g. `/path/to/world.mbtiles` or `https://example.com/sample.pmtiles`
    pub connection: Vec<String>,
}

impl Args {
    pub fn merge_into_config(self, config: &mut Config) -> TesseraResult<()> {
        if self.meta.config.is_some() && !self.meta.connection.is_empty() {
            return Err(TesseraError::ConfigAndConnectionsError(self.meta.connection));
        }

        if self.srv.public_url.is_some() {
            config.public_url.clone_from(&self.srv.public_url);
        }
        self.srv.merge_into_config(&mut config.srv);

        if !self.meta.connection.is_empty() {
            parse_file_args(self.meta.connection, config)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Pmtiles,
    Mbtiles,
}

/// The kind of a tile file is taken from its extension. URLs without a known
/// extension are assumed to be `PMTiles` archives.
fn file_kind(locator: &str) -> Option<FileKind> {
    let is_url = Url::parse(locator).is_ok_and(|url| matches!(url.scheme(), "http" | "https"));
    let path = if is_url {
        last_url_segment(locator)
    } else {
        locator.to_string()
    };
    match Path::new(&path).extension().and_then(|ext| ext.to_str()) {
        Some("pmtiles") => Some(FileKind::Pmtiles),
        Some("mbtiles") => Some(FileKind::Mbtiles),
        _ if is_url => Some(FileKind::Pmtiles),
        _ => None,
    }
}

fn last_url_segment(locator: &str) -> String {
    Url::parse(locator)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .unwrap_or_default()
}

/// The file stem of a path, or of the last segment of a URL path.
fn source_name(locator: &str) -> String {
    let path = match Url::parse(locator) {
        Ok(url) if url.has_host() => last_url_segment(locator),
        _ => locator.to_string(),
    };
    Path::new(&path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "source".to_string())
}

/// Adds each file given on the command line as a source, named after the file.
fn parse_file_args(connections: Vec<String>, config: &mut Config) -> TesseraResult<()> {
    let mut resolver = IdResolver::new();
    let mut unrecognized = Vec::new();
    for locator in connections {
        let Some(kind) = file_kind(&locator) else {
            unrecognized.push(locator);
            continue;
        };
        let id = resolver.resolve(&source_name(&locator), &locator);
        let source = match kind {
            FileKind::Pmtiles => SourceConfig::pmtiles(locator),
            FileKind::Mbtiles => SourceConfig::mbtiles(locator),
        };
        config.data.insert(id, source);
    }
    if unrecognized.is_empty() {
        Ok(())
    } else {
        Err(TesseraError::UnrecognizableConnections(unrecognized))
    }
}
