use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use subst::VariableMap;
use tessera_core::tiles::{RepositoryOptions, TileRepository};
use tracing::{info, warn};
use url::Url;

use crate::config::file::srv::SrvConfig;
use crate::config::file::{
    ConfigFileError, ConfigFileResult, OptionsConfig, SourceConfig, UnrecognizedKeys,
    UnrecognizedValues, copy_unrecognized_keys_from_config,
};
use crate::{TesseraError, TesseraResult};

#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub srv: SrvConfig,

    /// Base URL of the `tiles` templates, used instead of the request host
    pub public_url: Option<String>,

    #[serde(default, skip_serializing_if = "OptionsConfig::is_default")]
    pub options: OptionsConfig,

    /// Source ID -> source
    #[serde(default)]
    pub data: BTreeMap<String, SourceConfig>,

    #[serde(flatten, skip_serializing)]
    pub unrecognized: UnrecognizedValues,
}

impl Config {
    /// Warn about unrecognized keys and normalize the public URL.
    /// Fails when there is nothing to serve.
    pub fn finalize(&mut self) -> TesseraResult<UnrecognizedKeys> {
        let mut res = UnrecognizedKeys::new();
        copy_unrecognized_keys_from_config(&mut res, "", &self.unrecognized);
        res.extend(
            self.options
                .get_unrecognized_keys()
                .into_iter()
                .map(|k| format!("options.{k}")),
        );
        for (id, source) in &self.data {
            res.extend(
                source
                    .get_unrecognized_keys()
                    .into_iter()
                    .map(|k| format!("data.{id}.{k}")),
            );
        }

        for key in &res {
            warn!(
                "Ignoring unrecognized configuration key '{key}'. Please check your configuration file for typos."
            );
        }

        if let Some(public_url) = &self.public_url {
            self.public_url = Some(parse_public_url(public_url)?);
        }

        if self.data.is_empty() {
            Err(ConfigFileError::NoSources.into())
        } else {
            Ok(res)
        }
    }

    /// Opens every configured source.
    /// The first source that cannot be registered aborts the startup.
    pub async fn resolve(&self) -> TesseraResult<TileRepository> {
        init_aws_lc_tls();

        let repo = TileRepository::new(RepositoryOptions {
            paths: self.options.paths.clone(),
            domains: self.options.domains.clone(),
            format_aliases: self.options.format_aliases.clone(),
            decorator: None,
        });
        for (id, source) in &self.data {
            repo.add(id, &source.params, self.public_url.as_deref())
                .await
                .map_err(|e| TesseraError::SourceError(id.clone(), e))?;
        }
        Ok(repo)
    }

    pub fn save_to_file(&self, file_name: &Path) -> ConfigFileResult<()> {
        let yaml = serde_yaml::to_string(&self).map_err(ConfigFileError::ConfigSerializeError)?;
        if file_name.as_os_str() == OsStr::new("-") {
            info!("Current system configuration:");
            println!("\n\n{yaml}\n");
            Ok(())
        } else {
            info!(
                "Saving config to {}, use --config to load it",
                file_name.display()
            );
            File::create(file_name)
                .map_err(|e| ConfigFileError::ConfigWriteError(e, file_name.to_path_buf()))?
                .write_all(yaml.as_bytes())
                .map_err(|e| ConfigFileError::ConfigWriteError(e, file_name.to_path_buf()))?;
            Ok(())
        }
    }
}

/// Read config from a file, substituting `${VAR}` references from `env`
pub fn read_config<'a, M>(file_name: &Path, env: &'a M) -> ConfigFileResult<Config>
where
    M: VariableMap<'a>,
    M::Value: AsRef<str>,
{
    let mut file =
        File::open(file_name).map_err(|e| ConfigFileError::ConfigLoadError(e, file_name.into()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| ConfigFileError::ConfigLoadError(e, file_name.into()))?;
    parse_config(&contents, env, file_name)
}

pub fn parse_config<'a, M>(contents: &str, env: &'a M, file_name: &Path) -> ConfigFileResult<Config>
where
    M: VariableMap<'a>,
    M::Value: AsRef<str>,
{
    subst::yaml::from_str(contents, env)
        .map_err(|e| ConfigFileError::ConfigParseError(e, file_name.into()))
}

/// The public URL must be an absolute http(s) URL. It always ends with a `/`.
pub fn parse_public_url(public_url: &str) -> TesseraResult<String> {
    let url = Url::parse(public_url)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .ok_or_else(|| TesseraError::PublicUrlError(public_url.to_string()))?;
    let url = url.as_str();
    if url.ends_with('/') {
        Ok(url.to_string())
    } else {
        Ok(format!("{url}/"))
    }
}

pub fn init_aws_lc_tls() {
    // https://github.com/rustls/rustls/issues/1877
    static INIT_TLS: LazyLock<()> = LazyLock::new(|| {
        if rustls::crypto::aws_lc_rs::default_provider()
            .install_default()
            .is_err()
        {
            warn!("A rustls crypto provider is already installed");
        }
    });
    *INIT_TLS;
}
