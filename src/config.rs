// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.openshift.com/api/assisted-install/v1";
pub const DEFAULT_SSO_URL: &str =
    "https://sso.redhat.com/auth/realms/redhat-external/protocol/openid-connect/token";

/// Resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub offline_token: String,
    pub api_url: String,
    pub sso_url: String,
}

/// Contents of a config file. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub offline_token: Option<String>,
    pub api_url: Option<String>,
    pub sso_url: Option<String>,
}

/// Values taken from the command line or its bound environment variables.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub offline_token: Option<String>,
    pub api_url: Option<String>,
}

impl FileConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read '{}': {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid TOML in '{}': {}", path.display(), e)))
    }
}

/// Standard config file locations, most specific first.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config").join("oaitool").join("config.toml"));
        paths.push(home.join(".oaitool").join("config.toml"));
    }
    paths.push(PathBuf::from(".oaitool").join("config.toml"));
    paths
}

impl Config {
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let file = match &overrides.config_file {
            Some(path) => {
                debug!("using config file {}", path.display());
                FileConfig::from_file(path)?
            }
            None => match search_paths().into_iter().find(|p| p.is_file()) {
                Some(path) => {
                    debug!("using config file {}", path.display());
                    FileConfig::from_file(&path)?
                }
                None => FileConfig::default(),
            },
        };
        Self::merge(overrides, file)
    }

    /// Flags and environment win over the file, the file wins over defaults.
    pub fn merge(overrides: &Overrides, file: FileConfig) -> Result<Self> {
        let offline_token = overrides
            .offline_token
            .clone()
            .or(file.offline_token)
            .map(|t| t.trim_end_matches(['\r', '\n']).to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Config("no offline token provided".into()))?;

        let api_url = overrides
            .api_url
            .clone()
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Config {
            offline_token,
            api_url: api_url.trim_end_matches('/').to_string(),
            sso_url: file.sso_url.unwrap_or_else(|| DEFAULT_SSO_URL.to_string()),
        })
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config:\n\tapi: {}\n\tsso: {}\n\toffline token: {} bytes",
            self.api_url,
            self.sso_url,
            self.offline_token.len()
        )
    }
}
