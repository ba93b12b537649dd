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

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::Overrides;
use crate::filter::{Attribute, MatchSpec};
use crate::validate::{validate, Kind};
use crate::wait::WaitPolicy;

#[derive(Debug, Parser)]
#[command(
    name = "oai-helper",
    version,
    about = "A tool for interacting with the OpenShift Assisted Installer API"
)]
pub struct Cmd {
    /// Path to config file (TOML, e.g. `offline-token = "..."`)
    ///
    /// Defaults to the first of ~/.config/oaitool/config.toml,
    /// ~/.oaitool/config.toml and .oaitool/config.toml that exists.
    #[arg(short = 'f', long, global = true)]
    pub config_file: Option<PathBuf>,

    /// Offline API token
    #[arg(short = 't', long, env = "OAI_OFFLINE_TOKEN", hide_env_values = true, global = true)]
    pub offline_token: Option<String>,

    /// Assisted installer API URL
    #[arg(short = 'u', long, env = "OAI_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Set logging verbosity
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Commands for interacting with clusters
    Cluster(ClusterCmd),
    /// Commands for interacting with hosts in a cluster
    Host(HostCmd),
    /// Show version information
    Version,
}

#[derive(Debug, Args)]
pub struct ClusterCmd {
    /// Cluster id or name
    #[arg(long, env = "OAI_CLUSTER", global = true)]
    pub cluster: Option<String>,

    #[command(subcommand)]
    pub command: ClusterCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClusterCommand {
    /// List available clusters
    List,
    /// Show details for a single cluster
    Show {
        /// Show full JSON data
        #[arg(short, long)]
        json: bool,
    },
    /// Get cluster status
    Status,
    /// Create an assisted installer cluster
    Create(CreateArgs),
    /// Delete the specified cluster
    Delete,
    /// Manage cluster install
    Install(InstallArgs),
    /// Set the API and ingress virtual IPs
    SetVips {
        #[arg(long)]
        api_vip: String,
        #[arg(long)]
        ingress_vip: String,
    },
    /// Get discovery image download url
    GetImageUrl {
        /// Discovery image type
        #[arg(long, default_value = "minimal-iso")]
        image_type: String,
        /// Public ssh key file baked into a newly generated image
        #[arg(long)]
        ssh_public_key: Option<PathBuf>,
    },
    /// Get cluster kubeconfig
    GetKubeconfig {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Get file from cluster
    GetFile {
        filename: String,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Wait until cluster reaches the named status
    WaitForStatus(WaitArgs),
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    pub name: String,
    /// Read pull secret from a file instead of the account API
    #[arg(long)]
    pub pull_secret: Option<PathBuf>,
    #[arg(long)]
    pub openshift_version: String,
    /// Base DNS domain
    #[arg(long)]
    pub base_domain: Option<String>,
    /// Public ssh key file
    #[arg(long)]
    pub ssh_public_key: Option<PathBuf>,
    #[arg(long, default_value = "OpenShiftSDN")]
    pub network_type: String,
    #[arg(long)]
    pub high_availability_mode: Option<String>,
    /// Override the OpenShift release image
    #[arg(long)]
    pub release_image: Option<String>,
}

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Start the installation
    #[arg(long)]
    pub start: bool,
    /// Cancel a running installation
    #[arg(long)]
    pub cancel: bool,
    /// Reset the cluster after a failed or cancelled installation
    #[arg(long)]
    pub reset: bool,
}

#[derive(Debug, Args)]
pub struct WaitArgs {
    pub status: String,
    /// Number of seconds to sleep between retries
    #[arg(long, default_value_t = 5)]
    pub interval: u64,
    /// Number of times to check status
    #[arg(long, default_value_t = 0)]
    pub retries: u32,
    /// Number of seconds after which we timeout
    #[arg(long, default_value_t = 0)]
    pub timeout: u64,
}

impl WaitArgs {
    pub fn policy(&self) -> WaitPolicy {
        WaitPolicy::from_secs(self.interval, self.retries, self.timeout)
    }
}

#[derive(Debug, Args)]
pub struct HostCmd {
    /// Cluster id or name
    #[arg(long, env = "OAI_CLUSTER", global = true)]
    pub cluster: Option<String>,

    #[command(subcommand)]
    pub command: HostCommand,
}

#[derive(Debug, Subcommand)]
pub enum HostCommand {
    /// List hosts in the given cluster
    List,
    /// Show details for a single host
    Show { host: String },
    /// Set hostnames: <host> <name> [<host> <name> ...]
    SetName { pairs: Vec<String> },
    /// Delete hosts from cluster
    Delete { hosts: Vec<String> },
    /// Find hosts matching criteria
    Find {
        /// Match criteria as key=value (mac, bmc_address, vendor, product)
        #[arg(short = 'm', long = "match")]
        matches: Vec<String>,
    },
    /// Wait until hosts in cluster reach the named status
    WaitForStatus {
        #[command(flatten)]
        wait: WaitArgs,
        /// Wait until this many hosts achieve target status (0 = all)
        #[arg(long, default_value_t = 0)]
        hosts: usize,
    },
}

fn cluster_ident(cluster: &Option<String>) -> Result<&str> {
    match cluster.as_deref() {
        Some(c) if !c.is_empty() => Ok(c),
        _ => bail!("no cluster name provided"),
    }
}

impl ClusterCmd {
    pub fn cluster_ident(&self) -> Result<&str> {
        cluster_ident(&self.cluster)
    }
}

impl HostCmd {
    pub fn cluster_ident(&self) -> Result<&str> {
        cluster_ident(&self.cluster)
    }
}

pub fn parse_match_specs(raw: &[String]) -> Result<Vec<MatchSpec>> {
    raw.iter()
        .map(|s| s.parse::<MatchSpec>().map_err(anyhow::Error::from))
        .collect()
}

impl Cmd {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config_file: self.config_file.clone(),
            offline_token: self.offline_token.clone(),
            api_url: self.api_url.clone(),
        }
    }

    /// Reject bad arguments before any network traffic, including the
    /// token exchange.
    pub fn preflight(&self) -> Result<()> {
        match &self.command {
            Command::Version => {}
            Command::Cluster(c) => {
                match &c.command {
                    ClusterCommand::List => return Ok(()),
                    ClusterCommand::Create(args) => {
                        validate(Kind::NetworkType, &args.network_type)?;
                        return Ok(());
                    }
                    ClusterCommand::GetImageUrl { image_type, .. } => {
                        validate(Kind::ImageType, image_type)?
                    }
                    ClusterCommand::GetFile { filename, .. } => {
                        validate(Kind::DownloadFile, filename)?
                    }
                    ClusterCommand::WaitForStatus(w) => validate(Kind::ClusterStatus, &w.status)?,
                    _ => {}
                }
                c.cluster_ident()?;
            }
            Command::Host(h) => {
                match &h.command {
                    HostCommand::SetName { pairs } => {
                        if pairs.is_empty() {
                            bail!("no hostnames provided");
                        }
                        if pairs.len() % 2 != 0 {
                            bail!("wrong number of arguments");
                        }
                    }
                    HostCommand::Delete { hosts } if hosts.is_empty() => {
                        bail!("no hostnames provided")
                    }
                    HostCommand::Find { matches } => {
                        for spec in parse_match_specs(matches)? {
                            spec.key.parse::<Attribute>()?;
                        }
                    }
                    HostCommand::WaitForStatus { wait, .. } => {
                        validate(Kind::HostStatus, &wait.status)?
                    }
                    _ => {}
                }
                h.cluster_ident()?;
            }
        }
        Ok(())
    }
}
