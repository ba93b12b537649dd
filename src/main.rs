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

mod client;
mod cluster;
mod cmdline;
mod config;
mod download;
mod error;
mod filter;
mod host;
mod models;
mod output;
mod resolve;
mod validate;
mod wait;

use crate::client::ApiClient;
use crate::cmdline::*;
use crate::config::Config;
use anyhow::{Context, Result};
use clap::{crate_version, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,oai_helper={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn version_info() -> String {
    format!(
        "Build version: {}\nBuild ref: {}\nBuild date: {}",
        crate_version!(),
        env!("OAI_BUILD_REF"),
        env!("OAI_BUILD_DATE")
    )
}

fn connect(cmd: &Cmd) -> Result<ApiClient> {
    let config = Config::load(&cmd.overrides())?;
    debug!("{}", config);
    ApiClient::connect(&config).context("failed to create api client")
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    init_logging(cmd.verbose);
    cmd.preflight()?;

    match &cmd.command {
        Command::Cluster(c) => cluster::run(&connect(&cmd)?, c),
        Command::Host(h) => host::run(&connect(&cmd)?, h),
        Command::Version => {
            println!("{}", version_info());
            Ok(())
        }
    }
}
