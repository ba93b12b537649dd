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

use std::io::stdout;

use anyhow::Result;
use tracing::{debug, info};

use crate::client::ApiClient;
use crate::cmdline::{parse_match_specs, HostCmd, HostCommand, WaitArgs};
use crate::filter::filter_hosts;
use crate::models::{Cluster, HostName};
use crate::output;
use crate::resolve::{find_cluster, find_host};
use crate::wait::{host_target, wait_for_host_status, SystemClock};

pub fn run(client: &ApiClient, cmd: &HostCmd) -> Result<()> {
    let cluster = find_cluster(client, cmd.cluster_ident()?)?;
    debug!("found cluster {}", cluster.id);

    match &cmd.command {
        HostCommand::List => {
            output::host_list(&mut stdout().lock(), &cluster.hosts)?;
        }
        HostCommand::Show { host } => {
            let host = find_host(client, &cluster, host)?;
            output::host_detail(&mut stdout().lock(), &host)?;
        }
        HostCommand::SetName { pairs } => set_names(client, &cluster, pairs)?,
        HostCommand::Delete { hosts } => {
            for name in hosts {
                let host = find_host(client, &cluster, name)?;
                info!("deleting host {} ({})", name, host.id);
                client.delete_host(&cluster.id, &host.id)?;
            }
        }
        HostCommand::Find { matches } => {
            let specs = parse_match_specs(matches)?;
            let selected = filter_hosts(&cluster.hosts, &specs)?;
            output::host_list(&mut stdout().lock(), &selected)?;
        }
        HostCommand::WaitForStatus { wait, hosts } => {
            wait_for_status(client, cluster, wait, *hosts)?
        }
    }
    Ok(())
}

fn set_names(client: &ApiClient, cluster: &Cluster, pairs: &[String]) -> Result<()> {
    let mut names = Vec::with_capacity(pairs.len() / 2);
    for pair in pairs.chunks_exact(2) {
        let host = find_host(client, cluster, &pair[0])?;
        info!("setting hostname {} = {}", host.id, pair[1]);
        names.push(HostName {
            id: host.id,
            hostname: pair[1].clone(),
        });
    }
    client.set_hostnames(&cluster.id, names)?;
    Ok(())
}

fn wait_for_status(client: &ApiClient, cluster: Cluster, args: &WaitArgs, hosts: usize) -> Result<()> {
    let count = host_target(&cluster, hosts);

    info!(
        "waiting for {} hosts in cluster {} to reach status {}",
        count, cluster.name, args.status
    );
    wait_for_host_status(
        &args.policy(),
        &SystemClock,
        cluster,
        &args.status,
        count,
        |c| client.get_cluster(&c.id),
    )?;
    Ok(())
}
