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

use std::io::{stdout, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::cmdline::{ClusterCmd, ClusterCommand, CreateArgs, InstallArgs, WaitArgs};
use crate::download;
use crate::models::{Cluster, ClusterCreateParams, ClusterNetworkPatch, PullSecret};
use crate::output;
use crate::resolve::find_cluster;
use crate::wait::{wait_for_cluster_status, SystemClock};

pub fn run(client: &ApiClient, cmd: &ClusterCmd) -> Result<()> {
    let find = || -> Result<Cluster> {
        let cluster = find_cluster(client, cmd.cluster_ident()?)?;
        debug!("found cluster {}", cluster.id);
        Ok(cluster)
    };

    match &cmd.command {
        ClusterCommand::List => list(client),
        ClusterCommand::Create(args) => create(client, args),
        ClusterCommand::Show { json } => show(&find()?, *json),
        ClusterCommand::Status => {
            println!("{}", find()?.status);
            Ok(())
        }
        ClusterCommand::Delete => {
            let cluster = find()?;
            info!("deleting cluster {}", cluster.name);
            client.delete_cluster(&cluster.id)?;
            Ok(())
        }
        ClusterCommand::Install(args) => install(client, &find()?, args),
        ClusterCommand::SetVips {
            api_vip,
            ingress_vip,
        } => set_vips(client, &find()?, api_vip, ingress_vip),
        ClusterCommand::GetImageUrl {
            image_type,
            ssh_public_key,
        } => image_url(client, find()?, image_type, ssh_public_key.as_deref()),
        ClusterCommand::GetKubeconfig { output } => {
            let kubeconfig = client.get_kubeconfig(&find()?.id)?;
            download::save(&kubeconfig, output.as_deref())
        }
        ClusterCommand::GetFile { filename, output } => {
            let content = client.get_file(&find()?.id, filename)?;
            download::save(&content, output.as_deref())
        }
        ClusterCommand::WaitForStatus(args) => wait_for_status(client, find()?, args),
    }
}

fn list(client: &ApiClient) -> Result<()> {
    let clusters = client.list_clusters()?;
    output::cluster_list(&mut stdout().lock(), &clusters)?;
    Ok(())
}

fn show(cluster: &Cluster, json: bool) -> Result<()> {
    let mut out = stdout().lock();
    if json {
        output::cluster_json(&mut out, cluster)?;
    } else {
        output::cluster_detail(&mut out, cluster)?;
    }
    Ok(())
}

fn read_ssh_key(path: &Path) -> Result<String> {
    debug!("reading ssh key from {}", path.display());
    let key = std::fs::read_to_string(path)
        .with_context(|| format!("reading ssh key '{}'", path.display()))?;
    Ok(key.trim_end().to_string())
}

fn create(client: &ApiClient, args: &CreateArgs) -> Result<()> {
    let pull_secret = match &args.pull_secret {
        Some(path) => PullSecret::from_file(path)
            .with_context(|| format!("reading pull secret '{}'", path.display()))?,
        None => client.get_pull_secret()?,
    };

    let params = ClusterCreateParams {
        name: args.name.clone(),
        openshift_version: args.openshift_version.clone(),
        pull_secret: pull_secret.to_json()?,
        base_dns_domain: args.base_domain.clone(),
        high_availability_mode: args.high_availability_mode.clone(),
        network_type: Some(args.network_type.clone()),
        ocp_release_image: args.release_image.clone(),
        ssh_public_key: args
            .ssh_public_key
            .as_deref()
            .map(read_ssh_key)
            .transpose()?,
    };

    info!("creating cluster {}", params.name);
    debug!(
        "openshift version {}, network type {:?}, base domain {:?}",
        params.openshift_version, params.network_type, params.base_dns_domain
    );
    let cluster = client.create_cluster(&params)?;

    println!("{} {}", cluster.name, cluster.id);
    Ok(())
}

fn install(client: &ApiClient, cluster: &Cluster, args: &InstallArgs) -> Result<()> {
    let mut acted = false;

    if args.start {
        info!("starting install of cluster {} ({})", cluster.name, cluster.id);
        client.install_cluster(&cluster.id)?;
        acted = true;
    }
    if args.cancel {
        info!("cancelling install of cluster {} ({})", cluster.name, cluster.id);
        client.cancel_cluster(&cluster.id)?;
        acted = true;
    }
    if args.reset {
        info!("resetting cluster {} ({})", cluster.name, cluster.id);
        client.reset_cluster(&cluster.id)?;
        acted = true;
    }

    if !acted {
        warn!("no action specified");
    }
    Ok(())
}

fn set_vips(client: &ApiClient, cluster: &Cluster, api_vip: &str, ingress_vip: &str) -> Result<()> {
    if cluster.machine_network_cidr.is_empty() {
        bail!("cluster does not have a machine network defined");
    }

    let patch = ClusterNetworkPatch {
        api_vip: api_vip.to_string(),
        ingress_vip: ingress_vip.to_string(),
        vip_dhcp_allocation: false,
    };
    let cluster = client.patch_cluster(&cluster.id, &patch)?;
    info!(
        "cluster {} api vip {} ingress vip {}",
        cluster.name, cluster.api_vip, cluster.ingress_vip
    );
    Ok(())
}

fn image_url(
    client: &ApiClient,
    mut cluster: Cluster,
    image_type: &str,
    ssh_public_key: Option<&Path>,
) -> Result<()> {
    if cluster.image_info.download_url.is_empty() {
        let key = ssh_public_key.map(read_ssh_key).transpose()?.unwrap_or_default();

        info!("generating discovery image");
        cluster = client.create_discovery_image(&cluster.id, image_type, &key)?;
        if cluster.image_info.download_url.is_empty() {
            bail!("failed to retrieve discovery image url");
        }
    }

    debug!("image info: {:?}", cluster.image_info);
    let mut out = stdout().lock();
    writeln!(out, "{}", cluster.image_info.download_url)?;
    Ok(())
}

fn wait_for_status(client: &ApiClient, cluster: Cluster, args: &WaitArgs) -> Result<()> {
    info!(
        "waiting for cluster {} to reach status {}",
        cluster.name, args.status
    );
    wait_for_cluster_status(&args.policy(), &SystemClock, cluster, &args.status, |c| {
        client.get_cluster(&c.id)
    })?;
    Ok(())
}
