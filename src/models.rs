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

//! Wire types for the assisted installer API.
//!
//! Every struct tolerates missing fields: list responses only carry a
//! summary of each cluster, and host inventories come from heterogeneous
//! discovery agents.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    pub href: String,
    pub kind: String,
    pub openshift_version: String,
    pub ocp_release_image: String,
    pub base_dns_domain: String,
    pub api_vip: String,
    pub ingress_vip: String,
    pub machine_network_cidr: String,
    pub cluster_network_cidr: String,
    pub cluster_network_host_prefix: i64,
    pub service_network_cidr: String,
    pub vip_dhcp_allocation: bool,
    pub network_type: String,
    pub high_availability_mode: String,
    pub user_managed_networking: bool,
    pub schedulable_masters: bool,
    pub ssh_public_key: String,
    pub status: String,
    pub status_info: String,
    pub status_updated_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub install_started_at: Option<DateTime<Utc>>,
    pub install_completed_at: Option<DateTime<Utc>>,
    pub enabled_host_count: i64,
    pub total_host_count: i64,
    pub hosts: Vec<Host>,
    pub image_info: ImageInfo,
    pub progress: Progress,
    pub pull_secret_set: bool,
    pub org_id: String,
    pub user_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub current_stage: String,
    pub stage_started_at: Option<DateTime<Utc>>,
    pub stage_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageInfo {
    pub download_url: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub image_type: String,
    pub size_bytes: i64,
    pub ssh_public_key: String,
    pub generator_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Host {
    pub id: String,
    pub cluster_id: String,
    pub href: String,
    pub kind: String,
    pub role: String,
    pub bootstrap: bool,
    pub status: String,
    pub status_info: String,
    pub requested_hostname: String,
    /// Raw JSON document; see [`Host::inventory`].
    pub inventory: String,
    pub progress: Progress,
    pub installation_disk_path: String,
    pub discovery_agent_version: String,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Host {
    /// Parse the inventory reported by the discovery agent. Parsed again on
    /// every call.
    pub fn inventory(&self) -> Result<HostInventory> {
        Ok(serde_json::from_str(&self.inventory)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HostInventory {
    pub bmc_address: String,
    pub hostname: String,
    pub cpu: Cpu,
    pub memory: Memory,
    pub disks: Vec<Disk>,
    pub interfaces: Vec<Interface>,
    pub system_vendor: SystemVendor,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Cpu {
    pub architecture: String,
    pub count: i64,
    pub model_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Memory {
    pub physical_bytes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Disk {
    pub name: String,
    pub bootable: bool,
    pub model: String,
    pub serial: String,
    pub vendor: String,
    pub size_bytes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Interface {
    pub name: String,
    pub mac_address: String,
    pub mtu: i64,
    pub speed_mbps: i64,
    pub ipv4_addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SystemVendor {
    pub manufacturer: String,
    pub product_name: String,
    pub serial_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullSecret {
    pub auths: BTreeMap<String, PullSecretCredential>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullSecretCredential {
    pub auth: String,
    #[serde(default)]
    pub email: String,
}

impl PullSecret {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        debug!("reading pull secret from {}", path.as_ref().display());
        let data = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&data)?)
    }

    /// The encoding expected in `ClusterCreateParams::pull_secret`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterCreateParams {
    pub name: String,
    pub openshift_version: String,
    pub pull_secret: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dns_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_availability_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocp_release_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterNetworkPatch {
    pub api_vip: String,
    pub ingress_vip: String,
    pub vip_dhcp_allocation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostNameList {
    pub hosts_names: Vec<HostName>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostName {
    pub id: String,
    pub hostname: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageCreateParams {
    pub image_type: String,
    pub ssh_public_key: String,
}
