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

//! Resolve an argument that may be either a resource id or its name.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::models::{Cluster, Host};

/// Direct fetch by id plus a full listing to scan for names.
pub trait Lookup {
    type Resource;

    fn fetch(&self, id: &str) -> Result<Self::Resource>;

    fn list(&self) -> Result<Vec<Self::Resource>>;

    /// Id of a listed resource, used to re-fetch its full detail.
    fn id_of<'r>(&self, resource: &'r Self::Resource) -> &'r str;

    fn matches_name(&self, resource: &Self::Resource, name: &str) -> bool;
}

/// Try `ident` as an id first. Any failure there, transport errors
/// included, falls through to a listing scan where the first exact name
/// match wins.
pub fn resolve<L: Lookup>(lookup: &L, ident: &str) -> Result<L::Resource> {
    match lookup.fetch(ident) {
        Ok(found) => return Ok(found),
        Err(e) => debug!("direct lookup of {} failed ({}), searching by name", ident, e),
    }

    let listed = lookup.list()?;
    let selected = listed
        .iter()
        .find(|r| lookup.matches_name(r, ident))
        .ok_or_else(|| Error::NotFound(ident.to_string()))?;

    lookup.fetch(lookup.id_of(selected))
}

pub struct ClusterLookup<'a> {
    pub client: &'a ApiClient,
}

impl Lookup for ClusterLookup<'_> {
    type Resource = Cluster;

    fn fetch(&self, id: &str) -> Result<Cluster> {
        self.client.get_cluster(id)
    }

    fn list(&self) -> Result<Vec<Cluster>> {
        self.client.list_clusters()
    }

    fn id_of<'r>(&self, cluster: &'r Cluster) -> &'r str {
        &cluster.id
    }

    fn matches_name(&self, cluster: &Cluster, name: &str) -> bool {
        cluster.name == name
    }
}

pub struct HostLookup<'a> {
    pub client: &'a ApiClient,
    pub cluster: &'a Cluster,
}

impl Lookup for HostLookup<'_> {
    type Resource = Host;

    fn fetch(&self, id: &str) -> Result<Host> {
        self.client.get_host(&self.cluster.id, id)
    }

    fn list(&self) -> Result<Vec<Host>> {
        Ok(self.cluster.hosts.clone())
    }

    fn id_of<'r>(&self, host: &'r Host) -> &'r str {
        &host.id
    }

    fn matches_name(&self, host: &Host, name: &str) -> bool {
        host_has_name(host, name)
    }
}

/// Requested hostname first, then whatever the agent reported.
pub fn host_has_name(host: &Host, name: &str) -> bool {
    if host.requested_hostname == name {
        return true;
    }
    match host.inventory() {
        Ok(inv) => inv.hostname == name,
        Err(_) => false,
    }
}

pub fn find_cluster(client: &ApiClient, ident: &str) -> Result<Cluster> {
    resolve(&ClusterLookup { client }, ident)
}

pub fn find_host(client: &ApiClient, cluster: &Cluster, ident: &str) -> Result<Host> {
    resolve(&HostLookup { client, cluster }, ident)
}
