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

//! Narrow a cluster's hosts by inventory attributes.

use std::str::FromStr;

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Host, HostInventory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Mac,
    BmcAddress,
    Vendor,
    Product,
}

impl FromStr for Attribute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mac" => Ok(Self::Mac),
            "bmc_address" | "bmc-address" => Ok(Self::BmcAddress),
            "vendor" => Ok(Self::Vendor),
            "product" => Ok(Self::Product),
            _ => Err(Error::UnsupportedKey(s.to_string())),
        }
    }
}

impl Attribute {
    fn matches(self, inv: &HostInventory, value: &str) -> bool {
        match self {
            Self::Mac => inv.interfaces.iter().any(|i| {
                debug!("want {}, have {}", value, i.mac_address);
                i.mac_address == value
            }),
            Self::BmcAddress => inv.bmc_address == value,
            Self::Vendor => inv.system_vendor.manufacturer == value,
            Self::Product => inv.system_vendor.product_name == value,
        }
    }
}

/// One `key=value` criterion. The key is checked when the filter runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpec {
    pub key: String,
    pub value: String,
}

impl FromStr for MatchSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('=') {
            Some((key, value)) => Ok(Self {
                key: key.to_string(),
                value: value.to_string(),
            }),
            None => Err(Error::MatchSpec(s.to_string())),
        }
    }
}

/// Keep the hosts satisfying every spec, in their original order. Each spec
/// narrows the survivors of the previous one.
///
/// A host whose inventory does not parse never matches; agents report
/// free-form JSON and one bad payload should not fail the search.
pub fn filter_hosts(hosts: &[Host], specs: &[MatchSpec]) -> Result<Vec<Host>> {
    let mut selected: Vec<Host> = hosts.to_vec();

    for spec in specs {
        let attr: Attribute = spec.key.parse()?;
        debug!("searching for {}={}", spec.key, spec.value);

        selected.retain(|host| match host.inventory() {
            Ok(inv) => attr.matches(&inv, &spec.value),
            Err(e) => {
                debug!("skipping host {}: bad inventory: {}", host.id, e);
                false
            }
        });
    }

    if selected.is_empty() {
        return Err(Error::NoHostsMatched);
    }
    Ok(selected)
}
