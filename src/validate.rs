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

use crate::error::{Error, Result};

const DOWNLOAD_FILES: &[&str] = &[
    "bootstrap.ign",
    "master.ign",
    "metadata.json",
    "worker.ign",
    "kubeadmin-password",
    "kubeconfig",
    "kubeconfig-noingress",
    "install-config.yaml",
    "discovery.ign",
    "custom_manifests.json",
    "custom_manifests.yaml",
];

const NETWORK_TYPES: &[&str] = &["OpenShiftSDN", "OVNKubernetes"];

const IMAGE_TYPES: &[&str] = &["minimal-iso", "full-iso"];

const CLUSTER_STATUS: &[&str] = &[
    "insufficient",
    "ready",
    "error",
    "preparing-for-installation",
    "pending-for-input",
    "installing",
    "finalizing",
    "installed",
    "adding-hosts",
    "cancelled",
    "installing-pending-user-action",
];

const HOST_STATUS: &[&str] = &[
    "discovering",
    "known",
    "disconnected",
    "insufficient",
    "disabled",
    "preparing-for-installation",
    "preparing-successful",
    "pending-for-input",
    "installing",
    "installing-in-progress",
    "installing-pending-user-action",
    "resetting-pending-user-action",
    "installed",
    "error",
    "resetting",
    "added-to-existing-cluster",
    "cancelled",
    "binding",
    "unbinding",
    "known-unbound",
    "disconnected-unbound",
    "insufficient-unbound",
    "disabled-unbound",
    "discovering-unbound",
];

/// The fixed value sets checked locally before a request goes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    NetworkType,
    ImageType,
    ClusterStatus,
    HostStatus,
    DownloadFile,
}

impl Kind {
    pub fn values(self) -> &'static [&'static str] {
        match self {
            Self::NetworkType => NETWORK_TYPES,
            Self::ImageType => IMAGE_TYPES,
            Self::ClusterStatus => CLUSTER_STATUS,
            Self::HostStatus => HOST_STATUS,
            Self::DownloadFile => DOWNLOAD_FILES,
        }
    }

    /// Exact, case-sensitive membership.
    pub fn contains(self, value: &str) -> bool {
        self.values().iter().any(|v| *v == value)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NetworkType => "network type",
            Self::ImageType => "image type",
            Self::ClusterStatus => "cluster status",
            Self::HostStatus => "host status",
            Self::DownloadFile => "filename",
        })
    }
}

pub fn validate(kind: Kind, value: &str) -> Result<()> {
    if kind.contains(value) {
        Ok(())
    } else {
        Err(Error::Invalid {
            kind,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_types() {
        for ok in ["OpenShiftSDN", "OVNKubernetes"] {
            assert!(validate(Kind::NetworkType, ok).is_ok());
        }
        for bad in ["", "openshiftsdn", "OVN", "Calico", "OpenShiftSDN "] {
            assert!(validate(Kind::NetworkType, bad).is_err(), "{}", bad);
        }
    }

    #[test]
    fn membership_is_case_sensitive() {
        assert!(Kind::ClusterStatus.contains("installed"));
        assert!(!Kind::ClusterStatus.contains("Installed"));
        assert!(!Kind::ImageType.contains("FULL-ISO"));
    }

    #[test]
    fn host_status_includes_unbound_variants() {
        assert!(Kind::HostStatus.contains("known-unbound"));
        assert!(!Kind::ClusterStatus.contains("known-unbound"));
        assert_eq!(Kind::HostStatus.values().len(), 24);
        assert_eq!(Kind::ClusterStatus.values().len(), 11);
    }

    #[test]
    fn download_whitelist() {
        assert!(validate(Kind::DownloadFile, "kubeadmin-password").is_ok());
        assert!(validate(Kind::DownloadFile, "custom_manifests.yaml").is_ok());
        match validate(Kind::DownloadFile, "../etc/passwd") {
            Err(Error::Invalid { kind, value }) => {
                assert_eq!(kind, Kind::DownloadFile);
                assert_eq!(value, "../etc/passwd");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
