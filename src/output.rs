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

//! Borderless tables and JSON dumps written to any `Write`.

use std::io::Write;

use comfy_table::presets::NOTHING;
use comfy_table::Table;

use crate::error::Result;
use crate::models::{Cluster, Host};

const GIB: i64 = 1024 * 1024 * 1024;

fn table() -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table
}

fn emit<W: Write>(out: &mut W, table: &Table) -> Result<()> {
    writeln!(out, "{}", table)?;
    Ok(())
}

pub fn cluster_list<W: Write>(out: &mut W, clusters: &[Cluster]) -> Result<()> {
    if clusters.is_empty() {
        return Ok(());
    }
    let mut t = table();
    for c in clusters {
        t.add_row(vec![
            c.name.as_str(),
            c.base_dns_domain.as_str(),
            c.id.as_str(),
            c.status.as_str(),
        ]);
    }
    emit(out, &t)
}

pub fn cluster_detail<W: Write>(out: &mut W, c: &Cluster) -> Result<()> {
    let mut t = table();
    t.add_row(vec!["Name", c.name.as_str()]);
    t.add_row(vec!["BaseDNSDomain", c.base_dns_domain.as_str()]);
    t.add_row(vec!["ID", c.id.as_str()]);
    t.add_row(vec!["EnabledHostCount".to_string(), c.enabled_host_count.to_string()]);
    t.add_row(vec!["ApiVip", c.api_vip.as_str()]);
    t.add_row(vec!["IngressVip", c.ingress_vip.as_str()]);
    t.add_row(vec!["OpenshiftVersion", c.openshift_version.as_str()]);
    t.add_row(vec!["Status", c.status.as_str()]);
    emit(out, &t)
}

pub fn cluster_json<W: Write>(out: &mut W, c: &Cluster) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, c)?;
    writeln!(out)?;
    Ok(())
}

/// Hosts with unparseable inventories are still listed, without a BMC
/// address.
pub fn host_list<W: Write>(out: &mut W, hosts: &[Host]) -> Result<()> {
    if hosts.is_empty() {
        return Ok(());
    }
    let mut t = table();
    for h in hosts {
        let bmc = h.inventory().map(|i| i.bmc_address).unwrap_or_default();
        t.add_row(vec![
            h.id.clone(),
            h.requested_hostname.clone(),
            h.role.clone(),
            bmc,
            h.status.clone(),
        ]);
    }
    emit(out, &t)
}

pub fn host_detail<W: Write>(out: &mut W, h: &Host) -> Result<()> {
    let inv = h.inventory()?;

    let mut t = table();
    t.add_row(vec!["ID", h.id.as_str()]);
    t.add_row(vec!["Manufacturer", inv.system_vendor.manufacturer.as_str()]);
    t.add_row(vec!["Model", inv.system_vendor.product_name.as_str()]);
    t.add_row(vec!["Serial", inv.system_vendor.serial_number.as_str()]);
    t.add_row(vec!["Role", h.role.as_str()]);
    t.add_row(vec!["Status", h.status.as_str()]);
    t.add_row(vec!["Stage", h.progress.current_stage.as_str()]);
    t.add_row(vec!["BMC Address", inv.bmc_address.as_str()]);
    t.add_row(vec!["Architecture", inv.cpu.architecture.as_str()]);
    t.add_row(vec!["CPU Model", inv.cpu.model_name.as_str()]);
    t.add_row(vec!["CPU Count".to_string(), inv.cpu.count.to_string()]);
    t.add_row(vec![
        "Memory".to_string(),
        (inv.memory.physical_bytes / GIB).to_string(),
    ]);

    t.add_row(vec!["Interfaces"]);
    for iface in &inv.interfaces {
        let speed = if iface.speed_mbps > 0 {
            iface.speed_mbps.to_string()
        } else {
            "-".to_string()
        };
        t.add_row(vec![
            String::new(),
            iface.name.clone(),
            iface.mac_address.clone(),
            iface.mtu.to_string(),
            speed,
            iface.ipv4_addresses.join(" "),
        ]);
    }

    t.add_row(vec!["Disks"]);
    for disk in inv.disks.iter().filter(|d| d.bootable) {
        t.add_row(vec![
            String::new(),
            disk.name.clone(),
            disk.serial.clone(),
            disk.vendor.clone(),
            disk.model.clone(),
            (disk.size_bytes / GIB).to_string(),
        ]);
    }

    emit(out, &t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F: FnOnce(&mut Vec<u8>) -> Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn cluster_list_has_one_line_per_cluster() {
        let clusters = vec![
            Cluster {
                id: "id-1".into(),
                name: "alpha".into(),
                base_dns_domain: "example.com".into(),
                status: "ready".into(),
                ..Default::default()
            },
            Cluster {
                id: "id-2".into(),
                name: "beta".into(),
                status: "installed".into(),
                ..Default::default()
            },
        ];
        let text = render(|w| cluster_list(w, &clusters));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("alpha") && lines[0].contains("id-1"));
        assert!(lines[1].contains("installed"));
    }

    #[test]
    fn empty_list_prints_nothing() {
        assert_eq!(render(|w| cluster_list(w, &[])), "");
    }

    #[test]
    fn cluster_json_is_parseable() {
        let c = Cluster {
            id: "id-1".into(),
            name: "alpha".into(),
            ..Default::default()
        };
        let text = render(|w| cluster_json(w, &c));
        let back: Cluster = serde_json::from_str(&text).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn host_list_tolerates_bad_inventory() {
        let hosts = vec![
            Host {
                id: "h1".into(),
                role: "master".into(),
                inventory: r#"{"bmc_address": "10.0.0.9"}"#.into(),
                ..Default::default()
            },
            Host {
                id: "h2".into(),
                inventory: "garbage".into(),
                ..Default::default()
            },
        ];
        let text = render(|w| host_list(w, &hosts));
        assert!(text.contains("10.0.0.9"));
        assert!(text.contains("h2"));
    }

    #[test]
    fn host_detail_lists_only_bootable_disks() {
        let host = Host {
            id: "h1".into(),
            inventory: serde_json::json!({
                "memory": {"physical_bytes": 34359738368i64},
                "disks": [
                    {"name": "sda", "bootable": true, "size_bytes": 107374182400i64},
                    {"name": "sr0", "bootable": false}
                ]
            })
            .to_string(),
            ..Default::default()
        };
        let text = render(|w| host_detail(w, &host));
        assert!(text.contains("sda"));
        assert!(!text.contains("sr0"));
        assert!(text.lines().any(|l| l.contains("Memory") && l.contains("32")));
    }
}
