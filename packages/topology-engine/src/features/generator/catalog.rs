//! Value tables for generated attributes
//!
//! The generator picks from these by index (`i % len`), never at random.

pub(crate) const SWITCH_VENDORS: [&str; 5] = ["Cisco", "Juniper", "Arista", "HPE", "Dell"];
pub(crate) const SWITCH_MODELS: [&str; 5] = [
    "Catalyst 9300",
    "EX4300",
    "7050X3",
    "Aruba 6300",
    "PowerSwitch S5248F",
];
pub(crate) const LOCATIONS: [&str; 5] = [
    "DC1-Row-A",
    "DC1-Row-B",
    "DC2-Row-A",
    "DC2-Row-B",
    "DC3-Row-A",
];

pub(crate) const PORT_TYPES: [&str; 3] = ["ethernet", "fiber", "copper"];
pub(crate) const PORT_SPEEDS: [&str; 4] = ["1Gbps", "10Gbps", "25Gbps", "40Gbps"];

pub(crate) const VLAN_NAMES: [&str; 10] = [
    "Management",
    "Production",
    "Development",
    "Testing",
    "DMZ",
    "Storage",
    "Backup",
    "Monitoring",
    "Security",
    "Guest",
];
pub(crate) const FIRST_VLAN_ID: u32 = 100;

pub(crate) const SERVER_CPU_CORES: [u32; 4] = [16, 32, 64, 128];
pub(crate) const SERVER_MEMORY_GB: [u32; 4] = [64, 128, 256, 512];
pub(crate) const SERVER_STORAGE_GB: [u32; 4] = [1000, 2000, 4000, 8000];
pub(crate) const SERVER_OS: [&str; 4] = ["Ubuntu 22.04", "RHEL 8", "CentOS 7", "Debian 11"];
pub(crate) const RACK_UNITS: usize = 42;

pub(crate) const VM_CPU_CORES: [u32; 4] = [2, 4, 8, 16];
pub(crate) const VM_MEMORY_GB: [u32; 4] = [4, 8, 16, 32];
pub(crate) const VM_STORAGE_GB: [u32; 4] = [50, 100, 200, 500];
pub(crate) const VM_OS: [&str; 4] = ["Ubuntu 20.04", "Ubuntu 22.04", "CentOS 8", "Windows Server 2019"];
pub(crate) const HYPERVISORS: [&str; 4] = ["VMware vSphere", "KVM", "Hyper-V", "Xen"];

pub(crate) const NAMESPACES: [&str; 7] = [
    "default",
    "kube-system",
    "monitoring",
    "logging",
    "ingress",
    "production",
    "staging",
];
pub(crate) const POD_PHASES: [&str; 5] = ["Running", "Pending", "Succeeded", "Failed", "Unknown"];
pub(crate) const DEPLOY_ENVIRONMENTS: [&str; 3] = ["production", "staging", "development"];

pub(crate) const CONTAINER_IMAGES: [(&str, &str); 13] = [
    ("nginx", "1.21"),
    ("redis", "6.2"),
    ("postgres", "13"),
    ("mysql", "8.0"),
    ("mongo", "5.0"),
    ("node", "16-alpine"),
    ("python", "3.9-slim"),
    ("openjdk", "11-jre"),
    ("golang", "1.17-alpine"),
    ("httpd", "2.4"),
    ("elasticsearch", "7.15.0"),
    ("kibana", "7.15.0"),
    ("grafana/grafana", "8.2.0"),
];
pub(crate) const CONTAINER_STATUSES: [&str; 3] = ["running", "waiting", "terminated"];
pub(crate) const LOG_LEVELS: [&str; 3] = ["info", "debug", "warn"];

/// Pick `table[index % len]`
pub(crate) fn pick<T: Copy>(table: &[T], index: usize) -> T {
    table[index % table.len()]
}

/// Dotted IPv4 address within a /16 network, skipping .0 and .255
pub(crate) fn ip_address(network: &str, index: usize) -> String {
    format!("{}.{}.{}", network, (index / 254) % 256, index % 254 + 1)
}

/// Locally administered MAC address
pub(crate) fn mac_address(class: u8, index: usize) -> String {
    format!(
        "02:00:{:02x}:{:02x}:{:02x}:{:02x}",
        class,
        (index >> 16) & 0xff,
        (index >> 8) & 0xff,
        index & 0xff
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_wraps() {
        assert_eq!(pick(&SWITCH_VENDORS, 0), "Cisco");
        assert_eq!(pick(&SWITCH_VENDORS, 5), "Cisco");
        assert_eq!(pick(&SWITCH_VENDORS, 7), "Arista");
    }

    #[test]
    fn test_ip_address_skips_network_and_broadcast() {
        assert_eq!(ip_address("10.1", 0), "10.1.0.1");
        assert_eq!(ip_address("10.1", 253), "10.1.0.254");
        assert_eq!(ip_address("10.1", 254), "10.1.1.1");
    }

    #[test]
    fn test_mac_address_format() {
        assert_eq!(mac_address(1, 0x0102), "02:00:01:00:01:02");
    }
}
