//! Generator sizing configuration

use super::error::{ConfigError, ConfigResult};
use super::Validatable;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// VLAN ids are assigned from 100 upward and must stay within 1..=4094.
pub const MAX_VLAN_COUNT: usize = 3995;

/// Upper bound on entities a single generation run may produce
pub const MAX_GENERATED_ENTITIES: usize = 10_000_000;

/// Deployment environment preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Full default topology, sample data generated on startup
    #[default]
    Development,

    /// Full default topology, no sample data
    Production,

    /// Minimal topology for fast test runs
    Testing,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        }
    }

    /// Read `ENVIRONMENT`, defaulting to development when unset.
    pub fn from_env() -> ConfigResult<Self> {
        match std::env::var("ENVIRONMENT") {
            Ok(value) => value.parse(),
            Err(_) => Ok(Self::Development),
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "testing" | "test" => Ok(Self::Testing),
            _ => Err(ConfigError::UnknownEnvironment(s.to_string())),
        }
    }
}

/// Generator sizing parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Number of network switches (>= 1)
    pub switch_count: usize,

    /// Ports created on each switch (>= 1)
    pub ports_per_switch: usize,

    /// Number of VLANs (1..=3995)
    pub vlan_count: usize,

    /// Number of physical servers (>= 1)
    pub server_count: usize,

    /// Virtual machines hosted on each server (>= 1)
    pub vms_per_server: usize,

    /// Pods running on each VM (>= 1)
    pub pods_per_vm: usize,

    /// Containers inside each pod (>= 1)
    pub containers_per_pod: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            switch_count: 3,
            ports_per_switch: 24,
            vlan_count: 10,
            server_count: 5,
            vms_per_server: 10,
            pods_per_vm: 100,
            containers_per_pod: 2,
        }
    }
}

/// Environment variable name for each overridable field
const ENV_FIELDS: [&str; 7] = [
    "SWITCH_COUNT",
    "PORTS_PER_SWITCH",
    "VLAN_COUNT",
    "SERVER_COUNT",
    "VMS_PER_SERVER",
    "PODS_PER_VM",
    "CONTAINERS_PER_POD",
];

impl GeneratorConfig {
    /// Preset sizing for an environment
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development | Environment::Production => Self::default(),
            Environment::Testing => Self {
                switch_count: 1,
                server_count: 2,
                vms_per_server: 2,
                pods_per_vm: 5,
                ..Self::default()
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let positive = [
            ("switch_count", self.switch_count),
            ("ports_per_switch", self.ports_per_switch),
            ("server_count", self.server_count),
            ("vms_per_server", self.vms_per_server),
            ("pods_per_vm", self.pods_per_vm),
            ("containers_per_pod", self.containers_per_pod),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::range_with_hint(
                    field,
                    value,
                    1,
                    usize::MAX,
                    "Every generated tier needs at least one entity",
                ));
            }
        }

        let entities = self.checked_totals().map_or(usize::MAX, |(entities, _)| entities);
        if entities > MAX_GENERATED_ENTITIES {
            return Err(ConfigError::range_with_hint(
                "expected_entity_count",
                entities,
                1,
                MAX_GENERATED_ENTITIES,
                "Product of the fan-out counts is too large to generate",
            ));
        }

        if self.vlan_count == 0 || self.vlan_count > MAX_VLAN_COUNT {
            return Err(ConfigError::range_with_hint(
                "vlan_count",
                self.vlan_count,
                1,
                MAX_VLAN_COUNT,
                "VLAN ids start at 100 and may not exceed 4094",
            ));
        }

        Ok(())
    }

    /// Total entities this configuration produces (saturating)
    pub fn expected_entity_count(&self) -> usize {
        self.checked_totals().map_or(usize::MAX, |(entities, _)| entities)
    }

    /// Total relationships this configuration produces (saturating)
    ///
    /// Ports contribute CONTAINS and BELONGS_TO, servers BELONGS_TO, VMs HOSTS,
    /// pods RUNS_ON, containers CONTAINS and CONNECTED_TO.
    pub fn expected_relationship_count(&self) -> usize {
        self.checked_totals().map_or(usize::MAX, |(_, relationships)| relationships)
    }

    /// (entities, relationships), or `None` if either overflows `usize`
    fn checked_totals(&self) -> Option<(usize, usize)> {
        let ports = self.switch_count.checked_mul(self.ports_per_switch)?;
        let vms = self.server_count.checked_mul(self.vms_per_server)?;
        let pods = vms.checked_mul(self.pods_per_vm)?;
        let containers = pods.checked_mul(self.containers_per_pod)?;

        let sum = |parts: [usize; 7]| {
            parts
                .into_iter()
                .try_fold(0usize, |acc, n| acc.checked_add(n))
        };
        let entities = sum([
            self.switch_count,
            ports,
            self.vlan_count,
            self.server_count,
            vms,
            pods,
            containers,
        ])?;
        let relationships = sum([ports, ports, self.server_count, vms, pods, containers, containers])?;
        Some((entities, relationships))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Loading
    // ═══════════════════════════════════════════════════════════════════════

    /// Parse from a YAML document; missing fields keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Defaults overridden by process environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply process environment variables on top of `self`
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary lookup (`SWITCH_COUNT` etc.)
    ///
    /// Values are parsed as signed integers so a negative count surfaces as a
    /// range error rather than a parse error.
    pub fn with_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        for var in ENV_FIELDS {
            let Some(raw) = lookup(var) else { continue };
            let parsed: i64 = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: var.to_string(),
                value: raw.clone(),
            })?;
            if parsed < 1 {
                return Err(ConfigError::range_with_hint(
                    var.to_lowercase(),
                    parsed,
                    1,
                    usize::MAX,
                    format!("{var} must be a positive integer"),
                ));
            }
            let value = usize::try_from(parsed).map_err(|_| ConfigError::InvalidEnv {
                var: var.to_string(),
                value: raw.clone(),
            })?;
            match var {
                "SWITCH_COUNT" => self.switch_count = value,
                "PORTS_PER_SWITCH" => self.ports_per_switch = value,
                "VLAN_COUNT" => self.vlan_count = value,
                "SERVER_COUNT" => self.server_count = value,
                "VMS_PER_SERVER" => self.vms_per_server = value,
                "PODS_PER_VM" => self.pods_per_vm = value,
                _ => self.containers_per_pod = value,
            }
        }
        self.validate()?;
        Ok(self)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Builder
    // ═══════════════════════════════════════════════════════════════════════

    pub fn switch_count(mut self, v: usize) -> Self {
        self.switch_count = v;
        self
    }

    pub fn ports_per_switch(mut self, v: usize) -> Self {
        self.ports_per_switch = v;
        self
    }

    pub fn vlan_count(mut self, v: usize) -> Self {
        self.vlan_count = v;
        self
    }

    pub fn server_count(mut self, v: usize) -> Self {
        self.server_count = v;
        self
    }

    pub fn vms_per_server(mut self, v: usize) -> Self {
        self.vms_per_server = v;
        self
    }

    pub fn pods_per_vm(mut self, v: usize) -> Self {
        self.pods_per_vm = v;
        self
    }

    pub fn containers_per_pod(mut self, v: usize) -> Self {
        self.containers_per_pod = v;
        self
    }
}

impl Validatable for GeneratorConfig {
    fn validate(&self) -> ConfigResult<()> {
        GeneratorConfig::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "GeneratorConfig"
    }
}

/// Top-level configuration: environment plus generator sizing
///
/// When deserialized, the `environment` preset is resolved first and the
/// document's fields are laid over it, so `environment: testing` with a
/// partial `generator:` block keeps the testing sizing for the fields it omits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TopologyDocument")]
pub struct TopologyConfig {
    pub environment: Environment,

    /// Populate the store with a generated topology on startup
    pub generate_sample_data: bool,

    pub generator: GeneratorConfig,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self::for_environment(Environment::Development)
    }
}

impl TopologyConfig {
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            generate_sample_data: environment != Environment::Production,
            generator: GeneratorConfig::for_environment(environment),
        }
    }

    /// Preset from `ENVIRONMENT`, sizing overridden by the generator variables
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::for_environment(Environment::from_env()?);
        if let Ok(flag) = std::env::var("GENERATE_SAMPLE_DATA") {
            config.generate_sample_data = matches!(
                flag.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        config.generator = config.generator.with_env_overrides()?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }
}

/// Document form of `TopologyConfig`; every field is optional
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TopologyDocument {
    #[serde(default)]
    environment: Option<Environment>,
    #[serde(default)]
    generate_sample_data: Option<bool>,
    #[serde(default)]
    generator: Option<serde_yaml::Mapping>,
}

impl TryFrom<TopologyDocument> for TopologyConfig {
    type Error = ConfigError;

    fn try_from(doc: TopologyDocument) -> ConfigResult<Self> {
        let mut config = Self::for_environment(doc.environment.unwrap_or_default());
        if let Some(flag) = doc.generate_sample_data {
            config.generate_sample_data = flag;
        }
        if let Some(overrides) = doc.generator {
            let mut merged = match serde_yaml::to_value(&config.generator)? {
                serde_yaml::Value::Mapping(preset) => preset,
                _ => serde_yaml::Mapping::new(),
            };
            merged.extend(overrides);
            config.generator = serde_yaml::from_value(serde_yaml::Value::Mapping(merged))?;
        }
        Ok(config)
    }
}

impl Validatable for TopologyConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.generator.validate()
    }

    fn config_name(&self) -> &'static str {
        "TopologyConfig"
    }
}
