//! Endpoint integration policy, as stored on the agent policy and pushed to
//! every enrolled host.

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectionMode {
    Detect,
    Prevent,
    Off,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub windows: WindowsPolicy,
    pub mac: MacPolicy,
    pub linux: LinuxPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowsPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced: Option<AdvancedPolicy>,
    pub events: WindowsEvents,
    pub malware: MalwarePolicy,
    pub logging: LoggingPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced: Option<AdvancedPolicy>,
    pub events: CommonEvents,
    pub malware: MalwarePolicy,
    pub logging: LoggingPolicy,
}

/// Linux has no malware protection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinuxPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced: Option<AdvancedPolicy>,
    pub events: CommonEvents,
    pub logging: LoggingPolicy,
}

/// Event sources collected on Windows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowsEvents {
    pub dll_and_driver_load: bool,
    pub dns: bool,
    pub file: bool,
    pub network: bool,
    pub process: bool,
    pub registry: bool,
    pub security: bool,
}

/// Event sources collected on macOS and Linux
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonEvents {
    pub process: bool,
    pub file: bool,
    pub network: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalwarePolicy {
    pub mode: ProtectionMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingPolicy {
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedPolicy {
    pub elasticsearch: ElasticsearchPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElasticsearchPolicy {
    pub tls: TlsPolicy,
}

/// TLS checks the endpoint applies when it talks to Elasticsearch directly
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsPolicy {
    pub verify_peer: bool,
    pub verify_hostname: bool,
}

impl AdvancedPolicy {
    fn unverified_tls() -> Self {
        Self {
            elasticsearch: ElasticsearchPolicy {
                tls: TlsPolicy::default(),
            },
        }
    }
}

impl LoggingPolicy {
    fn info() -> Self {
        Self {
            file: "info".to_string(),
        }
    }
}

impl CommonEvents {
    fn all() -> Self {
        Self {
            process: true,
            file: true,
            network: true,
        }
    }
}

impl PolicyConfig {
    /// The policy a new endpoint integration starts with: every event source
    /// on, malware in prevent mode, TLS verification off.
    pub fn factory() -> Self {
        Self {
            windows: WindowsPolicy {
                advanced: Some(AdvancedPolicy::unverified_tls()),
                events: WindowsEvents {
                    dll_and_driver_load: true,
                    dns: true,
                    file: true,
                    network: true,
                    process: true,
                    registry: true,
                    security: true,
                },
                malware: MalwarePolicy {
                    mode: ProtectionMode::Prevent,
                },
                logging: LoggingPolicy::info(),
            },
            mac: MacPolicy {
                advanced: Some(AdvancedPolicy::unverified_tls()),
                events: CommonEvents::all(),
                malware: MalwarePolicy {
                    mode: ProtectionMode::Prevent,
                },
                logging: LoggingPolicy::info(),
            },
            linux: LinuxPolicy {
                advanced: Some(AdvancedPolicy::unverified_tls()),
                events: CommonEvents::all(),
                logging: LoggingPolicy::info(),
            },
        }
    }
}
