pub mod actions;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod resolver;

pub use actions::*;
use keybindings::KeybindingsConfig;
pub use loader::{config_dir, load};
pub use resolver::KeyResolver;
use serde::{Deserialize, Serialize};

use crate::cli::Args;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

/// Which part of the cluster the dashboard watches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Kubeconfig context; inferred when unset.
    pub context: Option<String>,
    pub namespace: String,
    /// Label selector applied to every resource list.
    pub selector: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            context: None,
            namespace: "default".to_string(),
            selector: "app=my-app".to_string(),
        }
    }
}

/// Where to find the gateway configuration and which service to look for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub config_map: String,
    pub key: String,
    pub service: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            config_map: "krakend-config".to_string(),
            key: "krakend.json".to_string(),
            service: "my-app-service".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    /// Lines of history requested when a stream is opened.
    pub tail_lines: u32,
    /// Maximum number of lines kept in the log panel.
    pub capacity: usize,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            tail_lines: 100,
            capacity: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    /// Seconds between automatic refreshes of the resource panels; 0 disables.
    #[serde(default)]
    pub refresh_interval_secs: u64,
}

impl AppConfig {
    /// Apply command line overrides on top of the loaded file.
    pub fn apply_cli_args(&mut self, args: &Args) {
        if let Some(namespace) = &args.namespace {
            self.cluster.namespace.clone_from(namespace);
        }
        if let Some(selector) = &args.selector {
            self.cluster.selector.clone_from(selector);
        }
        if let Some(context) = &args.context {
            self.cluster.context = Some(context.clone());
        }
        if let Some(config_map) = &args.config_map {
            self.endpoint.config_map.clone_from(config_map);
        }
    }
}
