//! Derives the gateway endpoint of the watched service from the gateway's
//! config map.
//!
//! The gateway configuration is a KrakenD-style JSON document stored under a
//! single config map key. Every endpoint whose backend hosts mention the
//! watched service is reported.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::warn;

use crate::config::EndpointConfig;

/// Shown when the config map holds no endpoint routed to the service.
pub const NOT_FOUND: &str = "NOT FOUND";

#[derive(Debug, Deserialize)]
struct GatewayConfig {
    #[serde(default)]
    endpoints: Vec<GatewayEndpoint>,
}

#[derive(Debug, Deserialize)]
struct GatewayEndpoint {
    endpoint: String,
    #[serde(default)]
    backend: Vec<GatewayBackend>,
}

#[derive(Debug, Deserialize)]
struct GatewayBackend {
    #[serde(default)]
    host: Vec<String>,
}

impl GatewayEndpoint {
    fn routes_to(&self, service: &str) -> bool {
        self.backend
            .iter()
            .flat_map(|backend| backend.host.iter())
            .any(|host| host.contains(service))
    }
}

/// Compute the endpoint text from config map data.
///
/// Never fails: a missing key, malformed JSON or an unrouted service all
/// resolve to [`NOT_FOUND`].
pub fn derive_endpoint(data: &BTreeMap<String, String>, settings: &EndpointConfig) -> String {
    let Some(raw) = data.get(&settings.key) else {
        warn!(key = %settings.key, config_map = %settings.config_map, "Gateway config key missing");
        return NOT_FOUND.to_string();
    };

    let config: GatewayConfig = match serde_json::from_str(raw) {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, key = %settings.key, "Gateway config is not valid JSON");
            return NOT_FOUND.to_string();
        }
    };

    let routed: Vec<&str> = config
        .endpoints
        .iter()
        .filter(|endpoint| endpoint.routes_to(&settings.service))
        .map(|endpoint| endpoint.endpoint.as_str())
        .collect();

    if routed.is_empty() {
        NOT_FOUND.to_string()
    } else {
        routed.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> EndpointConfig {
        EndpointConfig::default()
    }

    fn data(json: &str) -> BTreeMap<String, String> {
        BTreeMap::from([("krakend.json".to_string(), json.to_string())])
    }

    #[test]
    fn test_routed_endpoint() {
        let json = r#"{
            "version": 3,
            "endpoints": [
                {"endpoint": "/my-app/{id}", "backend": [{"host": ["http://my-app-service:8080"]}]},
                {"endpoint": "/other", "backend": [{"host": ["http://other-service"]}]}
            ]
        }"#;
        assert_eq!(derive_endpoint(&data(json), &settings()), "/my-app/{id}");
    }

    #[test]
    fn test_multiple_routes_are_joined() {
        let json = r#"{"endpoints": [
            {"endpoint": "/a", "backend": [{"host": ["http://my-app-service"]}]},
            {"endpoint": "/b", "backend": [{"host": ["x", "http://my-app-service:80"]}]}
        ]}"#;
        assert_eq!(derive_endpoint(&data(json), &settings()), "/a, /b");
    }

    #[test]
    fn test_not_found_cases() {
        assert_eq!(derive_endpoint(&BTreeMap::new(), &settings()), NOT_FOUND);
        assert_eq!(derive_endpoint(&data("not json"), &settings()), NOT_FOUND);
        assert_eq!(
            derive_endpoint(&data(r#"{"endpoints": []}"#), &settings()),
            NOT_FOUND
        );
    }
}
