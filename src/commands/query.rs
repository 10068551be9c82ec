//! One-shot cluster queries.

use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::cluster::{ResourceClient, ResourceKind, derive_endpoint};
use crate::commands::Command;
use crate::config::EndpointConfig;
use crate::message::Message;

/// List every resource of one kind matching the label selector.
pub struct FetchResourcesCmd {
    client: Arc<dyn ResourceClient>,
    kind: ResourceKind,
    selector: String,
}

impl FetchResourcesCmd {
    pub fn new(client: Arc<dyn ResourceClient>, kind: ResourceKind, selector: String) -> Self {
        Self {
            client,
            kind,
            selector,
        }
    }
}

#[async_trait]
impl Command for FetchResourcesCmd {
    fn name(&self) -> String {
        format!("Loading {} ({})", self.kind.plural(), self.selector)
    }

    async fn execute(self: Box<Self>, message_tx: UnboundedSender<Message>) -> Result<()> {
        let result = match self.kind {
            ResourceKind::Pod => self.client.list_pods(&self.selector).await,
            ResourceKind::Deployment => self.client.list_deployments(&self.selector).await,
            ResourceKind::Service => self.client.list_services(&self.selector).await,
        };
        message_tx.send(Message::ResourcesLoaded {
            kind: self.kind,
            result: result.map_err(|err| format!("{err:#}")),
        })?;
        Ok(())
    }
}

/// Read the gateway config map and derive the endpoint of the watched service.
pub struct FetchEndpointCmd {
    client: Arc<dyn ResourceClient>,
    settings: EndpointConfig,
}

impl FetchEndpointCmd {
    pub fn new(client: Arc<dyn ResourceClient>, settings: EndpointConfig) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl Command for FetchEndpointCmd {
    fn name(&self) -> String {
        format!("Loading gateway config {}", self.settings.config_map)
    }

    async fn execute(self: Box<Self>, message_tx: UnboundedSender<Message>) -> Result<()> {
        let result = self
            .client
            .get_config_map(&self.settings.config_map)
            .await
            .map(|data| derive_endpoint(&data, &self.settings))
            .map_err(|err| format!("{err:#}"));
        message_tx.send(Message::EndpointLoaded(result))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tokio::sync::mpsc;

    use super::*;
    use crate::cluster::ResourceItem;
    use crate::cluster::endpoint::NOT_FOUND;
    use crate::commands::testing::FakeClient;

    async fn run(command: Box<dyn Command>) -> Vec<Message> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        crate::commands::spawn(command, tx).await.unwrap();
        let mut messages = Vec::new();
        while let Some(message) = rx.recv().await {
            messages.push(message);
        }
        messages
    }

    #[tokio::test]
    async fn test_pods_loaded() {
        let client = Arc::new(FakeClient {
            pods: vec![ResourceItem::pod("my-pod", "Running")],
            ..FakeClient::default()
        });
        let cmd = FetchResourcesCmd::new(client, ResourceKind::Pod, "app=my-app".to_string());

        let messages = run(Box::new(cmd)).await;
        assert_eq!(messages.len(), 1);
        match &messages[0] {
            Message::ResourcesLoaded {
                kind: ResourceKind::Pod,
                result: Ok(items),
            } => assert_eq!(items, &[ResourceItem::pod("my-pod", "Running")]),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_query_error_is_data() {
        let client = Arc::new(FakeClient {
            fail_deployments: true,
            ..FakeClient::default()
        });
        let cmd = FetchResourcesCmd::new(client, ResourceKind::Deployment, "app=x".to_string());

        let messages = run(Box::new(cmd)).await;
        assert_eq!(messages.len(), 1);
        match &messages[0] {
            Message::ResourcesLoaded {
                kind: ResourceKind::Deployment,
                result: Err(err),
            } => assert!(err.contains("forbidden")),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_endpoint_loaded() {
        let json = r#"{"endpoints": [{"endpoint": "/my-app/{id}", "backend": [{"host": ["http://my-app-service"]}]}]}"#;
        let client = Arc::new(FakeClient {
            config_map: Some(BTreeMap::from([("krakend.json".to_string(), json.to_string())])),
            ..FakeClient::default()
        });

        let messages = run(Box::new(FetchEndpointCmd::new(client, EndpointConfig::default()))).await;
        match messages.as_slice() {
            [Message::EndpointLoaded(Ok(endpoint))] => assert_eq!(endpoint, "/my-app/{id}"),
            other => panic!("unexpected messages: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_endpoint_without_route() {
        let client = Arc::new(FakeClient {
            config_map: Some(BTreeMap::new()),
            ..FakeClient::default()
        });

        let messages = run(Box::new(FetchEndpointCmd::new(client, EndpointConfig::default()))).await;
        match messages.as_slice() {
            [Message::EndpointLoaded(Ok(endpoint))] => assert_eq!(endpoint, NOT_FOUND),
            other => panic!("unexpected messages: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_config_map_is_error() {
        let client = Arc::new(FakeClient::default());

        let messages = run(Box::new(FetchEndpointCmd::new(client, EndpointConfig::default()))).await;
        match messages.as_slice() {
            [Message::EndpointLoaded(Err(err))] => assert!(err.contains("krakend-config")),
            other => panic!("unexpected messages: {other:?}"),
        }
    }
}
