use std::collections::BTreeMap;

use async_trait::async_trait;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Pod, Service};
use kube::api::{ListParams, LogParams};
use kube::config::KubeConfigOptions;
use kube::{Api, Client, Config, ResourceExt};
use tracing::{debug, info};

use crate::cluster::model::ResourceItem;
use crate::config::ClusterConfig;
use crate::logs::{LogSink, StreamOutcome};

/// Read-only access to the cluster.
///
/// Every query either returns the complete result or an error; there are no
/// partial results. Implementations are shared between concurrently running
/// commands and must not hold mutable state.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn list_pods(&self, selector: &str) -> Result<Vec<ResourceItem>>;

    async fn list_deployments(&self, selector: &str) -> Result<Vec<ResourceItem>>;

    async fn list_services(&self, selector: &str) -> Result<Vec<ResourceItem>>;

    /// Fetch the data section of a config map.
    async fn get_config_map(&self, name: &str) -> Result<BTreeMap<String, String>>;

    /// Open a log stream for a pod, starting `tail_lines` back, and drain it
    /// into `sink`.
    ///
    /// Only a failure to open the stream is an error; how the stream ended
    /// afterwards is reported as the outcome.
    async fn stream_logs(
        &self,
        pod: &str,
        tail_lines: u32,
        follow: bool,
        sink: &LogSink<'_>,
    ) -> Result<StreamOutcome>;
}

/// [`ResourceClient`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
    namespace: String,
}

impl KubeClient {
    /// Resolve the cluster configuration and build a client.
    ///
    /// With an explicit context the kubeconfig is used; otherwise the
    /// configuration is inferred (kubeconfig first, then in-cluster).
    pub async fn connect(settings: &ClusterConfig) -> Result<Self> {
        let config = match &settings.context {
            Some(context) => {
                let options = KubeConfigOptions {
                    context: Some(context.clone()),
                    ..KubeConfigOptions::default()
                };
                Config::from_kubeconfig(&options)
                    .await
                    .wrap_err_with(|| format!("failed to load kubeconfig context '{context}'"))?
            }
            None => Config::infer()
                .await
                .wrap_err("failed to resolve cluster configuration")?,
        };

        info!(cluster = %config.cluster_url, namespace = %settings.namespace, "Connecting to cluster");
        let client = Client::try_from(config).wrap_err("failed to create cluster client")?;

        Ok(Self {
            client,
            namespace: settings.namespace.clone(),
        })
    }

    fn api<K>(&self) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), &self.namespace)
    }
}

#[async_trait]
impl ResourceClient for KubeClient {
    async fn list_pods(&self, selector: &str) -> Result<Vec<ResourceItem>> {
        let pods = self
            .api::<Pod>()
            .list(&ListParams::default().labels(selector))
            .await
            .wrap_err_with(|| format!("failed to list pods in namespace '{}'", self.namespace))?;
        debug!(count = pods.items.len(), selector, "Listed pods");

        Ok(pods
            .items
            .iter()
            .map(|pod| {
                let phase = pod
                    .status
                    .as_ref()
                    .and_then(|status| status.phase.clone())
                    .unwrap_or_else(|| "Unknown".to_string());
                ResourceItem::pod(pod.name_any(), phase)
            })
            .collect())
    }

    async fn list_deployments(&self, selector: &str) -> Result<Vec<ResourceItem>> {
        let deployments = self
            .api::<Deployment>()
            .list(&ListParams::default().labels(selector))
            .await
            .wrap_err_with(|| {
                format!("failed to list deployments in namespace '{}'", self.namespace)
            })?;
        debug!(count = deployments.items.len(), selector, "Listed deployments");

        Ok(deployments
            .items
            .iter()
            .map(|deployment| {
                let desired = deployment
                    .spec
                    .as_ref()
                    .and_then(|spec| spec.replicas)
                    .unwrap_or(1);
                let ready = deployment
                    .status
                    .as_ref()
                    .and_then(|status| status.ready_replicas)
                    .unwrap_or(0);
                ResourceItem::deployment(deployment.name_any(), ready, desired)
            })
            .collect())
    }

    async fn list_services(&self, selector: &str) -> Result<Vec<ResourceItem>> {
        let services = self
            .api::<Service>()
            .list(&ListParams::default().labels(selector))
            .await
            .wrap_err_with(|| {
                format!("failed to list services in namespace '{}'", self.namespace)
            })?;
        debug!(count = services.items.len(), selector, "Listed services");

        Ok(services
            .items
            .iter()
            .map(|service| {
                let spec = service.spec.as_ref();
                let service_type = spec
                    .and_then(|spec| spec.type_.clone())
                    .unwrap_or_else(|| "ClusterIP".to_string());
                let status = match spec.and_then(|spec| spec.cluster_ip.as_deref()) {
                    Some(ip) => format!("{service_type} {ip}"),
                    None => service_type,
                };
                ResourceItem::service(service.name_any(), status)
            })
            .collect())
    }

    async fn get_config_map(&self, name: &str) -> Result<BTreeMap<String, String>> {
        let config_map = self
            .api::<ConfigMap>()
            .get(name)
            .await
            .wrap_err_with(|| {
                format!("failed to get config map '{name}' in namespace '{}'", self.namespace)
            })?;
        Ok(config_map.data.unwrap_or_default())
    }

    async fn stream_logs(
        &self,
        pod: &str,
        tail_lines: u32,
        follow: bool,
        sink: &LogSink<'_>,
    ) -> Result<StreamOutcome> {
        let params = LogParams {
            follow,
            tail_lines: Some(i64::from(tail_lines)),
            ..LogParams::default()
        };
        let api = self.api::<Pod>();
        let stream = api
            .log_stream(pod, &params)
            .await
            .wrap_err_with(|| format!("failed to open log stream for pod '{pod}'"))?;
        debug!(pod, tail_lines, follow, "Opened log stream");

        // The stream borrows the api and params, so it is drained here.
        Ok(sink.pump(Box::pin(stream)).await)
    }
}
