use std::fmt::Display;

/// The resource kinds shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Pod,
    Deployment,
    Service,
}

impl ResourceKind {
    pub const ALL: [Self; 3] = [Self::Pod, Self::Deployment, Self::Service];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pod => "Pod",
            Self::Deployment => "Deployment",
            Self::Service => "Service",
        }
    }

    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Pod => "pods",
            Self::Deployment => "deployments",
            Self::Service => "services",
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Summary of a single cluster resource, shared by every panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceItem {
    pub kind: ResourceKind,
    pub name: String,
    /// Short status line: pod phase, deployment readiness, service address.
    pub status: String,
}

impl ResourceItem {
    pub fn new(kind: ResourceKind, name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            status: status.into(),
        }
    }

    pub fn pod(name: impl Into<String>, phase: impl Into<String>) -> Self {
        Self::new(ResourceKind::Pod, name, phase)
    }

    pub fn deployment(name: impl Into<String>, ready: i32, desired: i32) -> Self {
        Self::new(ResourceKind::Deployment, name, format!("{ready}/{desired} ready"))
    }

    pub fn service(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self::new(ResourceKind::Service, name, status)
    }
}

impl Display for ResourceItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Identifies one log stream: the pod it follows and the selection generation
/// that started it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamTag {
    pub pod: String,
    pub generation: u64,
}

impl StreamTag {
    pub fn new(pod: impl Into<String>, generation: u64) -> Self {
        Self {
            pod: pod.into(),
            generation,
        }
    }
}

impl Display for StreamTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.pod, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_status() {
        let item = ResourceItem::deployment("api", 1, 3);
        assert_eq!(item.kind, ResourceKind::Deployment);
        assert_eq!(item.status, "1/3 ready");
        assert_eq!(item.to_string(), "api");
    }

    #[test]
    fn test_stream_tag_display() {
        assert_eq!(StreamTag::new("my-pod", 4).to_string(), "my-pod#4");
    }
}
