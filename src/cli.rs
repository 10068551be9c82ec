use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "kubedash",
    version,
    about = "Terminal dashboard for Kubernetes workloads and live pod logs"
)]
pub struct Args {
    /// Namespace to watch (e.g., "default")
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Label selector for pods, deployments and services (e.g., "app=my-app")
    #[arg(short = 'l', long)]
    pub selector: Option<String>,

    /// Kubeconfig context to connect with
    #[arg(short, long)]
    pub context: Option<String>,

    /// Config map holding the gateway configuration
    #[arg(long)]
    pub config_map: Option<String>,
}
