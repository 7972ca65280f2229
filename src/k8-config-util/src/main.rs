use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use k8_kubeconfig::{ConfigError, ExecCredential, ExecCredentialStatus, KubeConfig};

/// Inspect and rewrite kube config files
#[derive(Debug, Parser)]
#[command(name = "k8-config-util")]
struct Cli {
    /// kubeconfig to read, defaults to KUBECONFIG or ~/.kube/config
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// print current context, cluster and user
    Show,
    /// rewrite config with canonical key order
    Normalize {
        /// write here instead of the file that was read
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// parse exec credential from stdin
    ExecCredential,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn load(path: Option<PathBuf>) -> Result<KubeConfig, ConfigError> {
    match path {
        Some(path) => KubeConfig::from_file(path),
        None => KubeConfig::load(),
    }
}

fn run(cli: Cli) -> Result<(), ConfigError> {
    match cli.command {
        Cmd::Show => {
            let config = load(cli.kubeconfig)?;
            let context = config
                .current_context()
                .ok_or(ConfigError::NoCurrentContext)?;
            println!("context:   {}", context.name.as_deref().unwrap_or_default());
            println!("namespace: {}", context.namespace());
            if let Some(cluster) = config.current_cluster() {
                println!("cluster:   {}", cluster.name.as_deref().unwrap_or_default());
                println!("server:    {}", cluster.server.as_deref().unwrap_or_default());
            }
            if let Some(user) = config.current_user() {
                println!("user:      {}", user.name.as_deref().unwrap_or_default());
                if let Some(exec) = &user.exec {
                    println!("exec:      {}", exec.command.as_deref().unwrap_or_default());
                }
            }
        }
        Cmd::Normalize { output } => {
            let config = load(cli.kubeconfig)?;
            match output {
                Some(path) => config.to_file(path)?,
                None => config.save()?,
            }
        }
        Cmd::ExecCredential => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            let credential: ExecCredential = input.parse()?;
            debug!(kind = ?credential.kind, "parsed exec credential");
            match credential.status {
                Some(ExecCredentialStatus::Token { .. }) => println!("token"),
                Some(ExecCredentialStatus::ClientCert { .. }) => println!("client certificate"),
                None => println!("no credential"),
            }
        }
    }
    Ok(())
}
