use k8_kubeconfig::KubeConfig;

fn main() {
    // KUBECONFIG if set, otherwise $HOME/.kube/config
    fluvio_future::subscriber::init_tracer(None);
    let config = KubeConfig::load().expect("Load failed");

    println!("current context: {:?}", config.current_context);
    for context in &config.contexts {
        println!(
            "context {:?}: cluster={:?} user={:?} namespace={}",
            context.name,
            context.cluster,
            context.user,
            context.namespace()
        );
    }
    for cluster in &config.clusters {
        println!("cluster {:?}: {:?}", cluster.name, cluster.server);
    }
    for user in &config.users {
        println!(
            "user {:?}: exec={} auth-provider={}",
            user.name,
            user.exec.is_some(),
            user.auth_provider.is_some()
        );
    }
}
