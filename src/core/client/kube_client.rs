use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use serde_json::json;
use tracing::debug;

use crate::config::ClusterCredentials;

const CONTEXT_NAME: &str = "kube-deploy";

/// Creates a Kubernetes client from explicit credentials, or falls back to
/// in-cluster / local kubeconfig discovery
pub async fn build_kube_client(
    credentials: Option<&ClusterCredentials>,
    namespace: &str,
) -> Result<Client> {
    let client = match credentials {
        Some(credentials) => {
            debug!("Using explicit credentials for {}", credentials.server);
            let kubeconfig = build_kubeconfig(credentials, namespace)?;
            let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .context("invalid cluster credentials")?;
            Client::try_from(config)?
        }
        None => {
            // Reads the service account token or ~/.kube/config
            debug!("Using default client configuration");
            Client::try_default().await?
        }
    };

    debug!("Kubernetes client initialized successfully");
    Ok(client)
}

/// Assembles a single-context kubeconfig for the given server, CA bundle and token
pub fn build_kubeconfig(credentials: &ClusterCredentials, namespace: &str) -> Result<Kubeconfig> {
    let document = json!({
        "apiVersion": "v1",
        "kind": "Config",
        "clusters": [{
            "name": CONTEXT_NAME,
            "cluster": {
                "server": credentials.server,
                "certificate-authority-data": credentials.certificate_authority,
            }
        }],
        "users": [{
            "name": CONTEXT_NAME,
            "user": { "token": credentials.token }
        }],
        "contexts": [{
            "name": CONTEXT_NAME,
            "context": {
                "cluster": CONTEXT_NAME,
                "user": CONTEXT_NAME,
                "namespace": namespace,
            }
        }],
        "current-context": CONTEXT_NAME,
    });

    serde_json::from_value(document).context("failed to assemble kubeconfig")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> ClusterCredentials {
        ClusterCredentials {
            server: "https://10.0.0.1:6443".to_string(),
            token: "abc123".to_string(),
            certificate_authority: "Y2VydA==".to_string(),
        }
    }

    #[test]
    fn kubeconfig_points_at_the_configured_cluster() {
        let kubeconfig = build_kubeconfig(&credentials(), "staging").unwrap();

        assert_eq!(kubeconfig.current_context.as_deref(), Some(CONTEXT_NAME));

        let cluster = kubeconfig.clusters[0].cluster.as_ref().unwrap();
        assert_eq!(cluster.server.as_deref(), Some("https://10.0.0.1:6443"));
        assert_eq!(cluster.certificate_authority_data.as_deref(), Some("Y2VydA=="));

        let context = kubeconfig.contexts[0].context.as_ref().unwrap();
        assert_eq!(context.namespace.as_deref(), Some("staging"));
        assert_eq!(kubeconfig.auth_infos.len(), 1);
    }
}
