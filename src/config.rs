use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use validator::Validate;

pub const DEFAULT_NAMESPACE: &str = "default";

/// Server, bearer token and base64 CA bundle for an explicit connection.
#[derive(Debug, Clone, Validate)]
pub struct ClusterCredentials {
    #[validate(url)]
    pub server: String,

    #[validate(length(min = 1))]
    pub token: String,

    #[validate(length(min = 1))]
    pub certificate_authority: String,
}

/// Run configuration, resolved once by the binary and handed to the engine.
#[derive(Debug, Clone, Validate)]
pub struct DeployConfig {
    /// `None` means in-cluster / kubeconfig discovery.
    #[validate(nested)]
    pub credentials: Option<ClusterCredentials>,

    #[validate(length(min = 1, max = 63))]
    pub namespace: String,

    /// Local path, `file://` URL or `http(s)://` URL of the manifest.
    #[validate(length(min = 1))]
    pub template: String,

    pub template_insecure: bool,

    pub dry_run: bool,

    pub log_dir: Option<PathBuf>,
}

impl DeployConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves every setting through `lookup`, accepting both the direct
    /// name and its `PLUGIN_` form.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let setting = |name: &str, plugin_name: &str| {
            lookup(name)
                .or_else(|| lookup(plugin_name))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let server = setting("KUBERNETES_SERVER", "PLUGIN_SERVER");
        let token = setting("KUBERNETES_TOKEN", "PLUGIN_TOKEN");
        let cert = setting("KUBERNETES_CERT", "PLUGIN_CERT");

        let credentials = match (server, token, cert) {
            (Some(server), Some(token), Some(certificate_authority)) => Some(ClusterCredentials {
                server,
                token,
                certificate_authority,
            }),
            (None, None, None) => None,
            (server, token, cert) => {
                let missing: Vec<&str> = [
                    ("KUBERNETES_SERVER", server.is_none()),
                    ("KUBERNETES_TOKEN", token.is_none()),
                    ("KUBERNETES_CERT", cert.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                bail!("{} is not defined", missing.join(", "));
            }
        };

        let template = setting("KUBERNETES_TEMPLATE", "PLUGIN_TEMPLATE")
            .ok_or_else(|| anyhow!("KUBERNETES_TEMPLATE is not defined"))?;

        let config = DeployConfig {
            credentials,
            namespace: setting("KUBERNETES_NAMESPACE", "PLUGIN_NAMESPACE")
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            template,
            template_insecure: parse_flag(
                "KUBE_DEPLOY_TEMPLATE_INSECURE",
                setting("KUBE_DEPLOY_TEMPLATE_INSECURE", "PLUGIN_TEMPLATE_INSECURE"),
            )?,
            dry_run: parse_flag(
                "KUBE_DEPLOY_DRY_RUN",
                setting("KUBE_DEPLOY_DRY_RUN", "PLUGIN_DRY_RUN"),
            )?,
            log_dir: setting("KUBE_DEPLOY_LOG_DIR", "PLUGIN_LOG_DIR").map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }
}

fn parse_flag(name: &str, value: Option<String>) -> Result<bool> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(anyhow!("{} must be a boolean, got '{}'", name, other)),
    }
}
