use std::process::ExitCode;

use anyhow::Result;
use tracing::{error, info};

use kube_deploy::config::DeployConfig;
use kube_deploy::core::client::kube_client::build_kube_client;
use kube_deploy::core::client::kube_store::KubeStoreProvider;
use kube_deploy::core::template::load_template;
use kube_deploy::domain::apply::{apply_manifest, DocumentStatus};
use kube_deploy::logging::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; the environment alone is enough.
    let _ = dotenvy::dotenv();

    let config = match DeployConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("kube-deploy: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let _guard = match init_tracing(config.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("kube-deploy: failed to initialise logging: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: DeployConfig) -> Result<()> {
    if config.dry_run {
        info!("Dry run: the API server will validate but not persist changes");
    }

    let client = build_kube_client(config.credentials.as_ref(), &config.namespace).await?;
    let manifest = load_template(&config.template, config.template_insecure).await?;
    let provider = KubeStoreProvider::new(client, config.dry_run);

    match apply_manifest(&manifest, &config.namespace, &provider).await {
        Ok(report) => {
            info!(
                "Run {} finished: {} created, {} updated, {} unhandled",
                report.run_id,
                report.count(DocumentStatus::Created),
                report.count(DocumentStatus::Updated),
                report.count(DocumentStatus::Unhandled)
            );
            Ok(())
        }
        Err(failure) => {
            for outcome in &failure.report.outcomes {
                info!(
                    "Applied before failure: document {} {} {} ({:?})",
                    outcome.document,
                    outcome.kind,
                    outcome.name.as_deref().unwrap_or("<unnamed>"),
                    outcome.status
                );
            }
            Err(failure.into())
        }
    }
}
