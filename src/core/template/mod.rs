use std::path::Path;

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Url};
use tracing::debug;

/// Where a manifest comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Remote(Url),
    File(String),
}

impl TemplateSource {
    pub fn parse(source: &str) -> Self {
        match Url::parse(source) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => TemplateSource::Remote(url),
            Ok(url) if url.scheme() == "file" => TemplateSource::File(url.path().to_string()),
            // Relative paths, bare absolute paths and Windows drive letters
            _ => TemplateSource::File(source.to_string()),
        }
    }
}

/// Reads the manifest text from a local path, `file://` URL or `http(s)://` URL
pub async fn load_template(source: &str, insecure: bool) -> Result<String> {
    match TemplateSource::parse(source) {
        TemplateSource::Remote(url) => fetch_template(url, insecure).await,
        TemplateSource::File(path) => read_template_file(Path::new(&path)).await,
    }
}

async fn fetch_template(url: Url, insecure: bool) -> Result<String> {
    let client = Client::builder()
        .danger_accept_invalid_certs(insecure)
        .build()
        .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

    let resp = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| anyhow!("Failed to fetch template (url={}): {}", url, e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("Template server returned {} (url={})", status, url));
    }

    let text = resp
        .text()
        .await
        .map_err(|e| anyhow!("Failed to read template body (url={}): {}", url, e))?;

    debug!("Fetched template from {} ({} bytes)", url, text.len());
    Ok(text)
}

async fn read_template_file(path: &Path) -> Result<String> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read template file {}", path.display()))?;

    debug!("Read template from {} ({} bytes)", path.display(), text.len());
    Ok(text)
}
