use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::core::store::resource_store_trait::StoreProvider;
use crate::domain::apply::decoder::{split_documents, DecodedDocument, ManifestDecoder, YamlDecoder};
use crate::domain::apply::dto::apply_report_dto::{ApplyReport, DocumentOutcome, DocumentStatus};
use crate::domain::apply::service::dispatch_service::DispatchTable;
use crate::errors::{AppError, ApplyFailure};

/// Applies every document of `manifest` in order, decoding with YAML.
pub async fn apply_manifest<P: StoreProvider>(
    manifest: &str,
    namespace: &str,
    provider: &P,
) -> Result<ApplyReport, ApplyFailure> {
    apply_manifest_with(&YamlDecoder, manifest, namespace, provider).await
}

/// Applies every document of `manifest` in order.
///
/// Empty documents are skipped and unhandled kinds are reported and
/// skipped. The first decode or store failure ends the run; documents
/// applied before it stay applied.
pub async fn apply_manifest_with<D, P>(
    decoder: &D,
    manifest: &str,
    namespace: &str,
    provider: &P,
) -> Result<ApplyReport, ApplyFailure>
where
    D: ManifestDecoder,
    P: StoreProvider,
{
    let run_id = Uuid::new_v4();
    let span = info_span!("apply_manifest", %run_id, namespace);

    async move {
        let table = DispatchTable::new(provider, namespace);
        let mut report = ApplyReport::start(run_id, namespace);

        for (index, document) in split_documents(manifest).into_iter().enumerate() {
            let position = index + 1;

            let decoded = match decoder.decode(document) {
                Ok(decoded) => decoded,
                Err(source) => {
                    error!("Error when decoding document {}: {}", position, source);
                    return Err(ApplyFailure {
                        document: position,
                        error: AppError::Decode {
                            document: position,
                            source,
                        },
                        report: report.finish(),
                    });
                }
            };

            match decoded {
                DecodedDocument::Empty => {
                    debug!("Document {} is empty, skipping", position);
                }
                DecodedDocument::Unhandled {
                    api_version,
                    kind,
                    name,
                } => {
                    warn!(
                        "Document {}: {} ({}) {} is not handled, skipping",
                        position,
                        kind,
                        api_version,
                        name.as_deref().unwrap_or("<unnamed>")
                    );
                    report.push(DocumentOutcome {
                        document: position,
                        api_version,
                        kind,
                        name,
                        status: DocumentStatus::Unhandled,
                        resource_version: None,
                    });
                }
                DecodedDocument::Object(object) => {
                    let kind = object.kind();
                    let name = object.name().map(str::to_string);

                    match table.apply(object).await {
                        Ok(summary) => report.push(DocumentOutcome {
                            document: position,
                            api_version: kind.api_version(),
                            kind: kind.name().to_string(),
                            name,
                            status: summary.action.into(),
                            resource_version: summary.resource_version,
                        }),
                        Err(error) => {
                            return Err(ApplyFailure {
                                document: position,
                                error,
                                report: report.finish(),
                            });
                        }
                    }
                }
            }
        }

        let report = report.finish();
        info!(
            "Manifest applied: {} created, {} updated, {} unhandled",
            report.count(DocumentStatus::Created),
            report.count(DocumentStatus::Updated),
            report.count(DocumentStatus::Unhandled)
        );
        Ok(report)
    }
    .instrument(span)
    .await
}
