pub mod decoder;
pub mod dto;
pub mod kind_table;
pub mod service;

pub use decoder::{split_documents, DecodedDocument, ManifestDecoder, YamlDecoder};
pub use dto::apply_report_dto::{ApplyReport, DocumentOutcome, DocumentStatus};
pub use kind_table::{Kind, ResourceObject, Scope};
pub use service::manifest_service::{apply_manifest, apply_manifest_with};
