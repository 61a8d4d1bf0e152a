use kube::Resource;
use tracing::{debug, error, info};

use crate::core::store::resource_store_trait::ResourceStore;
use crate::domain::apply::dto::apply_report_dto::{Applied, ApplyAction};
use crate::domain::apply::kind_table::Kind;
use crate::errors::{AppError, StoreOp};

/// Creates `resource` if no object of the same name is listed, otherwise
/// confirms it with a get and replaces it with `resource`.
///
/// One list, at most one get, exactly one create or update; nothing is
/// retried. An object that is listed but gone by the confirmation get is a
/// hard failure, never a fallback to create.
pub async fn apply_resource<K>(
    kind: Kind,
    resource: &K,
    store: &dyn ResourceStore<K>,
) -> Result<Applied<K>, AppError>
where
    K: Resource + Send + Sync,
{
    let name = resource
        .meta()
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or(AppError::MissingName { kind })?;

    let listed = store.list().await.map_err(|e| {
        error!("Error when listing {}", kind);
        AppError::store(StoreOp::List, kind, name, e)
    })?;

    let exists = listed
        .iter()
        .any(|meta| meta.name.as_deref() == Some(name));
    debug!("{} '{}' exists: {}", kind, name, exists);

    if exists {
        store.get(name).await.map_err(|e| {
            error!("Error when getting old {} '{}'", kind, name);
            AppError::store(StoreOp::Get, kind, name, e)
        })?;

        let object = store.update(resource).await.map_err(|e| {
            error!("Error when updating {} '{}'", kind, name);
            AppError::store(StoreOp::Update, kind, name, e)
        })?;

        info!("{} {} updated", kind, name);
        Ok(Applied {
            action: ApplyAction::Updated,
            object,
        })
    } else {
        let object = store.create(resource).await.map_err(|e| {
            error!("Error when creating {} '{}'", kind, name);
            AppError::store(StoreOp::Create, kind, name, e)
        })?;

        info!("{} {} created", kind, name);
        Ok(Applied {
            action: ApplyAction::Created,
            object,
        })
    }
}
