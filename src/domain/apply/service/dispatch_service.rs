use crate::core::store::resource_store_trait::StoreProvider;
use crate::domain::apply::dto::apply_report_dto::AppliedSummary;
use crate::domain::apply::kind_table::ResourceObject;
use crate::errors::AppError;

/// Routes decoded objects to the apply operation, with store handles drawn
/// from one provider and scoped to the run's target namespace. Cluster-scoped
/// kinds get unscoped handles.
pub struct DispatchTable<'a, P> {
    provider: &'a P,
    namespace: String,
}

impl<'a, P: StoreProvider> DispatchTable<'a, P> {
    pub fn new(provider: &'a P, namespace: &str) -> Self {
        Self {
            provider,
            namespace: namespace.to_string(),
        }
    }

    pub async fn apply(&self, object: ResourceObject) -> Result<AppliedSummary, AppError> {
        object.apply_with(self.provider, &self.namespace).await
    }
}
