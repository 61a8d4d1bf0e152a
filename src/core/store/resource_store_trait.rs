use std::fmt::Debug;

use async_trait::async_trait;
use k8s_openapi::{ClusterResourceScope, NamespaceResourceScope};
use kube::core::{ApiResource, DynamicObject};
use kube::Resource;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::client::kube_resources::ObjectMeta;
use crate::errors::StoreError;

/// Bounds every object the engine submits to a store.
pub trait StoredObject:
    Resource + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> StoredObject for T where
    T: Resource + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Capability over one kind, scoped to one namespace for namespaced kinds.
/// Every call is attempted exactly once.
#[async_trait]
pub trait ResourceStore<K: Send + Sync>: Send + Sync {
    /// Metadata of every object of this kind currently in scope.
    async fn list(&self) -> Result<Vec<ObjectMeta>, StoreError>;

    async fn get(&self, name: &str) -> Result<K, StoreError>;

    async fn create(&self, resource: &K) -> Result<K, StoreError>;

    /// Replaces the stored object of the same name with `resource`.
    async fn update(&self, resource: &K) -> Result<K, StoreError>;
}

/// Hands out store handles for one run.
pub trait StoreProvider: Send + Sync {
    fn namespaced<K>(&self, namespace: &str) -> Box<dyn ResourceStore<K>>
    where
        K: StoredObject + Resource<Scope = NamespaceResourceScope, DynamicType = ()>;

    fn cluster<K>(&self) -> Box<dyn ResourceStore<K>>
    where
        K: StoredObject + Resource<Scope = ClusterResourceScope, DynamicType = ()>;

    /// Handle for kinds without typed bindings, addressed by `resource`.
    fn dynamic(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
    ) -> Box<dyn ResourceStore<DynamicObject>>;
}
