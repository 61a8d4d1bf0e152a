use async_trait::async_trait;
use k8s_openapi::{ClusterResourceScope, NamespaceResourceScope};
use kube::api::{ListParams, PostParams};
use kube::core::{ApiResource, DynamicObject};
use kube::{Api, Client, Resource};
use tracing::debug;

use crate::core::client::kube_resources::ObjectMeta;
use crate::core::store::resource_store_trait::{ResourceStore, StoredObject, StoreProvider};
use crate::errors::StoreError;

/// Field manager recorded on every object this tool writes
pub const FIELD_MANAGER: &str = "kube-deploy";

/// `ResourceStore` over a kube-rs `Api<K>`
pub struct KubeStore<K> {
    api: Api<K>,
    post_params: PostParams,
}

impl<K> KubeStore<K> {
    pub fn new(api: Api<K>, dry_run: bool) -> Self {
        let post_params = PostParams {
            dry_run,
            field_manager: Some(FIELD_MANAGER.to_string()),
        };
        Self { api, post_params }
    }
}

fn object_name<K: Resource>(resource: &K) -> Result<&str, StoreError> {
    resource
        .meta()
        .name
        .as_deref()
        .ok_or_else(|| StoreError::Invalid("object has no metadata.name".to_string()))
}

#[async_trait]
impl<K: StoredObject> ResourceStore<K> for KubeStore<K> {
    async fn list(&self) -> Result<Vec<ObjectMeta>, StoreError> {
        let list = self.api.list_metadata(&ListParams::default()).await?;

        debug!("Listed {} object(s)", list.items.len());
        Ok(list.items.into_iter().map(|item| item.metadata).collect())
    }

    async fn get(&self, name: &str) -> Result<K, StoreError> {
        let object = self.api.get(name).await?;

        debug!("Fetched object: {}", name);
        Ok(object)
    }

    async fn create(&self, resource: &K) -> Result<K, StoreError> {
        Ok(self.api.create(&self.post_params, resource).await?)
    }

    async fn update(&self, resource: &K) -> Result<K, StoreError> {
        let name = object_name(resource)?;
        Ok(self.api.replace(name, &self.post_params, resource).await?)
    }
}

/// Builds store handles from one connected client
#[derive(Clone)]
pub struct KubeStoreProvider {
    client: Client,
    dry_run: bool,
}

impl KubeStoreProvider {
    pub fn new(client: Client, dry_run: bool) -> Self {
        Self { client, dry_run }
    }
}

impl StoreProvider for KubeStoreProvider {
    fn namespaced<K>(&self, namespace: &str) -> Box<dyn ResourceStore<K>>
    where
        K: StoredObject + Resource<Scope = NamespaceResourceScope, DynamicType = ()>,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        Box::new(KubeStore::new(api, self.dry_run))
    }

    fn cluster<K>(&self) -> Box<dyn ResourceStore<K>>
    where
        K: StoredObject + Resource<Scope = ClusterResourceScope, DynamicType = ()>,
    {
        let api: Api<K> = Api::all(self.client.clone());
        Box::new(KubeStore::new(api, self.dry_run))
    }

    fn dynamic(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
    ) -> Box<dyn ResourceStore<DynamicObject>> {
        let api: Api<DynamicObject> = match namespace {
            Some(namespace) => Api::namespaced_with(self.client.clone(), namespace, resource),
            None => Api::all_with(self.client.clone(), resource),
        };
        Box::new(KubeStore::new(api, self.dry_run))
    }
}
