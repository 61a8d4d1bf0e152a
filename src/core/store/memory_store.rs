//! In-memory stand-in for a cluster, used by the engine's tests. Records
//! every call and can inject one-shot faults.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use k8s_openapi::{ClusterResourceScope, NamespaceResourceScope};
use kube::core::{ApiResource, DynamicObject};
use kube::Resource;
use serde::Serialize;
use serde_json::Value;

use crate::core::client::kube_resources::ObjectMeta;
use crate::core::store::resource_store_trait::{ResourceStore, StoredObject, StoreProvider};
use crate::errors::{StoreError, StoreOp};

type ObjectKey = (String, Option<String>, String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub op: StoreOp,
    pub type_key: String,
    pub namespace: Option<String>,
    pub name: Option<String>,
}

#[derive(Default)]
pub struct MemoryCluster {
    objects: Mutex<BTreeMap<ObjectKey, Value>>,
    calls: Mutex<Vec<StoreCall>>,
    faults: Mutex<Vec<(StoreOp, StoreError)>>,
    vanishing: Mutex<Vec<String>>,
    revision: Mutex<u64>,
}

pub fn type_key<K: Resource<DynamicType = ()>>() -> String {
    format!("{}/{}", K::api_version(&()), K::kind(&()))
}

impl MemoryCluster {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Puts `object` in the store without recording a call.
    pub fn seed<K>(&self, namespace: Option<&str>, object: &K)
    where
        K: Resource<DynamicType = ()> + Serialize,
    {
        let name = object.meta().name.clone().unwrap_or_default();
        let value = serde_json::to_value(object).unwrap();
        self.objects.lock().unwrap().insert(
            (type_key::<K>(), namespace.map(str::to_string), name),
            value,
        );
    }

    /// Makes the next `op` call fail with `error`.
    pub fn fail_next(&self, op: StoreOp, error: StoreError) {
        self.faults.lock().unwrap().push((op, error));
    }

    /// Deletes `name` right before it is fetched, as if a concurrent client
    /// removed it between list and get.
    pub fn vanish_before_get(&self, name: &str) {
        self.vanishing.lock().unwrap().push(name.to_string());
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: StoreOp) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.op == op).count()
    }

    pub fn object(&self, type_key: &str, namespace: Option<&str>, name: &str) -> Option<Value> {
        self.objects
            .lock()
            .unwrap()
            .get(&(type_key.to_string(), namespace.map(str::to_string), name.to_string()))
            .cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    fn record(&self, op: StoreOp, type_key: &str, namespace: &Option<String>, name: Option<&str>) {
        self.calls.lock().unwrap().push(StoreCall {
            op,
            type_key: type_key.to_string(),
            namespace: namespace.clone(),
            name: name.map(str::to_string),
        });
    }

    fn take_fault(&self, op: StoreOp) -> Result<(), StoreError> {
        let mut faults = self.faults.lock().unwrap();
        match faults.iter().position(|(fault_op, _)| *fault_op == op) {
            Some(index) => Err(faults.remove(index).1),
            None => Ok(()),
        }
    }

    fn next_revision(&self) -> String {
        let mut revision = self.revision.lock().unwrap();
        *revision += 1;
        revision.to_string()
    }
}

pub struct MemoryStore<K> {
    cluster: Arc<MemoryCluster>,
    type_key: String,
    namespace: Option<String>,
    _kind: PhantomData<fn() -> K>,
}

impl<K> MemoryStore<K> {
    fn key(&self, name: &str) -> ObjectKey {
        (self.type_key.clone(), self.namespace.clone(), name.to_string())
    }

    fn record(&self, op: StoreOp, name: Option<&str>) {
        self.cluster.record(op, &self.type_key, &self.namespace, name);
    }
}

fn name_of<K: Resource>(resource: &K) -> Result<String, StoreError> {
    resource
        .meta()
        .name
        .clone()
        .ok_or_else(|| StoreError::Invalid("object has no metadata.name".to_string()))
}

fn decode<K: StoredObject>(value: Value) -> Result<K, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Transport(e.to_string()))
}

#[async_trait]
impl<K: StoredObject> ResourceStore<K> for MemoryStore<K> {
    async fn list(&self) -> Result<Vec<ObjectMeta>, StoreError> {
        self.record(StoreOp::List, None);
        self.cluster.take_fault(StoreOp::List)?;

        let objects = self.cluster.objects.lock().unwrap();
        let listed: Result<Vec<ObjectMeta>, StoreError> = objects
            .iter()
            .filter(|((type_key, namespace, _), _)| {
                *type_key == self.type_key && *namespace == self.namespace
            })
            .map(|(_, value)| {
                serde_json::from_value(value["metadata"].clone())
                    .map_err(|e| StoreError::Transport(e.to_string()))
            })
            .collect();
        listed
    }

    async fn get(&self, name: &str) -> Result<K, StoreError> {
        self.record(StoreOp::Get, Some(name));
        self.cluster.take_fault(StoreOp::Get)?;

        let mut vanishing = self.cluster.vanishing.lock().unwrap();
        if let Some(index) = vanishing.iter().position(|n| n == name) {
            vanishing.remove(index);
            self.cluster.objects.lock().unwrap().remove(&self.key(name));
        }
        drop(vanishing);

        let value = self.cluster.objects.lock().unwrap().get(&self.key(name)).cloned();
        match value {
            Some(value) => decode(value),
            None => Err(StoreError::NotFound(name.to_string())),
        }
    }

    async fn create(&self, resource: &K) -> Result<K, StoreError> {
        let name = name_of(resource)?;
        self.record(StoreOp::Create, Some(&name));
        self.cluster.take_fault(StoreOp::Create)?;

        let key = self.key(&name);
        if self.cluster.objects.lock().unwrap().contains_key(&key) {
            return Err(StoreError::Conflict(format!("{} already exists", name)));
        }
        self.write(key, resource)
    }

    async fn update(&self, resource: &K) -> Result<K, StoreError> {
        let name = name_of(resource)?;
        self.record(StoreOp::Update, Some(&name));
        self.cluster.take_fault(StoreOp::Update)?;

        let key = self.key(&name);
        if !self.cluster.objects.lock().unwrap().contains_key(&key) {
            return Err(StoreError::NotFound(name));
        }
        self.write(key, resource)
    }
}

impl<K: StoredObject> MemoryStore<K> {
    fn write(&self, key: ObjectKey, resource: &K) -> Result<K, StoreError> {
        let mut value =
            serde_json::to_value(resource).map_err(|e| StoreError::Invalid(e.to_string()))?;
        value["metadata"]["resourceVersion"] = Value::String(self.cluster.next_revision());
        self.cluster.objects.lock().unwrap().insert(key, value.clone());
        decode(value)
    }
}

#[derive(Clone)]
pub struct MemoryProvider {
    pub cluster: Arc<MemoryCluster>,
}

impl MemoryProvider {
    pub fn new(cluster: Arc<MemoryCluster>) -> Self {
        Self { cluster }
    }

    fn store<K>(&self, type_key: String, namespace: Option<&str>) -> Box<dyn ResourceStore<K>>
    where
        K: StoredObject,
    {
        Box::new(MemoryStore {
            cluster: self.cluster.clone(),
            type_key,
            namespace: namespace.map(str::to_string),
            _kind: PhantomData,
        })
    }
}

impl StoreProvider for MemoryProvider {
    fn namespaced<K>(&self, namespace: &str) -> Box<dyn ResourceStore<K>>
    where
        K: StoredObject + Resource<Scope = NamespaceResourceScope, DynamicType = ()>,
    {
        self.store(type_key::<K>(), Some(namespace))
    }

    fn cluster<K>(&self) -> Box<dyn ResourceStore<K>>
    where
        K: StoredObject + Resource<Scope = ClusterResourceScope, DynamicType = ()>,
    {
        self.store(type_key::<K>(), None)
    }

    fn dynamic(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
    ) -> Box<dyn ResourceStore<DynamicObject>> {
        self.store(format!("{}/{}", resource.api_version, resource.kind), namespace)
    }
}
