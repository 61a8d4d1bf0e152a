/// Re-export the Kubernetes resource types the deploy engine manages
/// This module provides a centralized place for all K8s resource types

pub use k8s_openapi::api::core::v1::{
    ConfigMap,
    PersistentVolume,
    PersistentVolumeClaim,
    Pod,
    ReplicationController,
    Service,
};

pub use k8s_openapi::api::apps::v1::{
    DaemonSet,
    Deployment,
    ReplicaSet,
    StatefulSet,
};

pub use k8s_openapi::api::networking::v1::{
    Ingress,
};

pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::{
    ObjectMeta,
};

// apps/v1beta1, apps/v1beta2 and extensions/v1beta1 have no typed bindings
// in k8s-openapi; those kinds travel as dynamic objects.
pub use kube::core::{
    ApiResource,
    DynamicObject,
    GroupVersionKind,
};
