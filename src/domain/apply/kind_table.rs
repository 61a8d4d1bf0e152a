//! The table of managed kinds.
//!
//! Every entry names a kind tag, the payload type it decodes into, its
//! group/version/kind/plural, and how its store handle is scoped. The macro
//! expands the table into [`Kind`], the tagged [`ResourceObject`], the
//! per-kind decoder and the dispatch into the one generic apply operation.

use std::fmt;

use kube::Resource;

use crate::core::client::kube_resources::{
    ApiResource, ConfigMap, DaemonSet, Deployment, DynamicObject, GroupVersionKind, Ingress,
    PersistentVolume, PersistentVolumeClaim, Pod, ReplicaSet, ReplicationController, Service,
    StatefulSet,
};
use crate::core::store::resource_store_trait::StoreProvider;
use crate::domain::apply::dto::apply_report_dto::AppliedSummary;
use crate::domain::apply::service::apply_resource_service::apply_resource;
use crate::errors::AppError;

/// How a kind's store handle is scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Namespaced,
    Cluster,
}

macro_rules! store_handle {
    (namespaced, $provider:expr, $namespace:expr, $kind:expr, $payload:ty) => {
        $provider.namespaced::<$payload>($namespace)
    };
    (cluster, $provider:expr, $namespace:expr, $kind:expr, $payload:ty) => {
        $provider.cluster::<$payload>()
    };
    (dynamic, $provider:expr, $namespace:expr, $kind:expr, $payload:ty) => {
        $provider.dynamic(&$kind.api_resource(), Some($namespace))
    };
}

macro_rules! handle_scope {
    (cluster) => {
        Scope::Cluster
    };
    ($other:ident) => {
        Scope::Namespaced
    };
}

macro_rules! managed_kinds {
    ($(
        $variant:ident: $payload:ty = ($group:literal, $version:literal, $kind:literal, $plural:literal), $handle:ident;
    )+) => {
        /// A kind together with its API-version family.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Kind {
            $( $variant, )+
        }

        impl Kind {
            pub const ALL: &'static [Kind] = &[ $( Kind::$variant, )+ ];

            pub fn group(self) -> &'static str {
                match self { $( Kind::$variant => $group, )+ }
            }

            pub fn version(self) -> &'static str {
                match self { $( Kind::$variant => $version, )+ }
            }

            pub fn name(self) -> &'static str {
                match self { $( Kind::$variant => $kind, )+ }
            }

            pub fn plural(self) -> &'static str {
                match self { $( Kind::$variant => $plural, )+ }
            }

            pub fn scope(self) -> Scope {
                match self { $( Kind::$variant => handle_scope!($handle), )+ }
            }

            /// Turns a mapping whose type meta selected this kind into its payload.
            pub(crate) fn decode(
                self,
                value: serde_yaml::Value,
            ) -> Result<ResourceObject, serde_yaml::Error> {
                match self {
                    $(
                        Kind::$variant => serde_yaml::from_value::<$payload>(value)
                            .map(|object| ResourceObject::$variant(Box::new(object))),
                    )+
                }
            }
        }

        /// A decoded document, tagged by kind.
        #[derive(Debug, Clone)]
        pub enum ResourceObject {
            $( $variant(Box<$payload>), )+
        }

        impl ResourceObject {
            pub fn kind(&self) -> Kind {
                match self { $( ResourceObject::$variant(_) => Kind::$variant, )+ }
            }

            pub fn name(&self) -> Option<&str> {
                match self {
                    $( ResourceObject::$variant(object) => object.meta().name.as_deref(), )+
                }
            }

            /// Routes the object to the apply operation with a handle of its
            /// kind. Cluster-scoped kinds ignore `namespace`.
            pub(crate) async fn apply_with<P: StoreProvider>(
                self,
                provider: &P,
                namespace: &str,
            ) -> Result<AppliedSummary, AppError> {
                match self {
                    $(
                        ResourceObject::$variant(object) => {
                            let kind = Kind::$variant;
                            let store = store_handle!($handle, provider, namespace, kind, $payload);
                            let applied = apply_resource(kind, &*object, &*store).await?;
                            Ok(AppliedSummary::from(applied))
                        }
                    )+
                }
            }
        }
    };
}

managed_kinds! {
    AppsV1Deployment: Deployment = ("apps", "v1", "Deployment", "deployments"), namespaced;
    AppsV1DaemonSet: DaemonSet = ("apps", "v1", "DaemonSet", "daemonsets"), namespaced;
    AppsV1ReplicaSet: ReplicaSet = ("apps", "v1", "ReplicaSet", "replicasets"), namespaced;
    AppsV1StatefulSet: StatefulSet = ("apps", "v1", "StatefulSet", "statefulsets"), namespaced;

    AppsV1beta1Deployment: DynamicObject = ("apps", "v1beta1", "Deployment", "deployments"), dynamic;
    AppsV1beta1StatefulSet: DynamicObject = ("apps", "v1beta1", "StatefulSet", "statefulsets"), dynamic;

    AppsV1beta2Deployment: DynamicObject = ("apps", "v1beta2", "Deployment", "deployments"), dynamic;
    AppsV1beta2DaemonSet: DynamicObject = ("apps", "v1beta2", "DaemonSet", "daemonsets"), dynamic;
    AppsV1beta2ReplicaSet: DynamicObject = ("apps", "v1beta2", "ReplicaSet", "replicasets"), dynamic;
    AppsV1beta2StatefulSet: DynamicObject = ("apps", "v1beta2", "StatefulSet", "statefulsets"), dynamic;

    CoreV1ConfigMap: ConfigMap = ("", "v1", "ConfigMap", "configmaps"), namespaced;
    CoreV1PersistentVolume: PersistentVolume = ("", "v1", "PersistentVolume", "persistentvolumes"), cluster;
    CoreV1PersistentVolumeClaim: PersistentVolumeClaim = ("", "v1", "PersistentVolumeClaim", "persistentvolumeclaims"), namespaced;
    CoreV1Pod: Pod = ("", "v1", "Pod", "pods"), namespaced;
    CoreV1ReplicationController: ReplicationController = ("", "v1", "ReplicationController", "replicationcontrollers"), namespaced;
    CoreV1Service: Service = ("", "v1", "Service", "services"), namespaced;

    ExtensionsV1beta1Deployment: DynamicObject = ("extensions", "v1beta1", "Deployment", "deployments"), dynamic;
    ExtensionsV1beta1DaemonSet: DynamicObject = ("extensions", "v1beta1", "DaemonSet", "daemonsets"), dynamic;
    ExtensionsV1beta1ReplicaSet: DynamicObject = ("extensions", "v1beta1", "ReplicaSet", "replicasets"), dynamic;
    ExtensionsV1beta1Ingress: DynamicObject = ("extensions", "v1beta1", "Ingress", "ingresses"), dynamic;

    NetworkingV1Ingress: Ingress = ("networking.k8s.io", "v1", "Ingress", "ingresses"), namespaced;
}

impl Kind {
    /// `group/version`, or just `version` for the core group.
    pub fn api_version(self) -> String {
        if self.group().is_empty() {
            self.version().to_string()
        } else {
            format!("{}/{}", self.group(), self.version())
        }
    }

    pub fn api_resource(self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(self.group(), self.version(), self.name());
        ApiResource::from_gvk_with_plural(&gvk, self.plural())
    }

    /// Looks up the entry for a document's `apiVersion` and `kind`.
    pub fn from_type_meta(api_version: &str, kind: &str) -> Option<Kind> {
        let (group, version) = match api_version.split_once('/') {
            Some((group, version)) => (group, version),
            None => ("", api_version),
        };

        Kind::ALL
            .iter()
            .copied()
            .find(|k| k.group() == group && k.version() == version && k.name() == kind)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.api_version())
    }
}
