//! Stack specification types.
//!
//! This module defines the structs that map to a stack document. The schema
//! mirrors the swarm stack format, but every field that may carry a
//! `${parameter}` is a [`TemplateValue`](crate::template::TemplateValue)
//! instead of a concrete scalar.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::template::{
    BoolOrTemplate, DurationOrTemplate, StringTemplate, UInt64OrTemplate, UnitBytesOrTemplate,
};

/// Default `apiVersion` written on new stacks.
pub const DEFAULT_API_VERSION: &str = "compose.docker.com/v1beta2";

/// Default `kind` written on new stacks.
pub const STACK_KIND: &str = "Stack";

/// A stack: identity, desired state and observed status.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stack {
    /// Kind/version discriminator (inline in the document).
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    /// Identity metadata.
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Desired state. Present on every stack that has not been rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<StackSpec>,
    /// Observed state, written only by the orchestrator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StackStatus>,
}

/// Kind and API version of an object, treated as opaque strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeMeta {
    /// Object kind.
    #[serde(default = "default_kind", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// API version, `group/version` or just `version`.
    #[serde(
        rename = "apiVersion",
        default = "default_api_version",
        skip_serializing_if = "String::is_empty"
    )]
    pub api_version: String,
}

/// Group, version and kind split out of a [`TypeMeta`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupVersionKind {
    /// API group; empty for the core group.
    pub group: String,
    /// API version.
    pub version: String,
    /// Object kind.
    pub kind: String,
}

/// Identity metadata of a stack.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectMeta {
    /// Stack name.
    #[serde(default)]
    pub name: String,
    /// Optional namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Annotations.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Desired state of a stack.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StackSpec {
    /// Services, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceConfig>,
    /// Secrets by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub secrets: BTreeMap<String, SecretConfig>,
    /// Config objects by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub configs: BTreeMap<String, ConfigObjConfig>,
}

/// Configuration of one service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Service name.
    #[serde(default)]
    pub name: String,
    /// Capabilities to add.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cap_add: Vec<StringTemplate>,
    /// Capabilities to drop.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cap_drop: Vec<StringTemplate>,
    /// Command override.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<StringTemplate>,
    /// Config objects mounted into the service.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configs: Vec<ServiceConfigObjConfig>,
    /// Deployment policy.
    #[serde(default, skip_serializing_if = "DeployConfig::is_default")]
    pub deploy: DeployConfig,
    /// Entrypoint override.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entrypoint: Vec<StringTemplate>,
    /// Environment variables; a missing value is inherited at deploy time.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, Option<StringTemplate>>,
    /// Extra `host:ip` entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_hosts: Vec<StringTemplate>,
    /// Container hostname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<StringTemplate>,
    /// Health check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheckConfig>,
    /// Container image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<StringTemplate>,
    /// IPC mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipc: Option<StringTemplate>,
    /// Container labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, StringTemplate>,
    /// PID mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<StringTemplate>,
    /// Published ports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ServicePortConfig>,
    /// Privileged mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileged: Option<BoolOrTemplate>,
    /// Read-only root filesystem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<BoolOrTemplate>,
    /// Secrets mounted into the service.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<ServiceSecretConfig>,
    /// Keep stdin open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin_open: Option<BoolOrTemplate>,
    /// Time to wait before killing the container on stop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_grace_period: Option<DurationOrTemplate>,
    /// Tmpfs mounts, one path or a list.
    #[serde(default, skip_serializing_if = "StringTemplateList::is_empty")]
    pub tmpfs: StringTemplateList,
    /// Allocate a TTY.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tty: Option<BoolOrTemplate>,
    /// Numeric user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<i64>,
    /// Volume mounts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<ServiceVolumeConfig>,
    /// Working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<StringTemplate>,
}

/// Port configuration of a service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServicePortConfig {
    /// Publish mode (`ingress` or `host`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<StringTemplate>,
    /// Container port.
    pub target: UInt64OrTemplate,
    /// Published port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<UInt64OrTemplate>,
    /// Protocol (`tcp` or `udp`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<StringTemplate>,
}

/// A file-backed swarm object (secret or config).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileObjectConfig {
    /// Object name in the cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<StringTemplate>,
    /// Local file holding the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<StringTemplate>,
    /// Reference to an object not managed by the stack.
    #[serde(default, skip_serializing_if = "External::is_default")]
    pub external: External,
    /// Object labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// Secret definition.
pub type SecretConfig = FileObjectConfig;

/// Config object definition.
pub type ConfigObjConfig = FileObjectConfig;

/// Marks a resource as existing outside the stack.
///
/// `name` is deprecated in favor of the object's own `name`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct External {
    /// Deprecated external name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Whether the object is external.
    #[serde(default)]
    pub external: bool,
}

/// A service's reference to a secret or config object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileReferenceConfig {
    /// Name of the referenced object.
    pub source: StringTemplate,
    /// Mount path or file name inside the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<StringTemplate>,
    /// Owner user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<StringTemplate>,
    /// Owner group id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gid: Option<StringTemplate>,
    /// File mode, written in base 10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<UInt64OrTemplate>,
}

/// Reference to a config object.
pub type ServiceConfigObjConfig = FileReferenceConfig;

/// Reference to a secret.
pub type ServiceSecretConfig = FileReferenceConfig;

/// Deployment policy of a service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DeployConfig {
    /// Scheduling mode (`replicated` or `global`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<StringTemplate>,
    /// Number of replicas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<UInt64OrTemplate>,
    /// Service labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, StringTemplate>,
    /// Rolling update policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_config: Option<UpdateConfig>,
    /// Resource limits and reservations.
    #[serde(default, skip_serializing_if = "Resources::is_default")]
    pub resources: Resources,
    /// Restart policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<RestartPolicy>,
    /// Placement constraints.
    #[serde(default, skip_serializing_if = "Placement::is_default")]
    pub placement: Placement,
}

/// Rolling update policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UpdateConfig {
    /// Tasks updated at once. `paralellism` is accepted for older documents.
    #[serde(default, alias = "paralellism", skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<UInt64OrTemplate>,
    /// Delay between update batches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<DurationOrTemplate>,
}

/// Resource limits and reservations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Resources {
    /// Upper bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<Resource>,
    /// Guaranteed amounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservations: Option<Resource>,
}

/// One resource bound.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Resource {
    /// CPU share, e.g. `0.5`.
    #[serde(rename = "cpus", default, skip_serializing_if = "Option::is_none")]
    pub nano_cpus: Option<StringTemplate>,
    /// Memory size, e.g. `512m`.
    #[serde(rename = "memory", default, skip_serializing_if = "Option::is_none")]
    pub memory_bytes: Option<UnitBytesOrTemplate>,
}

/// Restart policy of a service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RestartPolicy {
    /// `none`, `on-failure` or `any`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Delay between restart attempts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<DurationOrTemplate>,
    /// Maximum number of attempts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<UInt64OrTemplate>,
    /// Window used to evaluate the restart policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<DurationOrTemplate>,
}

/// Placement of a service's tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Placement {
    /// Node constraints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
}

/// Node constraints, grouped by axis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Constraints {
    /// Node operating system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<Constraint>,
    /// Node architecture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<Constraint>,
    /// Node hostname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<Constraint>,
    /// Node labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, Constraint>,
}

/// A value and its comparison operator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Constraint {
    /// Value compared against the node attribute.
    pub value: StringTemplate,
    /// Comparison operator.
    #[serde(default)]
    pub operator: ConstraintOperator,
}

/// Constraint comparison operator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ConstraintOperator {
    /// `==`
    #[default]
    #[serde(rename = "==")]
    Equal,
    /// `!=`
    #[serde(rename = "!=")]
    NotEqual,
}

/// Health check of a service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HealthCheckConfig {
    /// Check command.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test: Vec<String>,
    /// Time allowed for one check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<DurationOrTemplate>,
    /// Time between checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<DurationOrTemplate>,
    /// Grace period before failures count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_period: Option<DurationOrTemplate>,
    /// Consecutive failures before unhealthy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<UInt64OrTemplate>,
}

/// A volume mounted into a service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServiceVolumeConfig {
    /// Mount type (`volume`, `bind` or `tmpfs`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
    /// Volume name or host path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<StringTemplate>,
    /// Mount path inside the container.
    pub target: StringTemplate,
    /// Mount read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<BoolOrTemplate>,
}

/// Deployment phase of a stack.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StackPhase {
    /// The stack is available.
    Available,
    /// The deployment is progressing.
    Progressing,
    /// One of the stack's members failed to be created or deleted.
    Failure,
}

/// Observed state of a stack.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StackStatus {
    /// Current phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<StackPhase>,
    /// Human readable details about the phase.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

/// A list of text templates written either as one string or as a sequence.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct StringTemplateList(pub Vec<StringTemplate>);

// Default value functions

fn default_kind() -> String {
    String::from(STACK_KIND)
}

fn default_api_version() -> String {
    String::from(DEFAULT_API_VERSION)
}

impl Default for TypeMeta {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            api_version: default_api_version(),
        }
    }
}

impl TypeMeta {
    /// Splits the API version into group and version.
    #[must_use]
    pub fn group_version_kind(&self) -> GroupVersionKind {
        let (group, version) = self
            .api_version
            .rsplit_once('/')
            .unwrap_or(("", self.api_version.as_str()));
        GroupVersionKind {
            group: group.to_string(),
            version: version.to_string(),
            kind: self.kind.clone(),
        }
    }

    /// Writes group, version and kind back.
    pub fn set_group_version_kind(&mut self, gvk: GroupVersionKind) {
        self.api_version = if gvk.group.is_empty() {
            gvk.version
        } else {
            format!("{}/{}", gvk.group, gvk.version)
        };
        self.kind = gvk.kind;
    }
}

impl Stack {
    /// Creates a stack with default type meta.
    #[must_use]
    pub fn new(name: impl Into<String>, spec: StackSpec) -> Self {
        Self {
            type_meta: TypeMeta::default(),
            metadata: ObjectMeta {
                name: name.into(),
                ..ObjectMeta::default()
            },
            spec: Some(spec),
            status: None,
        }
    }

    /// Returns the stack name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

impl StackSpec {
    /// Returns the service with the given name.
    #[must_use]
    pub fn service(&self, name: &str) -> Option<&ServiceConfig> {
        self.services.iter().find(|s| s.name == name)
    }

    /// Returns service names in declaration order.
    #[must_use]
    pub fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name.as_str()).collect()
    }
}

impl ServiceConfig {
    /// Creates an empty service with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl DeployConfig {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Resources {
    const fn is_default(&self) -> bool {
        self.limits.is_none() && self.reservations.is_none()
    }
}

impl Placement {
    const fn is_default(&self) -> bool {
        self.constraints.is_none()
    }
}

impl External {
    fn is_default(&self) -> bool {
        !self.external && self.name.is_empty()
    }
}

impl ConstraintOperator {
    /// Returns the operator as written in swarm constraint expressions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }
}

impl fmt::Display for StackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            Self::Available => "Available",
            Self::Progressing => "Progressing",
            Self::Failure => "Failure",
        };
        f.write_str(phase)
    }
}

impl StringTemplateList {
    /// Returns true if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for StringTemplateList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OneOrMany;

        impl<'de> Visitor<'de> for OneOrMany {
            type Value = StringTemplateList;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or a list of strings")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                StringTemplate::deserialize(de::value::StrDeserializer::<E>::new(v))
                    .map(|one| StringTemplateList(vec![one]))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element::<StringTemplate>()? {
                    items.push(item);
                }
                Ok(StringTemplateList(items))
            }
        }

        deserializer.deserialize_any(OneOrMany)
    }
}
