//! Rendered stack types.
//!
//! These are the concrete counterparts of the types in [`super::spec`]: every
//! placeholder has been substituted and every field has its final type. This
//! is the shape handed to deployment collaborators.
//!
//! Durations serialize as integer nanoseconds and byte sizes as integer bytes.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::time::Duration;

use super::spec::{ConstraintOperator, External, ObjectMeta, StackStatus, TypeMeta};

/// A fully rendered stack.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RenderedStack {
    /// Kind/version discriminator, copied verbatim.
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    /// Identity metadata, copied verbatim.
    pub metadata: ObjectMeta,
    /// Concrete desired state.
    pub spec: RenderedStackSpec,
    /// Observed state, copied verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StackStatus>,
}

/// Concrete desired state.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RenderedStackSpec {
    /// Services, in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<RenderedService>,
    /// Secrets by name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub secrets: BTreeMap<String, RenderedFileObject>,
    /// Config objects by name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub configs: BTreeMap<String, RenderedFileObject>,
}

/// Concrete service.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RenderedService {
    /// Service name.
    pub name: String,
    /// Capabilities to add.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cap_add: Vec<String>,
    /// Capabilities to drop.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cap_drop: Vec<String>,
    /// Command override.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    /// Config object references.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub configs: Vec<RenderedFileReference>,
    /// Deployment policy.
    pub deploy: RenderedDeploy,
    /// Entrypoint override.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entrypoint: Vec<String>,
    /// Environment variables.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, Option<String>>,
    /// Extra hosts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_hosts: Vec<String>,
    /// Hostname.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Health check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check: Option<RenderedHealthCheck>,
    /// Image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// IPC mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipc: Option<String>,
    /// Labels.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// PID mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,
    /// Ports.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<RenderedPort>,
    /// Privileged mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privileged: Option<bool>,
    /// Read-only root filesystem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    /// Secret references.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<RenderedFileReference>,
    /// Keep stdin open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin_open: Option<bool>,
    /// Stop grace period.
    #[serde(serialize_with = "nanos", skip_serializing_if = "Option::is_none")]
    pub stop_grace_period: Option<Duration>,
    /// Tmpfs mounts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tmpfs: Vec<String>,
    /// TTY allocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tty: Option<bool>,
    /// Numeric user id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<i64>,
    /// Volume mounts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<RenderedVolume>,
    /// Working directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

/// Concrete port.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RenderedPort {
    /// Publish mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Container port.
    pub target: u64,
    /// Published port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<u64>,
    /// Protocol.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// Concrete secret or config object.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RenderedFileObject {
    /// Object name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Content file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// External marker.
    pub external: External,
    /// Labels.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// Concrete secret or config reference.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RenderedFileReference {
    /// Referenced object.
    pub source: String,
    /// Target inside the container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Owner user id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Owner group id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gid: Option<String>,
    /// File mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<u64>,
}

/// Concrete deployment policy.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RenderedDeploy {
    /// Scheduling mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Replica count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u64>,
    /// Service labels.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Rolling update policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_config: Option<RenderedUpdateConfig>,
    /// Resources.
    pub resources: RenderedResources,
    /// Restart policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<RenderedRestartPolicy>,
    /// Placement.
    pub placement: RenderedPlacement,
}

/// Concrete rolling update policy.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RenderedUpdateConfig {
    /// Tasks updated at once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<u64>,
    /// Delay between batches.
    #[serde(serialize_with = "nanos", skip_serializing_if = "Option::is_none")]
    pub delay: Option<Duration>,
}

/// Concrete resources.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RenderedResources {
    /// Upper bounds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<RenderedResource>,
    /// Guaranteed amounts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservations: Option<RenderedResource>,
}

/// Concrete resource bound.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RenderedResource {
    /// CPU share text.
    #[serde(rename = "cpus", skip_serializing_if = "Option::is_none")]
    pub nano_cpus: Option<String>,
    /// Memory in bytes.
    #[serde(rename = "memory", skip_serializing_if = "Option::is_none")]
    pub memory_bytes: Option<u64>,
}

/// Concrete restart policy.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RenderedRestartPolicy {
    /// Restart condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Delay between attempts.
    #[serde(serialize_with = "nanos", skip_serializing_if = "Option::is_none")]
    pub delay: Option<Duration>,
    /// Maximum attempts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u64>,
    /// Evaluation window.
    #[serde(serialize_with = "nanos", skip_serializing_if = "Option::is_none")]
    pub window: Option<Duration>,
}

/// Concrete placement.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RenderedPlacement {
    /// Node constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<RenderedConstraints>,
}

/// Concrete node constraints.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RenderedConstraints {
    /// Operating system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<RenderedConstraint>,
    /// Architecture.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<RenderedConstraint>,
    /// Hostname.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<RenderedConstraint>,
    /// Node labels.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, RenderedConstraint>,
}

/// Concrete constraint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RenderedConstraint {
    /// Compared value.
    pub value: String,
    /// Operator.
    pub operator: ConstraintOperator,
}

/// Concrete health check.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RenderedHealthCheck {
    /// Check command.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub test: Vec<String>,
    /// Timeout per check.
    #[serde(serialize_with = "nanos", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    /// Interval between checks.
    #[serde(serialize_with = "nanos", skip_serializing_if = "Option::is_none")]
    pub interval: Option<Duration>,
    /// Start period.
    #[serde(serialize_with = "nanos", skip_serializing_if = "Option::is_none")]
    pub start_period: Option<Duration>,
    /// Retries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u64>,
}

/// Concrete volume mount.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RenderedVolume {
    /// Mount type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
    /// Source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Target.
    pub target: String,
    /// Read-only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
}

/// Serializes a duration as integer nanoseconds.
fn nanos<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(duration) => {
            let nanos = u64::try_from(duration.as_nanos()).map_err(serde::ser::Error::custom)?;
            serializer.serialize_u64(nanos)
        }
        None => serializer.serialize_none(),
    }
}

impl RenderedStackSpec {
    /// Returns the service with the given name.
    #[must_use]
    pub fn service(&self, name: &str) -> Option<&RenderedService> {
        self.services.iter().find(|s| s.name == name)
    }
}

impl RenderedConstraints {
    /// Returns the constraints as swarm expressions, e.g. `node.platform.os==linux`.
    #[must_use]
    pub fn expressions(&self) -> Vec<String> {
        let axes = [
            ("node.platform.os", self.operating_system.as_ref()),
            ("node.platform.arch", self.architecture.as_ref()),
            ("node.hostname", self.hostname.as_ref()),
        ];

        let mut expressions: Vec<String> = axes
            .into_iter()
            .filter_map(|(axis, constraint)| constraint.map(|c| c.expression(axis)))
            .collect();
        expressions.extend(
            self.match_labels
                .iter()
                .map(|(label, c)| c.expression(&format!("node.labels.{label}"))),
        );
        expressions
    }
}

impl RenderedConstraint {
    /// Formats the constraint against a node attribute.
    #[must_use]
    pub fn expression(&self, attribute: &str) -> String {
        format!("{attribute}{}{}", self.operator.as_str(), self.value)
    }
}
