//! Template enumeration over a stack, in render order.

use std::collections::BTreeSet;

use crate::template::{FieldPath, FieldVisitor, Visit};

use super::spec::{
    Constraint, Constraints, DeployConfig, FileObjectConfig, FileReferenceConfig,
    HealthCheckConfig, Placement, Resource, Resources, RestartPolicy, ServiceConfig,
    ServicePortConfig, ServiceVolumeConfig, Stack, StackSpec, StringTemplateList, UpdateConfig,
};

/// A placeholder occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderRef {
    /// Referenced parameter.
    pub name: String,
    /// Field holding the reference.
    pub path: String,
    /// Target type of the field.
    pub target: &'static str,
}

impl Stack {
    /// Returns every placeholder reference in render order.
    #[must_use]
    pub fn placeholders(&self) -> Vec<PlaceholderRef> {
        let mut refs = Vec::new();
        self.spec.visit(&FieldPath::root(), &mut |path, field| {
            refs.extend(field.token().placeholder_names().map(|name| PlaceholderRef {
                name: name.to_string(),
                path: path.to_string(),
                target: field.target(),
            }));
        });
        refs
    }

    /// Returns the distinct parameter names the stack needs.
    #[must_use]
    pub fn required_parameters(&self) -> BTreeSet<String> {
        self.placeholders().into_iter().map(|r| r.name).collect()
    }
}

impl Visit for StackSpec {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        self.services.visit(&path.field("services"), visitor);
        self.secrets.visit(&path.field("secrets"), visitor);
        self.configs.visit(&path.field("configs"), visitor);
    }
}

impl Visit for ServiceConfig {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        self.cap_add.visit(&path.field("cap_add"), visitor);
        self.cap_drop.visit(&path.field("cap_drop"), visitor);
        self.command.visit(&path.field("command"), visitor);
        self.configs.visit(&path.field("configs"), visitor);
        self.deploy.visit(&path.field("deploy"), visitor);
        self.entrypoint.visit(&path.field("entrypoint"), visitor);
        self.environment.visit(&path.field("environment"), visitor);
        self.extra_hosts.visit(&path.field("extra_hosts"), visitor);
        self.hostname.visit(&path.field("hostname"), visitor);
        self.health_check.visit(&path.field("health_check"), visitor);
        self.image.visit(&path.field("image"), visitor);
        self.ipc.visit(&path.field("ipc"), visitor);
        self.labels.visit(&path.field("labels"), visitor);
        self.pid.visit(&path.field("pid"), visitor);
        self.ports.visit(&path.field("ports"), visitor);
        self.privileged.visit(&path.field("privileged"), visitor);
        self.read_only.visit(&path.field("read_only"), visitor);
        self.secrets.visit(&path.field("secrets"), visitor);
        self.stdin_open.visit(&path.field("stdin_open"), visitor);
        self.stop_grace_period.visit(&path.field("stop_grace_period"), visitor);
        self.tmpfs.visit(&path.field("tmpfs"), visitor);
        self.tty.visit(&path.field("tty"), visitor);
        self.volumes.visit(&path.field("volumes"), visitor);
        self.working_dir.visit(&path.field("working_dir"), visitor);
    }
}

impl Visit for StringTemplateList {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        self.0.visit(path, visitor);
    }
}

impl Visit for ServicePortConfig {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        self.mode.visit(&path.field("mode"), visitor);
        self.target.visit(&path.field("target"), visitor);
        self.published.visit(&path.field("published"), visitor);
        self.protocol.visit(&path.field("protocol"), visitor);
    }
}

impl Visit for FileObjectConfig {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        self.name.visit(&path.field("name"), visitor);
        self.file.visit(&path.field("file"), visitor);
    }
}

impl Visit for FileReferenceConfig {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        self.source.visit(&path.field("source"), visitor);
        self.target.visit(&path.field("target"), visitor);
        self.uid.visit(&path.field("uid"), visitor);
        self.gid.visit(&path.field("gid"), visitor);
        self.mode.visit(&path.field("mode"), visitor);
    }
}

impl Visit for DeployConfig {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        self.mode.visit(&path.field("mode"), visitor);
        self.replicas.visit(&path.field("replicas"), visitor);
        self.labels.visit(&path.field("labels"), visitor);
        self.update_config.visit(&path.field("update_config"), visitor);
        self.resources.visit(&path.field("resources"), visitor);
        self.restart_policy.visit(&path.field("restart_policy"), visitor);
        self.placement.visit(&path.field("placement"), visitor);
    }
}

impl Visit for UpdateConfig {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        self.parallelism.visit(&path.field("parallelism"), visitor);
        self.delay.visit(&path.field("delay"), visitor);
    }
}

impl Visit for Resources {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        self.limits.visit(&path.field("limits"), visitor);
        self.reservations.visit(&path.field("reservations"), visitor);
    }
}

impl Visit for Resource {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        self.nano_cpus.visit(&path.field("cpus"), visitor);
        self.memory_bytes.visit(&path.field("memory"), visitor);
    }
}

impl Visit for RestartPolicy {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        self.delay.visit(&path.field("delay"), visitor);
        self.max_attempts.visit(&path.field("max_attempts"), visitor);
        self.window.visit(&path.field("window"), visitor);
    }
}

impl Visit for Placement {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        self.constraints.visit(&path.field("constraints"), visitor);
    }
}

impl Visit for Constraints {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        self.operating_system.visit(&path.field("operating_system"), visitor);
        self.architecture.visit(&path.field("architecture"), visitor);
        self.hostname.visit(&path.field("hostname"), visitor);
        self.match_labels.visit(&path.field("match_labels"), visitor);
    }
}

impl Visit for Constraint {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        self.value.visit(&path.field("value"), visitor);
    }
}

impl Visit for HealthCheckConfig {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        self.timeout.visit(&path.field("timeout"), visitor);
        self.interval.visit(&path.field("interval"), visitor);
        self.start_period.visit(&path.field("start_period"), visitor);
        self.retries.visit(&path.field("retries"), visitor);
    }
}

impl Visit for ServiceVolumeConfig {
    fn visit(&self, path: &FieldPath, visitor: &mut FieldVisitor<'_>) {
        self.source.visit(&path.field("source"), visitor);
        self.target.visit(&path.field("target"), visitor);
        self.read_only.visit(&path.field("read_only"), visitor);
    }
}
