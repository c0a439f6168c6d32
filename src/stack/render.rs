//! Render pass over a whole stack.
//!
//! Services are rendered in declaration order, each record's fields in
//! declaration order and maps by key; secrets come after services and configs
//! after secrets. The first failing field aborts the pass.

use tracing::{debug, info};

use crate::error::{ConfigError, Result, TemplateError};
use crate::template::{FieldPath, ParameterSet, Render};

use super::rendered::{
    RenderedConstraint, RenderedConstraints, RenderedDeploy, RenderedFileObject,
    RenderedFileReference, RenderedHealthCheck, RenderedPlacement, RenderedPort,
    RenderedResource, RenderedResources, RenderedRestartPolicy, RenderedService, RenderedStack,
    RenderedStackSpec, RenderedUpdateConfig, RenderedVolume,
};
use super::spec::{
    Constraint, Constraints, DeployConfig, FileObjectConfig, FileReferenceConfig,
    HealthCheckConfig, Placement, Resource, Resources, RestartPolicy, ServiceConfig,
    ServicePortConfig, ServiceVolumeConfig, Stack, StackSpec, StringTemplateList, UpdateConfig,
};

impl Stack {
    /// Renders the stack against a parameter set.
    ///
    /// Type meta, metadata and status are copied unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSpec`] when the stack has no spec, or the
    /// first [`TemplateError`] of the render pass.
    pub fn render(&self, params: &ParameterSet) -> Result<RenderedStack> {
        let spec = self.spec.as_ref().ok_or_else(|| ConfigError::MissingSpec {
            stack: self.metadata.name.clone(),
        })?;

        info!("Rendering stack '{}' with {} parameter(s)", self.metadata.name, params.len());
        let spec = spec.render(params, &FieldPath::root())?;
        debug!("Rendered {} service(s)", spec.services.len());

        Ok(RenderedStack {
            type_meta: self.type_meta.clone(),
            metadata: self.metadata.clone(),
            spec,
            status: self.status.clone(),
        })
    }
}

impl Render for StackSpec {
    type Output = RenderedStackSpec;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> std::result::Result<Self::Output, TemplateError> {
        Ok(RenderedStackSpec {
            services: self.services.render(params, &path.field("services"))?,
            secrets: self.secrets.render(params, &path.field("secrets"))?,
            configs: self.configs.render(params, &path.field("configs"))?,
        })
    }
}

impl Render for ServiceConfig {
    type Output = RenderedService;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> std::result::Result<Self::Output, TemplateError> {
        debug!("Rendering service '{}' at {}", self.name, path);
        Ok(RenderedService {
            name: self.name.clone(),
            cap_add: self.cap_add.render(params, &path.field("cap_add"))?,
            cap_drop: self.cap_drop.render(params, &path.field("cap_drop"))?,
            command: self.command.render(params, &path.field("command"))?,
            configs: self.configs.render(params, &path.field("configs"))?,
            deploy: self.deploy.render(params, &path.field("deploy"))?,
            entrypoint: self.entrypoint.render(params, &path.field("entrypoint"))?,
            environment: self.environment.render(params, &path.field("environment"))?,
            extra_hosts: self.extra_hosts.render(params, &path.field("extra_hosts"))?,
            hostname: self.hostname.render(params, &path.field("hostname"))?,
            health_check: self.health_check.render(params, &path.field("health_check"))?,
            image: self.image.render(params, &path.field("image"))?,
            ipc: self.ipc.render(params, &path.field("ipc"))?,
            labels: self.labels.render(params, &path.field("labels"))?,
            pid: self.pid.render(params, &path.field("pid"))?,
            ports: self.ports.render(params, &path.field("ports"))?,
            privileged: self.privileged.render(params, &path.field("privileged"))?,
            read_only: self.read_only.render(params, &path.field("read_only"))?,
            secrets: self.secrets.render(params, &path.field("secrets"))?,
            stdin_open: self.stdin_open.render(params, &path.field("stdin_open"))?,
            stop_grace_period: self
                .stop_grace_period
                .render(params, &path.field("stop_grace_period"))?,
            tmpfs: self.tmpfs.render(params, &path.field("tmpfs"))?,
            tty: self.tty.render(params, &path.field("tty"))?,
            user: self.user,
            volumes: self.volumes.render(params, &path.field("volumes"))?,
            working_dir: self.working_dir.render(params, &path.field("working_dir"))?,
        })
    }
}

impl Render for StringTemplateList {
    type Output = Vec<String>;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> std::result::Result<Self::Output, TemplateError> {
        self.0.render(params, path)
    }
}

impl Render for ServicePortConfig {
    type Output = RenderedPort;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> std::result::Result<Self::Output, TemplateError> {
        Ok(RenderedPort {
            mode: self.mode.render(params, &path.field("mode"))?,
            target: self.target.render(params, &path.field("target"))?,
            published: self.published.render(params, &path.field("published"))?,
            protocol: self.protocol.render(params, &path.field("protocol"))?,
        })
    }
}

impl Render for FileObjectConfig {
    type Output = RenderedFileObject;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> std::result::Result<Self::Output, TemplateError> {
        Ok(RenderedFileObject {
            name: self.name.render(params, &path.field("name"))?,
            file: self.file.render(params, &path.field("file"))?,
            external: self.external.clone(),
            labels: self.labels.clone(),
        })
    }
}

impl Render for FileReferenceConfig {
    type Output = RenderedFileReference;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> std::result::Result<Self::Output, TemplateError> {
        Ok(RenderedFileReference {
            source: self.source.render(params, &path.field("source"))?,
            target: self.target.render(params, &path.field("target"))?,
            uid: self.uid.render(params, &path.field("uid"))?,
            gid: self.gid.render(params, &path.field("gid"))?,
            mode: self.mode.render(params, &path.field("mode"))?,
        })
    }
}

impl Render for DeployConfig {
    type Output = RenderedDeploy;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> std::result::Result<Self::Output, TemplateError> {
        Ok(RenderedDeploy {
            mode: self.mode.render(params, &path.field("mode"))?,
            replicas: self.replicas.render(params, &path.field("replicas"))?,
            labels: self.labels.render(params, &path.field("labels"))?,
            update_config: self.update_config.render(params, &path.field("update_config"))?,
            resources: self.resources.render(params, &path.field("resources"))?,
            restart_policy: self.restart_policy.render(params, &path.field("restart_policy"))?,
            placement: self.placement.render(params, &path.field("placement"))?,
        })
    }
}

impl Render for UpdateConfig {
    type Output = RenderedUpdateConfig;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> std::result::Result<Self::Output, TemplateError> {
        Ok(RenderedUpdateConfig {
            parallelism: self.parallelism.render(params, &path.field("parallelism"))?,
            delay: self.delay.render(params, &path.field("delay"))?,
        })
    }
}

impl Render for Resources {
    type Output = RenderedResources;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> std::result::Result<Self::Output, TemplateError> {
        Ok(RenderedResources {
            limits: self.limits.render(params, &path.field("limits"))?,
            reservations: self.reservations.render(params, &path.field("reservations"))?,
        })
    }
}

impl Render for Resource {
    type Output = RenderedResource;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> std::result::Result<Self::Output, TemplateError> {
        Ok(RenderedResource {
            nano_cpus: self.nano_cpus.render(params, &path.field("cpus"))?,
            memory_bytes: self.memory_bytes.render(params, &path.field("memory"))?,
        })
    }
}

impl Render for RestartPolicy {
    type Output = RenderedRestartPolicy;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> std::result::Result<Self::Output, TemplateError> {
        Ok(RenderedRestartPolicy {
            condition: self.condition.clone(),
            delay: self.delay.render(params, &path.field("delay"))?,
            max_attempts: self.max_attempts.render(params, &path.field("max_attempts"))?,
            window: self.window.render(params, &path.field("window"))?,
        })
    }
}

impl Render for Placement {
    type Output = RenderedPlacement;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> std::result::Result<Self::Output, TemplateError> {
        Ok(RenderedPlacement {
            constraints: self.constraints.render(params, &path.field("constraints"))?,
        })
    }
}

impl Render for Constraints {
    type Output = RenderedConstraints;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> std::result::Result<Self::Output, TemplateError> {
        Ok(RenderedConstraints {
            operating_system: self
                .operating_system
                .render(params, &path.field("operating_system"))?,
            architecture: self.architecture.render(params, &path.field("architecture"))?,
            hostname: self.hostname.render(params, &path.field("hostname"))?,
            match_labels: self.match_labels.render(params, &path.field("match_labels"))?,
        })
    }
}

impl Render for Constraint {
    type Output = RenderedConstraint;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> std::result::Result<Self::Output, TemplateError> {
        Ok(RenderedConstraint {
            value: self.value.render(params, &path.field("value"))?,
            operator: self.operator,
        })
    }
}

impl Render for HealthCheckConfig {
    type Output = RenderedHealthCheck;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> std::result::Result<Self::Output, TemplateError> {
        Ok(RenderedHealthCheck {
            test: self.test.clone(),
            timeout: self.timeout.render(params, &path.field("timeout"))?,
            interval: self.interval.render(params, &path.field("interval"))?,
            start_period: self.start_period.render(params, &path.field("start_period"))?,
            retries: self.retries.render(params, &path.field("retries"))?,
        })
    }
}

impl Render for ServiceVolumeConfig {
    type Output = RenderedVolume;

    fn render(
        &self,
        params: &ParameterSet,
        path: &FieldPath,
    ) -> std::result::Result<Self::Output, TemplateError> {
        Ok(RenderedVolume {
            volume_type: self.volume_type.clone(),
            source: self.source.render(params, &path.field("source"))?,
            target: self.target.render(params, &path.field("target"))?,
            read_only: self.read_only.render(params, &path.field("read_only"))?,
        })
    }
}
