//! Stack model.
//!
//! - [`spec`]: the templated document as written by users
//! - [`rendered`]: the concrete stack produced by a render pass
//! - `render` / `visit`: the composite render and enumeration passes
//! - [`snapshot`]: immutable copies shared across threads

mod render;
pub mod rendered;
pub mod snapshot;
pub mod spec;
mod visit;

pub use rendered::{
    RenderedConstraint, RenderedConstraints, RenderedDeploy, RenderedFileObject,
    RenderedFileReference, RenderedHealthCheck, RenderedPlacement, RenderedPort,
    RenderedResource, RenderedResources, RenderedRestartPolicy, RenderedService, RenderedStack,
    RenderedStackSpec, RenderedUpdateConfig, RenderedVolume,
};
pub use snapshot::StackSnapshot;
pub use spec::{
    ConfigObjConfig, Constraint, ConstraintOperator, Constraints, DeployConfig, External,
    FileObjectConfig, FileReferenceConfig, GroupVersionKind, HealthCheckConfig, ObjectMeta,
    Placement, Resource, Resources, RestartPolicy, SecretConfig, ServiceConfig,
    ServiceConfigObjConfig, ServicePortConfig, ServiceSecretConfig, ServiceVolumeConfig, Stack,
    StackPhase, StackSpec, StackStatus, StringTemplateList, TypeMeta, UpdateConfig,
    DEFAULT_API_VERSION, STACK_KIND,
};
pub use visit::PlaceholderRef;
