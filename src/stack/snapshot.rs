//! Immutable stack snapshots shared across threads.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::template::ParameterSet;

use super::rendered::RenderedStack;
use super::spec::Stack;

/// A frozen deep copy of a stack.
///
/// Clones are cheap and share the same copy. Edits to the stack the
/// snapshot was captured from never reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSnapshot {
    stack: Arc<Stack>,
}

impl StackSnapshot {
    /// Captures a deep copy of `stack`.
    #[must_use]
    pub fn capture(stack: &Stack) -> Self {
        debug!("Capturing snapshot of stack: {}", stack.name());
        Self {
            stack: Arc::new(stack.clone()),
        }
    }

    /// The frozen stack.
    #[must_use]
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Renders the frozen stack.
    ///
    /// # Errors
    ///
    /// Same as [`Stack::render`].
    pub fn render(&self, params: &ParameterSet) -> Result<RenderedStack> {
        self.stack.render(params)
    }

    /// Returns an editable copy of the frozen stack.
    #[must_use]
    pub fn stage(&self) -> Stack {
        Stack::clone(&self.stack)
    }
}

impl Stack {
    /// Captures an immutable snapshot of this stack.
    #[must_use]
    pub fn snapshot(&self) -> StackSnapshot {
        StackSnapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::spec::{DeployConfig, ServiceConfig, StackSpec};

    fn sample() -> Stack {
        let mut web = ServiceConfig::new("web");
        web.image = Some("nginx:${tag}".parse().unwrap());
        web.deploy = DeployConfig {
            replicas: Some("${replicas}".parse().unwrap()),
            ..DeployConfig::default()
        };
        Stack::new(
            "demo",
            StackSpec {
                services: vec![web],
                ..StackSpec::default()
            },
        )
    }

    fn params() -> ParameterSet {
        let mut params = ParameterSet::new();
        params.insert("tag", "1.25").unwrap();
        params.insert("replicas", "3").unwrap();
        params
    }

    #[test]
    fn test_snapshot_is_independent_of_source() {
        let mut stack = sample();
        let snapshot = stack.snapshot();

        if let Some(spec) = stack.spec.as_mut() {
            spec.services[0].image = Some("httpd:${tag}".parse().unwrap());
            spec.services.push(ServiceConfig::new("worker"));
        }

        let frozen = snapshot.stack().spec.as_ref().unwrap();
        assert_eq!(frozen.services.len(), 1);
        assert_eq!(frozen.services[0].image.as_ref().unwrap().raw(), "nginx:${tag}");
    }

    #[test]
    fn test_stage_returns_editable_copy() {
        let snapshot = sample().snapshot();
        let mut staged = snapshot.stage();
        staged.metadata.name = String::from("renamed");
        assert_eq!(snapshot.stack().name(), "demo");
        assert_eq!(staged.name(), "renamed");
    }

    #[test]
    fn test_absent_fields_stay_absent() {
        let stack = Stack {
            status: None,
            ..sample()
        };
        let snapshot = stack.snapshot();
        assert!(snapshot.stack().status.is_none());
        let service = &snapshot.stack().spec.as_ref().unwrap().services[0];
        assert!(service.hostname.is_none());
        assert!(service.deploy.update_config.is_none());
        assert_eq!(snapshot.stack(), &stack);
    }

    #[test]
    fn test_snapshot_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StackSnapshot>();
        assert_send_sync::<Stack>();
    }

    #[test]
    fn test_parallel_renders_agree() {
        let snapshot = sample().snapshot();
        let params = params();
        let expected = snapshot.render(&params).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let snapshot = snapshot.clone();
                    let params = &params;
                    scope.spawn(move || snapshot.render(params).unwrap())
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
