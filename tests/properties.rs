//! Property tests for coercion, cloning and rendering.

use proptest::prelude::*;

use halldyll_stack::stack::{DeployConfig, ServiceConfig, ServicePortConfig, Stack, StackSpec};
use halldyll_stack::template::coerce::{Bool, ByteSize, Coerce, UInt64};
use halldyll_stack::template::{FieldPath, ParameterSet, StringTemplate, UInt64OrTemplate};

fn service_strategy() -> impl Strategy<Value = ServiceConfig> {
    (
        "[a-z][a-z0-9-]{0,8}",
        "[a-z]{1,8}(:[0-9]{1,3})?",
        any::<u64>(),
        proptest::option::of(0u64..65_536),
    )
        .prop_map(|(name, image, replicas, published)| {
            let mut service = ServiceConfig::new(name);
            service.image = Some(StringTemplate::literal(image));
            service.deploy = DeployConfig {
                replicas: Some(UInt64OrTemplate::literal(replicas)),
                ..DeployConfig::default()
            };
            service.ports = vec![ServicePortConfig {
                mode: None,
                target: UInt64OrTemplate::literal(80),
                published: published.map(UInt64OrTemplate::literal),
                protocol: None,
            }];
            service
        })
}

proptest! {
    #[test]
    fn literal_unsigned_integers_render_to_themselves(n in any::<u64>()) {
        let value: UInt64OrTemplate = n.to_string().parse().unwrap();
        let rendered = value.render(&ParameterSet::new(), &FieldPath::root());
        prop_assert_eq!(rendered, Ok(n));
    }

    #[test]
    fn placeholders_resolve_any_unsigned_integer(n in any::<u64>()) {
        let value: UInt64OrTemplate = "${n}".parse().unwrap();
        let mut params = ParameterSet::new();
        params.insert("n", n.to_string()).unwrap();
        prop_assert_eq!(value.render(&params, &FieldPath::root()), Ok(n));
    }

    #[test]
    fn bool_accepts_only_true_and_false(text in "[a-zA-Z01]{1,6}") {
        let lowered = text.to_ascii_lowercase();
        let expected = match lowered.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        };
        prop_assert_eq!(Bool::coerce(&text).ok(), expected);
    }

    #[test]
    fn byte_sizes_scale_by_binary_multipliers(n in 0u64..1_000_000) {
        prop_assert_eq!(ByteSize::coerce(&format!("{n}k")), Ok(n * 1024));
        prop_assert_eq!(ByteSize::coerce(&format!("{n}m")), Ok(n * 1024 * 1024));
        prop_assert_eq!(ByteSize::coerce(&n.to_string()), Ok(n));
    }

    #[test]
    fn negative_numbers_never_coerce_to_unsigned(n in 1i64..i64::MAX) {
        let negative = (-n).to_string();
        prop_assert!(UInt64::coerce(&negative).is_err());
    }

    #[test]
    fn clones_are_equal_and_independent(services in proptest::collection::vec(service_strategy(), 0..5)) {
        let original = Stack::new("prop", StackSpec { services, ..StackSpec::default() });
        let copy = original.clone();
        prop_assert_eq!(&copy.clone(), &copy);
        prop_assert_eq!(&copy, &original);

        let mut edited = copy;
        if let Some(spec) = edited.spec.as_mut() {
            spec.services.push(ServiceConfig::new("extra"));
        }
        prop_assert_ne!(&edited, &original);

        let snapshot = original.snapshot();
        prop_assert_eq!(snapshot.stack(), &original);
    }

    #[test]
    fn placeholder_free_stacks_ignore_parameters(
        services in proptest::collection::vec(service_strategy(), 1..4),
        value in "[a-z0-9]{0,8}",
    ) {
        let stack = Stack::new("prop", StackSpec { services, ..StackSpec::default() });
        let mut params = ParameterSet::new();
        params.insert("unused", value).unwrap();

        let with_params = stack.render(&params).unwrap();
        let without = stack.render(&ParameterSet::new()).unwrap();
        prop_assert_eq!(with_params, without);
    }
}
