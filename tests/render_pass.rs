//! End-to-end render tests: document in, concrete stack out.

use std::time::Duration;

use halldyll_stack::config::{parameters_from_yaml, StackHasher, StackParser};
use halldyll_stack::error::{ConfigError, StackError, TemplateError};
use halldyll_stack::stack::{RenderedStack, Stack};
use halldyll_stack::template::ParameterSet;

const SHOP: &str = r#"
apiVersion: compose.docker.com/v1beta2
kind: Stack
metadata:
  name: shop
  labels:
    team: checkout
spec:
  services:
    - name: api
      image: "myapp:${tag}"
      environment:
        LOG_LEVEL: "${log_level}"
        INHERITED:
      deploy:
        replicas: "${replica_count}"
        resources:
          limits:
            cpus: "0.5"
            memory: 512m
        restart_policy:
          condition: on-failure
          delay: 5s
          max_attempts: 3
        placement:
          constraints:
            operating_system:
              value: linux
            match_labels:
              zone:
                value: "${zone}"
                operator: "!="
      health_check:
        test: ["CMD", "curl", "-f", "http://localhost"]
        interval: 1m30s
        retries: 3
      ports:
        - target: 8080
          published: "${port}"
      tmpfs: /run
      stop_grace_period: 10s
  secrets:
    db_password:
      file: ./secrets/db_password.txt
"#;

const PARAMS: &str = r"
tag: v2
log_level: debug
replica_count: 3
zone: eu-west-1a
port: 80
";

fn shop() -> Stack {
    StackParser::new().parse_yaml(SHOP, None).unwrap()
}

fn render(stack: &Stack, yaml: &str) -> RenderedStack {
    stack.render(&parameters_from_yaml(yaml).unwrap()).unwrap()
}

#[test]
fn renders_every_typed_field() {
    let rendered = render(&shop(), PARAMS);
    let api = rendered.spec.service("api").unwrap();

    assert_eq!(api.image.as_deref(), Some("myapp:v2"));
    assert_eq!(api.deploy.replicas, Some(3));
    assert_eq!(api.environment["LOG_LEVEL"].as_deref(), Some("debug"));
    assert_eq!(api.environment["INHERITED"], None);

    let limits = api.deploy.resources.limits.as_ref().unwrap();
    assert_eq!(limits.nano_cpus.as_deref(), Some("0.5"));
    assert_eq!(limits.memory_bytes, Some(536_870_912));

    let restart = api.deploy.restart_policy.as_ref().unwrap();
    assert_eq!(restart.delay, Some(Duration::from_secs(5)));
    assert_eq!(restart.max_attempts, Some(3));

    let health = api.health_check.as_ref().unwrap();
    assert_eq!(health.interval, Some(Duration::from_secs(90)));
    assert_eq!(health.test, vec!["CMD", "curl", "-f", "http://localhost"]);

    assert_eq!(api.ports[0].target, 8080);
    assert_eq!(api.ports[0].published, Some(80));
    assert_eq!(api.tmpfs, vec!["/run"]);
    assert_eq!(api.stop_grace_period, Some(Duration::from_secs(10)));

    let constraints = api.deploy.placement.constraints.as_ref().unwrap();
    assert_eq!(
        constraints.expressions(),
        vec!["node.platform.os==linux", "node.labels.zone!=eu-west-1a"]
    );
}

#[test]
fn identity_and_objects_are_copied() {
    let rendered = render(&shop(), PARAMS);
    assert_eq!(rendered.metadata.name, "shop");
    assert_eq!(rendered.metadata.labels["team"], "checkout");
    assert_eq!(rendered.type_meta.api_version, "compose.docker.com/v1beta2");
    assert_eq!(
        rendered.spec.secrets["db_password"].file.as_deref(),
        Some("./secrets/db_password.txt")
    );
    assert!(rendered.status.is_none());
}

#[test]
fn rendered_output_has_integer_durations_and_no_placeholders() {
    let rendered = render(&shop(), PARAMS);
    let json = serde_json::to_value(&rendered).unwrap();

    let api = &json["spec"]["services"][0];
    assert_eq!(api["stop_grace_period"], 10_000_000_000_u64);
    assert_eq!(api["deploy"]["resources"]["limits"]["memory"], 536_870_912_u64);
    assert!(!serde_json::to_string(&rendered).unwrap().contains("${"));
}

#[test]
fn scenario_replicas_from_parameter() {
    let yaml = r#"
metadata: {name: a}
spec:
  services:
    - name: web
      deploy:
        replicas: "${replica_count}"
"#;
    let stack = StackParser::new().parse_yaml(yaml, None).unwrap();
    let rendered = render(&stack, "replica_count: '3'");
    assert_eq!(rendered.spec.services[0].deploy.replicas, Some(3));
}

#[test]
fn scenario_literal_memory_needs_no_parameters() {
    let yaml = r"
metadata: {name: c}
spec:
  services:
    - name: web
      deploy:
        resources:
          reservations:
            memory: 512m
";
    let stack = StackParser::new().parse_yaml(yaml, None).unwrap();
    let rendered = stack.render(&ParameterSet::new()).unwrap();
    let reservations = rendered.spec.services[0]
        .deploy
        .resources
        .reservations
        .as_ref()
        .unwrap();
    assert_eq!(reservations.memory_bytes, Some(536_870_912));
}

#[test]
fn scenario_mixed_text_with_missing_parameter_fails_the_pass() {
    let yaml = r#"
metadata: {name: d}
spec:
  services:
    - name: web
      deploy:
        mode: "${a}${b}"
        replicas: "not-a-number"
"#;
    let stack = StackParser::new().parse_yaml(yaml, None).unwrap();
    let err = stack.render(&parameters_from_yaml("a: x").unwrap()).unwrap_err();

    assert!(matches!(
        err,
        StackError::Template(TemplateError::UnresolvedParameter { ref name, ref path })
            if name == "b" && path == "services[0].deploy.mode"
    ));
}

#[test]
fn first_failure_in_declaration_order_wins() {
    let yaml = r#"
metadata: {name: e}
spec:
  services:
    - name: web
      image: "nginx:${tag}"
    - name: worker
      ports:
        - target: "${worker_port}"
"#;
    let stack = StackParser::new().parse_yaml(yaml, None).unwrap();
    let err = stack.render(&ParameterSet::new()).unwrap_err();
    assert_eq!(err.field_path(), Some("services[0].image"));

    let err = stack.render(&parameters_from_yaml("tag: '1'").unwrap()).unwrap_err();
    assert_eq!(err.field_path(), Some("services[1].ports[0].target"));
}

#[test]
fn coercion_boundaries() {
    let yaml = r#"
metadata: {name: f}
spec:
  services:
    - name: web
      tty: "${tty}"
      ports:
        - target: "${port}"
      stop_grace_period: "${grace}"
"#;
    let stack = StackParser::new().parse_yaml(yaml, None).unwrap();
    let attempt = |params: &str| stack.render(&parameters_from_yaml(params).unwrap());

    assert!(attempt("{tty: 'TRUE', port: '0', grace: 30s}").is_ok());
    assert!(attempt("{tty: 'true', port: '18446744073709551615', grace: 1ms}").is_ok());

    let err = attempt("{tty: '1', port: '80', grace: 30s}").unwrap_err();
    assert!(matches!(err, StackError::Template(TemplateError::TypeMismatch { .. })));

    let err = attempt("{tty: 'false', port: '-1', grace: 30s}").unwrap_err();
    assert!(matches!(err, StackError::Template(TemplateError::TypeMismatch { .. })));

    let err = attempt("{tty: 'false', port: '18446744073709551616', grace: 30s}").unwrap_err();
    assert!(matches!(err, StackError::Template(TemplateError::OutOfRange { .. })));

    let err = attempt("{tty: 'false', port: '80', grace: '30'}").unwrap_err();
    assert_eq!(err.field_path(), Some("services[0].stop_grace_period"));
}

#[test]
fn parser_reports_document_path_for_malformed_template() {
    let yaml = r#"
metadata: {name: g}
spec:
  services:
    - name: web
    - name: worker
      labels:
        owner: "${team"
"#;
    let err = StackParser::new().parse_yaml(yaml, None).unwrap_err();
    assert!(matches!(
        err,
        StackError::Template(TemplateError::MalformedTemplate { ref path, .. })
            if path == "spec.services[1].labels.owner"
    ));
}

#[test]
fn placeholder_free_stack_renders_identically() {
    let yaml = r"
metadata: {name: h}
spec:
  services:
    - name: web
      image: nginx:1.25
      deploy:
        replicas: 2
";
    let stack = StackParser::new().parse_yaml(yaml, None).unwrap();
    let first = render(&stack, "unused: a");
    let second = render(&stack, "other: b");
    assert_eq!(first, second);

    let hasher = StackHasher::new();
    assert_eq!(
        hasher.hash_rendered(&first).unwrap(),
        hasher.hash_rendered(&second).unwrap()
    );
}

#[test]
fn rendering_does_not_modify_the_stack() {
    let stack = shop();
    let before = stack.clone();
    let _ = render(&stack, PARAMS);
    assert_eq!(stack, before);
}

#[test]
fn float_literals_do_not_truncate_to_integers() {
    let yaml = r"
metadata: {name: i}
spec:
  services:
    - name: web
      deploy:
        replicas: 3.0
      ports:
        - target: 8e1
";
    let stack = StackParser::new().parse_yaml(yaml, None).unwrap();
    let err = stack.render(&ParameterSet::new()).unwrap_err();
    assert!(matches!(
        err,
        StackError::Template(TemplateError::TypeMismatch { ref path, ref actual, .. })
            if path == "services[0].deploy.replicas" && actual == "3.0"
    ));
}

#[test]
fn unquoted_decimals_are_rejected_in_text_fields() {
    let yaml = r"
metadata: {name: j}
spec:
  services:
    - name: web
      labels:
        version: 1.10
";
    let err = StackParser::new().parse_yaml(yaml, None).unwrap_err();
    assert!(matches!(
        err,
        StackError::Config(ConfigError::ParseError { ref message, .. })
            if message.starts_with("spec.services[0].labels.version:")
                && message.contains("quote the value")
    ));

    let quoted = StackParser::new()
        .parse_yaml(&yaml.replace("1.10", "'1.10'"), None)
        .unwrap();
    let rendered = quoted.render(&ParameterSet::new()).unwrap();
    assert_eq!(rendered.spec.services[0].labels["version"], "1.10");

    assert!(parameters_from_yaml("tag: 1.10").is_err());
}
