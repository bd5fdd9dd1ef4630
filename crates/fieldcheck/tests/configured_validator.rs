use std::path::Path;

use fieldcheck::{
    ConfigError, Error, ExecutionError, Inspect, PresenceMarker, Record, RecordSchema,
    Separator, ValidatorConfig, Value,
};

fn fixture() -> ValidatorConfig {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/validator.toml");
    ValidatorConfig::load(path).expect("load validator.toml")
}

struct Signup {
    plan: String,
    seats: i64,
    has: PresenceMarker,
}

impl Record for Signup {
    fn schema(&self) -> RecordSchema {
        RecordSchema::new("Signup")
            .field::<String>("plan", "presence|required|choice(free,team)")
            .field::<i64>("seats", "presence|between(1,50)")
            .field::<PresenceMarker>("has", "")
    }

    fn field_value(&self, index: usize) -> Value<'_> {
        match index {
            0 => self.plan.to_value(),
            1 => self.seats.to_value(),
            2 => self.has.to_value(),
            _ => Value::Nil,
        }
    }
}

fieldcheck::inspect_record!(Signup);

struct Node {
    label: String,
    child: Option<Box<Node>>,
}

impl Record for Node {
    fn schema(&self) -> RecordSchema {
        RecordSchema::new("Node")
            .field::<String>("label", "required")
            .field::<Option<Box<Node>>>("child", "")
    }

    fn field_value(&self, index: usize) -> Value<'_> {
        match index {
            0 => self.label.to_value(),
            1 => self.child.to_value(),
            _ => Value::Nil,
        }
    }
}

fieldcheck::inspect_record!(Node);

fn chain(depth: usize) -> Node {
    let mut node = Node {
        label: "leaf".to_string(),
        child: None,
    };
    for _ in 1..depth {
        node = Node {
            label: "inner".to_string(),
            child: Some(Box::new(node)),
        };
    }
    node
}

#[test]
fn fixture_settings_are_loaded() {
    let config = fixture();
    assert_eq!(config.separator, Separator::Pipe);
    assert!(config.track_presence);
    assert!(!config.shallow);
    assert_eq!(config.max_depth, Some(8));
}

#[test]
fn configured_defaults_drive_validation() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("fieldcheck_core=trace")
        .with_test_writer()
        .try_init();

    let validator = fieldcheck::validator_with_config(fixture());
    let options = validator.default_options();

    let mut signup = Signup {
        plan: "gold".to_string(),
        seats: 0,
        has: PresenceMarker::new(),
    };
    let validation = validator.validate(&signup, &options).expect("validation runs");
    assert!(validation.is_ok(), "{validation}");

    signup.has.mark("plan");
    signup.has.mark("seats");
    let validation = validator.validate(&signup, &options).expect("validation runs");
    assert_eq!(
        validation.to_string(),
        "Failed validation for plan(choice),seats(between)"
    );
}

#[test]
fn depth_limit_aborts_deep_values() {
    let validator = fieldcheck::validator_with_config(fixture());
    let options = validator.default_options();

    assert!(validator.validate(&chain(8), &options).is_ok());
    let err = validator
        .validate(&chain(9), &options)
        .expect_err("too deep");
    assert!(matches!(
        err,
        Error::Execution(ExecutionError::DepthExceeded(8))
    ));
}

#[test]
fn missing_config_file_is_an_io_error() {
    let err = ValidatorConfig::load("tests/fixtures/does-not-exist.toml").expect_err("missing");
    assert!(matches!(err, ConfigError::Io(_)));
}
