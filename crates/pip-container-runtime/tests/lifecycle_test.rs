//! Integration tests for the container lifecycle.
//!
//! Probe components append every lifecycle call they receive to a shared
//! journal, so the tests can assert ordering, rollback, and fault recovery
//! across a whole open/close cycle:
//! 1. State transitions (double open, idle close)
//! 2. Ordering (link/open forward, close/unlink reverse)
//! 3. Failure handling (build errors, failing and panicking components)
//! 4. Configuration (reconfigure, context info, parameterized files)
//! 5. Nesting and the process container

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use parking_lot::Mutex;
use pip_container_common::config::ConfigParams;
use pip_container_common::constants;
use pip_container_common::error::{ContainerError, Result};
use pip_container_common::types::Descriptor;
use pip_container_components::build::{Factory, SimpleFactory};
use pip_container_components::component::{
    Closeable, Component, Configurable, Openable, Referenceable, Unreferenceable,
};
use pip_container_components::info::ContextInfo;
use pip_container_components::log::{LogLevel, Logger};
use pip_container_components::refer::References;
use pip_container_runtime::container::{ALREADY_OPENED, Container};
use pip_container_runtime::process::ProcessContainer;

type Journal = Arc<Mutex<Vec<String>>>;

fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(journal: &Journal, prefix: &str) -> Vec<String> {
    journal
        .lock()
        .iter()
        .filter(|e| e.starts_with(prefix))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    None,
    Error,
    Panic,
}

fn failure(config: &ConfigParams, key: &str) -> Failure {
    match config.get(key) {
        Some("error") => Failure::Error,
        Some("panic") => Failure::Panic,
        _ => Failure::None,
    }
}

/// Records every lifecycle call in the journal.
struct Probe {
    name: String,
    journal: Journal,
    on_open: Failure,
    on_close: Failure,
    opened: AtomicBool,
}

impl Probe {
    fn new(journal: Journal) -> Self {
        Self {
            name: "probe".to_owned(),
            journal,
            on_open: Failure::None,
            on_close: Failure::None,
            opened: AtomicBool::new(false),
        }
    }

    fn record(&self, event: &str) {
        self.journal.lock().push(format!("{event}:{}", self.name));
    }

    fn fail(&self, failure: Failure, correlation_id: Option<&str>, phase: &str) -> Result<()> {
        match failure {
            Failure::None => Ok(()),
            Failure::Error => Err(ContainerError::component(
                correlation_id,
                "PROBE_FAILED",
                format!("{} failed to {phase}", self.name),
            )),
            Failure::Panic => panic!("{} panicked during {phase}", self.name),
        }
    }
}

impl Configurable for Probe {
    fn configure(&mut self, config: &ConfigParams) -> Result<()> {
        if let Some(name) = config.get("name") {
            name.clone_into(&mut self.name);
        }
        self.on_open = failure(config, "open");
        self.on_close = failure(config, "close");
        Ok(())
    }
}

impl Referenceable for Probe {
    fn set_references(&self, _: &References) -> Result<()> {
        self.record("link");
        Ok(())
    }
}

impl Unreferenceable for Probe {
    fn unset_references(&self) {
        self.record("unlink");
    }
}

impl Closeable for Probe {
    fn close(&self, correlation_id: Option<&str>) -> Result<()> {
        if !self.opened.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.fail(self.on_close, correlation_id, "close")?;
        self.record("close");
        Ok(())
    }
}

impl Openable for Probe {
    fn is_open(&self) -> bool {
        self.opened.load(Ordering::SeqCst)
    }

    fn open(&self, correlation_id: Option<&str>) -> Result<()> {
        self.fail(self.on_open, correlation_id, "open")?;
        self.opened.store(true, Ordering::SeqCst);
        self.record("open");
        Ok(())
    }
}

impl Component for Probe {
    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }

    fn as_referenceable(&self) -> Option<&dyn Referenceable> {
        Some(self)
    }

    fn as_unreferenceable(&self) -> Option<&dyn Unreferenceable> {
        Some(self)
    }

    fn as_openable(&self) -> Option<&dyn Openable> {
        Some(self)
    }

    fn as_closeable(&self) -> Option<&dyn Closeable> {
        Some(self)
    }
}

/// Parent of a nested container; records wiring calls.
struct Parent {
    journal: Journal,
}

impl Referenceable for Parent {
    fn set_references(&self, references: &References) -> Result<()> {
        self.journal
            .lock()
            .push(format!("parent-link:{}", references.len()));
        Ok(())
    }
}

impl Unreferenceable for Parent {
    fn unset_references(&self) {
        self.journal.lock().push("parent-unlink".to_owned());
    }
}

impl Component for Parent {
    fn as_referenceable(&self) -> Option<&dyn Referenceable> {
        Some(self)
    }

    fn as_unreferenceable(&self) -> Option<&dyn Unreferenceable> {
        Some(self)
    }
}

/// Writes `log:{level}:{message}` into the journal.
struct JournalLogger {
    journal: Journal,
}

impl Logger for JournalLogger {
    fn level(&self) -> LogLevel {
        LogLevel::Trace
    }

    fn log(
        &self,
        level: LogLevel,
        _: Option<&str>,
        _: Option<&dyn std::error::Error>,
        message: &str,
    ) {
        self.journal.lock().push(format!("log:{level}:{message}"));
    }
}

fn probe_factory(journal: &Journal) -> Arc<dyn Factory> {
    let mut factory = SimpleFactory::new();
    let journal = Arc::clone(journal);
    factory.register(Descriptor::new("test", "probe", "*", "*", "1.0"), move |_| {
        journal.lock().push("create".to_owned());
        Ok(Box::new(Probe::new(Arc::clone(&journal))))
    });
    Arc::new(factory)
}

/// One probe section per name; `extra` holds dotted keys such as `b.open`.
fn probe_config(names: &[&str], extra: &[(&str, &str)]) -> ConfigParams {
    let mut config = ConfigParams::new();
    for name in names {
        config.set(format!("{name}.descriptor"), format!("test:probe:default:{name}:1.0"));
        config.set(format!("{name}.name"), *name);
    }
    for (key, value) in extra {
        config.set(*key, *value);
    }
    config
}

fn probe_container(journal: &Journal, names: &[&str], extra: &[(&str, &str)]) -> Container {
    let mut container = Container::new("test", "lifecycle test");
    container.add_factory(probe_factory(journal));
    container
        .configure(&probe_config(names, extra))
        .expect("valid configuration");
    container
}

// ── State transitions ────────────────────────────────────────────────

#[test]
fn opening_twice_is_invalid_state_without_side_effects() {
    let journal = journal();
    let mut container = probe_container(&journal, &["a"], &[]);
    container.open(Some("123")).expect("first open");
    let before = journal.lock().clone();
    let registered = container.references().map(References::len);

    let err = container.open(Some("123")).unwrap_err();
    assert!(matches!(err, ContainerError::InvalidState { code, .. } if code == ALREADY_OPENED));
    assert!(container.is_open());
    assert_eq!(*journal.lock(), before);
    assert_eq!(container.references().map(References::len), registered);

    container.close(Some("123")).expect("close");
}

#[test]
fn closing_unopened_container_does_nothing() {
    let journal = journal();
    let mut container = probe_container(&journal, &["a"], &[]);
    container.close(None).expect("idle close");
    container.close(None).expect("second idle close");
    assert!(!container.is_open());
    assert!(journal.lock().is_empty());
}

#[test]
fn open_then_close_round_trip() {
    let journal = journal();
    let mut container = probe_container(&journal, &["a"], &[]);

    container.open(None).expect("open");
    assert!(container.is_open());
    assert!(
        container
            .references()
            .and_then(|r| r.get_one_optional(constants::context_info_any()))
            .is_some()
    );
    assert_eq!(entries(&journal, "open:"), vec!["open:a"]);

    container.close(None).expect("close");
    assert!(!container.is_open());
    assert!(container.references().is_none());
}

// ── Ordering ─────────────────────────────────────────────────────────

#[test]
fn components_open_in_order_and_close_in_reverse() {
    let journal = journal();
    let mut container = probe_container(&journal, &["a", "b", "c"], &[]);

    container.open(None).expect("open");
    container.close(None).expect("close");

    let events: Vec<String> = journal
        .lock()
        .iter()
        .filter(|e| *e != "create")
        .cloned()
        .collect();
    assert_eq!(
        events,
        vec![
            "link:a", "link:b", "link:c", "open:a", "open:b", "open:c", "close:c", "close:b",
            "close:a", "unlink:c", "unlink:b", "unlink:a",
        ]
    );
}

#[test]
fn reopening_builds_fresh_components() {
    let journal = journal();
    let mut container = probe_container(&journal, &["a"], &[]);
    for _ in 0..2 {
        container.open(None).expect("open");
        container.close(None).expect("close");
    }
    assert_eq!(entries(&journal, "create").len(), 2);
    assert_eq!(entries(&journal, "open:"), vec!["open:a", "open:a"]);
}

// ── Failure handling ─────────────────────────────────────────────────

#[test]
fn unresolvable_locator_fails_with_build_error() {
    let journal = journal();
    let mut container = probe_container(&journal, &["a"], &[]);
    let mut config = probe_config(&["a"], &[]);
    config.set("widget.descriptor", "acme:widget:default:default:1.0");
    container.configure(&config).expect("valid configuration");

    let err = container.open(None).unwrap_err();
    assert!(
        matches!(err, ContainerError::Build { ref locator, .. } if locator == "acme:widget:default:default:1.0")
    );
    assert!(err.to_string().contains("acme:widget:default:default:1.0"));
    assert!(!container.is_open());
    assert!(entries(&journal, "open:").is_empty());
}

#[test]
fn failing_open_rolls_back_opened_components() {
    let journal = journal();
    let mut container = probe_container(&journal, &["a", "b", "c"], &[("b.open", "error")]);

    let err = container.open(Some("123")).unwrap_err();
    assert!(matches!(err, ContainerError::Component { .. }));
    assert_eq!(err.correlation_id(), Some("123"));
    assert!(!container.is_open());
    assert_eq!(entries(&journal, "open:"), vec!["open:a"]);
    assert_eq!(entries(&journal, "close:"), vec!["close:a"]);
    assert_eq!(entries(&journal, "unlink:"), vec!["unlink:c", "unlink:b", "unlink:a"]);
}

#[test]
fn failed_open_is_logged_before_rollback() {
    let journal = journal();
    let mut container = probe_container(&journal, &["a", "b"], &[("b.open", "error")]);
    container.set_logger(Arc::new(JournalLogger {
        journal: Arc::clone(&journal),
    }));

    assert!(container.open(None).is_err());
    let events: Vec<String> = journal
        .lock()
        .iter()
        .filter(|e| e.starts_with("log:fatal:") || e.starts_with("close:"))
        .cloned()
        .collect();
    assert_eq!(events, vec!["log:fatal:failed to start container", "close:a"]);
}

#[test]
fn failed_rollback_is_logged_as_warning() {
    let journal = journal();
    let mut container = probe_container(
        &journal,
        &["a", "b"],
        &[("a.close", "error"), ("b.open", "error")],
    );
    container.set_logger(Arc::new(JournalLogger {
        journal: Arc::clone(&journal),
    }));

    let err = container.open(None).unwrap_err();
    assert!(matches!(err, ContainerError::Component { ref message, .. } if message.contains("b failed to open")));
    assert!(!container.is_open());
    assert_eq!(entries(&journal, "log:fatal:").len(), 1);
    let warnings = entries(&journal, "log:warn:");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("a failed to close"));
}

#[test]
fn panic_during_open_is_recovered_and_rolled_back() {
    let journal = journal();
    let mut container = probe_container(&journal, &["a", "b"], &[("b.open", "panic")]);

    let err = container.open(None).unwrap_err();
    assert!(matches!(err, ContainerError::RecoveredFault { ref message, .. } if message.contains("b panicked")));
    assert!(!container.is_open());
    assert_eq!(entries(&journal, "close:"), vec!["close:a"]);
}

#[test]
fn panic_during_close_still_closes_container() {
    let journal = journal();
    let mut container = probe_container(&journal, &["a", "b"], &[("b.close", "panic")]);
    container.open(None).expect("open");

    let err = container.close(None).unwrap_err();
    assert!(matches!(err, ContainerError::RecoveredFault { .. }));
    assert!(!container.is_open());
    assert_eq!(entries(&journal, "close:"), vec!["close:a"]);
    assert_eq!(entries(&journal, "unlink:"), vec!["unlink:b", "unlink:a"]);
}

#[test]
fn several_close_failures_are_aggregated() {
    let journal = journal();
    let mut container = probe_container(
        &journal,
        &["a", "b", "c"],
        &[("a.close", "error"), ("c.close", "error")],
    );
    container.open(None).expect("open");

    let err = container.close(None).unwrap_err();
    match err {
        ContainerError::Aggregate { ref errors } => assert_eq!(errors.len(), 2),
        other => panic!("expected aggregate, got {other}"),
    }
    assert!(!container.is_open());
    assert_eq!(entries(&journal, "close:"), vec!["close:b"]);
}

#[test]
fn shutdown_component_panicking_on_open_is_recovered() {
    let mut container = Container::default();
    container
        .configure(&ConfigParams::from_tuples(&[
            ("shutdown.descriptor", "pip-services:shutdown:default:default:1.0"),
            ("shutdown.mode", "panic"),
        ]))
        .expect("valid configuration");

    let err = container.open(None).unwrap_err();
    assert!(matches!(err, ContainerError::RecoveredFault { .. }));
    assert!(!container.is_open());
}

// ── Factories and configuration ──────────────────────────────────────

#[test]
fn factory_added_after_open_does_not_rebuild_components() {
    let journal = journal();
    let mut container = probe_container(&journal, &["a"], &[]);
    container.open(None).expect("open");

    container.add_factory(probe_factory(&journal));
    assert_eq!(entries(&journal, "create").len(), 1);
    assert_eq!(container.references().map(References::len), Some(3));

    container.close(None).expect("close");
}

#[test]
fn locator_without_factory_resolves_after_add_factory() {
    let journal = journal();
    let mut container = Container::default();
    container
        .configure(&probe_config(&["a"], &[]))
        .expect("valid configuration");
    assert!(matches!(container.open(None), Err(ContainerError::Build { .. })));

    container.add_factory(probe_factory(&journal));
    container.open(None).expect("open after add_factory");
    assert_eq!(entries(&journal, "open:"), vec!["open:a"]);
    container.close(None).expect("close");
}

#[test]
fn console_logger_configuration_opens_and_closes() {
    let mut container = Container::default();
    container
        .configure(&ConfigParams::from_tuples(&[(
            "0.descriptor",
            "pip-services:logger:console:default:1.0",
        )]))
        .expect("valid configuration");

    container.open(None).expect("open");
    assert!(container.is_open());
    container.logger().info(None, "logger is usable");

    container.close(None).expect("close");
    assert!(!container.is_open());
}

#[test]
fn only_the_last_configuration_is_used() {
    let journal = journal();
    let mut container = probe_container(&journal, &["first"], &[]);
    container
        .configure(&probe_config(&["second"], &[]))
        .expect("valid configuration");

    container.open(None).expect("open");
    assert_eq!(entries(&journal, "open:"), vec!["open:second"]);
    container.close(None).expect("close");
}

#[test]
fn configured_context_info_supersedes_default() {
    let mut container = Container::new("default-name", "");
    container
        .configure(&ConfigParams::from_tuples(&[
            ("info.descriptor", "pip-services:context-info:default:default:1.0"),
            ("info.name", "configured"),
        ]))
        .expect("valid configuration");

    container.open(None).expect("open");
    assert_eq!(container.info().name(), "configured");
    let infos = container
        .references()
        .map(|r| r.get_optional_as::<ContextInfo>(constants::context_info_any()))
        .expect("registry");
    assert_eq!(infos.len(), 1);
    container.close(None).expect("close");
}

#[test]
fn reads_parameterized_configuration_file() {
    let journal = journal();
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("temp file");
    file.write_all(
        br#"[
            { "descriptor": "test:probe:default:a:1.0", "name": "{{ PROBE }}" },
            { "descriptor": "pip-services:cache:memory:default:1.0" }
        ]"#,
    )
    .expect("write");

    let mut container = Container::default();
    container.add_factory(probe_factory(&journal));
    let params = ConfigParams::from_tuples(&[("PROBE", "from-file")]);
    container
        .read_config_from_file(None, file.path(), Some(&params))
        .expect("read configuration");
    assert_eq!(container.config().len(), 2);

    container.open(None).expect("open");
    assert_eq!(entries(&journal, "open:"), vec!["open:from-file"]);
    container.close(None).expect("close");
}

// ── Nesting and process container ────────────────────────────────────

#[test]
fn nested_container_wires_parent() {
    let journal = journal();
    let parent: Arc<dyn Component> = Arc::new(Parent {
        journal: Arc::clone(&journal),
    });
    let mut container = Container::inherit("child", "", parent);
    container.add_factory(probe_factory(&journal));
    container
        .configure(&probe_config(&["a"], &[]))
        .expect("valid configuration");

    container.open(None).expect("open");
    assert_eq!(entries(&journal, "parent-link:"), vec!["parent-link:3"]);
    container.close(None).expect("close");

    let events = journal.lock().clone();
    let unlink = events.iter().position(|e| e == "parent-unlink").expect("unlinked");
    let closed = events.iter().position(|e| e == "close:a").expect("closed");
    assert!(unlink < closed);
}

#[test]
fn process_container_runs_until_signalled() {
    let mut file = tempfile::Builder::new()
        .suffix(".yml")
        .tempfile()
        .expect("temp file");
    file.write_all(
        b"- descriptor: pip-services:context-info:default:default:1.0\n  name: {{NAME}}\n\
          - descriptor: pip-services:logger:console:default:1.0\n  level: info\n",
    )
    .expect("write");

    let mut process = ProcessContainer::new("process", "")
        .with_config_path(file.path())
        .with_parameters(&ConfigParams::from_tuples(&[("NAME", "signalled")]));
    let (sender, receiver) = mpsc::channel();
    sender.send(()).expect("signal");

    process.run_until(Some("123"), receiver).expect("run");
    assert!(!process.container().is_open());
    assert_eq!(process.container().info().name(), "signalled");
}
