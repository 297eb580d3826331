mod common;

use std::io::Write;

use tempfile::NamedTempFile;
use taskgraph::config::load_and_validate;
use taskgraph::errors::TaskGraphError;
use taskgraph::exec::CommandTasks;
use taskgraph::{PrerequisitePolicy, RepeatRunPolicy};
use taskgraph_test_utils::builders::ConfigFileBuilder;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn manager_section_is_loaded() {
    let file = write_config(
        r#"
[manager]
prerequisites = "discover"
repeat_run = "rerun"
max_parallel = 3

[task.a]
cmd = "echo a"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.manager.prerequisites, PrerequisitePolicy::Discover);
    assert_eq!(cfg.manager.repeat_run, RepeatRunPolicy::Rerun);
    assert_eq!(cfg.manager.max_parallel, 3);
}

#[test]
fn unknown_dependency_returns_config_error() {
    let file = write_config(
        r#"
[task.A]
cmd = "echo A"
after = ["NonExistent"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(TaskGraphError::ConfigError(msg)) => {
            assert!(msg.contains("unknown dependency"));
            assert!(msg.contains("NonExistent"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_and_validate(dir.path().join("Taskgraph.toml"));
    assert!(matches!(result, Err(TaskGraphError::IoError(_))));
}

#[test]
fn config_without_tasks_is_rejected() {
    let file = write_config("[manager]\nmax_parallel = 2\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(TaskGraphError::ConfigError(_))
    ));
}

#[test]
fn builder_applies_the_same_validation_as_files() {
    let err = ConfigFileBuilder::new()
        .task("main", "true", &["missing"])
        .max_parallel(2)
        .try_build()
        .unwrap_err();
    assert!(err.to_string().contains("missing"), "{err}");

    assert!(matches!(
        ConfigFileBuilder::new().task("main", "true", &[]).max_parallel(0).try_build(),
        Err(TaskGraphError::ConfigError(_))
    ));
}

#[test]
fn cyclic_after_is_reported_by_the_manager() {
    let cfg = ConfigFileBuilder::new()
        .task("A", "echo A", &["B"])
        .task("B", "echo B", &["A"])
        .build();

    let tasks = CommandTasks::from_config(&cfg);
    let mut manager = tasks.manager(&cfg);

    match manager.run() {
        Err(TaskGraphError::CyclicDependency { cycle }) => {
            let names: Vec<_> = cycle.iter().filter_map(|l| l.name()).collect();
            assert_eq!(names, ["A", "B", "A"]);
        }
        other => panic!("expected CyclicDependency, got {other:?}"),
    }
    assert!(tasks.iter().all(|(_, task)| task.invocations() == 0));
}

#[test]
fn unregistered_config_task_needs_discover_policy() {
    let strict = ConfigFileBuilder::new()
        .unregistered_task("setup", "true", &[])
        .task("main", "true", &["setup"])
        .build();

    let tasks = CommandTasks::from_config(&strict);
    let mut manager = tasks.manager(&strict);
    assert_eq!(manager.len(), 1);
    assert!(matches!(
        manager.plan(),
        Err(TaskGraphError::UnregisteredPrerequisite { .. })
    ));

    let discover = ConfigFileBuilder::new()
        .prerequisites(PrerequisitePolicy::Discover)
        .unregistered_task("setup", "true", &[])
        .task("main", "true", &["setup"])
        .build();

    let tasks = CommandTasks::from_config(&discover);
    let plan = tasks.manager(&discover).plan().unwrap();
    let order: Vec<_> = plan.labels().into_iter().filter_map(|l| l.name).collect();
    assert_eq!(order, ["setup", "main"]);
}

#[cfg(unix)]
#[test]
fn command_tasks_write_in_dependency_order() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.txt");
    let out = out.display();

    let cfg = ConfigFileBuilder::new()
        .task("compile", &format!("echo compile >> {out}"), &["fetch"])
        .task("fetch", &format!("echo fetch >> {out}"), &[])
        .task("test", &format!("echo test >> {out}"), &["compile"])
        .build();

    let tasks = CommandTasks::from_config(&cfg);
    let mut manager = tasks.manager(&cfg);
    manager.run().unwrap();

    let written = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
    assert_eq!(written.lines().collect::<Vec<_>>(), ["fetch", "compile", "test"]);
}
