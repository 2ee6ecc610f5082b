use std::error::Error;
use std::sync::{Arc, Mutex};

use assetforge::errors::{RegistryError, TaskError};
use assetforge::tasks::TaskRegistry;

type TestResult = Result<(), Box<dyn Error>>;

type RunLog = Arc<Mutex<Vec<String>>>;

/// Register a task that appends its name to `log` and optionally fails.
fn recording_task(
    reg: &mut TaskRegistry,
    name: &str,
    predecessors: &[&str],
    log: &RunLog,
    fail: bool,
) {
    let log = Arc::clone(log);
    let task_name = name.to_string();
    reg.register(name, predecessors, move |_registry| {
        let log = Arc::clone(&log);
        let task_name = task_name.clone();
        Box::pin(async move {
            log.lock().unwrap().push(task_name.clone());
            if fail {
                anyhow::bail!("{task_name} exploded");
            }
            Ok(())
        })
    })
    .expect("registration should succeed");
}

#[tokio::test]
async fn sequence_runs_steps_in_declared_order() -> TestResult {
    let mut reg = TaskRegistry::new();
    let log: RunLog = Arc::default();

    recording_task(&mut reg, "clean", &[], &log, false);
    recording_task(&mut reg, "compile", &[], &log, false);
    recording_task(&mut reg, "copy", &[], &log, false);
    reg.register_sequence("all", &["clean", "compile", "copy"])?;
    reg.validate()?;

    let reg = Arc::new(reg);
    reg.run("all").await?;

    assert_eq!(*log.lock().unwrap(), vec!["clean", "compile", "copy"]);
    Ok(())
}

#[tokio::test]
async fn failing_step_aborts_the_rest_of_the_sequence() -> TestResult {
    let mut reg = TaskRegistry::new();
    let log: RunLog = Arc::default();

    recording_task(&mut reg, "clean", &[], &log, false);
    recording_task(&mut reg, "a", &[], &log, true);
    recording_task(&mut reg, "b", &[], &log, false);
    reg.register_sequence("all", &["clean", "a", "b"])?;

    let reg = Arc::new(reg);
    let err = reg.run("all").await.expect_err("sequence should fail");

    // b never started, and the failure names the step that stopped it.
    assert_eq!(*log.lock().unwrap(), vec!["clean", "a"]);
    match err {
        TaskError::SequenceAborted { sequence, step, .. } => {
            assert_eq!(sequence, "all");
            assert_eq!(step, "a");
        }
        other => panic!("expected SequenceAborted, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn predecessors_run_first_in_declared_order() -> TestResult {
    let mut reg = TaskRegistry::new();
    let log: RunLog = Arc::default();

    recording_task(&mut reg, "clean", &[], &log, false);
    recording_task(&mut reg, "compile", &[], &log, false);
    recording_task(&mut reg, "package", &["clean", "compile"], &log, false);

    let reg = Arc::new(reg);
    reg.run("package").await?;

    assert_eq!(*log.lock().unwrap(), vec!["clean", "compile", "package"]);
    Ok(())
}

#[tokio::test]
async fn failed_predecessor_blocks_the_dependent_action() -> TestResult {
    let mut reg = TaskRegistry::new();
    let log: RunLog = Arc::default();

    recording_task(&mut reg, "compile", &[], &log, true);
    recording_task(&mut reg, "package", &["compile"], &log, false);

    let reg = Arc::new(reg);
    let err = reg.run("package").await.expect_err("run should fail");

    assert_eq!(*log.lock().unwrap(), vec!["compile"]);
    match err {
        TaskError::PredecessorFailed {
            task, predecessor, ..
        } => {
            assert_eq!(task, "package");
            assert_eq!(predecessor, "compile");
        }
        other => panic!("expected PredecessorFailed, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn sequences_nest_and_abort_propagates_outward() -> TestResult {
    let mut reg = TaskRegistry::new();
    let log: RunLog = Arc::default();

    recording_task(&mut reg, "clean", &[], &log, false);
    recording_task(&mut reg, "compile", &[], &log, true);
    reg.register_sequence("build", &["clean", "compile"])?;
    reg.register_sequence("default", &["build", "clean"])?;

    let reg = Arc::new(reg);
    let err = reg.run("default").await.expect_err("nested failure");

    // The outer sequence stops at its first step; clean runs exactly once.
    assert_eq!(*log.lock().unwrap(), vec!["clean", "compile"]);
    match err {
        TaskError::SequenceAborted { sequence, step, .. } => {
            assert_eq!(sequence, "default");
            assert_eq!(step, "build");
        }
        other => panic!("expected SequenceAborted, got {other:?}"),
    }
    Ok(())
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut reg = TaskRegistry::new();
    let log: RunLog = Arc::default();

    recording_task(&mut reg, "clean", &[], &log, false);

    let err = reg
        .register("clean", &[], |_registry| Box::pin(async { Ok(()) }))
        .expect_err("duplicate must be rejected");
    assert!(matches!(err, RegistryError::Duplicate(name) if name == "clean"));
}

#[tokio::test]
async fn unknown_task_is_an_error() {
    let reg = Arc::new(TaskRegistry::new());
    let err = reg.run("nope").await.expect_err("unknown task");
    assert!(matches!(err, TaskError::Unknown(name) if name == "nope"));
}

#[test]
fn predecessor_cycle_fails_validation() {
    let mut reg = TaskRegistry::new();
    let log: RunLog = Arc::default();

    recording_task(&mut reg, "a", &["b"], &log, false);
    recording_task(&mut reg, "b", &["a"], &log, false);

    assert!(matches!(reg.validate(), Err(RegistryError::Cycle(_))));
}

#[test]
fn sequence_referencing_missing_task_fails_validation() {
    let mut reg = TaskRegistry::new();
    reg.register_sequence("all", &["ghost"]).unwrap();

    match reg.validate() {
        Err(RegistryError::UnknownReference { task, reference }) => {
            assert_eq!(task, "all");
            assert_eq!(reference, "ghost");
        }
        other => panic!("expected UnknownReference, got {other:?}"),
    }
}
