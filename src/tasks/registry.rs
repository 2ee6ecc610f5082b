// src/tasks/registry.rs

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, info};

use crate::errors::{RegistryError, TaskError};

/// Public type alias for task names throughout the crate.
pub type TaskName = String;

/// Future returned by a task action.
pub type ActionFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// Future returned by [`TaskRegistry::run`].
pub type RunFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send>>;

type ActionFn = dyn Fn(Arc<TaskRegistry>) -> ActionFuture + Send + Sync;

enum TaskKind {
    /// A plain action (usually one pipeline run or one side effect).
    Action(Box<ActionFn>),
    /// A named sequence of other tasks, executed strictly in order and
    /// aborted on the first failure. Sequences are ordinary registry
    /// entries so they can be invoked uniformly.
    Sequence(Vec<TaskName>),
}

struct Task {
    name: TaskName,
    /// Tasks that must complete successfully, in this order, before the
    /// task's own action starts.
    predecessors: Vec<TaskName>,
    kind: TaskKind,
}

/// The process-wide task table.
///
/// Built once at startup by appending registrations, then shared behind an
/// `Arc` and treated as read-only for the rest of the process lifetime.
/// There is no ambient global registry; whoever needs to run tasks holds a
/// reference to this object.
///
/// Duplicate names are rejected at registration time rather than silently
/// overwriting the earlier definition.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: HashMap<TaskName, Task>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task with an async action and its declared predecessors.
    pub fn register<F>(
        &mut self,
        name: &str,
        predecessors: &[&str],
        action: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(Arc<TaskRegistry>) -> ActionFuture + Send + Sync + 'static,
    {
        self.insert(Task {
            name: name.to_string(),
            predecessors: predecessors.iter().map(|s| s.to_string()).collect(),
            kind: TaskKind::Action(Box::new(action)),
        })
    }

    /// Register a named sequence over already-named tasks.
    pub fn register_sequence(&mut self, name: &str, steps: &[&str]) -> Result<(), RegistryError> {
        self.insert(Task {
            name: name.to_string(),
            predecessors: Vec::new(),
            kind: TaskKind::Sequence(steps.iter().map(|s| s.to_string()).collect()),
        })
    }

    fn insert(&mut self, task: Task) -> Result<(), RegistryError> {
        if self.tasks.contains_key(&task.name) {
            return Err(RegistryError::Duplicate(task.name));
        }
        self.tasks.insert(task.name.clone(), task);
        Ok(())
    }

    /// All registered task names, sorted for stable output.
    pub fn task_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tasks.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Check the whole table for unknown references and cycles.
    ///
    /// Edges run from a referenced task (predecessor or sequence step) to
    /// the task referencing it; a topological sort failing means running
    /// some task would recurse forever. These are startup errors, never
    /// routed through the pipeline error sink.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for name in self.tasks.keys() {
            graph.add_node(name.as_str());
        }

        for task in self.tasks.values() {
            let mut referenced: Vec<&TaskName> = task.predecessors.iter().collect();
            if let TaskKind::Sequence(steps) = &task.kind {
                referenced.extend(steps.iter());
            }

            for reference in referenced {
                if !self.tasks.contains_key(reference) {
                    return Err(RegistryError::UnknownReference {
                        task: task.name.clone(),
                        reference: reference.clone(),
                    });
                }
                if reference == &task.name {
                    return Err(RegistryError::Cycle(task.name.clone()));
                }
                graph.add_edge(reference.as_str(), task.name.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => Err(RegistryError::Cycle(cycle.node_id().to_string())),
        }
    }

    /// Run a task by name.
    ///
    /// Declared predecessors run first, sequentially, in declared order; a
    /// predecessor failure means the task's own action never starts.
    /// Sequences execute their steps strictly in order and abort on the
    /// first failure. The returned future resolves exactly once, with the
    /// task's completion or the failure that stopped it.
    pub fn run(self: &Arc<Self>, name: &str) -> RunFuture {
        let registry = Arc::clone(self);
        let name = name.to_string();

        Box::pin(async move {
            let task = registry
                .tasks
                .get(&name)
                .ok_or_else(|| TaskError::Unknown(name.clone()))?;

            debug!(task = %name, "task starting");

            for predecessor in &task.predecessors {
                if let Err(err) = registry.run(predecessor).await {
                    return Err(TaskError::PredecessorFailed {
                        task: name.clone(),
                        predecessor: predecessor.clone(),
                        source: Box::new(err),
                    });
                }
            }

            match &task.kind {
                TaskKind::Action(action) => {
                    action(Arc::clone(&registry)).await.map_err(|cause| {
                        TaskError::ActionFailed {
                            task: name.clone(),
                            cause,
                        }
                    })?;
                }
                TaskKind::Sequence(steps) => {
                    for step in steps {
                        if let Err(err) = registry.run(step).await {
                            return Err(TaskError::SequenceAborted {
                                sequence: name.clone(),
                                step: step.clone(),
                                source: Box::new(err),
                            });
                        }
                    }
                }
            }

            info!(task = %name, "task completed");
            Ok(())
        })
    }
}
