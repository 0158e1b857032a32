//! Plan execution engine.
//!
//! This module walks a [`Plan`] in dependency order and hands every node to
//! an [`Applier`].

use std::collections::BTreeMap;

use crate::error::Result;
use crate::external::{apply_node, publish, Applier, DeploymentOutput, Handle, OutputSink};
use crate::graph::{DependencyScheduler, ResourceId};

use super::plan::Plan;

/// Result of executing a plan.
///
/// This struct provides information about what happened during execution,
/// including whether it was a dry run and what actions were taken.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Whether the execution was successful.
    pub success: bool,

    /// Whether this was a dry-run (no applier calls made).
    pub dry_run: bool,

    /// Descriptions of actions that were taken (or would be taken in dry-run).
    pub actions_taken: Vec<String>,

    /// Warnings from the plan.
    pub warnings: Vec<String>,

    /// Handles returned by the applier, by node. Empty in dry-run.
    pub handles: BTreeMap<ResourceId, Handle>,

    /// Outputs of the applied plan.
    pub outputs: Vec<DeploymentOutput>,
}

impl ExecutionResult {
    fn new(plan: &Plan, dry_run: bool, handles: BTreeMap<ResourceId, Handle>) -> Self {
        Self {
            success: true,
            dry_run,
            actions_taken: plan.steps().into_iter().map(|s| s.description).collect(),
            warnings: plan.warnings.clone(),
            handles,
            outputs: plan.outputs.clone(),
        }
    }
}

/// Executes plans through an [`Applier`].
///
/// The executor can run in normal mode (calling the applier) or dry-run
/// mode (reporting the actions without calling anything).
///
/// Every node is applied after all of its prerequisites and receives their
/// handles in id order. The first applier error stops the run and is
/// returned unchanged; nodes applied before it are not rolled back.
pub struct PlanExecutor<'a, A: Applier + ?Sized> {
    applier: &'a mut A,
    dry_run: bool,
}

impl<'a, A: Applier + ?Sized> PlanExecutor<'a, A> {
    /// Creates a new plan executor.
    #[must_use]
    pub fn new(applier: &'a mut A) -> Self {
        Self {
            applier,
            dry_run: false,
        }
    }

    /// Sets the executor to dry-run mode.
    #[must_use]
    pub const fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Executes a plan.
    ///
    /// # Errors
    ///
    /// Returns the first error the applier reports.
    pub fn execute(&mut self, plan: &Plan) -> Result<ExecutionResult> {
        if self.dry_run {
            log::info!("dry run of plan '{}' ({} resources)", plan.name, plan.len());
            return Ok(ExecutionResult::new(plan, true, BTreeMap::new()));
        }

        let mut handles: BTreeMap<ResourceId, Handle> = BTreeMap::new();
        for id in DependencyScheduler::new(&plan.graph).topological_order() {
            let Some(node) = plan.graph.node(id) else {
                continue;
            };
            let dependencies: Vec<Handle> = plan
                .graph
                .dependencies_of(id)
                .filter_map(|dep| handles.get(dep).cloned())
                .collect();

            log::debug!("applying {id}");
            let handle = apply_node(&mut *self.applier, node, &dependencies)?;
            log::trace!("{id} -> {handle}");
            handles.insert(id.clone(), handle);
        }

        log::info!("applied plan '{}' ({} resources)", plan.name, handles.len());
        Ok(ExecutionResult::new(plan, false, handles))
    }

    /// Executes a plan and publishes its outputs to `sink`.
    ///
    /// Outputs are published only after every node was applied, and never
    /// in dry-run.
    ///
    /// # Errors
    ///
    /// Returns the applier's or the sink's error.
    pub fn execute_and_publish<S: OutputSink + ?Sized>(
        &mut self,
        plan: &Plan,
        sink: &mut S,
    ) -> Result<ExecutionResult> {
        let result = self.execute(plan)?;
        if !result.dry_run {
            publish(&result.outputs, sink)?;
        }
        Ok(result)
    }
}
