//! Output formatter implementations.

use std::fmt::Write as _;

use serde::Serialize;

use crate::error::{Result, Violation};
use crate::external::DeploymentOutput;
use crate::graph::{Edge, ResourceNode};
use crate::operations::{Plan, PlanOutcome, PlanStep};

use super::OutputFormatter;

/// Serializable view of a planning outcome.
#[derive(Serialize)]
struct Report<'a> {
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "is_empty")]
    violations: &'a [Violation],
    #[serde(skip_serializing_if = "is_empty")]
    warnings: &'a [String],
    steps: Vec<PlanStep>,
    resources: Vec<&'a ResourceNode>,
    edges: Vec<&'a Edge>,
    outputs: &'a [DeploymentOutput],
}

impl<'a> Report<'a> {
    fn new(outcome: &'a PlanOutcome) -> Self {
        let empty = Self {
            outcome: "",
            name: None,
            violations: &[],
            warnings: &[],
            steps: Vec::new(),
            resources: Vec::new(),
            edges: Vec::new(),
            outputs: &[],
        };
        match outcome {
            PlanOutcome::Empty { warnings } => Self {
                outcome: "empty",
                warnings,
                ..empty
            },
            PlanOutcome::Invalid { violations } => Self {
                outcome: "invalid",
                violations,
                ..empty
            },
            PlanOutcome::Valid(plan) => Self {
                outcome: "valid",
                name: Some(&plan.name),
                warnings: &plan.warnings,
                steps: plan.steps(),
                resources: plan.graph.nodes().collect(),
                edges: plan.graph.edges().collect(),
                outputs: &plan.outputs,
                ..empty
            },
        }
    }
}

fn is_empty<T>(items: &&[T]) -> bool {
    items.is_empty()
}

/// Formatter for JSON output.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format(&self, outcome: &PlanOutcome) -> Result<String> {
        Ok(serde_json::to_string_pretty(&Report::new(outcome))?)
    }

    fn format_outputs(&self, outputs: &[DeploymentOutput]) -> Result<String> {
        Ok(serde_json::to_string_pretty(outputs)?)
    }
}

/// Formatter for YAML output.
pub struct YamlFormatter;

impl OutputFormatter for YamlFormatter {
    fn format(&self, outcome: &PlanOutcome) -> Result<String> {
        Ok(serde_yaml::to_string(&Report::new(outcome))?)
    }

    fn format_outputs(&self, outputs: &[DeploymentOutput]) -> Result<String> {
        Ok(serde_yaml::to_string(outputs)?)
    }
}

/// Formatter for Graphviz DOT output.
///
/// Nodes are labelled with their id and kind; edges point from
/// prerequisite to dependent.
pub struct DotFormatter;

impl DotFormatter {
    fn render(plan: &Plan) -> String {
        let mut dot = format!("digraph {} {{\n  rankdir=LR;\n", quote(&plan.name));
        for node in plan.graph.nodes() {
            let label = format!("{}\n{}", node.id, node.kind());
            let _ = writeln!(dot, "  {} [label={}];", quote(node.id.as_str()), quote(&label));
        }
        for edge in plan.graph.edges() {
            let _ = writeln!(
                dot,
                "  {} -> {};",
                quote(edge.from.as_str()),
                quote(edge.to.as_str())
            );
        }
        dot.push('}');
        dot
    }
}

impl OutputFormatter for DotFormatter {
    fn format(&self, outcome: &PlanOutcome) -> Result<String> {
        Ok(match outcome {
            PlanOutcome::Valid(plan) => Self::render(plan),
            PlanOutcome::Empty { .. } => "digraph eksplan {\n}".to_string(),
            PlanOutcome::Invalid { violations } => {
                let mut dot = "digraph eksplan {\n".to_string();
                for violation in violations {
                    let _ = writeln!(dot, "  // {violation}");
                }
                dot.push('}');
                dot
            }
        })
    }
}

// DOT ID quoting: wrap in double quotes, escape quotes and backslashes
fn quote(id: &str) -> String {
    let escaped = id
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}

/// Formatter for human-readable output.
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format(&self, outcome: &PlanOutcome) -> Result<String> {
        let mut lines = Vec::new();
        match outcome {
            PlanOutcome::Empty { warnings } => {
                lines.push("Nothing to plan.".to_string());
                push_warnings(&mut lines, warnings);
            }
            PlanOutcome::Invalid { violations } => {
                lines.push(format!("Configuration is invalid ({} problem(s)):", violations.len()));
                for violation in violations {
                    lines.push(format!("  - {violation}"));
                }
            }
            PlanOutcome::Valid(plan) => {
                lines.push(format!("Plan {} ({} resources):", plan.name, plan.len()));
                for (i, step) in plan.steps().iter().enumerate() {
                    lines.push(format!("  {:>2}. {}", i + 1, step.description));
                    if !step.depends_on.is_empty() {
                        let after: Vec<_> = step.depends_on.iter().map(ToString::to_string).collect();
                        lines.push(format!("      after {}", after.join(", ")));
                    }
                }
                if !plan.outputs.is_empty() {
                    lines.push(String::new());
                    lines.push(self.format_outputs(&plan.outputs)?);
                }
                push_warnings(&mut lines, &plan.warnings);
            }
        }
        Ok(lines.join("\n"))
    }
}

fn push_warnings(lines: &mut Vec<String>, warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push("Warnings:".to_string());
    for warning in warnings {
        lines.push(format!("  - {warning}"));
    }
}
