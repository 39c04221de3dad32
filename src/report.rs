//! Outcome tree and reporting.
//!
//! Every sub-run produces a [`Record`]; records nest the same way the runs did.
//! [`Report`] wraps the root record and provides the summary, console rendering
//! and JSON output.

use std::collections::BTreeMap;
use std::io;

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::config::HostConfig;
use crate::errors::{MesaError, MesaResult};

// =============================================================================
// CORE TYPES
// =============================================================================

/// How a scenario ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped { reason: String },
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped { .. })
    }
}

/// Measurements from the final round of a benchmark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchResult {
    pub n: u64,
    pub elapsed_ns: u64,
    pub ns_per_op: f64,
    /// Per-operation averages reported through `Ctx::report_metric`.
    pub metrics: BTreeMap<String, f64>,
}

/// Result of a single scenario and its children.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub name: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
    pub elapsed_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bench: Option<BenchResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Record>,
}

impl Record {
    /// Finds a record by its full path.
    pub fn find(&self, name: &str) -> Option<&Record> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Leaf records plus any container that recorded failures of its own,
    /// in execution order.
    pub fn scenarios(&self) -> Vec<&Record> {
        let mut out = Vec::new();
        self.collect_scenarios(&mut out);
        out
    }

    fn collect_scenarios<'a>(&'a self, out: &mut Vec<&'a Record>) {
        if self.children.is_empty() || !self.errors.is_empty() {
            out.push(self);
        }
        for child in &self.children {
            child.collect_scenarios(out);
        }
    }
}

/// Pass/fail/skip counts over the scenarios of a report.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// The outcome of one root run.
#[derive(Debug, Clone)]
pub struct Report {
    root: Record,
}

impl Report {
    pub fn new(root: Record) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Record {
        &self.root
    }

    pub fn find(&self, name: &str) -> Option<&Record> {
        self.root.find(name)
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for record in self.root.scenarios() {
            match record.outcome {
                Outcome::Passed => summary.passed += 1,
                Outcome::Failed => summary.failed += 1,
                Outcome::Skipped { .. } => summary.skipped += 1,
            }
        }
        summary
    }

    /// Paths of the failed scenarios.
    pub fn failures(&self) -> Vec<String> {
        self.root
            .scenarios()
            .into_iter()
            .filter(|record| record.outcome.is_failed())
            .map(|record| record.name.clone())
            .collect()
    }

    pub fn into_result(self) -> MesaResult<Summary> {
        let failed = self.failures();
        if failed.is_empty() {
            Ok(self.summary())
        } else {
            Err(MesaError::CasesFailed { failed })
        }
    }

    /// Panics with the failure details unless every scenario passed or was
    /// skipped. Meant for the end of a `#[test]` function.
    pub fn assert_passed(&self) {
        let failed = self.failures();
        if failed.is_empty() {
            return;
        }
        let mut message = MesaError::CasesFailed { failed }.to_string();
        for record in self.root.scenarios() {
            for error in &record.errors {
                message.push_str(&format!("\n  {}: {}", record.name, error));
            }
        }
        panic!("{message}");
    }

    pub fn to_json(&self) -> MesaResult<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    /// Prints the report to stdout, coloured when the config allows it.
    pub fn print(&self, config: &HostConfig) -> io::Result<()> {
        let choice = if config.use_colors {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        let mut stdout = StandardStream::stdout(choice);
        self.render(&mut stdout)
    }

    // =========================================================================
    // RENDERING
    // =========================================================================

    pub fn render<W: WriteColor>(&self, out: &mut W) -> io::Result<()> {
        for record in self.root.scenarios() {
            render_record(out, record)?;
        }

        let summary = self.summary();
        write!(out, "\nTest summary: total {}, ", summary.total())?;
        write_label(out, "passed", Color::Green)?;
        write!(out, " {}, ", summary.passed)?;
        write_label(out, "failed", Color::Red)?;
        write!(out, " {}, ", summary.failed)?;
        write_label(out, "skipped", Color::Yellow)?;
        writeln!(out, " {}", summary.skipped)?;

        let failed = self.failures();
        if !failed.is_empty() {
            writeln!(out, "\nFailed tests:")?;
            for name in failed {
                writeln!(out, "  - {name}")?;
            }
        }
        Ok(())
    }
}

fn write_label<W: WriteColor>(out: &mut W, label: &str, color: Color) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{label}")?;
    out.reset()
}

fn render_record<W: WriteColor>(out: &mut W, record: &Record) -> io::Result<()> {
    match &record.outcome {
        Outcome::Passed => match &record.bench {
            Some(bench) => {
                write_label(out, "BENCH", Color::Cyan)?;
                write!(
                    out,
                    ": {} {} iterations, {:.2} ns/op",
                    record.name, bench.n, bench.ns_per_op
                )?;
                for (unit, value) in &bench.metrics {
                    write!(out, ", {value:.4} {unit}")?;
                }
                writeln!(out)?;
            }
            None => {
                write_label(out, "PASS", Color::Green)?;
                writeln!(out, ": {} ({:.2}ms)", record.name, record.elapsed_ms)?;
            }
        },
        Outcome::Failed => {
            write_label(out, "FAIL", Color::Red)?;
            writeln!(out, ": {} ({:.2}ms)", record.name, record.elapsed_ms)?;
            for error in &record.errors {
                for line in error.lines() {
                    writeln!(out, "    {line}")?;
                }
            }
        }
        Outcome::Skipped { reason } => {
            write_label(out, "SKIP", Color::Yellow)?;
            writeln!(out, ": {} ({})", record.name, reason)?;
        }
    }
    for line in &record.logs {
        writeln!(out, "    log: {line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use termcolor::Buffer;

    use super::*;

    fn leaf(name: &str, outcome: Outcome) -> Record {
        Record {
            name: name.to_string(),
            outcome,
            errors: Vec::new(),
            logs: Vec::new(),
            elapsed_ms: 0.5,
            bench: None,
            children: Vec::new(),
        }
    }

    fn sample() -> Report {
        let mut failed = leaf("suite/bad", Outcome::Failed);
        failed.errors.push("Not equal:\nexpected: 1\nactual  : 2".to_string());
        let mut bench = leaf("suite/fast", Outcome::Passed);
        bench.bench = Some(BenchResult {
            n: 100,
            elapsed_ns: 2_000,
            ns_per_op: 20.0,
            metrics: BTreeMap::from([("allocs/op".to_string(), 1.0)]),
        });
        let mut root = leaf("suite", Outcome::Failed);
        root.children = vec![
            leaf("suite/good", Outcome::Passed),
            failed,
            leaf(
                "suite/later",
                Outcome::Skipped {
                    reason: "flaky".to_string(),
                },
            ),
            bench,
        ];
        Report::new(root)
    }

    #[test]
    fn test_summary_counts_leaves() {
        let summary = sample().summary();
        assert_eq!(
            summary,
            Summary {
                passed: 2,
                failed: 1,
                skipped: 1
            }
        );
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn test_render_plain() {
        let mut buffer = Buffer::no_color();
        sample().render(&mut buffer).unwrap();
        let text = String::from_utf8(buffer.into_inner()).unwrap();
        assert!(text.contains("PASS: suite/good"));
        assert!(text.contains("FAIL: suite/bad"));
        assert!(text.contains("    expected: 1"));
        assert!(text.contains("SKIP: suite/later (flaky)"));
        assert!(text.contains("BENCH: suite/fast 100 iterations, 20.00 ns/op, 1.0000 allocs/op"));
        assert!(text.contains("Test summary: total 4, passed 2, failed 1, skipped 1"));
        assert!(text.contains("  - suite/bad"));
    }

    #[test]
    fn test_into_result_lists_failures() {
        let err = sample().into_result().unwrap_err();
        match err {
            MesaError::CasesFailed { failed } => assert_eq!(failed, vec!["suite/bad"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_json_shape() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "suite");
        assert_eq!(value["outcome"]["status"], "failed");
        assert_eq!(value["children"][2]["outcome"]["reason"], "flaky");
        assert_eq!(value["children"][3]["bench"]["n"], 100);
    }

    #[test]
    #[should_panic(expected = "suite/bad")]
    fn test_assert_passed_panics_on_failure() {
        sample().assert_passed();
    }
}
