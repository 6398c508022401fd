//! Implementation of `extconf check`.
//!
//! Predicts the failures a configured build will hit when make runs,
//! without changing what `configure` accepts.

use std::fmt::Write;
use std::path::PathBuf;

use miette::Diagnostic;

use crate::core::layout::RootRole;
use crate::ops::configure::{ConfigureOptions, ConfigurePlan};
use crate::util::errors::ConfigureError;

/// A root and whether it exists.
#[derive(Debug, Clone)]
pub struct RootStatus {
    pub role: RootRole,
    pub path: PathBuf,
    pub exists: bool,
}

/// Findings for one extension.
#[derive(Debug)]
pub struct CheckReport {
    pub target: String,
    pub roots: Vec<RootStatus>,
    /// Objects found besides the wrapper
    pub object_count: usize,
    /// Deferred errors the build would run into
    pub findings: Vec<ConfigureError>,
}

impl CheckReport {
    /// Whether the build is expected to succeed.
    pub fn is_ok(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Check every root and the object manifest.
pub fn check(opts: &ConfigureOptions) -> Result<CheckReport, ConfigureError> {
    let plan = ConfigurePlan::resolve(opts)?;
    let mut findings = Vec::new();

    let roots: Vec<RootStatus> = plan
        .roots
        .roots()
        .map(|(role, root)| {
            let path = root.resolve(&plan.anchor);
            let exists = path.is_dir();
            RootStatus { role, path, exists }
        })
        .collect();

    for status in roots.iter().filter(|s| !s.exists) {
        tracing::debug!("{} missing: {}", status.role, status.path.display());
        findings.push(ConfigureError::MissingHeaderOrObject {
            role: status.role,
            path: status.path.clone(),
        });
    }

    let manifest = plan.discover()?;
    if !manifest.has_core_objects() {
        findings.push(ConfigureError::Linker {
            target: plan.spec.target().to_string(),
            dir: manifest.source_dir().to_path_buf(),
            suffix: manifest.suffix().to_string(),
        });
    }

    Ok(CheckReport {
        target: plan.spec.target().to_string(),
        roots,
        object_count: manifest.discovered().len(),
        findings,
    })
}

/// Format a report for terminal output.
pub fn format_report(report: &CheckReport) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Extension `{}`", report.target);
    for root in &report.roots {
        let status = if root.exists { "[OK]" } else { "[!!]" };
        let _ = writeln!(output, "  {} {}: {}", status, root.role, root.path.display());
    }
    let status = if report.object_count > 0 { "[OK]" } else { "[!!]" };
    let _ = writeln!(output, "  {} objects: {}", status, report.object_count);

    if !report.findings.is_empty() {
        let _ = writeln!(output);
        for finding in &report.findings {
            let _ = writeln!(output, "{}", finding);
            if let Some(help) = finding.help() {
                let _ = writeln!(output, "      help: {}", help);
            }
        }
    }

    output
}
