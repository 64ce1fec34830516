pub mod config;
pub mod error;
pub mod render;
pub mod values;

use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use crate::config::{RenderConfig, TemplateInput};
use crate::error::{FillError, Result};
use crate::render::{
    build_render_context, discover_templates, execute_plan, plan_templates, Destination,
    PlannedFile, TemplateFailure,
};

/// What a run did.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Templates considered, in processing order.
    pub templates: Vec<PathBuf>,
    pub written: Vec<Destination>,
    /// Files that were rendered but not written because of a dry run.
    pub planned: Vec<PlannedFile>,
    pub failures: Vec<TemplateFailure>,
    pub discovery_errors: Vec<FillError>,
}

impl RunReport {
    pub fn failed_count(&self) -> usize {
        self.failures.len() + self.discovery_errors.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Load values, render the configured templates and write the results.
///
/// Setup errors (arguments, values) always abort before anything is
/// rendered. Per-template errors abort or are collected depending on the
/// configured [`config::FailurePolicy`].
pub fn run<W: Write>(config: &RenderConfig, stdout: &mut W) -> Result<RunReport> {
    config.validate()?;

    let loaded = config.sources.load()?;
    let context = build_render_context(loaded)?;

    let (templates, discovery_errors) = match &config.templates {
        TemplateInput::Discover {
            root,
            suffix,
            exclude,
        } => {
            let discovery = discover_templates(root, suffix, exclude)?;
            (discovery.templates, discovery.errors)
        }
        TemplateInput::Single(path) => (vec![path.clone()], Vec::new()),
    };

    let plan = plan_templates(&templates, &context, &config.output, config.failure)?;
    let mut report = RunReport {
        templates,
        discovery_errors,
        ..RunReport::default()
    };

    if config.dry_run {
        debug!(files = plan.files.len(), "dry run, nothing written");
        report.planned = plan.files;
        report.failures = plan.failures;
        return Ok(report);
    }

    let outcome = execute_plan(plan, stdout, config.failure)?;
    report.written = outcome.written;
    report.failures = outcome.failures;
    Ok(report)
}
