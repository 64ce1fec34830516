use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use tera::Context;
use tracing::{error, info};

use crate::config::{FailurePolicy, OutputMode};
use crate::error::{FillError, Result};
use crate::render::file::render_template;
use crate::render::walker::destination_path;

/// Where one rendered template is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    File(PathBuf),
    Stdout,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::File(path) => write!(f, "{}", path.display()),
            Destination::Stdout => f.write_str("<stdout>"),
        }
    }
}

/// A template rendered in memory, waiting to be written.
#[derive(Debug)]
pub struct PlannedFile {
    pub source: PathBuf,
    pub destination: Destination,
    pub content: String,
}

/// A template that could not be rendered or written.
#[derive(Debug)]
pub struct TemplateFailure {
    pub source: PathBuf,
    pub error: FillError,
}

/// The result of rendering without writing anything.
#[derive(Debug, Default)]
pub struct RenderPlan {
    pub files: Vec<PlannedFile>,
    pub failures: Vec<TemplateFailure>,
}

/// The result of writing a plan.
#[derive(Debug, Default)]
pub struct WriteOutcome {
    pub written: Vec<Destination>,
    pub failures: Vec<TemplateFailure>,
}

fn destination_for(source: &Path, output: &OutputMode) -> Destination {
    match output {
        OutputMode::Sibling { suffix } => Destination::File(destination_path(source, suffix)),
        OutputMode::Stdout => Destination::Stdout,
    }
}

/// Render each template in order. Under [`FailurePolicy::FailFast`] the first
/// failure is returned as the error; otherwise it is recorded in the plan.
pub fn plan_templates(
    templates: &[PathBuf],
    context: &Context,
    output: &OutputMode,
    policy: FailurePolicy,
) -> Result<RenderPlan> {
    let mut plan = RenderPlan::default();

    for source in templates {
        info!("rendering {}", source.display());
        match render_template(source, context) {
            Ok(content) => plan.files.push(PlannedFile {
                source: source.clone(),
                destination: destination_for(source, output),
                content,
            }),
            Err(e) if policy == FailurePolicy::FailFast => return Err(e),
            Err(e) => {
                error!(source = %source.display(), error = %e, "template failed");
                plan.failures.push(TemplateFailure {
                    source: source.clone(),
                    error: e,
                });
            }
        }
    }

    Ok(plan)
}

/// Write every planned file. Stdout output goes to `stdout`; file output
/// creates or truncates the destination.
pub fn execute_plan<W: Write>(
    plan: RenderPlan,
    stdout: &mut W,
    policy: FailurePolicy,
) -> Result<WriteOutcome> {
    let mut outcome = WriteOutcome {
        written: Vec::new(),
        failures: plan.failures,
    };

    for file in plan.files {
        match write_one(&file, stdout) {
            Ok(()) => outcome.written.push(file.destination),
            Err(e) if policy == FailurePolicy::FailFast => return Err(e),
            Err(e) => {
                error!(destination = %file.destination, error = %e, "write failed");
                outcome.failures.push(TemplateFailure {
                    source: file.source,
                    error: e,
                });
            }
        }
    }

    Ok(outcome)
}

fn write_one<W: Write>(file: &PlannedFile, stdout: &mut W) -> Result<()> {
    let write_err = |e| FillError::Write {
        destination: file.destination.to_string(),
        source: e,
    };

    match &file.destination {
        Destination::File(path) => std::fs::write(path, &file.content).map_err(write_err),
        Destination::Stdout => {
            stdout.write_all(file.content.as_bytes()).map_err(write_err)?;
            stdout.flush().map_err(write_err)
        }
    }
}
