use std::path::PathBuf;

use crate::error::{FillError, Result};
use crate::render::walker::DEFAULT_TEMPLATE_SUFFIX;
use crate::values::ValueSources;

/// Which templates a run renders.
#[derive(Debug, Clone)]
pub enum TemplateInput {
    /// Every file under `root` whose name ends in `suffix`.
    Discover {
        root: PathBuf,
        suffix: String,
        exclude: Vec<String>,
    },
    /// One explicitly named template.
    Single(PathBuf),
}

/// Where rendered output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Next to the template, with `suffix` stripped from its name.
    Sibling { suffix: String },
    Stdout,
}

/// What happens when one template fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Report the failure and keep going with the remaining templates.
    BestEffort,
    /// Abort the whole run on the first failure.
    FailFast,
}

/// Everything that distinguishes one kind of run from another.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub sources: ValueSources,
    pub templates: TemplateInput,
    pub output: OutputMode,
    pub failure: FailurePolicy,
    /// Render everything but write nothing. Only meaningful for sibling output.
    pub dry_run: bool,
}

impl RenderConfig {
    /// Render every `.tpl` file under `root` in place, using a YAML values file.
    pub fn batch(values_file: PathBuf, root: PathBuf) -> Self {
        Self {
            sources: ValueSources {
                values_file: Some(values_file),
                ..ValueSources::default()
            },
            templates: TemplateInput::Discover {
                root,
                suffix: DEFAULT_TEMPLATE_SUFFIX.to_string(),
                exclude: Vec::new(),
            },
            output: OutputMode::Sibling {
                suffix: DEFAULT_TEMPLATE_SUFFIX.to_string(),
            },
            failure: FailurePolicy::BestEffort,
            dry_run: false,
        }
    }

    /// Render one template to stdout from `name=value` and `name=/path` flags.
    pub fn inline(template: PathBuf, inline: Vec<String>, file_backed: Vec<String>) -> Self {
        Self {
            sources: ValueSources {
                values_file: None,
                inline,
                file_backed,
            },
            templates: TemplateInput::Single(template),
            output: OutputMode::Stdout,
            failure: FailurePolicy::FailFast,
            dry_run: false,
        }
    }

    /// Render one template to stdout from `name=/path` flags only.
    pub fn file_backed(template: PathBuf, file_backed: Vec<String>) -> Self {
        Self::inline(template, Vec::new(), file_backed)
    }

    /// Use `suffix` both to discover templates and to derive their output names.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        if let TemplateInput::Discover { suffix: s, .. } = &mut self.templates {
            *s = suffix.clone();
        }
        if let OutputMode::Sibling { suffix: s } = &mut self.output {
            *s = suffix;
        }
        self
    }

    /// Skip discovered templates matching any of `patterns`.
    pub fn with_exclude(mut self, patterns: Vec<String>) -> Self {
        if let TemplateInput::Discover { exclude, .. } = &mut self.templates {
            *exclude = patterns;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        match &self.templates {
            TemplateInput::Single(path) if path.as_os_str().is_empty() => {
                return Err(FillError::MissingRequiredFlag {
                    flag: "--in".into(),
                    hint: "Pass the template to render with --in <path>".into(),
                });
            }
            TemplateInput::Discover { suffix, .. } if suffix.is_empty() => {
                return Err(empty_suffix());
            }
            _ => {}
        }

        if let OutputMode::Sibling { suffix } = &self.output {
            if suffix.is_empty() {
                return Err(empty_suffix());
            }
        }

        Ok(())
    }
}

fn empty_suffix() -> FillError {
    FillError::MalformedArgument {
        argument: "--suffix".into(),
        reason: "template suffix must not be empty".into(),
    }
}
