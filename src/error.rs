#![allow(unused_assignments)]

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum FillError {
    #[error("Missing required flag {flag}")]
    #[diagnostic(help("{hint}"))]
    MissingRequiredFlag { flag: String, hint: String },

    #[error("Malformed argument '{argument}': {reason}")]
    #[diagnostic(help("Values must be given as name=value"))]
    MalformedArgument { argument: String, reason: String },

    #[error("Failed to read {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read value file for '{name}' at {path}")]
    #[diagnostic(help("Check that the file exists and is readable"))]
    ValueFileRead {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse values file {path}")]
    #[diagnostic(help("Check the YAML syntax in your values file"))]
    ValuesParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Values file {path} must contain a mapping at the top level, found {found}")]
    ValuesNotMapping { path: PathBuf, found: String },

    #[error("Failed to parse template {path}")]
    #[diagnostic(help("Check your Tera template syntax"))]
    TemplateParse {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    #[error("Template {path} references undefined value '{key}'")]
    #[diagnostic(help("Supply '{key}' in the values file or with --val"))]
    UndefinedKey {
        path: PathBuf,
        key: String,
        #[source]
        source: tera::Error,
    },

    #[error("Failed to render template {path}")]
    Render {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    #[error("Value '{name}' is supplied by both --val and --val-file")]
    #[diagnostic(help("Remove one of the two definitions"))]
    Conflict { name: String },

    #[error("Failed to write {destination}")]
    Write {
        destination: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error while walking {root}")]
    Discovery {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Glob pattern error: {pattern}")]
    GlobPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("{failed} failure(s) while rendering {total} template(s)")]
    #[diagnostic(help("Each failure is listed above"))]
    BatchFailed { failed: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, FillError>;
