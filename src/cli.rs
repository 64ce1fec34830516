use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tplfill",
    about = "Render text templates from YAML values or command-line values",
    version
)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "TPLFILL_LOG", value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render every template under a directory next to its source
    #[command(after_help = "Exit status: every template is attempted, but the command exits \
non-zero if any template failed to render or write, or if the directory walk hit an error. \
Outputs that rendered successfully are still written.")]
    Batch {
        /// YAML values file bound as the template context
        #[arg(short = 'f', long = "values", env = "TPLFILL_VALUES", value_name = "FILE")]
        values: Option<PathBuf>,

        /// Directory to search for templates
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// File name suffix that marks a template; stripped from the output name
        #[arg(long, default_value = ".tpl")]
        suffix: String,

        /// Skip templates matching this glob, relative to the root (can be repeated)
        #[arg(long, value_name = "GLOB")]
        exclude: Vec<String>,

        /// Render everything and list the outputs without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Render one template to stdout from inline and file-backed values
    Render {
        /// Template to render
        #[arg(long = "in", value_name = "PATH")]
        input: PathBuf,

        /// Set a value (can be repeated: --val name=value)
        #[arg(long = "val", value_name = "NAME=VALUE")]
        values: Vec<String>,

        /// Set a value from a file's trimmed contents (can be repeated: --val-file name=/path)
        #[arg(long = "val-file", value_name = "NAME=PATH")]
        value_files: Vec<String>,
    },

    /// Render one template to stdout from file-backed values only
    RenderFiles {
        /// Template to render
        #[arg(long = "in", value_name = "PATH")]
        input: PathBuf,

        /// Set a value from a file's trimmed contents (can be repeated: --val name=/path)
        #[arg(long = "val", value_name = "NAME=PATH")]
        value_files: Vec<String>,
    },
}
