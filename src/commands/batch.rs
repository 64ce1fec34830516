use std::error::Error;
use std::path::PathBuf;

use console::style;
use miette::Result;
use tplfill::config::RenderConfig;
use tplfill::error::FillError;

pub fn run(
    values: Option<PathBuf>,
    root: PathBuf,
    suffix: String,
    exclude: Vec<String>,
    dry_run: bool,
) -> Result<()> {
    let Some(values) = values else {
        return Err(FillError::MissingRequiredFlag {
            flag: "-f".into(),
            hint: "Pass a YAML values file with -f <FILE> or set TPLFILL_VALUES".into(),
        }
        .into());
    };

    let mut config = RenderConfig::batch(values, root)
        .with_suffix(suffix)
        .with_exclude(exclude);
    config.dry_run = dry_run;

    let report = tplfill::run(&config, &mut std::io::stdout().lock())?;

    for error in &report.discovery_errors {
        eprintln!(
            "{} {}",
            style("warning:").yellow().bold(),
            style(error).yellow()
        );
    }

    for failure in &report.failures {
        eprintln!(
            "{} {}",
            style("error:").red().bold(),
            style(failure.source.display()).cyan()
        );
        print_chain(&failure.error);
    }

    if dry_run {
        println!(
            "\n{} Dry run, files that would be written:",
            style("==>").cyan().bold()
        );
        for file in &report.planned {
            println!("  {} {}", style("create").green(), file.destination);
        }
        println!(
            "\n{} Dry run, no files written.",
            style("\u{2139}").blue().bold()
        );
    } else {
        println!(
            "{} {} of {} templates rendered",
            style("✓").green().bold(),
            report.written.len(),
            report.templates.len()
        );
    }

    if !report.is_success() {
        return Err(FillError::BatchFailed {
            failed: report.failed_count(),
            total: report.templates.len(),
        }
        .into());
    }

    Ok(())
}

fn print_chain(error: &dyn Error) {
    eprintln!("  {error}");
    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("    {} {cause}", style("caused by:").dim());
        source = cause.source();
    }
}
