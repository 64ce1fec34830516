use std::path::PathBuf;

use miette::Result;
use tplfill::config::RenderConfig;

pub fn run(input: PathBuf, value_files: Vec<String>) -> Result<()> {
    let config = RenderConfig::file_backed(input, value_files);
    tplfill::run(&config, &mut std::io::stdout().lock())?;
    Ok(())
}
