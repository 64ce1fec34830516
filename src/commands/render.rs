use std::path::PathBuf;

use miette::Result;
use tplfill::config::RenderConfig;

pub fn run(input: PathBuf, values: Vec<String>, value_files: Vec<String>) -> Result<()> {
    let config = RenderConfig::inline(input, values, value_files);
    tplfill::run(&config, &mut std::io::stdout().lock())?;
    Ok(())
}
