use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tera::Value;
use tracing::debug;

use crate::error::{FillError, Result};

/// Flag-supplied values, keyed by parameter name.
pub type ValueMap = BTreeMap<String, String>;

/// Split a `name=value` argument into its parts.
///
/// The argument must contain exactly one `=` and a non-empty name. The value
/// may be empty.
pub fn parse_assignment(argument: &str) -> Result<(String, String)> {
    let malformed = |reason: &str| FillError::MalformedArgument {
        argument: argument.to_string(),
        reason: reason.to_string(),
    };

    let Some((name, value)) = argument.split_once('=') else {
        return Err(malformed("expected name=value"));
    };
    if value.contains('=') {
        return Err(malformed("expected exactly one '='"));
    }
    if name.is_empty() {
        return Err(malformed("name must not be empty"));
    }

    Ok((name.to_string(), value.to_string()))
}

/// Build a map from `name=value` flags. Later flags win over earlier ones.
pub fn load_inline(arguments: &[String]) -> Result<ValueMap> {
    let mut values = ValueMap::new();
    for argument in arguments {
        let (name, value) = parse_assignment(argument)?;
        values.insert(name, value);
    }
    Ok(values)
}

/// Build a map from `name=/path/to/file` flags, using each file's trimmed contents.
pub fn load_file_backed(arguments: &[String]) -> Result<ValueMap> {
    let mut values = ValueMap::new();
    for argument in arguments {
        let (name, path) = parse_assignment(argument)?;
        let path = PathBuf::from(path);
        let contents =
            std::fs::read_to_string(&path).map_err(|e| FillError::ValueFileRead {
                name: name.clone(),
                path: path.clone(),
                source: e,
            })?;
        values.insert(name, contents.trim().to_string());
    }
    Ok(values)
}

/// Combine inline and file-backed values, rejecting names that appear in both.
pub fn merge_flag_values(inline: ValueMap, file_backed: ValueMap) -> Result<ValueMap> {
    let mut merged = inline;
    for (name, value) in file_backed {
        if merged.contains_key(&name) {
            return Err(FillError::Conflict { name });
        }
        merged.insert(name, value);
    }
    Ok(merged)
}

/// Read and parse a YAML values file into a generic document.
pub fn load_values_file(path: &Path) -> Result<Value> {
    let bytes = std::fs::read(path).map_err(|e| FillError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_values_document(&bytes, path)
}

/// Parse YAML bytes, resolving `<<` merge keys. An empty document yields
/// `Value::Null`.
pub fn parse_values_document(bytes: &[u8], path: &Path) -> Result<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    let parse_err = |e| FillError::ValuesParse {
        path: path.to_path_buf(),
        source: e,
    };

    let mut document: serde_yaml::Value = serde_yaml::from_slice(bytes).map_err(parse_err)?;
    document.apply_merge().map_err(parse_err)?;
    serde_yaml::from_value(document).map_err(parse_err)
}

/// Where a configuration takes its values from.
#[derive(Debug, Clone, Default)]
pub struct ValueSources {
    /// YAML document bound as the whole context.
    pub values_file: Option<PathBuf>,
    /// `name=value` flags.
    pub inline: Vec<String>,
    /// `name=/path/to/file` flags.
    pub file_backed: Vec<String>,
}

/// Values gathered from every enabled source, before they become a render context.
#[derive(Debug, Clone, Default)]
pub struct LoadedValues {
    pub document: Option<(PathBuf, Value)>,
    pub flags: ValueMap,
}

impl ValueSources {
    /// Load every enabled source. Fails on the first malformed argument,
    /// unreadable file or conflicting name.
    pub fn load(&self) -> Result<LoadedValues> {
        let document = match &self.values_file {
            Some(path) => Some((path.clone(), load_values_file(path)?)),
            None => None,
        };

        let inline = load_inline(&self.inline)?;
        let file_backed = load_file_backed(&self.file_backed)?;
        debug!(
            inline = inline.len(),
            file_backed = file_backed.len(),
            "loaded flag values"
        );
        let flags = merge_flag_values(inline, file_backed)?;

        Ok(LoadedValues { document, flags })
    }
}
