use tera::{Context, Value};

use crate::error::{FillError, Result};
use crate::values::{LoadedValues, ValueMap};

/// Build a Tera context from flag-supplied values.
pub fn build_context(values: &ValueMap) -> Context {
    let mut context = Context::new();
    for (key, value) in values {
        context.insert(key, value);
    }
    context
}

/// Bind a parsed values document as the whole context.
///
/// Tera only binds names from a top-level mapping, so sequences and scalars
/// are rejected. A null document binds nothing.
pub fn context_from_document(document: Value, path: &std::path::Path) -> Result<Context> {
    match document {
        Value::Null => Ok(Context::new()),
        Value::Object(map) => {
            let mut context = Context::new();
            for (key, value) in map {
                context.insert(key, &value);
            }
            Ok(context)
        }
        other => Err(FillError::ValuesNotMapping {
            path: path.to_path_buf(),
            found: describe(&other).to_string(),
        }),
    }
}

/// Build the render context from every loaded source. Flag values are
/// inserted over the document's top-level keys.
pub fn build_render_context(loaded: LoadedValues) -> Result<Context> {
    let mut context = match loaded.document {
        Some((path, document)) => context_from_document(document, &path)?,
        None => Context::new(),
    };
    context.extend(build_context(&loaded.flags));
    Ok(context)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
