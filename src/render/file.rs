use std::error::Error as _;
use std::path::Path;

use tera::{Context, Tera};

use crate::error::{FillError, Result};
use crate::render::strict::find_undefined;

/// Render a single template file against a context.
///
/// Any reference to a value missing from the context fails the render; no
/// output is produced unless evaluation completes.
pub fn render_template(path: &Path, context: &Context) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|e| FillError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    render_str(path, &content, context)
}

/// Render template source text, using `path` as its name in diagnostics.
pub fn render_str(path: &Path, content: &str, context: &Context) -> Result<String> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);

    let name = path.to_string_lossy();
    tera.add_raw_template(&name, content)
        .map_err(|e| FillError::TemplateParse {
            path: path.to_path_buf(),
            source: e,
        })?;

    let template = tera.get_template(&name).map_err(|e| FillError::TemplateParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    if let Some(key) = find_undefined(&template.ast, context) {
        return Err(FillError::UndefinedKey {
            path: path.to_path_buf(),
            source: tera::Error::msg(format!(
                "Variable `{key}` not found in context while rendering '{name}'"
            )),
            key,
        });
    }

    tera.render(&name, context).map_err(|e| match undefined_key(&e) {
        Some(key) => FillError::UndefinedKey {
            path: path.to_path_buf(),
            key,
            source: e,
        },
        None => FillError::Render {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

/// Extract the variable name from Tera's "Variable `x` not found in context" error.
fn undefined_key(err: &tera::Error) -> Option<String> {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
        let message = e.to_string();
        if message.contains("not found in context") {
            let start = message.find('`')? + 1;
            let len = message[start..].find('`')?;
            return Some(message[start..start + len].to_string());
        }
        current = e.source();
    }
    None
}
