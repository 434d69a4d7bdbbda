//! Command template rendering
//!
//! Tool commands carry a whitespace-separated syntax template with
//! {placeholder} slots, e.g. `fabric --pattern {pattern}`. Rendering
//! substitutes parameters per argument and returns an argv list. The
//! result is only ever handed to `Command::args` - never to a shell -
//! so parameter values need no quoting or escaping.

use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while rendering a command template
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Missing value for placeholder: {0}")]
    MissingValue(String),

    #[error("Unterminated placeholder in template: {0}")]
    Unterminated(String),

    #[error("Template renders to an empty command")]
    Empty,
}

/// Render a syntax template into an argument vector
pub fn render_argv(
    template: &str,
    params: &HashMap<String, String>,
) -> Result<Vec<String>, TemplateError> {
    let mut argv = Vec::new();
    for token in template.split_whitespace() {
        argv.push(render_token(token, params)?);
    }

    if argv.is_empty() {
        return Err(TemplateError::Empty);
    }
    Ok(argv)
}

/// Placeholders referenced by a template, in order of appearance
pub fn placeholders(template: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                if !name.is_empty() && !found.iter().any(|f| f == name) {
                    found.push(name.to_string());
                }
                rest = &after[end + 1..];
            }
            None => break,
        }
    }

    found
}

/// Substitute {placeholder} slots within a single argument
fn render_token(
    token: &str,
    params: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let mut out = String::new();
    let mut rest = token;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('}')
            .ok_or_else(|| TemplateError::Unterminated(token.to_string()))?;
        let key = &after[..end];
        let value = params
            .get(key)
            .ok_or_else(|| TemplateError::MissingValue(key.to_string()))?;
        out.push_str(value);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
