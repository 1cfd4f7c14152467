use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Matches `{{ scope.NAME }}`, capturing `scope.NAME`
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*\}\}").expect("placeholder pattern is valid"));

/// Failure to expand a configuration placeholder
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpandError {
    #[error("environment variable not set: `{0}`")]
    Missing(String),

    #[error("unsupported placeholder `{0}`, expected `env.NAME`")]
    UnsupportedScope(String),
}

/// Replace `{{ env.NAME }}` placeholders in raw TOML with environment values
///
/// Comment lines are left as written.
pub fn expand_env(input: &str) -> Result<String, ExpandError> {
    input.split_inclusive('\n').map(expand_line).collect()
}

fn expand_line(line: &str) -> Result<String, ExpandError> {
    if line.trim_start().starts_with('#') {
        return Ok(line.to_owned());
    }

    let mut expanded = String::with_capacity(line.len());
    let mut copied = 0;

    for captures in PLACEHOLDER.captures_iter(line) {
        let (Some(whole), Some(key)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        expanded.push_str(&line[copied..whole.start()]);
        expanded.push_str(&lookup(key.as_str())?);
        copied = whole.end();
    }

    expanded.push_str(&line[copied..]);
    Ok(expanded)
}

fn lookup(key: &str) -> Result<String, ExpandError> {
    let name = key
        .strip_prefix("env.")
        .filter(|name| !name.is_empty() && !name.contains('.'))
        .ok_or_else(|| ExpandError::UnsupportedScope(key.to_owned()))?;

    std::env::var(name).map_err(|_| ExpandError::Missing(name.to_owned()))
}
