//! Environment interpolation for config files
//!
//! Handles `${VARIABLE}` references in connector config files so that
//! credentials can be kept out of the file itself.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Regex for matching environment references: ${NAME}
static ENV_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}").unwrap());

/// Render a template string using the process environment
pub fn render_env(template: &str) -> Result<String> {
    render_with(template, |name| std::env::var(name).ok())
}

/// Render a template string with a custom variable lookup
///
/// Every referenced variable must resolve; unresolved names are reported
/// together in a single config error.
pub fn render_with<F>(template: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = Vec::new();

    let rendered = ENV_REGEX.replace_all(template, |cap: &regex::Captures<'_>| {
        let name = &cap[1];
        match lookup(name) {
            Some(value) => value,
            None => {
                missing.push(name.to_string());
                String::new()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::config(format!(
            "Undefined environment variable(s): {}",
            missing.join(", ")
        )))
    }
}

/// Check if a string contains environment references
pub fn has_templates(s: &str) -> bool {
    ENV_REGEX.is_match(s)
}

/// Extract all variable names referenced by a template
pub fn extract_variables(template: &str) -> Vec<String> {
    ENV_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_simple_substitution() {
        let result = render_with("password: ${RETS_PASSWORD}", lookup(&[("RETS_PASSWORD", "s3cret")]));
        assert_eq!(result.unwrap(), "password: s3cret");
    }

    #[test]
    fn test_whitespace_inside_braces() {
        let result = render_with("${ USER }", lookup(&[("USER", "agent")]));
        assert_eq!(result.unwrap(), "agent");
    }

    #[test]
    fn test_multiple_substitutions() {
        let result = render_with(
            "${USER}:${PASS}",
            lookup(&[("USER", "agent"), ("PASS", "pw")]),
        );
        assert_eq!(result.unwrap(), "agent:pw");
    }

    #[test]
    fn test_undefined_variable() {
        let err = render_with("${A} ${B}", lookup(&[("A", "1")])).unwrap_err();
        assert!(err.to_string().contains("Undefined environment variable(s): B"));
    }

    #[test]
    fn test_no_templates() {
        let result = render_with("plain text $HOME", lookup(&[]));
        assert_eq!(result.unwrap(), "plain text $HOME");
    }

    #[test]
    fn test_has_templates() {
        assert!(has_templates("${X}"));
        assert!(!has_templates("$X"));
        assert!(!has_templates("{X}"));
    }

    #[test]
    fn test_extract_variables() {
        let vars = extract_variables("${LOGIN_URL} and ${RETS_PASSWORD}");
        assert_eq!(vars, vec!["LOGIN_URL", "RETS_PASSWORD"]);
    }
}
