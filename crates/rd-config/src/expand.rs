//! `${VAR}` expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// Bare `$VAR` is left alone when the string has no braced reference, so
/// literal dollar signs in tokens and URLs survive.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let expanded =
        shellexpand::env_with_context_no_errors(value, |var| std::env::var(var).ok());

    // Unset variables without a default are left verbatim by the expander.
    if let Some(start) = expanded.find("${") {
        let name = expanded[start + 2..]
            .split('}')
            .next()
            .unwrap_or_default();
        return Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{name}}} not set"),
        });
    }

    Ok(expanded.into_owned())
}

/// Expand an optional value; an expansion that yields an empty string
/// becomes `None`.
pub(crate) fn expand_optional(
    value: Option<&str>,
    field: &str,
) -> Result<Option<String>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let expanded = expand_env(value, field)?;
    Ok((!expanded.is_empty()).then_some(expanded))
}
