//! `~` and environment variable expansion for configuration paths.

use crate::ConfigError;

/// Expand `~` and `${VAR}` references in a path string.
///
/// `field` names the configuration key for error messages.
pub(crate) fn expand_path(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::full(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}
