use std::env::var;
use std::str::FromStr;

/// Get the value of ENV var, or a default
///
/// Only when:
/// - It is set
/// - It is not empty
pub fn env_var_or_else(var_name: &'static str, or_else: fn() -> String) -> String {
    if let Ok(value) = var(var_name) {
        if !value.is_empty() {
            return value;
        }
    }

    or_else()
}

/// Parse the value of an ENV var, or fall back to a default
///
/// Unset, empty, and unparsable values all yield the default
pub fn env_var_parse_or<T: FromStr>(var_name: &'static str, default: T) -> T {
    var(var_name)
        .ok()
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
