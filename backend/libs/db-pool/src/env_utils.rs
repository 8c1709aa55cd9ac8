//! Environment variable helpers
//!
//! Parse settings with defaults instead of unwrapping, and resolve
//! settings that may be supplied under more than one name.

use std::str::FromStr;

/// Parse an environment variable, falling back to `default` when it is
/// missing or unparsable
pub fn parse_env_with_default<T: FromStr>(key: &str, default: T) -> T {
    parse_env_optional(key).unwrap_or(default)
}

/// Parse an environment variable, returning `None` if missing or invalid
pub fn parse_env_optional<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Value of the first non-empty variable among `keys`
///
/// # Example
/// ```ignore
/// let url = first_env(&["DATABASE_URL", "MONGO_URI"]);
/// ```
pub fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.trim().is_empty())
}
