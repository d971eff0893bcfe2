//! Naming conventions of compiler-generated variables.

use once_cell::sync::Lazy;
use regex::Regex;

static TEMP_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^::.+$").expect("temp pattern"));
static AUTOVAR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^::(.+)_var$").expect("autovar pattern"));
static NONE_VAR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^::nonevar$").expect("none-var pattern"));

/// Compiler temporary eligible for inlining (`::temp3`), excluding property
/// backing variables and the discard target `::NoneVar`.
pub fn is_temp(name: &str) -> bool {
    TEMP_PATTERN.is_match(name) && !AUTOVAR_PATTERN.is_match(name) && !NONE_VAR_PATTERN.is_match(name)
}

pub fn autovar_property(name: &str) -> Option<&str> {
    AUTOVAR_PATTERN.captures(name).and_then(|c| c.get(1)).map(|m| m.as_str())
}

pub fn is_none_var(name: &str) -> bool {
    NONE_VAR_PATTERN.is_match(name)
}
