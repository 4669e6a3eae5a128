pub mod fake;
pub mod money;

/// `Some` only when the value has visible content. The original string is kept as is.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
