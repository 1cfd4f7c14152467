use serde::Deserialize;

/// Client-side status decoder configuration
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecoderConfig {
    /// What to do when the status code metadata is not a valid integer
    #[serde(default)]
    pub on_invalid_status_code: InvalidStatusCodePolicy,
}

/// Handling of status code metadata that fails to parse
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidStatusCodePolicy {
    /// Return the call's original result untouched
    #[default]
    Preserve,
    /// Replace the call's result with the parse failure
    Surface,
}
