use std::env;

pub const FILE_LOCAL_ENV: &str = "SEARCH_INTEL_FILE_LOCAL";
pub const TRACE_SEARCH_ENV: &str = "SEARCH_INTEL_TRACE_SEARCH";

/// Per-call options read by the search client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    /// Request the `fileLocal` attribute on symbol results.
    pub file_local: bool,
    /// Log every search request before it is sent.
    pub trace_search: bool,
}

/// Read-only configuration source. Consulted on every call, never cached.
pub trait SettingsSource: Send + Sync {
    fn settings(&self) -> Settings;
}

impl SettingsSource for Settings {
    fn settings(&self) -> Settings {
        *self
    }
}

/// Reads settings from the process environment each time they are asked for.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSettings;

impl SettingsSource for EnvSettings {
    fn settings(&self) -> Settings {
        Settings {
            file_local: env_flag(FILE_LOCAL_ENV),
            trace_search: env_flag(TRACE_SEARCH_ENV),
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name).map(|v| parse_flag(&v)).unwrap_or(false)
}

pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
