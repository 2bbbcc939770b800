use super::logger::{LogLevel, LoggerConfig};

/// Logging of storage metadata construction.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AllocationConfig {
    /// Logger settings.
    #[serde(default)]
    pub logger: LoggerConfig<AllocationLogLevel>,
}

/// Verbosity of the allocation logger.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AllocationLogLevel {
    /// Nothing is logged.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,
    /// Every storage built or allocated through a resolver.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for AllocationLogLevel {
    fn is_enabled(&self) -> bool {
        *self != AllocationLogLevel::Disabled
    }
}
