use super::logger::{LogLevel, LoggerConfig};

/// Logging of storage view resolution.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ResolutionConfig {
    /// Logger settings.
    #[serde(default)]
    pub logger: LoggerConfig<ResolutionLogLevel>,
}

/// Verbosity of the resolution logger.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ResolutionLogLevel {
    /// Nothing is logged.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,
    /// One line per resolved view.
    #[serde(rename = "basic")]
    Basic,
    /// Adds the padding, halo and stride of every dimension.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for ResolutionLogLevel {
    fn is_enabled(&self) -> bool {
        *self != ResolutionLogLevel::Disabled
    }
}
