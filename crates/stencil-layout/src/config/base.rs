use super::{allocation::AllocationConfig, resolution::ResolutionConfig};
use alloc::sync::Arc;

/// Static mutex holding the global configuration, initialized as `None`.
static LAYOUT_GLOBAL_CONFIG: spin::Mutex<Option<Arc<GlobalConfig>>> = spin::Mutex::new(None);

/// File names searched for, in order, when loading the configuration.
#[cfg(std_io)]
const CONFIG_FILE_NAMES: [&str; 2] = ["stencil-layout.toml", "StencilLayout.toml"];

/// Global configuration, combining the resolution and allocation logging settings.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GlobalConfig {
    /// Logging of storage view resolution.
    #[serde(default)]
    pub resolution: ResolutionConfig,

    /// Logging of storage metadata construction.
    #[serde(default)]
    pub allocation: AllocationConfig,
}

impl GlobalConfig {
    /// Retrieves the current global configuration, loading it from the current directory if not
    /// set.
    ///
    /// If no configuration is set, it attempts to load one from `stencil-layout.toml` or
    /// `StencilLayout.toml` in the current directory or its parents, then applies the environment
    /// overrides. If no file is found, a default configuration is used.
    ///
    /// # Notes
    ///
    /// This takes a global lock; read it once and keep the returned value around.
    pub fn get() -> Arc<Self> {
        let mut state = LAYOUT_GLOBAL_CONFIG.lock();
        if state.as_ref().is_none() {
            cfg_if::cfg_if! {
                if #[cfg(std_io)]  {
                    let config = Self::from_current_dir();
                    let config = config.override_from_env();
                } else {
                    let config = Self::default();
                }
            }

            *state = Some(Arc::new(config));
        }

        match state.as_ref() {
            Some(config) => config.clone(),
            None => unreachable!("The global configuration was just initialized"),
        }
    }

    /// Sets the global configuration to the provided value.
    ///
    /// # Panics
    /// Panics if the configuration has already been set or read, as it cannot be overridden.
    ///
    /// # Warning
    /// This method must be called at the start of the program, before any calls to `get`.
    pub fn set(config: Self) {
        let mut state = LAYOUT_GLOBAL_CONFIG.lock();
        if state.is_some() {
            panic!("Cannot set the global configuration multiple times.");
        }
        *state = Some(Arc::new(config));
    }

    #[cfg(std_io)]
    /// Save the current configuration to the provided file path.
    pub fn save_default<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<()> {
        let config = Self::get();
        let content = toml::to_string_pretty(config.as_ref()).map_err(std::io::Error::other)?;
        std::fs::write(path, content)
    }

    #[cfg(std_io)]
    /// Overrides configuration fields based on environment variables.
    ///
    /// - `STENCIL_LAYOUT_DEBUG_LOG`: `stdout`, `stderr`, `1`/`true` (log to
    ///   `/tmp/stencil-layout.log`), `0`/`false` (disable) or a file path.
    /// - `STENCIL_LAYOUT_LOG_LEVEL`: `disabled`, `basic` or `full` for the resolution logger.
    pub fn override_from_env(mut self) -> Self {
        use super::{allocation::AllocationLogLevel, resolution::ResolutionLogLevel};

        if let Ok(val) = std::env::var("STENCIL_LAYOUT_DEBUG_LOG") {
            self.resolution.logger.level = ResolutionLogLevel::Basic;
            self.allocation.logger.level = AllocationLogLevel::Full;

            match val.as_str() {
                "stdout" => {
                    self.resolution.logger.stdout = true;
                    self.allocation.logger.stdout = true;
                }
                "stderr" => {
                    self.resolution.logger.stderr = true;
                    self.allocation.logger.stderr = true;
                }
                "1" | "true" => {
                    let file_path = "/tmp/stencil-layout.log";
                    self.resolution.logger.file = Some(file_path.into());
                    self.allocation.logger.file = Some(file_path.into());
                }
                "0" | "false" => {
                    self.resolution.logger.level = ResolutionLogLevel::Disabled;
                    self.allocation.logger.level = AllocationLogLevel::Disabled;
                }
                file_path => {
                    self.resolution.logger.file = Some(file_path.into());
                    self.allocation.logger.file = Some(file_path.into());
                }
            }
        };

        if let Ok(val) = std::env::var("STENCIL_LAYOUT_LOG_LEVEL") {
            match val.as_str() {
                "disabled" | "0" => self.resolution.logger.level = ResolutionLogLevel::Disabled,
                "basic" | "1" => self.resolution.logger.level = ResolutionLogLevel::Basic,
                "full" | "2" => self.resolution.logger.level = ResolutionLogLevel::Full,
                _ => {}
            }
        }

        self
    }

    // Loads configuration from `stencil-layout.toml` or `StencilLayout.toml` in the current
    // directory or its parents.
    #[cfg(std_io)]
    fn from_current_dir() -> Self {
        let Ok(mut dir) = std::env::current_dir() else {
            return Self::default();
        };

        loop {
            for name in CONFIG_FILE_NAMES {
                if let Ok(content) = Self::from_file_path(dir.join(name)) {
                    return content;
                }
            }

            if !dir.pop() {
                break;
            }
        }

        Self::default()
    }

    /// Loads configuration from a specified file path.
    ///
    /// # Panics
    /// Panics if the file exists but isn't a valid configuration.
    #[cfg(std_io)]
    pub fn from_file_path<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = match toml::from_str(&content) {
            Ok(val) => val,
            Err(err) => panic!("The file provided doesn't have the right format => {err:?}"),
        };

        Ok(config)
    }
}
