use super::GlobalConfig;
use crate::config::{allocation::AllocationLogLevel, resolution::ResolutionLogLevel};
use alloc::{sync::Arc, vec::Vec};
use core::fmt::Display;
use hashbrown::HashMap;

#[cfg(std_io)]
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::PathBuf,
};

/// Outputs of one logging channel and the verbosity it logs at.
///
/// Several outputs can be enabled at the same time.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(bound = "")]
pub struct LoggerConfig<L: LogLevel> {
    /// Log file, if file logging is enabled.
    #[serde(default)]
    #[cfg(std_io)]
    pub file: Option<PathBuf>,

    /// Append to the log file instead of truncating it. Defaults to true.
    #[serde(default = "append_default")]
    pub append: bool,

    /// Log to standard output.
    #[serde(default)]
    pub stdout: bool,

    /// Log to standard error.
    #[serde(default)]
    pub stderr: bool,

    /// Forward messages to the `log` crate at the given level.
    #[serde(default)]
    pub log: Option<LogCrateLevel>,

    /// Verbosity of the channel.
    #[serde(default)]
    pub level: L,
}

impl<L: LogLevel> Default for LoggerConfig<L> {
    fn default() -> Self {
        Self {
            #[cfg(std_io)]
            file: None,
            append: true,
            stdout: false,
            stderr: false,
            log: None,
            level: L::default(),
        }
    }
}

fn append_default() -> bool {
    true
}

/// Levels of the `log` crate messages are forwarded at.
#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, Hash, PartialEq, Eq,
)]
pub enum LogCrateLevel {
    /// `log::info!`.
    #[default]
    #[serde(rename = "info")]
    Info,

    /// `log::debug!`.
    #[serde(rename = "debug")]
    Debug,

    /// `log::trace!`.
    #[serde(rename = "trace")]
    Trace,
}

/// Verbosity of a logging channel.
pub trait LogLevel:
    serde::de::DeserializeOwned + serde::Serialize + Clone + Copy + core::fmt::Debug + Default
{
    /// Whether the channel logs anything at this level. Disabled channels open no output.
    fn is_enabled(&self) -> bool;
}

/// Logging channels of the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogChannel {
    /// Storage view resolution.
    Resolution,
    /// Storage metadata construction and allocation.
    Allocation,
}

impl LogChannel {
    const COUNT: usize = 2;

    fn index(self) -> usize {
        match self {
            LogChannel::Resolution => 0,
            LogChannel::Allocation => 1,
        }
    }
}

/// Key an output is shared under when several channels enable it.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
enum OutputId {
    #[cfg(std_io)]
    File(PathBuf),
    #[cfg(feature = "std")]
    Stdout,
    #[cfg(feature = "std")]
    Stderr,
    LogCrate(LogCrateLevel),
}

/// Writes channel messages to the outputs enabled in a [`GlobalConfig`].
#[derive(Debug)]
pub struct Logger {
    outputs: Vec<Output>,
    /// Output indices of each channel.
    routes: [Vec<usize>; LogChannel::COUNT],

    /// Configuration the outputs were opened from.
    pub config: Arc<GlobalConfig>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Logger for the global configuration.
    pub fn new() -> Self {
        Self::from_config(GlobalConfig::get())
    }

    /// Logger for an explicit configuration.
    ///
    /// Channels enabling the same output (one file for both, for instance) write through a single
    /// handle.
    pub fn from_config(config: Arc<GlobalConfig>) -> Self {
        let mut logger = Self {
            outputs: Vec::new(),
            routes: Default::default(),
            config: config.clone(),
        };
        let mut opened = HashMap::<OutputId, usize>::new();

        logger.route(LogChannel::Resolution, &config.resolution.logger, &mut opened);
        logger.route(LogChannel::Allocation, &config.allocation.logger, &mut opened);

        logger
    }

    fn route<L: LogLevel>(
        &mut self,
        channel: LogChannel,
        settings: &LoggerConfig<L>,
        opened: &mut HashMap<OutputId, usize>,
    ) {
        if !settings.level.is_enabled() {
            return;
        }

        for id in Self::requested_outputs(settings) {
            let index = match opened.get(&id).copied() {
                Some(index) => index,
                None => {
                    let Some(output) = Output::open(&id, settings.append) else {
                        continue;
                    };
                    self.outputs.push(output);
                    opened.insert(id, self.outputs.len() - 1);
                    self.outputs.len() - 1
                }
            };
            self.routes[channel.index()].push(index);
        }
    }

    fn requested_outputs<L: LogLevel>(settings: &LoggerConfig<L>) -> Vec<OutputId> {
        let mut ids = Vec::new();

        #[cfg(std_io)]
        if let Some(file) = &settings.file {
            ids.push(OutputId::File(file.clone()));
        }
        #[cfg(feature = "std")]
        if settings.stdout {
            ids.push(OutputId::Stdout);
        }
        #[cfg(feature = "std")]
        if settings.stderr {
            ids.push(OutputId::Stderr);
        }
        if let Some(level) = settings.log {
            ids.push(OutputId::LogCrate(level));
        }

        ids
    }

    /// Write `msg` to every output of `channel`.
    pub fn log<S: Display>(&mut self, channel: LogChannel, msg: &S) {
        for &index in &self.routes[channel.index()] {
            self.outputs[index].write(msg);
        }
    }

    /// Write `msg` to the resolution outputs.
    pub fn log_resolution<S: Display>(&mut self, msg: &S) {
        self.log(LogChannel::Resolution, msg)
    }

    /// Write `msg` to the allocation outputs.
    pub fn log_allocation<S: Display>(&mut self, msg: &S) {
        self.log(LogChannel::Allocation, msg)
    }

    /// Current resolution log level.
    pub fn log_level_resolution(&self) -> ResolutionLogLevel {
        self.config.resolution.logger.level
    }

    /// Current allocation log level.
    pub fn log_level_allocation(&self) -> AllocationLogLevel {
        self.config.allocation.logger.level
    }

    /// Number of distinct outputs opened.
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }
}

#[derive(Debug)]
enum Output {
    #[cfg(std_io)]
    File(FileOutput),
    #[cfg(feature = "std")]
    Stdout,
    #[cfg(feature = "std")]
    Stderr,
    Log(LogCrateLevel),
}

impl Output {
    #[cfg_attr(not(std_io), allow(unused_variables))]
    fn open(id: &OutputId, append: bool) -> Option<Self> {
        match id {
            #[cfg(std_io)]
            OutputId::File(path) => FileOutput::open(path, append).map(Output::File),
            #[cfg(feature = "std")]
            OutputId::Stdout => Some(Output::Stdout),
            #[cfg(feature = "std")]
            OutputId::Stderr => Some(Output::Stderr),
            OutputId::LogCrate(level) => Some(Output::Log(*level)),
        }
    }

    fn write<S: Display>(&mut self, msg: &S) {
        match self {
            #[cfg(std_io)]
            Output::File(file) => file.write(msg),
            #[cfg(feature = "std")]
            Output::Stdout => println!("{msg}"),
            #[cfg(feature = "std")]
            Output::Stderr => eprintln!("{msg}"),
            Output::Log(LogCrateLevel::Info) => log::info!("{msg}"),
            Output::Log(LogCrateLevel::Debug) => log::debug!("{msg}"),
            Output::Log(LogCrateLevel::Trace) => log::trace!("{msg}"),
        }
    }
}

#[cfg(std_io)]
#[derive(Debug)]
struct FileOutput {
    writer: BufWriter<File>,
}

#[cfg(std_io)]
impl FileOutput {
    // A file that can't be opened disables the output with a warning.
    fn open(path: &PathBuf, append: bool) -> Option<Self> {
        let file = OpenOptions::new()
            .write(true)
            .append(append)
            .truncate(!append)
            .create(true)
            .open(path);

        match file {
            Ok(file) => Some(Self {
                writer: BufWriter::new(file),
            }),
            Err(err) => {
                log::warn!("Can't open layout log file {}: {err}", path.display());
                None
            }
        }
    }

    fn write<S: Display>(&mut self, msg: &S) {
        let result = writeln!(self.writer, "{msg}").and_then(|_| self.writer.flush());
        if let Err(err) = result {
            log::warn!("Can't write to layout log file: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolution::ResolutionConfig;

    #[test]
    fn disabled_channels_open_no_output() {
        let mut config = GlobalConfig::default();
        config.resolution.logger.log = Some(LogCrateLevel::Info);

        let logger = Logger::from_config(Arc::new(config));

        assert_eq!(logger.output_count(), 0);
        assert_eq!(logger.log_level_resolution(), ResolutionLogLevel::Disabled);
    }

    #[test]
    fn shared_outputs_are_opened_once() {
        let mut config = GlobalConfig::default();
        config.resolution = ResolutionConfig {
            logger: LoggerConfig {
                log: Some(LogCrateLevel::Debug),
                level: ResolutionLogLevel::Full,
                ..Default::default()
            },
        };
        config.allocation.logger.log = Some(LogCrateLevel::Debug);
        config.allocation.logger.level = AllocationLogLevel::Full;

        let mut logger = Logger::from_config(Arc::new(config));
        assert_eq!(logger.output_count(), 1);
        assert_eq!(logger.routes, [alloc::vec![0], alloc::vec![0]]);

        logger.log(LogChannel::Resolution, &"resolution");
        logger.log_allocation(&"allocation");
    }

    #[test]
    fn channels_only_route_to_their_own_outputs() {
        let mut config = GlobalConfig::default();
        config.resolution.logger.level = ResolutionLogLevel::Basic;
        config.resolution.logger.log = Some(LogCrateLevel::Info);
        config.allocation.logger.level = AllocationLogLevel::Full;
        config.allocation.logger.log = Some(LogCrateLevel::Trace);

        let logger = Logger::from_config(Arc::new(config));
        assert_eq!(logger.output_count(), 2);
        assert_eq!(logger.routes, [alloc::vec![0], alloc::vec![1]]);
    }
}
