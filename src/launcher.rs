use crate::command::TargetFormat;
use crate::config::{ConfigError, ConfigStore, ConverterConfig};
use crate::selection::Selection;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("converter executable not found at {0:?}")]
    ExecutableNotFound(PathBuf),

    #[error("process creation failed (0x{code:08X})")]
    SpawnFailed { code: u32 },
}

impl LaunchError {
    /// Localized text for the error dialog.
    pub fn user_message(&self) -> String {
        match self {
            LaunchError::Config(ConfigError::KeyUnavailable { .. }) => {
                t!("error.key_unavailable").to_string()
            }
            LaunchError::Config(_) => t!("error.value_invalid").to_string(),
            LaunchError::ExecutableNotFound(_) => t!("error.executable_not_found").to_string(),
            LaunchError::SpawnFailed { code } => {
                t!("error.launch_failed", code = format!("0x{:08X}", code)).to_string()
            }
        }
    }
}

/// Channel for failures the user has to see.
pub trait Notifier {
    fn error(&self, message: &str);
}

/// Starts a process without waiting for it. Returns the platform error code on
/// failure.
pub trait ProcessSpawner: Send + Sync {
    fn spawn_detached(&self, command_line: &CommandLine) -> Result<(), u32>;
}

/// `"<exe>" <FORMAT> "<file1>" "<file2>" ...`, kept as program plus the literal
/// argument tail so the tail reaches the converter byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: PathBuf,
    arguments: OsString,
}

impl CommandLine {
    /// Every file is wrapped in double quotes; nothing else is escaped.
    pub fn build(program: &Path, format: TargetFormat, files: &[PathBuf]) -> Self {
        let mut arguments = OsString::from(format.token());
        for file in files {
            arguments.push(" \"");
            arguments.push(file.as_os_str());
            arguments.push("\"");
        }

        Self {
            program: program.to_path_buf(),
            arguments,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Everything after the quoted program.
    pub fn arguments(&self) -> &OsStr {
        &self.arguments
    }

    pub fn to_string_lossy(&self) -> String {
        format!(
            "\"{}\" {}",
            self.program.to_string_lossy(),
            self.arguments.to_string_lossy()
        )
    }
}

pub struct ConverterLauncher {
    store: Box<dyn ConfigStore>,
    spawner: Box<dyn ProcessSpawner>,
}

impl ConverterLauncher {
    pub fn new(store: Box<dyn ConfigStore>, spawner: Box<dyn ProcessSpawner>) -> Self {
        Self { store, spawner }
    }

    /// Resolve the converter and start it on `selection`.
    pub fn launch(&self, format: TargetFormat, selection: &Selection) -> Result<(), LaunchError> {
        let config = ConverterConfig::load(self.store.as_ref())?;

        if !config.executable_path.is_file() {
            return Err(LaunchError::ExecutableNotFound(config.executable_path));
        }

        let command_line = CommandLine::build(&config.executable_path, format, selection.paths());
        tracing::info!(
            target: "launcher",
            command_line = %command_line.to_string_lossy(),
            files = selection.len(),
            "Starting converter"
        );

        self.spawner
            .spawn_detached(&command_line)
            .map_err(|code| LaunchError::SpawnFailed { code })
    }

    /// [`launch`](Self::launch), reporting any failure through `notifier`.
    pub fn run(&self, format: TargetFormat, selection: &Selection, notifier: &dyn Notifier) -> bool {
        match self.launch(format, selection) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(target: "launcher", error = %e, %format, "Conversion could not be started");
                notifier.error(&e.user_message());
                false
            }
        }
    }
}

/// Spawns through `CreateProcessW` with the tail appended verbatim.
/// Dropping the child closes both handles without waiting.
#[cfg(windows)]
pub struct DetachedSpawner;

#[cfg(windows)]
impl ProcessSpawner for DetachedSpawner {
    fn spawn_detached(&self, command_line: &CommandLine) -> Result<(), u32> {
        use std::os::windows::process::CommandExt;
        use std::process::{Command, Stdio};

        let child = Command::new(command_line.program())
            .raw_arg(command_line.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| e.raw_os_error().map(|code| code as u32).unwrap_or(u32::MAX))?;

        tracing::debug!(target: "launcher", pid = child.id(), "Converter started");
        drop(child);
        Ok(())
    }
}
