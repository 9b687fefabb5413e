// ============================================================================
// clipweave-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module provides abstractions for spawning and interacting with FFmpeg
// processes, and the synchronous `run_engine` entry point used by every job.
// The engine is treated as an opaque process: its stdout is never inspected,
// error lines from stderr are collected for the failure report, and success
// additionally requires the declared output file to exist.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner: Concrete implementation using ffmpeg-sidecar
// - EngineEventHandler: stderr collection and log forwarding
// - run_engine: spawn, drain events, wait, verify output

use crate::error::{
    CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error,
};
use crate::external::ffmpeg_builder::EngineCommand;
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel as FfmpegLogLevel};
use std::process::ExitStatus;

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {}", e);
            command_failed_error("ffmpeg (event iterator)", ExitStatus::default(), e.to_string())
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0.wait().map_err(|e| command_wait_error("ffmpeg", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg", e))
    }
}

// --- Event handling ---

/// Collects engine error output and forwards log lines to the `log` facade.
#[derive(Debug, Default)]
pub struct EngineEventHandler {
    stderr_buffer: String,
}

impl EngineEventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles an `FFmpeg` event
    pub fn handle_event(&mut self, event: FfmpegEvent) -> CoreResult<()> {
        match event {
            FfmpegEvent::Log(level, message) => self.handle_log(level, &message),
            FfmpegEvent::Error(error) => self.push_stderr(&error),
            _ => {}
        }
        Ok(())
    }

    /// Gets the accumulated stderr buffer
    pub fn stderr_buffer(&self) -> &str {
        &self.stderr_buffer
    }

    fn handle_log(&mut self, level: FfmpegLogLevel, message: &str) {
        match level {
            FfmpegLogLevel::Error | FfmpegLogLevel::Fatal => self.push_stderr(message),
            FfmpegLogLevel::Warning => log::warn!(target: "ffmpeg_log", "{message}"),
            _ => log::trace!(target: "ffmpeg_log", "{message}"),
        }
    }

    fn push_stderr(&mut self, line: &str) {
        log::debug!(target: "ffmpeg_log", "{line}");
        self.stderr_buffer.push_str(line);
        self.stderr_buffer.push('\n');
    }
}

/// Runs a synthesized engine command to completion.
///
/// Blocks until the process exits. A non-zero exit becomes
/// `EngineExecutionFailed` carrying the collected stderr; a zero exit without
/// the declared output file becomes `OutputMissing`.
pub fn run_engine<S: FfmpegSpawner>(spawner: &S, command: &EngineCommand) -> CoreResult<()> {
    log::debug!("Running engine command: {command}");

    let mut handler = EngineEventHandler::new();
    let mut process = spawner.spawn(command.to_ffmpeg_command())?;
    process.handle_events(|event| handler.handle_event(event))?;
    let status = process.wait()?;

    if !status.success() {
        log::error!("ffmpeg failed ({status}) for command: {command}");
        return Err(command_failed_error(
            "ffmpeg",
            status,
            handler.stderr_buffer().trim_end(),
        ));
    }

    let output_path = command.output_path();
    if !output_path.exists() {
        log::error!(
            "ffmpeg reported success but {} is missing",
            output_path.display()
        );
        return Err(CoreError::OutputMissing(output_path.to_path_buf()));
    }

    log::debug!("Engine finished: {}", output_path.display());
    Ok(())
}
