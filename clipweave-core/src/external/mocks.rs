// clipweave-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests and when the "test-mocks" feature is enabled.

use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner};
use super::ffprobe_executor::{AudioReport, Clip, MediaProber};
use crate::error::{CoreError, CoreResult};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::cell::RefCell;
use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt; // For ExitStatus::from_raw
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

/// Mock implementation of FfmpegProcess.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Rc<RefCell<Vec<FfmpegEvent>>>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let events = self.events_to_emit.borrow().clone();
        for event in events {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// Represents an expected ffmpeg command call and its mock result.
pub struct MockFfmpegExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockFfmpegProcess>,
    pub create_dummy_output: bool,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
///
/// Every spawned command's arguments are recorded. An expectation matches
/// when any argument contains its pattern; the last argument is treated as
/// the output path when a dummy output file is requested.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Rc<RefCell<Vec<MockFfmpegExpectation>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_expectation(
        &self,
        arg_pattern: &str,
        result: CoreResult<MockFfmpegProcess>,
        create_dummy_output: bool,
    ) {
        self.expectations.borrow_mut().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
            create_dummy_output,
        });
    }

    pub fn add_success_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        create_dummy_output: bool,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: Rc::new(RefCell::new(events)),
            exit_status: ExitStatus::from_raw(0),
        };
        self.add_expectation(arg_pattern, Ok(process), create_dummy_output);
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error), false);
    }

    /// `raw_status` is a wait status as returned by `waitpid` (exit code 1 is `1 << 8`).
    pub fn add_exit_error_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        raw_status: i32,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: Rc::new(RefCell::new(events)),
            exit_status: ExitStatus::from_raw(raw_status),
        };
        self.add_expectation(arg_pattern, Ok(process), false);
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        self.received_calls.borrow_mut().push(args.clone());

        let mut expectations = self.expectations.borrow_mut();
        let found_index = expectations
            .iter()
            .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));

        let Some(index) = found_index else {
            log::error!("MockFfmpegSpawner: No expectation found for command args: {args:?}");
            panic!("MockFfmpegSpawner: No expectation found for command args: {args:?}");
        };

        let expectation = expectations.remove(index);
        log::info!(
            "MockFfmpegSpawner: Matched expectation with pattern '{}'",
            expectation.arg_pattern
        );

        let process = expectation.result?;
        if expectation.create_dummy_output {
            match args.last() {
                Some(output) => create_dummy_file(Path::new(output)),
                None => log::warn!("MockFfmpegSpawner couldn't find output path in args"),
            }
        }
        Ok(process)
    }
}

fn create_dummy_file(output_path: &Path) {
    if let Some(parent) = output_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            log::error!("MockFfmpegSpawner failed to create parent dir {parent:?}: {e}");
        }
    }
    match std::fs::File::create(output_path) {
        Ok(_) => log::info!("MockFfmpegSpawner created dummy output file: {output_path:?}"),
        Err(e) => {
            log::error!("MockFfmpegSpawner failed to create dummy output file {output_path:?}: {e}")
        }
    }
}

/// Mock implementation of MediaProber keyed by path.
///
/// Paths without an expectation fail with `ProbeFailure`. Shared state sits
/// behind mutexes so the prober can be used from rayon workers.
#[derive(Clone, Default)]
pub struct MockMediaProber {
    clip_results: Arc<Mutex<HashMap<PathBuf, Result<(f64, bool), String>>>>,
    report_results: Arc<Mutex<HashMap<PathBuf, AudioReport>>>,
    probed: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockMediaProber {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add an expected duration/audio result for `probe_clip` on `path`.
    pub fn expect_clip(&self, path: &Path, duration: f64, has_audio: bool) {
        self.clip_results
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), Ok((duration, has_audio)));
    }

    /// Make `probe_clip` on `path` fail with the given reason.
    pub fn expect_clip_failure(&self, path: &Path, reason: &str) {
        self.clip_results
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), Err(reason.to_string()));
    }

    /// Add an expected result for `probe_audio_tracks` on `path`.
    pub fn expect_audio_report(&self, path: &Path, report: AudioReport) {
        self.report_results
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), report);
    }

    /// Paths passed to `probe_clip`, in call order.
    pub fn probed_paths(&self) -> Vec<PathBuf> {
        self.probed.lock().unwrap().clone()
    }
}

impl MediaProber for MockMediaProber {
    fn probe_clip(&self, path: &Path) -> CoreResult<Clip> {
        log::info!("MockMediaProber::probe_clip called for: {}", path.display());
        self.probed.lock().unwrap().push(path.to_path_buf());
        match self.clip_results.lock().unwrap().get(path) {
            Some(Ok((duration, has_audio))) => Ok(Clip {
                path: path.to_path_buf(),
                duration: *duration,
                has_audio: *has_audio,
            }),
            Some(Err(reason)) => Err(CoreError::ProbeFailure {
                path: path.to_path_buf(),
                reason: reason.clone(),
            }),
            None => Err(CoreError::ProbeFailure {
                path: path.to_path_buf(),
                reason: "MockMediaProber: no expectation set".to_string(),
            }),
        }
    }

    fn probe_audio_tracks(&self, path: &Path) -> CoreResult<AudioReport> {
        log::info!(
            "MockMediaProber::probe_audio_tracks called for: {}",
            path.display()
        );
        self.report_results
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| CoreError::ProbeFailure {
                path: path.to_path_buf(),
                reason: "MockMediaProber: no expectation set".to_string(),
            })
    }
}
