//! Batch runner: one external `realesrgan-ncnn-vulkan` call per selected file,
//! strictly sequential, never aborting on a per-file failure.
//!
//! The subprocess boundary is the [`CommandRunner`] trait so the loop can be
//! exercised without the real binary.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::core::params::UpscaleParams;
use crate::core::progress::{BatchEvent, DEFAULT_TICK, ProgressReporter, ProgressSink, percent};
use crate::core::selection::{Selection, display_name};
use crate::error::{Error, FailureKind, Result};

/// Base name of the upscaler shipped next to the application.
pub const EXECUTABLE_NAME: &str = "realesrgan-ncnn-vulkan";

pub fn executable_file_name() -> String {
    format!("{}{}", EXECUTABLE_NAME, std::env::consts::EXE_SUFFIX)
}

/// Directory holding the running binary.
pub fn app_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| Error::InvalidArgument {
        arg: "current_exe",
        value: exe.display().to_string(),
    })
}

/// Fixed location of the upscaler relative to `app_dir`.
pub fn locate_executable(app_dir: &Path) -> PathBuf {
    app_dir.join(executable_file_name())
}

/// Captured result of one external invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a program to completion and captures its output.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<CommandOutput>;
}

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<CommandOutput> {
        let mut cmd = std::process::Command::new(program);
        cmd.args(args);
        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        let output = cmd.output()?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// One file's worth of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpscaleJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub params: UpscaleParams,
}

impl UpscaleJob {
    pub fn new(input: &Path, output: &Path, params: UpscaleParams) -> Self {
        Self {
            input: absolutize(input),
            output: absolutize(output),
            params,
        }
    }

    /// `-i <in> -o <out> -s <scale> -n <model> -f <format>`
    pub fn args(&self) -> Vec<OsString> {
        vec![
            "-i".into(),
            self.input.clone().into_os_string(),
            "-o".into(),
            self.output.clone().into_os_string(),
            "-s".into(),
            self.params.scale().to_string().into(),
            "-n".into(),
            self.params.model().as_str().into(),
            "-f".into(),
            self.params.format().extension().into(),
        ]
    }
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Succeeded,
    Failed { kind: FailureKind, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

impl FileOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == FileStatus::Succeeded
    }
}

/// Aggregate result of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub total: usize,
    pub files: Vec<FileOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchOutcome {
    pub fn empty() -> Self {
        let now = Utc::now();
        Self {
            total: 0,
            files: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn successes(&self) -> usize {
        self.files.iter().filter(|file| file.succeeded()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|file| !file.succeeded())
    }

    /// Text of the completion dialog.
    pub fn summary(&self) -> String {
        format!(
            "Successfully upscaled {}/{} image(s)!",
            self.successes(),
            self.total
        )
    }

    pub fn status_line(&self) -> String {
        format!(
            "Complete! {}/{} images upscaled",
            self.successes(),
            self.total
        )
    }
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub executable: PathBuf,
    /// Delay between progress animation steps; zero disables the animation.
    pub progress_tick: Duration,
}

impl RunnerConfig {
    pub fn new(executable: PathBuf) -> Self {
        Self {
            executable,
            progress_tick: DEFAULT_TICK,
        }
    }

    /// Upscaler expected next to the running binary.
    pub fn installed() -> Result<Self> {
        Ok(Self::new(locate_executable(&app_dir()?)))
    }

    pub fn with_progress_tick(mut self, tick: Duration) -> Self {
        self.progress_tick = tick;
        self
    }
}

/// Proof that the holder owns the runner's single batch slot. Releases the
/// slot on drop.
#[derive(Debug)]
pub struct FlightGuard {
    active: Arc<AtomicBool>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

pub struct BatchRunner {
    config: RunnerConfig,
    commands: Arc<dyn CommandRunner>,
    active: Arc<AtomicBool>,
}

impl BatchRunner {
    pub fn new(config: RunnerConfig, commands: Arc<dyn CommandRunner>) -> Self {
        Self {
            config,
            commands,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_process_runner(config: RunnerConfig) -> Self {
        Self::new(config, Arc::new(ProcessRunner))
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Claim the batch slot, or fail with `AlreadyRunning`.
    pub fn acquire(&self) -> Result<FlightGuard> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::AlreadyRunning)?;
        Ok(FlightGuard {
            active: Arc::clone(&self.active),
        })
    }

    /// Run the whole selection. Per-file errors end up in the outcome; only the
    /// preconditions are returned as errors.
    pub fn run(&self, selection: &Selection, sink: &dyn ProgressSink) -> Result<BatchOutcome> {
        let guard = self.acquire()?;
        if selection.is_empty() {
            return Err(Error::NoFilesSelected);
        }
        Ok(self.run_guarded(&guard, selection, sink))
    }

    /// Loop body for callers that already hold the slot.
    pub fn run_guarded(
        &self,
        guard: &FlightGuard,
        selection: &Selection,
        sink: &dyn ProgressSink,
    ) -> BatchOutcome {
        debug_assert!(Arc::ptr_eq(&guard.active, &self.active));

        let started_at = Utc::now();
        let total = selection.files().len();
        let params = selection.params;

        info!("Starting batch of {} image(s)", total);
        debug!("  Model: {}", params.model());
        debug!("  Scale: {}x", params.scale());
        debug!("  Format: {}", params.format());
        debug!("  Output directory: {:?}", selection.output_dir());
        debug!("  Upscaler: {:?}", self.config.executable);

        sink.on_event(BatchEvent::Started { total });
        let mut reporter = ProgressReporter::new(sink, self.config.progress_tick);
        reporter.reset();

        let mut files = Vec::with_capacity(total);
        for (idx, input) in selection.files().iter().enumerate() {
            let index = idx + 1;
            sink.on_event(BatchEvent::FileStarted {
                index,
                total,
                input: input.clone(),
            });

            let job = UpscaleJob::new(input, &selection.target_path(input), params);
            info!("Processing {}/{}: {:?} -> {:?}", index, total, job.input, job.output);

            let status = match self.upscale_one(&job) {
                Ok(()) => {
                    info!("Successfully upscaled: {:?}", job.input);
                    FileStatus::Succeeded
                }
                Err(e) => {
                    warn!("Error processing {}: {}", display_name(input), e);
                    FileStatus::Failed {
                        kind: e.failure_kind(),
                        reason: e.to_string(),
                    }
                }
            };

            let outcome = FileOutcome {
                input: job.input,
                output: job.output,
                status,
            };
            sink.on_event(BatchEvent::FileFinished(outcome.clone()));
            files.push(outcome);

            reporter.advance_to(percent(index, total));
        }
        reporter.advance_to(100);

        let outcome = BatchOutcome {
            total,
            files,
            started_at,
            finished_at: Utc::now(),
        };
        info!("Batch complete: {}/{} succeeded", outcome.successes(), total);
        outcome
    }

    fn upscale_one(&self, job: &UpscaleJob) -> Result<()> {
        let executable = &self.config.executable;
        if !executable.exists() {
            return Err(Error::MissingExecutable {
                path: executable.clone(),
            });
        }

        let args = job.args();
        trace!("Invoking {:?} {:?}", executable, args);
        let output = self
            .commands
            .run(executable, &args)
            .map_err(Error::Launch)?;

        if !output.stdout.is_empty() {
            trace!("Upscaler stdout: {}", output.stdout.trim());
        }
        if output.success() {
            Ok(())
        } else {
            Err(Error::ExternalProcessFailure {
                code: output.code,
                stderr: output.stderr,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::progress::CollectingSink;
    use crate::types::{ModelId, OutputFormat, ScaleFactor};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records every call and answers with a scripted exit code per call.
    struct ScriptedRunner {
        codes: Mutex<Vec<i32>>,
        calls: Mutex<Vec<Vec<OsString>>>,
    }

    impl ScriptedRunner {
        fn new(codes: &[i32]) -> Self {
            Self {
                codes: Mutex::new(codes.iter().rev().copied().collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Vec<OsString>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, _program: &Path, args: &[OsString]) -> std::io::Result<CommandOutput> {
            self.calls.lock().unwrap().push(args.to_vec());
            let code = self.codes.lock().unwrap().pop().unwrap_or(0);
            Ok(CommandOutput {
                code: Some(code),
                stdout: String::new(),
                stderr: if code == 0 {
                    String::new()
                } else {
                    "vkCreateInstance failed".to_string()
                },
            })
        }
    }

    fn fake_install() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let exe = locate_executable(dir.path());
        std::fs::write(&exe, b"").unwrap();
        (dir, exe)
    }

    fn runner(exe: PathBuf, commands: Arc<ScriptedRunner>) -> BatchRunner {
        BatchRunner::new(
            RunnerConfig::new(exe).with_progress_tick(Duration::ZERO),
            commands,
        )
    }

    fn selection_in(dir: &Path, names: &[&str]) -> Selection {
        Selection::new(
            names.iter().map(|name| dir.join(name)).collect(),
            None,
            UpscaleParams::default(),
        )
    }

    #[test]
    fn job_args_follow_upscaler_cli() {
        let params =
            UpscaleParams::new(ModelId::RealesrganX4plusAnime, ScaleFactor::X2, OutputFormat::Jpg)
                .unwrap();
        let job = UpscaleJob::new(Path::new("/in/a.png"), Path::new("/out/a_upscaled.jpg"), params);
        let args: Vec<String> = job
            .args()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "-i",
                "/in/a.png",
                "-o",
                "/out/a_upscaled.jpg",
                "-s",
                "2",
                "-n",
                "realesrgan-x4plus-anime",
                "-f",
                "jpg"
            ]
        );
    }

    #[test]
    fn relative_inputs_become_absolute() {
        let job = UpscaleJob::new(
            Path::new("photos/a.png"),
            Path::new("photos/a_upscaled.png"),
            UpscaleParams::default(),
        );
        assert!(job.input.is_absolute());
        assert!(job.output.is_absolute());
    }

    #[test]
    fn all_files_succeed() {
        let (dir, exe) = fake_install();
        let commands = Arc::new(ScriptedRunner::new(&[0, 0, 0]));
        let runner = runner(exe, commands.clone());
        let sink = CollectingSink::new();

        let selection = selection_in(dir.path(), &["a.png", "b.jpg", "c.webp"]);
        let outcome = runner.run(&selection, &sink).unwrap();

        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.successes(), 3);
        assert_eq!(commands.calls().len(), 3);
        assert_eq!(*sink.progress_values().last().unwrap(), 100);
        assert!(!runner.is_running());
    }

    #[test]
    fn failures_do_not_abort_the_batch() {
        let (dir, exe) = fake_install();
        let commands = Arc::new(ScriptedRunner::new(&[0, 1, 0]));
        let runner = runner(exe, commands.clone());
        let sink = CollectingSink::new();

        let selection = selection_in(dir.path(), &["a.png", "b.png", "c.png"]);
        let outcome = runner.run(&selection, &sink).unwrap();

        assert_eq!(commands.calls().len(), 3);
        assert_eq!(outcome.successes(), 2);
        let failed: Vec<_> = outcome.failures().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].input, dir.path().join("b.png"));
        match &failed[0].status {
            FileStatus::Failed { kind, reason } => {
                assert_eq!(*kind, FailureKind::ExternalProcessFailure);
                assert!(reason.contains("exit code 1"));
                assert!(reason.contains("vkCreateInstance failed"));
            }
            other => panic!("unexpected status {other:?}"),
        }
        assert_eq!(*sink.progress_values().last().unwrap(), 100);
    }

    #[test]
    fn progress_is_monotonic_and_hits_each_milestone() {
        let (dir, exe) = fake_install();
        let runner = runner(exe, Arc::new(ScriptedRunner::new(&[0, 2, 0])));
        let sink = CollectingSink::new();

        let selection = selection_in(dir.path(), &["a.png", "b.png", "c.png"]);
        runner.run(&selection, &sink).unwrap();

        let values = sink.progress_values();
        assert_eq!(values[0], 0);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert!(values.contains(&33));
        assert!(values.contains(&67));
        assert_eq!(*values.last().unwrap(), 100);
    }

    #[test]
    fn missing_executable_fails_each_file_without_invoking() {
        let dir = TempDir::new().unwrap();
        let commands = Arc::new(ScriptedRunner::new(&[]));
        let runner = runner(locate_executable(&dir.path().join("nowhere")), commands.clone());
        let sink = CollectingSink::new();

        let selection = selection_in(dir.path(), &["catA.jpg", "catB.jpg"]);
        let outcome = runner.run(&selection, &sink).unwrap();

        assert_eq!(outcome.successes(), 0);
        assert_eq!(outcome.total, 2);
        assert!(commands.calls().is_empty());
        assert!(outcome.failures().all(|f| matches!(
            f.status,
            FileStatus::Failed {
                kind: FailureKind::MissingExecutable,
                ..
            }
        )));
        assert_eq!(outcome.summary(), "Successfully upscaled 0/2 image(s)!");
        assert_eq!(*sink.progress_values().last().unwrap(), 100);
    }

    #[test]
    fn empty_selection_is_rejected_without_invocations() {
        let (_dir, exe) = fake_install();
        let commands = Arc::new(ScriptedRunner::new(&[]));
        let runner = runner(exe, commands.clone());
        let sink = CollectingSink::new();

        let err = runner.run(&Selection::default(), &sink).unwrap_err();
        assert!(matches!(err, Error::NoFilesSelected));
        assert!(commands.calls().is_empty());
        assert!(sink.events().is_empty());
        assert!(!runner.is_running());
    }

    #[test]
    fn second_acquire_is_rejected_until_release() {
        let (_dir, exe) = fake_install();
        let runner = runner(exe, Arc::new(ScriptedRunner::new(&[])));

        let guard = runner.acquire().unwrap();
        assert!(runner.is_running());
        assert!(matches!(runner.acquire(), Err(Error::AlreadyRunning)));
        drop(guard);
        assert!(!runner.is_running());
        assert!(runner.acquire().is_ok());
    }

    #[test]
    fn events_arrive_in_order() {
        let (dir, exe) = fake_install();
        let runner = runner(exe, Arc::new(ScriptedRunner::new(&[0])));
        let sink = CollectingSink::new();

        let selection = selection_in(dir.path(), &["only.png"]);
        runner.run(&selection, &sink).unwrap();

        let events = sink.events();
        assert!(matches!(events[0], BatchEvent::Started { total: 1 }));
        assert!(matches!(events[1], BatchEvent::Progress(0)));
        assert!(matches!(events[2], BatchEvent::FileStarted { index: 1, total: 1, .. }));
        assert!(matches!(events[3], BatchEvent::FileFinished(ref f) if f.succeeded()));
        assert!(matches!(events.last(), Some(BatchEvent::Progress(100))));
    }

    #[test]
    fn outcome_serializes_per_file_status() {
        let (dir, exe) = fake_install();
        let runner = runner(exe, Arc::new(ScriptedRunner::new(&[0, 3])));
        let selection = selection_in(dir.path(), &["a.png", "b.png"]);
        let outcome = runner.run(&selection, &CollectingSink::new()).unwrap();

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["files"][0]["status"], "succeeded");
        assert_eq!(json["files"][1]["status"], "failed");
        assert_eq!(json["files"][1]["kind"], "external_process_failure");
    }

    #[cfg(unix)]
    #[test]
    fn process_runner_captures_exit_code_and_stderr() {
        let args: Vec<OsString> = vec!["-c".into(), "echo tile failed >&2; exit 3".into()];
        let output = ProcessRunner.run(Path::new("/bin/sh"), &args).unwrap();
        assert_eq!(output.code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stderr, "tile failed");

        let args: Vec<OsString> = vec!["-c".into(), "exit 0".into()];
        let ok = ProcessRunner.run(Path::new("/bin/sh"), &args).unwrap();
        assert!(ok.success());
    }

    #[test]
    fn duplicate_inputs_run_in_order_with_shared_target() {
        let (dir, exe) = fake_install();
        let commands = Arc::new(ScriptedRunner::new(&[]));
        let runner = runner(exe, commands.clone());
        let selection = selection_in(dir.path(), &["a.png", "b.png", "a.png"]);

        let outcome = runner.run(&selection, &CollectingSink::new()).unwrap();
        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.successes(), 3);

        let calls = commands.calls();
        assert_eq!(calls.len(), 3);
        let inputs: Vec<PathBuf> = calls.iter().map(|args| PathBuf::from(&args[1])).collect();
        assert_eq!(
            inputs,
            vec![dir.path().join("a.png"), dir.path().join("b.png"), dir.path().join("a.png")]
        );
        assert_eq!(calls[0][3], calls[2][3]);
        assert_ne!(calls[0][3], calls[1][3]);
        assert_eq!(PathBuf::from(&calls[0][3]), dir.path().join("a_upscaled.png"));
    }

    #[cfg(unix)]
    #[test]
    fn unlaunchable_upscaler_is_reported_as_launch_failure() {
        let dir = TempDir::new().unwrap();
        let exe = locate_executable(dir.path());
        // Present but without the execute bit.
        std::fs::write(&exe, b"").unwrap();
        let runner = BatchRunner::with_process_runner(
            RunnerConfig::new(exe).with_progress_tick(Duration::ZERO),
        );
        let selection = selection_in(dir.path(), &["a.png"]);

        let outcome = runner.run(&selection, &CollectingSink::new()).unwrap();
        assert_eq!(outcome.successes(), 0);
        match &outcome.files[0].status {
            FileStatus::Failed { kind, reason } => {
                assert_eq!(*kind, FailureKind::ExternalProcessFailure);
                assert!(reason.starts_with("Failed to launch upscaler:"), "{reason}");
                assert!(!reason.contains("signal"), "{reason}");
            }
            other => panic!("expected a failure, got {other:?}"),
        }
    }
}
