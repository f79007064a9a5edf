//! Foreground owner of the selection and progress display.
//!
//! A batch runs on one background thread that only talks back through a
//! channel of [`BatchEvent`]s; the owning thread drains it with [`Session::poll`]
//! (once per frame in the GUI) or [`Session::wait`].
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, trace};

use crate::core::progress::{BatchEvent, DEFAULT_RESET_DELAY, ProgressDisplay, ProgressSink};
use crate::core::runner::{BatchOutcome, BatchRunner};
use crate::core::selection::Selection;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long 100% stays on screen after a batch.
    pub reset_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reset_delay: DEFAULT_RESET_DELAY,
        }
    }
}

pub struct Session {
    pub selection: Selection,
    runner: Arc<BatchRunner>,
    display: ProgressDisplay,
    events: Option<Receiver<BatchEvent>>,
    worker: Option<JoinHandle<()>>,
    last_outcome: Option<BatchOutcome>,
}

impl Session {
    pub fn new(runner: BatchRunner, config: SessionConfig) -> Self {
        Self {
            selection: Selection::default(),
            runner: Arc::new(runner),
            display: ProgressDisplay::new(config.reset_delay),
            events: None,
            worker: None,
            last_outcome: None,
        }
    }

    pub fn runner(&self) -> &BatchRunner {
        &self.runner
    }

    pub fn progress(&self) -> &ProgressDisplay {
        &self.display
    }

    pub fn last_outcome(&self) -> Option<&BatchOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.events.is_some()
    }

    /// Whether the owner should keep redrawing (batch running or reset pending).
    pub fn needs_refresh(&self) -> bool {
        self.is_processing() || self.display.reset_pending().is_some()
    }

    /// Spawn the worker for the current selection.
    pub fn start(&mut self) -> Result<()> {
        if self.is_processing() {
            debug!("Processing already in progress, ignoring request");
            return Err(Error::AlreadyRunning);
        }
        let guard = self.runner.acquire()?;
        if self.selection.is_empty() {
            return Err(Error::NoFilesSelected);
        }

        self.display.begin();
        let (tx, rx) = mpsc::channel::<BatchEvent>();
        let runner = Arc::clone(&self.runner);
        let selection = self.selection.clone();

        let handle = std::thread::Builder::new()
            .name("upscale-batch".to_string())
            .spawn(move || {
                trace!("Background processing thread started");
                let outcome = runner.run_guarded(&guard, &selection, &tx);
                // Free the slot before the owner hears about completion.
                drop(guard);
                tx.on_event(BatchEvent::Finished(outcome));
            })?;

        self.events = Some(rx);
        self.worker = Some(handle);
        info!("Processing started in background thread");
        Ok(())
    }

    /// Restart the delayed progress reset from `now`. For owners that block
    /// after a batch (a modal dialog) before drawing again.
    pub fn schedule_progress_reset(&mut self, now: Instant) {
        self.display.schedule_reset(now);
    }

    pub fn poll(&mut self) -> Option<BatchOutcome> {
        self.poll_at(Instant::now())
    }

    /// Drain pending events. Returns the outcome once, when the batch ends.
    pub fn poll_at(&mut self, now: Instant) -> Option<BatchOutcome> {
        self.display.tick(now);

        let rx = self.events.as_ref()?;
        loop {
            match rx.try_recv() {
                Ok(event) => {
                    self.display.apply(&event, now);
                    if let BatchEvent::Finished(outcome) = event {
                        self.complete(now, Some(&outcome));
                        return Some(outcome);
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    self.complete(now, None);
                    return None;
                }
            }
        }
    }

    /// Block until the running batch ends.
    pub fn wait(&mut self) -> Option<BatchOutcome> {
        let rx = self.events.as_ref()?;
        while let Ok(event) = rx.recv() {
            let now = Instant::now();
            self.display.apply(&event, now);
            if let BatchEvent::Finished(outcome) = event {
                self.complete(now, Some(&outcome));
                return Some(outcome);
            }
        }
        self.complete(Instant::now(), None);
        None
    }

    fn complete(&mut self, now: Instant, outcome: Option<&BatchOutcome>) {
        self.events = None;
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("Background processing thread panicked");
            }
        }

        match outcome {
            Some(outcome) => {
                info!("{}", outcome.status_line());
                self.selection.clear_files();
                self.last_outcome = Some(outcome.clone());
            }
            None => {
                error!("Processing stopped before reporting an outcome");
                self.display
                    .abort("Processing stopped unexpectedly".to_string(), now);
            }
        }
    }
}
