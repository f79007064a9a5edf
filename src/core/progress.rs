//! Progress reporting for batch runs.
//!
//! The worker side owns a [`ProgressReporter`] that animates the percentage one
//! point per tick and pushes every step into a [`ProgressSink`]. The foreground
//! side folds those events into a [`ProgressDisplay`], which never goes
//! backwards during a batch and falls back to zero a short while after it ends.
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::core::runner::{BatchOutcome, FileOutcome};
use crate::core::selection::display_name;

/// Delay between two animation steps.
pub const DEFAULT_TICK: Duration = Duration::from_millis(5);

/// How long the final 100% stays visible before the display resets.
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(2);

pub const READY_STATUS: &str = "Ready";

/// Events emitted by a running batch, in order.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started { total: usize },
    FileStarted {
        index: usize,
        total: usize,
        input: PathBuf,
    },
    FileFinished(FileOutcome),
    Progress(u8),
    Finished(BatchOutcome),
}

impl BatchEvent {
    /// Status line shown for this event, if it changes the status.
    pub fn status_text(&self) -> Option<String> {
        match self {
            BatchEvent::Started { .. } => Some("Starting...".to_string()),
            BatchEvent::FileStarted {
                index,
                total,
                input,
            } => Some(format!(
                "Processing {}/{}: {}",
                index,
                total,
                display_name(input)
            )),
            BatchEvent::Finished(outcome) => Some(outcome.status_line()),
            BatchEvent::FileFinished(_) | BatchEvent::Progress(_) => None,
        }
    }
}

/// Receiver of batch events. Implementations must not block for long; the
/// worker calls them between external invocations.
pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: BatchEvent);
}

impl ProgressSink for Sender<BatchEvent> {
    fn on_event(&self, event: BatchEvent) {
        // A closed receiver means nobody is watching any more.
        let _ = self.send(event);
    }
}

/// Sink that keeps every event, mostly useful in tests and the CLI.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<BatchEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BatchEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Every `Progress` value in emission order.
    pub fn progress_values(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                BatchEvent::Progress(value) => Some(value),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for CollectingSink {
    fn on_event(&self, event: BatchEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// `round(done / total * 100)`, clamped to 100. An empty batch counts as done.
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let done = done.min(total) as u64;
    let total = total as u64;
    ((done * 200 + total) / (total * 2)) as u8
}

/// Worker-side animator.
pub struct ProgressReporter<'a> {
    current: u8,
    tick: Duration,
    sink: &'a dyn ProgressSink,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(sink: &'a dyn ProgressSink, tick: Duration) -> Self {
        Self {
            current: 0,
            tick,
            sink,
        }
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    /// Step up to `target` one point at a time. Lower targets are ignored.
    pub fn advance_to(&mut self, target: u8) {
        let target = target.min(100);
        while self.current < target {
            self.current += 1;
            self.sink.on_event(BatchEvent::Progress(self.current));
            if !self.tick.is_zero() {
                std::thread::sleep(self.tick);
            }
        }
    }

    /// Back to zero at the start of a batch.
    pub fn reset(&mut self) {
        self.current = 0;
        self.sink.on_event(BatchEvent::Progress(0));
    }
}

/// Foreground view of the progress bar and status line.
#[derive(Debug, Clone)]
pub struct ProgressDisplay {
    value: u8,
    status: String,
    reset_delay: Duration,
    reset_at: Option<Instant>,
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self::new(DEFAULT_RESET_DELAY)
    }
}

impl ProgressDisplay {
    pub fn new(reset_delay: Duration) -> Self {
        Self {
            value: 0,
            status: READY_STATUS.to_string(),
            reset_delay,
            reset_at: None,
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Value as a fraction for progress bar widgets.
    pub fn fraction(&self) -> f32 {
        f32::from(self.value) / 100.0
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn begin(&mut self) {
        self.value = 0;
        self.reset_at = None;
    }

    pub fn apply(&mut self, event: &BatchEvent, now: Instant) {
        match event {
            BatchEvent::Progress(0) => self.value = 0,
            BatchEvent::Progress(value) => self.value = self.value.max((*value).min(100)),
            BatchEvent::Finished(_) => {
                self.value = 100;
                self.reset_at = Some(now + self.reset_delay);
            }
            _ => {}
        }
        if let Some(status) = event.status_text() {
            self.status = status;
        }
    }

    /// Record an abnormal end (the worker vanished without a report).
    pub fn abort(&mut self, status: String, now: Instant) {
        self.status = status;
        self.reset_at = Some(now + self.reset_delay);
    }

    /// Apply the delayed reset. Returns true when it fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.reset_at {
            Some(deadline) if now >= deadline => {
                self.value = 0;
                self.status = READY_STATUS.to_string();
                self.reset_at = None;
                true
            }
            _ => false,
        }
    }

    /// Restart the reset countdown from `now`, if one is pending.
    pub fn schedule_reset(&mut self, now: Instant) {
        if self.reset_at.is_some() {
            self.reset_at = Some(now + self.reset_delay);
        }
    }

    pub fn reset_pending(&self) -> Option<Instant> {
        self.reset_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_to_nearest() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(1, 200), 1);
        assert_eq!(percent(0, 5), 0);
    }

    #[test]
    fn percent_is_monotonic_and_ends_at_100() {
        for total in 1..=50 {
            let values: Vec<u8> = (1..=total).map(|i| percent(i, total)).collect();
            assert!(values.windows(2).all(|w| w[0] <= w[1]));
            assert_eq!(*values.last().unwrap(), 100);
        }
    }

    #[test]
    fn reporter_steps_one_point_at_a_time() {
        let sink = CollectingSink::new();
        let mut reporter = ProgressReporter::new(&sink, Duration::ZERO);
        reporter.advance_to(3);
        reporter.advance_to(5);
        assert_eq!(sink.progress_values(), vec![1, 2, 3, 4, 5]);
        assert_eq!(reporter.current(), 5);
    }

    #[test]
    fn reporter_never_regresses() {
        let sink = CollectingSink::new();
        let mut reporter = ProgressReporter::new(&sink, Duration::ZERO);
        reporter.advance_to(40);
        reporter.advance_to(20);
        reporter.advance_to(40);
        assert_eq!(reporter.current(), 40);
        assert_eq!(sink.progress_values().len(), 40);
    }

    #[test]
    fn reporter_clamps_to_100() {
        let sink = CollectingSink::new();
        let mut reporter = ProgressReporter::new(&sink, Duration::ZERO);
        reporter.advance_to(250);
        assert_eq!(reporter.current(), 100);
    }

    #[test]
    fn display_ignores_lower_values() {
        let now = Instant::now();
        let mut display = ProgressDisplay::new(Duration::from_secs(2));
        display.apply(&BatchEvent::Progress(50), now);
        display.apply(&BatchEvent::Progress(30), now);
        assert_eq!(display.value(), 50);
        display.apply(&BatchEvent::Progress(0), now);
        assert_eq!(display.value(), 0);
    }

    #[test]
    fn display_shows_processing_status() {
        let now = Instant::now();
        let mut display = ProgressDisplay::default();
        assert_eq!(display.status(), "Ready");
        display.apply(
            &BatchEvent::FileStarted {
                index: 2,
                total: 5,
                input: PathBuf::from("/pics/dog.png"),
            },
            now,
        );
        assert_eq!(display.status(), "Processing 2/5: dog.png");
    }

    #[test]
    fn display_resets_after_delay() {
        let start = Instant::now();
        let mut display = ProgressDisplay::new(Duration::from_secs(2));
        display.apply(&BatchEvent::Progress(100), start);
        display.apply(&BatchEvent::Finished(BatchOutcome::empty()), start);
        assert_eq!(display.value(), 100);

        assert!(!display.tick(start + Duration::from_secs(1)));
        assert_eq!(display.value(), 100);

        assert!(display.tick(start + Duration::from_secs(2)));
        assert_eq!(display.value(), 0);
        assert_eq!(display.status(), "Ready");
        assert!(display.reset_pending().is_none());
    }

    #[test]
    fn rescheduled_reset_counts_from_new_start() {
        let finished = Instant::now();
        let mut display = ProgressDisplay::new(Duration::from_secs(2));
        display.apply(&BatchEvent::Finished(BatchOutcome::empty()), finished);

        let closed = finished + Duration::from_secs(5);
        display.schedule_reset(closed);

        assert!(!display.tick(closed + Duration::from_secs(1)));
        assert_eq!(display.value(), 100);
        assert!(display.tick(closed + Duration::from_secs(2)));
        assert_eq!(display.value(), 0);
    }

    #[test]
    fn schedule_reset_without_pending_reset_is_ignored() {
        let now = Instant::now();
        let mut display = ProgressDisplay::default();
        display.apply(&BatchEvent::Progress(40), now);
        display.schedule_reset(now);
        assert!(display.reset_pending().is_none());
        assert_eq!(display.value(), 40);
    }
}
