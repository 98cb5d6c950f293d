//! Debounced autosave tracking for high-frequency edits
//!
//! [`Autosave`] coalesces a burst of edits to one field (keystrokes, pointer
//! drags) into a single persisted write after a quiet period, while keeping
//! an accurate "saving" signal for the UI. Each tracked field gets its own
//! tracker, so a slow image-settings save never blocks a text save.
//!
//! Guarantees:
//! - within a burst, only the most recent value is ever persisted;
//! - the saving flag rises once per burst, not on every reschedule, and
//!   falls only after the last outstanding write settles;
//! - an edit equal to the last persisted value schedules nothing;
//! - after [`Autosave::cancel`], pending timers are dropped and in-flight
//!   completions are ignored.

use crate::error::PersistenceError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Quiet period for free-text edits
pub const TEXT_SAVE_DELAY: Duration = Duration::from_millis(800);

/// Quiet period for pointer-driven image-settings edits
pub const IMAGE_SETTINGS_SAVE_DELAY: Duration = Duration::from_millis(300);

/// Downstream persistence target for a debounced field
#[async_trait]
pub trait SaveSink<T>: Send + Sync {
    async fn save(&self, value: T) -> Result<(), PersistenceError>;
}

/// Settled result of one debounced write, reported on the outcome channel
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    Saved,
    Failed(String),
}

/// Debounced tracker for a single mutable field
pub struct Autosave<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    sink: Arc<dyn SaveSink<T>>,
    delay: Duration,
    saving: AtomicBool,
    in_flight: AtomicUsize,
    state: Mutex<FieldState<T>>,
    outcomes: Mutex<Option<mpsc::UnboundedSender<SaveOutcome>>>,
}

/// One inspectable state per field: the pending value, the timer driving it,
/// the last persisted value, and the generation used to discard completions
/// that a newer edit or a cancel has superseded.
struct FieldState<T> {
    latest: Option<T>,
    last_saved: Option<T>,
    timer: Option<JoinHandle<()>>,
    generation: u64,
}

impl<T> Autosave<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    /// Create a tracker that persists through `sink` after `delay` of quiet
    pub fn new(sink: Arc<dyn SaveSink<T>>, delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                sink,
                delay,
                saving: AtomicBool::new(false),
                in_flight: AtomicUsize::new(0),
                state: Mutex::new(FieldState {
                    latest: None,
                    last_saved: None,
                    timer: None,
                    generation: 0,
                }),
                outcomes: Mutex::new(None),
            }),
        }
    }

    /// Create a tracker seeded with the field's already-persisted value, so
    /// the first edit is also subject to skip-if-unchanged.
    pub fn with_initial(sink: Arc<dyn SaveSink<T>>, delay: Duration, initial: T) -> Self {
        let tracker = Self::new(sink, delay);
        tracker.inner.state.lock().unwrap().last_saved = Some(initial);
        tracker
    }

    /// Open a channel reporting each settled write. At most one receiver;
    /// opening again replaces the previous one.
    pub fn outcomes(&self) -> mpsc::UnboundedReceiver<SaveOutcome> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.inner.outcomes.lock().unwrap() = Some(tx);
        rx
    }

    /// Record an edit.
    ///
    /// Synchronous: the caller has already applied the value optimistically.
    /// Starts the quiet-period timer on a new burst, reschedules it within
    /// one, and skips entirely when the value equals the last persisted one.
    /// Must be called from within a tokio runtime.
    pub fn edit(&self, value: T) {
        let mut state = self.inner.state.lock().unwrap();
        if state.timer.is_none()
            && self.inner.in_flight.load(Ordering::SeqCst) == 0
            && state.last_saved.as_ref() == Some(&value)
        {
            return; // unchanged since the last persisted write
        }
        match state.timer.take() {
            Some(timer) => timer.abort(), // reschedule within the burst
            None => self.inner.saving.store(true, Ordering::SeqCst),
        }
        state.latest = Some(value);
        state.generation += 1;
        let generation = state.generation;
        let inner = Arc::clone(&self.inner);
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.delay).await;
            inner.flush(generation).await;
        }));
    }

    /// True from the start of an edit burst until its save settles
    pub fn saving(&self) -> bool {
        self.inner.saving.load(Ordering::SeqCst)
    }

    /// Drop the pending edit and ignore any in-flight completion.
    ///
    /// Used when the edited page is deselected or the editor goes away, so a
    /// stale timer can never persist against the wrong page.
    pub fn cancel(&self) {
        let mut state = self.inner.state.lock().unwrap();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.latest = None;
        state.generation += 1;
        self.inner.saving.store(false, Ordering::SeqCst);
    }

    /// Persist any pending edit immediately instead of waiting out the quiet
    /// period (editor teardown path).
    pub async fn flush_now(&self) {
        let generation = {
            let mut state = self.inner.state.lock().unwrap();
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            state.generation
        };
        self.inner.flush(generation).await;
    }
}

impl<T> Inner<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    async fn flush(&self, generation: u64) {
        let value = {
            let mut state = self.state.lock().unwrap();
            if state.generation != generation {
                return; // superseded by a newer edit or a cancel
            }
            state.timer = None;
            state.latest.take()
        };

        let mut outcome = None;
        if let Some(value) = value {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            let result = self.sink.save(value.clone()).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            match result {
                Ok(()) => {
                    let mut state = self.state.lock().unwrap();
                    if state.generation == generation {
                        state.last_saved = Some(value);
                    }
                    outcome = Some(SaveOutcome::Saved);
                }
                Err(err) => {
                    // Local optimistic state is kept; the next edit retries.
                    tracing::warn!(error = %err, "autosave write failed, keeping local edit");
                    outcome = Some(SaveOutcome::Failed(err.to_string()));
                }
            }
        }

        {
            let state = self.state.lock().unwrap();
            if state.timer.is_none() && self.in_flight.load(Ordering::SeqCst) == 0 {
                self.saving.store(false, Ordering::SeqCst);
            }
        }

        if let Some(outcome) = outcome {
            if let Some(tx) = self.outcomes.lock().unwrap().as_ref() {
                let _ = tx.send(outcome);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        saved: Mutex<Vec<String>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl SaveSink<String> for RecordingSink {
        async fn save(&self, value: String) -> Result<(), PersistenceError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(PersistenceError::Backend("backend down".to_string()));
            }
            self.saved.lock().unwrap().push(value);
            Ok(())
        }
    }

    const DELAY: Duration = Duration::from_millis(100);

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_to_single_save_with_last_value() {
        let sink = Arc::new(RecordingSink::default());
        let tracker = Autosave::new(sink.clone() as Arc<dyn SaveSink<String>>, DELAY);
        let mut outcomes = tracker.outcomes();

        tracker.edit("T".to_string());
        assert!(tracker.saving());
        tokio::time::sleep(Duration::from_millis(30)).await;
        tracker.edit("Th".to_string());
        tokio::time::sleep(Duration::from_millis(30)).await;
        tracker.edit("The fox".to_string());
        assert!(tracker.saving());

        assert!(matches!(outcomes.recv().await, Some(SaveOutcome::Saved)));
        assert_eq!(*sink.saved.lock().unwrap(), vec!["The fox".to_string()]);
        assert!(!tracker.saving());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_value_schedules_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let tracker = Autosave::new(sink.clone() as Arc<dyn SaveSink<String>>, DELAY);
        let mut outcomes = tracker.outcomes();

        tracker.edit("same".to_string());
        assert!(matches!(outcomes.recv().await, Some(SaveOutcome::Saved)));

        tracker.edit("same".to_string());
        assert!(!tracker.saving());
        tokio::time::sleep(DELAY * 3).await;
        assert_eq!(sink.saved.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_tracker_skips_initial_value() {
        let sink = Arc::new(RecordingSink::default());
        let tracker = Autosave::with_initial(
            sink.clone() as Arc<dyn SaveSink<String>>,
            DELAY,
            "loaded".to_string(),
        );

        tracker.edit("loaded".to_string());
        assert!(!tracker.saving());
        tokio::time::sleep(DELAY * 3).await;
        assert!(sink.saved.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_edit() {
        let sink = Arc::new(RecordingSink::default());
        let tracker = Autosave::new(sink.clone() as Arc<dyn SaveSink<String>>, DELAY);

        tracker.edit("doomed".to_string());
        assert!(tracker.saving());
        tracker.cancel();
        assert!(!tracker.saving());

        tokio::time::sleep(DELAY * 3).await;
        assert!(sink.saved.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_now_persists_without_waiting() {
        let sink = Arc::new(RecordingSink::default());
        let tracker = Autosave::new(sink.clone() as Arc<dyn SaveSink<String>>, DELAY);

        tracker.edit("teardown".to_string());
        tracker.flush_now().await;
        assert_eq!(*sink.saved.lock().unwrap(), vec!["teardown".to_string()]);
        assert!(!tracker.saving());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_reported_and_flag_cleared() {
        let sink = Arc::new(RecordingSink::default());
        sink.fail.store(true, Ordering::SeqCst);
        let tracker = Autosave::new(sink.clone() as Arc<dyn SaveSink<String>>, DELAY);
        let mut outcomes = tracker.outcomes();

        tracker.edit("lost write".to_string());
        assert!(matches!(outcomes.recv().await, Some(SaveOutcome::Failed(_))));
        assert!(!tracker.saving());

        // The value never became last_saved, so retrying the same edit
        // schedules a fresh write once the backend recovers.
        sink.fail.store(false, Ordering::SeqCst);
        tracker.edit("lost write".to_string());
        assert!(matches!(outcomes.recv().await, Some(SaveOutcome::Saved)));
        assert_eq!(*sink.saved.lock().unwrap(), vec!["lost write".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_burst_after_settle_saves_again() {
        let sink = Arc::new(RecordingSink::default());
        let tracker = Autosave::new(sink.clone() as Arc<dyn SaveSink<String>>, DELAY);
        let mut outcomes = tracker.outcomes();

        tracker.edit("one".to_string());
        assert!(matches!(outcomes.recv().await, Some(SaveOutcome::Saved)));
        tracker.edit("two".to_string());
        assert!(tracker.saving());
        assert!(matches!(outcomes.recv().await, Some(SaveOutcome::Saved)));

        assert_eq!(
            *sink.saved.lock().unwrap(),
            vec!["one".to_string(), "two".to_string()]
        );
    }
}
