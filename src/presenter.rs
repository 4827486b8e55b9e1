// Incremental response presenter

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use unicode_segmentation::UnicodeSegmentation;

use crate::backend::{BackendError, PromptBackend};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Lower bound for the tick interval; `tokio::time::interval` rejects zero.
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Waiting,
    Revealing,
    Done,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Waiting => "waiting",
            Self::Revealing => "revealing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Everything the presenter tracks about the current submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentationState {
    pub phase: Phase,
    /// Complete backend response; only set after a successful resolution.
    pub full_text: Option<String>,
    /// Always the first `reveal_index` graphemes of `full_text`.
    pub revealed_text: String,
    pub reveal_index: usize,
    /// Only set in [`Phase::Failed`].
    pub error_message: Option<String>,
}

/// The part of the state a view renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentationSnapshot {
    pub phase: Phase,
    pub revealed_text: String,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenterConfig {
    pub tick_interval: Duration,
    /// No timeout when `None`; the backend may then never resolve.
    pub backend_timeout: Option<Duration>,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            backend_timeout: None,
        }
    }
}

#[derive(Debug)]
enum PresenterEvent {
    Resolved {
        generation: u64,
        result: Result<String, BackendError>,
    },
    Tick {
        generation: u64,
    },
}

/// Sends the backend outcome when dropped, so a call that panics still
/// resolves its submission instead of leaving it waiting forever.
struct Reply {
    tx: mpsc::UnboundedSender<PresenterEvent>,
    generation: u64,
    result: Option<Result<String, BackendError>>,
}

impl Drop for Reply {
    fn drop(&mut self) {
        let result = self
            .result
            .take()
            .unwrap_or_else(|| Err(BackendError::new("prompt backend stopped without answering")));
        // Aborted calls land here too; their generation is already stale.
        // A send error only means the presenter is gone.
        let _ = self.tx.send(PresenterEvent::Resolved {
            generation: self.generation,
            result,
        });
    }
}

#[derive(Debug)]
pub struct ResponsePresenter {
    config: PresenterConfig,
    state: PresentationState,
    /// Byte offset where each grapheme of `full_text` ends.
    grapheme_ends: Vec<usize>,
    generation: u64,
    backend_task: Option<JoinHandle<()>>,
    reveal_task: Option<JoinHandle<()>>,
    events_tx: mpsc::UnboundedSender<PresenterEvent>,
    events_rx: mpsc::UnboundedReceiver<PresenterEvent>,
    snapshot_tx: watch::Sender<PresentationSnapshot>,
}

impl ResponsePresenter {
    pub fn new(config: PresenterConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(PresentationSnapshot::default());

        Self {
            config: PresenterConfig {
                tick_interval: config.tick_interval.max(MIN_TICK_INTERVAL),
                ..config
            },
            state: PresentationState::default(),
            grapheme_ends: Vec::new(),
            generation: 0,
            backend_task: None,
            reveal_task: None,
            events_tx,
            events_rx,
            snapshot_tx,
        }
    }

    pub const fn state(&self) -> &PresentationState {
        &self.state
    }

    pub const fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn revealed_text(&self) -> &str {
        &self.state.revealed_text
    }

    pub fn error_message(&self) -> Option<&str> {
        self.state.error_message.as_deref()
    }

    pub fn snapshot(&self) -> PresentationSnapshot {
        PresentationSnapshot {
            phase: self.state.phase,
            revealed_text: self.state.revealed_text.clone(),
            error_message: self.state.error_message.clone(),
        }
    }

    /// Receives a fresh snapshot after every transition.
    pub fn subscribe(&self) -> watch::Receiver<PresentationSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// True while a backend call is outstanding or a reveal is ticking.
    pub const fn is_active(&self) -> bool {
        self.backend_task.is_some() || self.reveal_task.is_some()
    }

    /// Start a new submission, superseding whatever was in flight.
    ///
    /// The phase is `Waiting` when this returns. Must be called from within a
    /// tokio runtime. Returns the generation assigned to the submission.
    pub fn submit(&mut self, prompt: impl Into<String>, backend: Arc<dyn PromptBackend>) -> u64 {
        let prompt = prompt.into();
        self.invalidate();
        let generation = self.generation;

        self.grapheme_ends.clear();
        self.state = PresentationState {
            phase: Phase::Waiting,
            ..PresentationState::default()
        };
        self.publish();
        tracing::debug!(generation, prompt_len = prompt.len(), "prompt submitted");

        let tx = self.events_tx.clone();
        let timeout = self.config.backend_timeout;
        self.backend_task = Some(tokio::spawn(async move {
            let mut reply = Reply {
                tx,
                generation,
                result: None,
            };
            let result = match timeout {
                Some(limit) => time::timeout(limit, backend.call(&prompt))
                    .await
                    .unwrap_or_else(|_| {
                        Err(BackendError::new(format!(
                            "request timed out after {limit:?}"
                        )))
                    }),
                None => backend.call(&prompt).await,
            };
            reply.result = Some(result);
        }));

        generation
    }

    /// Stop the reveal and drop any outstanding backend result.
    ///
    /// A cancelled reveal keeps its partial text and phase; a cancelled wait
    /// falls back to `Idle`.
    pub fn cancel(&mut self) {
        let was_active = self.is_active();
        self.invalidate();
        if self.state.phase == Phase::Waiting {
            self.state.phase = Phase::Idle;
            self.publish();
        }
        if was_active {
            tracing::debug!(generation = self.generation, "presenter cancelled");
        }
    }

    /// Apply every event that has already arrived. Returns how many changed
    /// the state.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            if self.apply(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next event and apply it. Returns false when the event was
    /// stale and discarded.
    ///
    /// Never resolves if nothing is in flight; check [`Self::is_active`].
    #[allow(dead_code)]
    pub async fn process_next(&mut self) -> bool {
        let Some(event) = self.events_rx.recv().await else {
            return false;
        };
        self.apply(event)
    }

    /// Drive events until the current submission has finished or failed.
    #[allow(dead_code)]
    pub async fn settle(&mut self) {
        while self.is_active() {
            self.process_next().await;
        }
    }

    fn invalidate(&mut self) {
        if let Some(task) = self.backend_task.take() {
            task.abort();
        }
        self.stop_reveal_loop();
        self.generation = self.generation.wrapping_add(1);
    }

    fn apply(&mut self, event: PresenterEvent) -> bool {
        match event {
            PresenterEvent::Resolved { generation, result } => {
                if generation != self.generation || self.state.phase != Phase::Waiting {
                    tracing::debug!(
                        generation,
                        current = self.generation,
                        "discarding stale backend result"
                    );
                    return false;
                }
                self.backend_task = None;
                match result {
                    Ok(text) => self.begin_reveal(text),
                    Err(err) => self.fail(&err),
                }
                true
            }
            PresenterEvent::Tick { generation } => {
                if generation != self.generation || self.state.phase != Phase::Revealing {
                    return false;
                }
                self.advance();
                true
            }
        }
    }

    fn begin_reveal(&mut self, text: String) {
        self.grapheme_ends = text
            .grapheme_indices(true)
            .map(|(start, grapheme)| start + grapheme.len())
            .collect();
        self.state.full_text = Some(text);
        self.state.revealed_text.clear();
        self.state.reveal_index = 0;
        self.state.error_message = None;

        if self.grapheme_ends.is_empty() {
            self.state.phase = Phase::Done;
            self.publish();
            tracing::debug!(generation = self.generation, "empty response, nothing to reveal");
            return;
        }

        self.state.phase = Phase::Revealing;
        self.publish();
        tracing::debug!(
            generation = self.generation,
            graphemes = self.grapheme_ends.len(),
            "revealing response"
        );
        self.start_reveal_loop();
    }

    fn fail(&mut self, err: &BackendError) {
        let message = describe(err);
        tracing::warn!(generation = self.generation, error = %message, "prompt failed");
        self.state.full_text = None;
        self.state.revealed_text.clear();
        self.state.reveal_index = 0;
        self.state.error_message = Some(message);
        self.state.phase = Phase::Failed;
        self.publish();
    }

    fn start_reveal_loop(&mut self) {
        self.stop_reveal_loop();

        let tx = self.events_tx.clone();
        let generation = self.generation;
        let period = self.config.tick_interval;
        let first_tick = Instant::now() + period;

        self.reveal_task = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(PresenterEvent::Tick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_reveal_loop(&mut self) {
        if let Some(task) = self.reveal_task.take() {
            task.abort();
        }
    }

    fn advance(&mut self) {
        let Some(full_text) = self.state.full_text.as_deref() else {
            return;
        };

        if let Some(&end) = self.grapheme_ends.get(self.state.reveal_index) {
            let start = self.state.revealed_text.len();
            self.state.revealed_text.push_str(&full_text[start..end]);
            self.state.reveal_index += 1;
        }

        if self.state.reveal_index == self.grapheme_ends.len() {
            self.stop_reveal_loop();
            self.state.phase = Phase::Done;
            tracing::debug!(generation = self.generation, "reveal complete");
        }
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

impl Drop for ResponsePresenter {
    fn drop(&mut self) {
        if let Some(task) = self.backend_task.take() {
            task.abort();
        }
        self.stop_reveal_loop();
    }
}

fn describe(err: &BackendError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        "unknown error".to_string()
    } else {
        message
    }
}
