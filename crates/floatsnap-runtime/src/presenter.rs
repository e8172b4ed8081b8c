#![forbid(unsafe_code)]

//! Background work with results delivered on the UI thread.
//!
//! A [`Presenter`] owns a view that lives on the UI thread. Work submitted
//! with [`Presenter::exec`] runs on one lazily spawned worker thread, in
//! submission order. Tasks get a [`MainPoster`] to hand closures back to the
//! UI thread; the host drains them by calling [`Presenter::pump`] from its
//! event loop.
//!
//! # Invariants
//!
//! 1. Background tasks run one at a time, in submission order.
//! 2. Main-thread closures run in due-time order, ties in posting order,
//!    and only inside `pump`.
//! 3. A task failure (an `Err` or a panic) reaches
//!    [`PresenterView::on_failure`] once, on the UI thread.
//!
//! # Failure Modes
//!
//! - After [`Presenter::release`]: queued background tasks are skipped,
//!   queued main-thread closures are discarded, the view is dropped, and
//!   every later submission is ignored with a warning. A task already
//!   running finishes, but its posts are dropped. There is no drain.
//! - The worker thread cannot be spawned: `exec` returns
//!   [`PresenterError::Spawn`] and the task is not run.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};
use web_time::{Duration, Instant};

use crate::cancellation::{CancellationSource, CancellationToken};

/// Name of the worker thread.
pub const WORKER_THREAD_NAME: &str = "floatsnap-presenter";

// ---------------------------------------------------------------------------
// View contract and errors
// ---------------------------------------------------------------------------

/// The UI-side object a presenter drives.
pub trait PresenterView {
    fn show_loading(&mut self) {}

    fn hide_loading(&mut self) {}

    /// A background or main-thread task failed.
    fn on_failure(&mut self, failure: &TaskFailure);
}

/// Why a task did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFailure {
    /// The task returned an error.
    Error(String),
    /// The task panicked.
    Panic(String),
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(msg) => write!(f, "task failed: {msg}"),
            Self::Panic(msg) => write!(f, "task panicked: {msg}"),
        }
    }
}

impl std::error::Error for TaskFailure {}

/// Errors returned by [`Presenter::exec`].
#[derive(Debug)]
pub enum PresenterError {
    /// The worker thread could not be spawned.
    Spawn(std::io::Error),
}

impl fmt::Display for PresenterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(e) => write!(f, "failed to spawn presenter worker: {e}"),
        }
    }
}

impl std::error::Error for PresenterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(e) => Some(e),
        }
    }
}

/// Result type of background tasks.
pub type TaskResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// ---------------------------------------------------------------------------
// Main-thread queue
// ---------------------------------------------------------------------------

type MainTask<V> = Box<dyn FnOnce(&mut V) + Send + 'static>;
type Job<V> = Box<dyn FnOnce(&MainPoster<V>) -> TaskResult + Send + 'static>;

struct MainEntry<V> {
    due: Instant,
    seq: u64,
    task: MainTask<V>,
}

struct MainQueue<V> {
    entries: Vec<MainEntry<V>>,
    next_seq: u64,
}

impl<V> MainQueue<V> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    fn push(&mut self, due: Instant, task: MainTask<V>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(MainEntry { due, seq, task });
    }

    /// Remove and return every entry due at `now`, in run order.
    fn take_due(&mut self, now: Instant) -> Vec<MainEntry<V>> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|e| e.due <= now);
        self.entries = pending;
        due.sort_by(|a, b| a.due.cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due
    }
}

/// Posts closures to the UI thread. Cheap to clone and `Send`.
pub struct MainPoster<V> {
    queue: Arc<Mutex<MainQueue<V>>>,
    token: CancellationToken,
}

impl<V> Clone for MainPoster<V> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            token: self.token.clone(),
        }
    }
}

impl<V> fmt::Debug for MainPoster<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainPoster")
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

impl<V> MainPoster<V> {
    /// Run `f` on the next pump. Returns `false` once released.
    pub fn post<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut V) + Send + 'static,
    {
        self.post_delayed(f, Duration::ZERO)
    }

    /// Run `f` on the first pump at least `delay` from now.
    pub fn post_delayed<F>(&self, f: F, delay: Duration) -> bool
    where
        F: FnOnce(&mut V) + Send + 'static,
    {
        // Nothing is queued once `release` has cleared the queue.
        let mut queue = lock(&self.queue);
        if self.token.is_cancelled() {
            debug!("presenter released, main-thread post dropped");
            return false;
        }
        queue.push(Instant::now() + delay, Box::new(f));
        true
    }

    /// Whether the presenter has been released.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The release signal, for long-running tasks to poll.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl<V: PresenterView + 'static> MainPoster<V> {
    fn post_failure(&self, failure: TaskFailure) {
        warn!(%failure, "presenter task failed");
        self.post(move |view: &mut V| view.on_failure(&failure));
    }
}

fn lock<V>(queue: &Mutex<MainQueue<V>>) -> MutexGuard<'_, MainQueue<V>> {
    queue.lock().unwrap_or_else(|e| e.into_inner())
}

// ---------------------------------------------------------------------------
// Presenter
// ---------------------------------------------------------------------------

struct Worker<V> {
    sender: mpsc::Sender<Job<V>>,
    _handle: JoinHandle<()>,
}

/// Owns a view, a background worker, and the main-thread queue.
pub struct Presenter<V> {
    view: Option<V>,
    source: CancellationSource,
    poster: MainPoster<V>,
    worker: Option<Worker<V>>,
}

impl<V> fmt::Debug for Presenter<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Presenter")
            .field("released", &self.source.is_cancelled())
            .field("worker_started", &self.worker.is_some())
            .finish()
    }
}

impl<V: PresenterView + 'static> Presenter<V> {
    #[must_use]
    pub fn new(view: V) -> Self {
        let source = CancellationSource::new();
        let poster = MainPoster {
            queue: Arc::new(Mutex::new(MainQueue::new())),
            token: source.token(),
        };
        Self {
            view: Some(view),
            source,
            poster,
            worker: None,
        }
    }

    /// The view, until released.
    #[must_use]
    pub fn view(&self) -> Option<&V> {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> Option<&mut V> {
        self.view.as_mut()
    }

    #[inline]
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.source.is_cancelled()
    }

    /// A poster for this presenter's main-thread queue.
    #[must_use]
    pub fn poster(&self) -> MainPoster<V> {
        self.poster.clone()
    }

    /// Run `task` on the worker thread.
    ///
    /// The worker is spawned on first use. After release the task is
    /// dropped and `Ok(())` is returned.
    pub fn exec<F>(&mut self, task: F) -> Result<(), PresenterError>
    where
        F: FnOnce(&MainPoster<V>) -> TaskResult + Send + 'static,
    {
        if self.is_released() {
            warn!("exec after release ignored");
            return Ok(());
        }
        let job: Job<V> = Box::new(task);
        let job = match &self.worker {
            Some(worker) => match worker.sender.send(job) {
                Ok(()) => return Ok(()),
                // The worker exited; start a fresh one below.
                Err(mpsc::SendError(job)) => job,
            },
            None => job,
        };
        let worker = self.spawn_worker()?;
        if let Err(mpsc::SendError(_)) = worker.sender.send(job) {
            warn!("presenter worker exited before accepting a task");
        }
        self.worker = Some(worker);
        Ok(())
    }

    /// Run `f` on the next pump.
    pub fn post_main<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut V) + Send + 'static,
    {
        self.poster.post(f)
    }

    /// Run `f` on the first pump at least `delay` from now.
    pub fn post_main_delayed<F>(&self, f: F, delay: Duration) -> bool
    where
        F: FnOnce(&mut V) + Send + 'static,
    {
        self.poster.post_delayed(f, delay)
    }

    /// When the earliest queued closure becomes due.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        lock(&self.poster.queue).entries.iter().map(|e| e.due).min()
    }

    /// Run every main-thread closure due at `now`. Returns how many ran.
    ///
    /// A panicking closure is reported through `on_failure` and does not
    /// stop the rest.
    pub fn pump(&mut self, now: Instant) -> usize {
        if self.is_released() {
            return 0;
        }
        let due = lock(&self.poster.queue).take_due(now);
        let Some(view) = self.view.as_mut() else {
            return 0;
        };
        let count = due.len();
        for entry in due {
            let task = entry.task;
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| task(view))) {
                let failure = TaskFailure::Panic(panic_message(payload.as_ref()));
                warn!(%failure, "main-thread task failed");
                view.on_failure(&failure);
            }
        }
        count
    }

    pub fn show_loading(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.show_loading();
        }
    }

    pub fn hide_loading(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.hide_loading();
        }
    }

    /// Stop accepting work, discard everything queued, and drop the view.
    /// Idempotent.
    pub fn release(&mut self) {
        if self.is_released() {
            return;
        }
        self.source.cancel();
        // Dropping the sender lets the worker exit once its current task ends.
        self.worker = None;
        let discarded = {
            let mut queue = lock(&self.poster.queue);
            let n = queue.entries.len();
            queue.entries.clear();
            n
        };
        self.view = None;
        debug!(discarded, "presenter released");
    }

    fn spawn_worker(&self) -> Result<Worker<V>, PresenterError> {
        let (sender, receiver) = mpsc::channel::<Job<V>>();
        let poster = self.poster.clone();
        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.into())
            .spawn(move || worker_loop(receiver, poster))
            .map_err(PresenterError::Spawn)?;
        debug!("presenter worker started");
        Ok(Worker {
            sender,
            _handle: handle,
        })
    }
}

impl<V> Drop for Presenter<V> {
    fn drop(&mut self) {
        self.source.cancel();
    }
}

fn worker_loop<V: PresenterView + 'static>(
    receiver: mpsc::Receiver<Job<V>>,
    poster: MainPoster<V>,
) {
    while let Ok(job) = receiver.recv() {
        if poster.is_cancelled() {
            break;
        }
        match panic::catch_unwind(AssertUnwindSafe(|| job(&poster))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => poster.post_failure(TaskFailure::Error(e.to_string())),
            Err(payload) => {
                poster.post_failure(TaskFailure::Panic(panic_message(payload.as_ref())));
            }
        }
    }
    debug!("presenter worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct View {
        values: Vec<u32>,
        failures: Vec<TaskFailure>,
    }

    impl PresenterView for View {
        fn on_failure(&mut self, failure: &TaskFailure) {
            self.failures.push(failure.clone());
        }
    }

    #[test]
    fn main_posts_run_in_due_then_post_order() {
        let mut p = Presenter::new(View::default());
        p.post_main_delayed(|v: &mut View| v.values.push(3), Duration::from_millis(5));
        p.post_main(|v: &mut View| v.values.push(1));
        p.post_main(|v: &mut View| v.values.push(2));

        assert_eq!(p.pump(Instant::now()), 2);
        assert_eq!(p.view().unwrap().values, vec![1, 2]);
        assert!(p.next_due().is_some());

        assert_eq!(p.pump(Instant::now() + Duration::from_millis(50)), 1);
        assert_eq!(p.view().unwrap().values, vec![1, 2, 3]);
        assert!(p.next_due().is_none());
    }

    #[test]
    fn panicking_main_task_is_reported_and_others_run() {
        let mut p = Presenter::new(View::default());
        p.post_main(|_: &mut View| panic!("boom"));
        p.post_main(|v: &mut View| v.values.push(7));
        assert_eq!(p.pump(Instant::now()), 2);
        let view = p.view().unwrap();
        assert_eq!(view.values, vec![7]);
        assert_eq!(view.failures, vec![TaskFailure::Panic("boom".into())]);
    }

    #[test]
    fn release_discards_and_ignores() {
        let mut p = Presenter::new(View::default());
        p.post_main(|v: &mut View| v.values.push(1));
        p.release();
        assert!(p.is_released());
        assert!(p.view().is_none());
        assert!(!p.post_main(|v: &mut View| v.values.push(2)));
        assert!(p.exec(|_| Ok(())).is_ok());
        assert_eq!(p.pump(Instant::now()), 0);
        p.release();
    }

    #[test]
    fn failure_display() {
        assert_eq!(TaskFailure::Error("io".into()).to_string(), "task failed: io");
        assert_eq!(TaskFailure::Panic("x".into()).to_string(), "task panicked: x");
    }
}
