//! The refresh scheduler: a cancellable polling loop around the aggregator.
//!
//! One [`RefreshScheduler`] drives one loop. Each iteration fetches the
//! component tree, aggregates it and publishes the resulting [`StatusView`] on
//! a watch channel, then waits for the interval or for [`stop`], whichever
//! comes first.
//!
//! ```text
//!            start()               stop()
//!   Idle ─────────────▶ Running ─────────────▶ Stopping
//!    ▲                                            │
//!    └────────────── loop exits ◀─────────────────┘
//! ```
//!
//! A failed cycle is reported to the [`Notifier`] and the loop carries on.
//! Cycles never overlap: the loop and [`refresh`] take turns on one lock, and
//! a new loop can only start once the previous one has exited.
//!
//! [`stop`]: RefreshScheduler::stop
//! [`refresh`]: RefreshScheduler::refresh

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::data::{aggregate, StatusView};
use crate::error::{RefreshError, SchedulerError};
use crate::notify::{Notification, Notifier, TracingNotifier, REFRESH_FAILED};
use crate::source::StatusSource;

/// Default time between refreshes.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    /// Stop was requested; the loop exits at its next wait point.
    Stopping,
}

#[derive(Debug)]
struct Control {
    state: SchedulerState,
    /// Bumped on every start so a stale loop can't reset a newer one.
    generation: u64,
    cancel: Option<watch::Sender<bool>>,
}

#[derive(Debug)]
struct Shared {
    source: Arc<dyn StatusSource>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    control: Mutex<Control>,
    /// Held across fetch, aggregate and publish.
    cycle: tokio::sync::Mutex<()>,
    published: watch::Sender<Option<Arc<StatusView>>>,
}

impl Shared {
    async fn refresh(&self) -> Result<Arc<StatusView>, RefreshError> {
        let _cycle = self.cycle.lock().await;
        let components = self.source.fetch_status().await?;
        let view = Arc::new(aggregate(&components)?);
        debug!(
            "Refreshed {}: {} monitors, {} incidents",
            self.source.description(),
            view.monitor_count(),
            view.incidents.len()
        );
        self.published.send_replace(Some(view.clone()));
        Ok(view)
    }
}

/// Periodically refreshes the status view.
///
/// Cheap to clone; clones drive the same loop.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use statuswatch::{ChannelSource, RefreshScheduler};
///
/// # tokio_test::block_on(async {
/// let (_tx, source) = ChannelSource::create("embedded");
/// let scheduler = RefreshScheduler::new(Arc::new(source));
///
/// let mut views = scheduler.subscribe();
/// scheduler.start().unwrap();
/// views.changed().await.unwrap();
/// assert!(scheduler.latest().is_some());
///
/// scheduler.stop();
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    shared: Arc<Shared>,
}

impl RefreshScheduler {
    /// A scheduler with the default interval that logs failures.
    pub fn new(source: Arc<dyn StatusSource>) -> Self {
        Self::builder(source).build()
    }

    pub fn builder(source: Arc<dyn StatusSource>) -> RefreshSchedulerBuilder {
        RefreshSchedulerBuilder {
            source,
            notifier: None,
            interval: None,
        }
    }

    /// Start the loop on the current tokio runtime.
    ///
    /// Fails if a loop is running, or still stopping. Await the handle from
    /// the previous start before starting again.
    pub fn start(&self) -> Result<JoinHandle<()>, SchedulerError> {
        let (generation, cancel_rx) = {
            let mut control = self.shared.control.lock();
            match control.state {
                SchedulerState::Idle => {}
                SchedulerState::Running => return Err(SchedulerError::AlreadyRunning),
                SchedulerState::Stopping => return Err(SchedulerError::Stopping),
            }

            let (cancel_tx, cancel_rx) = watch::channel(false);
            control.generation += 1;
            control.state = SchedulerState::Running;
            control.cancel = Some(cancel_tx);
            (control.generation, cancel_rx)
        };

        info!(
            "Refresh scheduler started for {} (every {:?})",
            self.shared.source.description(),
            self.shared.interval
        );

        Ok(tokio::spawn(run_loop(
            self.shared.clone(),
            cancel_rx,
            generation,
        )))
    }

    /// Signal the loop to stop. A no-op when not running.
    pub fn stop(&self) {
        let mut control = self.shared.control.lock();
        if control.state != SchedulerState::Running {
            return;
        }

        control.state = SchedulerState::Stopping;
        if let Some(cancel) = &control.cancel {
            // The loop may already be gone
            let _ = cancel.send(true);
        }
        info!("Refresh scheduler stopping");
    }

    /// Run one fetch, aggregate and publish cycle now.
    ///
    /// Waits for a cycle already in progress to finish first. Unlike the loop,
    /// errors are returned to the caller.
    pub async fn refresh(&self) -> Result<Arc<StatusView>, RefreshError> {
        self.shared.refresh().await
    }

    /// Receiver that sees every published view.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<StatusView>>> {
        self.shared.published.subscribe()
    }

    /// The most recently published view.
    pub fn latest(&self) -> Option<Arc<StatusView>> {
        self.shared.published.borrow().clone()
    }

    pub fn state(&self) -> SchedulerState {
        self.shared.control.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == SchedulerState::Running
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    pub fn source_description(&self) -> &str {
        self.shared.source.description()
    }
}

/// Builder for [`RefreshScheduler`].
#[derive(Debug)]
pub struct RefreshSchedulerBuilder {
    source: Arc<dyn StatusSource>,
    notifier: Option<Arc<dyn Notifier>>,
    interval: Option<Duration>,
}

impl RefreshSchedulerBuilder {
    /// Where failed cycles are reported (default: the log).
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Time between refreshes (default: 20 seconds).
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn build(self) -> RefreshScheduler {
        let (published, _) = watch::channel(None);
        RefreshScheduler {
            shared: Arc::new(Shared {
                source: self.source,
                notifier: self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
                interval: self.interval.unwrap_or(REFRESH_INTERVAL),
                control: Mutex::new(Control {
                    state: SchedulerState::Idle,
                    generation: 0,
                    cancel: None,
                }),
                cycle: tokio::sync::Mutex::new(()),
                published,
            }),
        }
    }
}

/// Returns the scheduler to idle when its loop exits, unless a newer loop has
/// taken over.
struct IdleOnExit {
    shared: Arc<Shared>,
    generation: u64,
}

impl Drop for IdleOnExit {
    fn drop(&mut self) {
        let mut control = self.shared.control.lock();
        if control.generation == self.generation {
            control.state = SchedulerState::Idle;
            control.cancel = None;
            info!("Refresh scheduler stopped");
        }
    }
}

fn is_cancelled(cancel: &watch::Receiver<bool>) -> bool {
    // A dropped sender counts as cancellation
    *cancel.borrow() || cancel.has_changed().is_err()
}

async fn run_loop(shared: Arc<Shared>, mut cancel: watch::Receiver<bool>, generation: u64) {
    let _idle = IdleOnExit {
        shared: shared.clone(),
        generation,
    };

    while !is_cancelled(&cancel) {
        if let Err(e) = shared.refresh().await {
            warn!("Refresh of {} failed: {}", shared.source.description(), e);
            shared.notifier.notify(Notification::error(REFRESH_FAILED));
        }

        // Dropping the losing branch cancels the pending timer.
        tokio::select! {
            _ = tokio::time::sleep(shared.interval) => {}
            _ = cancel.changed() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::notify::NotificationQueue;
    use async_trait::async_trait;
    use statuswatch_types::{Component, Monitor};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    /// Serves one monitor; fails the first `failures` fetches.
    #[derive(Debug, Default)]
    struct MockSource {
        fetches: AtomicUsize,
        failures: usize,
    }

    impl MockSource {
        fn failing(failures: usize) -> Self {
            Self {
                failures,
                ..Self::default()
            }
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusSource for MockSource {
        async fn fetch_status(&self) -> Result<Vec<Component>, SourceError> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(SourceError::Timeout);
            }
            Ok(vec![Component::Monitor(Monitor::new(
                "m-1",
                "API",
                "2024-01-01T00:00:00Z",
            ))])
        }

        fn description(&self) -> &str {
            "mock"
        }
    }

    /// Takes `DELAY` per fetch and records the most fetches seen in flight.
    #[derive(Debug, Default)]
    struct SlowSource {
        fetches: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SlowSource {
        const DELAY: Duration = Duration::from_secs(5);

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }

        fn peak(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusSource for SlowSource {
        async fn fetch_status(&self) -> Result<Vec<Component>, SourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Self::DELAY).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        fn description(&self) -> &str {
            "slow"
        }
    }

    fn scheduler(source: Arc<MockSource>) -> RefreshScheduler {
        RefreshScheduler::new(source)
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_publishes_and_repeats_on_interval() {
        let source = Arc::new(MockSource::default());
        let scheduler = scheduler(source.clone());
        let mut views = scheduler.subscribe();

        scheduler.start().unwrap();
        views.changed().await.unwrap();
        assert_eq!(source.fetches(), 1);
        assert_eq!(scheduler.latest().unwrap().monitor_count(), 1);

        let before = Instant::now();
        views.changed().await.unwrap();
        assert_eq!(source.fetches(), 2);
        assert!(before.elapsed() >= REFRESH_INTERVAL);

        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_is_rejected() {
        let source = Arc::new(MockSource::default());
        let scheduler = scheduler(source.clone());
        let mut views = scheduler.subscribe();

        scheduler.start().unwrap();
        assert_eq!(scheduler.start().unwrap_err(), SchedulerError::AlreadyRunning);
        assert!(scheduler.is_running());

        // The first loop is undisturbed
        views.changed().await.unwrap();
        views.changed().await.unwrap();
        assert_eq!(source.fetches(), 2);

        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_mid_wait_ends_the_loop() {
        let source = Arc::new(MockSource::default());
        let scheduler = scheduler(source.clone());
        let mut views = scheduler.subscribe();

        let handle = scheduler.start().unwrap();
        views.changed().await.unwrap();

        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Stopping);
        handle.await.unwrap();

        assert_eq!(scheduler.state(), SchedulerState::Idle);
        tokio::time::sleep(REFRESH_INTERVAL * 3).await;
        assert_eq!(source.fetches(), 1);

        // Can be started again
        let handle = scheduler.start().unwrap();
        views.changed().await.unwrap();
        assert_eq!(source.fetches(), 2);
        scheduler.stop();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_waits_for_stopping_loop() {
        let source = Arc::new(SlowSource::default());
        let scheduler = RefreshScheduler::new(source.clone());
        let mut views = scheduler.subscribe();

        let old = scheduler.start().unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        // Old fetch still in flight
        scheduler.stop();
        assert_eq!(scheduler.start().unwrap_err(), SchedulerError::Stopping);
        old.await.unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(views.borrow_and_update().is_some());

        let new = scheduler.start().unwrap();
        views.changed().await.unwrap();
        assert_eq!(source.fetches(), 2);
        assert_eq!(source.peak(), 1);

        scheduler.stop();
        new.await.unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_waits_for_loop_cycle() {
        let source = Arc::new(SlowSource::default());
        let scheduler = RefreshScheduler::new(source.clone());

        let handle = scheduler.start().unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let started = Instant::now();
        let on_demand = tokio::spawn({
            let scheduler = scheduler.clone();
            async move { scheduler.refresh().await }
        });
        on_demand.await.unwrap().unwrap();

        // Queued behind the loop's fetch, then ran its own
        assert!(started.elapsed() >= SlowSource::DELAY * 2 - Duration::from_secs(1));
        assert_eq!(source.fetches(), 2);
        assert_eq!(source.peak(), 1);

        scheduler.stop();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_noop() {
        let scheduler = scheduler(Arc::new(MockSource::default()));
        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_reported_and_loop_continues() {
        let source = Arc::new(MockSource::failing(2));
        let queue = NotificationQueue::default();
        let scheduler = RefreshScheduler::builder(source.clone())
            .notifier(Arc::new(queue.clone()))
            .interval(Duration::from_secs(5))
            .build();
        let mut views = scheduler.subscribe();

        let handle = scheduler.start().unwrap();
        views.changed().await.unwrap();

        assert_eq!(source.fetches(), 3);
        let notes = queue.drain();
        assert_eq!(notes.len(), 2);
        assert!(notes.iter().all(|n| n.is_error() && n.message == REFRESH_FAILED));

        scheduler.stop();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_on_demand() {
        let source = Arc::new(MockSource::failing(1));
        let scheduler = scheduler(source.clone());

        let err = scheduler.refresh().await.unwrap_err();
        assert!(matches!(err, RefreshError::Source(SourceError::Timeout)));
        assert!(scheduler.latest().is_none());

        let view = scheduler.refresh().await.unwrap();
        assert_eq!(view.monitor_count(), 1);
        assert!(scheduler.latest().is_some());
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }
}
