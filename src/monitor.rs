//! Monitor facade.
//!
//! A [`Monitor`] owns one [`CategoryTracker`] per configured category and one
//! shared [`Dispatcher`]. Each [`Monitor::check_updates`] call polls every
//! category in registration order, reconciles the result, and emits the
//! resulting exits and then enters.
//!
//! # Threading
//!
//! `check_updates` takes `&mut self`: a monitor cannot be polled from two
//! threads at once without external synchronization. [`SharedMonitor`] adds an
//! internal mutex for callers that need it. Listener registration goes through
//! the `Arc<Dispatcher>` returned by [`Monitor::dispatcher`] and is safe from
//! any thread.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::category::{Category, TrackerState};
use crate::config::{FailurePolicy, MonitorConfig};
use crate::dispatcher::Dispatcher;
use crate::error::{ConfigError, MonitorError, MonitorResult, PollError};
use crate::identity::ResourceIdentity;
use crate::stream::TransitionStream;
use crate::tracker::CategoryTracker;

/// Externally supplied query returning the resources currently in a category.
pub type PollFn<R> = Box<dyn FnMut() -> Result<HashSet<R>, PollError> + Send>;

/// Counters for one `check_updates` call.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckSummary {
    pub polled: usize,
    pub failed: usize,
    pub entered: usize,
    pub exited: usize,
}

impl CheckSummary {
    /// Returns true if no transition was emitted.
    #[must_use]
    pub const fn is_quiet(&self) -> bool {
        self.entered == 0 && self.exited == 0
    }
}

struct CategorySlot<R: ResourceIdentity> {
    poll: PollFn<R>,
    tracker: CategoryTracker<R>,
}

/// Edge-triggered membership monitor.
pub struct Monitor<R: ResourceIdentity> {
    cfg: MonitorConfig,
    categories: Vec<CategorySlot<R>>,
    dispatcher: Arc<Dispatcher<R>>,
}

impl<R: ResourceIdentity> Monitor<R> {
    /// Starts building a monitor.
    #[must_use]
    pub fn builder() -> MonitorBuilder<R> {
        MonitorBuilder::new()
    }

    /// Creates a monitor from `(category, poll function)` pairs, kept in order.
    pub fn new(cfg: MonitorConfig, categories: Vec<(Category, PollFn<R>)>) -> MonitorResult<Self> {
        cfg.validate()?;
        if categories.is_empty() {
            return Err(ConfigError::NoCategories.into());
        }

        let mut seen = HashSet::with_capacity(categories.len());
        for (category, _) in &categories {
            if category.as_str().trim().is_empty() {
                return Err(ConfigError::EmptyCategoryName.into());
            }
            if !seen.insert(category.clone()) {
                return Err(ConfigError::DuplicateCategory {
                    category: category.clone(),
                }
                .into());
            }
        }

        let categories = categories
            .into_iter()
            .map(|(category, poll)| CategorySlot {
                poll,
                tracker: CategoryTracker::new(category),
            })
            .collect();

        Ok(Self {
            cfg,
            categories,
            dispatcher: Arc::new(Dispatcher::new()),
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &MonitorConfig {
        &self.cfg
    }

    /// Configured categories in polling order.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().map(|slot| slot.tracker.category())
    }

    /// Read access to one category's tracker.
    #[must_use]
    pub fn tracker(&self, category: &Category) -> Option<&CategoryTracker<R>> {
        self.categories
            .iter()
            .map(|slot| &slot.tracker)
            .find(|t| t.category() == category)
    }

    /// Shared listener registry.
    #[must_use]
    pub fn dispatcher(&self) -> Arc<Dispatcher<R>> {
        Arc::clone(&self.dispatcher)
    }

    /// Subscribes a bounded stream sized by `stream_capacity`.
    #[must_use]
    pub fn subscribe(&self) -> TransitionStream<R> {
        self.dispatcher.subscribe(self.cfg.stream_capacity)
    }

    /// Wraps the monitor in an internal mutex so several threads may poll it.
    #[must_use]
    pub fn into_shared(self) -> SharedMonitor<R> {
        SharedMonitor::new(self)
    }

    /// Polls every category and emits the resulting transitions.
    ///
    /// For each category in registration order: call its poll function,
    /// reconcile the result, then emit all exits followed by all enters.
    ///
    /// A failed poll leaves that category's tracked set untouched. Under
    /// [`FailurePolicy::Continue`] the remaining categories are still polled and
    /// the first poll error is returned at the end; under
    /// [`FailurePolicy::Abort`] the error is returned immediately.
    ///
    /// A listener failure always aborts the call: the category's tracker has
    /// already been updated, remaining transitions and categories are skipped,
    /// and [`MonitorError::Listener`] is returned. Poll errors collected
    /// earlier in the same call travel with it in `prior_poll_errors`.
    pub fn check_updates(&mut self) -> MonitorResult<CheckSummary> {
        let mut summary = CheckSummary::default();
        let mut poll_failures: Vec<(Category, PollError)> = Vec::new();

        for slot in &mut self.categories {
            let category = slot.tracker.category().clone();

            let observed = match (slot.poll)() {
                Ok(observed) => observed,
                Err(source) => {
                    summary.failed += 1;
                    warn!(
                        category = %category,
                        error = %source,
                        "Poll failed; tracked set left unchanged"
                    );
                    match self.cfg.poll_failure_policy {
                        FailurePolicy::Abort => return Err(MonitorError::Poll { category, source }),
                        FailurePolicy::Continue => {
                            poll_failures.push((category, source));
                            continue;
                        }
                    }
                }
            };

            summary.polled += 1;
            let reconciliation = slot.tracker.reconcile(observed);
            summary.entered += reconciliation.entered.len();
            summary.exited += reconciliation.exited.len();

            for event in reconciliation.into_events(&category) {
                debug!(
                    category = %category,
                    direction = %event.direction,
                    resource = ?event.resource,
                    "Transition"
                );
                self.dispatcher
                    .emit(&event)
                    .map_err(|e| MonitorError::Listener {
                        category: category.clone(),
                        listener: e.listener,
                        source: e.source,
                        prior_poll_errors: std::mem::take(&mut poll_failures),
                    })?;
            }
        }

        debug!(
            polled = summary.polled,
            failed = summary.failed,
            entered = summary.entered,
            exited = summary.exited,
            "Check complete"
        );

        match poll_failures.into_iter().next() {
            Some((category, source)) => Err(MonitorError::Poll { category, source }),
            None => Ok(summary),
        }
    }

    /// Lifecycle state of one category.
    #[must_use]
    pub fn state(&self, category: &Category) -> Option<TrackerState> {
        self.tracker(category).map(CategoryTracker::state)
    }
}

impl<R: ResourceIdentity> fmt::Debug for Monitor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("cfg", &self.cfg)
            .field(
                "categories",
                &self
                    .categories
                    .iter()
                    .map(|slot| (slot.tracker.category(), slot.tracker.len()))
                    .collect::<Vec<_>>(),
            )
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

/// Builder for [`Monitor`].
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use edgemon::{Category, Monitor};
///
/// let mut monitor = Monitor::builder()
///     .category(Category::SLOW_CONSUMER, || Ok(HashSet::from(["c1".to_string()])))
///     .build()
///     .unwrap();
///
/// let summary = monitor.check_updates().unwrap();
/// assert_eq!(summary.entered, 1);
/// ```
pub struct MonitorBuilder<R: ResourceIdentity> {
    cfg: MonitorConfig,
    categories: Vec<(Category, PollFn<R>)>,
}

impl<R: ResourceIdentity> MonitorBuilder<R> {
    /// Creates an empty builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cfg: MonitorConfig::default(),
            categories: Vec::new(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn config(mut self, cfg: MonitorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the poll failure policy.
    #[must_use]
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.cfg.poll_failure_policy = policy;
        self
    }

    /// Adds a category polled after those already added.
    #[must_use]
    pub fn category<F>(self, category: Category, poll: F) -> Self
    where
        F: FnMut() -> Result<HashSet<R>, PollError> + Send + 'static,
    {
        self.boxed_category(category, Box::new(poll))
    }

    /// Adds a category with an already boxed poll function.
    #[must_use]
    pub fn boxed_category(mut self, category: Category, poll: PollFn<R>) -> Self {
        self.categories.push((category, poll));
        self
    }

    /// Validates the configuration and builds the monitor.
    pub fn build(self) -> MonitorResult<Monitor<R>> {
        Monitor::new(self.cfg, self.categories)
    }
}

impl<R: ResourceIdentity> Default for MonitorBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`Monitor`] behind a mutex, pollable from any thread.
pub struct SharedMonitor<R: ResourceIdentity> {
    inner: Arc<Mutex<Monitor<R>>>,
    dispatcher: Arc<Dispatcher<R>>,
}

impl<R: ResourceIdentity> SharedMonitor<R> {
    /// Wraps `monitor`.
    #[must_use]
    pub fn new(monitor: Monitor<R>) -> Self {
        let dispatcher = monitor.dispatcher();
        Self {
            inner: Arc::new(Mutex::new(monitor)),
            dispatcher,
        }
    }

    /// Serialized [`Monitor::check_updates`].
    pub fn check_updates(&self) -> MonitorResult<CheckSummary> {
        self.inner
            .lock()
            .map_err(|_| MonitorError::internal("monitor lock poisoned"))?
            .check_updates()
    }

    /// Runs `f` with exclusive access to the monitor.
    pub fn with<T>(&self, f: impl FnOnce(&mut Monitor<R>) -> T) -> MonitorResult<T> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| MonitorError::internal("monitor lock poisoned"))?;
        Ok(f(&mut guard))
    }

    /// Listener registry; does not take the monitor lock.
    #[must_use]
    pub fn dispatcher(&self) -> Arc<Dispatcher<R>> {
        Arc::clone(&self.dispatcher)
    }
}

impl<R: ResourceIdentity> Clone for SharedMonitor<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

impl<R: ResourceIdentity> fmt::Debug for SharedMonitor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedMonitor")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::category::Direction;
    use crate::error::ListenerError;
    use crate::event::TransitionEvent;

    type Script = Arc<Mutex<Vec<Result<HashSet<&'static str>, PollError>>>>;

    /// Poll function that replays a script, one entry per call.
    fn scripted(steps: Vec<Result<Vec<&'static str>, PollError>>) -> (Script, PollFn<&'static str>) {
        let script: Script = Arc::new(Mutex::new(
            steps
                .into_iter()
                .rev()
                .map(|s| s.map(|v| v.into_iter().collect()))
                .collect(),
        ));
        let handle = Arc::clone(&script);
        let poll: PollFn<&'static str> = Box::new(move || {
            handle
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(PollError::query("script exhausted")))
        });
        (script, poll)
    }

    fn record_events(monitor: &Monitor<&'static str>) -> Arc<Mutex<Vec<(Category, Direction, &'static str)>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        monitor.dispatcher().add_fn(move |e: &TransitionEvent<&'static str>| {
            sink.lock()
                .unwrap()
                .push((e.category.clone(), e.direction, e.resource));
            Ok(())
        });
        log
    }

    fn set(items: &[&'static str]) -> HashSet<&'static str> {
        items.iter().copied().collect()
    }

    #[test]
    fn test_build_rejects_empty() {
        let err = Monitor::<&'static str>::builder().build().unwrap_err();
        assert!(matches!(err, MonitorError::Config(ConfigError::NoCategories)));
    }

    #[test]
    fn test_build_rejects_duplicate_category() {
        let err = Monitor::<&'static str>::builder()
            .category(Category::SLOW_CONSUMER, || Ok(HashSet::new()))
            .category(Category::SLOW_CONSUMER, || Ok(HashSet::new()))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            MonitorError::Config(ConfigError::DuplicateCategory { .. })
        ));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let cfg = MonitorConfig {
            stream_capacity: 0,
            ..MonitorConfig::default()
        };
        let err = Monitor::<&'static str>::builder()
            .config(cfg)
            .category(Category::SLOW_CONSUMER, || Ok(HashSet::new()))
            .build()
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_build_does_not_poll() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let monitor = Monitor::builder()
            .category(Category::SLOW_CONSUMER, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(HashSet::from(["a"]))
            })
            .build()
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(monitor.state(&Category::SLOW_CONSUMER), Some(TrackerState::Uninitialized));
    }

    #[test]
    fn test_slow_consumer_scenario() {
        let (_script, poll) = scripted(vec![
            Ok(vec!["r1"]),
            Ok(vec!["r1"]),
            Ok(vec![]),
            Ok(vec!["r2", "r3"]),
        ]);
        let mut monitor = Monitor::builder()
            .boxed_category(Category::SLOW_CONSUMER, poll)
            .build()
            .unwrap();
        let log = record_events(&monitor);

        monitor.check_updates().unwrap();
        assert_eq!(
            log.lock().unwrap().drain(..).collect::<Vec<_>>(),
            vec![(Category::SLOW_CONSUMER, Direction::Enter, "r1")]
        );
        assert_eq!(monitor.state(&Category::SLOW_CONSUMER), Some(TrackerState::Tracking));

        let summary = monitor.check_updates().unwrap();
        assert!(summary.is_quiet());
        assert!(log.lock().unwrap().is_empty());

        monitor.check_updates().unwrap();
        assert_eq!(
            log.lock().unwrap().drain(..).collect::<Vec<_>>(),
            vec![(Category::SLOW_CONSUMER, Direction::Exit, "r1")]
        );

        let summary = monitor.check_updates().unwrap();
        assert_eq!(summary.entered, 2);
        let entered: HashSet<_> = log
            .lock()
            .unwrap()
            .iter()
            .inspect(|(_, d, _)| assert_eq!(*d, Direction::Enter))
            .map(|(_, _, r)| *r)
            .collect();
        assert_eq!(entered, set(&["r2", "r3"]));
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_exits_emitted_before_enters() {
        let (_script, poll) = scripted(vec![Ok(vec!["a", "b"]), Ok(vec!["c", "d"])]);
        let mut monitor = Monitor::builder()
            .boxed_category(Category::SLOW_CONSUMER, poll)
            .build()
            .unwrap();
        monitor.check_updates().unwrap();
        let log = record_events(&monitor);

        monitor.check_updates().unwrap();
        let directions: Vec<Direction> = log.lock().unwrap().iter().map(|(_, d, _)| *d).collect();
        assert_eq!(
            directions,
            vec![Direction::Exit, Direction::Exit, Direction::Enter, Direction::Enter]
        );
    }

    #[test]
    fn test_categories_polled_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (o1, o2) = (Arc::clone(&order), Arc::clone(&order));
        let mut monitor = Monitor::builder()
            .category(Category::PRODUCER_BLOCKED, move || {
                o1.lock().unwrap().push("producers");
                Ok(HashSet::from(["p"]))
            })
            .category(Category::SLOW_CONSUMER, move || {
                o2.lock().unwrap().push("consumers");
                Ok(HashSet::from(["c"]))
            })
            .build()
            .unwrap();
        let log = record_events(&monitor);

        monitor.check_updates().unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["producers", "consumers"]);
        let categories: Vec<Category> = log.lock().unwrap().iter().map(|(c, _, _)| c.clone()).collect();
        assert_eq!(categories, vec![Category::PRODUCER_BLOCKED, Category::SLOW_CONSUMER]);
        assert_eq!(
            monitor.categories().cloned().collect::<Vec<_>>(),
            vec![Category::PRODUCER_BLOCKED, Category::SLOW_CONSUMER]
        );
    }

    #[test]
    fn test_poll_failure_continue_isolates_category() {
        let (_a, poll_a) = scripted(vec![
            Ok(vec!["a1"]),
            Err(PollError::connection("refused")),
        ]);
        let (_b, poll_b) = scripted(vec![Ok(vec!["b1"]), Ok(vec!["b2"])]);
        let mut monitor = Monitor::builder()
            .boxed_category(Category::SLOW_CONSUMER, poll_a)
            .boxed_category(Category::PRODUCER_BLOCKED, poll_b)
            .build()
            .unwrap();
        monitor.check_updates().unwrap();
        let before = monitor.tracker(&Category::SLOW_CONSUMER).unwrap().current().clone();
        let log = record_events(&monitor);

        let err = monitor.check_updates().unwrap_err();

        assert!(err.is_poll());
        assert_eq!(err.category(), Some(&Category::SLOW_CONSUMER));
        assert_eq!(monitor.tracker(&Category::SLOW_CONSUMER).unwrap().current(), &before);
        assert_eq!(
            monitor.tracker(&Category::PRODUCER_BLOCKED).unwrap().current(),
            &set(&["b2"])
        );
        let events = log.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                (Category::PRODUCER_BLOCKED, Direction::Exit, "b1"),
                (Category::PRODUCER_BLOCKED, Direction::Enter, "b2"),
            ]
        );
    }

    #[test]
    fn test_poll_failure_abort_skips_later_categories() {
        let (_a, poll_a) = scripted(vec![Err(PollError::query("bad"))]);
        let (b_script, poll_b) = scripted(vec![Ok(vec!["b1"])]);
        let mut monitor = Monitor::builder()
            .failure_policy(FailurePolicy::Abort)
            .boxed_category(Category::SLOW_CONSUMER, poll_a)
            .boxed_category(Category::PRODUCER_BLOCKED, poll_b)
            .build()
            .unwrap();

        let err = monitor.check_updates().unwrap_err();

        assert_eq!(err.category(), Some(&Category::SLOW_CONSUMER));
        assert_eq!(b_script.lock().unwrap().len(), 1, "second category must not be polled");
        assert_eq!(
            monitor.state(&Category::PRODUCER_BLOCKED),
            Some(TrackerState::Uninitialized)
        );
    }

    #[test]
    fn test_failed_first_poll_stays_uninitialized_then_enters() {
        let (_a, poll) = scripted(vec![Err(PollError::Timeout { duration_ms: 50 }), Ok(vec!["x"])]);
        let mut monitor = Monitor::builder()
            .boxed_category(Category::SLOW_CONSUMER, poll)
            .build()
            .unwrap();
        let log = record_events(&monitor);

        assert!(monitor.check_updates().unwrap_err().is_retryable());
        assert_eq!(monitor.state(&Category::SLOW_CONSUMER), Some(TrackerState::Uninitialized));

        monitor.check_updates().unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec![(Category::SLOW_CONSUMER, Direction::Enter, "x")]
        );
    }

    #[test]
    fn test_listener_failure_aborts_batch_but_commits_state() {
        let (_a, poll_a) = scripted(vec![Ok(vec!["a1"])]);
        let (b_script, poll_b) = scripted(vec![Ok(vec!["b1"])]);
        let mut monitor = Monitor::builder()
            .boxed_category(Category::SLOW_CONSUMER, poll_a)
            .boxed_category(Category::PRODUCER_BLOCKED, poll_b)
            .build()
            .unwrap();
        let failing = monitor
            .dispatcher()
            .add_fn(|_: &TransitionEvent<&'static str>| Err(ListenerError::failed("sink down")));

        let err = monitor.check_updates().unwrap_err();

        match err {
            MonitorError::Listener { category, listener, .. } => {
                assert_eq!(category, Category::SLOW_CONSUMER);
                assert_eq!(listener, failing);
            }
            other => panic!("expected listener error, got {other:?}"),
        }
        assert!(monitor.tracker(&Category::SLOW_CONSUMER).unwrap().contains(&"a1"));
        assert_eq!(b_script.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_listener_failure_keeps_earlier_poll_error() {
        let (_a, poll_a) = scripted(vec![Err(PollError::connection("refused"))]);
        let (_b, poll_b) = scripted(vec![Ok(vec!["p1"])]);
        let mut monitor = Monitor::builder()
            .boxed_category(Category::SLOW_CONSUMER, poll_a)
            .boxed_category(Category::PRODUCER_BLOCKED, poll_b)
            .build()
            .unwrap();
        monitor
            .dispatcher()
            .add_fn(|_: &TransitionEvent<&'static str>| Err(ListenerError::failed("sink down")));

        let err = monitor.check_updates().unwrap_err();

        assert!(err.is_listener());
        assert_eq!(err.category(), Some(&Category::PRODUCER_BLOCKED));
        assert_eq!(
            err.prior_poll_errors(),
            &[(Category::SLOW_CONSUMER, PollError::connection("refused"))]
        );
    }

    #[test]
    fn test_build_rejects_empty_static_category() {
        let err = Monitor::<&'static str>::builder()
            .category(Category::from_static(""), || Ok(HashSet::new()))
            .build()
            .unwrap_err();
        assert!(matches!(err, MonitorError::Config(ConfigError::EmptyCategoryName)));

        let err = Monitor::<&'static str>::builder()
            .category(Category::from_static("  "), || Ok(HashSet::new()))
            .build()
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_subscribe_uses_config_capacity() {
        let mut monitor = Monitor::builder()
            .config(MonitorConfig {
                stream_capacity: 1,
                ..MonitorConfig::default()
            })
            .category(Category::SLOW_CONSUMER, || Ok(HashSet::from(["a", "b"])))
            .build()
            .unwrap();
        let stream = monitor.subscribe();

        monitor.check_updates().unwrap();

        assert_eq!(stream.drain().len(), 1);
        assert_eq!(stream.dropped_events(), 1);
    }

    #[test]
    fn test_shared_monitor_polls_from_threads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let shared = Monitor::builder()
            .category(Category::SLOW_CONSUMER, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(HashSet::from(["a"]))
            })
            .build()
            .unwrap()
            .into_shared();
        let entered = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&entered);
        shared.dispatcher().add_fn(move |_: &TransitionEvent<&'static str>| {
            sink.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let s = shared.clone();
                std::thread::spawn(move || s.check_updates().unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(entered.load(Ordering::SeqCst), 1);
        let len = shared
            .with(|m| m.tracker(&Category::SLOW_CONSUMER).unwrap().len())
            .unwrap();
        assert_eq!(len, 1);
    }
}
