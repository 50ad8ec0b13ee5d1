//! Wait Mechanisms
//!
//! Decouples "what must become true" ([`WaitCondition`]) from "how long we
//! poll for it" ([`WaitOptions`]).
//!
//! Both [`wait`] and [`wait_any`] run an explicit polling loop on the tokio
//! clock: every tick evaluates the conditions in order, then suspends with
//! `tokio::time::sleep`, so other tasks keep running between attempts. A
//! check that fails (element absent, ambiguous during a re-render, driver
//! hiccup mid-navigation) counts as "not yet true" for that tick.

use crate::element::ElementHandle;
use crate::result::{PagewrightError, PagewrightResult};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration (at least 1ms so every tick yields)
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

// =============================================================================
// WAIT CONDITION
// =============================================================================

type CheckFn = dyn Fn() -> BoxFuture<'static, PagewrightResult<bool>> + Send + Sync;
type DescribeFn = dyn Fn() -> String + Send + Sync;

/// A stateless asynchronous predicate with a description for diagnostics.
///
/// Cheap to clone; each evaluation starts from scratch.
#[derive(Clone)]
pub struct WaitCondition {
    describe: Arc<DescribeFn>,
    check: Arc<CheckFn>,
}

impl fmt::Debug for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitCondition")
            .field("description", &self.description())
            .finish_non_exhaustive()
    }
}

impl WaitCondition {
    /// Create a condition from an async check
    pub fn new<F, Fut>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PagewrightResult<bool>> + Send + 'static,
    {
        let description = description.into();
        Self {
            describe: Arc::new(move || description.clone()),
            check: Arc::new(move || check().boxed()),
        }
    }

    /// Replace the description
    #[must_use]
    pub fn with_description(self, description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            describe: Arc::new(move || description.clone()),
            check: self.check,
        }
    }

    /// Description computed at call time, so deferred targets can name
    /// fields that did not exist when the condition was built
    fn with_lazy_description(self, describe: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self {
            describe: Arc::new(describe),
            check: self.check,
        }
    }

    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> String {
        (self.describe)()
    }

    /// Evaluate the condition once
    pub async fn check(&self) -> PagewrightResult<bool> {
        (self.check)().await
    }

    /// Condition that holds while this one does not.
    ///
    /// Errors stay errors: a failing check is "not yet decided", not "false".
    #[must_use]
    pub fn not(self) -> Self {
        let inner = self.check;
        let describe = self.describe;
        Self {
            describe: Arc::new(move || format!("not ({})", describe())),
            check: Arc::new(move || {
                let fut = inner();
                async move { fut.await.map(|v| !v) }.boxed()
            }),
        }
    }

    /// Condition that holds when both hold; `other` is only evaluated once
    /// `self` is true
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let (first, second) = (self.check, other.check);
        let (left, right) = (self.describe, other.describe);
        Self {
            describe: Arc::new(move || format!("{} and {}", left(), right())),
            check: Arc::new(move || {
                let first = Arc::clone(&first);
                let second = Arc::clone(&second);
                async move { Ok::<_, PagewrightError>(first().await? && second().await?) }.boxed()
            }),
        }
    }
}

/// Build a condition from an arbitrary async boolean check
pub fn condition<F, Fut>(description: impl Into<String>, check: F) -> WaitCondition
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = PagewrightResult<bool>> + Send + 'static,
{
    WaitCondition::new(description, check)
}

/// Condition holding once the element returned by `locator` is visible.
///
/// `locator` is called on every evaluation, never at construction, so the
/// condition may be declared before the field it points at is assigned.
pub fn element_is_visible<F>(locator: F) -> WaitCondition
where
    F: Fn() -> ElementHandle + Send + Sync + 'static,
{
    let locator = Arc::new(locator);
    let describe = Arc::clone(&locator);
    WaitCondition::new("element to be visible", move || {
        let handle = locator();
        async move { handle.is_visible().await }
    })
    .with_lazy_description(move || format!("element {} to be visible", describe().describe()))
}

/// Condition holding once the element returned by `locator` is hidden or gone
pub fn element_is_hidden<F>(locator: F) -> WaitCondition
where
    F: Fn() -> ElementHandle + Send + Sync + 'static,
{
    let locator = Arc::new(locator);
    let describe = Arc::clone(&locator);
    element_is_visible(move || locator())
        .not()
        .with_lazy_description(move || format!("element {} to be hidden", describe().describe()))
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

/// Result of a successful race: which condition won
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceResult {
    /// Position of the winning condition in the input
    pub index: usize,
    /// Description of the winning condition
    pub waited_for: String,
    /// Time spent waiting
    pub elapsed: Duration,
}

impl RaceResult {
    /// Whether the condition at `index` won
    #[must_use]
    pub const fn is(&self, index: usize) -> bool {
        self.index == index
    }
}

impl From<RaceResult> for WaitResult {
    fn from(race: RaceResult) -> Self {
        Self {
            elapsed: race.elapsed,
            waited_for: race.waited_for,
        }
    }
}

// =============================================================================
// POLLING
// =============================================================================

fn describe_all(conditions: &[WaitCondition]) -> String {
    conditions
        .iter()
        .map(WaitCondition::description)
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Poll `condition` until it holds or `options.timeout` elapses
pub async fn wait(condition: &WaitCondition, options: &WaitOptions) -> PagewrightResult<WaitResult> {
    poll(std::slice::from_ref(condition), options)
        .await
        .map(WaitResult::from)
}

/// Poll `conditions` in order until one holds.
///
/// On each tick the lowest-index true condition wins; the race is decided
/// by evaluation order, never by I/O timing. Times out only if every
/// condition stayed false.
pub async fn wait_any(
    conditions: &[WaitCondition],
    options: &WaitOptions,
) -> PagewrightResult<RaceResult> {
    if conditions.is_empty() {
        return Err(PagewrightError::invalid_argument(
            "wait_any needs at least one condition",
        ));
    }
    poll(conditions, options).await
}

async fn poll(conditions: &[WaitCondition], options: &WaitOptions) -> PagewrightResult<RaceResult> {
    let start = Instant::now();
    let timeout = options.timeout();
    let mut last_error = None;
    let mut ticks: u64 = 0;

    loop {
        ticks += 1;
        for (index, condition) in conditions.iter().enumerate() {
            match condition.check().await {
                Ok(true) => {
                    let elapsed = start.elapsed();
                    let waited_for = condition.description();
                    tracing::debug!(
                        condition = %waited_for,
                        index,
                        ticks,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "wait satisfied"
                    );
                    return Ok(RaceResult {
                        index,
                        waited_for,
                        elapsed,
                    });
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::trace!(index, error = %err, "condition not ready");
                    last_error = Some(err.to_string());
                }
            }
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            let condition = describe_all(conditions);
            tracing::warn!(
                condition = %condition,
                ticks,
                timeout_ms = options.timeout_ms,
                "wait timed out"
            );
            return Err(PagewrightError::WaitTimeout {
                condition,
                timeout_ms: options.timeout_ms,
                last_error,
            });
        }

        tokio::time::sleep(options.poll_interval().min(timeout - elapsed)).await;
    }
}

// =============================================================================
// TESTS
// =============================================================================
