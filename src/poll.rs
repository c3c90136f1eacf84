//! Bounded waiting for objects Shippo processes asynchronously.
//!
//! Shipments generate their rates and transactions generate their labels in
//! the background. While an object's status is `QUEUED` or `WAITING` it is
//! still in flight; any other status is terminal. [`Poller`] re-fetches the
//! object until it is terminal or the deadline passes, sleeping between
//! fetches according to a [`PollBackoff`].
//!
//! The deadline is checked before every fetch, so no request is issued once
//! it has passed.

use crate::{Error, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Delay schedule between two poll fetches.
///
/// Delays are always clamped to the time left before the deadline.
///
/// # Examples
///
/// ```
/// use shippo::PollBackoff;
/// use std::time::Duration;
///
/// let backoff = PollBackoff::Exponential {
///     initial_delay: Duration::from_millis(200),
///     max_delay: Duration::from_secs(1),
///     jitter: false,
/// };
///
/// assert_eq!(backoff.delay_for_iteration(1), Duration::from_millis(200));
/// assert_eq!(backoff.delay_for_iteration(2), Duration::from_millis(400));
/// assert_eq!(backoff.delay_for_iteration(4), Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum PollBackoff {
    /// Fetch again immediately.
    None,

    /// Wait the same amount before every fetch.
    Fixed(Duration),

    /// Wait `initial_delay * 2^(iteration - 1)`, capped at `max_delay`.
    Exponential {
        /// Delay before the first re-fetch.
        initial_delay: Duration,
        /// Upper bound for any single delay.
        max_delay: Duration,
        /// Scale each delay by a random factor between 0.5 and 1.0.
        jitter: bool,
    },
}

impl Default for PollBackoff {
    fn default() -> Self {
        PollBackoff::Exponential {
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
            jitter: true,
        }
    }
}

impl PollBackoff {
    /// Returns the delay before the given re-fetch (1-indexed).
    pub fn delay_for_iteration(&self, iteration: usize) -> Duration {
        match self {
            PollBackoff::None => Duration::ZERO,
            PollBackoff::Fixed(delay) => *delay,
            PollBackoff::Exponential {
                initial_delay,
                max_delay,
                jitter,
            } => {
                let multiplier = 2u32.saturating_pow(iteration.saturating_sub(1) as u32);
                let delay = initial_delay.saturating_mul(multiplier).min(*max_delay);

                if *jitter {
                    let factor = rand::thread_rng().gen_range(0.5..=1.0);
                    delay.mul_f64(factor)
                } else {
                    delay
                }
            }
        }
    }
}

/// Whether an object still needs polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingState {
    /// The status is `QUEUED` or `WAITING`.
    InFlight,
    /// Any other status, including a missing one.
    Done,
}

impl ProcessingState {
    /// Classifies a status string, ignoring ASCII case.
    pub fn of(status: Option<&str>) -> Self {
        match status {
            Some(s) if s.eq_ignore_ascii_case("QUEUED") || s.eq_ignore_ascii_case("WAITING") => {
                ProcessingState::InFlight
            }
            _ => ProcessingState::Done,
        }
    }

    /// Returns `true` while the object is still being processed.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, ProcessingState::InFlight)
    }
}

/// An object whose processing status can be polled.
pub trait Pollable {
    /// The current processing status as reported by the API.
    fn processing_status(&self) -> Option<&str>;

    /// The object's id, used in timeout errors.
    fn object_id(&self) -> Option<&str>;

    /// The processing state derived from [`Pollable::processing_status`].
    fn processing_state(&self) -> ProcessingState {
        ProcessingState::of(self.processing_status())
    }
}

/// The instant after which no more fetches are issued.
#[derive(Debug, Clone, Copy)]
pub struct PollDeadline {
    started: Instant,
    timeout: Duration,
}

impl PollDeadline {
    /// Starts the clock now.
    pub fn start(timeout: Duration) -> Self {
        Self {
            started: Instant::now(),
            timeout,
        }
    }

    /// Time since the deadline was started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Returns `true` once the elapsed time has reached the timeout.
    pub fn expired(&self) -> bool {
        self.elapsed() >= self.timeout
    }

    /// Time left before expiry, zero if already expired.
    pub fn remaining(&self) -> Duration {
        self.timeout.saturating_sub(self.elapsed())
    }
}

/// Re-fetches an object until it leaves the in-flight states.
///
/// # Examples
///
/// ```
/// use shippo::{Pollable, Poller, PollBackoff};
/// use std::time::Duration;
///
/// struct Job(&'static str);
///
/// impl Pollable for Job {
///     fn processing_status(&self) -> Option<&str> { Some(self.0) }
///     fn object_id(&self) -> Option<&str> { Some("job_1") }
/// }
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let poller = Poller::new("processing", "job", Duration::from_secs(5))
///     .backoff(PollBackoff::None);
///
/// let mut statuses = vec!["SUCCESS", "WAITING"];
/// let job = poller
///     .run(Job("QUEUED"), || {
///         let next = statuses.pop().unwrap();
///         async move { Ok::<_, shippo::Error>(Job(next)) }
///     })
///     .await
///     .unwrap();
///
/// assert_eq!(job.0, "SUCCESS");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Poller {
    operation: &'static str,
    resource: &'static str,
    timeout: Duration,
    backoff: PollBackoff,
}

impl Poller {
    /// Creates a poller; `operation` and `resource` only feed the timeout error.
    pub fn new(operation: &'static str, resource: &'static str, timeout: Duration) -> Self {
        Self {
            operation,
            resource,
            timeout,
            backoff: PollBackoff::default(),
        }
    }

    /// Sets the delay schedule between fetches.
    pub fn backoff(mut self, backoff: PollBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Polls starting from `initial`, the result of the first fetch.
    ///
    /// Returns the first terminal object. Fails with
    /// [`Error::RequestTimeout`] once the timeout has elapsed, and passes any
    /// fetch error straight through.
    pub async fn run<T, F, Fut>(&self, initial: T, mut fetch: F) -> Result<T>
    where
        T: Pollable,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let deadline = PollDeadline::start(self.timeout);
        let mut current = initial;
        let mut iteration = 0;

        while current.processing_state().is_in_flight() {
            iteration += 1;

            let delay = self
                .backoff
                .delay_for_iteration(iteration)
                .min(deadline.remaining());
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            if deadline.expired() {
                let object_id = current.object_id().unwrap_or_default().to_string();
                tracing::warn!(
                    operation = self.operation,
                    resource = self.resource,
                    object_id = %object_id,
                    iterations = iteration,
                    timeout_ms = self.timeout.as_millis(),
                    "Gave up waiting for asynchronous processing"
                );
                return Err(Error::RequestTimeout {
                    operation: self.operation,
                    resource: self.resource,
                    object_id,
                    waited: deadline.elapsed(),
                });
            }

            tracing::debug!(
                operation = self.operation,
                resource = self.resource,
                status = current.processing_status().unwrap_or_default(),
                iteration = iteration,
                "Still processing, fetching again"
            );

            current = fetch().await?;
        }

        Ok(current)
    }
}
