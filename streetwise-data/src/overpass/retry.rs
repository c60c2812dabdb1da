//! Bounded retry with exponential back-off.

use std::time::Duration;

use log::{info, warn};
use streetwise_core::QueryServiceError;

/// Default number of attempts, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default wait before the second attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// How often and how patiently a failed query is repeated.
///
/// The wait before attempt `n + 1` is `base_delay * 2^(n - 1)`, so the
/// defaults wait 1 s and then 2 s. Only
/// [transient](QueryServiceError::is_transient) failures are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Wait before the second attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

impl RetryPolicy {
    /// Construct a policy.
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// A policy that makes exactly one attempt.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Wait after the failed attempt numbered `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(exponent))
    }

    /// Run `operation` until it succeeds, fails permanently or the attempts
    /// are used up. `sleep` is called with each back-off delay.
    ///
    /// `operation` receives the 1-based attempt number.
    ///
    /// # Errors
    ///
    /// Returns a non-transient error unchanged, or
    /// [`QueryServiceError::RetriesExhausted`] wrapping the last transient
    /// error.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use streetwise_core::QueryServiceError;
    /// use streetwise_data::overpass::RetryPolicy;
    ///
    /// let mut waits = Vec::new();
    /// let result = RetryPolicy::default().run(
    ///     |attempt| {
    ///         if attempt < 3 {
    ///             Err(QueryServiceError::Timeout { url: "u".into(), timeout_secs: 1 })
    ///         } else {
    ///             Ok(attempt)
    ///         }
    ///     },
    ///     |delay| waits.push(delay),
    /// );
    /// assert_eq!(result, Ok(3));
    /// assert_eq!(waits, vec![Duration::from_secs(1), Duration::from_secs(2)]);
    /// ```
    pub fn run<T, F, S>(&self, mut operation: F, mut sleep: S) -> Result<T, QueryServiceError>
    where
        F: FnMut(u32) -> Result<T, QueryServiceError>,
        S: FnMut(Duration),
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation(attempt) {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) if attempt >= max_attempts => {
                    warn!("Attempt {attempt}/{max_attempts} failed: {err}");
                    return Err(QueryServiceError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    warn!("Attempt {attempt}/{max_attempts} failed: {err}");
                    let delay = self.delay_after(attempt);
                    info!("Waiting {delay:?} before retry");
                    sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn timeout() -> QueryServiceError {
        QueryServiceError::Timeout {
            url: "https://overpass.example/api/interpreter".to_owned(),
            timeout_secs: 120,
        }
    }

    #[rstest]
    #[case(1, Duration::from_secs(1))]
    #[case(2, Duration::from_secs(2))]
    #[case(3, Duration::from_secs(4))]
    fn delays_double_each_attempt(#[case] attempt: u32, #[case] expected: Duration) {
        assert_eq!(RetryPolicy::default().delay_after(attempt), expected);
    }

    #[rstest]
    fn first_success_does_not_sleep() {
        let mut waits = Vec::new();
        let result = RetryPolicy::default().run(|_| Ok("ok"), |delay| waits.push(delay));
        assert_eq!(result, Ok("ok"));
        assert!(waits.is_empty());
    }

    #[rstest]
    fn exhausts_after_max_attempts() {
        let mut calls = 0;
        let mut waits = Vec::new();
        let result: Result<(), _> = RetryPolicy::default().run(
            |_| {
                calls += 1;
                Err(timeout())
            },
            |delay| waits.push(delay),
        );

        assert_eq!(calls, 3);
        assert_eq!(waits, vec![Duration::from_secs(1), Duration::from_secs(2)]);
        assert_eq!(
            result,
            Err(QueryServiceError::RetriesExhausted {
                attempts: 3,
                last: Box::new(timeout()),
            })
        );
    }

    #[rstest]
    fn permanent_failures_are_not_retried() {
        let mut calls = 0;
        let malformed = QueryServiceError::MalformedPayload {
            message: "expected value".to_owned(),
        };
        let result: Result<(), _> = RetryPolicy::default().run(
            |_| {
                calls += 1;
                Err(malformed.clone())
            },
            |_| panic!("must not sleep"),
        );
        assert_eq!(calls, 1);
        assert_eq!(result, Err(malformed));
    }

    #[rstest]
    fn zero_attempts_still_tries_once() {
        let mut calls = 0;
        let result: Result<(), _> = RetryPolicy::new(0, Duration::ZERO).run(
            |_| {
                calls += 1;
                Err(timeout())
            },
            |_| {},
        );
        assert_eq!(calls, 1);
        assert!(matches!(
            result,
            Err(QueryServiceError::RetriesExhausted { attempts: 1, .. })
        ));
    }
}
