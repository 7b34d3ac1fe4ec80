//! Bounded retries with exponential backoff
//!
//! Only errors that report [`RepoError::is_retryable`] are attempted again.
//! Not-found answers are outcomes, not errors, so they are never retried.

use std::time::Duration;

use crate::error::{RepoError, Result};
use crate::request::ResolverTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn from_tuning(tuning: &ResolverTuning) -> Self {
        Self::new(tuning.max_attempts, tuning.backoff)
    }

    /// Delay before attempt `attempt + 1`
    fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.backoff.saturating_mul(factor)
    }

    /// Runs `op` until it succeeds, fails permanently or runs out of attempts
    pub fn run<T, F>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay(attempt);
                    tracing::warn!(
                        target_resource = what,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "transient failure, retrying"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(exhausted(err, attempt)),
            }
        }
    }
}

fn exhausted(err: RepoError, attempts: u32) -> RepoError {
    match err {
        RepoError::TransportError { url, reason } if attempts > 1 => RepoError::TransportError {
            url,
            reason: format!("{reason} (gave up after {attempts} attempts)"),
        },
        other => other,
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_tuning(&ResolverTuning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::resolve;
    use std::cell::Cell;

    fn instant(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::ZERO)
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let calls = Cell::new(0);
        let result = instant(3).run("http://repo/a.pom", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(resolve::transport("http://repo/a.pom", "503"))
            } else {
                Ok("pom")
            }
        });
        assert_eq!(result.unwrap(), "pom");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let calls = Cell::new(0);
        let result: Result<()> = instant(3).run("http://repo/a.pom", || {
            calls.set(calls.get() + 1);
            Err(resolve::transport("http://repo/a.pom", "503"))
        });
        assert_eq!(calls.get(), 3);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("gave up after 3 attempts"));
    }

    #[test]
    fn test_permanent_errors_are_not_retried() {
        let calls = Cell::new(0);
        let result: Result<()> = instant(5).run("g:a:jar:1", || {
            calls.set(calls.get() + 1);
            Err(resolve::not_found("g:a:jar:1", "missing"))
        });
        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(RepoError::ArtifactNotFound { .. })));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::new(4, Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(100));
        assert_eq!(policy.delay(2), Duration::from_millis(200));
        assert_eq!(policy.delay(3), Duration::from_millis(400));
    }
}
