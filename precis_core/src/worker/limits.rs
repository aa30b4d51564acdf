use std::future::Future;
use std::time::Duration;

use crate::error::ExecutorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeLimits {
    pub soft: Duration,
    pub hard: Duration,
}

impl TimeLimits {
    pub fn new(soft: Duration, hard: Duration) -> Self {
        Self { soft, hard }
    }
}

/// Drives `future` to completion, logging once `limits.soft` passes and
/// cancelling it with `ExecutorError::TimedOut` at `limits.hard`.
pub async fn run_with_time_limits<F>(
    limits: TimeLimits,
    label: &str,
    future: F,
) -> Result<F::Output, ExecutorError>
where
    F: Future,
{
    tokio::pin!(future);

    let soft = tokio::time::sleep(limits.soft);
    tokio::pin!(soft);
    let hard = tokio::time::sleep(limits.hard);
    tokio::pin!(hard);

    let mut warned = false;

    loop {
        tokio::select! {
            output = &mut future => return Ok(output),
            _ = &mut soft, if !warned => {
                warned = true;
                log::warn!(
                    "{} passed the soft time limit of {}s",
                    label,
                    limits.soft.as_secs_f64()
                );
            }
            _ = &mut hard => {
                log::error!(
                    "{} hit the hard time limit of {}s and was cancelled",
                    label,
                    limits.hard.as_secs_f64()
                );
                return Err(ExecutorError::TimedOut(limits.hard.as_secs()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(soft_ms: u64, hard_ms: u64) -> TimeLimits {
        TimeLimits::new(Duration::from_millis(soft_ms), Duration::from_millis(hard_ms))
    }

    #[tokio::test]
    async fn test_fast_future_completes() {
        let output = run_with_time_limits(limits(50, 100), "fast", async { 7 }).await;
        assert_eq!(output, Ok(7));
    }

    #[tokio::test]
    async fn test_soft_limit_only_warns() {
        let output = run_with_time_limits(limits(10, 500), "slow", async {
            tokio::time::sleep(Duration::from_millis(40)).await;
            "done"
        })
        .await;

        assert_eq!(output, Ok("done"));
    }

    #[tokio::test]
    async fn test_hard_limit_cancels() {
        let output = run_with_time_limits(limits(10, 30), "stuck", async {
            tokio::time::sleep(Duration::from_secs(10)).await;
        })
        .await;

        assert_eq!(output, Err(ExecutorError::TimedOut(0)));
    }
}
