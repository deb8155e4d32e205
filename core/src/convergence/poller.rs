//! The convergence poller.
//!
//! Re-issues a describe-style command through `AwsCli` until a probe over
//! the result reports `Ready`. A probe error or a failed describe call aborts
//! immediately; only `Probe::Pending` drives another round.
//!
//! ```text
//! Polling ──probe Ready──────────▶ Satisfied
//!    │ ──elapsed >= max wait─────▶ TimedOut   (AwsError::PollTimeout)
//!    └──describe/probe error─────▶ Aborted    (error propagated)
//! ```

use std::time::Duration;

use tracing::{debug, info};

use crate::aws::{AwsCli, Suppress};
use crate::convergence::policy::{PollPolicy, PollState};
use crate::error::{AwsError, Result};
use crate::infrastructure::runner::ProcessRunner;
use crate::infrastructure::sleeper::{Sleeper, ThreadSleeper};
use crate::types::command::Command;
use crate::types::result::CommandResult;

/// What a probe concluded about one describe result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Ready(T),
    /// Expected intermediate state; check again after the interval.
    Pending,
}

impl Probe<()> {
    pub fn from_bool(ready: bool) -> Self {
        if ready {
            Probe::Ready(())
        } else {
            Probe::Pending
        }
    }
}

impl<T> From<Option<T>> for Probe<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Probe::Ready(v),
            None => Probe::Pending,
        }
    }
}

/// A satisfied poll: the probe's value, the result it was read from, and
/// the loop's totals at that point.
#[derive(Debug, Clone)]
pub struct Polled<T> {
    pub value: T,
    pub result: CommandResult,
    pub elapsed: Duration,
    pub iterations: u32,
}


pub struct Poller<S: Sleeper = ThreadSleeper> {
    policy: PollPolicy,
    sleeper: S,
}

impl Poller<ThreadSleeper> {
    pub fn new(policy: PollPolicy) -> Self {
        Poller {
            policy,
            sleeper: ThreadSleeper,
        }
    }
}

impl<S: Sleeper> Poller<S> {
    pub fn with_sleeper(policy: PollPolicy, sleeper: S) -> Self {
        Poller { policy, sleeper }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Poll with a fresh budget.
    pub fn poll<R, T, F>(
        &self,
        aws: &AwsCli<R>,
        cmd: &Command,
        label: &str,
        probe: F,
    ) -> Result<Polled<T>>
    where
        R: ProcessRunner,
        F: FnMut(&CommandResult) -> Result<Probe<T>>,
    {
        let mut state = PollState::new();
        self.poll_with_state(&mut state, aws, cmd, label, probe)
    }

    /// Poll against an existing budget, so several consecutive waits can
    /// share one maximum.
    pub fn poll_with_state<R, T, F>(
        &self,
        state: &mut PollState,
        aws: &AwsCli<R>,
        cmd: &Command,
        label: &str,
        mut probe: F,
    ) -> Result<Polled<T>>
    where
        R: ProcessRunner,
        F: FnMut(&CommandResult) -> Result<Probe<T>>,
    {
        loop {
            let result = aws.run(cmd, Suppress::No)?;
            state.record_check();

            if let Probe::Ready(value) = probe(&result)? {
                debug!(
                    label,
                    elapsed_secs = state.elapsed().as_secs(),
                    iterations = state.iterations(),
                    "condition satisfied"
                );
                return Ok(Polled {
                    value,
                    result,
                    elapsed: state.elapsed(),
                    iterations: state.iterations(),
                });
            }

            if self.policy.is_exhausted(state.elapsed()) {
                return Err(AwsError::PollTimeout {
                    label: label.to_string(),
                    elapsed: state.elapsed(),
                    iterations: state.iterations(),
                });
            }

            info!(
                elapsed_secs = state.elapsed().as_secs(),
                iteration = state.iterations(),
                "{}... (elapsed time: '{}' seconds)",
                label,
                state.elapsed().as_secs()
            );
            self.sleeper.sleep(self.policy.interval());
            state.advance(self.policy.interval());
        }
    }

    /// Boolean form: returns the first result the predicate accepts.
    pub fn wait_until<R, F>(
        &self,
        aws: &AwsCli<R>,
        cmd: &Command,
        label: &str,
        mut predicate: F,
    ) -> Result<CommandResult>
    where
        R: ProcessRunner,
        F: FnMut(&CommandResult) -> bool,
    {
        self.poll(aws, cmd, label, |r| Ok(Probe::from_bool(predicate(r))))
            .map(|p| p.result)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::testing::cli;
    use crate::infrastructure::runner::MockRunner;
    use crate::infrastructure::sleeper::RecordingSleeper;
    use crate::types::result::RawOutput;

    fn poller(interval: u64, max: u64) -> Poller<RecordingSleeper> {
        Poller::with_sleeper(
            PollPolicy::from_secs(interval, max).unwrap(),
            RecordingSleeper::new(),
        )
    }

    #[test]
    fn ready_on_first_check_never_sleeps() {
        let aws = cli(MockRunner::with_stdout(&[r#"{"Functions": []}"#]));
        let p = poller(5, 1800);
        let polled = p
            .poll(&aws, &Command::aws("lambda", "list-functions"), "terminating the lambda", |_| {
                Ok(Probe::Ready(()))
            })
            .unwrap();
        assert_eq!(polled.elapsed, Duration::ZERO);
        assert_eq!(polled.iterations, 1);
        assert!(p.sleeper().sleeps().is_empty());
    }

    #[test]
    fn predicate_runs_before_any_sleep() {
        let aws = cli(MockRunner::new().with_fallback(RawOutput::success("{}")));
        let p = poller(5, 10);
        let mut calls = 0;
        let _ = p.wait_until(&aws, &Command::aws("ec2", "describe-vpcs"), "x", |_| {
            assert_eq!(p.sleeper().sleeps().len(), calls);
            calls += 1;
            false
        });
        assert_eq!(calls, 3);
    }

    #[test]
    fn timeout_on_third_check_at_elapsed_ten() {
        let aws = cli(MockRunner::new().with_fallback(RawOutput::success("{}")));
        let p = poller(5, 10);
        let err = p
            .wait_until(&aws, &Command::aws("rds", "describe-db-instances"), "waiting", |_| false)
            .unwrap_err();
        match err {
            AwsError::PollTimeout { elapsed, iterations, label } => {
                assert_eq!(elapsed, Duration::from_secs(10));
                assert_eq!(iterations, 3);
                assert_eq!(label, "waiting");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(aws.runner().call_count(), 3);
        assert_eq!(
            p.sleeper().sleeps(),
            vec![Duration::from_secs(5), Duration::from_secs(5)]
        );
    }

    #[test]
    fn uneven_max_wait_is_reached_before_timeout() {
        let aws = cli(MockRunner::new().with_fallback(RawOutput::success("{}")));
        let p = poller(5, 12);
        let err = p
            .wait_until(&aws, &Command::aws("ec2", "describe-nat-gateways"), "waiting", |_| false)
            .unwrap_err();
        match err {
            AwsError::PollTimeout { elapsed, iterations, .. } => {
                assert_eq!(elapsed, Duration::from_secs(15));
                assert_eq!(iterations, 4);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(p.sleeper().total(), Duration::from_secs(15));
    }

    #[test]
    fn elapsed_is_a_multiple_of_the_interval() {
        let aws = cli(MockRunner::new().with_fallback(RawOutput::success("{}")));
        let p = poller(3, 100);
        let mut n = 0;
        let polled = p
            .poll(&aws, &Command::aws("ec2", "describe-vpcs"), "x", |_| {
                n += 1;
                Ok(if n == 7 { Probe::Ready(n) } else { Probe::Pending })
            })
            .unwrap();
        assert_eq!(polled.value, 7);
        assert_eq!(polled.elapsed, Duration::from_secs(18));
        assert_eq!(p.sleeper().total(), polled.elapsed);
    }

    #[test]
    fn describe_failure_aborts() {
        let aws = cli(MockRunner::with_responses(vec![
            Ok(RawOutput::success("{}")),
            Ok(RawOutput::failure(255, "Throttling")),
        ]));
        let p = poller(5, 1800);
        let err = p
            .wait_until(&aws, &Command::aws("ec2", "describe-instances"), "x", |_| false)
            .unwrap_err();
        assert!(matches!(err, AwsError::CommandStderrNonEmpty { .. }));
        assert_eq!(p.sleeper().sleeps().len(), 1);
    }

    #[test]
    fn probe_error_aborts_without_sleeping() {
        let aws = cli(MockRunner::with_stdout(&["not json"]));
        let p = poller(5, 1800);
        let err = p
            .poll::<_, (), _>(&aws, &Command::aws("ec2", "describe-vpcs"), "x", |r| {
                r.parse::<serde_json::Value>("ec2 describe-vpcs").map(|_| Probe::Pending)
            })
            .unwrap_err();
        assert!(matches!(err, AwsError::UnexpectedResponse { .. }));
        assert!(p.sleeper().sleeps().is_empty());
    }

    #[test]
    fn shared_state_spends_one_budget() {
        let aws = cli(MockRunner::new().with_fallback(RawOutput::success("{}")));
        let p = poller(5, 10);
        let mut state = PollState::new();
        let mut first = 0;
        p.poll_with_state(&mut state, &aws, &Command::aws("a", "b"), "first", |_| {
            first += 1;
            Ok(Probe::from_bool(first == 2))
        })
        .unwrap();
        assert_eq!(state.elapsed(), Duration::from_secs(5));

        let err = p
            .poll_with_state::<_, (), _>(&mut state, &aws, &Command::aws("a", "c"), "second", |_| {
                Ok(Probe::Pending)
            })
            .unwrap_err();
        match err {
            AwsError::PollTimeout { elapsed, iterations, .. } => {
                assert_eq!(elapsed, Duration::from_secs(10));
                assert_eq!(iterations, 4);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn option_converts_to_probe() {
        assert_eq!(Probe::from(Some(3)), Probe::Ready(3));
        assert_eq!(Probe::<u8>::from(None), Probe::Pending);
    }
}
