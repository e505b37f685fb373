//! Activity retry backoff computation (spec.md §4.1 "Activity retry").
//!
//! A pure function over [`ActivityInfo`]/[`RetryState`] plus the failure
//! just received — no event emission, no I/O. The caller (`mutable_state`)
//! decides, from the `bool` this returns, whether to append
//! `ActivityTaskFailed` or instead mutate the activity in place and
//! generate a retry timer task.

use wfcore::activity::ActivityInfo;
use wfcore::execution_info::RetryState;

/// Outcome of [`compute_retry`]: either no retry (caller should append the
/// failure event), or the updated activity fields plus the timer task to
/// schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    NoRetry,
    Retry { scheduled_time_ns: i64, next_attempt: i32 },
}

/// `min(initialInterval * coefficient^attempt, maximumInterval)`, in
/// nanoseconds (spec.md §4.1).
fn backoff_interval_ns(retry: &RetryState, attempt: i32) -> i64 {
    let initial_secs = retry.initial_interval_secs as f64;
    let coefficient = retry.backoff_coefficient;
    let computed_secs = initial_secs * coefficient.powi(attempt);
    let capped_secs = computed_secs.min(retry.maximum_interval_secs as f64);
    (capped_secs.max(0.0) * 1_000_000_000.0) as i64
}

/// Pure computation of spec.md §4.1 "Activity retry": given the activity's
/// retry policy, its current attempt, the failure reason, and `now`, decide
/// whether a retry should be scheduled.
pub fn compute_retry(info: &ActivityInfo, failure_reason: &str, now_ns: i64) -> RetryDecision {
    if !has_retry_policy(&info.retry) || info.cancel_requested {
        return RetryDecision::NoRetry;
    }

    let backoff_ns = backoff_interval_ns(&info.retry, info.attempt);
    let scheduled_time_ns = now_ns + backoff_ns;

    if let Some(expiration_ns) = info.expiration_time_ns {
        if scheduled_time_ns > expiration_ns {
            return RetryDecision::NoRetry;
        }
    }
    if info.retry.maximum_attempts > 0 && info.attempt >= info.retry.maximum_attempts {
        return RetryDecision::NoRetry;
    }
    if info.retry.non_retriable_error_reasons.iter().any(|r| r == failure_reason) {
        return RetryDecision::NoRetry;
    }

    RetryDecision::Retry { scheduled_time_ns, next_attempt: info.attempt + 1 }
}

/// A retry policy is "present" when it permits at least a second attempt:
/// either unbounded (`maximum_attempts == 0`) or `maximum_attempts > 1`.
fn has_retry_policy(retry: &RetryState) -> bool {
    retry.maximum_attempts != 1
}

/// Apply a [`RetryDecision::Retry`] to the activity in place (spec.md §4.1:
/// "increment attempt; set scheduledTime; clear startedID/requestID/
/// startedTime; reset timerTaskStatus; record last failure").
pub fn apply_retry(
    info: &mut ActivityInfo,
    next_attempt: i32,
    scheduled_time_ns: i64,
    failure_reason: &str,
    failure_details: &[u8],
) {
    info.attempt = next_attempt;
    info.scheduled_time_ns = scheduled_time_ns;
    info.started_id = wfcore::sentinel::EMPTY_EVENT_ID;
    info.cancel_request_id = None;
    info.started_time_ns = 0;
    info.timer_task_status = 0;
    info.last_failure_reason = Some(failure_reason.to_string());
    info.last_failure_details = failure_details.to_vec();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity_with_retry(attempt: i32, maximum_attempts: i32) -> ActivityInfo {
        ActivityInfo {
            version: 1,
            schedule_id: 5,
            scheduled_event_batch_id: 5,
            scheduled_time_ns: 0,
            started_id: wfcore::sentinel::EMPTY_EVENT_ID,
            started_time_ns: 0,
            activity_id: wfcore::ids::ActivityId::new("a1"),
            target_domain_id: None,
            timeouts: Default::default(),
            cancel_requested: false,
            cancel_request_id: None,
            last_heartbeat_time_ns: 0,
            timer_task_status: 0,
            task_list: wfcore::ids::TaskListId::new("tl"),
            retry: RetryState {
                attempt,
                expiration_time_ns: Some(1_000_000_000_000),
                initial_interval_secs: 1,
                backoff_coefficient: 2.0,
                maximum_interval_secs: 100,
                maximum_attempts,
                non_retriable_error_reasons: vec!["fatal".to_string()],
            },
            last_failure_reason: None,
            last_failure_details: Vec::new(),
            last_worker_identity: None,
            attempt,
            expiration_time_ns: Some(1_000_000_000_000),
        }
    }

    #[test]
    fn no_retry_policy_means_no_retry() {
        let info = activity_with_retry(0, 1);
        assert_eq!(compute_retry(&info, "boom", 0), RetryDecision::NoRetry);
    }

    #[test]
    fn cancel_requested_suppresses_retry() {
        let mut info = activity_with_retry(0, 0);
        info.cancel_requested = true;
        assert_eq!(compute_retry(&info, "boom", 0), RetryDecision::NoRetry);
    }

    #[test]
    fn retries_below_max_attempts() {
        let info = activity_with_retry(2, 5);
        // attempt = maxAttempts - 1 may still retry (spec.md §8 boundary behavior).
        match compute_retry(&info, "boom", 0) {
            RetryDecision::Retry { next_attempt, .. } => assert_eq!(next_attempt, 3),
            RetryDecision::NoRetry => panic!("expected a retry at attempt == maxAttempts - 1"),
        }
    }

    #[test]
    fn retries_at_max_attempts_minus_one() {
        let info = activity_with_retry(4, 5);
        // attempt = maxAttempts - 1 may still retry (spec.md §8 boundary behavior).
        match compute_retry(&info, "boom", 0) {
            RetryDecision::Retry { next_attempt, .. } => assert_eq!(next_attempt, 5),
            RetryDecision::NoRetry => panic!("expected a retry at attempt == maxAttempts - 1"),
        }
    }

    #[test]
    fn does_not_retry_at_max_attempts() {
        let info = activity_with_retry(5, 5);
        assert_eq!(compute_retry(&info, "boom", 0), RetryDecision::NoRetry);
    }

    #[test]
    fn non_retriable_reason_suppresses_retry() {
        let info = activity_with_retry(0, 0);
        assert_eq!(compute_retry(&info, "fatal", 0), RetryDecision::NoRetry);
    }

    #[test]
    fn expiration_time_suppresses_retry() {
        let mut info = activity_with_retry(0, 0);
        info.retry.expiration_time_ns = Some(10);
        info.expiration_time_ns = Some(10);
        assert_eq!(compute_retry(&info, "boom", 100), RetryDecision::NoRetry);
    }

    #[test]
    fn backoff_grows_with_coefficient() {
        let info = activity_with_retry(3, 0);
        match compute_retry(&info, "boom", 0) {
            RetryDecision::Retry { scheduled_time_ns, .. } => {
                // initial=1s, coefficient=2.0, attempt=3 -> 8s, under the 100s cap.
                assert_eq!(scheduled_time_ns, 8_000_000_000);
            }
            RetryDecision::NoRetry => panic!("expected retry"),
        }
    }

    #[test]
    fn backoff_is_capped_at_maximum_interval() {
        let mut info = activity_with_retry(10, 0);
        info.retry.maximum_interval_secs = 5;
        match compute_retry(&info, "boom", 0) {
            RetryDecision::Retry { scheduled_time_ns, .. } => {
                assert_eq!(scheduled_time_ns, 5_000_000_000);
            }
            RetryDecision::NoRetry => panic!("expected retry"),
        }
    }

    #[test]
    fn apply_retry_resets_started_fields() {
        let mut info = activity_with_retry(0, 0);
        info.started_id = 7;
        info.started_time_ns = 123;
        info.timer_task_status = 3;
        apply_retry(&mut info, 1, 5_000_000_000, "boom", b"details");
        assert_eq!(info.attempt, 1);
        assert_eq!(info.scheduled_time_ns, 5_000_000_000);
        assert_eq!(info.started_id, wfcore::sentinel::EMPTY_EVENT_ID);
        assert_eq!(info.started_time_ns, 0);
        assert_eq!(info.timer_task_status, 0);
        assert_eq!(info.last_failure_reason.as_deref(), Some("boom"));
        assert_eq!(info.last_failure_details, b"details");
    }
}
