use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;

use crate::models::prediction::{Prediction, PredictionStatus};
use crate::services::replicate::ReplicateError;

/// Polling bounds for a single prediction.
///
/// Constant-interval polling, no backoff: the deadline is
/// `max_attempts * interval`.
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_millis(2000),
        }
    }
}

/// Why polling stopped without a usable output.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("prediction descriptor has no id")]
    MissingId,

    /// The status query itself failed. Distinct from [`PollError::RemoteFailed`],
    /// where the query succeeded but the job reports failure.
    #[error("status query failed: {0}")]
    Transport(#[from] ReplicateError),

    #[error("prediction failed remotely: {message}")]
    RemoteFailed { message: String },

    #[error("prediction was canceled remotely")]
    Canceled,

    #[error("prediction succeeded but produced no output")]
    EmptyOutput,

    #[error("prediction not finished after {attempts} attempts ({elapsed:?})")]
    Timeout { attempts: u32, elapsed: Duration },

    /// The caller's cancellation signal fired during the inter-attempt wait.
    #[error("polling interrupted by caller")]
    Interrupted,
}

/// A cancellation receiver that never fires, for callers with no abort path.
pub fn never_cancel() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    drop(tx);
    rx
}

/// Drive a submitted prediction to a terminal state and return its first
/// output reference.
///
/// Waits `settings.interval` before every status query, issues at most
/// `settings.max_attempts` queries, and never queries more than once per
/// interval: a failed query aborts immediately rather than consuming a retry.
/// If the initial descriptor is already terminal, no query is issued at all.
///
/// Queries for one prediction are strictly sequential; concurrent calls for
/// distinct predictions share nothing.
pub async fn poll_prediction<F, Fut>(
    initial: Prediction,
    mut fetch: F,
    settings: &PollSettings,
    mut cancel: watch::Receiver<bool>,
) -> Result<String, PollError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Prediction, ReplicateError>>,
{
    if initial.id.is_empty() {
        return Err(PollError::MissingId);
    }

    let mut current = initial;
    let mut attempts: u32 = 0;

    while !current.status.is_terminal() && attempts < settings.max_attempts {
        let interrupted = async {
            if cancel.wait_for(|stop| *stop).await.is_err() {
                // Sender dropped: cancellation disabled for this call.
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(settings.interval) => {}
            _ = interrupted => {
                tracing::debug!(prediction_id = %current.id, attempts, "polling interrupted");
                return Err(PollError::Interrupted);
            }
        }

        current = fetch(current.id.clone()).await?;
        attempts += 1;

        tracing::trace!(
            prediction_id = %current.id,
            status = %current.status,
            attempts,
            "polled prediction status"
        );
    }

    match current.status {
        PredictionStatus::Succeeded => match current.first_output() {
            Some(url) => Ok(url.to_string()),
            None => Err(PollError::EmptyOutput),
        },
        PredictionStatus::Failed => Err(PollError::RemoteFailed {
            message: current.error.unwrap_or_else(|| "unknown".to_string()),
        }),
        PredictionStatus::Canceled => Err(PollError::Canceled),
        PredictionStatus::Starting | PredictionStatus::Processing => Err(PollError::Timeout {
            attempts,
            elapsed: settings.interval * attempts,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn descriptor(id: &str, status: PredictionStatus) -> Prediction {
        Prediction {
            id: id.to_string(),
            status,
            output: None,
            error: None,
            created_at: None,
        }
    }

    fn succeeded(id: &str, outputs: &[&str]) -> Prediction {
        Prediction {
            output: Some(crate::models::prediction::PredictionOutput::Many(
                outputs.iter().map(|s| s.to_string()).collect(),
            )),
            ..descriptor(id, PredictionStatus::Succeeded)
        }
    }

    fn settings(max_attempts: u32) -> PollSettings {
        PollSettings {
            max_attempts,
            interval: Duration::from_millis(2000),
        }
    }

    /// Fetch stub that counts queries and replies from a script, repeating the
    /// last entry once the script is exhausted.
    fn scripted_fetch(
        script: Vec<Result<Prediction, ReplicateError>>,
        calls: Arc<AtomicU32>,
    ) -> impl FnMut(String) -> std::future::Ready<Result<Prediction, ReplicateError>> {
        let script = Arc::new(script);
        move |_id: String| {
            let n = calls.fetch_add(1, Ordering::SeqCst) as usize;
            let idx = n.min(script.len().saturating_sub(1));
            let reply = match script.get(idx) {
                Some(Ok(p)) => Ok(p.clone()),
                Some(Err(_)) => Err(ReplicateError::Api {
                    status: 500,
                    message: "boom".to_string(),
                }),
                None => panic!("unexpected status query"),
            };
            std::future::ready(reply)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_initial_descriptor_skips_polling() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetch = scripted_fetch(vec![], Arc::clone(&calls));

        let started = tokio::time::Instant::now();
        let result = poll_prediction(
            succeeded("p1", &["https://cdn.example/out.png"]),
            fetch,
            &settings(60),
            never_cancel(),
        )
        .await;

        assert_eq!(result.unwrap(), "https://cdn.example/out.png");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_query_after_one_wait() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetch = scripted_fetch(
            vec![Ok(succeeded("p1", &["https://cdn.example/out.png"]))],
            Arc::clone(&calls),
        );

        let started = tokio::time::Instant::now();
        let result = poll_prediction(
            descriptor("p1", PredictionStatus::Starting),
            fetch,
            &settings(60),
            never_cancel(),
        )
        .await;

        assert_eq!(result.unwrap(), "https://cdn.example/out.png");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_running_times_out_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetch = scripted_fetch(
            vec![Ok(descriptor("p1", PredictionStatus::Processing))],
            Arc::clone(&calls),
        );

        let result = poll_prediction(
            descriptor("p1", PredictionStatus::Starting),
            fetch,
            &settings(5),
            never_cancel(),
        )
        .await;

        match result {
            Err(PollError::Timeout { attempts, elapsed }) => {
                assert_eq!(attempts, 5);
                assert_eq!(elapsed, Duration::from_millis(10_000));
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_failure_stops_on_the_failing_query() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut failed = descriptor("p1", PredictionStatus::Failed);
        failed.error = Some("bad input".to_string());
        let fetch = scripted_fetch(
            vec![
                Ok(descriptor("p1", PredictionStatus::Starting)),
                Ok(descriptor("p1", PredictionStatus::Processing)),
                Ok(failed),
            ],
            Arc::clone(&calls),
        );

        let result = poll_prediction(
            descriptor("p1", PredictionStatus::Starting),
            fetch,
            &settings(60),
            never_cancel(),
        )
        .await;

        match result {
            Err(PollError::RemoteFailed { message }) => assert_eq!(message, "bad input"),
            other => panic!("expected RemoteFailed, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_failure_without_message_reports_unknown() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetch = scripted_fetch(
            vec![Ok(descriptor("p1", PredictionStatus::Failed))],
            Arc::clone(&calls),
        );

        let result = poll_prediction(
            descriptor("p1", PredictionStatus::Processing),
            fetch,
            &settings(60),
            never_cancel(),
        )
        .await;

        match result {
            Err(PollError::RemoteFailed { message }) => assert_eq!(message, "unknown"),
            other => panic!("expected RemoteFailed, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_aborts_without_further_queries() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetch = scripted_fetch(
            vec![
                Ok(descriptor("p1", PredictionStatus::Processing)),
                Err(ReplicateError::Api {
                    status: 500,
                    message: "boom".to_string(),
                }),
            ],
            Arc::clone(&calls),
        );

        let result = poll_prediction(
            descriptor("p1", PredictionStatus::Starting),
            fetch,
            &settings(60),
            never_cancel(),
        )
        .await;

        assert!(matches!(result, Err(PollError::Transport(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_canceled_prediction_is_reported_distinctly() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetch = scripted_fetch(
            vec![Ok(descriptor("p1", PredictionStatus::Canceled))],
            Arc::clone(&calls),
        );

        let result = poll_prediction(
            descriptor("p1", PredictionStatus::Starting),
            fetch,
            &settings(60),
            never_cancel(),
        )
        .await;

        assert!(matches!(result, Err(PollError::Canceled)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeded_with_empty_output_is_an_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetch = scripted_fetch(vec![Ok(succeeded("p1", &[]))], Arc::clone(&calls));

        let result = poll_prediction(
            descriptor("p1", PredictionStatus::Starting),
            fetch,
            &settings(60),
            never_cancel(),
        )
        .await;

        assert!(matches!(result, Err(PollError::EmptyOutput)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_id_is_rejected_before_any_query() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetch = scripted_fetch(
            vec![Ok(descriptor("", PredictionStatus::Processing))],
            Arc::clone(&calls),
        );

        let result = poll_prediction(
            descriptor("", PredictionStatus::Starting),
            fetch,
            &settings(60),
            never_cancel(),
        )
        .await;

        assert!(matches!(result, Err(PollError::MissingId)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_caller_cancellation_interrupts_the_wait() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetch = scripted_fetch(
            vec![Ok(descriptor("p1", PredictionStatus::Processing))],
            Arc::clone(&calls),
        );
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            poll_prediction(
                descriptor("p1", PredictionStatus::Starting),
                fetch,
                &settings(60),
                cancel_rx,
            )
            .await
        });
        cancel_tx.send(true).unwrap();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(PollError::Interrupted)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_polls_are_isolated() {
        let calls_a = Arc::new(AtomicU32::new(0));
        let fetch_a = scripted_fetch(
            vec![
                Ok(descriptor("job-a", PredictionStatus::Processing)),
                Ok(succeeded("job-a", &["https://cdn.example/a.png"])),
            ],
            Arc::clone(&calls_a),
        );

        let calls_b = Arc::new(AtomicU32::new(0));
        let fetch_b = scripted_fetch(
            vec![Ok(descriptor("job-b", PredictionStatus::Processing))],
            Arc::clone(&calls_b),
        );

        let settings_a = settings(60);
        let settings_b = settings(3);
        let (result_a, result_b) = futures::join!(
            poll_prediction(
                descriptor("job-a", PredictionStatus::Starting),
                fetch_a,
                &settings_a,
                never_cancel(),
            ),
            poll_prediction(
                descriptor("job-b", PredictionStatus::Starting),
                fetch_b,
                &settings_b,
                never_cancel(),
            ),
        );

        assert_eq!(result_a.unwrap(), "https://cdn.example/a.png");
        assert_eq!(calls_a.load(Ordering::SeqCst), 2);
        assert!(matches!(
            result_b,
            Err(PollError::Timeout { attempts: 3, .. })
        ));
        assert_eq!(calls_b.load(Ordering::SeqCst), 3);
    }
}
