use std::future::Future;

/// Which try an operation passed to [`retry_once`] is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Retry,
}

/// Run `op`, and run it exactly once more if the first error is transient.
///
/// The second result is returned as is, so a repeated transient error
/// propagates. `op` receives the [`Attempt`] so the retry can re-acquire
/// whatever went stale.
pub async fn retry_once<T, E, F, Fut, P>(mut op: F, is_transient: P) -> Result<T, E>
where
    F: FnMut(Attempt) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    match op(Attempt::First).await {
        Err(err) if is_transient(&err) => op(Attempt::Retry).await,
        other => other,
    }
}
