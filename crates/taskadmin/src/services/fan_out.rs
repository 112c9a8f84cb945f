//! Concurrent all-or-nothing fan-out.

use std::future::Future;

use tokio::task::JoinSet;

use super::error::{Result, ServiceError};

/// Runs `f` on every item concurrently and collects the results in input order.
///
/// The first failing unit aborts the remaining ones and its error is
/// returned. No partial results are returned. Dropping the returned future
/// aborts every unit still running.
pub async fn try_fan_out<T, R, F, Fut>(items: Vec<T>, f: F) -> Result<Vec<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let len = items.len();
    let mut set = JoinSet::new();
    for (index, item) in items.into_iter().enumerate() {
        let unit = f(item);
        set.spawn(async move { (index, unit.await) });
    }

    let mut results: Vec<Option<R>> = (0..len).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, Ok(value))) => results[index] = Some(value),
            Ok((_, Err(err))) => {
                set.abort_all();
                return Err(err);
            }
            Err(join_err) => {
                set.abort_all();
                return Err(ServiceError::FanOut(join_err.to_string()));
            }
        }
    }

    Ok(results.into_iter().flatten().collect())
}
