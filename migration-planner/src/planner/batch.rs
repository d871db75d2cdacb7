//! Scatter-gather execution for the concurrent stages

use futures::{stream::FuturesUnordered, Future, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Context provided to each task in a batch
#[derive(Debug, Clone, Copy)]
pub struct TaskContext {
    /// Stage number (for logging)
    pub stage: usize,
    /// Task number (1-indexed for display)
    pub task_number: usize,
    /// Total number of tasks in this batch
    pub total_tasks: usize,
}

/// Run one task per item concurrently and gather the results.
///
/// Every item is submitted at once. `max_concurrency` bounds how many run at
/// the same time; `None` leaves them unbounded.
///
/// # Returns
/// Results in submission order.
///
/// # Error Handling
/// Fails fast: the first error is returned and every task still pending is
/// dropped, so none of their results are observed.
pub async fn scatter_gather<T, R, E, F, Fut>(
    stage: usize,
    items: Vec<T>,
    max_concurrency: Option<usize>,
    task_executor: F,
) -> Result<Vec<R>, E>
where
    F: Fn(T, TaskContext) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let total = items.len();
    let sem = max_concurrency.map(|limit| Arc::new(Semaphore::new(limit.max(1))));
    let executor = &task_executor;
    let mut tasks = FuturesUnordered::new();

    for (idx, item) in items.into_iter().enumerate() {
        let sem = sem.clone();
        let ctx = TaskContext {
            stage,
            task_number: idx + 1,
            total_tasks: total,
        };

        tasks.push(async move {
            // Holds a permit for the whole task when a limit is configured
            let _permit = match &sem {
                Some(sem) => sem.clone().acquire_owned().await.ok(),
                None => None,
            };
            (idx, executor(item, ctx).await)
        });
    }

    let mut results: Vec<Option<R>> = std::iter::repeat_with(|| None).take(total).collect();
    while let Some((idx, result)) = tasks.next().await {
        results[idx] = Some(result?);
    }

    Ok(results.into_iter().flatten().collect())
}
