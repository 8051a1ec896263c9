//! Bounded parallel dispatch of per-ticket tasks.
//!
//! A fixed number of tasks run at once; the bound comes from
//! configuration, not from the machine, because it caps outbound
//! connections to the helpdesk API. Each task runs on its own tokio task,
//! so an error or a panic in one ticket is caught at its join handle,
//! logged, and turned into an empty slot. The rest of the batch goes on.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::error::Result;

/// Run `task_fn` over every task with at most `pool_size` in flight.
///
/// Returns one slot per input task, in input order. A slot is `None` when
/// its task returned an error or panicked. `pool_size` of zero is treated
/// as one.
///
/// The pool lives for the duration of this call only.
pub async fn run<T, R, F, Fut>(tasks: Vec<T>, pool_size: usize, task_fn: F) -> Vec<Option<R>>
where
    T: Display + Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    let total = tasks.len();
    let pool_size = pool_size.max(1);
    debug!(total, pool_size, "Dispatching tasks");

    let semaphore = Arc::new(Semaphore::new(pool_size));
    let task_fn = Arc::new(task_fn);
    let mut labels = Vec::with_capacity(total);
    let mut join_set = JoinSet::new();

    for (index, task) in tasks.into_iter().enumerate() {
        labels.push(task.to_string());

        // Acquire before spawning so at most `pool_size` tasks exist.
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };
        let task_fn = Arc::clone(&task_fn);

        join_set.spawn(async move {
            let _permit = permit;
            // Inner spawn so a panic surfaces as a JoinError we can pin
            // to this task's index.
            (index, tokio::spawn((*task_fn)(task)).await)
        });
    }

    let mut results: Vec<Option<R>> = std::iter::repeat_with(|| None).take(total).collect();
    while let Some(joined) = join_set.join_next().await {
        let Ok((index, outcome)) = joined else {
            error!("Dispatcher worker aborted");
            continue;
        };
        match outcome {
            Ok(Ok(value)) => results[index] = Some(value),
            Ok(Err(e)) => error!(task = %labels[index], error = %e, "Task failed"),
            Err(e) => error!(task = %labels[index], error = %e, "Task panicked"),
        }
    }

    results
}
