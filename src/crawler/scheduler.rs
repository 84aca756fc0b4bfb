//! Bounded fan-out with order-preserving fan-in
//!
//! Product pages of one listing page, and variant lookups of one product, are
//! run through `run_ordered`:
//! - at most `limit` tasks are in flight at any moment
//! - tasks complete in whatever order the network allows
//! - results are tagged with their request index and handed back in request order

use futures::stream::{self, StreamExt};
use std::future::Future;

/// Runs `task` over every item with at most `limit` tasks in flight
///
/// The output vector has one entry per input item, in input order,
/// regardless of completion order. A `limit` of 0 is treated as 1.
///
/// # Example
///
/// ```
/// use catalog_harvest::crawler::run_ordered;
///
/// # #[tokio::main]
/// # async fn main() {
/// let doubled = run_ordered(vec![1, 2, 3], 2, |_, n| async move { n * 2 }).await;
/// assert_eq!(doubled, vec![2, 4, 6]);
/// # }
/// ```
pub async fn run_ordered<I, F, Fut, T>(items: I, limit: usize, task: F) -> Vec<T>
where
    I: IntoIterator,
    F: Fn(usize, I::Item) -> Fut,
    Fut: Future<Output = T>,
{
    let mut indexed: Vec<(usize, T)> = stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| {
            let fut = task(index, item);
            async move { (index, fut.await) }
        })
        .buffer_unordered(limit.max(1))
        .collect()
        .await;

    indexed.sort_unstable_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, value)| value).collect()
}
