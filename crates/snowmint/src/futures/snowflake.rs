use core::{future::Future, time::Duration};

use super::SleepProvider;
use crate::{IdGenerator, Poll, Result, Snowflake, TimeSource};

/// Extension trait for minting IDs from async code.
///
/// Instead of parking the thread as [`IdGenerator::next_id`] does, the
/// returned future releases the generator's lock between attempts and sleeps
/// through the given [`SleepProvider`]. Dropping the future cancels the
/// request; no state changes until an ID is actually minted.
pub trait SnowflakeGeneratorAsyncExt<ID: Snowflake> {
    /// Returns a future that resolves to the next available ID.
    ///
    /// # Errors
    ///
    /// Resolves to the same errors as [`IdGenerator::next_id`]. The clock
    /// regression tolerance is measured across all attempts made by this
    /// future.
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<ID>>
    where
        S: SleepProvider;
}

impl<ID, T> SnowflakeGeneratorAsyncExt<ID> for IdGenerator<ID, T>
where
    ID: Snowflake,
    T: TimeSource,
{
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<ID>>
    where
        S: SleepProvider,
    {
        async move {
            let mut behind_since = None;
            loop {
                let dur = match self.poll_with(&mut behind_since)? {
                    Poll::Ready { id } => return Ok(id),
                    Poll::Pending { yield_for } => Duration::from_millis(yield_for),
                };
                S::sleep_for(dur).await;
            }
        }
    }
}
