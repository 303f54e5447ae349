use core::{future::Future, time::Duration};

use super::{SleepProvider, SnowflakeGeneratorAsyncExt};
use crate::{IdGenerator, Result, Snowflake, TimeSource};

/// A [`SleepProvider`] backed by Tokio's timer.
///
/// This is the default provider for applications built on Tokio.
pub struct TokioSleep;

impl SleepProvider for TokioSleep {
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send {
        ::tokio::time::sleep(dur)
    }
}

/// A [`SleepProvider`] that yields to the Tokio scheduler instead of
/// sleeping.
///
/// Reacts faster at low concurrency, but polls in a tighter loop and burns
/// more CPU under load than [`TokioSleep`].
pub struct TokioYield;

impl SleepProvider for TokioYield {
    fn sleep_for(_dur: Duration) -> impl Future<Output = ()> + Send {
        ::tokio::task::yield_now()
    }
}

/// Convenience over [`SnowflakeGeneratorAsyncExt`] that sleeps with
/// [`TokioSleep`].
pub trait SnowflakeGeneratorAsyncTokioExt<ID: Snowflake> {
    /// Returns a future that resolves to the next available ID.
    ///
    /// # Errors
    ///
    /// See [`SnowflakeGeneratorAsyncExt::try_next_id_async`].
    fn next_id_async(&self) -> impl Future<Output = Result<ID>>;
}

impl<ID, T> SnowflakeGeneratorAsyncTokioExt<ID> for IdGenerator<ID, T>
where
    ID: Snowflake,
    T: TimeSource,
{
    fn next_id_async(&self) -> impl Future<Output = Result<ID>> {
        <Self as SnowflakeGeneratorAsyncExt<ID>>::try_next_id_async::<TokioSleep>(self)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc};

    use futures::future::try_join_all;

    use super::*;
    use crate::{Error, GeneratorConfig, ManualClock, SnowflakeTwitterId};

    const TASKS: usize = 8;
    const IDS_PER_TASK: usize = 4096 * 4;

    async fn mint_many<S: SleepProvider>(
        generator: &IdGenerator<SnowflakeTwitterId>,
    ) -> Result<Vec<SnowflakeTwitterId>> {
        let mut ids = Vec::with_capacity(IDS_PER_TASK);
        for _ in 0..IDS_PER_TASK {
            ids.push(generator.try_next_id_async::<S>().await?);
        }
        Ok(ids)
    }

    async fn run_unique<S: SleepProvider>() -> Result<()> {
        let generator = IdGenerator::new(11)?;
        let tasks = (0..TASKS).map(|_| mint_many::<S>(&generator));
        let batches = try_join_all(tasks).await?;

        let mut seen = HashSet::with_capacity(TASKS * IDS_PER_TASK);
        for batch in batches {
            assert!(batch.windows(2).all(|w| w[0] < w[1]));
            for id in batch {
                assert_eq!(id.node_id(), 11);
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), TASKS * IDS_PER_TASK);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn can_call_next_id_async() -> Result<()> {
        let generator = IdGenerator::new(0)?;
        let a = generator.next_id_async().await?;
        let b = generator.next_id_async().await?;
        assert!(a < b);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn generates_many_unique_ids_sleep() -> Result<()> {
        run_unique::<TokioSleep>().await
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn generates_many_unique_ids_yield() -> Result<()> {
        run_unique::<TokioYield>().await
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn spawned_tasks_share_one_generator() -> Result<()> {
        let generator = Arc::new(IdGenerator::new(5)?);
        let handles: Vec<_> = (0..TASKS)
            .map(|_| {
                let generator = Arc::clone(&generator);
                tokio::spawn(async move {
                    let mut ids = Vec::with_capacity(1_000);
                    for _ in 0..1_000 {
                        ids.push(generator.next_id_async().await?);
                    }
                    Ok::<_, Error>(ids)
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.await.expect("task panicked")? {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), TASKS * 1_000);
        Ok(())
    }

    #[tokio::test]
    async fn waits_for_clock_after_exhaustion() -> Result<()> {
        let clock = ManualClock::new(7);
        let generator = IdGenerator::<SnowflakeTwitterId, _>::with_clock(1, clock.clone())?;
        for _ in 0..=SnowflakeTwitterId::max_sequence() {
            generator.next_id_async().await?;
        }

        let advance = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            clock.advance(1);
        };
        let (id, ()) = tokio::join!(generator.next_id_async(), advance);
        let id = id?;
        assert_eq!((id.timestamp(), id.sequence()), (8, 0));
        Ok(())
    }

    #[tokio::test]
    async fn regression_tolerance_spans_attempts() {
        let limit = Duration::from_millis(30);
        let clock = ManualClock::new(1_000);
        let config = GeneratorConfig::new(1).with_max_clock_regression(Some(limit));
        let generator =
            IdGenerator::<SnowflakeTwitterId, _>::with_config(config, clock.clone()).unwrap();
        generator.next_id_async().await.unwrap();

        clock.set(999);
        let err = generator
            .try_next_id_async::<TokioYield>()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ClockRegression { waited, .. } if waited > limit
        ));
    }
}
