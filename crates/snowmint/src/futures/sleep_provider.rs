use core::{future::Future, time::Duration};

/// Abstracts over how to sleep for a given [`Duration`] in async contexts.
///
/// This keeps the async generation loop independent of the runtime.
pub trait SleepProvider {
    /// Sleeps for roughly `dur`. The future must be `Send` so it can be
    /// moved across worker threads.
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}
