//! Cancellable repeating background task.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use core_async::sync::CancellationToken;
use core_async::task::JoinHandle;
use core_async::time::steady_interval;

/// Run `tick` every `period` until `token` is cancelled or `tick` breaks.
///
/// The first tick fires immediately. A tick that is already running when the
/// token is cancelled finishes; no further tick starts afterwards. Must be
/// called from within a runtime.
pub fn spawn_repeating<F, Fut>(period: Duration, token: CancellationToken, mut tick: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ControlFlow<()>> + Send + 'static,
{
    core_async::spawn(async move {
        let mut ticker = steady_interval(period);
        loop {
            core_async::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    if token.is_cancelled() || tick().await.is_break() {
                        break;
                    }
                }
            }
        }
    })
}
