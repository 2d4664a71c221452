use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::error::{Error, Result};

/// Calls `check` until it reports readiness, sleeping `interval` between
/// attempts.
///
/// Fails with [`Error::Timeout`] once more than `deadline` has elapsed since
/// the first attempt. The check is always called at least once.
pub async fn poll_until<P, PFut, S, SFut>(
    interval: Duration,
    deadline: Duration,
    sleep: S,
    mut check: P,
) -> Result<()>
where
    P: FnMut() -> PFut,
    PFut: Future<Output = bool>,
    S: Fn(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    let started_at = Instant::now();
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        if check().await {
            debug!(attempt, elapsed = ?started_at.elapsed(), "Ready");
            return Ok(());
        }
        if started_at.elapsed() >= deadline {
            return Err(Error::Timeout(deadline));
        }
        sleep(interval).await;
    }
}
