use crate::CertManager;
use futures::FutureExt;
use std::{panic::AssertUnwindSafe, sync::Arc, time::Duration};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(30);

/// Periodically drives the manager's expiry check so that pairs are rotated
/// even when no caller asks for one.
#[derive(Clone)]
pub struct Refresher {
    manager: Arc<CertManager>,
    period: Duration,
}

// === impl Refresher ===

impl Refresher {
    pub fn new(manager: Arc<CertManager>, period: Duration) -> Self {
        Self { manager, period }
    }

    /// Runs until `drain` is signaled. The first check happens immediately.
    ///
    /// A panic during a refresh is logged and does not stop later ticks.
    pub async fn run(self, drain: drain::Watch) {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = drain.signaled();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                release = &mut shutdown => {
                    info!("Certificate refresher shutting down");
                    drop(release);
                    return;
                }
            }

            // Shutdown abandons an in-flight refresh, which closes any CA
            // connection it holds.
            let refresh = AssertUnwindSafe(self.manager.get_cert_pair()).catch_unwind();
            let res = tokio::select! {
                res = refresh => res,
                release = &mut shutdown => {
                    info!("Certificate refresher shutting down during a refresh");
                    drop(release);
                    return;
                }
            };
            match res {
                Ok(Some(pair)) => debug!(expires_at = ?pair.expires_at(), "Certificate checked"),
                Ok(None) => debug!("No certificate available yet"),
                Err(panic) => {
                    let msg = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_default();
                    error!(panic = %msg, "Certificate refresh panicked");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_util::self_signed, CertPair, CertProvider, Error};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::time::Instant;

    #[derive(Clone, Default)]
    struct Flaky {
        fetches: Arc<AtomicUsize>,
    }

    /// Panics on the first fetch, then issues pairs valid for 45 seconds.
    #[async_trait]
    impl CertProvider for Flaky {
        async fn fetch(&self) -> Result<CertPair, Error> {
            if self.fetches.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("first fetch fails");
            }
            let (cert, key) = self_signed("spiffe://cluster.local/ns/default/sa/foo");
            CertPair::from_pem(&cert, key, &cert, Instant::now() + Duration::from_secs(45))
        }
    }

    /// Never completes a fetch; records when one is abandoned.
    #[derive(Clone, Default)]
    struct Stuck {
        started: Arc<tokio::sync::Notify>,
        abandoned: Arc<AtomicBool>,
    }

    struct SetOnDrop(Arc<AtomicBool>);

    impl Drop for SetOnDrop {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl CertProvider for Stuck {
        async fn fetch(&self) -> Result<CertPair, Error> {
            let _guard = SetOnDrop(self.abandoned.clone());
            self.started.notify_one();
            futures::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_abandons_inflight_refresh() {
        let provider = Stuck::default();
        let manager = Arc::new(CertManager::new(provider.clone()));
        let (signal, watch) = drain::channel();
        let task = tokio::spawn(Refresher::new(manager, Duration::from_secs(30)).run(watch));

        provider.started.notified().await;
        assert!(!provider.abandoned.load(Ordering::SeqCst));

        time::timeout(Duration::from_secs(5), signal.drain())
            .await
            .expect("shutdown must not wait for the refresh");
        task.await.expect("refresher must not panic");
        assert!(provider.abandoned.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_on_schedule_and_survives_panics() {
        let provider = Flaky::default();
        let manager = Arc::new(CertManager::new(provider.clone()));
        let (signal, watch) = drain::channel();
        let refresher = Refresher::new(manager.clone(), Duration::from_secs(30));
        let task = tokio::spawn(refresher.run(watch));

        // t=0 panics.
        tokio::task::yield_now().await;
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 1);

        // t=30 installs a pair expiring at t=75.
        time::sleep(Duration::from_secs(30)).await;
        tokio::task::yield_now().await;
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 2);
        let first = manager.get_cert_pair().await.expect("pair");

        // t=60 finds it fresh.
        time::sleep(Duration::from_secs(30)).await;
        tokio::task::yield_now().await;
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 2);

        // t=90 rotates it.
        time::sleep(Duration::from_secs(30)).await;
        tokio::task::yield_now().await;
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 3);
        let second = manager.get_cert_pair().await.expect("pair");
        assert!(!Arc::ptr_eq(&first, &second));

        signal.drain().await;
        task.await.expect("refresher must not panic");
    }
}
