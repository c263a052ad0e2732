use crate::{
    ca::CertificateAuthority,
    cert::expiry_after,
    csr::{CertificateRequest, Identity, KeyAlgorithm},
    file::FileSource,
    CertPair, Error,
};
use async_trait::async_trait;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, info, warn};

pub const DEFAULT_SECRET_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_GRACE_PERIOD_RATIO: f64 = 0.5;

/// Produces a new certificate pair or fails.
#[async_trait]
pub trait CertProvider: Send + Sync + 'static {
    async fn fetch(&self) -> Result<CertPair, Error>;
}

/// Invoked with every newly installed pair.
pub type Callback = Box<dyn Fn(&Arc<CertPair>) + Send + Sync>;

/// Obtains certificates by submitting a CSR for a fresh key to a CA.
pub struct CaProvider<C> {
    ca: C,
    identity: Identity,
    algorithm: KeyAlgorithm,
    ttl: Duration,
    grace_period_ratio: f64,
    root_cert: Option<PathBuf>,
}

/// Caches the current pair and replaces it once it expires.
///
/// Scheduled refreshes and on-demand callers share one lock, so at most one
/// fetch is in flight and concurrent callers wait for its outcome.
pub struct CertManager {
    provider: Box<dyn CertProvider>,
    state: Mutex<State>,
}

struct State {
    current: Option<Arc<CertPair>>,
    callbacks: Vec<Callback>,
}

// === impl CaProvider ===

impl<C: CertificateAuthority> CaProvider<C> {
    pub fn new(ca: C, identity: Identity, algorithm: KeyAlgorithm) -> Self {
        Self {
            ca,
            identity,
            algorithm,
            ttl: DEFAULT_SECRET_TTL,
            grace_period_ratio: DEFAULT_GRACE_PERIOD_RATIO,
            root_cert: None,
        }
    }

    /// Sets the validity requested from the CA and the fraction of it after
    /// which the pair is rotated. The ratio must be in (0, 1].
    pub fn with_ttl(mut self, ttl: Duration, grace_period_ratio: f64) -> Result<Self, Error> {
        if !(grace_period_ratio > 0.0 && grace_period_ratio <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "grace period ratio {grace_period_ratio} must be in (0, 1]"
            )));
        }
        self.ttl = ttl;
        self.grace_period_ratio = grace_period_ratio;
        Ok(self)
    }

    /// Uses the bundle at `path` as the pair's trust root when it can be read.
    pub fn with_root_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_cert = Some(path.into());
        self
    }

    fn lifetime(&self) -> Duration {
        self.ttl.mul_f64(self.grace_period_ratio)
    }

    /// The configured trust bundle, or nothing when it cannot be read, in
    /// which case the pair falls back to the chain's last certificate.
    async fn root_cert_pem(&self) -> String {
        let Some(path) = &self.root_cert else {
            return String::new();
        };
        match tokio::fs::read_to_string(path).await {
            Ok(pem) => pem,
            Err(error) => {
                debug!(path = %path.display(), %error, "Using the chain's last certificate as root");
                String::new()
            }
        }
    }
}

#[async_trait]
impl<C: CertificateAuthority> CertProvider for CaProvider<C> {
    async fn fetch(&self) -> Result<CertPair, Error> {
        let identity = self.identity.clone();
        let algorithm = self.algorithm;
        let req = tokio::task::spawn_blocking(move || {
            CertificateRequest::generate(&identity, algorithm)
        })
        .await??;

        let chain = self.ca.sign(&req.csr_pem, self.ttl).await?;
        let root = self.root_cert_pem().await;
        let chain_pem = chain
            .iter()
            .map(|pem| format!("{}\n", pem.trim_end()))
            .collect::<String>();
        CertPair::from_pem(
            chain_pem,
            req.private_key_pem,
            root,
            expiry_after(self.lifetime())?,
        )
    }
}

#[async_trait]
impl CertProvider for FileSource {
    async fn fetch(&self) -> Result<CertPair, Error> {
        self.load().await
    }
}

// === impl CertManager ===

impl CertManager {
    pub fn new(provider: impl CertProvider) -> Self {
        Self {
            provider: Box::new(provider),
            state: Mutex::new(State {
                current: None,
                callbacks: Vec::new(),
            }),
        }
    }

    /// Registers a callback to be invoked, in registration order, each time a
    /// new pair is installed.
    pub async fn register_callback(
        &self,
        callback: impl Fn(&Arc<CertPair>) + Send + Sync + 'static,
    ) {
        self.state.lock().await.callbacks.push(Box::new(callback));
    }

    /// Returns the current pair, first replacing it if it has expired.
    ///
    /// A failed refresh is logged and the previous pair, even if expired, is
    /// returned. `None` is only returned if no pair has ever been obtained.
    pub async fn get_cert_pair(&self) -> Option<Arc<CertPair>> {
        let mut state = self.state.lock().await;
        if let Some(pair) = &state.current {
            if !pair.is_expired() {
                return Some(pair.clone());
            }
        }

        match self.provider.fetch().await {
            Ok(pair) => {
                let pair = Arc::new(pair);
                let expires_in = pair.expires_at().saturating_duration_since(Instant::now());
                info!(?expires_in, "Installed new certificate");
                state.current = Some(pair.clone());
                for callback in &state.callbacks {
                    callback(&pair);
                }
            }
            Err(error) => {
                warn!(%error, stale = state.current.is_some(), "Failed to refresh certificate");
            }
        }
        state.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::self_signed;
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex as SyncMutex,
    };
    use tokio::sync::Notify;

    /// Issues self-signed pairs, failing whenever `fail` is set.
    #[derive(Clone, Default)]
    struct MockProvider {
        fetches: Arc<AtomicUsize>,
        fail: Arc<AtomicBool>,
    }

    #[async_trait]
    impl CertProvider for MockProvider {
        async fn fetch(&self) -> Result<CertPair, Error> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::Timeout(Duration::from_secs(1)));
            }
            let (cert, key) = self_signed("spiffe://cluster.local/ns/default/sa/foo");
            CertPair::from_pem(&cert, key, &cert, Instant::now() + Duration::from_secs(60))
        }
    }

    #[derive(Default)]
    struct MockCa {
        requests: SyncMutex<Vec<(String, Duration)>>,
    }

    #[async_trait]
    impl CertificateAuthority for Arc<MockCa> {
        async fn sign(&self, csr_pem: &str, validity: Duration) -> Result<Vec<String>, Error> {
            self.requests
                .lock()
                .unwrap()
                .push((csr_pem.to_string(), validity));
            let (leaf, _) = self_signed("spiffe://cluster.local/ns/default/sa/foo");
            let (root, _) = self_signed("spiffe://cluster.local/ns/istio-system/sa/istiod");
            Ok(vec![leaf, root])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn returns_cached_pair_until_expired() {
        let provider = MockProvider::default();
        let manager = CertManager::new(provider.clone());

        let first = manager.get_cert_pair().await.expect("pair");
        let second = manager.get_cert_pair().await.expect("pair");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(60)).await;
        let third = manager.get_cert_pair().await.expect("pair");
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn callbacks_run_in_order_before_returning() {
        let manager = CertManager::new(MockProvider::default());
        let seen = Arc::new(SyncMutex::new(Vec::new()));
        for id in ["c1", "c2"] {
            let seen = seen.clone();
            manager
                .register_callback(move |pair| seen.lock().unwrap().push((id, pair.clone())))
                .await;
        }

        let pair = manager.get_cert_pair().await.expect("pair");
        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            vec!["c1", "c2"]
        );
        assert!(seen.iter().all(|(_, p)| Arc::ptr_eq(p, &pair)));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_keeps_previous_pair() {
        let provider = MockProvider::default();
        let manager = CertManager::new(provider.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        manager
            .register_callback(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        provider.fail.store(true, Ordering::SeqCst);
        assert!(manager.get_cert_pair().await.is_none());

        provider.fail.store(false, Ordering::SeqCst);
        let first = manager.get_cert_pair().await.expect("pair");

        tokio::time::advance(Duration::from_secs(61)).await;
        provider.fail.store(true, Ordering::SeqCst);
        let stale = manager.get_cert_pair().await.expect("stale pair");
        assert!(Arc::ptr_eq(&first, &stale));
        assert!(stale.is_expired());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 3);
    }

    /// Holds each fetch open until `release` is notified.
    #[derive(Clone, Default)]
    struct GatedProvider {
        inner: MockProvider,
        entered: Arc<AtomicUsize>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl CertProvider for GatedProvider {
        async fn fetch(&self) -> Result<CertPair, Error> {
            self.entered.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            self.inner.fetch().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_fetch() {
        let provider = GatedProvider::default();
        let manager = Arc::new(CertManager::new(provider.clone()));
        let get = |manager: Arc<CertManager>| {
            tokio::spawn(async move { manager.get_cert_pair().await })
        };
        let a = get(manager.clone());
        let b = get(manager.clone());

        // Both callers are parked: one in the fetch, one behind it.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!a.is_finished() && !b.is_finished());
        assert_eq!(provider.entered.load(Ordering::SeqCst), 1);

        provider.release.notify_one();
        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert!(Arc::ptr_eq(&a.expect("pair"), &b.expect("pair")));
        assert_eq!(provider.entered.load(Ordering::SeqCst), 1);
        assert_eq!(provider.inner.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ca_provider_applies_grace_period() {
        let ca = Arc::new(MockCa::default());
        let identity = Identity {
            trust_domain: "cluster.local".to_string(),
            namespace: "default".to_string(),
            service_account: "foo".to_string(),
        };
        let provider = CaProvider::new(ca.clone(), identity, KeyAlgorithm::EcdsaP256)
            .with_ttl(Duration::from_secs(3600), 0.5)
            .expect("valid ratio")
            .with_root_cert("/nonexistent/root-cert.pem");

        let start = Instant::now();
        let pair = provider.fetch().await.expect("pair");
        assert_eq!(pair.expires_at(), start + Duration::from_secs(1800));
        assert_eq!(pair.chain().len(), 2);
        assert_eq!(pair.roots().len(), 1);
        assert_eq!(&pair.roots()[0], &pair.chain()[1]);

        let requests = ca.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].0.contains("BEGIN CERTIFICATE REQUEST"));
        assert_eq!(requests[0].1, Duration::from_secs(3600));
    }

    #[test]
    fn rejects_invalid_grace_period_ratio() {
        let identity = Identity {
            trust_domain: "cluster.local".to_string(),
            namespace: "default".to_string(),
            service_account: "foo".to_string(),
        };
        for ratio in [0.0, -0.5, 1.5, f64::NAN] {
            let provider = CaProvider::new(
                Arc::new(MockCa::default()),
                identity.clone(),
                KeyAlgorithm::EcdsaP256,
            );
            assert!(provider.with_ttl(DEFAULT_SECRET_TTL, ratio).is_err());
        }
    }
}
