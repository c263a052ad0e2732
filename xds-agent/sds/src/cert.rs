use crate::Error;
use rustls_pki_types::{pem::PemObject, CertificateDer, PrivateKeyDer};
use std::{
    fmt,
    time::{Duration, SystemTime},
};
use tokio::time::Instant;

/// A workload certificate chain with its private key and trust root.
///
/// Pairs are immutable once built. Rotation installs a new pair rather than
/// modifying the current one, so a pair handed to a caller never changes
/// underneath it.
pub struct CertPair {
    chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
    roots: Vec<CertificateDer<'static>>,
    cert_chain_pem: String,
    private_key_pem: String,
    root_cert_pem: String,
    expires_at: Instant,
    expiry_time: SystemTime,
}

// === impl CertPair ===

impl CertPair {
    /// Parses a PEM certificate chain (leaf first), a PEM private key and a
    /// PEM trust bundle. A bundle without certificates defaults to the chain's
    /// last certificate.
    ///
    /// `expires_at` is when the pair must be replaced. It is chosen by the
    /// source of the pair and is not read from the certificate.
    pub fn from_pem(
        cert_chain_pem: impl Into<String>,
        private_key_pem: impl Into<String>,
        root_cert_pem: impl Into<String>,
        expires_at: Instant,
    ) -> Result<Self, Error> {
        let cert_chain_pem = cert_chain_pem.into();
        let private_key_pem = private_key_pem.into();
        let mut root_cert_pem = root_cert_pem.into();

        let chain = parse_certs("certificate chain", &cert_chain_pem)?;
        if chain.is_empty() {
            return Err(Error::EmptyChain);
        }
        let key = PrivateKeyDer::from_pem_slice(private_key_pem.as_bytes())
            .map_err(|source| Error::Pem {
                what: "private key",
                source,
            })?;
        let mut roots = parse_certs("root certificate", &root_cert_pem)?;
        if roots.is_empty() {
            root_cert_pem = last_pem_block(&cert_chain_pem).to_string();
            roots = chain.last().cloned().into_iter().collect();
        }
        let expiry_time = SystemTime::now()
            .checked_add(expires_at.saturating_duration_since(Instant::now()))
            .ok_or_else(|| Error::InvalidConfig("expiry is out of range".into()))?;

        Ok(Self {
            chain,
            key,
            roots,
            cert_chain_pem,
            private_key_pem,
            root_cert_pem,
            expires_at,
            expiry_time,
        })
    }

    /// The certificate chain, leaf first.
    pub fn chain(&self) -> &[CertificateDer<'static>] {
        &self.chain
    }

    pub fn leaf(&self) -> &CertificateDer<'static> {
        &self.chain[0]
    }

    pub fn private_key(&self) -> &PrivateKeyDer<'static> {
        &self.key
    }

    pub fn roots(&self) -> &[CertificateDer<'static>] {
        &self.roots
    }

    pub fn cert_chain_pem(&self) -> &str {
        &self.cert_chain_pem
    }

    pub fn private_key_pem(&self) -> &str {
        &self.private_key_pem
    }

    pub fn root_cert_pem(&self) -> &str {
        &self.root_cert_pem
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// The wall-clock time at which the pair is replaced.
    pub fn expiry_time(&self) -> SystemTime {
        self.expiry_time
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for CertPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertPair")
            .field("chain_len", &self.chain.len())
            .field("roots_len", &self.roots.len())
            .field("private_key", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

fn parse_certs(what: &'static str, pem: &str) -> Result<Vec<CertificateDer<'static>>, Error> {
    CertificateDer::pem_slice_iter(pem.as_bytes())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| Error::Pem { what, source })
}

/// The instant `lifetime` from now.
pub(crate) fn expiry_after(lifetime: Duration) -> Result<Instant, Error> {
    Instant::now()
        .checked_add(lifetime)
        .ok_or_else(|| Error::InvalidConfig(format!("lifetime {lifetime:?} is out of range")))
}

fn last_pem_block(pem: &str) -> &str {
    pem.rfind("-----BEGIN CERTIFICATE-----")
        .map_or("", |start| pem[start..].trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::self_signed;

    #[tokio::test(start_paused = true)]
    async fn expires_at_the_given_instant() {
        let (cert, key) = self_signed("spiffe://cluster.local/ns/default/sa/foo");
        let expires_at = Instant::now() + Duration::from_secs(60);
        let pair = CertPair::from_pem(&cert, &key, &cert, expires_at).expect("valid pair");

        assert_eq!(pair.chain().len(), 1);
        assert_eq!(pair.roots().len(), 1);
        assert_eq!(pair.leaf(), &pair.roots()[0]);
        assert!(!pair.is_expired());

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(pair.is_expired());
    }

    #[test]
    fn rejects_empty_chain() {
        let (_, key) = self_signed("spiffe://cluster.local/ns/default/sa/foo");
        let err = CertPair::from_pem("", &key, "", Instant::now()).unwrap_err();
        assert!(matches!(err, Error::EmptyChain), "{err}");
    }

    #[test]
    fn root_defaults_to_last_chain_entry() {
        let (leaf, key) = self_signed("spiffe://cluster.local/ns/default/sa/foo");
        let (root, _) = self_signed("spiffe://cluster.local/ns/istio-system/sa/istiod");
        let chain = format!("{leaf}{root}");
        let pair = CertPair::from_pem(chain, &key, "", Instant::now()).expect("valid pair");

        assert_eq!(pair.roots().len(), 1);
        assert_eq!(&pair.roots()[0], &pair.chain()[1]);
        assert_eq!(pair.root_cert_pem(), root.trim_end());
    }

    #[test]
    fn exposes_wall_clock_expiry() {
        let (cert, key) = self_signed("spiffe://cluster.local/ns/default/sa/foo");
        let before = SystemTime::now();
        let pair =
            CertPair::from_pem(&cert, &key, "", Instant::now() + Duration::from_secs(60))
                .expect("valid pair");
        let after = SystemTime::now();

        assert!(pair.expiry_time() >= before + Duration::from_secs(60));
        assert!(pair.expiry_time() <= after + Duration::from_secs(60));
    }

    #[tokio::test]
    async fn rejects_unrepresentable_lifetime() {
        assert!(expiry_after(Duration::from_secs(60)).is_ok());
        assert!(matches!(
            expiry_after(Duration::MAX),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn debug_redacts_the_key() {
        let (cert, key) = self_signed("spiffe://cluster.local/ns/default/sa/foo");
        let pair = CertPair::from_pem(&cert, &key, "", Instant::now()).expect("valid pair");
        let debug = format!("{pair:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("PRIVATE KEY"));
    }
}
