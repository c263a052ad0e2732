use crate::{cert::expiry_after, CertPair, Error};
use ahash::AHashMap as HashMap;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use xds_agent_core::GoDuration;

pub const CERTIFICATE_FILE: &str = "certificate_file";
pub const PRIVATE_KEY_FILE: &str = "private_key_file";
pub const CA_CERTIFICATE_FILE: &str = "ca_certificate_file";
pub const REFRESH_INTERVAL: &str = "refresh_interval";

/// Locates a certificate, key and trust bundle on local disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSource {
    pub certificate: PathBuf,
    pub private_key: PathBuf,
    pub ca_certificate: PathBuf,
    /// How long a loaded pair is used before the files are read again.
    pub refresh_interval: Duration,
}

// === impl FileSource ===

impl FileSource {
    /// Reads the source from a secret configuration map.
    pub fn from_config<'a>(
        config: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, Error> {
        let config = config.into_iter().collect::<HashMap<_, _>>();
        let get = |key: &str| {
            config
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::InvalidConfig(format!("missing {key}")))
        };

        let refresh_interval: Duration = get(REFRESH_INTERVAL)?
            .parse::<GoDuration>()
            .map_err(|error| Error::InvalidConfig(format!("invalid {REFRESH_INTERVAL}: {error}")))?
            .into();

        Ok(Self {
            certificate: get(CERTIFICATE_FILE)?.into(),
            private_key: get(PRIVATE_KEY_FILE)?.into(),
            ca_certificate: get(CA_CERTIFICATE_FILE)?.into(),
            refresh_interval,
        })
    }

    /// Reads all three files and builds a pair that expires after the refresh
    /// interval.
    pub async fn load(&self) -> Result<CertPair, Error> {
        let cert = read(&self.certificate).await?;
        let key = read(&self.private_key).await?;
        let root = read(&self.ca_certificate).await?;
        CertPair::from_pem(cert, key, root, expiry_after(self.refresh_interval)?)
    }
}

async fn read(path: &Path) -> Result<String, Error> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::self_signed;
    use maplit::hashmap;
    use std::fs;
    use tokio::time::Instant;

    #[test]
    fn parses_config() {
        let config = hashmap! {
            CERTIFICATE_FILE => "/etc/certs/cert-chain.pem",
            PRIVATE_KEY_FILE => "/etc/certs/key.pem",
            CA_CERTIFICATE_FILE => "/etc/certs/root-cert.pem",
            REFRESH_INTERVAL => "1m30s",
        };
        let source = FileSource::from_config(config).expect("valid config");
        assert_eq!(
            source,
            FileSource {
                certificate: "/etc/certs/cert-chain.pem".into(),
                private_key: "/etc/certs/key.pem".into(),
                ca_certificate: "/etc/certs/root-cert.pem".into(),
                refresh_interval: Duration::from_secs(90),
            }
        );
    }

    #[test]
    fn rejects_incomplete_config() {
        let config = hashmap! {
            CERTIFICATE_FILE => "/etc/certs/cert-chain.pem",
            REFRESH_INTERVAL => "1m",
        };
        assert!(matches!(
            FileSource::from_config(config),
            Err(Error::InvalidConfig(_))
        ));

        let config = hashmap! {
            CERTIFICATE_FILE => "/etc/certs/cert-chain.pem",
            PRIVATE_KEY_FILE => "/etc/certs/key.pem",
            CA_CERTIFICATE_FILE => "/etc/certs/root-cert.pem",
            REFRESH_INTERVAL => "soon",
        };
        assert!(matches!(
            FileSource::from_config(config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn loads_pair_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let (cert, key) = self_signed("spiffe://cluster.local/ns/default/sa/foo");
        let (root, _) = self_signed("spiffe://cluster.local/ns/istio-system/sa/istiod");
        fs::write(dir.path().join("cert.pem"), &cert).unwrap();
        fs::write(dir.path().join("key.pem"), &key).unwrap();
        fs::write(dir.path().join("root.pem"), &root).unwrap();

        let source = FileSource {
            certificate: dir.path().join("cert.pem"),
            private_key: dir.path().join("key.pem"),
            ca_certificate: dir.path().join("root.pem"),
            refresh_interval: Duration::from_secs(60),
        };
        let start = Instant::now();
        let pair = source.load().await.expect("pair must load");
        assert_eq!(pair.cert_chain_pem(), cert);
        assert_eq!(pair.root_cert_pem(), root);
        assert_eq!(pair.expires_at(), start + Duration::from_secs(60));
    }

    #[tokio::test]
    async fn empty_ca_file_uses_chain_root() {
        let dir = tempfile::tempdir().unwrap();
        let (cert, key) = self_signed("spiffe://cluster.local/ns/default/sa/foo");
        fs::write(dir.path().join("cert.pem"), &cert).unwrap();
        fs::write(dir.path().join("key.pem"), &key).unwrap();
        fs::write(dir.path().join("root.pem"), "").unwrap();

        let source = FileSource {
            certificate: dir.path().join("cert.pem"),
            private_key: dir.path().join("key.pem"),
            ca_certificate: dir.path().join("root.pem"),
            refresh_interval: Duration::from_secs(60),
        };
        let pair = source.load().await.expect("pair must load");
        assert_eq!(pair.roots(), pair.chain());
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let source = FileSource {
            certificate: "/nonexistent/cert.pem".into(),
            private_key: "/nonexistent/key.pem".into(),
            ca_certificate: "/nonexistent/root.pem".into(),
            refresh_interval: Duration::from_secs(60),
        };
        assert!(matches!(source.load().await, Err(Error::Io { .. })));
    }
}
