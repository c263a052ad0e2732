use crate::Error;
use async_trait::async_trait;
use rustls::{
    client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier},
    crypto::{self, CryptoProvider},
    ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme,
};
use rustls_pki_types::{pem::PemObject, CertificateDer, ServerName, UnixTime};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::{sync::oneshot, task::JoinHandle};
use tonic::{metadata::MetadataValue, transport::Endpoint};
use tracing::{debug, warn};
use xds_agent_api::ca::{
    istio_certificate_service_client::IstioCertificateServiceClient, IstioCertificateRequest,
};

pub const DEFAULT_CA_ADDR: &str = "https://istiod.istio-system.svc:15012";
pub const DEFAULT_CLUSTER_ID: &str = "Kubernetes";
pub const THIRD_PARTY_TOKEN_PATH: &str = "/var/run/secrets/tokens/istio-token";
pub const FIRST_PARTY_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

const CLUSTER_ID_HEADER: &str = "clusterid";

/// Signs certificate requests.
#[async_trait]
pub trait CertificateAuthority: Send + Sync + 'static {
    /// Submits `csr_pem` and returns the PEM certificate chain, leaf first.
    async fn sign(&self, csr_pem: &str, validity: Duration) -> Result<Vec<String>, Error>;
}

/// Where the bearer token presented to the CA comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenSource {
    Static(String),
    /// Read on every request, from the first path that exists.
    Files(Vec<PathBuf>),
}

/// A client for Istio's `IstioCertificateService`.
#[derive(Clone, Debug)]
pub struct IstioCa {
    endpoint: Endpoint,
    tls: Arc<ClientConfig>,
    token: TokenSource,
    cluster_id: String,
    timeout: Duration,
}

#[derive(Debug)]
struct AcceptAnyServerCert(Arc<CryptoProvider>);

/// Aborts the request task, and closes its connection, when dropped.
struct AbortOnDrop(JoinHandle<()>);

// === impl TokenSource ===

impl TokenSource {
    /// Uses `token` when set, else the projected token at `path` (or the
    /// default third-party path), falling back to the service account token.
    pub fn new(token: Option<String>, path: Option<PathBuf>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            return Self::Static(token.trim().to_string());
        }
        Self::Files(vec![
            path.unwrap_or_else(|| THIRD_PARTY_TOKEN_PATH.into()),
            FIRST_PARTY_TOKEN_PATH.into(),
        ])
    }

    pub async fn load(&self) -> Result<String, Error> {
        let paths = match self {
            Self::Static(token) => return Ok(token.clone()),
            Self::Files(paths) => paths,
        };

        let mut last = None;
        for path in paths {
            match tokio::fs::read_to_string(path).await {
                Ok(token) => return Ok(token.trim().to_string()),
                Err(error) => {
                    debug!(path = %path.display(), %error, "Token not readable");
                    last = Some(Error::io(path, error));
                }
            }
        }
        Err(last.unwrap_or_else(|| Error::InvalidConfig("no token source configured".into())))
    }
}

// === impl IstioCa ===

impl IstioCa {
    /// Builds a client for the CA at `addr`.
    ///
    /// When `root_cert_pem` is `None` the CA's certificate is not verified.
    /// That mode only exists to bootstrap before a trust bundle is available.
    pub fn new(
        addr: &str,
        root_cert_pem: Option<&str>,
        token: TokenSource,
        cluster_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let endpoint = Endpoint::from_shared(addr.to_string())?;
        let provider = Arc::new(crypto::aws_lc_rs::default_provider());
        let builder =
            ClientConfig::builder_with_provider(provider.clone()).with_safe_default_protocol_versions()?;

        let tls = match root_cert_pem {
            Some(pem) => {
                let mut roots = RootCertStore::empty();
                for cert in CertificateDer::pem_slice_iter(pem.as_bytes()) {
                    let cert = cert.map_err(|source| Error::Pem {
                        what: "CA root certificate",
                        source,
                    })?;
                    roots.add(cert)?;
                }
                builder.with_root_certificates(roots).with_no_client_auth()
            }
            None => {
                warn!(%addr, "No CA root certificate configured; the CA's identity will not be verified");
                builder
                    .dangerous()
                    .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert(provider)))
                    .with_no_client_auth()
            }
        };

        Ok(Self {
            endpoint,
            tls: Arc::new(tls),
            token,
            cluster_id: cluster_id.into(),
            timeout,
        })
    }

    async fn request(
        &self,
        csr_pem: &str,
        validity: Duration,
    ) -> Result<tonic::Request<IstioCertificateRequest>, Error> {
        let token = self.token.load().await?;
        let mut req = tonic::Request::new(IstioCertificateRequest {
            csr: csr_pem.to_string(),
            validity_duration: i64::try_from(validity.as_secs()).unwrap_or(i64::MAX),
            metadata: None,
        });
        let md = req.metadata_mut();
        md.insert(
            "authorization",
            MetadataValue::try_from(format!("Bearer {token}"))
                .map_err(|_| Error::InvalidConfig("token is not a valid header value".into()))?,
        );
        md.insert(
            CLUSTER_ID_HEADER,
            MetadataValue::try_from(self.cluster_id.as_str())
                .map_err(|_| Error::InvalidConfig("cluster id is not a valid header value".into()))?,
        );
        Ok(req)
    }
}

#[async_trait]
impl CertificateAuthority for IstioCa {
    async fn sign(&self, csr_pem: &str, validity: Duration) -> Result<Vec<String>, Error> {
        let req = self.request(csr_pem, validity).await?;
        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config((*self.tls).clone())
            .https_only()
            .enable_http2()
            .build();
        let endpoint = self.endpoint.clone();

        let (tx, rx) = oneshot::channel();
        let _task = AbortOnDrop(tokio::spawn(async move {
            let res = async move {
                let channel = endpoint.connect_with_connector(connector).await?;
                let rsp = IstioCertificateServiceClient::new(channel)
                    .create_certificate(req)
                    .await?;
                Ok::<_, Error>(rsp.into_inner().cert_chain)
            }
            .await;
            let _ = tx.send(res);
        }));

        let chain = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(res)) => res?,
            Ok(Err(_)) => {
                return Err(Error::Status(tonic::Status::aborted(
                    "certificate request was interrupted",
                )))
            }
            Err(_) => return Err(Error::Timeout(self.timeout)),
        };

        if chain.is_empty() {
            return Err(Error::EmptyChain);
        }
        debug!(certs = chain.len(), "CA signed certificate");
        Ok(chain)
    }
}

// === impl AbortOnDrop ===

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

// === impl AcceptAnyServerCert ===

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        crypto::verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        crypto::verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::self_signed;
    use std::io::Write;
    use tokio::{io::AsyncReadExt, net::TcpListener};

    /// Accepts connections but never answers a TLS handshake.
    async fn silent_ca() -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut conns = Vec::new();
            while let Ok((conn, _)) = listener.accept().await {
                conns.push(conn);
            }
        });
        addr
    }

    #[tokio::test]
    async fn static_token_wins() {
        let token = TokenSource::new(Some(" abc\n".to_string()), Some("/nonexistent".into()));
        assert_eq!(token, TokenSource::Static("abc".to_string()));
        assert_eq!(token.load().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn token_falls_back_to_next_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "projected-token").unwrap();
        let token = TokenSource::Files(vec!["/nonexistent/token".into(), file.path().into()]);
        assert_eq!(token.load().await.unwrap(), "projected-token");

        let missing = TokenSource::Files(vec!["/nonexistent/token".into()]);
        assert!(matches!(missing.load().await, Err(Error::Io { .. })));
    }

    #[tokio::test]
    async fn request_carries_credentials() {
        let ca = IstioCa::new(
            DEFAULT_CA_ADDR,
            None,
            TokenSource::Static("abc".to_string()),
            DEFAULT_CLUSTER_ID,
            Duration::from_secs(1),
        )
        .unwrap();
        let req = ca
            .request("csr", Duration::from_secs(24 * 60 * 60))
            .await
            .unwrap();
        let header = |name: &str| {
            req.metadata()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        assert_eq!(header("authorization").as_deref(), Some("Bearer abc"));
        assert_eq!(header("clusterid").as_deref(), Some("Kubernetes"));
        assert_eq!(req.get_ref().validity_duration, 86400);
        assert_eq!(req.get_ref().csr, "csr");
    }

    #[test]
    fn rejects_invalid_roots() {
        let err = IstioCa::new(
            DEFAULT_CA_ADDR,
            Some("-----BEGIN CERTIFICATE-----\nnot base64!\n-----END CERTIFICATE-----\n"),
            TokenSource::Static("abc".to_string()),
            DEFAULT_CLUSTER_ID,
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Pem { .. }), "{err}");

        let (root, _) = self_signed("spiffe://cluster.local/ns/istio-system/sa/istiod");
        IstioCa::new(
            DEFAULT_CA_ADDR,
            Some(&root),
            TokenSource::Static("abc".to_string()),
            DEFAULT_CLUSTER_ID,
            Duration::from_secs(1),
        )
        .expect("valid root must be accepted");
    }

    #[tokio::test]
    async fn unresponsive_ca_times_out() {
        let addr = silent_ca().await;
        let timeout = Duration::from_millis(200);
        let ca = IstioCa::new(
            &format!("https://{addr}"),
            None,
            TokenSource::Static("abc".to_string()),
            DEFAULT_CLUSTER_ID,
            timeout,
        )
        .unwrap();
        let err = ca.sign("csr", Duration::from_secs(60)).await.unwrap_err();
        assert!(matches!(err, Error::Timeout(t) if t == timeout), "{err}");
    }

    #[tokio::test]
    async fn abandoned_request_closes_connection() {
        // Holds one connection and reports when the client closes it.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (closed_tx, closed_rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut conn, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            while let Ok(n) = conn.read(&mut buf).await {
                if n == 0 {
                    break;
                }
            }
            let _ = closed_tx.send(());
        });

        let ca = IstioCa::new(
            &format!("https://{addr}"),
            None,
            TokenSource::Static("abc".to_string()),
            DEFAULT_CLUSTER_ID,
            Duration::from_secs(3600),
        )
        .unwrap();
        let res =
            tokio::time::timeout(Duration::from_millis(200), ca.sign("csr", Duration::from_secs(60)))
                .await;
        assert!(res.is_err(), "the CA never answers");

        tokio::time::timeout(Duration::from_secs(2), closed_rx)
            .await
            .expect("connection must be closed once the caller gives up")
            .expect("server task must report");
    }
}
