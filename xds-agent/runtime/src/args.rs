use crate::{
    core::{GoDuration, PolicyStore},
    sds::{
        self, ca, CaProvider, CertManager, FileSource, Identity, IstioCa, KeyAlgorithm,
        Refresher, TokenSource,
    },
    snapshot,
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, info_span, warn, Instrument};

#[derive(Debug, Parser)]
#[clap(name = "xds-agent", about = "An xDS policy and workload certificate agent")]
pub struct Args {
    #[clap(long, default_value = "xds_agent=info,warn", env = "XDS_AGENT_LOG")]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    /// Address of the Istio CA.
    #[clap(long, env = "CA_ADDR", default_value = ca::DEFAULT_CA_ADDR)]
    ca_addr: String,

    /// Trust bundle used to verify the CA. When it cannot be read the CA is
    /// contacted without verification.
    #[clap(
        long,
        env = "CA_ROOT_CERT",
        default_value = "/var/run/secrets/istio/root-cert.pem"
    )]
    ca_root_cert: PathBuf,

    #[clap(long, default_value = "10s")]
    ca_timeout: GoDuration,

    #[clap(long, env = "TRUST_DOMAIN", default_value = "cluster.local")]
    trust_domain: String,

    #[clap(long, env = "POD_NAMESPACE", default_value = "default")]
    namespace: String,

    #[clap(long, env = "SERVICE_ACCOUNT", default_value = "default")]
    service_account: String,

    #[clap(long, env = "ISTIO_META_CLUSTER_ID", default_value = ca::DEFAULT_CLUSTER_ID)]
    cluster_id: String,

    /// Bearer token presented to the CA. Takes precedence over `--token-path`.
    #[clap(long, env = "ISTIOD_TOKEN", hide_env_values = true)]
    istiod_token: Option<String>,

    /// Projected service account token presented to the CA. Defaults to the
    /// third-party token path, falling back to the pod's service account token.
    #[clap(long, env = "ISTIOD_TOKEN_PATH")]
    token_path: Option<PathBuf>,

    /// `rsa` or `ecdsa` (P-256).
    #[clap(long, env = "ECC_SIGNATURE_ALGORITHM", default_value = "rsa")]
    key_algorithm: KeyAlgorithm,

    #[clap(long, env = "RSA_KEY_SIZE", default_value = "2048")]
    rsa_key_size: u16,

    /// Validity requested for workload certificates.
    #[clap(long, env = "SECRET_TTL", default_value = "24h")]
    secret_ttl: GoDuration,

    /// Fraction of the TTL after which a certificate is rotated.
    #[clap(long, env = "SECRET_GRACE_PERIOD_RATIO", default_value = "0.5")]
    secret_grace_period_ratio: f64,

    #[clap(long, default_value = "30s")]
    cert_refresh_period: GoDuration,

    /// A JSON object naming certificate, key and CA files. When set,
    /// certificates are read from disk instead of requested from the CA.
    #[clap(long, env = "SDS_CONFIG")]
    sds_config: Option<String>,

    /// An encoded Listener `DiscoveryResponse` to resolve at startup.
    #[clap(long)]
    lds_snapshot: Option<PathBuf>,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            ca_addr,
            ca_root_cert,
            ca_timeout,
            trust_domain,
            namespace,
            service_account,
            cluster_id,
            istiod_token,
            token_path,
            key_algorithm,
            rsa_key_size,
            secret_ttl,
            secret_grace_period_ratio,
            cert_refresh_period,
            sds_config,
            lds_snapshot,
        } = self;

        log_format.try_init(log_level)?;

        let store = PolicyStore::shared();
        if let Some(path) = lds_snapshot {
            snapshot::apply_file(&path, &store).await?;
        }

        let manager = match sds_config {
            Some(config) => {
                let source = file_source(&config)?;
                info!(
                    certificate = %source.certificate.display(),
                    refresh_interval = ?source.refresh_interval,
                    "Loading certificates from files"
                );
                CertManager::new(source)
            }
            None => {
                let algorithm = match key_algorithm {
                    KeyAlgorithm::Rsa { .. } => KeyAlgorithm::rsa(rsa_key_size)?,
                    alg => alg,
                };
                let identity = Identity {
                    trust_domain,
                    namespace,
                    service_account,
                };
                let root = match tokio::fs::read_to_string(&ca_root_cert).await {
                    Ok(pem) => Some(pem),
                    Err(error) => {
                        let path = ca_root_cert.display();
                        warn!(%path, %error, "CA root certificate unavailable");
                        None
                    }
                };
                let ca = IstioCa::new(
                    &ca_addr,
                    root.as_deref(),
                    TokenSource::new(istiod_token, token_path),
                    cluster_id,
                    ca_timeout.into(),
                )?;
                info!(%identity, ca = %ca_addr, ?algorithm, "Requesting certificates from the CA");
                let provider = CaProvider::new(ca, identity, algorithm)
                    .with_ttl(secret_ttl.into(), secret_grace_period_ratio)?
                    .with_root_cert(ca_root_cert);
                CertManager::new(provider)
            }
        };
        let manager = Arc::new(manager);
        manager
            .register_callback(|pair: &Arc<sds::CertPair>| {
                let expires_at = pair.expires_at();
                info!(chain = pair.chain().len(), ?expires_at, "Certificate rotated");
            })
            .await;

        let (drain_tx, drain_rx) = drain::channel();
        let refresher = tokio::spawn(
            Refresher::new(manager, cert_refresh_period.into())
                .run(drain_rx)
                .instrument(info_span!("refresher")),
        );

        shutdown_signal().await?;
        info!("Shutting down");
        drain_tx.drain().await;
        if refresher.await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}

/// Parses the file-secret configuration map.
fn file_source(config: &str) -> Result<FileSource> {
    let config = serde_json::from_str::<HashMap<String, String>>(config)
        .context("SDS config must be a JSON object of strings")?;
    let source = FileSource::from_config(config.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
    Ok(source)
}

async fn shutdown_signal() -> Result<()> {
    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res?,
        _ = term.recv() => {}
    }
    Ok(())
}
