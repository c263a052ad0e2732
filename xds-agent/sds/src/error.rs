use std::{path::PathBuf, time::Duration};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid PEM in {what}: {source}")]
    Pem {
        what: &'static str,
        #[source]
        source: rustls_pki_types::pem::Error,
    },

    #[error("failed to generate key pair: {0}")]
    KeyGen(#[source] rcgen::Error),

    #[error("key generation was interrupted: {0}")]
    Interrupted(#[from] tokio::task::JoinError),

    #[error("failed to build certificate signing request: {0}")]
    Csr(#[source] rcgen::Error),

    #[error("TLS configuration error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("CA transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("CA returned an error: {0}")]
    Status(#[from] tonic::Status),

    #[error("CA did not respond within {0:?}")]
    Timeout(Duration),

    #[error("CA returned an empty certificate chain")]
    EmptyChain,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
