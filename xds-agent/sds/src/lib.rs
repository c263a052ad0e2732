#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Workload certificate lifecycle.
//!
//! A [`CertManager`] caches the current [`CertPair`] and replaces it when it
//! expires, either by exchanging a CSR with an Istio CA ([`CaProvider`] over
//! [`IstioCa`]) or by re-reading files from disk ([`FileSource`]). A
//! [`Refresher`] drives the expiry check on a fixed period.

mod cert;
pub mod ca;
pub mod csr;
mod error;
pub mod file;
mod manager;
mod refresh;

pub use self::{
    ca::{CertificateAuthority, IstioCa, TokenSource},
    cert::CertPair,
    csr::{CertificateRequest, Identity, KeyAlgorithm},
    error::Error,
    file::FileSource,
    manager::{
        CaProvider, Callback, CertManager, CertProvider, DEFAULT_GRACE_PERIOD_RATIO,
        DEFAULT_SECRET_TTL,
    },
    refresh::{Refresher, DEFAULT_REFRESH_PERIOD},
};

#[cfg(test)]
mod test_util {
    use rcgen::{string::Ia5String, CertificateParams, KeyPair, SanType};

    /// Mints a self-signed certificate for `uri`, returning the certificate
    /// and key as PEM.
    pub(crate) fn self_signed(uri: &str) -> (String, String) {
        let key = KeyPair::generate().expect("key must generate");
        let mut params = CertificateParams::default();
        params.subject_alt_names = vec![SanType::URI(
            Ia5String::try_from(uri).expect("URI must be ASCII"),
        )];
        let cert = params.self_signed(&key).expect("cert must sign");
        (cert.pem(), key.serialize_pem())
    }
}
