use crate::Error;
use rcgen::{
    string::Ia5String, CertificateParams, DistinguishedName, DnType, KeyPair, RsaKeySize,
    SanType, PKCS_ECDSA_P256_SHA256, PKCS_RSA_SHA256,
};
use std::{fmt, str::FromStr};

/// The workload identity requested from the CA.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub trust_domain: String,
    pub namespace: String,
    pub service_account: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyAlgorithm {
    EcdsaP256,
    Rsa { bits: u16 },
}

/// A PEM-encoded PKCS#10 request and the private key it was signed with.
pub struct CertificateRequest {
    pub csr_pem: String,
    pub private_key_pem: String,
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported key algorithm {0:?}; expected 'rsa' or 'ecdsa'")]
pub struct InvalidKeyAlgorithm(String);

// === impl Identity ===

impl Identity {
    pub fn spiffe_uri(&self) -> String {
        format!(
            "spiffe://{}/ns/{}/sa/{}",
            self.trust_domain, self.namespace, self.service_account
        )
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.spiffe_uri().fmt(f)
    }
}

// === impl KeyAlgorithm ===

impl KeyAlgorithm {
    pub const DEFAULT_RSA_BITS: u16 = 2048;

    pub fn rsa(bits: u16) -> Result<Self, Error> {
        match bits {
            2048 | 3072 | 4096 => Ok(Self::Rsa { bits }),
            _ => Err(Error::InvalidConfig(format!(
                "unsupported RSA key size {bits}; expected 2048, 3072 or 4096"
            ))),
        }
    }

    fn generate(&self) -> Result<KeyPair, Error> {
        match *self {
            Self::EcdsaP256 => KeyPair::generate_for(&PKCS_ECDSA_P256_SHA256),
            Self::Rsa { bits } => {
                let size = match bits {
                    3072 => RsaKeySize::_3072,
                    4096 => RsaKeySize::_4096,
                    _ => RsaKeySize::_2048,
                };
                KeyPair::generate_rsa_for(&PKCS_RSA_SHA256, size)
            }
        }
        .map_err(Error::KeyGen)
    }
}

impl Default for KeyAlgorithm {
    fn default() -> Self {
        Self::Rsa {
            bits: Self::DEFAULT_RSA_BITS,
        }
    }
}

/// Parses the `ECC_SIGNATURE_ALGORITHM` setting. Only the algorithm family is
/// named here; the RSA key size is configured separately.
impl FromStr for KeyAlgorithm {
    type Err = InvalidKeyAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "rsa" => Ok(Self::default()),
            "ecdsa" | "ec" | "p256" => Ok(Self::EcdsaP256),
            _ => Err(InvalidKeyAlgorithm(s.to_string())),
        }
    }
}

// === impl CertificateRequest ===

impl CertificateRequest {
    /// Generates a fresh key pair and a CSR for `identity`.
    ///
    /// The subject's common name and URI SAN carry the SPIFFE identity and the
    /// organization is the trust domain.
    pub fn generate(identity: &Identity, algorithm: KeyAlgorithm) -> Result<Self, Error> {
        let key = algorithm.generate()?;
        let uri = identity.spiffe_uri();

        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, uri.as_str());
        dn.push(DnType::OrganizationName, identity.trust_domain.as_str());
        params.distinguished_name = dn;
        params.subject_alt_names = vec![SanType::URI(
            Ia5String::try_from(uri).map_err(Error::Csr)?,
        )];

        let csr_pem = params
            .serialize_request(&key)
            .and_then(|csr| csr.pem())
            .map_err(Error::Csr)?;

        Ok(Self {
            csr_pem,
            private_key_pem: key.serialize_pem(),
        })
    }
}

impl fmt::Debug for CertificateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateRequest")
            .field("csr_pem", &self.csr_pem)
            .field("private_key_pem", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            trust_domain: "cluster.local".to_string(),
            namespace: "default".to_string(),
            service_account: "foo".to_string(),
        }
    }

    #[test]
    fn spiffe_uri() {
        assert_eq!(
            identity().spiffe_uri(),
            "spiffe://cluster.local/ns/default/sa/foo"
        );
    }

    #[test]
    fn parses_key_algorithms() {
        assert_eq!("".parse::<KeyAlgorithm>().unwrap(), KeyAlgorithm::default());
        assert_eq!(
            "ECDSA".parse::<KeyAlgorithm>().unwrap(),
            KeyAlgorithm::EcdsaP256
        );
        assert!("ed25519".parse::<KeyAlgorithm>().is_err());
        assert_eq!(
            KeyAlgorithm::rsa(4096).unwrap(),
            KeyAlgorithm::Rsa { bits: 4096 }
        );
        assert!(KeyAlgorithm::rsa(1024).is_err());
    }

    #[test]
    fn ecdsa_request() {
        let req = CertificateRequest::generate(&identity(), KeyAlgorithm::EcdsaP256)
            .expect("must generate");
        assert!(req.csr_pem.starts_with("-----BEGIN CERTIFICATE REQUEST-----"));
        assert!(!req.csr_pem.contains("PRIVATE KEY"));

        let key = KeyPair::from_pem(&req.private_key_pem).expect("key must parse");
        assert!(key.is_compatible(&PKCS_ECDSA_P256_SHA256));
    }

    #[test]
    fn rsa_request() {
        let req = CertificateRequest::generate(&identity(), KeyAlgorithm::default())
            .expect("must generate");
        assert!(req.csr_pem.starts_with("-----BEGIN CERTIFICATE REQUEST-----"));
        assert!(req.private_key_pem.contains("PRIVATE KEY"));
        assert!(format!("{req:?}").contains("<redacted>"));
    }
}
