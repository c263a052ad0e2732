use crate::{
    matcher::{HeaderMatch, ListMatch, StringMatch},
    rule::AndGroup,
};
use ahash::AHashMap as HashMap;
use ipnet::IpNet;
use std::{net::IpAddr, num::NonZeroU16, path::PathBuf};

/// A rule that is registered under its policy name.
pub trait NamedRule {
    fn name(&self) -> &str;
}

/// Constrains the peer's authenticated principal name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityRule {
    pub name: String,
    pub principals: AndGroup<StringMatch>,
}

/// Constrains client and destination addresses.
///
/// Source and remote addresses are populated from a policy's principals while
/// destination addresses come from its permissions. Each dimension is an
/// independent constraint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IpBlockRule {
    pub name: String,
    pub source_ips: AndGroup<IpNet>,
    pub remote_ips: AndGroup<IpNet>,
    pub destination_ips: AndGroup<IpNet>,
}

/// Constrains the claims of an authenticated request token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JwtAuthRule {
    pub name: String,
    pub request_principals: AndGroup<StringMatch>,
    pub audiences: AndGroup<StringMatch>,
    pub presenters: AndGroup<StringMatch>,
    pub claims: HashMap<String, AndGroup<ListMatch>>,
}

/// Constrains the request target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetRule {
    pub name: String,
    pub hosts: AndGroup<StringMatch>,
    pub ports: AndGroup<NonZeroU16>,
    pub methods: AndGroup<StringMatch>,
    pub paths: AndGroup<StringMatch>,
}

/// Constrains request headers, independently per header name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpHeaderRule {
    pub name: String,
    pub headers: HashMap<String, AndGroup<HeaderMatch>>,
}

/// Describes where a JWT provider's tokens are found and how they are
/// verified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JwtProviderRule {
    pub name: String,
    pub from_headers: Vec<JwtHeader>,
    pub issuer: String,
    pub audiences: Vec<String>,
    pub jwks: Option<Jwks>,
    pub from_params: Vec<String>,
    pub forward_payload_header: String,
    pub forward: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JwtHeader {
    pub name: String,
    pub value_prefix: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Jwks {
    Inline(String),
    File(PathBuf),
}

/// The verified claims of a request's JWT.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JwtClaims {
    /// `<iss>/<sub>`
    pub principal: Option<String>,
    pub audiences: Vec<String>,
    /// The `azp` claim.
    pub presenter: Option<String>,
    pub claims: HashMap<String, Vec<String>>,
}

// === impl IdentityRule ===

impl IdentityRule {
    pub fn matches(&self, principal: &str) -> bool {
        self.principals.matches(principal)
    }
}

impl NamedRule for IdentityRule {
    fn name(&self) -> &str {
        &self.name
    }
}

// === impl IpBlockRule ===

impl IpBlockRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_ips: AndGroup::new(),
            remote_ips: AndGroup::new(),
            destination_ips: AndGroup::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.source_ips.is_empty() && self.remote_ips.is_empty() && self.destination_ips.is_empty()
    }

    pub fn matches(&self, source: IpAddr, remote: IpAddr, destination: IpAddr) -> bool {
        self.source_ips.matches(&source)
            && self.remote_ips.matches(&remote)
            && self.destination_ips.matches(&destination)
    }
}

impl NamedRule for IpBlockRule {
    fn name(&self) -> &str {
        &self.name
    }
}

// === impl JwtAuthRule ===

impl JwtAuthRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            request_principals: AndGroup::new(),
            audiences: AndGroup::new(),
            presenters: AndGroup::new(),
            claims: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.request_principals.is_empty()
            && self.audiences.is_empty()
            && self.presenters.is_empty()
            && self.claims.is_empty()
    }

    pub fn matches(&self, jwt: &JwtClaims) -> bool {
        let principal = jwt.principal.as_slice();
        let presenter = jwt.presenter.as_slice();
        self.request_principals.matches(principal)
            && self.audiences.matches(jwt.audiences.as_slice())
            && self.presenters.matches(presenter)
            && self.claims.iter().all(|(name, group)| {
                let values = jwt.claims.get(name).map(Vec::as_slice).unwrap_or_default();
                group.matches(values)
            })
    }
}

impl NamedRule for JwtAuthRule {
    fn name(&self) -> &str {
        &self.name
    }
}

// === impl TargetRule ===

impl TargetRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hosts: AndGroup::new(),
            ports: AndGroup::new(),
            methods: AndGroup::new(),
            paths: AndGroup::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
            && self.ports.is_empty()
            && self.methods.is_empty()
            && self.paths.is_empty()
    }

    pub fn matches(&self, host: &str, port: u16, method: &str, path: &str) -> bool {
        self.hosts.matches(host)
            && self.ports.matches(&port)
            && self.methods.matches(method)
            && self.paths.matches(path)
    }
}

impl NamedRule for TargetRule {
    fn name(&self) -> &str {
        &self.name
    }
}

// === impl HttpHeaderRule ===

impl HttpHeaderRule {
    /// Evaluates the rule using `header` to look up request header values by
    /// name.
    pub fn matches<'a, F>(&self, header: F) -> bool
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        self.headers
            .iter()
            .all(|(name, group)| group.matches(&header(name.as_str())))
    }
}

impl NamedRule for HttpHeaderRule {
    fn name(&self) -> &str {
        &self.name
    }
}
