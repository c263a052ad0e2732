#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Protobuf bindings for the subset of the Envoy xDS API consumed by the
//! agent, plus the Istio certificate service.
//!
//! The `gen/` sources are checked in so that building the workspace does not
//! require `protoc`.

pub mod discovery {
    include!("gen/envoy.service.discovery.v3.rs");
}

pub mod config_core {
    include!("gen/envoy.config.core.v3.rs");
}

pub mod matcher {
    include!("gen/envoy.type.matcher.v3.rs");
}

pub mod route {
    include!("gen/envoy.config.route.v3.rs");
}

pub mod listener {
    include!("gen/envoy.config.listener.v3.rs");
}

pub mod http_connection_manager {
    include!("gen/envoy.extensions.filters.network.http_connection_manager.v3.rs");
}

pub mod rbac {
    include!("gen/envoy.config.rbac.v3.rs");

    /// The `envoy.filters.http.rbac` filter configuration.
    pub mod filter {
        include!("gen/envoy.extensions.filters.http.rbac.v3.rs");
    }
}

pub mod jwt_authn {
    include!("gen/envoy.extensions.filters.http.jwt_authn.v3.rs");
}

pub mod ca {
    include!("gen/istio.v1.auth.rs");
}

/// A message that may be carried in a `google.protobuf.Any`.
pub trait Resource: prost::Message + Default {
    const TYPE_URL: &'static str;
}

macro_rules! resource {
    ($ty:ty, $name:literal) => {
        impl Resource for $ty {
            const TYPE_URL: &'static str = concat!("type.googleapis.com/", $name);
        }
    };
}

resource!(listener::Listener, "envoy.config.listener.v3.Listener");
resource!(
    http_connection_manager::HttpConnectionManager,
    "envoy.extensions.filters.network.http_connection_manager.v3.HttpConnectionManager"
);
resource!(rbac::filter::Rbac, "envoy.extensions.filters.http.rbac.v3.RBAC");
resource!(
    jwt_authn::JwtAuthentication,
    "envoy.extensions.filters.http.jwt_authn.v3.JwtAuthentication"
);

/// Decodes `any` as `R`, returning `None` when it carries another type.
pub fn unpack<R: Resource>(any: &prost_types::Any) -> Option<Result<R, prost::DecodeError>> {
    if !type_url_matches(&any.type_url, R::TYPE_URL) {
        return None;
    }
    Some(R::decode(any.value.as_slice()))
}

/// Wraps `msg` in a `google.protobuf.Any`.
pub fn pack<R: Resource>(msg: &R) -> prost_types::Any {
    prost_types::Any {
        type_url: R::TYPE_URL.to_string(),
        value: msg.encode_to_vec(),
    }
}

/// Compares type URLs by the fully-qualified message name, ignoring the host
/// portion (e.g. `type.googleapis.com/`).
pub fn type_url_matches(actual: &str, expected: &str) -> bool {
    fn name(url: &str) -> &str {
        url.rsplit('/').next().unwrap_or(url)
    }
    name(actual) == name(expected)
}
