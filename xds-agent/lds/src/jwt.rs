use tracing::{debug, warn};
use xds_agent_api::{
    config_core::data_source::Specifier,
    jwt_authn::{jwt_provider::JwksSourceSpecifier, JwtProvider},
};
use xds_agent_core::rules::{Jwks, JwtHeader, JwtProviderRule};

pub(crate) fn provider_rule(name: &str, provider: &JwtProvider) -> JwtProviderRule {
    let jwks = provider
        .jwks_source_specifier
        .as_ref()
        .and_then(|JwksSourceSpecifier::LocalJwks(source)| source.specifier.as_ref())
        .and_then(|spec| match spec {
            Specifier::InlineString(jwks) => Some(Jwks::Inline(jwks.clone())),
            Specifier::InlineBytes(bytes) => match String::from_utf8(bytes.clone()) {
                Ok(jwks) => Some(Jwks::Inline(jwks)),
                Err(error) => {
                    warn!(provider = %name, %error, "Ignoring non-UTF-8 inline JWKS");
                    None
                }
            },
            Specifier::Filename(path) => Some(Jwks::File(path.into())),
            Specifier::EnvironmentVariable(var) => {
                debug!(provider = %name, %var, "Ignoring JWKS sourced from the environment");
                None
            }
        });

    JwtProviderRule {
        name: name.to_string(),
        from_headers: provider
            .from_headers
            .iter()
            .map(|h| JwtHeader {
                name: h.name.clone(),
                value_prefix: h.value_prefix.clone(),
            })
            .collect(),
        issuer: provider.issuer.clone(),
        audiences: provider.audiences.clone(),
        jwks,
        from_params: provider.from_params.clone(),
        forward_payload_header: provider.forward_payload_header.clone(),
        forward: provider.forward,
    }
}
