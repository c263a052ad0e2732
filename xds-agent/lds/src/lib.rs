#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Extracts authorization policy from Listener discovery responses.
//!
//! The inbound listener's HTTP connection manager carries the RBAC and JWT
//! authentication filters from which a [`PolicyStore`] is rebuilt on every
//! update.

mod convert;
mod jwt;
mod rbac;


use ahash::AHashSet as HashSet;
use tracing::{debug, trace, warn};
use xds_agent_api::{
    discovery::DiscoveryResponse,
    http_connection_manager::{
        http_connection_manager::RouteSpecifier, http_filter, HttpConnectionManager, HttpFilter,
    },
    jwt_authn::JwtAuthentication,
    listener::{filter, Listener},
    rbac::{self as proto, rbac::Action as ProtoAction},
    type_url_matches, unpack, Resource,
};
use xds_agent_core::{Action, PolicyStore, SharedPolicyStore};

pub const VIRTUAL_INBOUND: &str = "virtualInbound";
pub const HTTP_CONNECTION_MANAGER: &str = "envoy.filters.network.http_connection_manager";
pub const RBAC_FILTER: &str = "envoy.filters.http.rbac";
pub const JWT_FILTER: &str = "envoy.filters.http.jwt_authn";

/// Decodes every resource of type `R` carried by `rsp`.
///
/// Resources of another type and resources that fail to decode are logged and
/// skipped.
pub fn decode_resources<R: Resource>(rsp: &DiscoveryResponse) -> Vec<R> {
    if !rsp.type_url.is_empty() && !type_url_matches(&rsp.type_url, R::TYPE_URL) {
        debug!(type_url = %rsp.type_url, expected = R::TYPE_URL, "Ignoring response");
        return Vec::new();
    }

    rsp.resources
        .iter()
        .enumerate()
        .filter_map(|(index, any)| match unpack::<R>(any) {
            Some(Ok(resource)) => Some(resource),
            Some(Err(error)) => {
                warn!(index, %error, "Dropping resource that failed to decode");
                None
            }
            None => {
                debug!(index, type_url = %any.type_url, "Dropping resource of unexpected type");
                None
            }
        })
        .collect()
}

/// Rebuilds `store` from the RBAC and JWT filters of the inbound listener.
///
/// The store is cleared first, so rules from a previous pass never survive.
/// A missing inbound listener or filter simply yields an empty store.
pub fn resolve(listeners: &[Listener], store: &mut PolicyStore) {
    store.clear();

    let filters = inbound_http_filters(listeners);
    for rules in rbac_rules(&filters) {
        let action = match ProtoAction::try_from(rules.action) {
            Ok(ProtoAction::Allow) => Action::Allow,
            Ok(ProtoAction::Deny) => Action::Deny,
            Ok(ProtoAction::Log) => {
                debug!("Skipping RBAC rules with LOG action");
                continue;
            }
            // The control plane's documented default is ALLOW.
            Err(_) => {
                debug!(action = rules.action, "Treating unknown RBAC action as ALLOW");
                Action::Allow
            }
        };

        for (name, policy) in &rules.policies {
            trace!(policy = %name, ?action, "Resolving RBAC policy");
            for permission in &policy.permissions {
                rbac::resolve_permission(name, permission, action, store);
            }
            for principal in &policy.principals {
                rbac::resolve_principal(name, principal, action, store);
            }
        }
    }

    for authn in jwt_authentications(&filters) {
        for (name, provider) in &authn.providers {
            store.add_jwt_provider(jwt::provider_rule(name, provider));
        }
    }
}

/// Decodes listeners from `rsp` and replaces the contents of `store` with the
/// policy they carry. Returns the decoded listeners.
///
/// Rules are resolved into a fresh store which is swapped in under the write
/// lock, so readers never observe a partially-populated store.
pub fn apply(rsp: &DiscoveryResponse, store: &SharedPolicyStore) -> Vec<Listener> {
    let listeners = decode_resources::<Listener>(rsp);
    let mut resolved = PolicyStore::default();
    resolve(&listeners, &mut resolved);
    debug!(
        listeners = listeners.len(),
        identities = resolved.identities.len(),
        ip_blocks = resolved.ip_blocks.len(),
        jwt_auths = resolved.jwt_auths.len(),
        targets = resolved.targets.len(),
        headers = resolved.headers.len(),
        jwt_providers = resolved.jwt_providers.len(),
        "Resolved listener policy"
    );
    *store.write() = resolved;
    listeners
}

/// Returns the names of the RDS route configurations referenced by any HTTP
/// connection manager of `listeners`, in order of first appearance.
pub fn route_config_names(listeners: &[Listener]) -> Vec<String> {
    let mut seen = HashSet::new();
    listeners
        .iter()
        .flat_map(connection_managers)
        .filter_map(|hcm| match hcm.route_specifier {
            Some(RouteSpecifier::Rds(rds)) if !rds.route_config_name.is_empty() => {
                Some(rds.route_config_name)
            }
            _ => None,
        })
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

fn connection_managers(listener: &Listener) -> impl Iterator<Item = HttpConnectionManager> + '_ {
    listener
        .filter_chains
        .iter()
        .flat_map(|chain| chain.filters.iter())
        .filter(|f| f.name == HTTP_CONNECTION_MANAGER)
        .filter_map(|f| match &f.config_type {
            Some(filter::ConfigType::TypedConfig(any)) => match unpack::<HttpConnectionManager>(any)? {
                Ok(hcm) => Some(hcm),
                Err(error) => {
                    warn!(listener = %listener.name, %error, "Invalid HTTP connection manager");
                    None
                }
            },
            None => None,
        })
}

fn inbound_http_filters(listeners: &[Listener]) -> Vec<HttpFilter> {
    listeners
        .iter()
        .filter(|l| l.name == VIRTUAL_INBOUND)
        .flat_map(connection_managers)
        .flat_map(|hcm| hcm.http_filters)
        .collect()
}

fn typed_configs<'f, R: Resource>(
    filters: &'f [HttpFilter],
    name: &'static str,
) -> impl Iterator<Item = R> + 'f {
    filters
        .iter()
        .filter(move |f| f.name == name)
        .filter_map(move |f| match &f.config_type {
            Some(http_filter::ConfigType::TypedConfig(any)) => match unpack::<R>(any)? {
                Ok(config) => Some(config),
                Err(error) => {
                    warn!(filter = name, %error, "Invalid HTTP filter configuration");
                    None
                }
            },
            None => None,
        })
}

fn rbac_rules(filters: &[HttpFilter]) -> impl Iterator<Item = proto::Rbac> + '_ {
    typed_configs::<proto::filter::Rbac>(filters, RBAC_FILTER).filter_map(|rbac| rbac.rules)
}

fn jwt_authentications(filters: &[HttpFilter]) -> impl Iterator<Item = JwtAuthentication> + '_ {
    typed_configs(filters, JWT_FILTER)
}
