use crate::convert::{self, InvalidMatcher};
use ahash::AHashMap as HashMap;
use std::{num::NonZeroU16, slice};
use tracing::{trace, warn};
use xds_agent_api::{
    matcher::{metadata_matcher::path_segment::Segment, value_matcher, MetadataMatcher},
    rbac::{permission, principal, Permission, Principal},
};
use xds_agent_core::{
    rules::{HttpHeaderRule, IdentityRule, IpBlockRule, JwtAuthRule, TargetRule},
    Action, AndGroup, HeaderMatch, IpNet, ListMatch, OrGroup, PolicyStore, StringMatch,
};

pub(crate) const ISTIO_AUTHN: &str = "istio_authn";
pub(crate) const REQUEST_AUTH_PRINCIPAL: &str = "request.auth.principal";
pub(crate) const REQUEST_AUTH_AUDIENCES: &str = "request.auth.audiences";
pub(crate) const REQUEST_AUTH_PRESENTER: &str = "request.auth.presenter";
pub(crate) const REQUEST_AUTH_CLAIMS: &str = "request.auth.claims";

pub(crate) const HEADER_AUTHORITY: &str = ":authority";
pub(crate) const HEADER_METHOD: &str = ":method";

/// The alternatives collected from one OR clause of a principal.
#[derive(Default)]
struct PrincipalClause {
    identities: Vec<StringMatch>,
    source_ips: Vec<IpNet>,
    remote_ips: Vec<IpNet>,
    request_principals: Vec<StringMatch>,
    audiences: Vec<StringMatch>,
    presenters: Vec<StringMatch>,
    claims: HashMap<String, Vec<ListMatch>>,
    headers: HashMap<String, Vec<HeaderMatch>>,
}

/// The alternatives collected from one OR clause of a permission.
#[derive(Default)]
struct PermissionClause {
    hosts: Vec<StringMatch>,
    ports: Vec<NonZeroU16>,
    methods: Vec<StringMatch>,
    paths: Vec<StringMatch>,
    destination_ips: Vec<IpNet>,
}

/// Pushes `values` as a new clause of `group`, unless no value was collected.
fn push_clause<T>(group: &mut AndGroup<T>, values: Vec<T>, negate: bool) {
    if !values.is_empty() {
        group.push(OrGroup::new(values, negate));
    }
}

fn log_invalid(policy: &str, kind: &'static str, error: InvalidMatcher) {
    warn!(%policy, %error, "Ignoring invalid {kind} matcher");
}

// === principals ===

/// Resolves a principal's AND-of-OR structure into identity, IP block, JWT
/// and header rules registered under `policy`.
///
/// A wildcard at the top level grants the policy to every peer, so no rule is
/// built for it at all.
pub(crate) fn resolve_principal(
    policy: &str,
    principal: &Principal,
    action: Action,
    store: &mut PolicyStore,
) {
    let mut identity = IdentityRule {
        name: policy.to_string(),
        principals: AndGroup::new(),
    };
    let mut source_ips = AndGroup::new();
    let mut remote_ips = AndGroup::new();
    let mut jwt = JwtAuthRule::new(policy);
    let mut headers = HttpHeaderRule {
        name: policy.to_string(),
        headers: HashMap::new(),
    };

    for entry in principal_and_ids(principal) {
        if let Some(principal::Identifier::Any(true)) = entry.identifier {
            trace!(%policy, "Principal matches any peer");
            return;
        }

        let (negate, entry) = match &entry.identifier {
            Some(principal::Identifier::NotId(inner)) => (true, &**inner),
            _ => (false, entry),
        };

        let mut clause = PrincipalClause::default();
        for id in principal_or_ids(entry) {
            scan_principal(policy, id, &mut clause);
        }

        push_clause(&mut identity.principals, clause.identities, negate);
        push_clause(&mut source_ips, clause.source_ips, negate);
        push_clause(&mut remote_ips, clause.remote_ips, negate);
        push_clause(&mut jwt.request_principals, clause.request_principals, negate);
        push_clause(&mut jwt.audiences, clause.audiences, negate);
        push_clause(&mut jwt.presenters, clause.presenters, negate);
        for (claim, values) in clause.claims {
            push_clause(jwt.claims.entry(claim).or_default(), values, negate);
        }
        for (header, values) in clause.headers {
            push_clause(headers.headers.entry(header).or_default(), values, negate);
        }
    }

    if !identity.principals.is_empty() {
        trace!(%policy, ?action, principals = ?identity.principals, "Identity rule");
        store.identities.add(identity, action);
    }
    if !source_ips.is_empty() || !remote_ips.is_empty() {
        trace!(%policy, ?action, ?source_ips, ?remote_ips, "IP block rule");
        let rule = store
            .ip_blocks
            .get_or_insert_with(policy, action, || IpBlockRule::new(policy));
        rule.source_ips = source_ips;
        rule.remote_ips = remote_ips;
    }
    if !jwt.is_empty() {
        trace!(%policy, ?action, ?jwt, "JWT rule");
        store.jwt_auths.add(jwt, action);
    }
    if !headers.headers.is_empty() {
        trace!(%policy, ?action, ?headers, "Header rule");
        store.headers.add(headers, action);
    }
}

/// A top-level principal that is not an `and_ids` set is a single AND entry.
fn principal_and_ids(p: &Principal) -> &[Principal] {
    match &p.identifier {
        Some(principal::Identifier::AndIds(set)) => &set.ids,
        None => &[],
        Some(_) => slice::from_ref(p),
    }
}

/// An AND entry that is not an `or_ids` set is a single alternative.
fn principal_or_ids(p: &Principal) -> &[Principal] {
    match &p.identifier {
        Some(principal::Identifier::OrIds(set)) => &set.ids,
        None => &[],
        Some(_) => slice::from_ref(p),
    }
}

fn scan_principal(policy: &str, id: &Principal, clause: &mut PrincipalClause) {
    use principal::Identifier;

    match &id.identifier {
        Some(Identifier::Authenticated(auth)) => {
            if let Some(name) = &auth.principal_name {
                match convert::string_match(name) {
                    Ok(m) => clause.identities.push(m),
                    Err(error) => log_invalid(policy, "principal name", error),
                }
            }
        }
        Some(Identifier::DirectRemoteIp(range)) => match convert::cidr(range) {
            Ok(net) => clause.source_ips.push(net),
            Err(error) => log_invalid(policy, "direct remote IP", error),
        },
        Some(Identifier::RemoteIp(range)) => match convert::cidr(range) {
            Ok(net) => clause.remote_ips.push(net),
            Err(error) => log_invalid(policy, "remote IP", error),
        },
        Some(Identifier::Metadata(md)) if md.filter == ISTIO_AUTHN => {
            scan_authn_metadata(policy, md, clause)
        }
        Some(Identifier::Header(header)) => match convert::header_match(header) {
            Ok(m) => clause
                .headers
                .entry(header.name.clone())
                .or_default()
                .push(m),
            Err(error) => log_invalid(policy, "header", error),
        },
        other => trace!(%policy, identifier = ?other, "Ignoring principal"),
    }
}

fn scan_authn_metadata(policy: &str, md: &MetadataMatcher, clause: &mut PrincipalClause) {
    let keys = md
        .path
        .iter()
        .filter_map(|seg| match &seg.segment {
            Some(Segment::Key(key)) => Some(key.as_str()),
            None => None,
        })
        .collect::<Vec<_>>();
    let Some(value) = md.value.as_ref() else {
        trace!(%policy, ?keys, "Ignoring metadata matcher without a value");
        return;
    };
    if md.invert {
        log_invalid(
            policy,
            "metadata",
            InvalidMatcher::Unsupported("inverted metadata match"),
        );
        return;
    }

    let string_value = || match &value.match_pattern {
        Some(value_matcher::MatchPattern::StringMatch(sm)) => Some(convert::string_match(sm)),
        _ => None,
    };
    let push = |bucket: &mut Vec<StringMatch>| match string_value() {
        Some(Ok(m)) => bucket.push(m),
        Some(Err(error)) => log_invalid(policy, "JWT", error),
        None => trace!(%policy, ?keys, "Ignoring non-string JWT matcher"),
    };

    match keys.as_slice() {
        [REQUEST_AUTH_PRINCIPAL, ..] => push(&mut clause.request_principals),
        [REQUEST_AUTH_AUDIENCES, ..] => push(&mut clause.audiences),
        [REQUEST_AUTH_PRESENTER, ..] => push(&mut clause.presenters),
        [REQUEST_AUTH_CLAIMS, claim, ..] => match &value.match_pattern {
            Some(value_matcher::MatchPattern::ListMatch(list)) => match convert::list_match(list) {
                Ok(m) => clause.claims.entry(claim.to_string()).or_default().push(m),
                Err(error) => log_invalid(policy, "JWT claim", error),
            },
            _ => trace!(%policy, %claim, "Ignoring non-list claim matcher"),
        },
        _ => trace!(%policy, ?keys, "Ignoring metadata matcher"),
    }
}

// === permissions ===

/// Resolves a permission's AND-of-OR structure into a target rule and the
/// destination dimension of the policy's IP block rule.
///
/// A wildcard at the top level grants every request target, so no rule is
/// built for it at all.
pub(crate) fn resolve_permission(
    policy: &str,
    permission: &Permission,
    action: Action,
    store: &mut PolicyStore,
) {
    let mut target = TargetRule::new(policy);
    let mut destination_ips = AndGroup::new();

    for entry in permission_and_rules(permission) {
        if let Some(permission::Rule::Any(true)) = entry.rule {
            trace!(%policy, "Permission matches any request");
            return;
        }

        let (negate, entry) = match &entry.rule {
            Some(permission::Rule::NotRule(inner)) => (true, &**inner),
            _ => (false, entry),
        };

        let mut clause = PermissionClause::default();
        for rule in permission_or_rules(entry) {
            scan_permission(policy, rule, &mut clause);
        }

        push_clause(&mut target.hosts, clause.hosts, negate);
        push_clause(&mut target.ports, clause.ports, negate);
        push_clause(&mut target.methods, clause.methods, negate);
        push_clause(&mut target.paths, clause.paths, negate);
        push_clause(&mut destination_ips, clause.destination_ips, negate);
    }

    if !target.is_empty() {
        trace!(%policy, ?action, ?target, "Target rule");
        store.targets.add(target, action);
    }
    if !destination_ips.is_empty() {
        trace!(%policy, ?action, ?destination_ips, "Destination IP rule");
        store
            .ip_blocks
            .get_or_insert_with(policy, action, || IpBlockRule::new(policy))
            .destination_ips = destination_ips;
    }
}

fn permission_and_rules(p: &Permission) -> &[Permission] {
    match &p.rule {
        Some(permission::Rule::AndRules(set)) => &set.rules,
        None => &[],
        Some(_) => slice::from_ref(p),
    }
}

fn permission_or_rules(p: &Permission) -> &[Permission] {
    match &p.rule {
        Some(permission::Rule::OrRules(set)) => &set.rules,
        None => &[],
        Some(_) => slice::from_ref(p),
    }
}

fn scan_permission(policy: &str, rule: &Permission, clause: &mut PermissionClause) {
    use permission::Rule;

    match &rule.rule {
        Some(Rule::DestinationPort(p)) => match convert::port(*p) {
            Some(port) => clause.ports.push(port),
            None => warn!(%policy, port = *p, "Ignoring out-of-range destination port"),
        },
        Some(Rule::Header(header)) => {
            let bucket = match header.name.as_str() {
                HEADER_AUTHORITY => &mut clause.hosts,
                HEADER_METHOD => &mut clause.methods,
                name => {
                    trace!(%policy, header = %name, "Ignoring header permission");
                    return;
                }
            };
            match convert::header_value_match(header) {
                Ok(m) => bucket.push(m),
                Err(error) => log_invalid(policy, "header", error),
            }
        }
        Some(Rule::UrlPath(path)) => match convert::path_match(path) {
            Ok(m) => clause.paths.push(m),
            Err(error) => log_invalid(policy, "path", error),
        },
        Some(Rule::DestinationIp(range)) => match convert::cidr(range) {
            Ok(net) => clause.destination_ips.push(net),
            Err(error) => log_invalid(policy, "destination IP", error),
        },
        other => trace!(%policy, rule = ?other, "Ignoring permission"),
    }
}
