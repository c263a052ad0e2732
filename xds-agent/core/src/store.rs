use crate::rules::{
    HttpHeaderRule, IdentityRule, IpBlockRule, JwtAuthRule, JwtProviderRule, NamedRule,
    TargetRule,
};
use ahash::AHashMap as HashMap;
use parking_lot::RwLock;
use std::sync::Arc;

pub type SharedPolicyStore = Arc<RwLock<PolicyStore>>;

/// Whether a policy grants or denies matching requests.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Allow,
    Deny,
}

/// Rules of one kind, keyed by policy name and partitioned by action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleRegistry<R> {
    allowed: HashMap<String, R>,
    denied: HashMap<String, R>,
}

/// The rules registered under a single policy name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Lookup<'r, R> {
    pub allow: Option<&'r R>,
    pub deny: Option<&'r R>,
}

/// Holds every rule extracted from the control plane's listener
/// configuration.
///
/// The store is rebuilt wholesale on each re-sync: [`PolicyStore::clear`]
/// followed by repopulation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PolicyStore {
    pub identities: RuleRegistry<IdentityRule>,
    pub ip_blocks: RuleRegistry<IpBlockRule>,
    pub jwt_auths: RuleRegistry<JwtAuthRule>,
    pub targets: RuleRegistry<TargetRule>,
    pub headers: RuleRegistry<HttpHeaderRule>,
    pub jwt_providers: HashMap<String, JwtProviderRule>,
}

// === impl Action ===

impl Action {
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

// === impl RuleRegistry ===

impl<R> Default for RuleRegistry<R> {
    fn default() -> Self {
        Self {
            allowed: HashMap::new(),
            denied: HashMap::new(),
        }
    }
}

impl<R> RuleRegistry<R> {
    pub fn clear(&mut self) {
        self.allowed.clear();
        self.denied.clear();
    }

    pub fn lookup(&self, name: &str) -> Lookup<'_, R> {
        Lookup {
            allow: self.allowed.get(name),
            deny: self.denied.get(name),
        }
    }

    pub fn get(&self, name: &str, action: Action) -> Option<&R> {
        self.partition(action).get(name)
    }

    pub fn allowed(&self) -> impl Iterator<Item = (&str, &R)> + '_ {
        self.allowed.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn denied(&self) -> impl Iterator<Item = (&str, &R)> + '_ {
        self.denied.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.allowed.len() + self.denied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty() && self.denied.is_empty()
    }

    /// Evaluates every registered rule with `matches`.
    ///
    /// A request is refused when any deny rule matches. Otherwise it is
    /// permitted if there are no allow rules or if any allow rule matches.
    pub fn permits(&self, matches: impl Fn(&R) -> bool) -> bool {
        if self.denied.values().any(&matches) {
            return false;
        }
        self.allowed.is_empty() || self.allowed.values().any(matches)
    }

    /// Returns the rule registered for `name`, inserting one built by `mk` if
    /// there is none. Used where several call sites contribute to one rule.
    pub fn get_or_insert_with(
        &mut self,
        name: &str,
        action: Action,
        mk: impl FnOnce() -> R,
    ) -> &mut R {
        self.partition_mut(action)
            .entry(name.to_string())
            .or_insert_with(mk)
    }

    fn partition(&self, action: Action) -> &HashMap<String, R> {
        match action {
            Action::Allow => &self.allowed,
            Action::Deny => &self.denied,
        }
    }

    fn partition_mut(&mut self, action: Action) -> &mut HashMap<String, R> {
        match action {
            Action::Allow => &mut self.allowed,
            Action::Deny => &mut self.denied,
        }
    }
}

impl<R: NamedRule> RuleRegistry<R> {
    /// Registers `rule` under its name, replacing any prior rule for that name
    /// and action.
    pub fn add(&mut self, rule: R, action: Action) {
        let name = rule.name().to_string();
        self.partition_mut(action).insert(name, rule);
    }
}

// === impl PolicyStore ===

impl PolicyStore {
    pub fn shared() -> SharedPolicyStore {
        Arc::new(RwLock::new(Self::default()))
    }

    pub fn clear(&mut self) {
        self.identities.clear();
        self.ip_blocks.clear();
        self.jwt_auths.clear();
        self.targets.clear();
        self.headers.clear();
        self.jwt_providers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
            && self.ip_blocks.is_empty()
            && self.jwt_auths.is_empty()
            && self.targets.is_empty()
            && self.headers.is_empty()
            && self.jwt_providers.is_empty()
    }

    pub fn add_jwt_provider(&mut self, provider: JwtProviderRule) {
        self.jwt_providers.insert(provider.name.clone(), provider);
    }
}
