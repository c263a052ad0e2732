#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod duration;
pub mod matcher;
pub mod rule;
pub mod rules;
pub mod store;

pub use self::{
    duration::{DurationParseError, GoDuration},
    matcher::{HeaderMatch, ListMatch, Matches, StringMatch},
    rule::{AndGroup, OrGroup},
    store::{Action, Lookup, PolicyStore, RuleRegistry, SharedPolicyStore},
};
pub use ipnet::{IpNet, Ipv4Net, Ipv6Net};
