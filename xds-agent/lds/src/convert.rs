//! Conversions from xDS matcher messages to the agent's typed matchers.

use std::{net::IpAddr, num::NonZeroU16};
use xds_agent_api::{
    config_core::CidrRange,
    matcher::{
        list_matcher, path_matcher, string_matcher::MatchPattern, value_matcher, ListMatcher,
        PathMatcher, StringMatcher, ValueMatcher,
    },
    route::{header_matcher::HeaderMatchSpecifier, HeaderMatcher},
};
use xds_agent_core::{HeaderMatch, IpNet, ListMatch, StringMatch};

#[derive(Debug, thiserror::Error)]
pub(crate) enum InvalidMatcher {
    #[error("matcher has no pattern")]
    Unset,

    #[error("unsupported matcher: {0}")]
    Unsupported(&'static str),

    #[error("invalid regular expression: {0}")]
    Regex(#[from] regex::Error),

    #[error("invalid address prefix: {0:?}")]
    Address(String),

    #[error("invalid prefix length {len} for {addr}")]
    PrefixLen { addr: IpAddr, len: u32 },
}

pub(crate) fn string_match(m: &StringMatcher) -> Result<StringMatch, InvalidMatcher> {
    let matcher = match m.match_pattern.as_ref().ok_or(InvalidMatcher::Unset)? {
        MatchPattern::Exact(s) => StringMatch::exact(s),
        MatchPattern::Prefix(s) => StringMatch::prefix(s),
        MatchPattern::Suffix(s) => StringMatch::suffix(s),
        MatchPattern::Contains(s) => StringMatch::contains(s),
        MatchPattern::SafeRegex(re) => StringMatch::regex(&re.regex)?,
    };
    Ok(matcher.ignore_case(m.ignore_case))
}

/// Converts a pseudo-header matcher (`:authority`, `:method`) to a string
/// matcher on the header's value. The legacy per-field patterns compare
/// case-insensitively.
pub(crate) fn header_value_match(m: &HeaderMatcher) -> Result<StringMatch, InvalidMatcher> {
    if m.invert_match {
        return Err(InvalidMatcher::Unsupported("inverted pseudo-header match"));
    }
    let spec = m
        .header_match_specifier
        .as_ref()
        .ok_or(InvalidMatcher::Unset)?;
    let matcher = match spec {
        HeaderMatchSpecifier::StringMatch(sm) => return string_match(sm),
        HeaderMatchSpecifier::SafeRegexMatch(re) => return Ok(StringMatch::regex(&re.regex)?),
        HeaderMatchSpecifier::PresentMatch(_) => {
            return Err(InvalidMatcher::Unsupported("pseudo-header presence"))
        }
        HeaderMatchSpecifier::ExactMatch(s) => StringMatch::exact(s),
        HeaderMatchSpecifier::PrefixMatch(s) => StringMatch::prefix(s),
        HeaderMatchSpecifier::SuffixMatch(s) => StringMatch::suffix(s),
        HeaderMatchSpecifier::ContainsMatch(s) => StringMatch::contains(s),
    };
    Ok(matcher.ignore_case(true))
}

pub(crate) fn header_match(m: &HeaderMatcher) -> Result<HeaderMatch, InvalidMatcher> {
    let spec = m
        .header_match_specifier
        .as_ref()
        .ok_or(InvalidMatcher::Unset)?;
    let matcher = match spec {
        HeaderMatchSpecifier::PresentMatch(present) => HeaderMatch::present(*present),
        HeaderMatchSpecifier::StringMatch(sm) => HeaderMatch::value(string_match(sm)?),
        HeaderMatchSpecifier::SafeRegexMatch(re) => {
            HeaderMatch::value(StringMatch::regex(&re.regex)?)
        }
        HeaderMatchSpecifier::ExactMatch(s) => HeaderMatch::value(StringMatch::exact(s)),
        HeaderMatchSpecifier::PrefixMatch(s) => HeaderMatch::value(StringMatch::prefix(s)),
        HeaderMatchSpecifier::SuffixMatch(s) => HeaderMatch::value(StringMatch::suffix(s)),
        HeaderMatchSpecifier::ContainsMatch(s) => HeaderMatch::value(StringMatch::contains(s)),
    };
    Ok(matcher.invert(m.invert_match))
}

pub(crate) fn path_match(m: &PathMatcher) -> Result<StringMatch, InvalidMatcher> {
    match m.rule.as_ref().ok_or(InvalidMatcher::Unset)? {
        path_matcher::Rule::Path(sm) => string_match(sm),
    }
}

/// Extracts the string matcher from a metadata value matcher.
pub(crate) fn value_string_match(m: &ValueMatcher) -> Result<StringMatch, InvalidMatcher> {
    match m.match_pattern.as_ref().ok_or(InvalidMatcher::Unset)? {
        value_matcher::MatchPattern::StringMatch(sm) => string_match(sm),
        _ => Err(InvalidMatcher::Unsupported("non-string metadata value")),
    }
}

pub(crate) fn list_match(m: &ListMatcher) -> Result<ListMatch, InvalidMatcher> {
    match m.match_pattern.as_ref().ok_or(InvalidMatcher::Unset)? {
        list_matcher::MatchPattern::OneOf(value) => {
            Ok(ListMatch::OneOf(value_string_match(value)?))
        }
    }
}

/// An unset prefix length is treated as zero.
pub(crate) fn cidr(range: &CidrRange) -> Result<IpNet, InvalidMatcher> {
    let addr = range
        .address_prefix
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| InvalidMatcher::Address(range.address_prefix.clone()))?;
    let len = range.prefix_len.unwrap_or(0);
    u8::try_from(len)
        .ok()
        .and_then(|l| IpNet::new(addr, l).ok())
        .map(|net| net.trunc())
        .ok_or(InvalidMatcher::PrefixLen { addr, len })
}

/// Ports are valid in the range (0, 65535].
pub(crate) fn port(port: u32) -> Option<NonZeroU16> {
    u16::try_from(port).ok().and_then(NonZeroU16::new)
}
