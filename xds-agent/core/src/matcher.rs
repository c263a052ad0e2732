use ipnet::IpNet;
use regex::Regex;
use std::{fmt, net::IpAddr, num::NonZeroU16};

/// Evaluates a matcher against a request attribute of type `C`.
pub trait Matches<C: ?Sized> {
    fn matches(&self, value: &C) -> bool;
}

/// Matches a string value.
#[derive(Clone, Debug)]
pub struct StringMatch {
    pattern: StringPattern,
    ignore_case: bool,
}

#[derive(Clone, Debug)]
pub enum StringPattern {
    Exact(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
    /// A regular expression that must match the entire value.
    Regex(Regex),
}

/// Matches the value of a single request header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderMatch {
    kind: HeaderMatchKind,
    invert: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderMatchKind {
    /// Matches on whether the header is present (`true`) or absent (`false`).
    Present(bool),
    Value(StringMatch),
}

/// Matches a list-valued attribute, such as a JWT claim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListMatch {
    /// At least one element of the list must match.
    OneOf(StringMatch),
}

// === impl StringMatch ===

impl StringMatch {
    pub fn exact(value: impl Into<String>) -> Self {
        StringPattern::Exact(value.into()).into()
    }

    pub fn prefix(value: impl Into<String>) -> Self {
        StringPattern::Prefix(value.into()).into()
    }

    pub fn suffix(value: impl Into<String>) -> Self {
        StringPattern::Suffix(value.into()).into()
    }

    pub fn contains(value: impl Into<String>) -> Self {
        StringPattern::Contains(value.into()).into()
    }

    /// Compiles `expr` so that it must match the whole input.
    pub fn regex(expr: &str) -> Result<Self, regex::Error> {
        let re = Regex::new(&format!("^(?:{expr})$"))?;
        Ok(StringPattern::Regex(re).into())
    }

    /// Makes literal comparisons case-insensitive. Has no effect on regular
    /// expressions.
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn pattern(&self) -> &StringPattern {
        &self.pattern
    }

    pub fn is_ignore_case(&self) -> bool {
        self.ignore_case
    }

    fn matches_str(&self, value: &str) -> bool {
        let fold = |s: &str| {
            if self.ignore_case {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        match &self.pattern {
            StringPattern::Regex(re) => re.is_match(value),
            StringPattern::Exact(s) => fold(value) == fold(s),
            StringPattern::Prefix(s) => fold(value).starts_with(&fold(s)),
            StringPattern::Suffix(s) => fold(value).ends_with(&fold(s)),
            StringPattern::Contains(s) => fold(value).contains(&fold(s)),
        }
    }
}

impl From<StringPattern> for StringMatch {
    fn from(pattern: StringPattern) -> Self {
        Self {
            pattern,
            ignore_case: false,
        }
    }
}

impl PartialEq for StringMatch {
    fn eq(&self, other: &Self) -> bool {
        self.ignore_case == other.ignore_case && self.pattern == other.pattern
    }
}

impl Eq for StringMatch {}

impl Matches<str> for StringMatch {
    fn matches(&self, value: &str) -> bool {
        self.matches_str(value)
    }
}

/// A list of values matches when any element matches.
impl<S: AsRef<str>> Matches<[S]> for StringMatch {
    fn matches(&self, values: &[S]) -> bool {
        values.iter().any(|v| self.matches_str(v.as_ref()))
    }
}

impl fmt::Display for StringMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pattern {
            StringPattern::Exact(s) => write!(f, "{s}")?,
            StringPattern::Prefix(s) => write!(f, "{s}*")?,
            StringPattern::Suffix(s) => write!(f, "*{s}")?,
            StringPattern::Contains(s) => write!(f, "*{s}*")?,
            StringPattern::Regex(re) => write!(f, "/{}/", re.as_str())?,
        }
        if self.ignore_case {
            f.write_str(" (ignore case)")?;
        }
        Ok(())
    }
}

// === impl StringPattern ===

impl PartialEq for StringPattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(l0), Self::Exact(r0)) => l0 == r0,
            (Self::Prefix(l0), Self::Prefix(r0)) => l0 == r0,
            (Self::Suffix(l0), Self::Suffix(r0)) => l0 == r0,
            (Self::Contains(l0), Self::Contains(r0)) => l0 == r0,
            (Self::Regex(l0), Self::Regex(r0)) => l0.as_str() == r0.as_str(),
            _ => false,
        }
    }
}

impl Eq for StringPattern {}

// === impl HeaderMatch ===

impl HeaderMatch {
    pub fn present(present: bool) -> Self {
        Self {
            kind: HeaderMatchKind::Present(present),
            invert: false,
        }
    }

    pub fn value(matcher: StringMatch) -> Self {
        Self {
            kind: HeaderMatchKind::Value(matcher),
            invert: false,
        }
    }

    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn kind(&self) -> &HeaderMatchKind {
        &self.kind
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }
}

/// Evaluated against the header's value, or `None` when the request does not
/// carry the header. A missing header never satisfies a value matcher.
impl<'a> Matches<Option<&'a str>> for HeaderMatch {
    fn matches(&self, value: &Option<&'a str>) -> bool {
        let matched = match (&self.kind, value) {
            (HeaderMatchKind::Present(present), v) => v.is_some() == *present,
            (HeaderMatchKind::Value(m), Some(v)) => m.matches(*v),
            (HeaderMatchKind::Value(_), None) => false,
        };
        matched != self.invert
    }
}

// === impl ListMatch ===

impl<S: AsRef<str>> Matches<[S]> for ListMatch {
    fn matches(&self, values: &[S]) -> bool {
        match self {
            Self::OneOf(m) => m.matches(values),
        }
    }
}

// === network and port matchers ===

impl Matches<IpAddr> for IpNet {
    fn matches(&self, addr: &IpAddr) -> bool {
        self.contains(addr)
    }
}

impl Matches<u16> for NonZeroU16 {
    fn matches(&self, port: &u16) -> bool {
        self.get() == *port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_patterns() {
        assert!(StringMatch::exact("GET").matches("GET"));
        assert!(!StringMatch::exact("GET").matches("get"));
        assert!(StringMatch::exact("GET").ignore_case(true).matches("get"));
        assert!(StringMatch::prefix("/v1/").matches("/v1/orders"));
        assert!(!StringMatch::prefix("/v1/").matches("/v2/orders"));
        assert!(StringMatch::suffix(".local").matches("foo.cluster.local"));
        assert!(StringMatch::contains("ord").matches("/v1/orders"));
        assert!(StringMatch::contains("ORD").ignore_case(true).matches("/v1/orders"));
    }

    #[test]
    fn regex_is_anchored() {
        let m = StringMatch::regex("/v[0-9]+/orders").unwrap();
        assert!(m.matches("/v12/orders"));
        assert!(!m.matches("/v12/orders/1"));
        assert!(!m.matches("x/v1/orders"));
        assert!(StringMatch::regex("(").is_err());
    }

    #[test]
    fn regex_equality_compares_source() {
        assert_eq!(
            StringMatch::regex("a.*").unwrap(),
            StringMatch::regex("a.*").unwrap()
        );
        assert_ne!(
            StringMatch::regex("a.*").unwrap(),
            StringMatch::exact("^(?:a.*)$")
        );
    }

    #[test]
    fn header_presence_and_inversion() {
        let present = HeaderMatch::present(true);
        assert!(present.matches(&Some("x")));
        assert!(!present.matches(&None));

        let absent = HeaderMatch::present(false);
        assert!(absent.matches(&None));

        let value = HeaderMatch::value(StringMatch::exact("beta"));
        assert!(value.matches(&Some("beta")));
        assert!(!value.matches(&Some("alpha")));
        assert!(!value.matches(&None));

        let inverted = HeaderMatch::value(StringMatch::exact("beta")).invert(true);
        assert!(!inverted.matches(&Some("beta")));
        assert!(inverted.matches(&Some("alpha")));
        assert!(inverted.matches(&None));
    }

    #[test]
    fn list_one_of() {
        let m = ListMatch::OneOf(StringMatch::exact("admin"));
        assert!(m.matches(&["user", "admin"][..]));
        assert!(!m.matches(&["user"][..]));
        let empty: &[String] = &[];
        assert!(!m.matches(empty));
    }

    #[test]
    fn networks_and_ports() {
        let net: IpNet = "10.0.0.0/8".parse().unwrap();
        assert!(net.matches(&"10.1.2.3".parse::<IpAddr>().unwrap()));
        assert!(!net.matches(&"192.168.1.1".parse::<IpAddr>().unwrap()));

        let port = NonZeroU16::new(8080).unwrap();
        assert!(port.matches(&8080));
        assert!(!port.matches(&80));
    }
}
