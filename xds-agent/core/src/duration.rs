use std::{fmt, str::FromStr, time::Duration};

/// A non-negative duration in Go's `time.Duration` string format, e.g. `30s`,
/// `1h30m` or `1.5h`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct GoDuration(Duration);

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum DurationParseError {
    #[error("invalid unit: {}", EXPECTED_UNITS)]
    InvalidUnit,

    #[error("missing a unit: {}", EXPECTED_UNITS)]
    NoUnit,

    #[error("negative durations are not supported")]
    Negative,

    #[error("empty duration")]
    Empty,

    #[error("a sign may only lead the duration")]
    MisplacedSign,

    #[error("duration is too large")]
    Overflow,

    #[error("invalid floating-point number: {}", .0)]
    NotANumber(#[from] std::num::ParseFloatError),
}

const EXPECTED_UNITS: &str = "expected one of 'ns', 'us', '\u{00b5}s', 'ms', 's', 'm', or 'h'";

impl GoDuration {
    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl From<Duration> for GoDuration {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl From<GoDuration> for Duration {
    fn from(GoDuration(duration): GoDuration) -> Self {
        duration
    }
}

impl fmt::Display for GoDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

fn unit_duration(unit: &str) -> Result<Duration, DurationParseError> {
    const MINUTE: Duration = Duration::from_secs(60);
    let base = match unit {
        "ns" => Duration::from_nanos(1),
        // U+00B5 is the "micro sign" while U+03BC is "Greek letter mu"
        "us" | "\u{00b5}s" | "\u{03bc}s" => Duration::from_micros(1),
        "ms" => Duration::from_millis(1),
        "s" => Duration::from_secs(1),
        "m" => MINUTE,
        "h" => MINUTE * 60,
        _ => return Err(DurationParseError::InvalidUnit),
    };
    Ok(base)
}

impl FromStr for GoDuration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DurationParseError::Empty);
        }
        if let Some(rest) = s.strip_prefix('-') {
            // `-0` is still zero.
            return match rest.parse::<GoDuration>()? {
                d if d.0.is_zero() => Ok(d),
                _ => Err(DurationParseError::Negative),
            };
        }
        let mut rest = s.strip_prefix('+').unwrap_or(s);
        if rest == "0" {
            return Ok(Self(Duration::ZERO));
        }

        let mut total = Duration::ZERO;
        while !rest.is_empty() {
            let unit_start = rest
                .find(|c: char| c.is_alphabetic())
                .ok_or(DurationParseError::NoUnit)?;
            let (val, tail) = rest.split_at(unit_start);
            if val.starts_with(['+', '-']) {
                return Err(DurationParseError::MisplacedSign);
            }
            let val = val.parse::<f64>()?;
            let unit_end = tail
                .find(|c: char| !c.is_alphabetic())
                .unwrap_or(tail.len());
            let (unit, tail) = tail.split_at(unit_end);
            let part = Duration::try_from_secs_f64(unit_duration(unit)?.as_secs_f64() * val)
                .map_err(|_| DurationParseError::Overflow)?;
            total = total
                .checked_add(part)
                .ok_or(DurationParseError::Overflow)?;
            rest = tail;
        }
        Ok(Self(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_go_durations() {
        const MINUTE: Duration = Duration::from_secs(60);
        const HOUR: Duration = Duration::from_secs(60 * 60);
        let cases: &[(&str, Duration)] = &[
            ("0", Duration::ZERO),
            ("-0", Duration::ZERO),
            ("+5s", Duration::from_secs(5)),
            ("30s", Duration::from_secs(30)),
            ("5.6s", Duration::from_secs(5) + Duration::from_millis(600)),
            (".5s", Duration::from_millis(500)),
            ("10ns", Duration::from_nanos(10)),
            ("11us", Duration::from_micros(11)),
            ("12µs", Duration::from_micros(12)),
            ("13ms", Duration::from_millis(13)),
            ("15m", 15 * MINUTE),
            ("24h", 24 * HOUR),
            ("3h30m", 3 * HOUR + 30 * MINUTE),
            ("1.5h", HOUR + 30 * MINUTE),
            (" 1m ", MINUTE),
        ];

        for (input, expected) in cases {
            let parsed = dbg!(input).parse::<GoDuration>().unwrap();
            assert_eq!(parsed.as_duration(), *expected, "{input}");
        }
    }

    #[test]
    fn rejects_invalid_durations() {
        assert_eq!("".parse::<GoDuration>(), Err(DurationParseError::Empty));
        assert_eq!("5".parse::<GoDuration>(), Err(DurationParseError::NoUnit));
        assert_eq!("5d".parse::<GoDuration>(), Err(DurationParseError::InvalidUnit));
        assert_eq!("-5s".parse::<GoDuration>(), Err(DurationParseError::Negative));
        assert_eq!(
            "+-5s".parse::<GoDuration>(),
            Err(DurationParseError::MisplacedSign)
        );
        assert_eq!(
            "5s-3s".parse::<GoDuration>(),
            Err(DurationParseError::MisplacedSign)
        );
        assert_eq!(
            "5s+3s".parse::<GoDuration>(),
            Err(DurationParseError::MisplacedSign)
        );
        assert_eq!(
            "99999999999999999999999h".parse::<GoDuration>(),
            Err(DurationParseError::Overflow)
        );
        assert_eq!(
            "10000000000000000000s10000000000000000000s".parse::<GoDuration>(),
            Err(DurationParseError::Overflow)
        );
        assert!(matches!(
            "x5s".parse::<GoDuration>(),
            Err(DurationParseError::NotANumber(_))
        ));
    }
}
