//! Version requests accepted by the registry.
//!
//! Three shapes are recognized:
//!
//! - `latest` — the highest registered version
//! - a bare version (`1`, `1.2`, `1.2.3`, `1.2.3-beta.1`) — the lowest
//!   registered version at or above it
//! - an npm-style range (`^1.0.0`, `>=1.2 <2`, `1.0.0 - 1.4.0`,
//!   `^1 || ^3`) — the highest registered version that satisfies it

use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};

use hookloom_core::{KernelError, KernelResult};

/// Token selecting the highest registered version.
pub const LATEST: &str = "latest";

/// A parsed version request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionQuery {
    /// Highest registered version.
    Latest,
    /// Lowest registered version `>=` the given one.
    AtLeast(Version),
    /// Highest registered version satisfying any alternative.
    Range(Vec<VersionReq>),
}

impl VersionQuery {
    /// Parses a request string.
    pub fn parse(raw: &str) -> KernelResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(KernelError::validation("version request must not be empty"));
        }
        if raw.eq_ignore_ascii_case(LATEST) {
            return Ok(Self::Latest);
        }
        if let Some(version) = parse_padded(raw) {
            return Ok(Self::AtLeast(version));
        }

        let alternatives = raw
            .split("||")
            .map(|alternative| {
                let normalized = normalize_alternative(alternative)?;
                VersionReq::parse(&normalized).map_err(|e| {
                    KernelError::validation(format!("invalid version range '{raw}': {e}"))
                })
            })
            .collect::<KernelResult<Vec<_>>>()?;
        Ok(Self::Range(alternatives))
    }

    /// Returns whether `version` qualifies for this request.
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Latest => true,
            Self::AtLeast(floor) => version >= floor,
            Self::Range(alternatives) => alternatives.iter().any(|req| req.matches(version)),
        }
    }

    /// Picks one version out of `candidates` according to the request.
    pub fn select<'a, I>(&self, candidates: I) -> Option<&'a Version>
    where
        I: IntoIterator<Item = &'a Version>,
    {
        let qualifying = candidates.into_iter().filter(|v| self.matches(v));
        match self {
            Self::AtLeast(_) => qualifying.min(),
            Self::Latest | Self::Range(_) => qualifying.max(),
        }
    }
}

impl FromStr for VersionQuery {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST),
            Self::AtLeast(version) => write!(f, ">={version}"),
            Self::Range(alternatives) => {
                for (i, req) in alternatives.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" || ")?;
                    }
                    write!(f, "{req}")?;
                }
                Ok(())
            }
        }
    }
}

/// Parses a bare version, padding a missing minor or patch with zeros.
///
/// Returns `None` for anything carrying range syntax.
pub fn parse_padded(raw: &str) -> Option<Version> {
    if let Ok(version) = Version::parse(raw) {
        return Some(version);
    }
    let parts: Vec<&str> = raw.split('.').collect();
    if parts.len() > 2 || !parts.iter().all(|p| is_numeric(p)) {
        return None;
    }
    let mut padded = parts.join(".");
    for _ in parts.len()..3 {
        padded.push_str(".0");
    }
    Version::parse(&padded).ok()
}

fn is_numeric(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

/// Rewrites one `||` alternative into `semver`'s comma-separated syntax.
fn normalize_alternative(alternative: &str) -> KernelResult<String> {
    let alternative = alternative.trim();
    if alternative.is_empty() {
        return Ok("*".to_string());
    }
    if let Some((lower, upper)) = alternative.split_once(" - ") {
        return hyphen_range(lower.trim(), upper.trim());
    }

    let mut comparators = Vec::new();
    let mut pending_op = String::new();
    for token in alternative.split_whitespace() {
        if token.bytes().all(|b| matches!(b, b'<' | b'>' | b'=' | b'^' | b'~')) {
            pending_op.push_str(token);
            continue;
        }
        comparators.push(format!("{pending_op}{token}"));
        pending_op.clear();
    }
    if !pending_op.is_empty() {
        return Err(KernelError::validation(format!(
            "dangling operator '{pending_op}' in version range '{alternative}'"
        )));
    }
    Ok(comparators.join(", "))
}

/// `a - b` is `>=a, <=b`; a partial upper bound excludes the next release.
fn hyphen_range(lower: &str, upper: &str) -> KernelResult<String> {
    let invalid = || KernelError::validation(format!("invalid hyphen range '{lower} - {upper}'"));
    let lower = parse_padded(lower).ok_or_else(invalid)?;

    let upper_parts: Vec<&str> = upper.split('.').collect();
    let bound = match upper_parts.as_slice() {
        [major] if is_numeric(major) => {
            let major: u64 = major.parse().map_err(|_| invalid())?;
            format!("<{}.0.0", major.checked_add(1).ok_or_else(invalid)?)
        }
        [major, minor] if is_numeric(major) && is_numeric(minor) => {
            let major: u64 = major.parse().map_err(|_| invalid())?;
            let minor: u64 = minor.parse().map_err(|_| invalid())?;
            format!("<{major}.{}.0", minor.checked_add(1).ok_or_else(invalid)?)
        }
        _ => format!("<={}", Version::parse(upper).map_err(|_| invalid())?),
    };
    Ok(format!(">={lower}, {bound}"))
}
