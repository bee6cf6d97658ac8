//! Parser for user supplied SDK version expressions
//!
//! Supported syntaxes:
//! - `A.B.C`, `A.B.C-tag` - exact SDK version
//! - `A.B`, `A.B.x`, `A.B.*` - latest release of a channel
//! - `A`, `A.x` - latest channel of a major release
//! - `A.B.Cxx` - latest patch of a feature band (.NET 5 and later)
//! - `x`, `*` - latest LTS channel

use semver::Version;

use crate::config::LATEST_PATCH_MINIMAL_MAJOR;
use crate::version::error::VersionError;

/// A syntactically valid version expression, before any network lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionExpression {
    /// Fully specified version: `6.0.100`, `7.0.100-rc.1.22431.12`
    Exact(String),
    /// Latest patch of a feature band: `6.0.4xx`
    FeatureBand { band: String, major: u64 },
    /// Channel with both components known: `3.1`, `3.1.x`, `3.1.*`
    Channel { major: u64, minor: u64 },
    /// Only the major component is known: `6`, `6.x`
    Major(u64),
    /// No numeric component at all: `x`, `*`
    Latest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Number(u64),
    Wildcard,
}

impl Segment {
    fn parse(segment: &str) -> Option<Self> {
        match segment {
            "x" | "X" | "*" => Some(Segment::Wildcard),
            s if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                s.parse().ok().map(Segment::Number)
            }
            _ => None,
        }
    }
}

impl VersionExpression {
    /// Parse a raw expression. Surrounding whitespace is ignored, anything else
    /// outside the supported grammar is rejected.
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let input = raw.trim();

        if let Some(major) = feature_band_major(input) {
            if major < LATEST_PATCH_MINIMAL_MAJOR {
                return Err(VersionError::UnsupportedMajor(input.to_string()));
            }
            return Ok(VersionExpression::FeatureBand {
                band: input.to_string(),
                major,
            });
        }

        if Version::parse(input).is_ok() {
            return Ok(VersionExpression::Exact(input.to_string()));
        }

        let invalid = || VersionError::InvalidFormat(input.to_string());

        let segments: Vec<&str> = input.split('.').collect();
        if segments.len() > 3 {
            return Err(invalid());
        }
        let segments = segments
            .into_iter()
            .map(Segment::parse)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;

        use Segment::{Number, Wildcard};
        match segments.as_slice() {
            [Wildcard] | [Wildcard, Wildcard] | [Wildcard, Wildcard, Wildcard] => {
                Ok(VersionExpression::Latest)
            }
            [Number(major)] | [Number(major), Wildcard] | [Number(major), Wildcard, Wildcard] => {
                Ok(VersionExpression::Major(*major))
            }
            [Number(major), Number(minor)] | [Number(major), Number(minor), Wildcard] => {
                Ok(VersionExpression::Channel {
                    major: *major,
                    minor: *minor,
                })
            }
            // Three numbers that are not a valid version, or a number after a wildcard
            _ => Err(invalid()),
        }
    }

    /// Major component, when the expression names one
    pub fn major(&self) -> Option<u64> {
        match self {
            VersionExpression::Exact(version) => Version::parse(version).ok().map(|v| v.major),
            VersionExpression::FeatureBand { major, .. }
            | VersionExpression::Channel { major, .. }
            | VersionExpression::Major(major) => Some(*major),
            VersionExpression::Latest => None,
        }
    }

    /// Whether resolving this expression needs the release index
    pub fn requires_lookup(&self) -> bool {
        matches!(self, VersionExpression::Major(_))
    }
}

/// Returns the major component of an `A.B.Cxx` expression
fn feature_band_major(input: &str) -> Option<u64> {
    let parts: Vec<&str> = input.split('.').collect();
    let (major, minor, band) = match parts.as_slice() {
        [major, minor, band] => (*major, *minor, *band),
        _ => return None,
    };

    let is_number = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let band = band.as_bytes();
    let is_band = band.len() == 3 && band[0].is_ascii_digit() && &band[1..] == b"xx";

    if is_number(major) && is_number(minor) && is_band {
        major.parse().ok()
    } else {
        None
    }
}
