//! Quality tier selection and gating

use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::config::QualityPolicy;
use crate::install::arguments::ArgumentDialect;
use crate::version::directive::VersionDirective;
use crate::version::error::VersionError;

/// Pre-release maturity of the build to install
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Daily,
    Signed,
    Validated,
    Preview,
    Ga,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Daily => "daily",
            Quality::Signed => "signed",
            Quality::Validated => "validated",
            Quality::Preview => "preview",
            Quality::Ga => "ga",
        }
    }

    /// Parses an optional input; an empty value means no quality was requested
    pub fn from_input(input: Option<&str>) -> Result<Option<Self>, VersionError> {
        match input.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value.parse().map(Some),
        }
    }
}

impl FromStr for Quality {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Quality::Daily),
            "signed" => Ok(Quality::Signed),
            "validated" => Ok(Quality::Validated),
            "preview" => Ok(Quality::Preview),
            "ga" => Ok(Quality::Ga),
            other => Err(VersionError::UnsupportedQuality(other.to_string())),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the quality arguments to append for `directive`.
///
/// An ineligible directive never fails the install: the quality is dropped and,
/// depending on `policy`, a warning is emitted.
pub fn quality_arguments(
    directive: &VersionDirective,
    quality: Option<Quality>,
    policy: QualityPolicy,
    dialect: ArgumentDialect,
) -> Vec<String> {
    let Some(quality) = quality else {
        return Vec::new();
    };

    if directive.quality_eligible {
        return vec![dialect.quality_flag().to_string(), quality.to_string()];
    }

    match policy {
        QualityPolicy::Warn => warn!(
            "The 'dotnet-quality' input can be used only with .NET SDK version in A.B, A.B.x, A, A.x and A.B.Cxx formats where the major tag is higher than 5. You specified: {}. 'dotnet-quality' input is ignored.",
            directive.value
        ),
        QualityPolicy::Ignore => debug!(
            "Ignoring quality '{}' for ineligible version {}",
            quality, directive.value
        ),
    }
    Vec::new()
}
