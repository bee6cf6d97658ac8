//! Install directive resolution
//!
//! Turns a parsed [`VersionExpression`] into the exact version or channel handed
//! to the install script. Only major-only expressions touch the release index.

use tracing::debug;

use crate::config::QUALITY_MINIMAL_MAJOR;
use crate::version::error::RegistryError;
use crate::version::expression::VersionExpression;
use crate::version::release_index::ReleaseIndex;

/// Channel token understood by the install script as "latest LTS"
pub const LTS_CHANNEL: &str = "LTS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    ExactVersion,
    Channel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDirective {
    pub kind: DirectiveKind,
    pub value: String,
    /// Whether a quality tier may be passed along with this directive
    pub quality_eligible: bool,
}

impl VersionDirective {
    pub fn exact(version: impl Into<String>) -> Self {
        Self {
            kind: DirectiveKind::ExactVersion,
            value: version.into(),
            quality_eligible: false,
        }
    }

    pub fn channel(value: impl Into<String>, major: Option<u64>) -> Self {
        Self {
            kind: DirectiveKind::Channel,
            value: value.into(),
            quality_eligible: major.is_some_and(|m| m >= QUALITY_MINIMAL_MAJOR),
        }
    }

    /// Resolve an expression, querying `index` only for major-only expressions
    pub async fn resolve(
        expression: &VersionExpression,
        index: &dyn ReleaseIndex,
    ) -> Result<Self, RegistryError> {
        let directive = match expression {
            VersionExpression::Exact(version) => Self::exact(version.clone()),
            VersionExpression::FeatureBand { band, major } => {
                Self::channel(band.clone(), Some(*major))
            }
            VersionExpression::Channel { major, minor } => {
                Self::channel(format!("{major}.{minor}"), Some(*major))
            }
            VersionExpression::Major(major) => {
                let channel = index.latest_channel_for_major(*major).await?;
                debug!("Resolved major version {} to channel {}", major, channel);
                Self::channel(channel, Some(*major))
            }
            VersionExpression::Latest => Self::channel(LTS_CHANNEL, None),
        };

        Ok(directive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::release_index::MockReleaseIndex;
    use rstest::rstest;

    fn index_without_lookups() -> MockReleaseIndex {
        let mut index = MockReleaseIndex::new();
        index.expect_latest_channel_for_major().never();
        index
    }

    #[rstest]
    #[case("3.1")]
    #[case("3.1.x")]
    #[case("3.1.*")]
    #[tokio::test]
    async fn resolve_major_minor_without_lookup(#[case] input: &str) {
        let expression = VersionExpression::parse(input).unwrap();

        let directive = VersionDirective::resolve(&expression, &index_without_lookups())
            .await
            .unwrap();

        assert_eq!(
            directive,
            VersionDirective {
                kind: DirectiveKind::Channel,
                value: "3.1".to_string(),
                quality_eligible: false,
            }
        );
    }

    #[tokio::test]
    async fn resolve_exact_version_is_never_quality_eligible() {
        let expression = VersionExpression::parse("8.0.100").unwrap();

        let directive = VersionDirective::resolve(&expression, &index_without_lookups())
            .await
            .unwrap();

        assert_eq!(directive, VersionDirective::exact("8.0.100"));
        assert!(!directive.quality_eligible);
    }

    #[tokio::test]
    async fn resolve_feature_band_keeps_band() {
        let expression = VersionExpression::parse("6.0.4xx").unwrap();

        let directive = VersionDirective::resolve(&expression, &index_without_lookups())
            .await
            .unwrap();

        assert_eq!(
            directive,
            VersionDirective {
                kind: DirectiveKind::Channel,
                value: "6.0.4xx".to_string(),
                quality_eligible: true,
            }
        );
    }

    #[tokio::test]
    async fn resolve_wildcard_defers_to_lts_channel() {
        let expression = VersionExpression::parse("*").unwrap();

        let directive = VersionDirective::resolve(&expression, &index_without_lookups())
            .await
            .unwrap();

        assert_eq!(directive.value, LTS_CHANNEL);
        assert_eq!(directive.kind, DirectiveKind::Channel);
        assert!(!directive.quality_eligible);
    }

    #[tokio::test]
    async fn resolve_major_only_queries_release_index() {
        let mut index = MockReleaseIndex::new();
        index
            .expect_latest_channel_for_major()
            .withf(|major| *major == 7)
            .times(1)
            .returning(|_| Ok("7.0".to_string()));

        let expression = VersionExpression::parse("7.x").unwrap();
        let directive = VersionDirective::resolve(&expression, &index).await.unwrap();

        assert_eq!(
            directive,
            VersionDirective {
                kind: DirectiveKind::Channel,
                value: "7.0".to_string(),
                quality_eligible: true,
            }
        );
    }

    #[tokio::test]
    async fn resolve_major_only_propagates_not_found() {
        let mut index = MockReleaseIndex::new();
        index.expect_latest_channel_for_major().returning(|major| {
            Err(RegistryError::NotFound {
                major: major.to_string(),
                url: "http://index".to_string(),
            })
        });

        let expression = VersionExpression::parse("42").unwrap();
        let result = VersionDirective::resolve(&expression, &index).await;

        assert!(matches!(result, Err(RegistryError::NotFound { .. })));
    }

    #[rstest]
    #[case(Some(5), false)]
    #[case(Some(6), true)]
    #[case(Some(8), true)]
    #[case(None, false)]
    fn channel_quality_eligibility_threshold(#[case] major: Option<u64>, #[case] expected: bool) {
        assert_eq!(VersionDirective::channel("x", major).quality_eligible, expected);
    }
}
