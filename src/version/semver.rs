use std::cmp::Reverse;

use semver::Version;

/// Find the semantically maximum version from a list.
///
/// Pre-release versions take part in the comparison; entries that are not
/// valid versions are skipped.
pub fn find_semantic_max<S: AsRef<str>>(versions: &[S]) -> Option<String> {
    versions
        .iter()
        .filter_map(|v| {
            let v = v.as_ref();
            Version::parse(v).ok().map(|parsed| (v, parsed))
        })
        .max_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(original, _)| original.to_string())
}

/// Sort versions from newest to oldest. Unparseable entries keep their
/// relative order and go last.
pub fn sort_descending(versions: Vec<String>) -> Vec<String> {
    let mut keyed: Vec<(Option<Version>, String)> = versions
        .into_iter()
        .map(|v| (Version::parse(&v).ok(), v))
        .collect();

    keyed.sort_by_key(|(parsed, _)| Reverse(parsed.clone()));

    keyed.into_iter().map(|(_, v)| v).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![], None)]
    #[case(vec!["6.0.100", "7.0.100", "6.0.400"], Some("7.0.100"))]
    #[case(vec!["8.0.100-rc.2.23502.2", "8.0.100-rc.1.23455.8"], Some("8.0.100-rc.2.23502.2"))]
    #[case(vec!["8.0.100-rc.2.23502.2", "8.0.100"], Some("8.0.100"))]
    #[case(vec!["invalid", "3.1.201", "not-semver"], Some("3.1.201"))]
    #[case(vec!["invalid", "not-semver"], None)]
    fn find_semantic_max_returns_expected(
        #[case] versions: Vec<&str>,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(
            find_semantic_max(&versions),
            expected.map(|s| s.to_string())
        );
    }

    #[test]
    fn sort_descending_orders_newest_first() {
        let versions = vec![
            "6.0.413".to_string(),
            "broken".to_string(),
            "6.0.414".to_string(),
            "2.2.207".to_string(),
        ];

        assert_eq!(
            sort_descending(versions),
            vec!["6.0.414", "6.0.413", "2.2.207", "broken"]
        );
    }
}
