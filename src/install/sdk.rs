//! Queries about SDKs already present on the machine

use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::process::{CommandRunner, CommandSpec};
use crate::version::semver::sort_descending;

/// Versions reported by `dotnet --list-sdks`, newest first.
///
/// Any failure (missing `dotnet`, non-zero exit) yields an empty list.
pub async fn list_sdks(runner: &dyn CommandRunner, dotnet: &Path) -> Vec<String> {
    let command = CommandSpec::new(dotnet).args(["--list-sdks"]);
    let output = match runner.run(&command).await {
        Ok(output) if output.success() => output,
        Ok(output) => {
            debug!("dotnet --list-sdks exited with code {}", output.exit_code);
            return Vec::new();
        }
        Err(e) => {
            debug!("Failed to run dotnet --list-sdks: {}", e);
            return Vec::new();
        }
    };

    let versions = output
        .stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect();
    sort_descending(versions)
}

/// First of `versions` matching a wildcard pattern such as `6.0.4xx` or `8.x`.
///
/// Missing trailing segments count as wildcards; `x`, `X` and `*` match any
/// run of digits.
pub fn find_matching_version(versions: &[String], pattern: &str) -> Option<String> {
    let pattern = pattern.trim();
    let mut segments: Vec<&str> = if pattern.is_empty() {
        Vec::new()
    } else {
        pattern.split('.').collect()
    };
    while segments.len() < 3 {
        segments.push("x");
    }

    let body = segments
        .iter()
        .map(|segment| segment_regex(segment))
        .collect::<Vec<_>>()
        .join(r"\.");
    let re = Regex::new(&format!("^{body}")).ok()?;

    versions.iter().find(|v| re.is_match(v)).cloned()
}

fn segment_regex(segment: &str) -> String {
    let mut out = String::new();
    let mut chars = segment.chars().peekable();
    while let Some(c) = chars.next() {
        if matches!(c, 'x' | 'X' | '*') {
            // collapse runs like `xx` into one digit matcher
            while chars.next_if(|c| matches!(c, 'x' | 'X' | '*')).is_some() {}
            out.push_str(r"\d+");
        } else {
            out.push_str(&regex::escape(&c.to_string()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{CommandOutput, MockCommandRunner};
    use rstest::rstest;

    fn installed() -> Vec<String> {
        vec![
            "8.0.100-rc.2.23502.2".to_string(),
            "6.0.414".to_string(),
            "6.0.413".to_string(),
            "2.2.207".to_string(),
        ]
    }

    #[rstest]
    #[case("6.0.41x", Some("6.0.414"))]
    #[case("6.0.413", Some("6.0.413"))]
    #[case("6.x", Some("6.0.414"))]
    #[case("6", Some("6.0.414"))]
    #[case("2.2.2xx", Some("2.2.207"))]
    #[case("8.0", Some("8.0.100-rc.2.23502.2"))]
    #[case("x", Some("8.0.100-rc.2.23502.2"))]
    #[case("", Some("8.0.100-rc.2.23502.2"))]
    #[case("7.0", None)]
    #[case("6.0.5xx", None)]
    fn find_matching_version_cases(#[case] pattern: &str, #[case] expected: Option<&str>) {
        assert_eq!(
            find_matching_version(&installed(), pattern),
            expected.map(|s| s.to_string())
        );
    }

    #[test]
    fn segment_regex_escapes_literals() {
        assert_eq!(segment_regex("4xx"), r"4\d+");
        assert_eq!(segment_regex("1+"), r"1\+");
    }

    #[tokio::test]
    async fn list_sdks_parses_and_sorts_output() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|command| command.args == ["--list-sdks"])
            .returning(|_| {
                Ok(CommandOutput {
                    exit_code: 0,
                    stdout: [
                        "6.0.413 [/usr/share/dotnet/sdk]",
                        "2.2.207 [/usr/share/dotnet/sdk]",
                        "6.0.414 [/usr/share/dotnet/sdk]",
                    ]
                    .join("\n"),
                    stderr: String::new(),
                })
            });

        let sdks = list_sdks(&runner, Path::new("dotnet")).await;

        assert_eq!(sdks, vec!["6.0.414", "6.0.413", "2.2.207"]);
        assert_eq!(
            find_matching_version(&sdks, "6.0.41x").as_deref(),
            Some("6.0.414")
        );
    }

    #[tokio::test]
    async fn list_sdks_is_empty_when_dotnet_fails() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_| {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "dotnet"))
        });

        assert!(list_sdks(&runner, Path::new("dotnet")).await.is_empty());
    }
}
