use std::path::{Path, PathBuf};

use tracing::info;

use crate::cache::backend::{CacheBackend, SaveOutcome};
use crate::cache::error::CacheError;
use crate::cache::nuget::nuget_folder_paths;
use crate::config::state;
use crate::process::CommandRunner;
use crate::workflow::Workflow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The restore phase never computed a key
    NoPrimaryKey,
    /// The restored entry already has the current key
    ExactHit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveResult {
    Skipped(SkipReason),
    Saved { key: String },
    /// Another job stored the same key first
    AlreadyExists { key: String },
}

/// Saves the NuGet global-packages folder under the key computed at restore.
pub async fn save_cache(
    dotnet: &Path,
    runner: &dyn CommandRunner,
    backend: &dyn CacheBackend,
    workflow: &dyn Workflow,
) -> Result<SaveResult, CacheError> {
    let matched_key = workflow.get_state(state::CACHE_MATCHED_KEY);
    let primary_key = workflow.get_state(state::CACHE_PRIMARY_KEY);

    if primary_key.is_empty() {
        info!("Primary key was not generated, not saving cache.");
        return Ok(SaveResult::Skipped(SkipReason::NoPrimaryKey));
    }

    let folders = nuget_folder_paths(runner, dotnet).await?;
    let cache_path = PathBuf::from(&folders.global_packages);
    if folders.global_packages.is_empty() || !cache_path.exists() {
        return Err(CacheError::CachePathMissing(cache_path));
    }

    if primary_key == matched_key {
        info!(
            "Cache hit occurred on the primary key {}, not saving cache.",
            primary_key
        );
        return Ok(SaveResult::Skipped(SkipReason::ExactHit));
    }

    match backend.save(&[cache_path], &primary_key).await? {
        SaveOutcome::Saved => {
            info!("Cache saved with the key: {}", primary_key);
            Ok(SaveResult::Saved { key: primary_key })
        }
        SaveOutcome::AlreadyExists => {
            info!(
                "Cache entry {} already exists, another job saved it first.",
                primary_key
            );
            Ok(SaveResult::AlreadyExists { key: primary_key })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::backend::{LocalCacheBackend, MockCacheBackend};
    use crate::process::{CommandOutput, MockCommandRunner};
    use crate::workflow::MockWorkflow;
    use tempfile::TempDir;

    fn locals_runner(global_packages: &Path) -> MockCommandRunner {
        let stdout = format!("global-packages: {}\n", global_packages.display());
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(move |_| {
            Ok(CommandOutput {
                exit_code: 0,
                stdout: stdout.clone(),
                stderr: String::new(),
            })
        });
        runner
    }

    fn workflow_with_state(primary: &'static str, matched: &'static str) -> MockWorkflow {
        let mut workflow = MockWorkflow::new();
        workflow
            .expect_get_state()
            .withf(|name| name == "CACHE_KEY")
            .returning(move |_| primary.to_string());
        workflow
            .expect_get_state()
            .withf(|name| name == "CACHE_RESULT")
            .returning(move |_| matched.to_string());
        workflow
    }

    fn packages(dir: &TempDir) -> PathBuf {
        let packages = dir.path().join(".nuget/packages");
        std::fs::create_dir_all(packages.join("serilog/3.1.1")).unwrap();
        std::fs::write(packages.join("serilog/3.1.1/serilog.nuspec"), "<package />").unwrap();
        packages
    }

    #[tokio::test]
    async fn save_without_primary_key_is_skipped() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();
        let mut backend = MockCacheBackend::new();
        backend.expect_save().never();

        let result = save_cache(
            Path::new("dotnet"),
            &runner,
            &backend,
            &workflow_with_state("", ""),
        )
        .await
        .unwrap();

        assert_eq!(result, SaveResult::Skipped(SkipReason::NoPrimaryKey));
    }

    #[tokio::test]
    async fn save_with_missing_folder_fails() {
        let home = TempDir::new().unwrap();
        let missing = home.path().join(".nuget/packages");
        let mut backend = MockCacheBackend::new();
        backend.expect_save().never();

        let result = save_cache(
            Path::new("dotnet"),
            &locals_runner(&missing),
            &backend,
            &workflow_with_state("dotnet-cache-Linux-abc", ""),
        )
        .await;

        match result {
            Err(err @ CacheError::CachePathMissing(_)) => assert_eq!(
                err.to_string(),
                format!(
                    "Cache folder path is retrieved for .NET CLI but doesn't exist on disk: {}",
                    missing.display()
                )
            ),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn save_after_exact_hit_is_skipped() {
        let home = TempDir::new().unwrap();
        let packages = packages(&home);
        let mut backend = MockCacheBackend::new();
        backend.expect_save().never();

        let result = save_cache(
            Path::new("dotnet"),
            &locals_runner(&packages),
            &backend,
            &workflow_with_state("dotnet-cache-Linux-abc", "dotnet-cache-Linux-abc"),
        )
        .await
        .unwrap();

        assert_eq!(result, SaveResult::Skipped(SkipReason::ExactHit));
    }

    #[tokio::test]
    async fn save_stores_folder_under_primary_key() {
        let home = TempDir::new().unwrap();
        let packages = packages(&home);
        let mut backend = MockCacheBackend::new();
        let expected_path = packages.clone();
        backend
            .expect_save()
            .withf(move |paths, key| {
                paths == [expected_path.clone()] && key == "dotnet-cache-Linux-new"
            })
            .times(1)
            .returning(|_, _| Ok(SaveOutcome::Saved));

        let result = save_cache(
            Path::new("dotnet"),
            &locals_runner(&packages),
            &backend,
            &workflow_with_state("dotnet-cache-Linux-new", "dotnet-cache-Linux-old"),
        )
        .await
        .unwrap();

        assert_eq!(
            result,
            SaveResult::Saved {
                key: "dotnet-cache-Linux-new".to_string()
            }
        );
    }

    #[tokio::test]
    async fn saving_twice_is_idempotent() {
        let home = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let packages = packages(&home);
        let backend = LocalCacheBackend::new(cache.path());
        let runner = locals_runner(&packages);
        let workflow = workflow_with_state("dotnet-cache-Linux-abc", "");

        let first = save_cache(Path::new("dotnet"), &runner, &backend, &workflow)
            .await
            .unwrap();
        let second = save_cache(Path::new("dotnet"), &runner, &backend, &workflow)
            .await
            .unwrap();

        assert_eq!(
            first,
            SaveResult::Saved {
                key: "dotnet-cache-Linux-abc".to_string()
            }
        );
        assert_eq!(
            second,
            SaveResult::AlreadyExists {
                key: "dotnet-cache-Linux-abc".to_string()
            }
        );
    }
}
