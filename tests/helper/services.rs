//! In-memory workflow, release index and cache backend

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use setup_dotnet::cache::{CacheBackend, CacheError, SaveOutcome};
use setup_dotnet::version::error::RegistryError;
use setup_dotnet::version::release_index::ReleaseIndex;
use setup_dotnet::workflow::{Workflow, WorkflowError};

/// Workflow channel keeping everything in memory
#[derive(Default)]
pub struct MemoryWorkflow {
    state: Mutex<HashMap<String, String>>,
    outputs: Mutex<HashMap<String, String>>,
    env: Mutex<HashMap<String, String>>,
    paths: Mutex<Vec<PathBuf>>,
    matchers: Mutex<Vec<PathBuf>>,
}

impl MemoryWorkflow {
    /// A fresh step of the same job: state carries over, outputs do not
    pub fn next_step(&self) -> Self {
        Self {
            state: Mutex::new(self.state.lock().unwrap().clone()),
            ..Default::default()
        }
    }

    pub fn state(&self, name: &str) -> Option<String> {
        self.state.lock().unwrap().get(name).cloned()
    }

    pub fn output(&self, name: &str) -> Option<String> {
        self.outputs.lock().unwrap().get(name).cloned()
    }

    pub fn env(&self, name: &str) -> Option<String> {
        self.env.lock().unwrap().get(name).cloned()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.lock().unwrap().clone()
    }

    pub fn matchers(&self) -> Vec<PathBuf> {
        self.matchers.lock().unwrap().clone()
    }
}

impl Workflow for MemoryWorkflow {
    fn save_state(&self, name: &str, value: &str) -> Result<(), WorkflowError> {
        self.state
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn get_state(&self, name: &str) -> String {
        self.state(name).unwrap_or_default()
    }

    fn set_output(&self, name: &str, value: &str) -> Result<(), WorkflowError> {
        self.outputs
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn add_path(&self, path: &Path) -> Result<(), WorkflowError> {
        self.paths.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn export_variable(&self, name: &str, value: &str) -> Result<(), WorkflowError> {
        self.env
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn add_matcher(&self, path: &Path) -> Result<(), WorkflowError> {
        self.matchers.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// Release index serving a fixed list of channels
pub struct FakeReleaseIndex {
    channels: Vec<String>,
    lookups: Mutex<Vec<u64>>,
}

impl FakeReleaseIndex {
    pub fn new(channels: &[&str]) -> Self {
        Self {
            channels: channels.iter().map(|c| c.to_string()).collect(),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn lookups(&self) -> Vec<u64> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReleaseIndex for FakeReleaseIndex {
    async fn latest_channel_for_major(&self, major: u64) -> Result<String, RegistryError> {
        self.lookups.lock().unwrap().push(major);
        let prefix = format!("{major}.");
        self.channels
            .iter()
            .find(|c| c.starts_with(&prefix))
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                major: major.to_string(),
                url: "memory".to_string(),
            })
    }
}

/// Backend whose service cannot be reached
pub struct OfflineBackend;

#[async_trait]
impl CacheBackend for OfflineBackend {
    async fn is_feature_available(&self) -> bool {
        false
    }

    async fn restore(
        &self,
        _paths: &[PathBuf],
        _primary_key: &str,
        _restore_keys: &[String],
    ) -> Result<Option<String>, CacheError> {
        Err(CacheError::Backend("offline".to_string()))
    }

    async fn save(&self, _paths: &[PathBuf], _key: &str) -> Result<SaveOutcome, CacheError> {
        Err(CacheError::Backend("offline".to_string()))
    }
}
