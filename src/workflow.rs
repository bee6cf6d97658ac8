//! Communication with the workflow runner
//!
//! Step state, outputs, PATH entries and exported variables all travel through
//! the runner's file commands. When a file command is not configured (running
//! outside of a runner) the equivalent stdout workflow command is printed.

#[cfg(test)]
use mockall::automock;

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Unable to write workflow file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected input: value of '{0}' contains the file command delimiter")]
    DelimiterCollision(String),
}

/// Side channel to the workflow runner
#[cfg_attr(test, automock)]
pub trait Workflow: Send + Sync {
    /// Persists a value for the post step of this job
    fn save_state(&self, name: &str, value: &str) -> Result<(), WorkflowError>;

    /// Reads a value saved by [`Workflow::save_state`], empty when missing
    fn get_state(&self, name: &str) -> String;

    fn set_output(&self, name: &str, value: &str) -> Result<(), WorkflowError>;

    /// Prepends a directory to PATH for the following steps
    fn add_path(&self, path: &Path) -> Result<(), WorkflowError>;

    /// Exports an environment variable to the following steps
    fn export_variable(&self, name: &str, value: &str) -> Result<(), WorkflowError>;

    /// Registers a problem matcher definition for the rest of the job
    fn add_matcher(&self, path: &Path) -> Result<(), WorkflowError>;
}

/// Paths of the runner's file commands
#[derive(Debug, Clone, Default)]
pub struct FileCommands {
    pub state: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub env: Option<PathBuf>,
    pub path: Option<PathBuf>,
}

impl FileCommands {
    pub fn from_env() -> Self {
        let var = |name: &str| {
            std::env::var_os(name)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            state: var("GITHUB_STATE"),
            output: var("GITHUB_OUTPUT"),
            env: var("GITHUB_ENV"),
            path: var("GITHUB_PATH"),
        }
    }
}

/// [`Workflow`] backed by the GitHub Actions file commands
#[derive(Debug, Clone)]
pub struct GithubWorkflow {
    files: FileCommands,
    /// `STATE_*` variables the runner injected into this step
    state_env: HashMap<String, String>,
}

impl GithubWorkflow {
    pub fn new(files: FileCommands, state_env: HashMap<String, String>) -> Self {
        Self { files, state_env }
    }

    pub fn from_env() -> Self {
        let state_env = std::env::vars()
            .filter_map(|(k, v)| k.strip_prefix("STATE_").map(|name| (name.to_string(), v)))
            .collect();
        Self::new(FileCommands::from_env(), state_env)
    }

    fn append(&self, path: &Path, content: &str) -> Result<(), WorkflowError> {
        let io_err = |source| WorkflowError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;
        file.write_all(content.as_bytes()).map_err(io_err)
    }

    fn append_key_value(&self, path: &Path, name: &str, value: &str) -> Result<(), WorkflowError> {
        let entry = key_value_message(name, value, &new_delimiter())?;
        self.append(path, &entry)
    }
}

impl Workflow for GithubWorkflow {
    fn save_state(&self, name: &str, value: &str) -> Result<(), WorkflowError> {
        debug!("Saving state {}={}", name, value);
        match &self.files.state {
            Some(path) => self.append_key_value(path, name, value),
            None => {
                println!("::save-state name={}::{}", name, value);
                Ok(())
            }
        }
    }

    fn get_state(&self, name: &str) -> String {
        if let Some(value) = self.state_env.get(name) {
            return value.clone();
        }
        self.files
            .state
            .as_deref()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|content| parse_key_values(&content).remove(name))
            .unwrap_or_default()
    }

    fn set_output(&self, name: &str, value: &str) -> Result<(), WorkflowError> {
        match &self.files.output {
            Some(path) => self.append_key_value(path, name, value),
            None => {
                println!("::set-output name={}::{}", name, value);
                Ok(())
            }
        }
    }

    fn add_path(&self, path: &Path) -> Result<(), WorkflowError> {
        match &self.files.path {
            Some(file) => self.append(file, &format!("{}\n", path.display())),
            None => {
                println!("::add-path::{}", path.display());
                Ok(())
            }
        }
    }

    fn export_variable(&self, name: &str, value: &str) -> Result<(), WorkflowError> {
        match &self.files.env {
            Some(path) => self.append_key_value(path, name, value),
            None => {
                println!("::set-env name={}::{}", name, value);
                Ok(())
            }
        }
    }

    fn add_matcher(&self, path: &Path) -> Result<(), WorkflowError> {
        println!("::add-matcher::{}", path.display());
        Ok(())
    }
}

fn new_delimiter() -> String {
    format!("ghadelimiter_{}", Uuid::new_v4())
}

/// `name<<delimiter` block as understood by the runner
fn key_value_message(name: &str, value: &str, delimiter: &str) -> Result<String, WorkflowError> {
    if name.contains(delimiter) || value.contains(delimiter) {
        return Err(WorkflowError::DelimiterCollision(name.to_string()));
    }
    Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"))
}

/// Parses a file command file. Both `name=value` lines and heredoc blocks are
/// accepted; later entries win.
pub fn parse_key_values(content: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        if let Some((name, delimiter)) = line.split_once("<<") {
            let mut value = Vec::new();
            for line in lines.by_ref() {
                if line == delimiter {
                    break;
                }
                value.push(line);
            }
            values.insert(name.to_string(), value.join("\n"));
        } else if let Some((name, value)) = line.split_once('=') {
            values.insert(name.to_string(), value.to_string());
        }
    }

    values
}
