//! Workflow channel configured from the runner environment

use std::path::Path;

use serial_test::serial;
use tempfile::TempDir;

use setup_dotnet::workflow::{GithubWorkflow, Workflow, parse_key_values};

fn set_vars(vars: &[(&str, &Path)]) {
    for (name, value) in vars {
        // SAFETY: tests touching the process environment run serially
        unsafe { std::env::set_var(name, value) };
    }
}

fn remove_vars(names: &[&str]) {
    for name in names {
        // SAFETY: tests touching the process environment run serially
        unsafe { std::env::remove_var(name) };
    }
}

const FILE_VARS: &[&str] = &["GITHUB_STATE", "GITHUB_OUTPUT", "GITHUB_ENV", "GITHUB_PATH"];

#[test]
#[serial]
fn from_env_writes_file_commands() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state");
    let output = dir.path().join("output");
    let env = dir.path().join("env");
    let path = dir.path().join("path");
    set_vars(&[
        ("GITHUB_STATE", state.as_path()),
        ("GITHUB_OUTPUT", output.as_path()),
        ("GITHUB_ENV", env.as_path()),
        ("GITHUB_PATH", path.as_path()),
    ]);

    let workflow = GithubWorkflow::from_env();
    workflow.save_state("CACHE_KEY", "dotnet-cache-Linux-abc").unwrap();
    workflow.set_output("cache-hit", "false").unwrap();
    workflow.export_variable("DOTNET_ROOT", "/opt/dotnet").unwrap();
    workflow.add_path(Path::new("/opt/dotnet")).unwrap();
    remove_vars(FILE_VARS);

    let state = parse_key_values(&std::fs::read_to_string(state).unwrap());
    let output = parse_key_values(&std::fs::read_to_string(output).unwrap());
    let env = parse_key_values(&std::fs::read_to_string(env).unwrap());
    assert_eq!(state["CACHE_KEY"], "dotnet-cache-Linux-abc");
    assert_eq!(output["cache-hit"], "false");
    assert_eq!(env["DOTNET_ROOT"], "/opt/dotnet");
    assert_eq!(std::fs::read_to_string(path).unwrap(), "/opt/dotnet\n");
}

#[test]
#[serial]
fn from_env_reads_state_variables() {
    remove_vars(FILE_VARS);
    // SAFETY: tests touching the process environment run serially
    unsafe { std::env::set_var("STATE_CACHE_RESULT", "dotnet-cache-Linux-abc") };

    let workflow = GithubWorkflow::from_env();
    remove_vars(&["STATE_CACHE_RESULT"]);

    assert_eq!(workflow.get_state("CACHE_RESULT"), "dotnet-cache-Linux-abc");
    assert_eq!(workflow.get_state("CACHE_KEY"), "");
}
