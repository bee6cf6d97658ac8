//! Command runner doubles

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use setup_dotnet::process::{CommandOutput, CommandRunner, CommandSpec};

type Responder = Box<dyn Fn(&CommandSpec) -> CommandOutput + Send + Sync>;

/// Answers every command through a closure and remembers what was run
pub struct RecordingRunner {
    responder: Responder,
    calls: Mutex<Vec<CommandSpec>>,
}

impl RecordingRunner {
    pub fn new(responder: impl Fn(&CommandSpec) -> CommandOutput + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Install script that reports `<channel>.100` for channels and the exact
    /// version otherwise, and a .NET CLI listing `global_packages`
    pub fn dotnet(global_packages: &Path) -> Self {
        let global_packages = global_packages.to_path_buf();
        Self::new(move |spec| {
            if spec.args.iter().any(|a| a == "locals") {
                return locals_output(&global_packages);
            }
            let value = spec.args.get(1).cloned().unwrap_or_default();
            match spec.args.first().map(String::as_str) {
                Some("--channel") => install_output(&format!("{value}.100")),
                _ => install_output(&value),
            }
        })
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Argument lists of the install script invocations
    pub fn install_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|c| !c.args.iter().any(|a| a == "locals"))
            .map(|c| c.args)
            .collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &CommandSpec) -> std::io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(command.clone());
        Ok((self.responder)(command))
    }
}

pub fn install_output(version: &str) -> CommandOutput {
    CommandOutput {
        exit_code: 0,
        stdout: format!(
            "dotnet-install: Installed version is {version}\n\
             dotnet-install: Installation finished successfully."
        ),
        stderr: String::new(),
    }
}

pub fn locals_output(global_packages: &Path) -> CommandOutput {
    CommandOutput {
        exit_code: 0,
        stdout: format!(
            "http-cache: /tmp/NuGet/v3-cache\nglobal-packages: {}\ntemp: /tmp/NuGetScratch\nplugins-cache: /tmp/NuGet/plugins-cache\n",
            global_packages.display()
        ),
        stderr: String::new(),
    }
}
