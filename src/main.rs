use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{error, info};

use setup_dotnet::action::{Services, SetupEnvironment, SetupInputs, run_post, run_setup};
use setup_dotnet::cache::LocalCacheBackend;
use setup_dotnet::config::{self, QualityPolicy};
use setup_dotnet::install::InstallSettings;
use setup_dotnet::install::arguments::ProxySettings;
use setup_dotnet::install::sdk::{find_matching_version, list_sdks};
use setup_dotnet::logging;
use setup_dotnet::platform::{Platform, cache_platform_label, find_powershell};
use setup_dotnet::process::SystemCommandRunner;
use setup_dotnet::version::release_index::DotnetReleaseIndex;
use setup_dotnet::workflow::GithubWorkflow;

#[derive(Parser)]
#[command(name = "setup-dotnet")]
#[command(version, about = "Resolve, install, and cache .NET SDKs on CI runners")]
struct Cli {
    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Append logs to this file instead of stdout
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Root of the local cache backend
    #[arg(long, global = true, env = "SETUP_DOTNET_CACHE_DIR", value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Install the requested SDKs and restore the NuGet cache
    Setup(SetupArgs),
    /// Save the NuGet cache at the end of the job
    Save(SaveArgs),
    /// List installed SDKs, optionally only the first matching a pattern
    Sdks {
        /// Version pattern such as `6.0.4xx` or `8.x`
        pattern: Option<String>,
    },
}

#[derive(Args)]
struct SetupArgs {
    /// SDK versions to install, newline separated
    #[arg(long, env = "INPUT_DOTNET-VERSION", value_delimiter = '\n')]
    dotnet_version: Vec<String>,

    /// Quality of the build: daily, signed, validated, preview or ga
    #[arg(long, env = "INPUT_DOTNET-QUALITY")]
    dotnet_quality: Option<String>,

    /// global.json to read the SDK version from
    #[arg(long, env = "INPUT_GLOBAL-JSON-FILE")]
    global_json_file: Option<PathBuf>,

    /// Restore the NuGet global-packages folder
    #[arg(
        long,
        env = "INPUT_CACHE",
        action = ArgAction::Set,
        default_value_t = false,
        value_parser = parse_bool_input
    )]
    cache: bool,

    /// Lock-file globs used for the cache key, newline separated
    #[arg(long, env = "INPUT_CACHE-DEPENDENCY-PATH", value_delimiter = '\n')]
    cache_dependency_path: Vec<String>,

    /// What to do with a quality the requested version cannot honour
    #[arg(long, value_enum, default_value_t = QualityPolicy::Warn)]
    quality_policy: QualityPolicy,

    /// Install script to run instead of the bundled one
    #[arg(long, env = "SETUP_DOTNET_INSTALL_SCRIPT")]
    install_script: Option<PathBuf>,

    /// Do not overwrite files shared between SDK versions
    #[arg(long)]
    skip_non_versioned_files: bool,
}

#[derive(Args)]
struct SaveArgs {
    /// Save the NuGet global-packages folder
    #[arg(
        long,
        env = "INPUT_CACHE",
        action = ArgAction::Set,
        default_value_t = false,
        value_parser = parse_bool_input
    )]
    cache: bool,
}

/// Boolean action input; an unset input is false
fn parse_bool_input(value: &str) -> Result<bool, String> {
    match value.trim() {
        "" | "false" | "False" | "FALSE" => Ok(false),
        "true" | "True" | "TRUE" => Ok(true),
        other => Err(format!(
            "Input does not meet YAML 1.2 \"Core Schema\" specification: {other}"
        )),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match logging::init(cli.verbose, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(run(cli)));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let platform = Platform::current();
    let install_dir = config::install_dir(platform);
    let backend = LocalCacheBackend::new(cli.cache_dir.unwrap_or_else(config::default_cache_dir));
    let runner = SystemCommandRunner;
    let workflow = GithubWorkflow::from_env();

    match cli.command {
        Command::Setup(args) => {
            let working_dir = std::env::current_dir()?;
            let workspace = std::env::var_os("GITHUB_WORKSPACE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| working_dir.clone());
            let shell = match platform {
                Platform::Windows => find_powershell(std::env::var_os("PATH")),
                Platform::Linux | Platform::MacOs => None,
            };

            let env = SetupEnvironment {
                install: InstallSettings {
                    platform,
                    script: args
                        .install_script
                        .unwrap_or_else(|| config::default_install_script(platform)),
                    shell,
                    install_dir,
                    quality_policy: args.quality_policy,
                    proxy: ProxySettings::from_env(),
                    skip_non_versioned_files: args.skip_non_versioned_files,
                },
                working_dir,
                workspace,
                platform_label: cache_platform_label(std::env::var("RUNNER_OS").ok(), platform),
                server_url: std::env::var("GITHUB_SERVER_URL").ok(),
                matcher_dir: std::env::var_os("RUNNER_TEMP")
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
                    .unwrap_or_else(std::env::temp_dir)
                    .join("setup-dotnet"),
            };
            let inputs = SetupInputs {
                versions: args.dotnet_version,
                quality: args.dotnet_quality,
                global_json_file: args.global_json_file,
                cache: args.cache,
                cache_dependency_path: args.cache_dependency_path,
            };
            let index = DotnetReleaseIndex::default();

            run_setup(
                &inputs,
                &env,
                Services {
                    index: &index,
                    runner: &runner,
                    backend: &backend,
                    workflow: &workflow,
                },
            )
            .await?;
        }
        Command::Save(args) => {
            let dotnet = config::dotnet_executable(&install_dir, platform);
            let server_url = std::env::var("GITHUB_SERVER_URL").ok();
            run_post(
                args.cache,
                server_url.as_deref(),
                &dotnet,
                &runner,
                &backend,
                &workflow,
            )
            .await?;
        }
        Command::Sdks { pattern } => {
            let dotnet = config::dotnet_executable(&install_dir, platform);
            let sdks = list_sdks(&runner, &dotnet).await;
            match pattern {
                Some(pattern) => match find_matching_version(&sdks, &pattern) {
                    Some(version) => println!("{version}"),
                    None => info!("No installed SDK matches {}", pattern),
                },
                None => sdks.iter().for_each(|sdk| println!("{sdk}")),
            }
        }
    }

    Ok(())
}
