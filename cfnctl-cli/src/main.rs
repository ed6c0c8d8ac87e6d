use anyhow::{Context, Result};
use cfnctl_core::{
    CfnctlError, CfnctlService, DeployOptions, DeployReport, PackageOptions, PollSettings,
};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Exit status for a stack that settled in a failure status.
const EXIT_DEPLOY_FAILED: u8 = 2;
/// Conventional exit status after SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "cfnctl")]
#[command(version, about = "Deploy CloudFormation stacks and stack sets", long_about = None)]
struct Cli {
    /// AWS credential profile to use
    #[arg(short, long)]
    profile: Option<String>,

    /// AWS region to deploy to
    #[arg(short, long)]
    region: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a template through a change set, or as a stack set
    Deploy(DeployArgs),

    /// Create an archive and upload it to S3 to build a Lambda function from
    Lambda(LambdaArgs),
}

#[derive(Args)]
struct DeployArgs {
    /// Name of the stack (or stack set) to deploy
    #[arg(short = 's', long)]
    stack_name: String,

    /// Local template path or http(s) URL
    #[arg(short, long)]
    template: String,

    /// Bucket to stage the template in [default: cfnctl-staging-bucket-<region>-<account>]
    #[arg(short, long)]
    bucket: Option<String>,

    /// Parameter file [default: parameters.json]
    #[arg(short, long)]
    parameters: Option<PathBuf>,

    /// Do not roll back the stack when the deployment fails
    #[arg(long)]
    no_rollback: bool,

    /// Deploy as a stack set to the given accounts
    #[arg(long, requires = "accounts")]
    stack_set: bool,

    /// Target account ids for a stack set, comma separated
    #[arg(short, long, value_delimiter = ',')]
    accounts: Vec<String>,

    /// Execution role for stack set operations
    #[arg(long)]
    execution_role: Option<String>,

    /// Give up after this many status polls [default: wait indefinitely]
    #[arg(long)]
    max_polls: Option<u32>,

    /// Seconds between status polls
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval: u64,
}

#[derive(Args)]
struct LambdaArgs {
    /// Source directory to zip and upload
    #[arg(short, long)]
    source: PathBuf,

    /// Archive path; ".zip" is appended when missing [default: <source>.zip]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Bucket to upload to [default: cfnctl-staging-bucket-<region>-<account>]
    #[arg(short, long)]
    bucket: Option<String>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let service = CfnctlService::new(cli.profile.as_deref(), cli.region.as_deref())
        .await
        .context("Failed to initialise AWS clients")?;

    match cli.command {
        Commands::Deploy(args) => {
            let poll = PollSettings {
                interval: Duration::from_secs(args.poll_interval),
                max_polls: args.max_polls,
            };
            let options = DeployOptions {
                stack_name: args.stack_name,
                template: args.template,
                bucket: args.bucket,
                parameters_file: args.parameters,
                no_rollback: args.no_rollback,
                stack_set: args.stack_set,
                accounts: args.accounts,
                execution_role: args.execution_role,
            };

            let report = service
                .with_poll_settings(poll)
                .deploy(&options)
                .await
                .with_context(|| format!("Deployment of {} failed", options.stack_name))?;

            match report {
                DeployReport::Stack {
                    stack, completion, ..
                } => info!("Stack {} is {}", stack, completion.status),
                DeployReport::ChangeSetFailed {
                    stack,
                    change_set,
                    reason,
                } => warn!(
                    "Change set {} was not executed, stack {} is unchanged: {}",
                    change_set,
                    stack,
                    reason.as_deref().unwrap_or("no reason given")
                ),
                DeployReport::StackSet {
                    name, instances, ..
                } => info!(
                    "Stack set {} deployed to {}",
                    name,
                    instances.accounts.join(", ")
                ),
            }
        }
        Commands::Lambda(args) => {
            let options = PackageOptions {
                source: args.source,
                output: args.output,
                bucket: args.bucket,
            };
            let report = service
                .package(&options)
                .await
                .with_context(|| format!("Packaging {} failed", options.source.display()))?;
            info!("Uploaded {} to {}", report.archive.display(), report.url);
        }
    }

    Ok(())
}

fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<CfnctlError>() {
        Some(CfnctlError::StackFailed { .. }) => ExitCode::from(EXIT_DEPLOY_FAILED),
        _ => ExitCode::FAILURE,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = tokio::select! {
        result = run(cli) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nReceived Keyboard interrupt.\nExiting...");
            return ExitCode::from(EXIT_INTERRUPTED);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            exit_code(&e)
        }
    }
}
