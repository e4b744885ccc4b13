use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use detlab_core::{ConfigError, SplunkConfig};
use detlab_harness::{BatchSummary, Deployer, HarnessError, TestKind, TestRunner};
use detlab_rules::{RuleConverter, RuleError, SigmaCliConverter};
use detlab_splunk::{HecClient, SplunkError, SplunkSession};

#[derive(Parser)]
#[command(name = "detlab")]
#[command(about = "Deploy and test detection rules against a Splunk lab", long_about = None)]
struct Cli {
    /// Default log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay sample data and verify each rule fires (or stays silent)
    Test(TestArgs),
    /// Deploy rules as scheduled saved searches
    Deploy(DeployArgs),
    /// List deployed detections
    List,
    /// Remove a deployed detection by name
    Remove {
        /// Saved-search name (the rule's file stem)
        name: String,
    },
}

#[derive(Args)]
struct TestArgs {
    /// Folder containing detection rule YAML files
    folder: PathBuf,
    /// Preserve ingested test data after each rule
    #[arg(long)]
    no_cleanup: bool,
    /// Expect rules to stay silent instead of firing
    #[arg(long)]
    false_positive: bool,
}

#[derive(Args)]
struct DeployArgs {
    /// Folder containing detection rule YAML files
    folder: PathBuf,
    /// Lab host identifier scoped into each deployed query
    #[arg(long, default_value = "lab1")]
    lab_host: String,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Rules(#[from] RuleError),
    #[error(transparent)]
    Platform(#[from] SplunkError),
    #[error(transparent)]
    Harness(#[from] HarnessError),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = detlab_core::init_tracing(Some(&cli.log_level)) {
        eprintln!("failed to initialize logging: {}", err);
    }

    match run(cli.command).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            process::exit(1);
        }
    }
}

async fn run(command: Commands) -> Result<bool, CliError> {
    let config = SplunkConfig::from_env()?;
    let session = SplunkSession::connect(
        &config.management_url(),
        &config.username,
        &config.password,
        config.verify_tls,
    )
    .await?;
    let converter: Arc<dyn RuleConverter> = Arc::new(SigmaCliConverter::default());

    match command {
        Commands::Test(args) => {
            let detections = detlab_rules::load_directory(&args.folder)?;
            let hec = HecClient::new(
                session.clone(),
                &config.hec_url(),
                config.hec_token.as_str(),
                config.index.as_str(),
            )?;
            let runner = TestRunner::new(session, hec, converter).with_cleanup(!args.no_cleanup);
            let kind = if args.false_positive {
                TestKind::FalsePositive
            } else {
                TestKind::TruePositive
            };

            let summary = runner.run_batch(&detections, kind).await;
            print_summary("DETECTION TESTING SUMMARY", &summary);
            if args.no_cleanup {
                println!(
                    "{}",
                    "test data was not cleaned up (--no-cleanup)".yellow()
                );
            }
            Ok(summary.all_passed())
        }
        Commands::Deploy(args) => {
            let detections = detlab_rules::load_directory(&args.folder)?;
            let deployer = Deployer::new(session, converter, &args.lab_host);
            let summary = deployer.deploy_batch(&detections).await;
            print_summary("DETECTION DEPLOYMENT SUMMARY", &summary);
            Ok(summary.all_passed())
        }
        Commands::List => {
            let deployer = Deployer::new(session, converter, "lab1");
            for name in deployer.list().await? {
                println!("{}", name);
            }
            Ok(true)
        }
        Commands::Remove { name } => {
            let deployer = Deployer::new(session, converter, "lab1");
            deployer.remove(&name).await?;
            println!("removed {}", name.bold());
            Ok(true)
        }
    }
}

fn print_summary(title: &str, summary: &BatchSummary) {
    for report in &summary.reports {
        let verdict = if report.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };
        match &report.error {
            Some(err) => println!("{} {} ({})", verdict, report.name, err),
            None => println!("{} {}", verdict, report.name),
        }
    }

    let rate = if summary.total > 0 {
        summary.passed as f64 / summary.total as f64 * 100.0
    } else {
        0.0
    };
    println!("\n{}", "=".repeat(50));
    println!("{}", title.bold());
    println!("{}", "=".repeat(50));
    println!("Total rules:  {}", summary.total);
    println!("Passed:       {}", summary.passed);
    println!("Failed:       {}", summary.failed);
    println!("Success rate: {:.1}%", rate);
}
