use clap::Parser;
use colored::Colorize;
use defender365_setup::{cmd, error};

#[derive(Parser, Debug)]
#[command(
    name = "defender365-setup",
    about = "Register an Entra ID application for the Microsoft Defender 365 integration",
    version,
    long_about = "One-shot setup tool for the Microsoft Defender 365 monitoring integration.\n\n\
                  Creates an application registration, grants the required Microsoft Graph\n\
                  and Windows Defender ATP permissions, walks you through admin consent,\n\
                  and generates a client secret for the integration's conf.yaml."
)]
struct Cli {
    #[command(flatten)]
    provision: cmd::provision::ProvisionArgs,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> error::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("defender365_setup=debug")
            .init();
    }

    cmd::provision::run(cli.provision).await
}
