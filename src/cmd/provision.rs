//! The one-shot provisioning flow.
//!
//! Every step is a single call to the directory, gated by fixed waits that
//! give the backend time to propagate the previous mutation. Any failure
//! aborts the run; nothing created so far is rolled back.

use crate::error::Result;
use crate::graph::application::{self, AppRegistrar};
use crate::graph::{auth, GraphClient};
use crate::{permissions, progress, prompts};
use clap::Args;
use colored::Colorize;
use std::time::Duration;

/// Pause before handing off to the system browser so the operator can read
/// the preceding message
const BROWSER_HANDOFF_DELAY: Duration = Duration::from_secs(2);

const APP_PROPAGATION_DELAY: Duration = Duration::from_secs(5);
const PERMISSION_PROPAGATION_DELAY: Duration = Duration::from_secs(20);
const CONSENT_PROPAGATION_DELAY: Duration = Duration::from_secs(5);
const SECRET_PROPAGATION_DELAY: Duration = Duration::from_secs(5);

#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Azure tenant ID (prompted for when omitted)
    #[arg(long)]
    pub tenant_id: Option<String>,

    /// Display name for the application registration
    #[arg(long, default_value = "datadog-ms-defender-365")]
    pub app_name: String,

    /// Display name for the generated client secret
    #[arg(long, default_value = "defender365")]
    pub secret_name: String,
}

pub async fn run(args: ProvisionArgs) -> Result<()> {
    let tenant_id = match args.tenant_id {
        Some(id) => id.trim().to_string(),
        None => prompts::input("Enter your Azure tenant ID")?,
    };

    // Step 1: interactive sign-in
    prompts::info("Redirecting to browser for authentication...");
    tokio::time::sleep(BROWSER_HANDOFF_DELAY).await;
    let access_token = auth::acquire_token_interactive(&tenant_id).await?;
    prompts::success("Authentication successful");

    let client = GraphClient::new(access_token);
    let registrar = AppRegistrar::new(&client);

    // Step 2: create the application object
    println!("Creating application '{}'...", args.app_name);
    let app = registrar.create_application(&args.app_name).await?;
    prompts::success(&format!(
        "Application \"{}\" created successfully",
        app.display_name
    ));
    println!("  {} {}", "Application (client) ID:".cyan(), app.app_id);
    println!("  {} {}", "Object ID:".cyan(), app.object_id);

    propagation_wait("Waiting for application to propagate...", APP_PROPAGATION_DELAY).await;

    // Step 3: assign the static permission table
    println!("Assigning permissions...");
    registrar.grant_permissions(&app.object_id).await?;
    prompts::success("Permissions assigned successfully:");
    for (resource, permission) in permissions::all() {
        println!("  {} {} ({})", "•".dimmed(), permission.name, resource.dimmed());
    }

    propagation_wait(
        "Waiting for permissions to propagate, this may take some time...",
        PERMISSION_PROPAGATION_DELAY,
    )
    .await;

    // Step 4: operator-mediated admin consent
    let consent_url = application::admin_consent_url(&tenant_id, &app.app_id)?;
    println!("Granting admin consent...");
    prompts::info("Redirecting to browser for admin consent...");
    tokio::time::sleep(BROWSER_HANDOFF_DELAY).await;
    if open::that(consent_url.as_str()).is_err() {
        prompts::warning("Could not launch a browser.");
        println!("Open this URL in your browser:\n{}", consent_url);
    }
    prompts::pause("Press Enter after confirming admin consent has been granted")?;

    propagation_wait(
        "Waiting for admin consent to propagate...",
        CONSENT_PROPAGATION_DELAY,
    )
    .await;

    // Step 5: mint the client secret
    println!("Generating client secret...");
    let secret = registrar
        .add_client_secret(&app.object_id, &args.secret_name)
        .await?;
    println!(
        "{}",
        "Note this client secret for future use, it will not be shown again.".magenta()
    );
    if let Some(expires) = secret.end_date_time {
        println!("  Secret expires: {}", expires.format("%Y-%m-%d"));
    }

    propagation_wait(
        "Waiting for client secret to propagate...",
        SECRET_PROPAGATION_DELAY,
    )
    .await;

    // Final summary for transcription into the integration's conf.yaml
    println!(
        "\n{}",
        "Application setup completed successfully.".green().bold()
    );
    println!("{}", "─".repeat(50));
    println!("{} {}", "Tenant ID:".magenta(), tenant_id);
    println!("{} {}", "Client ID:".magenta(), app.app_id);
    println!("{} {}", "Client Secret:".magenta(), secret.secret_text);
    println!("{}", "─".repeat(50));
    println!(
        "{}",
        "Use this tenant_id, client_id and client_secret in conf.yaml for the Microsoft Defender integration."
            .cyan()
    );

    Ok(())
}

/// Fixed wait with a spinner, to tolerate backend eventual consistency
async fn propagation_wait(message: &str, delay: Duration) {
    let spinner = progress::create_spinner(message);
    tokio::time::sleep(delay).await;
    progress::finish_spinner_success(&spinner, message);
}
