//! Binary entry point: read inputs, execute one invocation, write step
//! outputs, exit 0/1.

use std::process;

use tracing::error;
use tracing_subscriber::EnvFilter;

use download_artifact::{Result, env, github::GitHubClient, inputs::Inputs, outputs, pipeline};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        error!("{err}");
        drop(outputs::set_output("found_artifact", false));
        drop(outputs::set_output("error_message", &err));
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let inputs = Inputs::from_env()?;
    let client = GitHubClient::new(inputs.token.clone(), env::GITHUB_API_URL.clone());

    let outcome = pipeline::execute(&client, &inputs).await?;

    outputs::set_output("artifacts", serde_json::to_string(&outcome.artifacts)?)?;
    if inputs.dry_run {
        outputs::set_output("dry_run", outcome.dry_run)?;
    }
    outputs::set_output("found_artifact", outcome.found_artifact)?;
    Ok(())
}
