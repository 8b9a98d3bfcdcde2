//! Post-deployment hook
//!
//! Generates the outputs file consumed after the proxy stack is deployed:
//! the stack outputs passed through unchanged plus one resource policy per
//! private API Gateway, restricting it to the proxy's VPC endpoint and
//! custom domains.
//!
//! ```bash
//! post-hook \
//!   --region us-east-1 \
//!   --destination-path out/outputs.json \
//!   --stack-outputs "$(aws cloudformation describe-stacks ... --query 'Stacks[0].Outputs')" \
//!   --proxy-file-path config/proxy.yaml
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use proxy_api::{ProxyFile, StackOutputs};
use proxy_core::{validate_destination, write_outputs_file, OutputsFile};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "post-hook")]
#[command(about = "Write stack outputs and API Gateway resource policies for the reverse proxy", long_about = None)]
#[command(version)]
struct Args {
    /// AWS region the stack was deployed to
    #[arg(long, env = "AWS_REGION")]
    region: String,

    /// Where to write the outputs JSON file
    #[arg(long, env = "DESTINATION_PATH")]
    destination_path: String,

    /// JSON array of {OutputKey, OutputValue} stack outputs
    #[arg(long, env = "STACK_OUTPUTS")]
    stack_outputs: String,

    /// Proxy definition file with the APIS list
    #[arg(long, env = "PROXY_FILE_PATH")]
    proxy_file_path: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    run(&args).await
}

/// Validate the destination, build the outputs file and write it.
/// An error here makes `main` exit with status 1 before anything is written.
async fn run(args: &Args) -> Result<()> {
    info!("Generating outputs for region {}", args.region);

    validate_destination(&args.destination_path)?;

    let source = tokio::fs::read_to_string(&args.proxy_file_path)
        .await
        .with_context(|| format!("Failed to read proxy file {}", args.proxy_file_path))?;
    let proxy_file = ProxyFile::from_yaml(&source)
        .with_context(|| format!("Failed to parse proxy file {}", args.proxy_file_path))?;
    debug!("Loaded {} proxy domain(s)", proxy_file.apis.len());

    let stack_outputs = StackOutputs::from_json(&args.stack_outputs).context("Failed to parse stack outputs")?;
    debug!("Loaded {} stack output(s)", stack_outputs.len());

    let outputs = OutputsFile::build(stack_outputs, &proxy_file.apis)?;
    write_outputs_file(&args.destination_path, &outputs).await?;

    println!(
        "
  ########################## Deployment Complete ###################################

  ------> outputs.json file saved at location {}

  ##################################################################################
",
        args.destination_path
    );

    Ok(())
}
