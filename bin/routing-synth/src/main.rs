//! Routing synthesizer
//!
//! Declares the load balancer, certificates, private hosted zones and alias
//! records for every proxy domain and writes the resulting deployment
//! manifest as JSON.
//!
//! ```bash
//! routing-synth synth --stack-name proxy --proxy-file-path proxy.yaml --vpc-file vpc.yaml --elb-type NLB
//! routing-synth schema > proxy.schema.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use proxy_api::{proxy_file_schema, ElbType, ProxyFile, VpcConfig, VpcOwnership};
use proxy_routing::{Routing, RoutingProps, Stack};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "routing-synth")]
#[command(about = "Synthesize load balancer and DNS routing for the reverse proxy", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the routing stack and write its manifest
    Synth(SynthArgs),

    /// Print the JSON Schema of the proxy file
    Schema,
}

#[derive(clap::Args, Debug)]
struct SynthArgs {
    /// Stack name, used as prefix for construct ids
    #[arg(long, env = "STACK_NAME")]
    stack_name: String,

    /// Proxy definition file with the APIS list
    #[arg(long, env = "PROXY_FILE_PATH")]
    proxy_file_path: PathBuf,

    /// VPC description (VPC_ID, PRIVATE_SUBNETS, ISOLATED_SUBNETS)
    #[arg(long, env = "VPC_FILE_PATH")]
    vpc_file: PathBuf,

    /// Load balancer type: NLB or ALB
    #[arg(long, env = "ELB_TYPE", default_value_t = ElbType::Application)]
    elb_type: ElbType,

    /// Whether the VPC is created by the same deployment (true) or supplied (false)
    #[arg(long, env = "CREATE_VPC", default_value = "true")]
    create_vpc: VpcOwnership,

    /// JSON array of subnet ids for an externally managed VPC
    #[arg(long, env = "EXTERNAL_PRIVATE_SUBNET_IDS")]
    external_private_subnet_ids: Option<String>,

    /// Security group for an application load balancer
    #[arg(long, env = "ALB_SECURITY_GROUP_ID")]
    security_group_id: Option<String>,

    /// Manifest destination (stdout when omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Synth(args) => synth(args).await,
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&proxy_file_schema())?);
            Ok(())
        }
    }
}

async fn synth(args: SynthArgs) -> Result<()> {
    info!("Synthesizing routing for stack {}", args.stack_name);

    let proxy_source = tokio::fs::read_to_string(&args.proxy_file_path)
        .await
        .with_context(|| format!("Failed to read proxy file {}", args.proxy_file_path.display()))?;
    let proxy_file = ProxyFile::from_yaml(&proxy_source)
        .with_context(|| format!("Failed to parse proxy file {}", args.proxy_file_path.display()))?;

    let vpc_source = tokio::fs::read_to_string(&args.vpc_file)
        .await
        .with_context(|| format!("Failed to read VPC file {}", args.vpc_file.display()))?;
    let vpc = VpcConfig::from_yaml(&vpc_source)
        .with_context(|| format!("Failed to parse VPC file {}", args.vpc_file.display()))?;
    debug!("Attaching to VPC {}", vpc.vpc_id);

    let props = RoutingProps {
        vpc,
        security_group_id: args.security_group_id,
        elb_type: args.elb_type,
        proxy_domains: proxy_file.apis,
        external_subnet_ids: args.external_private_subnet_ids,
        ownership: args.create_vpc,
    };

    let mut stack = Stack::new(&args.stack_name).with_description("Reverse proxy load balancer and private DNS routing");
    let routing = Routing::build(&mut stack, &props)?;

    stack.add_output("ElbDns", routing.elb_dns.clone(), Some("Dual-stack DNS name of the load balancer"));
    stack.add_output(
        "TargetGroupArn",
        routing.target_group.reference(),
        Some("Target group receiving proxied traffic"),
    );

    let manifest = stack.to_json_pretty()?;
    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            tokio::fs::write(path, manifest)
                .await
                .with_context(|| format!("Failed to write manifest {}", path.display()))?;
            info!("Manifest with {} resource(s) written to {}", stack.resource_count(), path.display());
        }
        None => println!("{}", manifest),
    }

    Ok(())
}
