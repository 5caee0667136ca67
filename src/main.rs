//! lbroute - route a request URI to an instance of a configured service
//!
//! Usage:
//!     lbroute --config <path> --service <id> --uri <uri>
//!
//! See --help for more options.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};
use url::Url;

use lbroute::config::{Config, load_config};
use lbroute::util::init_logging;
use lbroute::{LoadBalancerClient, ReconstructedUri, RequestContext, ServiceRegistry};

/// Choose an instance of a service and print the request URI rewritten for it.
#[derive(Parser, Debug)]
#[command(name = "lbroute")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Service to route to
    #[arg(short, long, value_name = "ID", required_unless_present = "validate")]
    service: Option<String>,

    /// Original request URI
    #[arg(short, long, value_name = "URI", required_unless_present = "validate")]
    uri: Option<Url>,

    /// Routing hint passed to the balancer (e.g. an instance id)
    #[arg(long, value_name = "HINT")]
    hint: Option<String>,

    /// Request id to log with, instead of a generated one
    #[arg(long, value_name = "ID")]
    request_id: Option<String>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config).with_context(|| {
        format!(
            "failed to load configuration from '{}'",
            cli.config.display()
        )
    })?;

    // CLI overrides config
    let log_level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.global.log_level);
    init_logging(log_level, &config.global.log_format);

    if cli.validate {
        info!("Configuration is valid");
        print_summary(&config);
        return Ok(());
    }

    let (Some(service), Some(uri)) = (cli.service, cli.uri) else {
        bail!("--service and --uri are required unless --validate is given");
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let mut context = RequestContext::new();
    if let Some(id) = cli.request_id {
        context = context.with_request_id(id);
    }
    if let Some(hint) = cli.hint {
        context = context.with_hint(hint);
    }

    let routed = runtime.block_on(route(&config, &service, &uri, &context))?;
    println!("{}", routed);
    Ok(())
}

fn print_summary(config: &Config) {
    println!("Configuration is valid.");
    println!("  Services: {}", config.services.len());
    for service in &config.services {
        println!(
            "    - {} [{:?}] {} instance(s)",
            service.name,
            service.strategy,
            service.instances.len()
        );
        for instance in &service.instances {
            println!("        {}", instance.uri());
        }
    }
}

/// Choose an instance of `service` and rewrite `uri` for it.
async fn route(
    config: &Config,
    service: &str,
    uri: &Url,
    context: &RequestContext,
) -> Result<ReconstructedUri<'static>> {
    let registry = ServiceRegistry::from_config(config);
    debug!(services = ?registry.service_ids(), "registry built");
    let client = LoadBalancerClient::new(registry);

    info!(
        service = service,
        uri = %uri,
        request_id = %context.request_id,
        "routing request"
    );

    match client.choose_and_reconstruct(service, context, uri).await? {
        Some(routed) => Ok(routed),
        None => bail!("no instance available for service '{}'", service),
    }
}
