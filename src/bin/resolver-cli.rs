use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use servlet_resolver::config::load_config;
use servlet_resolver::descriptor::FilterScope;
use servlet_resolver::registry::{BindingRegistry, RegistrationReport};
use servlet_resolver::request::RequestDescriptor;
use servlet_resolver::routing::{MatchResult, ServletBinding};

#[derive(Parser)]
#[command(name = "resolver-cli")]
#[command(about = "Inspect servlet and filter resolution for a configuration", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "resolver.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and report registrations
    Check,
    /// Show the servlet selected for a request
    Resolve(RequestArgs),
    /// Show the filter chain for a request
    Filters(RequestArgs),
}

#[derive(Args)]
struct RequestArgs {
    /// URL path, e.g. /content/page.print.html/suffix
    url_path: String,

    #[arg(short, long, default_value = "GET")]
    method: String,

    #[arg(short = 't', long, default_value = "")]
    resource_type: String,

    #[arg(short, long, default_value = "REQUEST")]
    scope: FilterScope,
}

impl RequestArgs {
    fn descriptor(&self) -> RequestDescriptor {
        RequestDescriptor::parse(&self.url_path, self.resource_type.clone())
            .with_method(self.method.clone())
            .with_scope(self.scope)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Keep stdout for JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli.config)?;
    let (registry, report) = BindingRegistry::from_config(&config);
    let snapshot = registry.snapshot();

    let output = match &cli.command {
        Commands::Check => report_json(&report),
        Commands::Resolve(args) => {
            let request = args.descriptor();
            match snapshot.resolve(&request) {
                MatchResult::Matched(m) => {
                    let kind = match m.route.binding {
                        ServletBinding::Path(_) => "path",
                        ServletBinding::ResourceType(_) => "resource_type",
                    };
                    json!({
                        "request": request,
                        "servlet": m.route.name(),
                        "id": m.route.id,
                        "kind": kind,
                        "matched_resource_type": m.matched_resource_type,
                        "matched_selectors": m.matched_selectors,
                        "depth": m.depth,
                    })
                }
                MatchResult::NoMatch => json!({ "request": request, "servlet": null }),
            }
        }
        Commands::Filters(args) => {
            let request = args.descriptor();
            let chain: Vec<Value> = snapshot
                .filter_chain(&request)
                .into_iter()
                .map(|filter| json!({ "name": filter.name(), "id": filter.id, "rank": filter.rank() }))
                .collect();
            json!({ "request": request, "filters": chain })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    if matches!(cli.command, Commands::Check) && !report.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}

fn report_json(report: &RegistrationReport) -> Value {
    let rejected: Vec<Value> = report
        .rejected
        .iter()
        .map(|r| json!({ "binding": r.label, "error": r.error.to_string() }))
        .collect();
    json!({
        "accepted": report.accepted,
        "rejected": rejected,
    })
}
