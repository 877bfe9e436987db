use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use years::config::Settings;
use years::voyager::{Voyager, navigation_parser};
use years::waypoint::{FsProvider, HierarchyNode, Waypoint};

fn print_usage() {
    eprintln!(
        r#"years - walk a date-organized directory tree in time order

USAGE:
    years [QUERY]

With no QUERY every dated entry is printed in traversal order. With a
QUERY (a date such as 2024-03-06, an epoch, or an alias such as
yesterday) only the entries dated exactly at that instant are printed.

ENVIRONMENT:
    YEARS_CONFIG     JSON settings file
    YEARS_ROOT       root directory (overrides the file)
    YEARS_LAYOUT     hierarchy layout, e.g. 2006/01/02.txt
    YEARS_LAYOUTS    comma-separated layouts for queries
    RUST_LOG         log filter (default: warn)
"#
    );
}

fn print_node(node: &dyn Waypoint) {
    match node.time() {
        Some(time) => println!("{}  {}", time.format("%Y-%m-%dT%H:%M:%SZ"), node.identifier()),
        None => println!("{:20}  {}", "-", node.identifier()),
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") || args.len() > 1 {
        print_usage();
        return if args.len() > 1 { ExitCode::FAILURE } else { ExitCode::SUCCESS };
    }

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let root = match HierarchyNode::build(&FsProvider, &settings.root, &settings.layout) {
        Ok(root) => root,
        Err(e) => {
            error!(root = %settings.root.display(), error = %e, "cannot read root");
            return ExitCode::FAILURE;
        }
    };
    info!(root = %settings.root.display(), layout = %settings.layout, "hierarchy loaded");

    let parser = navigation_parser(settings.parser.clone());
    let voyager = Voyager::with_parser(Arc::new(root), parser);

    match args.first() {
        Some(query) => {
            let target = match voyager.parser().just_parse(query) {
                Ok(target) => target,
                Err(e) => {
                    error!(query = %query, error = %e, "cannot understand query");
                    return ExitCode::FAILURE;
                }
            };
            for node in voyager.find_at(target) {
                print_node(node);
            }
        }
        None => voyager.traverse(settings.traverse, print_node),
    }

    ExitCode::SUCCESS
}
