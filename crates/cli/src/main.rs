use std::path::PathBuf;
use std::sync::Arc;

use api_shared::HealthService;
use clap::{Parser, Subcommand};
use docbridge_core::{
    build_hierarchy, immediate_children_of, pdf::merge_pdfs, timesheet::aggregate_timesheet_file,
    ContentKind, EntityId, FolderNode, ServiceConfig,
};
use graph_client::GraphClient;

#[derive(Parser)]
#[command(name = "docbridge")]
#[command(about = "DocBridge document library CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the CLI is alive
    Health,
    /// Print the library as an indented folder tree
    Folders,
    /// List the immediate subfolders of a folder
    Subfolders {
        /// Entity id of the folder
        id: String,
    },
    /// Aggregate a timesheet CSV export by project and person
    Timesheet {
        /// Path to the CSV file
        csv: PathBuf,
    },
    /// Append the pages of one PDF to another
    MergePdf {
        /// PDF whose pages come first
        first: PathBuf,
        /// PDF whose pages are appended
        second: PathBuf,
        /// Output path
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Health) => {
            let res = HealthService::check_health();
            println!("{}", res.message);
        }
        Some(Commands::Folders) => {
            let client = graph_client_from_env()?;
            match client.list_items().await {
                Ok(items) => {
                    let forest = build_hierarchy(&items);
                    if forest.is_empty() {
                        println!("No items found.");
                    } else {
                        print!("{}", render_tree(&forest));
                    }
                }
                Err(e) => eprintln!("Error listing folders: {}", e),
            }
        }
        Some(Commands::Subfolders { id }) => {
            let client = graph_client_from_env()?;
            match client.list_items().await {
                Ok(items) => {
                    match immediate_children_of(
                        &items,
                        &EntityId::new(id.as_str()),
                        Some(&ContentKind::Folder),
                    ) {
                        Ok(listing) => {
                            println!(
                                "{} (parent: {})",
                                listing.name.as_deref().unwrap_or("<unnamed>"),
                                listing.parent_name.as_deref().unwrap_or("-")
                            );
                            for child in listing.children {
                                println!(
                                    "  {}  {}",
                                    child.id,
                                    child.name.as_deref().unwrap_or("<unnamed>")
                                );
                            }
                        }
                        Err(e) => eprintln!("Error listing subfolders: {}", e),
                    }
                }
                Err(e) => eprintln!("Error listing subfolders: {}", e),
            }
        }
        Some(Commands::Timesheet { csv }) => {
            match aggregate_timesheet_file(&csv).and_then(|summary| summary.to_csv()) {
                Ok(rendered) => print!("{}", rendered),
                Err(e) => eprintln!("Error aggregating timesheet: {}", e),
            }
        }
        Some(Commands::MergePdf {
            first,
            second,
            output,
        }) => {
            let first_bytes = std::fs::read(&first)?;
            let second_bytes = std::fs::read(&second)?;
            match merge_pdfs(&first_bytes, &second_bytes) {
                Ok(merged) => {
                    std::fs::write(&output, merged)?;
                    println!("Wrote merged PDF to {}", output.display());
                }
                Err(e) => eprintln!("Error merging PDFs: {}", e),
            }
        }
        None => {
            println!("Use --help for usage information.");
        }
    }

    Ok(())
}

fn graph_client_from_env() -> Result<GraphClient, Box<dyn std::error::Error>> {
    let cfg = ServiceConfig::from_env_values(|key| std::env::var(key).ok())?;
    Ok(GraphClient::new(Arc::new(cfg)))
}

/// One line per node, indented two spaces per level, as `name [id]`.
fn render_tree(forest: &[FolderNode<'_>]) -> String {
    let mut out = String::new();
    let mut stack: Vec<(&FolderNode<'_>, usize)> =
        forest.iter().rev().map(|node| (node, 0)).collect();
    while let Some((node, depth)) = stack.pop() {
        out.push_str(&format!(
            "{:indent$}{} [{}]\n",
            "",
            node.name.as_deref().unwrap_or("<unnamed>"),
            node.id,
            indent = depth * 2
        ));
        stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }
    out
}
