use clap::Parser;
use shelfdex::cli::{Cli, Commands};
use shelfdex::commands;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Search {
            pattern,
            limit,
            fields,
            json,
        }) => {
            let result = commands::search(&pattern, &fields, limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", commands::format_result(&pattern, &result));
            }
            Ok(())
        }
        Some(Commands::List) => {
            let documents = commands::list()?;
            if documents.is_empty() {
                println!("No records found.");
            }
            for doc in &documents {
                println!(
                    "- {}: {}",
                    doc.get("id").unwrap_or("?"),
                    doc.get("title").unwrap_or("Untitled")
                );
            }
            Ok(())
        }
        Some(Commands::Get { id }) => {
            let document = commands::get(&id)?;
            print!("{}", commands::format_document(&document));
            Ok(())
        }
        #[cfg(feature = "mcp")]
        Some(Commands::Serve) => tokio::runtime::Runtime::new()?.block_on(shelfdex::mcp::serve()),
        None => {
            Cli::parse_from(["shelfdex", "--help"]);
            Ok(())
        }
    }
}
