use clap::Parser;
use shelf_scout::{ScrapeError, Scout};

mod args;
use args::{Args, Command};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let mut scout = Scout::new();
    if let Some(path) = &args.config {
        scout = match scout.with_config_file(path) {
            Ok(scout) => scout,
            Err(e) => {
                ::log::error!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        };
    }
    if let Some(url) = &args.webdriver_url {
        scout = scout.with_webdriver_url(url);
    }
    if let Command::Listing {
        max_pages: Some(n), ..
    } = &args.command
    {
        scout = scout.with_max_pages(*n);
    }

    let outcome = run(&scout, args.command).await;
    if let Err(e) = outcome {
        ::log::error!("{}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(scout: &Scout, command: Command) -> Result<(), ScrapeError> {
    match command {
        Command::Listing { query, .. } => {
            let items = scout.fetch_listing(&query).await?;
            print_json(&items);
        }
        Command::Info { urls } if urls.len() == 1 => {
            let info = scout.fetch_product_info(&urls[0]).await?;
            print_json(&info);
        }
        Command::Info { urls } => {
            // Batch shape: failures are reported alongside successes
            // instead of aborting the other targets
            let results = scout.fetch_product_info_many(&urls).await;
            let report: Vec<serde_json::Value> = results
                .into_iter()
                .map(|(url, outcome)| match outcome {
                    Ok(info) => serde_json::json!({ "url": url, "info": info }),
                    Err(e) => serde_json::json!({ "url": url, "error": e.to_string() }),
                })
                .collect();
            print_json(&report);
        }
        Command::Reviews { url } => {
            let reviews = scout.fetch_reviews(&url).await?;
            print_json(&reviews);
        }
        Command::Details { url } => {
            let details = scout.fetch_details(&url).await?;
            print_json(&details);
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => ::log::error!("Failed to serialize result: {}", e),
    }
}
