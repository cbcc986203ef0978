use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shelf-scout")]
#[command(about = "Extracts listings, prices, reviews and details from dynamic storefront pages")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// WebDriver URL (WEBDRIVER_URL environment variable also works)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Path to a JSON config file with selectors and timeouts
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search the listing grid and collect results across pages
    Listing {
        /// Search query; spaces are allowed
        query: String,

        /// Ceiling on result pages to visit
        #[arg(short, long)]
        max_pages: Option<usize>,
    },

    /// Scrape title and price from one or more product pages
    Info {
        /// Product page URLs; each gets its own independent session
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Scrape all user reviews from a product page
    Reviews {
        /// Product page URL
        url: String,
    },

    /// Scrape the detail view of a product page
    Details {
        /// Product page URL
        url: String,
    },
}
