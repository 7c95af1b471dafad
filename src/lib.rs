//! # modtree - Content-Library Crawler and Call-Graph Reporter
//!
//! This crate crawls the content library of a marketing-cloud service and
//! maps how its templated documents ("modules") call one another. It
//! extracts the embedded query expressions from each document, follows
//! cross-module references recursively, and renders everything into flat
//! notes reports ending with a per-module call tree.
//!
//! ## Features
//!
//! - Token-based session with credential caching and retry-on-expiry
//! - Per-run document cache so repeated visits stay off the network
//! - Depth-bounded recursive crawling with per-document failure containment
//! - Textual extraction of queries, module references, and table lookups
//! - Optional table schema and member resolution for extracted lookups
//! - Folder-wide keyword scans across every document of a folder
//! - Async API with Tokio
//!
//! ## Example
//!
//! ```rust,no_run
//! use modtree::config::Settings;
//! use modtree::crawler::{Crawler, CrawlerConfig};
//! use modtree::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Settings come from Modtree.toml plus MODTREE_* variables
//!     let settings = Settings::load_or_default(None::<&std::path::Path>)?;
//!     let session = Session::new(&settings)?;
//!
//!     let config = CrawlerConfig::builder()
//!         .max_depth(3)
//!         .find_tables(true)
//!         .build();
//!     let crawler = Crawler::new(&session, config);
//!
//!     let records = crawler.crawl("/contentlibrary/modules/welcome.htm").await;
//!     for record in &records {
//!         println!("{}: {} queries", record.module_name, record.queries.len());
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod store;

pub mod api;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod report;
pub mod session;

pub use error::Error;

/// Re-export of the error types for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
