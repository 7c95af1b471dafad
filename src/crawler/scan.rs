//! Folder-wide keyword scan

use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

use crate::crawler::{Crawler, CrawlerConfig};
use crate::session::Session;

/// Modules of one folder whose queries contain the keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderMatches {
    /// The scanned folder
    pub folder: String,

    /// Paths of the matching modules, in listing order
    pub modules: Vec<String>,
}

/// Scans every document of a set of folders for query expressions
/// containing a keyword. Documents are visited flat: no reference
/// following, no table lookups.
pub struct FolderScanner<'a> {
    session: &'a Session,
    keyword: String,
    folders: Vec<String>,
}

impl<'a> FolderScanner<'a> {
    /// Create a scanner for the given keyword and folders
    pub fn new(session: &'a Session, keyword: impl Into<String>, folders: Vec<String>) -> Self {
        Self {
            session,
            keyword: keyword.into(),
            folders,
        }
    }

    /// Run the scan. Each visited module path is reported through the
    /// optional progress channel. A folder that fails to list is skipped
    /// with a warning and still appears in the outcome, empty.
    #[instrument(skip(self, progress), level = "debug")]
    pub async fn scan(&self, progress: Option<mpsc::Sender<String>>) -> Vec<FolderMatches> {
        let config = CrawlerConfig::builder()
            .follow_references(false)
            .find_tables(false)
            .include_content(false)
            .build();
        let crawler = Crawler::new(self.session, config);

        let mut outcome = Vec::with_capacity(self.folders.len());
        for folder in &self.folders {
            info!("Scanning folder {} for '{}'", folder, self.keyword);
            let modules = match self.session.folder_documents(folder).await {
                Ok(modules) => modules,
                Err(e) => {
                    warn!("Listing folder {} failed, skipping: {}", folder, e);
                    Vec::new()
                }
            };
            if modules.is_empty() {
                info!("No module names found in {}", folder);
            }

            let mut matches = Vec::new();
            for module in modules {
                let records = crawler.crawl(&module).await;
                if let Some(tx) = &progress {
                    let _ = tx.send(module.clone()).await;
                }
                let Some(record) = records.first() else {
                    continue;
                };
                if record.queries.iter().any(|query| query.contains(&self.keyword)) {
                    info!("Keyword match in {}", module);
                    matches.push(module);
                }
            }
            outcome.push(FolderMatches {
                folder: folder.clone(),
                modules: matches,
            });
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::time::Duration;

    use serde_json::json;

    async fn listing_mock(server: &mut mockito::Server, folder: &str, paths: &[&str]) {
        let documents: Vec<_> = paths
            .iter()
            .map(|path| json!({"documentPath": path, "content": null}))
            .collect();
        let endpoint = format!("/rest/api/v1.3/clFolders/{}/items?type=docs", folder);
        server
            .mock("GET", endpoint.as_str())
            .with_status(200)
            .with_body(json!({"documents": documents}).to_string())
            .create_async()
            .await;
    }

    async fn document_mock(server: &mut mockito::Server, path: &str, content: &str) {
        let endpoint = format!("/rest/api/v1.3/clDocs/{}", path.trim_start_matches('/'));
        server
            .mock("GET", endpoint.as_str())
            .with_status(200)
            .with_body(json!({"documentPath": path, "content": content}).to_string())
            .create_async()
            .await;
    }

    #[tokio::test]
    async fn test_scan_reports_modules_whose_queries_match() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/api/v1.3/auth/token")
            .with_status(200)
            .with_body(r#"{"authToken": "tok"}"#)
            .create_async()
            .await;
        listing_mock(
            &mut server,
            "modules",
            &[
                "/contentlibrary/modules/welcome.htm",
                "/contentlibrary/modules/reminder.htm",
            ],
        )
        .await;
        document_mock(
            &mut server,
            "/contentlibrary/modules/welcome.htm",
            "<html>$LOOKUP(WISHLIST_COURSES)</html>",
        )
        .await;
        document_mock(
            &mut server,
            "/contentlibrary/modules/reminder.htm",
            "<html>$LOOKUP(FIRSTNAME)</html>",
        )
        .await;

        let session = Session::with_base_url(
            &server.url(),
            BTreeMap::new(),
            Duration::from_secs(3600),
        );
        let scanner = FolderScanner::new(&session, "WISHLIST", vec!["modules".to_string()]);
        let outcome = scanner.scan(None).await;

        assert_eq!(outcome.len(), 1);
        assert_eq!(outcome[0].folder, "modules");
        assert_eq!(
            outcome[0].modules,
            vec!["/contentlibrary/modules/welcome.htm"]
        );
    }

    #[tokio::test]
    async fn test_scan_reports_progress_per_visited_module() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/api/v1.3/auth/token")
            .with_status(200)
            .with_body(r#"{"authToken": "tok"}"#)
            .create_async()
            .await;
        listing_mock(&mut server, "modules", &["/contentlibrary/modules/one.htm"]).await;
        document_mock(
            &mut server,
            "/contentlibrary/modules/one.htm",
            "<html>$LOOKUP(FIRSTNAME)</html>",
        )
        .await;

        let session = Session::with_base_url(
            &server.url(),
            BTreeMap::new(),
            Duration::from_secs(3600),
        );
        let scanner = FolderScanner::new(&session, "ABSENT", vec!["modules".to_string()]);

        let (tx, mut rx) = mpsc::channel(16);
        let outcome = scanner.scan(Some(tx)).await;

        assert_eq!(rx.recv().await.as_deref(), Some("/contentlibrary/modules/one.htm"));
        assert_eq!(rx.recv().await, None);
        assert!(outcome[0].modules.is_empty());
    }

    #[tokio::test]
    async fn test_unlistable_folder_appears_empty_in_the_outcome() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/api/v1.3/auth/token")
            .with_status(200)
            .with_body(r#"{"authToken": "tok"}"#)
            .create_async()
            .await;
        let endpoint = "/rest/api/v1.3/clFolders/ghost/items?type=docs";
        server
            .mock("GET", endpoint)
            .with_status(404)
            .with_body("no such folder")
            .create_async()
            .await;

        let session = Session::with_base_url(
            &server.url(),
            BTreeMap::new(),
            Duration::from_secs(3600),
        );
        let scanner = FolderScanner::new(&session, "WISHLIST", vec!["ghost".to_string()]);
        let outcome = scanner.scan(None).await;

        assert_eq!(outcome.len(), 1);
        assert_eq!(outcome[0].folder, "ghost");
        assert!(outcome[0].modules.is_empty());
    }
}
