//! Recursive module traversal

use std::collections::BTreeMap;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, info, instrument, warn};

use crate::crawler::{CrawlRecord, CrawlerConfig};
use crate::extract::{
    TableReference, extract_module_references, extract_queries, extract_table_references,
    resolve_module_path,
};
use crate::session::Session;

/// Depth assigned to the starting module of a crawl
const INITIAL_DEPTH: u32 = 1;

/// Recursive crawler over the content library.
///
/// Visits are depth-first and a module's record is appended after the
/// records of every module it calls, so children appear before their
/// parents in the output. There is no cycle detection beyond the depth
/// bound: a self-referential module is visited again at every depth level
/// until the bound, with the session's document cache keeping the repeat
/// fetches off the network.
pub struct Crawler<'a> {
    session: &'a Session,
    config: CrawlerConfig,
}

impl<'a> Crawler<'a> {
    /// Create a crawler running against the given session
    pub fn new(session: &'a Session, config: CrawlerConfig) -> Self {
        Self { session, config }
    }

    /// Crawl one starting module and return the record sequence for its
    /// call subtree. Fetch failures are contained per document: a failed
    /// or contentless document contributes no record and the crawl moves
    /// on.
    #[instrument(skip(self), level = "debug")]
    pub async fn crawl(&self, module_path: &str) -> Vec<CrawlRecord> {
        self.visit(module_path.to_string(), INITIAL_DEPTH).await
    }

    fn visit(&self, module_path: String, depth: u32) -> BoxFuture<'_, Vec<CrawlRecord>> {
        async move {
            debug!("Visiting {} at depth {}", module_path, depth);
            let mut records = Vec::new();

            let content = match self.session.document(&module_path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Request for {} failed, continuing: {}", module_path, e);
                    None
                }
            };
            let Some(content) = content.filter(|c| !c.is_empty()) else {
                info!("No content found for module {}", module_path);
                return records;
            };

            let mut called_modules = None;
            if self.config.follow_references && depth != self.config.max_depth {
                if let Some(references) = extract_module_references(&content) {
                    if !references.is_empty() {
                        let paths: Vec<String> = references
                            .iter()
                            .map(|reference| resolve_module_path(reference))
                            .collect();
                        debug!("{} calls {} modules", module_path, paths.len());
                        for path in &paths {
                            let child_records = self.visit(path.clone(), depth + 1).await;
                            records.extend(child_records);
                        }
                        called_modules = Some(paths);
                    }
                }
            }

            let mut record = CrawlRecord {
                module_name: module_path,
                queries: extract_queries(&content),
                content,
                called_modules,
                tables: BTreeMap::new(),
                members: BTreeMap::new(),
            };
            if self.config.find_tables {
                self.lookup_tables(&mut record).await;
            }
            records.push(record);
            records
        }
        .boxed()
    }

    /// Resolve every table read by the record's queries. Failures are
    /// contained per lookup step: a failed schema fetch still records the
    /// table, and a failed member fetch is skipped.
    async fn lookup_tables(&self, record: &mut CrawlRecord) {
        let references: Vec<TableReference> = record
            .queries
            .iter()
            .flat_map(|query| extract_table_references(query))
            .collect();

        for reference in references {
            debug!(
                "Resolving table {} for {}",
                reference.table_name, record.module_name
            );
            let schema = match self
                .session
                .table_schema(&reference.folder_name, &reference.table_name)
                .await
            {
                Ok(fields) => Some(fields),
                Err(e) => {
                    warn!(
                        "Schema lookup for table {} failed, continuing: {}",
                        reference.table_name, e
                    );
                    None
                }
            };
            record
                .tables
                .insert(format!("TABLE-{}", reference.table_name), schema);

            let (Some(_), Some(arg_value)) = (&reference.arg_name, &reference.arg_value) else {
                continue;
            };
            match self.session.table_member(&reference.table_name).await {
                Ok(Some(member)) if !member.is_empty() => {
                    record.members.insert(format!("MEMBER-{}", arg_value), member);
                }
                Ok(_) => debug!("No member value found for table {}", reference.table_name),
                Err(e) => warn!(
                    "Member lookup for table {} failed, continuing: {}",
                    reference.table_name, e
                ),
            }
        }
    }
}
