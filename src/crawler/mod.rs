//! Module crawler
//!
//! Recursively visits content-library documents, extracts their query
//! expressions, follows references into called modules up to a bounded
//! depth, and optionally resolves the tables those queries read. The
//! output is a flat record sequence ordered children before parents, which
//! the report writer consumes as-is.

mod config;
mod scan;
mod walk;

pub use config::{CrawlerConfig, CrawlerConfigBuilder};
pub use scan::{FolderMatches, FolderScanner};
pub use walk::Crawler;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::api::TableField;

/// Everything extracted from one visited document
#[derive(Debug, Clone, Serialize)]
pub struct CrawlRecord {
    /// Library path of the visited document
    pub module_name: String,

    /// Extracted query expressions, in order of appearance
    pub queries: Vec<String>,

    /// Raw markup content
    pub content: String,

    /// Resolved paths of the modules this document calls; `None` when
    /// reference following was off, the depth bound was reached, or the
    /// document references nothing
    pub called_modules: Option<Vec<String>>,

    /// Table schemas keyed `TABLE-<table>`; a `None` value records a
    /// lookup whose schema fetch yielded nothing
    pub tables: BTreeMap<String, Option<Vec<TableField>>>,

    /// Table member values keyed `MEMBER-<argValue>`
    pub members: BTreeMap<String, String>,
}
