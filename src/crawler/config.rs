//! Crawler configuration

/// Configuration for a module crawl
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Maximum recursion depth, counting the starting module as one level
    pub max_depth: u32,

    /// Whether to follow references into called modules
    pub follow_references: bool,

    /// Whether to resolve the tables read by extracted queries
    pub find_tables: bool,

    /// Whether reports should echo raw document content
    pub include_content: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            follow_references: true,
            find_tables: false,
            include_content: true,
        }
    }
}

impl CrawlerConfig {
    /// Create a builder with default values
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }
}

/// Builder for [`CrawlerConfig`]
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the maximum crawl depth
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Set whether to follow references into called modules
    pub fn follow_references(mut self, follow_references: bool) -> Self {
        self.config.follow_references = follow_references;
        self
    }

    /// Set whether to resolve the tables read by extracted queries
    pub fn find_tables(mut self, find_tables: bool) -> Self {
        self.config.find_tables = find_tables;
        self
    }

    /// Set whether reports should echo raw document content
    pub fn include_content(mut self, include_content: bool) -> Self {
        self.config.include_content = include_content;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CrawlerConfig::default();
        assert_eq!(config.max_depth, 10);
        assert!(config.follow_references);
        assert!(!config.find_tables);
        assert!(config.include_content);
    }

    #[test]
    fn test_builder_overrides() {
        let config = CrawlerConfig::builder()
            .max_depth(3)
            .follow_references(false)
            .find_tables(true)
            .include_content(false)
            .build();
        assert_eq!(config.max_depth, 3);
        assert!(!config.follow_references);
        assert!(config.find_tables);
        assert!(!config.include_content);
    }
}
