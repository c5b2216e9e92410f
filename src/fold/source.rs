//! Comment block extraction
//!
//!     Pulls delimited comment blocks out of source text so a tokenizer can work on them one at
//!     a time. With the default delimiters:
//!
//!         /**
//!          * Adds two numbers.
//!          *
//!          * @param a First operand
//!          */
//!
//!     becomes the block `"Adds two numbers.\n\n@param a First operand"`.
//!
//!     Cleaning a block strips the opening and closing delimiters, then the line marker (plus
//!     any whitespace before it and one space after it) from the start of every line, then trims
//!     the result. Blocks that start with a quote are dropped: they are delimiters that showed up
//!     inside a string literal.

use crate::fold::config::ExtractorConfig;
use crate::fold::error::{Error, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Source text together with the blocks extracted from it
#[derive(Debug, Clone)]
pub struct CommentSource {
    content: String,
    blocks: Vec<String>,
}

impl CommentSource {
    /// Read and extract a file
    pub fn from_path<P: AsRef<Path>>(path: P, config: &ExtractorConfig) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_string(content, config))
    }

    /// Extract blocks from text already in memory
    pub fn from_string<S: Into<String>>(content: S, config: &ExtractorConfig) -> Self {
        let content = content.into();
        let blocks = BlockExtractor::new(config).extract(&content);
        CommentSource { content, blocks }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cleaned blocks, in source order
    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<String> {
        self.blocks
    }
}

/// Compiled patterns for one set of delimiters
#[derive(Debug, Clone)]
pub struct BlockExtractor {
    block: Regex,
    line_marker: Option<Regex>,
    open_len: usize,
    close_len: usize,
}

impl BlockExtractor {
    pub fn new(config: &ExtractorConfig) -> Self {
        let block = format!(
            "(?s){}.*?{}",
            regex::escape(&config.open),
            regex::escape(&config.close)
        );
        let line_marker = (!config.remove.is_empty())
            .then(|| format!(r"(?m)^\s*{} ?", regex::escape(&config.remove)));
        BlockExtractor {
            // Both patterns are built from escaped literals, so they always compile.
            block: Regex::new(&block).expect("escaped delimiters form a valid pattern"),
            line_marker: line_marker
                .map(|marker| Regex::new(&marker).expect("escaped marker forms a valid pattern")),
            open_len: config.open.len(),
            close_len: config.close.len(),
        }
    }

    /// All cleaned blocks of `content`, skipping the ones that open with a quote
    pub fn extract(&self, content: &str) -> Vec<String> {
        let blocks: Vec<String> = self
            .block
            .find_iter(content)
            .map(|found| self.clean(found.as_str()))
            .filter(|block| !block.starts_with(['\'', '"']))
            .collect();
        debug!(count = blocks.len(), "extracted comment blocks");
        blocks
    }

    /// Strip delimiters and line markers from one raw block
    pub fn clean(&self, block: &str) -> String {
        let end = block.len().saturating_sub(self.close_len).max(self.open_len);
        let inner = block.get(self.open_len..end).unwrap_or_default();
        let stripped = match &self.line_marker {
            Some(marker) => marker.replace_all(inner, "").into_owned(),
            None => inner.to_string(),
        };
        stripped.trim().to_string()
    }
}
