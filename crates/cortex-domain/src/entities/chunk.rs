//! Chunk entity
//!
//! A chunk is a titled, embedded text unit belonging to one file. Chunk ids
//! are stable across runs so re-indexing an unchanged file produces the same
//! row identities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The tier a chunk was produced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkType {
    /// Symbol overview of a code file
    Symbols,
    /// Verbatim definitions of a code file
    Definitions,
    /// Constants and variables of a code file
    Data,
    /// A window of a prose document
    Doc,
}

impl ChunkType {
    /// Stable string tag used in chunk ids and the store
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkType::Symbols => "symbols",
            ChunkType::Definitions => "definitions",
            ChunkType::Data => "data",
            ChunkType::Doc => "doc",
        }
    }

    /// Parse the stable string tag back into a chunk type
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "symbols" => Ok(ChunkType::Symbols),
            "definitions" => Ok(ChunkType::Definitions),
            "data" => Ok(ChunkType::Data),
            "doc" => Ok(ChunkType::Doc),
            other => Err(Error::invalid_argument(format!(
                "unknown chunk type: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for ChunkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One indexable unit belonging to one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable id derived from (file_path, chunk_type, ordinal)
    pub id: String,
    /// Relative slash-normalized path of the owning file
    pub file_path: String,
    /// Tier this chunk renders
    pub chunk_type: ChunkType,
    /// Human-readable title
    pub title: String,
    /// Payload fed to the embedder
    pub text: String,
    /// First line covered, 1-indexed
    pub start_line: u32,
    /// Last line covered, inclusive
    pub end_line: u32,
    /// Embedding vector of the store's fixed dimensionality
    pub embedding: Vec<f32>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
    /// Last write time
    pub updated_at: DateTime<Utc>,
}

impl Chunk {
    /// Validate the line-range and embedding-dimension invariants
    pub fn validate(&self, dimension: usize) -> Result<()> {
        if self.start_line < 1 || self.end_line < self.start_line {
            return Err(Error::invalid_argument(format!(
                "chunk {} has invalid line range {}..{}",
                self.id, self.start_line, self.end_line
            )));
        }
        if self.embedding.len() != dimension {
            return Err(Error::invalid_argument(format!(
                "chunk {} embedding has length {}, expected {}",
                self.id,
                self.embedding.len(),
                dimension
            )));
        }
        Ok(())
    }
}
