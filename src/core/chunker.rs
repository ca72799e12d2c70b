// src/core/chunker.rs
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

use super::parser::FunctionRecord;

/// Groups consecutive functions into chunks bounded by summed line span
pub struct Chunker;

/// A size-bounded run of consecutive functions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequential index, starting at 0. Deserializes from `3` or `"chunk_3"`.
    #[serde(default, deserialize_with = "chunk_id_from_index_or_label")]
    pub id: usize,
    /// Functions in source order
    pub functions: Vec<FunctionRecord>,
    /// Sum of the functions' line spans
    #[serde(default)]
    pub size: usize,
}

impl Chunk {
    /// Display label used in reports (`chunk_0`, `chunk_1`, ...)
    pub fn label(&self) -> String {
        format!("chunk_{}", self.id)
    }
}

/// Accept a bare index or a `chunk_N` label; an unnumbered label maps to 0
fn chunk_id_from_index_or_label<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Index(usize),
        Label(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Index(id) => id,
        RawId::Label(label) => label
            .rsplit('_')
            .next()
            .and_then(|suffix| suffix.parse().ok())
            .unwrap_or(0),
    })
}

/// Result of chunking one source text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkedSource {
    pub chunks: Vec<Chunk>,
    #[serde(default)]
    pub total_chunks: usize,
    #[serde(default)]
    pub total_functions: usize,
    #[serde(default)]
    pub total_lines: usize,
    /// SHA-256 of the analyzed text
    #[serde(default)]
    pub content_hash: String,
}

impl ChunkedSource {
    /// Functions across all chunks, in source order
    pub fn functions(&self) -> impl Iterator<Item = &FunctionRecord> {
        self.chunks.iter().flat_map(|chunk| chunk.functions.iter())
    }
}

impl Chunker {
    pub fn new() -> Self {
        Self
    }

    /// Greedy single pass: a function that would push the running size past
    /// `max_chunk_size` starts a new chunk, unless the current one is empty.
    /// An oversized function therefore ends up alone in its own chunk.
    pub fn chunk(&self, functions: Vec<FunctionRecord>, max_chunk_size: usize) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current: Vec<FunctionRecord> = Vec::new();
        let mut current_size = 0;

        for function in functions {
            let function_size = function.line_span();

            if current_size + function_size > max_chunk_size && !current.is_empty() {
                chunks.push(Chunk {
                    id: chunks.len(),
                    functions: std::mem::take(&mut current),
                    size: current_size,
                });
                current_size = 0;
            }

            current_size += function_size;
            current.push(function);
        }

        if !current.is_empty() {
            chunks.push(Chunk {
                id: chunks.len(),
                functions: current,
                size: current_size,
            });
        }

        chunks
    }

    /// Chunk extracted functions and attach whole-file statistics
    pub fn chunk_source(&self, source: &str, functions: Vec<FunctionRecord>, max_chunk_size: usize) -> ChunkedSource {
        let total_functions = functions.len();
        let chunks = self.chunk(functions, max_chunk_size);

        ChunkedSource {
            total_chunks: chunks.len(),
            chunks,
            total_functions,
            total_lines: source.split('\n').count(),
            content_hash: Self::calculate_hash(source),
        }
    }

    /// Calculate SHA256 hash of content
    fn calculate_hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new()
    }
}
