//! # Taskfiles File Processor Library
//!
//! Run-once batch job that renames every unprocessed blob in the files
//! container and points its metadata row at the new key.
//!
//! ## Modules
//!
//! - `config`: Environment configuration
//! - `catalog`: Metadata rows the processor rewrites
//! - `processor`: The processing pass itself
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use taskfiles_processor::{catalog::MemoryCatalog, processor::FileProcessor};
//! use taskfiles_shared::storage::memory::MemoryBlobStore;
//!
//! # async fn example() -> Result<(), taskfiles_processor::processor::ProcessorError> {
//! let blobs = Arc::new(MemoryBlobStore::new("files"));
//! let catalog = Arc::new(MemoryCatalog::default());
//!
//! let summary = FileProcessor::new(blobs, catalog, "-processed").run().await?;
//! println!("processed {}, skipped {}", summary.processed, summary.skipped);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod processor;
