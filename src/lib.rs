//! Prompt and note manager library
//!
//! This library stores prompts both as markdown documents with a frontmatter
//! header and as a compact metadata index, keeps the two in step, and fills
//! `{{placeholder}}` tokens inside prompt bodies.

mod cli;
mod config;
mod errors;
mod events;
mod filter;
mod frontmatter;
mod helper;
mod index;
mod placeholders;
mod prompt;
mod storage;
mod types;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use events::*;
pub use filter::*;
pub use frontmatter::*;
pub use helper::*;
pub use index::*;
pub use placeholders::*;
pub use prompt::*;
pub use storage::*;
pub use types::*;
