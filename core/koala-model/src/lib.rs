//! Cross-linked annotation graph over the words of a sentence.
//!
//! A [`Sentence`] owns its words and every annotation layer built over them:
//! phrase tree, dependency edges, role edges, entities and coreference groups.
//! Objects point back at each other through write-once references that are
//! wired while the graph is built and never change afterwards.

pub mod edge;
pub mod entity;
pub mod error;
pub mod graph;
pub mod list;
pub mod morpheme;
pub mod once;
mod reconstruct;
pub mod sentence;
pub mod tree;
pub mod word;

pub use edge::{DagEdge, DepEdge, RoleEdge};
pub use entity::{CoreferenceGroup, Entity};
pub use error::{ModelError, Result};
pub use graph::WordGraph;
pub use list::ImmutableList;
pub use morpheme::Morpheme;
pub use sentence::Sentence;
pub use tree::{SyntaxTree, Tree};
pub use word::Word;

pub use koala_protocol as protocol;
