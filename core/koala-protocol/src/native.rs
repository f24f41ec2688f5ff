//! Wire schema for analyzer output.
//!
//! Analyzers hand back plain data: tags travel as their canonical names and every
//! cross reference is a 0-based position into the sentence's own word list (or
//! into the tree's node list). The model crate re-derives object identity from
//! these positions; nothing here carries identity of its own.

use alloc::string::String;
use alloc::vec::Vec;

use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct NativeMorpheme {
    pub surface: String,
    pub tag: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub original_tag: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub word_sense: Option<u32>,
}

impl NativeMorpheme {
    pub fn new(surface: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            tag: tag.into(),
            original_tag: None,
            word_sense: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct NativeWord {
    pub surface: String,
    pub morphemes: Vec<NativeMorpheme>,
}

/// One node of a phrase tree. `terminal` indexes the sentence's words,
/// `children` index [`NativeTree::nodes`].
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct NativeTreeNode {
    pub label: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub terminal: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<u32>,
}

/// Phrase tree stored as a flat node arena.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct NativeTree {
    pub root: u32,
    pub nodes: Vec<NativeTreeNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct NativeDepEdge {
    /// Absent for the edge attaching the root word.
    pub governor: Option<u32>,
    pub dependent: u32,
    pub phrase_type: String,
    pub dep_type: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub original_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct NativeRoleEdge {
    pub predicate: Option<u32>,
    pub argument: u32,
    pub label: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifiers: Vec<u32>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub original_label: Option<String>,
}

/// Position of a morpheme: word index, then index within that word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct NativeMorphemeRef {
    pub word: u32,
    pub morpheme: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct NativeEntity {
    pub surface: String,
    pub label: String,
    pub fine_label: String,
    pub morphemes: Vec<NativeMorphemeRef>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub original_label: Option<String>,
}

/// Coreference entries are matched against the sentence's entities by value,
/// not by position.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct NativeCorefGroup {
    pub entities: Vec<NativeEntity>,
}

/// Everything one analyzer pass produced for a sentence. Annotation layers the
/// analyzer did not run are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct NativeSentence {
    pub words: Vec<NativeWord>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub tree: Option<NativeTree>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub dependencies: Option<Vec<NativeDepEdge>>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub roles: Option<Vec<NativeRoleEdge>>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub entities: Option<Vec<NativeEntity>>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub coref_groups: Option<Vec<NativeCorefGroup>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct NativeDocument {
    pub sentences: Vec<NativeSentence>,
}
