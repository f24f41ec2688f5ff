use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use koala_protocol::PosTag;

use crate::entity::Entity;
use crate::error::{ModelError, Result};
use crate::once::{upgrade_all, WriteOnce};
use crate::word::Word;

/// Smallest tagged unit of a sentence.
///
/// Surface and tag are fixed at construction. Position, owning word and word
/// sense are late-bound back-references; the entity list grows as entity spans
/// covering this morpheme are built.
pub struct Morpheme {
    surface: String,
    tag: PosTag,
    original_tag: Option<String>,
    id: WriteOnce<usize>,
    word: WriteOnce<Weak<Word>>,
    word_sense: WriteOnce<u32>,
    entities: RefCell<Vec<Weak<Entity>>>,
}

impl Morpheme {
    pub fn new(surface: impl Into<String>, tag: PosTag) -> Result<Self> {
        let surface = surface.into();
        if surface.is_empty() {
            return Err(ModelError::MissingField("Morpheme.surface"));
        }

        Ok(Self {
            surface,
            tag,
            original_tag: None,
            id: WriteOnce::new("Morpheme.id"),
            word: WriteOnce::new("Morpheme.word"),
            word_sense: WriteOnce::new("Morpheme.word_sense"),
            entities: RefCell::new(Vec::new()),
        })
    }

    /// Builds a morpheme from a tag name (`"NNG"`), as analyzers report it.
    pub fn with_tag_name(surface: impl Into<String>, tag: &str) -> Result<Self> {
        Self::new(surface, tag.parse::<PosTag>()?)
    }

    /// Attaches the analyzer's own label for this morpheme.
    pub fn with_original_tag(mut self, original_tag: impl Into<String>) -> Self {
        self.original_tag = Some(original_tag.into());
        self
    }

    pub fn surface(&self) -> &str {
        &self.surface
    }

    pub fn tag(&self) -> PosTag {
        self.tag
    }

    pub fn original_tag(&self) -> Option<&str> {
        self.original_tag.as_deref()
    }

    /// Position within the owning word.
    pub fn id(&self) -> Option<usize> {
        self.id.get().copied()
    }

    pub fn word(&self) -> Option<Rc<Word>> {
        self.word.upgrade()
    }

    pub fn word_sense(&self) -> Option<u32> {
        self.word_sense.get().copied()
    }

    pub fn set_word_sense(&self, sense: u32) -> Result<()> {
        self.word_sense.set(sense)
    }

    /// Entities whose span includes this morpheme, in construction order.
    pub fn entities(&self) -> Vec<Rc<Entity>> {
        upgrade_all(&self.entities.borrow())
    }

    pub fn is_noun(&self) -> bool {
        self.tag.is_noun()
    }

    pub fn is_predicate(&self) -> bool {
        self.tag.is_predicate()
    }

    pub fn is_modifier(&self) -> bool {
        self.tag.is_modifier()
    }

    pub fn is_josa(&self) -> bool {
        self.tag.is_josa()
    }

    pub fn is_ending(&self) -> bool {
        self.tag.is_ending()
    }

    pub fn is_affix(&self) -> bool {
        self.tag.is_affix()
    }

    pub fn is_suffix(&self) -> bool {
        self.tag.is_suffix()
    }

    pub fn is_symbol(&self) -> bool {
        self.tag.is_symbol()
    }

    pub fn is_unknown(&self) -> bool {
        self.tag.is_unknown()
    }

    /// Case-sensitive prefix match on the canonical tag name (`"NN"` matches `NNG`).
    pub fn has_tag(&self, prefix: &str) -> bool {
        self.tag.as_str().starts_with(prefix)
    }

    pub fn has_tag_one_of(&self, prefixes: &[&str]) -> bool {
        prefixes.iter().any(|prefix| self.has_tag(prefix))
    }

    /// Case-insensitive prefix match on the analyzer's own label.
    pub fn has_original_tag(&self, prefix: &str) -> bool {
        self.original_tag
            .as_deref()
            .map(|tag| tag.to_uppercase().starts_with(&prefix.to_uppercase()))
            .unwrap_or(false)
    }

    pub fn eq_without_tag(&self, other: &Morpheme) -> bool {
        self.surface == other.surface
    }

    pub(crate) fn bind(&self, id: usize, word: Weak<Word>) -> Result<()> {
        self.id.set(id)?;
        self.word.set(word)
    }

    pub(crate) fn attach_entity(&self, entity: Weak<Entity>) {
        self.entities.borrow_mut().push(entity);
    }
}

/// Surface and tag only; the original label and back-references do not count.
impl PartialEq for Morpheme {
    fn eq(&self, other: &Self) -> bool {
        self.surface == other.surface && self.tag == other.tag
    }
}

impl fmt::Display for Morpheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.original_tag {
            Some(original) => write!(f, "{}/{}({})", self.surface, self.tag, original),
            None => write!(f, "{}/{}", self.surface, self.tag),
        }
    }
}

impl fmt::Debug for Morpheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Morpheme")
            .field("surface", &self.surface)
            .field("tag", &self.tag)
            .field("original_tag", &self.original_tag)
            .field("id", &self.id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tag_queries() {
        let m = Morpheme::new("먹", PosTag::VV).unwrap().with_original_tag("pvg");

        assert!(m.is_predicate());
        assert!(!m.is_noun());
        assert!(m.has_tag("V"));
        assert!(m.has_tag("VV"));
        assert!(!m.has_tag("v"));
        assert!(m.has_tag_one_of(&["NN", "VV"]));
        assert!(m.has_original_tag("PV"));
        assert!(m.has_original_tag("pvg"));
        assert_eq!(m.to_string(), "먹/VV(pvg)");

        let plain = Morpheme::with_tag_name("는", "JX").unwrap();
        assert!(plain.is_josa());
        assert!(!plain.has_original_tag("J"));
        assert_eq!(plain.to_string(), "는/JX");
    }

    #[test]
    fn test_invalid_construction() {
        assert_eq!(
            Morpheme::new("", PosTag::NNG).unwrap_err(),
            ModelError::MissingField("Morpheme.surface")
        );
        assert!(matches!(
            Morpheme::with_tag_name("밥", "NOUN"),
            Err(ModelError::Tag(_))
        ));
    }

    #[test]
    fn test_word_sense_is_write_once() {
        let m = Morpheme::new("배", PosTag::NNG).unwrap();
        assert_eq!(m.word_sense(), None);
        m.set_word_sense(2).unwrap();
        m.set_word_sense(2).unwrap();
        assert!(m.set_word_sense(3).is_err());
        assert_eq!(m.word_sense(), Some(2));
    }

    proptest! {
        #[test]
        fn test_equality_ignores_original_tag(
            surface in "[가-힣]{1,4}",
            left in "[a-z]{0,3}",
            right in "[a-z]{0,3}",
            tag_index in 0usize..PosTag::ALL.len(),
        ) {
            let tag = PosTag::ALL[tag_index];
            let a = Morpheme::new(surface.clone(), tag).unwrap().with_original_tag(left);
            let b = Morpheme::new(surface.clone(), tag).unwrap().with_original_tag(right);
            prop_assert!(a == a);
            prop_assert!(a == b);
            prop_assert!(a.eq_without_tag(&b));

            let other_tag = PosTag::ALL[(tag_index + 1) % PosTag::ALL.len()];
            let c = Morpheme::new(surface, other_tag).unwrap();
            prop_assert!(a != c);
            prop_assert!(a.eq_without_tag(&c));
        }
    }
}
