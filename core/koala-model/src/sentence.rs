use std::fmt;
use std::rc::Rc;

use crate::edge::{DagEdge, DepEdge, RoleEdge};
use crate::entity::{CoreferenceGroup, Entity};
use crate::error::{ModelError, Result};
use crate::list::ImmutableList;
use crate::morpheme::Morpheme;
use crate::tree::{SyntaxTree, Tree};
use crate::word::Word;

/// Words of one sentence plus the annotation layers built over them.
///
/// Each layer is set at most once. An empty layer counts as unset, so a
/// sentence built without some analysis stage can still receive it later.
#[derive(Default)]
pub struct Sentence {
    words: ImmutableList<Rc<Word>>,
    syntax_tree: Option<Rc<SyntaxTree>>,
    dependencies: ImmutableList<Rc<DepEdge>>,
    roles: ImmutableList<Rc<RoleEdge>>,
    entities: ImmutableList<Rc<Entity>>,
    coref_groups: ImmutableList<Rc<CoreferenceGroup>>,
}

impl Sentence {
    /// Numbers the words by position. A word can only sit at one position of
    /// one sentence.
    pub fn new(words: Vec<Rc<Word>>) -> Result<Self> {
        for (position, word) in words.iter().enumerate() {
            word.ensure_id(position)?;
        }
        for (position, word) in words.iter().enumerate() {
            word.set_id(position)?;
        }

        Ok(Self {
            words: words.into(),
            ..Self::default()
        })
    }

    pub fn words(&self) -> &ImmutableList<Rc<Word>> {
        &self.words
    }

    pub fn word(&self, index: usize) -> Option<&Rc<Word>> {
        self.words.get(index)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rc<Word>> {
        self.words.iter()
    }

    pub fn syntax_tree(&self) -> Option<&Rc<SyntaxTree>> {
        self.syntax_tree.as_ref()
    }

    pub fn dependencies(&self) -> &ImmutableList<Rc<DepEdge>> {
        &self.dependencies
    }

    pub fn roles(&self) -> &ImmutableList<Rc<RoleEdge>> {
        &self.roles
    }

    pub fn entities(&self) -> &ImmutableList<Rc<Entity>> {
        &self.entities
    }

    pub fn coref_groups(&self) -> &ImmutableList<Rc<CoreferenceGroup>> {
        &self.coref_groups
    }

    pub fn set_syntax_tree(&mut self, tree: Rc<SyntaxTree>) -> Result<()> {
        if let Some(old) = &self.syntax_tree {
            if Rc::ptr_eq(old, &tree) {
                return Ok(());
            }
            return Err(ModelError::WriteOnce {
                field: "Sentence.syntax_tree",
                old: old.to_string(),
                new: tree.to_string(),
            });
        }
        for word in tree.terminals() {
            self.ensure_owned(&word)?;
        }

        tracing::trace!(root = %tree, "attached syntax tree");
        self.syntax_tree = Some(tree);
        Ok(())
    }

    pub fn set_dependencies(&mut self, edges: Vec<Rc<DepEdge>>) -> Result<()> {
        for edge in &edges {
            self.ensure_edge_owned(edge.as_ref())?;
        }
        assign_layer("Sentence.dependencies", &mut self.dependencies, edges)
    }

    pub fn set_roles(&mut self, edges: Vec<Rc<RoleEdge>>) -> Result<()> {
        for edge in &edges {
            self.ensure_edge_owned(edge.as_ref())?;
            for modifier in edge.modifiers().iter() {
                self.ensure_owned(modifier)?;
            }
        }
        assign_layer("Sentence.roles", &mut self.roles, edges)
    }

    pub fn set_entities(&mut self, entities: Vec<Rc<Entity>>) -> Result<()> {
        for entity in &entities {
            for morpheme in entity.morphemes().iter() {
                let owned = morpheme
                    .word()
                    .map(|word| self.words.includes(&word))
                    .unwrap_or(false);
                if !owned {
                    return Err(ModelError::Unresolved {
                        kind: "morpheme",
                        reference: format!("{} of {} is outside this sentence", morpheme, entity),
                    });
                }
            }
        }
        assign_layer("Sentence.entities", &mut self.entities, entities)
    }

    pub fn set_coref_groups(&mut self, groups: Vec<Rc<CoreferenceGroup>>) -> Result<()> {
        for group in &groups {
            for entity in group.entities().iter() {
                if !self.entities.includes(entity) {
                    return Err(ModelError::Unresolved {
                        kind: "entity",
                        reference: format!("{} is not an entity of this sentence", entity),
                    });
                }
            }
        }
        assign_layer("Sentence.coref_groups", &mut self.coref_groups, groups)
    }

    /// Words read as nouns once derivational affixes are taken into account.
    pub fn nouns(&self) -> Vec<Rc<Word>> {
        self.select_words(
            |m| m.is_noun() || m.has_tag_one_of(&["ETN", "XSN"]),
            |m| m.has_tag_one_of(&["XSV", "XSA", "XSM"]),
        )
    }

    pub fn verbs(&self) -> Vec<Rc<Word>> {
        self.select_words(
            |m| m.is_predicate() || m.has_tag("XSV"),
            |m| m.has_tag_one_of(&["ETN", "ETM", "XSN", "XSA", "XSM"]),
        )
    }

    /// Note the predicate test in the inclusion rule: plain verbs count as
    /// modifiers too. Kept for compatibility with existing consumers.
    pub fn modifiers(&self) -> Vec<Rc<Word>> {
        self.select_words(
            |m| m.is_predicate() || m.has_tag_one_of(&["ETM", "XSA", "XSM"]),
            |m| m.has_tag_one_of(&["ETN", "XSN", "XSV"]),
        )
    }

    /// The rightmost relevant affix wins: a word is selected when its first
    /// including morpheme comes after its last excluding one.
    fn select_words(
        &self,
        include: impl Fn(&Morpheme) -> bool,
        exclude: impl Fn(&Morpheme) -> bool,
    ) -> Vec<Rc<Word>> {
        self.words
            .iter()
            .filter(|word| {
                let inclusion = word.morphemes().find_index(|m| include(m));
                let exclusion = word.morphemes().find_last_index(|m| exclude(m));
                match (inclusion, exclusion) {
                    (Some(first), Some(last)) => first > last,
                    (Some(_), None) => true,
                    (None, _) => false,
                }
            })
            .cloned()
            .collect()
    }

    pub fn surface_string(&self, delimiter: &str) -> String {
        self.words.map(|w| w.surface().to_string()).join(delimiter)
    }

    /// `나/NP+는/JX 밥/NNG+을/JKO 먹/VV+었/EP+다/EF`
    pub fn single_line_string(&self) -> String {
        self.words.map(|w| w.single_line_string()).join(" ")
    }

    fn ensure_owned(&self, word: &Rc<Word>) -> Result<()> {
        if self.words.includes(word) {
            Ok(())
        } else {
            Err(ModelError::Unresolved {
                kind: "word",
                reference: format!("'{}' is not a word of this sentence", word),
            })
        }
    }

    fn ensure_edge_owned(&self, edge: &impl DagEdge) -> Result<()> {
        if let Some(src) = edge.src() {
            self.ensure_owned(src)?;
        }
        self.ensure_owned(edge.dest())
    }
}

fn assign_layer<T: fmt::Display>(
    field: &'static str,
    slot: &mut ImmutableList<Rc<T>>,
    items: Vec<Rc<T>>,
) -> Result<()> {
    if slot.is_empty() {
        tracing::trace!(field, count = items.len(), "attached annotation layer");
        *slot = items.into();
        return Ok(());
    }
    if slot.same_items(&items) {
        return Ok(());
    }

    let render = |items: &[Rc<T>]| {
        let names: Vec<String> = items.iter().map(|item| item.to_string()).collect();
        format!("[{}]", names.join(", "))
    };
    Err(ModelError::WriteOnce {
        field,
        old: render(&**slot),
        new: render(&items),
    })
}

/// Value equality over the words and every annotation layer.
impl PartialEq for Sentence {
    fn eq(&self, other: &Self) -> bool {
        self.words == other.words
            && self.syntax_tree == other.syntax_tree
            && self.dependencies == other.dependencies
            && self.roles == other.roles
            && self.entities == other.entities
            && self.coref_groups == other.coref_groups
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.surface_string(" "))
    }
}

impl fmt::Debug for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sentence")
            .field("words", &self.words)
            .field("syntax_tree", &self.syntax_tree)
            .field("dependencies", &self.dependencies)
            .field("roles", &self.roles)
            .field("entities", &self.entities)
            .field("coref_groups", &self.coref_groups)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use koala_protocol::{DependencyTag, PhraseTag, PosTag};

    fn word(surface: &str, parts: &[(&str, PosTag)]) -> Rc<Word> {
        let morphemes = parts
            .iter()
            .map(|(s, t)| Morpheme::new(*s, *t).unwrap())
            .collect();
        Word::new(surface, morphemes).unwrap()
    }

    fn clause() -> Sentence {
        Sentence::new(vec![
            word("나는", &[("나", PosTag::NP), ("는", PosTag::JX)]),
            word("밥을", &[("밥", PosTag::NNG), ("을", PosTag::JKO)]),
            word("먹었다", &[("먹", PosTag::VV), ("었", PosTag::EP), ("다", PosTag::EF)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_words_are_numbered() {
        let sentence = clause();
        for (i, w) in sentence.iter().enumerate() {
            assert_eq!(w.id(), Some(i));
        }
        assert_eq!(sentence.to_string(), "나는 밥을 먹었다");
        assert_eq!(
            sentence.single_line_string(),
            "나/NP+는/JX 밥/NNG+을/JKO 먹/VV+었/EP+다/EF"
        );
    }

    #[test]
    fn test_word_cannot_move_between_positions() {
        let first = clause();
        let reused = Rc::clone(&first.words()[2]);
        let err = Sentence::new(vec![reused]).unwrap_err();
        assert!(matches!(err, ModelError::WriteOnce { field: "Word.id", .. }));
    }

    #[test]
    fn test_single_clause_dependencies() {
        let mut sentence = clause();
        let w = sentence.words().clone();
        let edges = vec![
            DepEdge::new(Some(Rc::clone(&w[2])), Rc::clone(&w[0]), PhraseTag::NP, Some(DependencyTag::SBJ), None).unwrap(),
            DepEdge::new(Some(Rc::clone(&w[2])), Rc::clone(&w[1]), PhraseTag::NP, Some(DependencyTag::OBJ), None).unwrap(),
        ];
        sentence.set_dependencies(edges).unwrap();

        let verb = &sentence.words()[2];
        assert!(verb.governor_edge().is_none());
        assert_eq!(verb.dependent_edges().len(), 2);
        for edge in sentence.dependencies().iter() {
            assert!(Rc::ptr_eq(&edge.dest().governor_edge().unwrap(), edge));
        }
    }

    #[test]
    fn test_layers_are_append_once() {
        let mut sentence = clause();
        let w = sentence.words().clone();

        // An empty layer can still be replaced
        sentence.set_roles(Vec::new()).unwrap();
        let first = vec![crate::edge::RoleEdge::new(
            Some(Rc::clone(&w[2])),
            Rc::clone(&w[0]),
            koala_protocol::RoleType::ARG0,
            Vec::new(),
            None,
        )];
        sentence.set_roles(first.clone()).unwrap();
        sentence.set_roles(first).unwrap();

        let second = vec![crate::edge::RoleEdge::new(
            Some(Rc::clone(&w[2])),
            Rc::clone(&w[1]),
            koala_protocol::RoleType::ARG1,
            Vec::new(),
            None,
        )];
        let err = sentence.set_roles(second).unwrap_err();
        assert_eq!(
            err,
            ModelError::WriteOnce {
                field: "Sentence.roles",
                old: "[ARG0('먹었다' → '나는')]".to_string(),
                new: "[ARG1('먹었다' → '밥을')]".to_string(),
            }
        );
        assert_eq!(sentence.roles().len(), 1);
    }

    #[test]
    fn test_foreign_words_are_rejected() {
        let mut sentence = clause();
        let stranger = word("그는", &[("그", PosTag::NP)]);
        let edge = DepEdge::new(None, stranger, PhraseTag::NP, None, None).unwrap();

        let err = sentence.set_dependencies(vec![edge]).unwrap_err();
        assert!(matches!(err, ModelError::Unresolved { kind: "word", .. }));
        assert!(sentence.dependencies().is_empty());
    }

    #[test]
    fn test_word_classes() {
        let sentence = Sentence::new(vec![
            word("공부하다", &[("공부", PosTag::NNG), ("하", PosTag::XSV), ("다", PosTag::EF)]),
            word("먹기", &[("먹", PosTag::VV), ("기", PosTag::ETN)]),
            word("예쁜", &[("예쁘", PosTag::VA), ("ㄴ", PosTag::ETM)]),
            word("학생이", &[("학생", PosTag::NNG), ("이", PosTag::JKS)]),
            word("조용히", &[("조용", PosTag::XR), ("히", PosTag::XSM)]),
        ])
        .unwrap();

        let surfaces = |words: Vec<Rc<Word>>| -> Vec<String> {
            words.iter().map(|w| w.surface().to_string()).collect()
        };

        assert_eq!(surfaces(sentence.nouns()), vec!["먹기", "학생이"]);
        assert_eq!(surfaces(sentence.verbs()), vec!["공부하다"]);
        assert_eq!(surfaces(sentence.modifiers()), vec!["예쁜", "조용히"]);
        // Stable across calls
        assert_eq!(surfaces(sentence.nouns()), vec!["먹기", "학생이"]);
    }

    #[test]
    fn test_earliest_inclusion_against_latest_exclusion() {
        // 공부/NNG+하/XSV+기/ETN: the noun stem comes before the verbalizing
        // suffix, the nominalizing ending comes after the last exclusion for
        // verbs, so the word falls in no class.
        let sentence = Sentence::new(vec![word(
            "공부하기",
            &[("공부", PosTag::NNG), ("하", PosTag::XSV), ("기", PosTag::ETN)],
        )])
        .unwrap();

        assert!(sentence.nouns().is_empty());
        assert!(sentence.verbs().is_empty());
        assert!(sentence.modifiers().is_empty());
    }

    #[test]
    fn test_modifier_rule_includes_plain_predicates() {
        // Suspect rule: a finite verb with no adnominal ending still counts as a modifier.
        let sentence = clause();
        let modifiers = sentence.modifiers();
        assert_eq!(modifiers.len(), 1);
        assert_eq!(modifiers[0].surface(), "먹었다");
        assert_eq!(sentence.verbs().len(), 1);
    }
}
