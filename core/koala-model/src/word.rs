use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::edge::{DepEdge, RoleEdge};
use crate::entity::Entity;
use crate::error::{ModelError, Result};
use crate::list::ImmutableList;
use crate::morpheme::Morpheme;
use crate::once::{upgrade_all, WriteOnce};
use crate::tree::SyntaxTree;

/// One whitespace-delimited token: an ordered, non-empty run of morphemes.
pub struct Word {
    surface: String,
    morphemes: ImmutableList<Rc<Morpheme>>,
    id: WriteOnce<usize>,
    phrase: WriteOnce<Weak<SyntaxTree>>,
    governor_edge: WriteOnce<Weak<DepEdge>>,
    dependent_edges: RefCell<Vec<Weak<DepEdge>>>,
    argument_roles: RefCell<Vec<Weak<RoleEdge>>>,
    predicate_roles: RefCell<Vec<Weak<RoleEdge>>>,
}

impl Word {
    /// Takes ownership of the morphemes and numbers them 0, 1, 2, ...
    pub fn new(surface: impl Into<String>, morphemes: Vec<Morpheme>) -> Result<Rc<Self>> {
        let surface = surface.into();
        if surface.is_empty() {
            return Err(ModelError::MissingField("Word.surface"));
        }
        if morphemes.is_empty() {
            return Err(ModelError::MissingField("Word.morphemes"));
        }

        let word = Rc::new(Self {
            surface,
            morphemes: morphemes.into_iter().map(Rc::new).collect(),
            id: WriteOnce::new("Word.id"),
            phrase: WriteOnce::new("Word.phrase"),
            governor_edge: WriteOnce::new("Word.governor_edge"),
            dependent_edges: RefCell::new(Vec::new()),
            argument_roles: RefCell::new(Vec::new()),
            predicate_roles: RefCell::new(Vec::new()),
        });

        for (position, morpheme) in word.morphemes.iter().enumerate() {
            morpheme.bind(position, Rc::downgrade(&word))?;
        }

        Ok(word)
    }

    pub fn surface(&self) -> &str {
        &self.surface
    }

    pub fn morphemes(&self) -> &ImmutableList<Rc<Morpheme>> {
        &self.morphemes
    }

    pub fn len(&self) -> usize {
        self.morphemes.len()
    }

    /// Always false: a word has at least one morpheme.
    pub fn is_empty(&self) -> bool {
        self.morphemes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rc<Morpheme>> {
        self.morphemes.iter()
    }

    /// Position in the owning sentence.
    pub fn id(&self) -> Option<usize> {
        self.id.get().copied()
    }

    /// The phrase-tree leaf carrying this word.
    pub fn phrase(&self) -> Option<Rc<SyntaxTree>> {
        self.phrase.upgrade()
    }

    /// The dependency edge pointing at this word, if one was built.
    pub fn governor_edge(&self) -> Option<Rc<DepEdge>> {
        self.governor_edge.upgrade()
    }

    pub fn dependent_edges(&self) -> Vec<Rc<DepEdge>> {
        upgrade_all(&self.dependent_edges.borrow())
    }

    /// Role edges in which this word is the predicate.
    pub fn argument_roles(&self) -> Vec<Rc<RoleEdge>> {
        upgrade_all(&self.argument_roles.borrow())
    }

    /// Role edges in which this word is the argument.
    pub fn predicate_roles(&self) -> Vec<Rc<RoleEdge>> {
        upgrade_all(&self.predicate_roles.borrow())
    }

    /// Entities touching any morpheme of this word, first-seen order, no repeats.
    /// Recomputed on each call.
    pub fn entities(&self) -> Vec<Rc<Entity>> {
        let mut entities: Vec<Rc<Entity>> = Vec::new();
        for morpheme in self.morphemes.iter() {
            for entity in morpheme.entities() {
                if !entities.iter().any(|seen| Rc::ptr_eq(seen, &entity)) {
                    entities.push(entity);
                }
            }
        }
        entities
    }

    /// `나/NP+는/JX`
    pub fn single_line_string(&self) -> String {
        self.morphemes
            .map(|m| format!("{}/{}", m.surface(), m.tag()))
            .join("+")
    }

    pub(crate) fn set_id(&self, id: usize) -> Result<()> {
        self.id.set(id)
    }

    pub(crate) fn ensure_id(&self, id: usize) -> Result<()> {
        match self.id() {
            Some(current) if current != id => Err(ModelError::WriteOnce {
                field: "Word.id",
                old: current.to_string(),
                new: id.to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn phrase_slot(&self) -> &WriteOnce<Weak<SyntaxTree>> {
        &self.phrase
    }

    pub(crate) fn governor_slot(&self) -> &WriteOnce<Weak<DepEdge>> {
        &self.governor_edge
    }

    pub(crate) fn push_dependent_edge(&self, edge: Weak<DepEdge>) {
        self.dependent_edges.borrow_mut().push(edge);
    }

    pub(crate) fn push_argument_role(&self, edge: Weak<RoleEdge>) {
        self.argument_roles.borrow_mut().push(edge);
    }

    pub(crate) fn push_predicate_role(&self, edge: Weak<RoleEdge>) {
        self.predicate_roles.borrow_mut().push(edge);
    }
}

impl<'a> IntoIterator for &'a Word {
    type Item = &'a Rc<Morpheme>;
    type IntoIter = std::slice::Iter<'a, Rc<Morpheme>>;

    fn into_iter(self) -> Self::IntoIter {
        self.morphemes.iter()
    }
}

impl PartialEq for Word {
    fn eq(&self, other: &Self) -> bool {
        self.surface == other.surface && self.morphemes == other.morphemes
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.surface)
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Word")
            .field("id", &self.id())
            .field("surface", &self.surface)
            .field("morphemes", &self.morphemes)
            .finish()
    }
}
