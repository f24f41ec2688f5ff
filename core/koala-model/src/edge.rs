use std::fmt;
use std::rc::Rc;

use koala_protocol::{DependencyTag, PhraseTag, RoleType};

use crate::error::Result;
use crate::list::ImmutableList;
use crate::word::Word;

/// Directed, labelled edge between two words of the same sentence.
///
/// `dest` is always present. An absent `src` marks an edge hanging from the
/// virtual root.
pub trait DagEdge {
    fn src(&self) -> Option<&Rc<Word>>;

    fn dest(&self) -> &Rc<Word>;

    /// Relation name as rendered in the edge's string form.
    fn relation(&self) -> String;

    fn original_label(&self) -> Option<&str>;

    /// Value equality of both endpoints. Two absent sources are equal, one
    /// absent source never equals a present one.
    fn same_endpoints(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        self.src() == other.src() && self.dest() == other.dest()
    }
}

fn write_edge(
    f: &mut fmt::Formatter<'_>,
    relation: &str,
    src: Option<&Rc<Word>>,
    dest: &Word,
) -> fmt::Result {
    let src = src.map(|w| w.surface()).unwrap_or("ROOT");
    write!(f, "{}('{}' → '{}')", relation, src, dest.surface())
}

/// Governor → dependent edge of the dependency structure.
pub struct DepEdge {
    governor: Option<Rc<Word>>,
    dependent: Rc<Word>,
    phrase_type: PhraseTag,
    dep_type: Option<DependencyTag>,
    original_label: Option<String>,
}

impl DepEdge {
    /// Becomes the dependent's governor edge (rejected if it already has a
    /// different one) and joins the governor's dependent edges.
    pub fn new(
        governor: Option<Rc<Word>>,
        dependent: Rc<Word>,
        phrase_type: PhraseTag,
        dep_type: Option<DependencyTag>,
        original_label: Option<String>,
    ) -> Result<Rc<Self>> {
        let relation = dependency_relation(phrase_type, dep_type);
        dependent.governor_slot().ensure_vacant(|| {
            let src = governor.as_ref().map(|w| w.surface()).unwrap_or("ROOT");
            format!("'{}('{}' → '{}')'", relation, src, dependent.surface())
        })?;

        let edge = Rc::new(Self {
            governor,
            dependent,
            phrase_type,
            dep_type,
            original_label,
        });

        edge.dependent.governor_slot().set(Rc::downgrade(&edge))?;
        if let Some(governor) = &edge.governor {
            governor.push_dependent_edge(Rc::downgrade(&edge));
        }

        Ok(edge)
    }

    pub fn governor(&self) -> Option<&Rc<Word>> {
        self.governor.as_ref()
    }

    pub fn dependent(&self) -> &Rc<Word> {
        &self.dependent
    }

    pub fn phrase_type(&self) -> PhraseTag {
        self.phrase_type
    }

    pub fn dep_type(&self) -> Option<DependencyTag> {
        self.dep_type
    }

    /// The dependency function is the edge's label.
    pub fn label(&self) -> Option<DependencyTag> {
        self.dep_type
    }
}

/// The dependency type names the edge; edges without one (the root
/// attachment) fall back to their phrase type.
fn dependency_relation(phrase_type: PhraseTag, dep_type: Option<DependencyTag>) -> String {
    match dep_type {
        Some(dep_type) => dep_type.to_string(),
        None => phrase_type.to_string(),
    }
}

impl DagEdge for DepEdge {
    fn src(&self) -> Option<&Rc<Word>> {
        self.governor.as_ref()
    }

    fn dest(&self) -> &Rc<Word> {
        &self.dependent
    }

    fn relation(&self) -> String {
        dependency_relation(self.phrase_type, self.dep_type)
    }

    fn original_label(&self) -> Option<&str> {
        self.original_label.as_deref()
    }
}

impl PartialEq for DepEdge {
    fn eq(&self, other: &Self) -> bool {
        self.dep_type == other.dep_type
            && self.phrase_type == other.phrase_type
            && self.same_endpoints(other)
    }
}

impl fmt::Display for DepEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_edge(f, &self.relation(), self.src(), &self.dependent)
    }
}

impl fmt::Debug for DepEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DepEdge({})", self)
    }
}

/// Predicate → argument edge of the semantic-role structure.
pub struct RoleEdge {
    predicate: Option<Rc<Word>>,
    argument: Rc<Word>,
    label: RoleType,
    modifiers: ImmutableList<Rc<Word>>,
    original_label: Option<String>,
}

impl RoleEdge {
    /// Joins the argument's predicate roles and, when a predicate is given, the
    /// predicate's argument roles.
    pub fn new(
        predicate: Option<Rc<Word>>,
        argument: Rc<Word>,
        label: RoleType,
        modifiers: Vec<Rc<Word>>,
        original_label: Option<String>,
    ) -> Rc<Self> {
        let edge = Rc::new(Self {
            predicate,
            argument,
            label,
            modifiers: modifiers.into(),
            original_label,
        });

        edge.argument.push_predicate_role(Rc::downgrade(&edge));
        if let Some(predicate) = &edge.predicate {
            predicate.push_argument_role(Rc::downgrade(&edge));
        }

        edge
    }

    pub fn predicate(&self) -> Option<&Rc<Word>> {
        self.predicate.as_ref()
    }

    pub fn argument(&self) -> &Rc<Word> {
        &self.argument
    }

    pub fn label(&self) -> RoleType {
        self.label
    }

    pub fn modifiers(&self) -> &ImmutableList<Rc<Word>> {
        &self.modifiers
    }
}

impl DagEdge for RoleEdge {
    fn src(&self) -> Option<&Rc<Word>> {
        self.predicate.as_ref()
    }

    fn dest(&self) -> &Rc<Word> {
        &self.argument
    }

    fn relation(&self) -> String {
        self.label.to_string()
    }

    fn original_label(&self) -> Option<&str> {
        self.original_label.as_deref()
    }
}

impl PartialEq for RoleEdge {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && self.same_endpoints(other)
    }
}

impl fmt::Display for RoleEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_edge(f, self.label.as_str(), self.src(), &self.argument)?;
        if !self.modifiers.is_empty() {
            let modifiers = self.modifiers.map(|w| w.surface().to_string()).join(" ");
            write!(f, " with '{}'", modifiers)?;
        }
        Ok(())
    }
}

impl fmt::Debug for RoleEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoleEdge({})", self)
    }
}
