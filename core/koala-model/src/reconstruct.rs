//! Rebuilding the cross-linked graph from analyzer output, and flattening it
//! back.
//!
//! Analyzer objects carry no identity we can reuse: words, morphemes and tree
//! nodes are joined by position, coreference members by value.

use std::rc::Rc;

use koala_protocol::{
    CoarseEntityType, DependencyTag, NativeCorefGroup, NativeDepEdge, NativeEntity, NativeMorpheme, NativeMorphemeRef,
    NativeRoleEdge, NativeSentence, NativeTree, NativeTreeNode, NativeWord, PhraseTag, RoleType,
};
use tracing::{debug, debug_span, trace};

use crate::edge::{DagEdge, DepEdge, RoleEdge};
use crate::entity::{CoreferenceGroup, Entity};
use crate::error::{ModelError, Result};
use crate::morpheme::Morpheme;
use crate::sentence::Sentence;
use crate::tree::{SyntaxTree, Tree};
use crate::word::Word;

impl Sentence {
    /// Builds the sentence in dependency order: words, phrase tree, edges and
    /// entities, then coreference groups. Any failed lookup aborts the whole
    /// sentence.
    pub fn from_native(native: &NativeSentence) -> Result<Self> {
        let span = debug_span!("reconstruct", words = native.words.len());
        let _guard = span.enter();

        // 1. Words (and their morphemes)
        let words = native
            .words
            .iter()
            .map(build_word)
            .collect::<Result<Vec<_>>>()?;
        let mut sentence = Sentence::new(words)?;

        // 2. Phrase tree
        if let Some(tree) = &native.tree {
            let root = TreeBuilder::new(&sentence, tree).build(tree.root)?;
            debug!(nodes = tree.nodes.len(), "rebuilt phrase tree");
            sentence.set_syntax_tree(root)?;
        }

        // 3. Edges and entities
        if let Some(dependencies) = &native.dependencies {
            let edges = dependencies
                .iter()
                .map(|edge| build_dep_edge(&sentence, edge))
                .collect::<Result<Vec<_>>>()?;
            debug!(count = edges.len(), "rebuilt dependency edges");
            sentence.set_dependencies(edges)?;
        }
        if let Some(roles) = &native.roles {
            let edges = roles
                .iter()
                .map(|edge| build_role_edge(&sentence, edge))
                .collect::<Result<Vec<_>>>()?;
            debug!(count = edges.len(), "rebuilt role edges");
            sentence.set_roles(edges)?;
        }
        if let Some(entities) = &native.entities {
            let entities = entities
                .iter()
                .map(|entity| build_entity(&sentence, entity))
                .collect::<Result<Vec<_>>>()?;
            debug!(count = entities.len(), "rebuilt entities");
            sentence.set_entities(entities)?;
        }

        // 4. Coreference, matched against the entities built above
        if let Some(groups) = &native.coref_groups {
            let groups = groups
                .iter()
                .map(|group| build_coref_group(&sentence, group))
                .collect::<Result<Vec<_>>>()?;
            debug!(count = groups.len(), "rebuilt coreference groups");
            sentence.set_coref_groups(groups)?;
        }

        Ok(sentence)
    }

    /// Flattens the graph into the wire form. Layers with nothing in them are
    /// reported as not analyzed.
    pub fn to_native(&self) -> Result<NativeSentence> {
        let words = self
            .words()
            .iter()
            .map(|word| NativeWord {
                surface: word.surface().to_string(),
                morphemes: word.iter().map(|m| native_morpheme(m)).collect(),
            })
            .collect();

        let tree = match self.syntax_tree() {
            Some(root) => {
                let mut nodes = Vec::new();
                let root = self.flatten_tree(root, &mut nodes)?;
                Some(NativeTree { root, nodes })
            }
            None => None,
        };

        let dependencies = non_empty(
            self.dependencies()
                .iter()
                .map(|edge| {
                    Ok(NativeDepEdge {
                        governor: edge.src().map(|w| self.position_of(w)).transpose()?,
                        dependent: self.position_of(edge.dest())?,
                        phrase_type: edge.phrase_type().to_string(),
                        dep_type: edge.dep_type().map(|tag| tag.to_string()),
                        original_label: edge.original_label().map(str::to_string),
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        );

        let roles = non_empty(
            self.roles()
                .iter()
                .map(|edge| {
                    Ok(NativeRoleEdge {
                        predicate: edge.src().map(|w| self.position_of(w)).transpose()?,
                        argument: self.position_of(edge.dest())?,
                        label: edge.label().to_string(),
                        modifiers: edge
                            .modifiers()
                            .iter()
                            .map(|w| self.position_of(w))
                            .collect::<Result<Vec<_>>>()?,
                        original_label: edge.original_label().map(str::to_string),
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        );

        let entities = non_empty(
            self.entities()
                .iter()
                .map(|entity| self.native_entity(entity))
                .collect::<Result<Vec<_>>>()?,
        );

        let coref_groups = non_empty(
            self.coref_groups()
                .iter()
                .map(|group| {
                    Ok(NativeCorefGroup {
                        entities: group
                            .entities()
                            .iter()
                            .map(|entity| self.native_entity(entity))
                            .collect::<Result<Vec<_>>>()?,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        );

        Ok(NativeSentence {
            words,
            tree,
            dependencies,
            roles,
            entities,
            coref_groups,
        })
    }

    fn resolve_word(&self, index: u32) -> Result<Rc<Word>> {
        self.word(index as usize)
            .cloned()
            .ok_or_else(|| ModelError::Unresolved {
                kind: "word",
                reference: format!("#{} in a sentence of {} words", index, self.len()),
            })
    }

    fn resolve_morpheme(&self, reference: &NativeMorphemeRef) -> Result<Rc<Morpheme>> {
        let word = self.resolve_word(reference.word)?;
        word.morphemes()
            .get(reference.morpheme as usize)
            .cloned()
            .ok_or_else(|| ModelError::Unresolved {
                kind: "morpheme",
                reference: format!("#{} of word '{}'", reference.morpheme, word),
            })
    }

    fn position_of(&self, word: &Rc<Word>) -> Result<u32> {
        self.words()
            .index_of(word)
            .map(|position| position as u32)
            .ok_or_else(|| ModelError::Unresolved {
                kind: "word",
                reference: format!("'{}' is not a word of this sentence", word),
            })
    }

    /// Pre-order flattening: a node's index is smaller than its children's.
    fn flatten_tree(&self, root: &Rc<SyntaxTree>, nodes: &mut Vec<NativeTreeNode>) -> Result<u32> {
        let first = nodes.len();
        let mut stack: Vec<(&Rc<SyntaxTree>, Option<usize>)> = vec![(root, None)];

        while let Some((node, parent)) = stack.pop() {
            let index = nodes.len();
            nodes.push(NativeTreeNode {
                label: node.label().to_string(),
                terminal: node.terminal().map(|w| self.position_of(w)).transpose()?,
                children: Vec::with_capacity(node.children().len()),
            });
            if let Some(parent) = parent {
                nodes[parent].children.push(index as u32);
            }
            for child in node.children().iter().rev() {
                stack.push((child, Some(index)));
            }
        }

        Ok(first as u32)
    }

    fn native_entity(&self, entity: &Entity) -> Result<NativeEntity> {
        let morphemes = entity
            .morphemes()
            .iter()
            .map(|m| {
                let word = m.word().ok_or_else(|| ModelError::Unresolved {
                    kind: "morpheme",
                    reference: format!("{} has no owning word", m),
                })?;
                Ok(NativeMorphemeRef {
                    word: self.position_of(&word)?,
                    morpheme: m.id().unwrap_or_default() as u32,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(NativeEntity {
            surface: entity.surface().to_string(),
            label: entity.label().to_string(),
            fine_label: entity.fine_label().to_string(),
            morphemes,
            original_label: entity.original_label().map(str::to_string),
        })
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn native_morpheme(morpheme: &Morpheme) -> NativeMorpheme {
    NativeMorpheme {
        surface: morpheme.surface().to_string(),
        tag: morpheme.tag().to_string(),
        original_tag: morpheme.original_tag().map(str::to_string),
        word_sense: morpheme.word_sense(),
    }
}

fn build_word(native: &NativeWord) -> Result<Rc<Word>> {
    let morphemes = native
        .morphemes
        .iter()
        .map(|m| {
            let mut morpheme = Morpheme::with_tag_name(m.surface.as_str(), &m.tag)?;
            if let Some(original) = &m.original_tag {
                morpheme = morpheme.with_original_tag(original.as_str());
            }
            if let Some(sense) = m.word_sense {
                morpheme.set_word_sense(sense)?;
            }
            Ok(morpheme)
        })
        .collect::<Result<Vec<_>>>()?;

    trace!(surface = %native.surface, morphemes = morphemes.len(), "word");
    Word::new(native.surface.as_str(), morphemes)
}

/// Post-order rebuild of the node arena with an explicit stack, so arbitrarily
/// deep trees build without recursion. Children exist before their parent.
struct TreeBuilder<'a> {
    sentence: &'a Sentence,
    nodes: &'a [NativeTreeNode],
}

impl<'a> TreeBuilder<'a> {
    fn new(sentence: &'a Sentence, tree: &'a NativeTree) -> Self {
        Self {
            sentence,
            nodes: &tree.nodes,
        }
    }

    fn node(&self, index: u32) -> Result<&'a NativeTreeNode> {
        let nodes = self.nodes;
        nodes.get(index as usize).ok_or_else(|| ModelError::Unresolved {
            kind: "tree node",
            reference: format!("#{} of {} nodes", index, nodes.len()),
        })
    }

    fn build(&self, root: u32) -> Result<Rc<SyntaxTree>> {
        self.node(root)?;
        let mut visited = vec![false; self.nodes.len()];
        let mut built: Vec<Option<Rc<SyntaxTree>>> = vec![None; self.nodes.len()];
        visited[root as usize] = true;

        // (node, children already scheduled)
        let mut stack = vec![(root, false)];
        while let Some((index, expanded)) = stack.pop() {
            let node = self.node(index)?;

            if !expanded {
                stack.push((index, true));
                for &child in node.children.iter().rev() {
                    self.node(child)?;
                    if std::mem::replace(&mut visited[child as usize], true) {
                        return Err(ModelError::Unresolved {
                            kind: "tree node",
                            reference: format!("#{} is reachable more than once", child),
                        });
                    }
                    stack.push((child, false));
                }
                continue;
            }

            let children = node
                .children
                .iter()
                .map(|&child| {
                    built[child as usize].take().ok_or_else(|| ModelError::Unresolved {
                        kind: "tree node",
                        reference: format!("#{} was not built before its parent #{}", child, index),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            let terminal = node
                .terminal
                .map(|word| self.sentence.resolve_word(word))
                .transpose()?;

            built[index as usize] = Some(SyntaxTree::new(node.label.parse::<PhraseTag>()?, terminal, children)?);
        }

        built[root as usize].take().ok_or_else(|| ModelError::Unresolved {
            kind: "tree node",
            reference: format!("#{} (root) was not built", root),
        })
    }
}

fn build_dep_edge(sentence: &Sentence, native: &NativeDepEdge) -> Result<Rc<DepEdge>> {
    let governor = native
        .governor
        .map(|index| sentence.resolve_word(index))
        .transpose()?;
    let dependent = sentence.resolve_word(native.dependent)?;
    let dep_type = native
        .dep_type
        .as_deref()
        .map(str::parse::<DependencyTag>)
        .transpose()?;

    DepEdge::new(
        governor,
        dependent,
        native.phrase_type.parse::<PhraseTag>()?,
        dep_type,
        native.original_label.clone(),
    )
}

fn build_role_edge(sentence: &Sentence, native: &NativeRoleEdge) -> Result<Rc<RoleEdge>> {
    let predicate = native
        .predicate
        .map(|index| sentence.resolve_word(index))
        .transpose()?;
    let argument = sentence.resolve_word(native.argument)?;
    let modifiers = native
        .modifiers
        .iter()
        .map(|index| sentence.resolve_word(*index))
        .collect::<Result<Vec<_>>>()?;

    Ok(RoleEdge::new(
        predicate,
        argument,
        native.label.parse::<RoleType>()?,
        modifiers,
        native.original_label.clone(),
    ))
}

fn build_entity(sentence: &Sentence, native: &NativeEntity) -> Result<Rc<Entity>> {
    let morphemes = native
        .morphemes
        .iter()
        .map(|reference| sentence.resolve_morpheme(reference))
        .collect::<Result<Vec<_>>>()?;

    Entity::new(
        native.surface.as_str(),
        native.label.parse::<CoarseEntityType>()?,
        native.fine_label.as_str(),
        morphemes,
        native.original_label.clone(),
    )
}

/// Coreference members are looked up among the sentence's entities by value:
/// surface, labels and morphemes. An entity not yet picked for this group and
/// not claimed by another one is preferred, so that value-equal entities can
/// sit in different groups. A member listed twice resolves to the same entity
/// and is rejected by [`CoreferenceGroup::new`].
fn build_coref_group(sentence: &Sentence, native: &NativeCorefGroup) -> Result<Rc<CoreferenceGroup>> {
    let entities = sentence.entities();
    let mut members: Vec<Rc<Entity>> = Vec::with_capacity(native.entities.len());

    for member in &native.entities {
        let label = member.label.parse::<CoarseEntityType>()?;
        let morphemes = member
            .morphemes
            .iter()
            .map(|reference| sentence.resolve_morpheme(reference))
            .collect::<Result<Vec<_>>>()?;

        let matches = |entity: &&Rc<Entity>| {
            entity.surface() == member.surface
                && entity.label() == label
                && entity.fine_label() == member.fine_label
                && entity.morphemes().iter().eq(morphemes.iter())
        };
        let picked = |entity: &Rc<Entity>| members.iter().any(|m| Rc::ptr_eq(m, entity));

        let found = entities
            .iter()
            .filter(matches)
            .find(|entity| !picked(*entity) && !entity.in_coref_group())
            .or_else(|| entities.iter().filter(matches).find(|entity| !picked(*entity)))
            .or_else(|| entities.iter().find(matches))
            .cloned()
            .ok_or_else(|| ModelError::Unresolved {
                kind: "entity",
                reference: format!(
                    "{}({}; '{}') matches no entity of this sentence",
                    member.label, member.fine_label, member.surface
                ),
            })?;
        members.push(found);
    }

    CoreferenceGroup::new(members)
}
