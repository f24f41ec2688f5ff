use std::fmt;
use std::rc::{Rc, Weak};

use koala_protocol::PhraseTag;

use crate::error::Result;
use crate::list::ImmutableList;
use crate::once::WriteOnce;
use crate::word::Word;

/// Shared behaviour of ordered trees over the words of a sentence.
///
/// A node is a leaf carrying one terminal word or an inner node with children.
/// A node with neither is allowed but carries nothing.
pub trait Tree: Sized + fmt::Display {
    fn children(&self) -> &ImmutableList<Rc<Self>>;

    fn terminal(&self) -> Option<&Rc<Word>>;

    fn parent(&self) -> Option<Rc<Self>>;

    /// True when no live parent holds this node, including a subtree that
    /// outlived the tree it was built into.
    fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    fn has_non_terminals(&self) -> bool {
        !self.children().is_empty()
    }

    /// Every word under this node (its own terminal included), in sentence order.
    fn terminals(&self) -> Vec<Rc<Word>> {
        let mut words: Vec<Rc<Word>> = pre_order(self)
            .filter_map(|(node, _)| node.terminal().cloned())
            .collect();
        words.sort_by_key(|word| word.id());
        words
    }

    /// Appends an indented rendering, one node per line, `"| "` per level.
    fn write_tree_string(&self, depth: usize, buffer: &mut String) {
        for (i, (node, level)) in pre_order(self).enumerate() {
            if i > 0 {
                buffer.push('\n');
            }
            buffer.push_str(&"| ".repeat(depth + level));
            buffer.push_str(&node.to_string());
        }
    }

    fn tree_string(&self) -> String {
        let mut buffer = String::new();
        self.write_tree_string(0, &mut buffer);
        buffer
    }
}

/// Nodes with their depth below `root`, parents before children, siblings in
/// order. Walks an explicit stack so depth is bounded only by memory.
fn pre_order<T: Tree>(root: &T) -> impl Iterator<Item = (&T, usize)> {
    let mut stack = vec![(root, 0)];
    std::iter::from_fn(move || {
        let (node, depth) = stack.pop()?;
        stack.extend(node.children().iter().rev().map(|child| (&**child, depth + 1)));
        Some((node, depth))
    })
}

/// Phrase-structure tree node.
pub struct SyntaxTree {
    label: PhraseTag,
    terminal: Option<Rc<Word>>,
    children: ImmutableList<Rc<SyntaxTree>>,
    parent: WriteOnce<Weak<SyntaxTree>>,
}

impl SyntaxTree {
    /// Claims `terminal` (its phrase back-reference) and every child (their
    /// parent back-reference). Nothing is wired if any of them is already claimed.
    pub fn new(
        label: PhraseTag,
        terminal: Option<Rc<Word>>,
        children: Vec<Rc<SyntaxTree>>,
    ) -> Result<Rc<Self>> {
        let describe = || match &terminal {
            Some(word) => format!("'{}({})'", label, word.single_line_string()),
            None => format!("'{}'", label),
        };
        if let Some(word) = &terminal {
            word.phrase_slot().ensure_vacant(describe)?;
        }
        for child in &children {
            child.parent.ensure_vacant(describe)?;
        }

        let node = Rc::new(Self {
            label,
            terminal,
            children: children.into(),
            parent: WriteOnce::new("SyntaxTree.parent"),
        });

        if let Some(word) = &node.terminal {
            word.phrase_slot().set(Rc::downgrade(&node))?;
        }
        for child in node.children.iter() {
            child.parent.set(Rc::downgrade(&node))?;
        }

        Ok(node)
    }

    pub fn leaf(label: PhraseTag, terminal: Rc<Word>) -> Result<Rc<Self>> {
        Self::new(label, Some(terminal), Vec::new())
    }

    pub fn label(&self) -> PhraseTag {
        self.label
    }
}

impl Tree for SyntaxTree {
    fn children(&self) -> &ImmutableList<Rc<Self>> {
        &self.children
    }

    fn terminal(&self) -> Option<&Rc<Word>> {
        self.terminal.as_ref()
    }

    fn parent(&self) -> Option<Rc<Self>> {
        self.parent.upgrade()
    }
}

/// Structural equality: labels, terminal words and child order, compared pairwise.
impl PartialEq for SyntaxTree {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((left, right)) = pending.pop() {
            if left.label != right.label
                || left.terminal != right.terminal
                || left.children.len() != right.children.len()
            {
                return false;
            }
            pending.extend(
                left.children
                    .iter()
                    .map(|child| &**child)
                    .zip(right.children.iter().map(|child| &**child)),
            );
        }
        true
    }
}

/// Releases uniquely owned descendants one at a time instead of through nested
/// drops.
impl Drop for SyntaxTree {
    fn drop(&mut self) {
        let mut orphans: Vec<Rc<SyntaxTree>> = std::mem::take(&mut self.children).into_iter().collect();
        while let Some(child) = orphans.pop() {
            if let Ok(mut child) = Rc::try_unwrap(child) {
                orphans.extend(std::mem::take(&mut child.children));
            }
        }
    }
}

impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.terminal {
            Some(word) => write!(f, "{}({})", self.label, word.single_line_string()),
            None => write!(f, "{}", self.label),
        }
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("label", &self.label)
            .field("terminal", &self.terminal.as_ref().map(|w| w.surface()))
            .field("children", &self.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::morpheme::Morpheme;
    use crate::sentence::Sentence;
    use koala_protocol::PosTag;

    fn words() -> Vec<Rc<Word>> {
        [("나는", "나", PosTag::NP), ("밥을", "밥", PosTag::NNG), ("먹었다", "먹", PosTag::VV)]
            .into_iter()
            .map(|(surface, stem, tag)| {
                Word::new(surface, vec![Morpheme::new(stem, tag).unwrap()]).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_terminals_follow_sentence_order() {
        let sentence = Sentence::new(words()).unwrap();
        let w = sentence.words();

        // VP built before the subject NP: tree order is not sentence order
        let vp = SyntaxTree::new(
            PhraseTag::VP,
            None,
            vec![
                SyntaxTree::leaf(PhraseTag::VP, Rc::clone(&w[2])).unwrap(),
                SyntaxTree::leaf(PhraseTag::NP, Rc::clone(&w[1])).unwrap(),
            ],
        )
        .unwrap();
        let np = SyntaxTree::leaf(PhraseTag::NP, Rc::clone(&w[0])).unwrap();
        let root = SyntaxTree::new(PhraseTag::S, None, vec![Rc::clone(&vp), np]).unwrap();

        let ids: Vec<_> = root.terminals().iter().map(|w| w.id()).collect();
        assert_eq!(ids, vec![Some(0), Some(1), Some(2)]);
        assert_eq!(vp.terminals().len(), 2);

        assert!(root.is_root());
        assert!(!vp.is_root());
        assert!(Rc::ptr_eq(&vp.parent().unwrap(), &root));
        assert!(root.has_non_terminals());
        assert!(!root.children()[1].has_non_terminals());
        assert!(Rc::ptr_eq(&w[0].phrase().unwrap(), &root.children()[1]));
    }

    #[test]
    fn test_subtree_outliving_its_root() {
        let w = words();
        let leaf = SyntaxTree::leaf(PhraseTag::NP, Rc::clone(&w[0])).unwrap();
        let root = SyntaxTree::new(PhraseTag::S, None, vec![Rc::clone(&leaf)]).unwrap();
        assert!(!leaf.is_root());

        drop(root);
        assert!(leaf.parent().is_none());
        assert!(leaf.is_root());
        assert_eq!(leaf.terminals().len(), 1);
    }

    fn chain(word: &Rc<Word>, depth: usize) -> Rc<SyntaxTree> {
        let mut node = SyntaxTree::leaf(PhraseTag::NP, Rc::clone(word)).unwrap();
        for _ in 0..depth {
            node = SyntaxTree::new(PhraseTag::NP, None, vec![node]).unwrap();
        }
        node
    }

    #[test]
    fn test_deep_chain_without_recursion() {
        let (a, b) = (words(), words());
        let left = chain(&a[0], 50_000);
        let right = chain(&b[0], 50_000);

        assert_eq!(left.terminals().len(), 1);
        assert_eq!(*left, *right);
        assert_ne!(*left, *chain(&b[1], 50_000));

        let rendered = chain(&words()[0], 2_000).tree_string();
        assert_eq!(rendered.lines().count(), 2_001);
        assert!(rendered.ends_with(&format!("{}NP(나/NP)", "| ".repeat(2_000))));
    }

    #[test]
    fn test_tree_string() {
        let w = words();
        let root = SyntaxTree::new(
            PhraseTag::S,
            None,
            vec![
                SyntaxTree::leaf(PhraseTag::NP, Rc::clone(&w[0])).unwrap(),
                SyntaxTree::leaf(PhraseTag::VP, Rc::clone(&w[2])).unwrap(),
            ],
        )
        .unwrap();

        assert_eq!(root.tree_string(), "S\n| NP(나/NP)\n| VP(먹/VV)");
    }

    #[test]
    fn test_phrase_is_write_once() {
        let w = words();
        let first = SyntaxTree::leaf(PhraseTag::NP, Rc::clone(&w[0])).unwrap();

        // Reasserting the same node is a no-op
        w[0].phrase_slot().set(Rc::downgrade(&first)).unwrap();

        let err = SyntaxTree::leaf(PhraseTag::DP, Rc::clone(&w[0])).unwrap_err();
        assert_eq!(
            err,
            ModelError::WriteOnce {
                field: "Word.phrase",
                old: "'NP(나/NP)'".to_string(),
                new: "'DP(나/NP)'".to_string(),
            }
        );
        assert!(Rc::ptr_eq(&w[0].phrase().unwrap(), &first));
    }

    #[test]
    fn test_child_cannot_have_two_parents() {
        let w = words();
        let leaf = SyntaxTree::leaf(PhraseTag::NP, Rc::clone(&w[1])).unwrap();
        let _first = SyntaxTree::new(PhraseTag::VP, None, vec![Rc::clone(&leaf)]).unwrap();

        let err = SyntaxTree::new(PhraseTag::S, None, vec![leaf]).unwrap_err();
        assert!(matches!(err, ModelError::WriteOnce { field: "SyntaxTree.parent", .. }));
    }

    #[test]
    fn test_structural_equality() {
        let (a, b) = (words(), words());
        let left = SyntaxTree::new(
            PhraseTag::S,
            None,
            vec![SyntaxTree::leaf(PhraseTag::NP, Rc::clone(&a[0])).unwrap()],
        )
        .unwrap();
        let right = SyntaxTree::new(
            PhraseTag::S,
            None,
            vec![SyntaxTree::leaf(PhraseTag::NP, Rc::clone(&b[0])).unwrap()],
        )
        .unwrap();
        let other = SyntaxTree::new(
            PhraseTag::S,
            None,
            vec![SyntaxTree::leaf(PhraseTag::NP, Rc::clone(&b[1])).unwrap()],
        )
        .unwrap();

        assert_eq!(*left, *right);
        assert_ne!(*left, *other);
    }
}
