use std::rc::Rc;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::edge::{DagEdge, DepEdge, RoleEdge};
use crate::sentence::Sentence;
use crate::word::Word;

/// Words as nodes (node `i` is word `i`), annotation edges as weights. Edges
/// hanging from the virtual root have no source node and are left out.
pub type WordGraph<E> = DiGraph<Rc<Word>, Rc<E>>;

impl Sentence {
    pub fn dependency_graph(&self) -> WordGraph<DepEdge> {
        self.word_graph(self.dependencies().iter())
    }

    pub fn role_graph(&self) -> WordGraph<RoleEdge> {
        self.word_graph(self.roles().iter())
    }

    fn word_graph<'a, E: DagEdge + 'a>(&self, edges: impl Iterator<Item = &'a Rc<E>>) -> WordGraph<E> {
        let mut graph = DiGraph::with_capacity(self.len(), 0);
        for word in self.iter() {
            graph.add_node(Rc::clone(word));
        }

        for edge in edges {
            let endpoints = edge
                .src()
                .and_then(|src| self.words().index_of(src))
                .zip(self.words().index_of(edge.dest()));
            if let Some((src, dest)) = endpoints {
                graph.add_edge(NodeIndex::new(src), NodeIndex::new(dest), Rc::clone(edge));
            }
        }

        graph
    }
}
