//! Dependency graph between artifact kinds.
//!
//! Edges point from a dependent to what it depends on. The generation order
//! is the reversed topological order, so leaves come first and the PDF last.

use crate::artifact::catalog::ArtifactKind;
use anyhow::{Result, anyhow};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, VecDeque};

pub struct ArtifactGraph {
    graph: DiGraph<ArtifactKind, ()>,
    node_map: HashMap<ArtifactKind, NodeIndex>,
}

impl Default for ArtifactGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactGraph {
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// The fixed graph of a group render. The background is merged after
    /// rendering and stands alone.
    #[must_use]
    pub fn standard() -> Self {
        use ArtifactKind::{
            ComponentStyleExtension, ComponentTexExtension, Control, DefaultStyle,
            DefaultStyleExtension, Extension, GroupStyleExtension, GroupTexExtension,
            HyphenationExceptions, Lccode, MacroLink, Pdf, Settings,
        };

        let mut graph = Self::new();
        for kind in ArtifactKind::ALL {
            graph.ensure_node(kind);
        }
        graph.add_dependency(Lccode, HyphenationExceptions);
        for dep in [
            MacroLink,
            Settings,
            Extension,
            GroupTexExtension,
            Lccode,
            HyphenationExceptions,
            DefaultStyle,
            DefaultStyleExtension,
            GroupStyleExtension,
            ComponentTexExtension,
            ComponentStyleExtension,
        ] {
            graph.add_dependency(Control, dep);
        }
        for dep in [Control, MacroLink, Settings, Extension] {
            graph.add_dependency(Pdf, dep);
        }
        graph
    }

    fn ensure_node(&mut self, kind: ArtifactKind) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&kind) {
            index
        } else {
            let index = self.graph.add_node(kind);
            self.node_map.insert(kind, index);
            index
        }
    }

    /// Record that `dependent` is built from `dependency`.
    pub fn add_dependency(&mut self, dependent: ArtifactKind, dependency: ArtifactKind) {
        let from = self.ensure_node(dependent);
        let to = self.ensure_node(dependency);
        if !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, ());
        }
    }

    /// Leaves-first order in which artifacts must be produced.
    pub fn generation_order(&self) -> Result<Vec<ArtifactKind>> {
        let indices = toposort(&self.graph, None).map_err(|cycle| {
            anyhow!("Circular artifact dependency involving '{}'", self.graph[cycle.node_id()])
        })?;
        Ok(indices.into_iter().rev().map(|idx| self.graph[idx]).collect())
    }

    /// Direct dependencies of `kind`.
    #[must_use]
    pub fn dependencies_of(&self, kind: ArtifactKind) -> BTreeSet<ArtifactKind> {
        self.node_map
            .get(&kind)
            .map(|&idx| self.graph.neighbors_directed(idx, Direction::Outgoing).map(|n| self.graph[n]).collect())
            .unwrap_or_default()
    }

    /// Everything that transitively depends on `kind`.
    #[must_use]
    pub fn dependents_of(&self, kind: ArtifactKind) -> BTreeSet<ArtifactKind> {
        let mut found = BTreeSet::new();
        let Some(&start) = self.node_map.get(&kind) else {
            return found;
        };
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for parent in self.graph.neighbors_directed(current, Direction::Incoming) {
                if found.insert(self.graph[parent]) {
                    queue.push_back(parent);
                }
            }
        }
        found
    }
}
