/// A route found by a search.
///
/// Nodes are stored goal first, start last, the order in which they are
/// recovered from predecessor links. An empty path always means the search
/// failed; a successful search yields at least one node.
#[derive(Debug, Clone, PartialEq)]
pub struct Path<N> {
    nodes: Vec<N>,
    cost: f32,
}

impl<N> Default for Path<N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<N> Path<N> {
    /// The failed (empty) path.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            cost: 0.0,
        }
    }

    pub(crate) fn new(nodes: Vec<N>, cost: f32) -> Self {
        Self { nodes, cost }
    }

    /// Number of nodes, both endpoints included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Accumulated edge cost from start to goal.
    #[inline]
    pub fn cost(&self) -> f32 {
        self.cost
    }

    /// The goal node.
    pub fn goal(&self) -> Option<&N> {
        self.nodes.first()
    }

    /// The start node.
    pub fn start(&self) -> Option<&N> {
        self.nodes.last()
    }

    /// Nodes goal first.
    pub fn iter(&self) -> std::slice::Iter<'_, N> {
        self.nodes.iter()
    }

    /// Nodes start first, the order an agent walks them.
    pub fn iter_from_start(&self) -> std::iter::Rev<std::slice::Iter<'_, N>> {
        self.nodes.iter().rev()
    }

    /// Nodes goal first as a slice.
    pub fn as_slice(&self) -> &[N] {
        &self.nodes
    }

    pub fn into_vec(self) -> Vec<N> {
        self.nodes
    }
}

impl<'a, N> IntoIterator for &'a Path<N> {
    type Item = &'a N;
    type IntoIter = std::slice::Iter<'a, N>;
    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
