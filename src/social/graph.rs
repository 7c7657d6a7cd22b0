use std::borrow::Borrow;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::social::error::GraphError;

pub type Weight = i32;

/// Mutable directed graph storing, per vertex, its outgoing neighbours and the
/// weight of each edge.
///
/// Every vertex that shows up as a neighbour is also a key of the adjacency map:
/// [`add_edge`](Self::add_edge) inserts missing endpoints before linking them.
///
/// Vertex arguments are `Option`s. A `None` vertex is rejected with
/// [`GraphError::InvalidArgument`], while absent vertices and edges are reported
/// through the returned `bool`.
///
/// There is no locking here; sharing a graph between writers is the job of the
/// owner (see [`SocialNetwork`](crate::social::network::SocialNetwork)).
#[derive(Debug, Clone)]
pub struct WeightedDirectedGraph<V> {
    adjacency: HashMap<V, HashMap<V, Weight>>,
}

impl<V> Default for WeightedDirectedGraph<V> {
    #[inline]
    fn default() -> Self {
        Self {
            adjacency: HashMap::new(),
        }
    }
}

#[inline]
fn require<T>(value: Option<T>, parameter: &'static str) -> Result<T, GraphError> {
    value.ok_or(GraphError::InvalidArgument { parameter })
}

impl<V> WeightedDirectedGraph<V>
where
    V: Eq + Hash + Clone,
{
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Ok(false)` without touching the graph if the vertex already exists.
    pub fn add_vertex(&mut self, vertex: Option<V>) -> Result<bool, GraphError> {
        let vertex = require(vertex, "vertex")?;
        Ok(self.insert_vertex(vertex))
    }

    fn insert_vertex(&mut self, vertex: V) -> bool {
        match self.adjacency.entry(vertex) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(HashMap::new());
                true
            }
        }
    }

    pub fn has_vertex<Q>(&self, vertex: Option<&Q>) -> Result<bool, GraphError>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let vertex = require(vertex, "vertex")?;
        Ok(self.adjacency.contains_key(vertex))
    }

    /// Snapshot of every vertex, in no particular order.
    #[must_use]
    pub fn vertices(&self) -> HashSet<V> {
        self.adjacency.keys().cloned().collect()
    }

    /// Inserts or overwrites the `src -> dst` edge, creating missing endpoints first.
    ///
    /// Non-positive weights and self-loops are refused with `Ok(false)` and leave
    /// the graph untouched (no endpoint is created either).
    pub fn add_edge(
        &mut self,
        src: Option<V>,
        dst: Option<V>,
        weight: Weight,
    ) -> Result<bool, GraphError> {
        let src = require(src, "src")?;
        let dst = require(dst, "dst")?;

        if weight <= 0 || src == dst {
            return Ok(false);
        }

        self.insert_vertex(dst.clone());
        self.adjacency.entry(src).or_default().insert(dst, weight);

        Ok(true)
    }

    /// Removes the `src -> dst` edge. Vertices are never removed.
    pub fn remove_edge<Q>(
        &mut self,
        src: Option<&Q>,
        dst: Option<&Q>,
    ) -> Result<bool, GraphError>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let src = require(src, "src")?;
        let dst = require(dst, "dst")?;

        if !self.adjacency.contains_key(dst) {
            return Ok(false);
        }

        Ok(self
            .adjacency
            .get_mut(src)
            .and_then(|neighbors| neighbors.remove(dst))
            .is_some())
    }

    /// Snapshot of the outgoing neighbours of `vertex`.
    ///
    /// Unlike the other operations an unknown vertex is not an error here: it
    /// simply has no neighbours.
    pub fn neighbors_of<Q>(&self, vertex: Option<&Q>) -> Result<HashSet<V>, GraphError>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let vertex = require(vertex, "vertex")?;

        Ok(self
            .adjacency
            .get(vertex)
            .map(|neighbors| neighbors.keys().cloned().collect())
            .unwrap_or_default())
    }

    /// Weight of the `src -> dst` edge, `Ok(None)` if either the vertex or the edge is missing.
    pub fn edge_weight<Q>(
        &self,
        src: Option<&Q>,
        dst: Option<&Q>,
    ) -> Result<Option<Weight>, GraphError>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let src = require(src, "src")?;
        let dst = require(dst, "dst")?;

        Ok(self
            .adjacency
            .get(src)
            .and_then(|neighbors| neighbors.get(dst))
            .copied())
    }

    #[must_use]
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(HashMap::len).sum()
    }
}
