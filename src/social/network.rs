use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::social::directive::Directive;
use crate::social::graph::{Weight, WeightedDirectedGraph};
use crate::social::report::{NetworkReport, UserReport};

/// Weight of both directed edges making up a friendship.
pub const FRIENDSHIP_WEIGHT: Weight = 1;

/// Users and mutual friendships on top of a [`WeightedDirectedGraph`].
///
/// A friendship `a <-> b` is the pair of edges `a -> b` and `b -> a`. The graph
/// sits behind a single lock owned by the network: every mutation takes it for
/// the duration of one call, so concurrent ingestion units can share one
/// network by reference. The graph itself is never handed out.
///
/// Names are `Option<&str>`. `None` and `""` are turned into `false` / `None`
/// results here and never reach the graph.
#[derive(Debug, Default)]
pub struct SocialNetwork {
    users: RwLock<WeightedDirectedGraph<String>>,
}

#[inline]
fn named(name: Option<&str>) -> Option<&str> {
    name.filter(|name| !name.is_empty())
}

fn suggestions_in(graph: &WeightedDirectedGraph<String>, name: &str) -> HashSet<String> {
    let friends = graph.neighbors_of(Some(name)).unwrap_or_default();

    let mut suggested = friends
        .iter()
        .filter(|friend| friend.as_str() != name)
        .flat_map(|friend| {
            graph
                .neighbors_of(Some(friend.as_str()))
                .unwrap_or_default()
        })
        .collect::<HashSet<_>>();

    // every friend links back to `name`
    suggested.remove(name);
    suggested
}

impl SocialNetwork {
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    fn graph(&self) -> RwLockReadGuard<'_, WeightedDirectedGraph<String>> {
        self.users.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn graph_mut(&self) -> RwLockWriteGuard<'_, WeightedDirectedGraph<String>> {
        self.users.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `false` for a missing or empty name and for an existing user.
    pub fn add_user(&self, name: Option<&str>) -> bool {
        let Some(name) = named(name) else {
            return false;
        };

        self.graph_mut()
            .add_vertex(Some(name.to_owned()))
            .unwrap_or(false)
    }

    #[must_use]
    pub fn get_all_users(&self) -> HashSet<String> {
        self.graph().vertices()
    }

    /// Links `a` and `b` in both directions, creating either user if needed.
    ///
    /// Returns `true` whenever both names are present and non-empty, also when
    /// the friendship already existed. Both edges are written under one lock.
    pub fn add_friends(&self, a: Option<&str>, b: Option<&str>) -> bool {
        let (Some(a), Some(b)) = (named(a), named(b)) else {
            return false;
        };

        // `false` here only means a refused self-loop
        let mut graph = self.graph_mut();
        graph
            .add_edge(Some(a.to_owned()), Some(b.to_owned()), FRIENDSHIP_WEIGHT)
            .unwrap_or(false);
        graph
            .add_edge(Some(b.to_owned()), Some(a.to_owned()), FRIENDSHIP_WEIGHT)
            .unwrap_or(false);

        true
    }

    /// `None` for a missing name. An unknown user has no friends.
    #[must_use]
    pub fn get_friends(&self, name: Option<&str>) -> Option<HashSet<String>> {
        let name = name?;
        self.graph().neighbors_of(Some(name)).ok()
    }

    /// Removes the `a -> b` edge only; the reverse edge needs its own call.
    pub fn unfriend(&self, a: Option<&str>, b: Option<&str>) -> bool {
        let (Some(a), Some(b)) = (named(a), named(b)) else {
            return false;
        };

        let mut graph = self.graph_mut();
        let known = graph.has_vertex(Some(a)).unwrap_or(false)
            && graph.has_vertex(Some(b)).unwrap_or(false);

        if !known
            || !graph
                .neighbors_of(Some(a))
                .is_ok_and(|friends| friends.contains(b))
        {
            return false;
        }

        graph.remove_edge(Some(a), Some(b)).unwrap_or(false)
    }

    /// Everyone reachable through one of `name`'s friends, except `name`.
    ///
    /// Direct friends stay in the result when another friend also knows them.
    #[must_use]
    pub fn suggestions(&self, name: Option<&str>) -> Option<HashSet<String>> {
        let name = named(name)?;
        Some(suggestions_in(&self.graph(), name))
    }

    #[must_use]
    pub fn are_friends(&self, a: &str, b: &str) -> bool {
        let graph = self.graph();
        matches!(graph.edge_weight(Some(a), Some(b)), Ok(Some(_)))
            && matches!(graph.edge_weight(Some(b), Some(a)), Ok(Some(_)))
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.graph().vertex_count()
    }

    /// Number of directed friendship edges, twice the number of friendships.
    #[must_use]
    pub fn friendship_edge_count(&self) -> usize {
        self.graph().edge_count()
    }

    /// Applies one ingested directive, holding the lock for this directive only.
    pub fn apply(&self, directive: &Directive) -> bool {
        match directive {
            Directive::AddUser(name) => self.add_user(Some(name.as_str())),
            Directive::AddFriends(a, b) => {
                self.add_friends(Some(a.as_str()), Some(b.as_str()))
            }
        }
    }

    /// Sorted snapshot of the whole network, most connected users first.
    #[must_use]
    pub fn report(&self) -> NetworkReport {
        let graph = self.graph();

        let mut users = graph
            .vertices()
            .into_iter()
            .map(|name| {
                let mut friends = graph
                    .neighbors_of(Some(name.as_str()))
                    .unwrap_or_default()
                    .into_iter()
                    .collect::<Vec<_>>();
                friends.sort_unstable();

                let mut suggestions = suggestions_in(&graph, &name)
                    .into_iter()
                    .collect::<Vec<_>>();
                suggestions.sort_unstable();

                UserReport {
                    name,
                    friends,
                    suggestions,
                }
            })
            .collect::<Vec<_>>();

        users.sort_by(|a, b| {
            b.friends
                .len()
                .cmp(&a.friends.len())
                .then_with(|| a.name.cmp(&b.name))
        });

        NetworkReport { users }
    }
}
