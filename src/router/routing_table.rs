//! Per-node routing table. Holds at most one entry per (destination, next hop) pair;
//! a destination may be reachable through several next hops.
use crate::router::strategies::{RouteSelectionPolicy, RouteStrategy};
use crate::NodeId;
use std::collections::HashMap;

/// A route to `destination` through the neighbour `next_hop`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingTableEntry {
    pub destination: NodeId,
    pub next_hop: NodeId,
    /// Hop count of the route, averaged over `measurement_count` observations.
    pub hop_count: f64,
    /// Path distance of the route, averaged over `measurement_count` observations.
    pub distance: f64,
    /// Number of observations folded into this entry. Always at least 1.
    pub measurement_count: u32,
}

impl RoutingTableEntry {
    pub fn new(destination: &str, next_hop: &str, hop_count: f64, distance: f64) -> Self {
        RoutingTableEntry {
            destination: destination.to_string(),
            next_hop: next_hop.to_string(),
            hop_count,
            distance,
            measurement_count: 1,
        }
    }

    /// Folds one more sample into the running means of hop count and distance.
    pub fn fold_mean(&mut self, hop_count: f64, distance: f64) {
        let n = f64::from(self.measurement_count);
        self.hop_count = (self.hop_count * n + hop_count) / (n + 1f64);
        self.distance = (self.distance * n + distance) / (n + 1f64);
        self.measurement_count += 1;
    }
}

/// Routing table of a single node.
#[derive(Debug)]
pub struct RoutingTable {
    /// destination -> next hop -> entry
    routes: HashMap<NodeId, HashMap<NodeId, RoutingTableEntry>>,
    strategy: Box<dyn RouteStrategy>,
}

impl Default for RoutingTable {
    fn default() -> Self {
        RoutingTable::new(RouteSelectionPolicy::default().build_strategy())
    }
}

impl RoutingTable {
    pub fn new(strategy: Box<dyn RouteStrategy>) -> Self {
        RoutingTable {
            routes: HashMap::new(),
            strategy,
        }
    }

    /// Best known entry towards `destination`, as ranked by the table's strategy.
    pub fn lookup_best_route(&self, destination: &str) -> Option<&RoutingTableEntry> {
        let strategy = &self.strategy;
        self.routes
            .get(destination)?
            .values()
            .min_by(|a, b| {
                strategy
                    .compare(a, b)
                    //Keeps the choice stable across HashMap iteration orders
                    .then_with(|| a.next_hop.cmp(&b.next_hop))
            })
    }

    /// Next hop of the best known route towards `destination`.
    pub fn next_hop(&self, destination: &str) -> Option<&NodeId> {
        self.lookup_best_route(destination).map(|e| &e.next_hop)
    }

    /// Whether any route to `destination` is known.
    pub fn has_route(&self, destination: &str) -> bool {
        self.routes
            .get(destination)
            .map(|hops| !hops.is_empty())
            .unwrap_or(false)
    }

    /// Records an observation of a route to `destination` through `next_hop`. Existing
    /// entries fold the sample in, unknown pairs get a fresh entry.
    /// `me` is the node owning the table; it never stores a route to itself.
    /// Returns true if the table was modified.
    pub fn record_observation(
        &mut self,
        me: &str,
        destination: &str,
        next_hop: &str,
        hop_count: f64,
        distance: f64,
    ) -> bool {
        if destination == me {
            return false;
        }
        let hops = self
            .routes
            .entry(destination.to_string())
            .or_insert_with(HashMap::new);
        match hops.get_mut(next_hop) {
            Some(entry) => self.strategy.update_entry(entry, hop_count, distance),
            None => {
                let entry = RoutingTableEntry::new(destination, next_hop, hop_count, distance);
                hops.insert(next_hop.to_string(), entry);
            }
        }
        true
    }

    /// Removes every entry that uses `next_hop`. Returns the evicted entries.
    pub fn evict_by_next_hop(&mut self, next_hop: &str) -> Vec<RoutingTableEntry> {
        let mut evicted = Vec::new();
        for hops in self.routes.values_mut() {
            if let Some(entry) = hops.remove(next_hop) {
                evicted.push(entry);
            }
        }
        self.routes.retain(|_, hops| !hops.is_empty());
        evicted
    }

    /// All entries towards `destination`.
    pub fn entries_for(&self, destination: &str) -> Vec<&RoutingTableEntry> {
        self.routes
            .get(destination)
            .map(|hops| hops.values().collect())
            .unwrap_or_default()
    }

    /// The entry for a specific (destination, next hop) pair.
    pub fn get(&self, destination: &str, next_hop: &str) -> Option<&RoutingTableEntry> {
        self.routes.get(destination)?.get(next_hop)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoutingTableEntry> {
        self.routes.values().flat_map(|hops| hops.values())
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(|hops| hops.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
