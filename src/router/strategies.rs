use crate::router::routing_table::RoutingTableEntry;
use crate::{DtnAodvError, DtnAodvErrorKind};
use std::cmp::Ordering;
use std::str::FromStr;

/// Policy used to rank competing routes to the same destination and to fold
/// repeated observations of a route into its entry.
pub trait RouteStrategy: std::fmt::Debug + Send + Sync {
    /// Orders two candidate routes. The smallest one is the best route.
    fn compare(&self, a: &RoutingTableEntry, b: &RoutingTableEntry) -> Ordering;

    /// Folds a new observation of an existing route into its entry.
    fn update_entry(&self, entry: &mut RoutingTableEntry, hop_count: f64, distance: f64);
}

/// Ranks routes by accumulated path distance, then by hop count. Repeated observations
/// are averaged into the entry.
#[derive(Debug, Default)]
pub struct DistanceAdjusted {}

/// Ranks routes by hop count only. Repeated observations replace the stored values.
#[derive(Debug, Default)]
pub struct MinimumHops {}

impl RouteStrategy for DistanceAdjusted {
    fn compare(&self, a: &RoutingTableEntry, b: &RoutingTableEntry) -> Ordering {
        total_cmp(a.distance, b.distance).then_with(|| total_cmp(a.hop_count, b.hop_count))
    }

    fn update_entry(&self, entry: &mut RoutingTableEntry, hop_count: f64, distance: f64) {
        entry.fold_mean(hop_count, distance);
    }
}

impl RouteStrategy for MinimumHops {
    fn compare(&self, a: &RoutingTableEntry, b: &RoutingTableEntry) -> Ordering {
        //Distance only breaks ties so that selection stays deterministic
        total_cmp(a.hop_count, b.hop_count).then_with(|| total_cmp(a.distance, b.distance))
    }

    fn update_entry(&self, entry: &mut RoutingTableEntry, hop_count: f64, distance: f64) {
        entry.hop_count = hop_count;
        entry.distance = distance;
        entry.measurement_count += 1;
    }
}

fn total_cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Selectable route-selection policies.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum RouteSelectionPolicy {
    /// Distance first, hop count as tie-break, averaged observations.
    DistanceAdjusted,
    /// Hop count only, latest observation wins.
    MinimumHops,
}

impl Default for RouteSelectionPolicy {
    fn default() -> Self {
        RouteSelectionPolicy::DistanceAdjusted
    }
}

impl RouteSelectionPolicy {
    /// Provides a new boxed strategy matching this policy.
    pub fn build_strategy(&self) -> Box<dyn RouteStrategy> {
        match *self {
            RouteSelectionPolicy::DistanceAdjusted => Box::new(DistanceAdjusted {}),
            RouteSelectionPolicy::MinimumHops => Box::new(MinimumHops {}),
        }
    }
}

impl FromStr for RouteSelectionPolicy {
    type Err = DtnAodvError;

    fn from_str(s: &str) -> Result<RouteSelectionPolicy, DtnAodvError> {
        let input = s.trim().to_uppercase().replace('_', "");
        match input.as_str() {
            "DISTANCEADJUSTED" | "DISTANCE" => Ok(RouteSelectionPolicy::DistanceAdjusted),
            "MINIMUMHOPS" | "MINHOPS" | "HOPS" => Ok(RouteSelectionPolicy::MinimumHops),
            _ => {
                let err_msg = format!("Unsupported route selection policy: {}", s);
                Err(DtnAodvErrorKind::Configuration(err_msg).into())
            }
        }
    }
}
