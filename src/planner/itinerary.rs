//! Itinerary derivation: flattened stops, routing waypoints and the
//! destination reconciliation rule for day-based trips.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::state::{DayStops, Stop, StopOrigin};
use crate::models::Location;

/// Immutable snapshot of a fully specified trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub source: Location,
    pub destination: Location,
    /// Non-null stops of each day, in insertion order
    pub days: Vec<Vec<Location>>,
    pub trip_duration: Option<u8>,
}

impl Itinerary {
    /// All stops across days, in day order
    #[must_use]
    pub fn stops(&self) -> Vec<&Location> {
        self.days.iter().flatten().collect()
    }

    /// Number of days covered by the schedule (1 without day planning)
    #[must_use]
    pub fn day_count(&self) -> usize {
        self.trip_duration.map_or(1, usize::from)
    }
}

/// Non-null stops from day 0..N, each day in insertion order
#[must_use]
pub fn flatten_stops(days: &[DayStops]) -> Vec<Location> {
    days.iter()
        .flatten()
        .flatten()
        .map(|stop| stop.location.clone())
        .collect()
}

/// Ordered routing waypoints: source, stops, destination.
///
/// Returns `None` when fewer than two points are available. Consecutive
/// points with identical coordinates are collapsed.
#[must_use]
pub fn waypoints(
    source: Option<&Location>,
    days: &[DayStops],
    destination: Option<&Location>,
) -> Option<Vec<Location>> {
    let mut points: Vec<Location> = Vec::new();
    let candidates = source
        .cloned()
        .into_iter()
        .chain(flatten_stops(days))
        .chain(destination.cloned());

    for point in candidates {
        if points.last().is_some_and(|last| last.same_coordinates(&point)) {
            continue;
        }
        points.push(point);
    }

    if points.len() < 2 {
        debug!("Only {} waypoint(s), skipping routing", points.len());
        return None;
    }
    Some(points)
}

/// Make `destination` the first stop of the final day.
///
/// Earlier destination entries and any final-day entry at exactly the
/// destination's coordinates are removed first, so repeated calls never
/// accumulate duplicates. Returns whether the structure changed.
pub fn reconcile_destination(days: &mut [DayStops], destination: &Location) -> bool {
    let Some(last_index) = days.len().checked_sub(1) else {
        return false;
    };

    let already_reconciled = days[last_index]
        .first()
        .and_then(Option::as_ref)
        .is_some_and(|head| {
            head.origin == StopOrigin::Destination && head.location == *destination
        })
        && count_destination_entries(days, destination) == 1;
    if already_reconciled {
        return false;
    }

    for day in days.iter_mut() {
        day.retain(|slot| {
            !slot
                .as_ref()
                .is_some_and(|stop| stop.origin == StopOrigin::Destination)
        });
    }
    days[last_index].retain(|slot| {
        !slot
            .as_ref()
            .is_some_and(|stop| stop.location.same_coordinates(destination))
    });

    days[last_index].insert(
        0,
        Some(Stop {
            location: destination.clone(),
            origin: StopOrigin::Destination,
        }),
    );
    debug!(
        "Destination {} reconciled into day {}",
        destination.name,
        last_index + 1
    );
    true
}

fn count_destination_entries(days: &[DayStops], destination: &Location) -> usize {
    let last_index = days.len().saturating_sub(1);
    days.iter()
        .enumerate()
        .flat_map(|(index, day)| day.iter().flatten().map(move |stop| (index, stop)))
        .filter(|(index, stop)| {
            stop.origin == StopOrigin::Destination
                || (*index == last_index && stop.location.same_coordinates(destination))
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::state::{StopId, TripState};

    fn mumbai() -> Location {
        Location::new(19.076, 72.8777, "Mumbai")
    }

    fn pune() -> Location {
        Location::new(18.5204, 73.8567, "Pune")
    }

    fn lonavala() -> Location {
        Location::new(18.7546, 73.4062, "Lonavala")
    }

    #[test]
    fn test_waypoints_source_destination_only() {
        let mut state = TripState::new();
        state.set_source(mumbai());
        state.set_destination(pune());

        let names: Vec<_> = state
            .waypoints()
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["Mumbai", "Pune"]);
    }

    #[test]
    fn test_waypoints_need_two_points() {
        let mut state = TripState::new();
        assert!(state.waypoints().is_none());
        state.set_source(mumbai());
        assert!(state.waypoints().is_none());
        state.add_stop(0).unwrap();
        assert!(state.waypoints().is_none());
    }

    #[test]
    fn test_waypoints_follow_day_then_insertion_order() {
        let mut state = TripState::new();
        state.set_day_count(2).unwrap();
        state.set_source(mumbai());
        state.set_stop(StopId::new(0, 0), lonavala()).unwrap();
        let extra = state.add_stop(0).unwrap();
        state
            .set_stop(extra, Location::new(18.6298, 73.7997, "Pimpri"))
            .unwrap();
        state.set_destination(pune());

        let names: Vec<_> = state
            .waypoints()
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        // Pune heads day 2 and is also the final point; the repeat collapses.
        assert_eq!(names, vec!["Mumbai", "Lonavala", "Pimpri", "Pune"]);
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let mut state = TripState::new();
        state.set_day_count(3).unwrap();
        state.set_stop(StopId::new(1, 0), lonavala()).unwrap();
        state.set_destination(pune());

        let first = state.flatten_stops();
        let second = state.flatten_stops();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_reconcile_is_stable_under_repetition() {
        let mut state = TripState::new();
        state.set_day_count(3).unwrap();
        state.set_destination(pune());
        for _ in 0..5 {
            state.reconcile_destination();
        }

        let last = &state.days()[2];
        let matches = last
            .iter()
            .flatten()
            .filter(|s| s.location.same_coordinates(&pune()))
            .count();
        assert_eq!(matches, 1);
        assert!(last[0].as_ref().unwrap().location.same_coordinates(&pune()));
    }

    #[test]
    fn test_destination_changes_do_not_accumulate() {
        let mut state = TripState::new();
        state.set_day_count(2).unwrap();
        let destinations = [
            pune(),
            Location::new(15.2993, 74.124, "Goa"),
            Location::new(12.9716, 77.5946, "Bengaluru"),
        ];
        for destination in destinations {
            state.set_destination(destination);
        }

        let stops = state.flatten_stops();
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].name, "Bengaluru");
        assert_eq!(state.days()[1].len(), 2);
    }

    #[test]
    fn test_reconcile_removes_user_stop_at_destination() {
        let mut days: Vec<DayStops> = vec![vec![None], vec![Some(Stop::user(lonavala()))]];
        let destination = Location::new(18.7546, 73.4062, "Lonavala Station");
        assert!(reconcile_destination(&mut days, &destination));
        assert_eq!(days[1].len(), 1);
        assert_eq!(days[1][0].as_ref().unwrap().location.name, "Lonavala Station");
    }

    #[test]
    fn test_reconcile_keeps_other_last_day_stops_after_destination() {
        let mut days: Vec<DayStops> = vec![vec![Some(Stop::user(lonavala()))]];
        reconcile_destination(&mut days, &pune());
        let names: Vec<_> = days[0]
            .iter()
            .flatten()
            .map(|s| s.location.name.clone())
            .collect();
        assert_eq!(names, vec!["Pune", "Lonavala"]);
    }

    #[test]
    fn test_reconcile_without_days_is_noop() {
        let mut days: Vec<DayStops> = Vec::new();
        assert!(!reconcile_destination(&mut days, &pune()));
    }
}
