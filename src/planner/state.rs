//! Session state: source, destination and the per-day stop structure
//!
//! All mutation goes through the transition methods on [`TripState`]; the
//! derived views (flattened stops, waypoints) live in [`super::itinerary`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::itinerary::{self, Itinerary};
use crate::models::Location;
use crate::routing::RoutePreference;
use crate::{Result, TripPlannerError};

/// Longest trip that can be planned day by day
pub const MAX_TRIP_DAYS: u8 = 7;

/// Typed address of a stop slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StopId {
    pub day_index: usize,
    pub stop_index: usize,
}

impl StopId {
    #[must_use]
    pub fn new(day_index: usize, stop_index: usize) -> Self {
        Self {
            day_index,
            stop_index,
        }
    }
}

/// How a stop got into the day structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopOrigin {
    /// Picked by the user
    User,
    /// Inserted by destination reconciliation
    Destination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub location: Location,
    pub origin: StopOrigin,
}

impl Stop {
    #[must_use]
    pub fn user(location: Location) -> Self {
        Self {
            location,
            origin: StopOrigin::User,
        }
    }
}

/// One day's stops; `None` marks a placeholder awaiting input
pub type DayStops = Vec<Option<Stop>>;

/// In-memory trip state for one planning session
#[derive(Debug, Clone)]
pub struct TripState {
    source: Option<Location>,
    destination: Option<Location>,
    days: Vec<DayStops>,
    trip_duration: Option<u8>,
    preference: RoutePreference,
}

impl Default for TripState {
    fn default() -> Self {
        Self {
            source: None,
            destination: None,
            // Without a trip duration all stops live on a single implicit day.
            days: vec![Vec::new()],
            trip_duration: None,
            preference: RoutePreference::Default,
        }
    }
}

impl TripState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn source(&self) -> Option<&Location> {
        self.source.as_ref()
    }

    #[must_use]
    pub fn destination(&self) -> Option<&Location> {
        self.destination.as_ref()
    }

    #[must_use]
    pub fn days(&self) -> &[DayStops] {
        &self.days
    }

    #[must_use]
    pub fn trip_duration(&self) -> Option<u8> {
        self.trip_duration
    }

    #[must_use]
    pub fn preference(&self) -> RoutePreference {
        self.preference
    }

    /// Day-based planning is active once a trip duration has been set
    #[must_use]
    pub fn is_day_planning(&self) -> bool {
        self.trip_duration.is_some()
    }

    pub fn set_source(&mut self, location: Location) {
        debug!("Source set to {}", location.name);
        self.source = Some(location);
    }

    /// Replace the destination; with day planning active the final day is
    /// reconciled immediately.
    pub fn set_destination(&mut self, location: Location) {
        debug!("Destination set to {}", location.name);
        self.destination = Some(location);
        if self.is_day_planning() {
            self.reconcile_destination();
        }
    }

    pub fn set_preference(&mut self, preference: RoutePreference) {
        self.preference = preference;
    }

    /// Switch to day-based planning with `days` day-slots.
    ///
    /// Rebuilds the whole structure: every day starts with one empty
    /// placeholder and prior stop assignments are discarded.
    pub fn set_day_count(&mut self, days: u8) -> Result<()> {
        if !(1..=MAX_TRIP_DAYS).contains(&days) {
            return Err(TripPlannerError::validation(format!(
                "Trip duration must be between 1 and {MAX_TRIP_DAYS} days"
            )));
        }

        self.trip_duration = Some(days);
        self.days = (0..days).map(|_| vec![None]).collect();
        debug!("Day structure rebuilt for {} days", days);
        Ok(())
    }

    /// Append an empty placeholder to a day and return its id
    pub fn add_stop(&mut self, day_index: usize) -> Result<StopId> {
        let day = self.day_mut(day_index)?;
        day.push(None);
        Ok(StopId::new(day_index, day.len() - 1))
    }

    /// Fill (or replace) an existing stop slot
    pub fn set_stop(&mut self, id: StopId, location: Location) -> Result<()> {
        let slot = self
            .day_mut(id.day_index)?
            .get_mut(id.stop_index)
            .ok_or_else(|| {
                TripPlannerError::validation(format!(
                    "Day {} has no stop {}",
                    id.day_index + 1,
                    id.stop_index + 1
                ))
            })?;
        *slot = Some(Stop::user(location));
        Ok(())
    }

    /// Remove a stop slot; later slots of the same day shift down by one
    pub fn remove_stop(&mut self, id: StopId) -> Result<Option<Stop>> {
        let day = self.day_mut(id.day_index)?;
        if id.stop_index >= day.len() {
            return Err(TripPlannerError::validation(format!(
                "Day {} has no stop {}",
                id.day_index + 1,
                id.stop_index + 1
            )));
        }
        Ok(day.remove(id.stop_index))
    }

    /// Put the destination at the head of the final day, if day planning is
    /// active and a destination is known. Returns whether anything changed.
    pub fn reconcile_destination(&mut self) -> bool {
        match (&self.destination, self.trip_duration) {
            (Some(destination), Some(_)) => {
                itinerary::reconcile_destination(&mut self.days, destination)
            }
            _ => false,
        }
    }

    /// Non-null stops in day order, then insertion order
    #[must_use]
    pub fn flatten_stops(&self) -> Vec<Location> {
        itinerary::flatten_stops(&self.days)
    }

    /// Routing waypoints, or `None` when fewer than two points are known
    #[must_use]
    pub fn waypoints(&self) -> Option<Vec<Location>> {
        itinerary::waypoints(self.source.as_ref(), &self.days, self.destination.as_ref())
    }

    /// Snapshot of the trip, available once source and destination are set
    #[must_use]
    pub fn itinerary(&self) -> Option<Itinerary> {
        let source = self.source.clone()?;
        let destination = self.destination.clone()?;
        Some(Itinerary {
            source,
            destination,
            days: self
                .days
                .iter()
                .map(|day| day.iter().flatten().map(|s| s.location.clone()).collect())
                .collect(),
            trip_duration: self.trip_duration,
        })
    }

    /// Forget everything and return to the initial state
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn day_mut(&mut self, day_index: usize) -> Result<&mut DayStops> {
        let count = self.days.len();
        self.days.get_mut(day_index).ok_or_else(|| {
            TripPlannerError::validation(format!(
                "Day {} does not exist (trip has {count} days)",
                day_index + 1
            ))
        })
    }
}
