//! Debounced place suggestions for the search inputs
//!
//! Every keystroke bumps a per-field generation counter. A lookup only runs
//! after the quiet period if no newer keystroke arrived, and its response is
//! dropped when the field moved on while the request was in flight.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::location_resolver::MIN_SUGGEST_CHARS;
use crate::planner::StopId;
use crate::services::{GeocodeResult, Geocoder};
use crate::{Result, TripPlannerError};

/// Quiet period after the last keystroke
pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Input box a query was typed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    Source,
    Destination,
    Stop(StopId),
}

/// Kind of input box as named by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Source,
    Destination,
    Stop,
}

impl InputField {
    /// Assemble a field from its kind; stops also need the day and slot
    pub fn from_parts(kind: FieldKind, day: Option<usize>, stop: Option<usize>) -> Result<Self> {
        match (kind, day, stop) {
            (FieldKind::Source, ..) => Ok(InputField::Source),
            (FieldKind::Destination, ..) => Ok(InputField::Destination),
            (FieldKind::Stop, Some(day), Some(stop)) => Ok(InputField::Stop(StopId::new(day, stop))),
            (FieldKind::Stop, ..) => Err(TripPlannerError::validation(
                "A stop field needs both a day and a stop index",
            )),
        }
    }
}

/// What a keystroke resulted in
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestOutcome {
    /// Fresh suggestions for the field
    Suggestions(Vec<GeocodeResult>),
    /// Query too short; the suggestion list should be emptied
    Cleared,
    /// A newer keystroke took over; nothing to show
    Superseded,
}

pub struct Autocomplete {
    geocoder: Arc<dyn Geocoder>,
    generations: Mutex<HashMap<InputField, u64>>,
    debounce: Duration,
}

impl Autocomplete {
    #[must_use]
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self::with_debounce(geocoder, DEBOUNCE)
    }

    #[must_use]
    pub fn with_debounce(geocoder: Arc<dyn Geocoder>, debounce: Duration) -> Self {
        Self {
            geocoder,
            generations: Mutex::new(HashMap::new()),
            debounce,
        }
    }

    fn bump(&self, field: InputField) -> Result<u64> {
        let mut generations = self
            .generations
            .lock()
            .map_err(|_| TripPlannerError::general("Autocomplete state poisoned"))?;
        let generation = generations.entry(field).or_insert(0);
        *generation += 1;
        Ok(*generation)
    }

    fn is_current(&self, field: InputField, generation: u64) -> Result<bool> {
        let generations = self
            .generations
            .lock()
            .map_err(|_| TripPlannerError::general("Autocomplete state poisoned"))?;
        Ok(generations.get(&field).copied() == Some(generation))
    }

    /// Invalidate anything in flight for the field, e.g. after a suggestion
    /// was picked
    pub fn cancel(&self, field: InputField) -> Result<()> {
        self.bump(field).map(|_| ())
    }

    /// Handle one keystroke's worth of input for a field
    #[instrument(skip(self))]
    pub async fn on_input(&self, field: InputField, query: &str) -> Result<SuggestOutcome> {
        let generation = self.bump(field)?;
        let query = query.trim();
        if query.chars().count() < MIN_SUGGEST_CHARS {
            return Ok(SuggestOutcome::Cleared);
        }

        tokio::time::sleep(self.debounce).await;
        if !self.is_current(field, generation)? {
            debug!("Superseded before lookup");
            return Ok(SuggestOutcome::Superseded);
        }

        let results = self.geocoder.search(query).await?;
        if !self.is_current(field, generation)? {
            debug!("Discarding stale suggestions");
            return Ok(SuggestOutcome::Superseded);
        }
        Ok(SuggestOutcome::Suggestions(results))
    }
}
