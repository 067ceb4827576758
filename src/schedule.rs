//! Day schedule allocation
//!
//! Spreads the aggregated recommendations and the user's stops over the days
//! of the trip and fills a fixed-time daily plan. Derived on demand, never
//! stored.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{AreaKind, Location, LocationId, Recommendation, Restaurant};
use crate::planner::Itinerary;

/// Highlights selected per day
pub const HIGHLIGHTS_PER_DAY: usize = 3;
/// Own stops shown per day
pub const STOPS_PER_DAY: usize = 2;

const FALLBACK_RESTAURANT: &str = "local restaurant";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub time: String,
    pub label: String,
    pub activity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub day_index: usize,
    /// Area the day revolves around
    pub focus: String,
    pub stops: Vec<Location>,
    pub highlights: Vec<Recommendation>,
    pub dinner: String,
    pub slots: Vec<ScheduleSlot>,
}

impl DaySchedule {
    #[must_use]
    pub fn title(&self) -> String {
        format!("Day {}: {}", self.day_index + 1, self.focus)
    }
}

/// Build the schedule for every day of the itinerary
#[must_use]
pub fn allocate(
    itinerary: &Itinerary,
    recommendations: &[Recommendation],
    restaurants: &[Restaurant],
) -> Vec<DaySchedule> {
    let day_count = itinerary.day_count();
    let mut used: HashSet<usize> = HashSet::new();

    (0..day_count)
        .map(|day_index| {
            let day_stops: &[Location] = itinerary
                .days
                .get(day_index)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let picks = select_highlights(
                day_index,
                day_count,
                day_stops,
                recommendations,
                &mut used,
            );
            let highlights: Vec<Recommendation> =
                picks.iter().map(|&i| recommendations[i].clone()).collect();

            let focus = focus_for(day_index, day_count, day_stops, itinerary);
            let dinner = dinner_for(day_index, restaurants);
            let stops: Vec<Location> = day_stops.iter().take(STOPS_PER_DAY).cloned().collect();
            let slots = build_slots(
                day_index + 1 == day_count,
                &focus,
                &stops,
                &highlights,
                &dinner,
                itinerary,
            );

            DaySchedule {
                day_index,
                focus,
                stops,
                highlights,
                dinner,
                slots,
            }
        })
        .collect()
}

/// Area kinds to fall back on when the day's own stops do not provide
/// enough highlights
#[must_use]
pub fn fallback_kinds(day_index: usize, day_count: usize) -> Vec<AreaKind> {
    let is_first = day_index == 0;
    let is_last = day_index + 1 == day_count;
    match (is_first, is_last) {
        (true, true) => vec![AreaKind::Source, AreaKind::Destination],
        (true, false) => vec![AreaKind::Source],
        (false, true) => vec![AreaKind::Destination, AreaKind::Stop],
        (false, false) if day_index % 2 == 0 => vec![AreaKind::Source],
        (false, false) => vec![AreaKind::Destination],
    }
}

/// Indices of up to three recommendations for one day.
///
/// Candidates come from the day's own stops first, then from the fallback
/// areas. Recommendations not used on an earlier day win; used ones are
/// only taken when nothing fresh is left.
fn select_highlights(
    day_index: usize,
    day_count: usize,
    day_stops: &[Location],
    recommendations: &[Recommendation],
    used: &mut HashSet<usize>,
) -> Vec<usize> {
    let stop_ids: HashSet<LocationId> = day_stops.iter().map(|s| s.id).collect();

    let mut pools: Vec<Vec<usize>> = vec![
        recommendations
            .iter()
            .enumerate()
            .filter(|(_, r)| stop_ids.contains(&r.area_id))
            .map(|(i, _)| i)
            .collect(),
    ];
    for kind in fallback_kinds(day_index, day_count) {
        pools.push(
            recommendations
                .iter()
                .enumerate()
                .filter(|(_, r)| r.area_kind == kind)
                .map(|(i, _)| i)
                .collect(),
        );
    }

    let mut picks: Vec<usize> = Vec::new();
    for allow_used in [false, true] {
        for &index in pools.iter().flatten() {
            if picks.len() == HIGHLIGHTS_PER_DAY {
                break;
            }
            if picks.contains(&index) || (!allow_used && used.contains(&index)) {
                continue;
            }
            picks.push(index);
        }
    }

    used.extend(picks.iter().copied());
    picks
}

fn focus_for(
    day_index: usize,
    day_count: usize,
    day_stops: &[Location],
    itinerary: &Itinerary,
) -> String {
    let is_last = day_index + 1 == day_count;
    if is_last && day_count > 1 {
        return itinerary.destination.short_name().to_string();
    }
    if let Some(stop) = day_stops.first() {
        return stop.short_name().to_string();
    }
    if day_index % 2 == 0 {
        itinerary.source.short_name().to_string()
    } else {
        itinerary.destination.short_name().to_string()
    }
}

fn dinner_for(day_index: usize, restaurants: &[Restaurant]) -> String {
    if restaurants.is_empty() {
        return FALLBACK_RESTAURANT.to_string();
    }
    restaurants[day_index % restaurants.len()].name.clone()
}

fn build_slots(
    is_last: bool,
    focus: &str,
    stops: &[Location],
    highlights: &[Recommendation],
    dinner: &str,
    itinerary: &Itinerary,
) -> Vec<ScheduleSlot> {
    let visit = |index: usize, fallback: String| {
        highlights
            .get(index)
            .map(|r| format!("Visit {} ({})", r.name, r.kind.replace('_', " ")))
            .unwrap_or(fallback)
    };

    let breakfast = match stops {
        [] => "Breakfast and check out".to_string(),
        [only] => format!("Breakfast, then head to {}", only.short_name()),
        [first, second, ..] => format!(
            "Breakfast, then head to {} and {}",
            first.short_name(),
            second.short_name()
        ),
    };
    let night_label = if is_last { "Trip wrap-up" } else { "Overnight" };
    let closing = if is_last {
        format!(
            "Wrap up the trip in {}",
            itinerary.destination.short_name()
        )
    } else {
        format!("Overnight stay in {focus}")
    };

    let slot = |time: &str, label: &str, activity: String| ScheduleSlot {
        time: time.to_string(),
        label: label.to_string(),
        activity,
    };

    vec![
        slot("08:00", "Breakfast", breakfast),
        slot("09:30", "Morning activity", visit(0, format!("Explore {focus}"))),
        slot("12:30", "Lunch", format!("Lunch near {focus}")),
        slot(
            "14:00",
            "Afternoon activity",
            visit(1, format!("Discover the local markets of {focus}")),
        ),
        slot(
            "17:00",
            "Evening activity",
            visit(2, format!("Evening stroll around {focus}")),
        ),
        slot("19:30", "Dinner", format!("Dinner at {dinner}")),
        slot("21:30", night_label, closing),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Area;
    use rstest::rstest;

    struct Trip {
        itinerary: Itinerary,
        recs: Vec<Recommendation>,
    }

    fn rec(name: &str, location: &Location, kind: AreaKind) -> Recommendation {
        let area = Area::for_location(location, kind);
        Recommendation {
            name: name.to_string(),
            kind: "museum".to_string(),
            icon: "🏛️".to_string(),
            description: "Tourist attraction".to_string(),
            lat: location.lat,
            lng: location.lng,
            area: area.label,
            area_id: area.id,
            area_kind: area.kind,
        }
    }

    /// Mumbai → Pune over three days, Lonavala on day 2
    fn three_day_trip() -> Trip {
        let source = Location::new(19.076, 72.8777, "Mumbai");
        let destination = Location::new(18.5204, 73.8567, "Pune");
        let lonavala = Location::new(18.7546, 73.4062, "Lonavala");

        let mut recs = Vec::new();
        for i in 0..4 {
            recs.push(rec(&format!("Mumbai {i}"), &source, AreaKind::Source));
        }
        for i in 0..2 {
            recs.push(rec(&format!("Lonavala {i}"), &lonavala, AreaKind::Stop));
        }
        for i in 0..4 {
            recs.push(rec(&format!("Pune {i}"), &destination, AreaKind::Destination));
        }

        Trip {
            itinerary: Itinerary {
                source,
                destination: destination.clone(),
                days: vec![vec![], vec![lonavala], vec![destination]],
                trip_duration: Some(3),
            },
            recs,
        }
    }

    fn names(day: &DaySchedule) -> Vec<&str> {
        day.highlights.iter().map(|r| r.name.as_str()).collect()
    }

    #[rstest]
    #[case(0, 1, vec![AreaKind::Source, AreaKind::Destination])]
    #[case(0, 3, vec![AreaKind::Source])]
    #[case(2, 3, vec![AreaKind::Destination, AreaKind::Stop])]
    #[case(2, 5, vec![AreaKind::Source])]
    #[case(3, 5, vec![AreaKind::Destination])]
    fn test_fallback_kinds(
        #[case] day: usize,
        #[case] count: usize,
        #[case] expected: Vec<AreaKind>,
    ) {
        assert_eq!(fallback_kinds(day, count), expected);
    }

    #[test]
    fn test_three_day_allocation() {
        let trip = three_day_trip();
        let days = allocate(&trip.itinerary, &trip.recs, &[]);

        assert_eq!(days.len(), 3);
        assert_eq!(names(&days[0]), vec!["Mumbai 0", "Mumbai 1", "Mumbai 2"]);
        // Stop matches first, then the odd-day destination fallback
        assert_eq!(names(&days[1]), vec!["Lonavala 0", "Lonavala 1", "Pune 0"]);
        // The reconciled destination is the final day's stop
        assert_eq!(names(&days[2]), vec!["Pune 1", "Pune 2", "Pune 3"]);
        assert_eq!(days[1].stops[0].name, "Lonavala");
        assert_eq!(days[2].focus, "Pune");
    }

    #[test]
    fn test_used_recommendations_are_reused_only_when_exhausted() {
        let trip = three_day_trip();
        let recs: Vec<_> = trip
            .recs
            .into_iter()
            .filter(|r| r.area_kind == AreaKind::Source)
            .collect();
        let days = allocate(&trip.itinerary, &recs, &[]);

        assert_eq!(names(&days[0]), vec!["Mumbai 0", "Mumbai 1", "Mumbai 2"]);
        assert!(days[1].highlights.is_empty());
        // Day 3 has no destination or stop picks at all
        assert!(days[2].highlights.is_empty());
    }

    #[test]
    fn test_single_day_without_planning() {
        let trip = three_day_trip();
        let itinerary = Itinerary {
            days: vec![vec![]],
            trip_duration: None,
            ..trip.itinerary
        };
        let days = allocate(&itinerary, &trip.recs, &[]);
        assert_eq!(days.len(), 1);
        assert_eq!(names(&days[0]), vec!["Mumbai 0", "Mumbai 1", "Mumbai 2"]);
        assert_eq!(days[0].slots.last().unwrap().activity, "Wrap up the trip in Pune");
    }

    #[test]
    fn test_dinner_cycles_through_restaurants() {
        let trip = three_day_trip();
        let restaurants = vec![
            Restaurant {
                name: "Vaishali".to_string(),
                lat: 18.52,
                lng: 73.84,
                cuisine: None,
            },
            Restaurant {
                name: "Shabree".to_string(),
                lat: 18.51,
                lng: 73.85,
                cuisine: None,
            },
        ];
        let days = allocate(&trip.itinerary, &trip.recs, &restaurants);
        let dinners: Vec<_> = days.iter().map(|d| d.dinner.as_str()).collect();
        assert_eq!(dinners, vec!["Vaishali", "Shabree", "Vaishali"]);
    }

    #[test]
    fn test_dinner_falls_back_without_restaurants() {
        let trip = three_day_trip();
        let days = allocate(&trip.itinerary, &trip.recs, &[]);
        assert!(days.iter().all(|d| d.dinner == "local restaurant"));
        assert_eq!(days[0].slots[5].activity, "Dinner at local restaurant");
    }

    #[test]
    fn test_slots_have_fixed_times() {
        let trip = three_day_trip();
        let days = allocate(&trip.itinerary, &[], &[]);
        let times: Vec<_> = days[0].slots.iter().map(|s| s.time.as_str()).collect();
        assert_eq!(
            times,
            vec!["08:00", "09:30", "12:30", "14:00", "17:00", "19:30", "21:30"]
        );
        assert_eq!(days[0].slots[1].activity, "Explore Mumbai");
        assert_eq!(days[1].slots[0].activity, "Breakfast, then head to Lonavala");
        assert_eq!(days[0].title(), "Day 1: Mumbai");
    }
}
