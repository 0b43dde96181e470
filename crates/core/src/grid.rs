//! Rotation grid geometry.
//!
//! A template's grid is the cartesian product of
//! `weeks x days x meals x locations x courses`. The functions here compute
//! which cells a template should have and which of those are missing, so the
//! repository layer only ever inserts cells that do not exist yet.

use std::collections::HashSet;

use crate::rotation::{Course, Meal, DAYS_PER_WEEK, LOCATIONS};
use crate::types::DbId;

/// Address of one rotation slot within a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub week_nr: i32,
    pub day_of_week: i16,
    pub meal: String,
    pub location_slug: String,
    pub course: String,
}

impl SlotKey {
    pub fn new(week_nr: i32, day_of_week: i16, meal: Meal, location_slug: &str, course: Course) -> Self {
        Self {
            week_nr,
            day_of_week,
            meal: meal.as_str().to_string(),
            location_slug: location_slug.to_string(),
            course: course.as_str().to_string(),
        }
    }
}

/// Current state of one persisted slot, as read by the planners.
#[derive(Debug, Clone)]
pub struct SlotState {
    pub id: DbId,
    pub week_nr: i32,
    pub day_of_week: i16,
    pub meal: String,
    pub location_slug: String,
    pub course: String,
    pub recipe_id: Option<DbId>,
}

/// Number of cells in a complete grid for `week_count` weeks.
pub fn grid_size(week_count: i32) -> usize {
    week_count.max(0) as usize
        * DAYS_PER_WEEK as usize
        * Meal::ALL.len()
        * LOCATIONS.len()
        * Course::ALL.len()
}

/// Every cell of one location's sub-grid, ordered week, day, meal, course.
pub fn location_grid(week_count: i32, location_slug: &str) -> Vec<SlotKey> {
    let mut keys = Vec::new();
    for week_nr in 1..=week_count {
        for day_of_week in 0..DAYS_PER_WEEK {
            for meal in Meal::ALL {
                for course in Course::ALL {
                    keys.push(SlotKey::new(week_nr, day_of_week, meal, location_slug, course));
                }
            }
        }
    }
    keys
}

/// Every cell of the full grid across both locations.
pub fn full_grid(week_count: i32) -> Vec<SlotKey> {
    LOCATIONS
        .iter()
        .flat_map(|slug| location_grid(week_count, slug))
        .collect()
}

/// Cells that provisioning should insert given the cells that already exist.
///
/// - No existing cells: the full grid.
/// - A location with no cells at all: that location's full sub-grid.
/// - Otherwise nothing; partially populated locations are left alone.
///
/// The result never contains a key that is already in `existing`.
pub fn plan_provisioning(week_count: i32, existing: &[SlotKey]) -> Vec<SlotKey> {
    let present: HashSet<&SlotKey> = existing.iter().collect();
    let populated: HashSet<&str> = existing.iter().map(|k| k.location_slug.as_str()).collect();

    LOCATIONS
        .iter()
        .filter(|slug| !populated.contains(**slug))
        .flat_map(|slug| location_grid(week_count, slug))
        .filter(|key| !present.contains(key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::{MIRROR_LOCATION, PRIMARY_LOCATION};

    #[test]
    fn six_week_grid_has_1344_cells() {
        assert_eq!(grid_size(6), 1344);
        assert_eq!(full_grid(6).len(), 1344);
    }

    #[test]
    fn full_grid_keys_are_unique() {
        let grid = full_grid(2);
        let unique: HashSet<_> = grid.iter().collect();
        assert_eq!(unique.len(), grid.len());
    }

    #[test]
    fn empty_template_gets_everything() {
        assert_eq!(plan_provisioning(6, &[]).len(), 1344);
    }

    #[test]
    fn complete_template_gets_nothing() {
        let existing = full_grid(3);
        assert!(plan_provisioning(3, &existing).is_empty());
    }

    #[test]
    fn missing_location_is_backfilled_only() {
        let existing = location_grid(2, PRIMARY_LOCATION);
        let planned = plan_provisioning(2, &existing);
        assert_eq!(planned.len(), existing.len());
        assert!(planned.iter().all(|k| k.location_slug == MIRROR_LOCATION));
    }

    #[test]
    fn partially_populated_location_is_not_touched() {
        let mut existing = location_grid(1, PRIMARY_LOCATION);
        existing.truncate(10);
        existing.extend(location_grid(1, MIRROR_LOCATION));
        assert!(plan_provisioning(1, &existing).is_empty());
    }

    #[test]
    fn zero_weeks_is_empty() {
        assert_eq!(grid_size(0), 0);
        assert!(full_grid(0).is_empty());
    }
}
