//! Projection of one rotation week onto concrete calendar dates.
//!
//! The result is keyed by location slug; the `api` layer resolves slugs to
//! location ids before writing `menu_plans` rows.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::calendar::date_for_day;
use crate::grid::SlotState;
use crate::rotation::{normalize_meal, Meal, MIRROR_LOCATION, PRIMARY_LOCATION};
use crate::types::DbId;

/// One dated menu entry ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMeal {
    pub date: NaiveDate,
    pub meal: String,
    pub course: String,
    pub recipe_id: DbId,
    pub location_slug: String,
}

type EntryKey = (NaiveDate, String, String, String);

/// Project the filled slots of one rotation week onto the week starting at
/// `monday`.
///
/// - Slots without a recipe produce nothing.
/// - Meals are mapped to the menu-plan vocabulary via [`normalize_meal`].
/// - Every primary-location lunch entry is copied to the mirror location.
///   The copy replaces whatever the mirror location's own lunch slot holds
///   for the same date and course, so each (date, meal, location, course)
///   yields at most one entry.
///
/// Output is ordered by date, meal, location, course.
pub fn project_week(monday: NaiveDate, slots: &[SlotState]) -> Vec<PlannedMeal> {
    let lunch = Meal::Lunch.as_str();
    let mut entries: BTreeMap<EntryKey, DbId> = BTreeMap::new();
    let mut mirrored: Vec<(EntryKey, DbId)> = Vec::new();

    for slot in slots {
        let Some(recipe_id) = slot.recipe_id else {
            continue;
        };
        let date = date_for_day(monday, slot.day_of_week);
        let meal = normalize_meal(&slot.meal);

        if slot.location_slug == PRIMARY_LOCATION && meal == lunch {
            mirrored.push((
                (date, meal.clone(), MIRROR_LOCATION.to_string(), slot.course.clone()),
                recipe_id,
            ));
        }

        entries.insert(
            (date, meal, slot.location_slug.clone(), slot.course.clone()),
            recipe_id,
        );
    }

    // Mirrors are applied last so they win over the mirror location's own lunch.
    entries.extend(mirrored);

    entries
        .into_iter()
        .map(|((date, meal, location_slug, course), recipe_id)| PlannedMeal {
            date,
            meal,
            course,
            recipe_id,
            location_slug,
        })
        .collect()
}
