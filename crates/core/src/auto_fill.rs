//! Auto-fill planner for rotation slots.
//!
//! Given the recipe catalog and a template's slots, decide which recipe goes
//! into which slot. The planner is pure: it returns a list of assignments and
//! the `api` layer persists them one by one.
//!
//! Pools are built per course kind from the union of its mapped categories
//! and shuffled once per run, then consumed round-robin. A per-day set of used
//! recipe ids (spanning every location, meal and course of that calendar day)
//! keeps a dish from appearing twice on the same day whenever the pool is
//! large enough to avoid it.

use std::collections::{BTreeMap, HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::SlotState;
use crate::rotation::{Course, Meal, RecipeCategory};
use crate::types::DbId;

/// A catalog entry as seen by the planner.
#[derive(Debug, Clone)]
pub struct CatalogRecipe {
    pub id: DbId,
    pub category: String,
}

/// A recipe chosen for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub slot_id: DbId,
    pub recipe_id: DbId,
}

/// Result of a planning run.
#[derive(Debug, Clone, Default)]
pub struct AutoFillPlan {
    pub assignments: Vec<Assignment>,
    pub filled: usize,
    pub skipped: usize,
    /// Skip count per course name, including courses with zero skips.
    pub skipped_by_course: BTreeMap<String, usize>,
}

// ---------------------------------------------------------------------------
// Pools
// ---------------------------------------------------------------------------

/// Round-robin pool of candidate recipe ids for one course kind.
#[derive(Debug, Clone, Default)]
struct CoursePool {
    candidates: Vec<DbId>,
    cursor: usize,
}

impl CoursePool {
    fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    fn advance(&mut self) -> DbId {
        let candidate = self.candidates[self.cursor];
        self.cursor = (self.cursor + 1) % self.candidates.len();
        candidate
    }

    /// Next candidate not yet used today.
    ///
    /// Tries at most `candidates.len()` times. When every candidate collides
    /// the next one in rotation is returned anyway: a complete menu for the
    /// day wins over strict no-repeat.
    fn next_avoiding(&mut self, used_today: &HashSet<DbId>) -> DbId {
        for _ in 0..self.candidates.len() {
            let candidate = self.advance();
            if !used_today.contains(&candidate) {
                return candidate;
            }
        }
        self.advance()
    }
}

/// Bucket recipes by category, dropping anything outside the fixed set.
pub fn bucket_by_category(recipes: &[CatalogRecipe]) -> HashMap<RecipeCategory, Vec<DbId>> {
    let mut buckets: HashMap<RecipeCategory, Vec<DbId>> = HashMap::new();
    for recipe in recipes {
        if let Some(category) = RecipeCategory::parse(&recipe.category) {
            buckets.entry(category).or_default().push(recipe.id);
        }
    }
    buckets
}

fn build_pools<R: Rng + ?Sized>(
    buckets: &HashMap<RecipeCategory, Vec<DbId>>,
    rng: &mut R,
) -> HashMap<Course, CoursePool> {
    Course::ALL
        .into_iter()
        .map(|course| {
            let mut candidates: Vec<DbId> = course
                .categories()
                .iter()
                .filter_map(|c| buckets.get(c))
                .flatten()
                .copied()
                .collect();
            candidates.shuffle(rng);
            (course, CoursePool { candidates, cursor: 0 })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Sort position of a course within a meal; unknown courses go last.
fn course_rank(course: &str) -> usize {
    Course::parse(course)
        .and_then(|c| Course::ALL.iter().position(|k| *k == c))
        .unwrap_or(Course::ALL.len())
}

/// Lunch before dinner; unrecognised meals after both.
fn meal_rank(meal: &str) -> usize {
    Meal::parse(meal)
        .and_then(|m| Meal::ALL.iter().position(|k| *k == m))
        .unwrap_or(Meal::ALL.len())
}

type GroupKey<'a> = (&'a str, usize, &'a str);

/// Plan recipe assignments for `slots`.
///
/// Slots are visited exactly once, grouped by (week, day, location, meal)
/// and processed week by week, day by day. A filled slot is left alone unless
/// `overwrite` is set; either way its recipe counts as used for the day.
/// Slots whose course has an empty pool (or an unknown course name) are
/// counted as skipped.
pub fn plan_auto_fill<R: Rng + ?Sized>(
    recipes: &[CatalogRecipe],
    slots: &[SlotState],
    overwrite: bool,
    rng: &mut R,
) -> AutoFillPlan {
    let buckets = bucket_by_category(recipes);
    let mut pools = build_pools(&buckets, rng);

    // (week, day) -> (location, meal) -> slots
    let mut days: BTreeMap<(i32, i16), BTreeMap<GroupKey<'_>, Vec<&SlotState>>> = BTreeMap::new();
    for slot in slots {
        days.entry((slot.week_nr, slot.day_of_week))
            .or_default()
            .entry((
                slot.location_slug.as_str(),
                meal_rank(&slot.meal),
                slot.meal.as_str(),
            ))
            .or_default()
            .push(slot);
    }

    let mut plan = AutoFillPlan::default();
    for course in Course::ALL {
        plan.skipped_by_course.insert(course.as_str().to_string(), 0);
    }

    for groups in days.into_values() {
        // Kept recipes are known up front, so register them before any
        // assignment is made for the day.
        let mut used_today: HashSet<DbId> = if overwrite {
            HashSet::new()
        } else {
            groups
                .values()
                .flatten()
                .filter_map(|s| s.recipe_id)
                .collect()
        };

        for mut group in groups.into_values() {
            group.sort_by_key(|s| (course_rank(&s.course), s.id));

            for slot in group {
                if let (Some(existing), false) = (slot.recipe_id, overwrite) {
                    used_today.insert(existing);
                    plan.record_skip(&slot.course);
                    continue;
                }

                let pool = Course::parse(&slot.course).and_then(|c| pools.get_mut(&c));
                match pool {
                    Some(pool) if !pool.is_empty() => {
                        let recipe_id = pool.next_avoiding(&used_today);
                        used_today.insert(recipe_id);
                        plan.assignments.push(Assignment {
                            slot_id: slot.id,
                            recipe_id,
                        });
                        plan.filled += 1;
                    }
                    _ => {
                        if let Some(existing) = slot.recipe_id {
                            used_today.insert(existing);
                        }
                        plan.record_skip(&slot.course);
                    }
                }
            }
        }
    }

    plan
}

impl AutoFillPlan {
    fn record_skip(&mut self, course: &str) {
        self.skipped += 1;
        *self.skipped_by_course.entry(course.to_string()).or_insert(0) += 1;
    }
}
