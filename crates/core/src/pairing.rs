//! Dish pairings and rating validation.
//!
//! A meal has two structural main/side blocks. Each main is paired with a
//! starch side (`a`) and a vegetable side (`b`), which gives up to four
//! observable pairings per (day, meal, location).

use crate::error::CoreError;
use crate::grid::SlotState;
use crate::rotation::Course;
use crate::types::DbId;

/// Lowest accepted rating.
pub const MIN_RATING: i16 = 1;

/// Highest accepted rating.
pub const MAX_RATING: i16 = 5;

/// Maximum number of ratings accepted in one submission.
pub const MAX_BATCH_SIZE: usize = 50;

/// Maximum length of a rating comment, in characters.
pub const MAX_COMMENT_LEN: usize = 2000;

// ---------------------------------------------------------------------------
// PairingType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairingType {
    MainStarch,
    MainVeggie,
}

impl PairingType {
    pub const ALL: [PairingType; 2] = [PairingType::MainStarch, PairingType::MainVeggie];

    pub fn as_str(&self) -> &'static str {
        match self {
            PairingType::MainStarch => "main_starch",
            PairingType::MainVeggie => "main_veggie",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

/// The structural (main, side, pairing type) combinations of a meal.
pub const STRUCTURAL_PAIRINGS: [(Course, Course, PairingType); 4] = [
    (Course::Main1, Course::Side1a, PairingType::MainStarch),
    (Course::Main1, Course::Side1b, PairingType::MainVeggie),
    (Course::Main2, Course::Side2a, PairingType::MainStarch),
    (Course::Main2, Course::Side2b, PairingType::MainVeggie),
];

/// Pairing type implied by combining `main` with `side`, if they form one.
pub fn pairing_type_for(main: Course, side: Course) -> Option<PairingType> {
    STRUCTURAL_PAIRINGS
        .iter()
        .find(|(m, s, _)| *m == main && *s == side)
        .map(|(_, _, t)| *t)
}

// ---------------------------------------------------------------------------
// Observable pairings
// ---------------------------------------------------------------------------

/// A pairing that can be shown to a rater because both slots are filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservablePairing {
    pub main_course: Course,
    pub side_course: Course,
    pub pairing_type: PairingType,
    pub main_recipe_id: DbId,
    pub side_recipe_id: DbId,
}

/// List the observable pairings among the slots of one (day, meal, location).
///
/// Pairings whose main or side slot is missing or empty are left out.
pub fn observable_pairings(slots: &[SlotState]) -> Vec<ObservablePairing> {
    let recipe_for = |course: Course| {
        slots
            .iter()
            .find(|s| s.course == course.as_str())
            .and_then(|s| s.recipe_id)
    };

    STRUCTURAL_PAIRINGS
        .iter()
        .filter_map(|&(main_course, side_course, pairing_type)| {
            Some(ObservablePairing {
                main_course,
                side_course,
                pairing_type,
                main_recipe_id: recipe_for(main_course)?,
                side_recipe_id: recipe_for(side_course)?,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_rating(rating: i16) -> Result<(), CoreError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CoreError::Validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )));
    }
    Ok(())
}

pub fn validate_pairing_type(pairing_type: &str) -> Result<PairingType, CoreError> {
    PairingType::parse(pairing_type)
        .ok_or_else(|| CoreError::Validation(format!("Unknown pairing_type '{pairing_type}'")))
}

pub fn validate_comment(comment: Option<&str>) -> Result<(), CoreError> {
    if let Some(c) = comment {
        if c.chars().count() > MAX_COMMENT_LEN {
            return Err(CoreError::Validation(format!(
                "comment must be at most {MAX_COMMENT_LEN} characters"
            )));
        }
    }
    Ok(())
}

pub fn validate_batch_size(len: usize) -> Result<(), CoreError> {
    if len == 0 {
        return Err(CoreError::Validation("ratings must not be empty".into()));
    }
    if len > MAX_BATCH_SIZE {
        return Err(CoreError::Validation(format!(
            "at most {MAX_BATCH_SIZE} ratings per submission, got {len}"
        )));
    }
    Ok(())
}

/// A dish must be identified by id or by a non-blank name.
pub fn validate_dish_reference(
    role: &str,
    recipe_id: Option<DbId>,
    name: Option<&str>,
) -> Result<(), CoreError> {
    let has_name = name.is_some_and(|n| !n.trim().is_empty());
    if recipe_id.is_none() && !has_name {
        return Err(CoreError::Validation(format!(
            "{role} dish needs either a recipe id or a name"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(course: Course, recipe: Option<DbId>) -> SlotState {
        SlotState {
            id: 0,
            week_nr: 1,
            day_of_week: 1,
            meal: "lunch".into(),
            location_slug: "city".into(),
            course: course.as_str().into(),
            recipe_id: recipe,
        }
    }

    #[test]
    fn full_meal_has_four_pairings() {
        let slots: Vec<_> = Course::ALL
            .iter()
            .enumerate()
            .map(|(i, c)| slot(*c, Some(i as DbId + 1)))
            .collect();
        let pairings = observable_pairings(&slots);
        assert_eq!(pairings.len(), 4);
        assert_eq!(pairings[0].main_recipe_id, 2);
        assert_eq!(pairings[0].side_recipe_id, 3);
        assert_eq!(pairings[0].pairing_type, PairingType::MainStarch);
    }

    #[test]
    fn empty_side_drops_its_pairing() {
        let slots = vec![
            slot(Course::Main1, Some(1)),
            slot(Course::Side1a, Some(2)),
            slot(Course::Side1b, None),
        ];
        let pairings = observable_pairings(&slots);
        assert_eq!(pairings.len(), 1);
        assert_eq!(pairings[0].side_course, Course::Side1a);
    }

    #[test]
    fn structural_lookup() {
        assert_eq!(
            pairing_type_for(Course::Main2, Course::Side2b),
            Some(PairingType::MainVeggie)
        );
        assert_eq!(pairing_type_for(Course::Main1, Course::Side2a), None);
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn pairing_type_vocabulary() {
        assert_eq!(validate_pairing_type("main_starch").unwrap(), PairingType::MainStarch);
        assert!(validate_pairing_type("main_dessert").is_err());
    }

    #[test]
    fn batch_must_be_non_empty_and_bounded() {
        assert!(validate_batch_size(0).is_err());
        assert!(validate_batch_size(1).is_ok());
        assert!(validate_batch_size(MAX_BATCH_SIZE + 1).is_err());
    }

    #[test]
    fn dish_reference_needs_id_or_name() {
        assert!(validate_dish_reference("main", Some(1), None).is_ok());
        assert!(validate_dish_reference("main", None, Some("Goulash")).is_ok());
        assert!(validate_dish_reference("main", None, Some("  ")).is_err());
        assert!(validate_dish_reference("side", None, None).is_err());
    }
}
