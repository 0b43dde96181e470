//! Rotation vocabulary: course kinds, meals, recipe categories and the two
//! fixed kitchen locations.
//!
//! Every string constant here matches what is stored in the database, so the
//! `db` and `api` crates round-trip through [`Course::parse`] and friends
//! instead of duplicating the literals.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of weeks in a freshly provisioned rotation template.
pub const DEFAULT_WEEK_COUNT: i32 = 6;

/// Name given to the template created by `ensure_default_template`.
pub const DEFAULT_TEMPLATE_NAME: &str = "Default rotation";

/// Days per rotation week. Day 0 is Sunday, 1 is Monday, ... 6 is Saturday.
pub const DAYS_PER_WEEK: i16 = 7;

/// Location whose lunch menu is authoritative.
pub const PRIMARY_LOCATION: &str = "city";

/// Location that receives a copy of the primary lunch menu.
pub const MIRROR_LOCATION: &str = "campus";

/// Both fixed locations, in grid provisioning order.
pub const LOCATIONS: [&str; 2] = [PRIMARY_LOCATION, MIRROR_LOCATION];

// ---------------------------------------------------------------------------
// RecipeCategory
// ---------------------------------------------------------------------------

/// Recipe category as tagged by the recipe catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecipeCategory {
    ClearSoups,
    CreamSoups,
    MainMeat,
    MainFish,
    MainVegan,
    Sides,
    Salads,
    HotDesserts,
    ColdDesserts,
}

impl RecipeCategory {
    pub const ALL: [RecipeCategory; 9] = [
        RecipeCategory::ClearSoups,
        RecipeCategory::CreamSoups,
        RecipeCategory::MainMeat,
        RecipeCategory::MainFish,
        RecipeCategory::MainVegan,
        RecipeCategory::Sides,
        RecipeCategory::Salads,
        RecipeCategory::HotDesserts,
        RecipeCategory::ColdDesserts,
    ];

    /// String representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeCategory::ClearSoups => "ClearSoups",
            RecipeCategory::CreamSoups => "CreamSoups",
            RecipeCategory::MainMeat => "MainMeat",
            RecipeCategory::MainFish => "MainFish",
            RecipeCategory::MainVegan => "MainVegan",
            RecipeCategory::Sides => "Sides",
            RecipeCategory::Salads => "Salads",
            RecipeCategory::HotDesserts => "HotDesserts",
            RecipeCategory::ColdDesserts => "ColdDesserts",
        }
    }

    /// Parse a stored category. Unknown categories return `None` so that
    /// catalog entries outside the fixed set are simply never scheduled.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

// ---------------------------------------------------------------------------
// Course
// ---------------------------------------------------------------------------

/// One of the eight structural roles in a meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Course {
    Soup,
    Main1,
    Side1a,
    Side1b,
    Main2,
    Side2a,
    Side2b,
    Dessert,
}

impl Course {
    /// All course kinds in menu order.
    pub const ALL: [Course; 8] = [
        Course::Soup,
        Course::Main1,
        Course::Side1a,
        Course::Side1b,
        Course::Main2,
        Course::Side2a,
        Course::Side2b,
        Course::Dessert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Course::Soup => "soup",
            Course::Main1 => "main1",
            Course::Side1a => "side1a",
            Course::Side1b => "side1b",
            Course::Main2 => "main2",
            Course::Side2a => "side2a",
            Course::Side2b => "side2b",
            Course::Dessert => "dessert",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }

    /// Recipe categories eligible for this course.
    pub fn categories(&self) -> &'static [RecipeCategory] {
        use RecipeCategory::*;
        match self {
            Course::Soup => &[ClearSoups, CreamSoups],
            Course::Main1 => &[MainMeat, MainFish],
            Course::Side1a => &[Sides],
            Course::Side1b => &[Sides, Salads],
            Course::Main2 => &[MainVegan],
            Course::Side2a => &[Sides],
            Course::Side2b => &[Sides, Salads],
            Course::Dessert => &[HotDesserts, ColdDesserts],
        }
    }

    /// Whether a recipe of `category` may be placed in this course.
    pub fn accepts(&self, category: RecipeCategory) -> bool {
        self.categories().contains(&category)
    }
}

// ---------------------------------------------------------------------------
// Meal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Meal {
    Lunch,
    Dinner,
}

impl Meal {
    pub const ALL: [Meal; 2] = [Meal::Lunch, Meal::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Meal::Lunch => "lunch",
            Meal::Dinner => "dinner",
        }
    }

    /// Parse a meal name, accepting the legacy kitchen vocabulary
    /// (`mittag`, `abend`) alongside the canonical names.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lunch" | "mittag" => Some(Meal::Lunch),
            "dinner" | "abend" => Some(Meal::Dinner),
            _ => None,
        }
    }
}

/// Map a stored meal value to the menu-plan vocabulary.
///
/// Known aliases collapse to `lunch`/`dinner`; anything else passes through
/// unchanged.
pub fn normalize_meal(raw: &str) -> String {
    match Meal::parse(raw) {
        Some(meal) => meal.as_str().to_string(),
        None => raw.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a rotation week number against the template's week count.
pub fn validate_week_nr(week_nr: i32, week_count: i32) -> Result<(), CoreError> {
    if week_nr < 1 || week_nr > week_count {
        return Err(CoreError::Validation(format!(
            "week_nr must be between 1 and {week_count}, got {week_nr}"
        )));
    }
    Ok(())
}

/// Validate a day-of-week index (0 = Sunday .. 6 = Saturday).
pub fn validate_day_of_week(day_of_week: i16) -> Result<(), CoreError> {
    if !(0..DAYS_PER_WEEK).contains(&day_of_week) {
        return Err(CoreError::Validation(format!(
            "day_of_week must be between 0 and 6, got {day_of_week}"
        )));
    }
    Ok(())
}

/// Validate a course name.
pub fn validate_course(course: &str) -> Result<Course, CoreError> {
    Course::parse(course)
        .ok_or_else(|| CoreError::Validation(format!("Unknown course '{course}'")))
}

/// Validate that a location slug is one of the fixed locations.
pub fn validate_location(slug: &str) -> Result<(), CoreError> {
    if LOCATIONS.contains(&slug) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Unknown location '{slug}'")))
    }
}
