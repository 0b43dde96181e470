pub mod feedback;
pub mod menu_plans;
pub mod rotation;
pub mod rules;
