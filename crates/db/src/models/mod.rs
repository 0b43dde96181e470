//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO for patches, where the entity is mutable

pub mod feedback;
pub mod learned_rule;
pub mod location;
pub mod menu_plan;
pub mod recipe;
pub mod rotation;
