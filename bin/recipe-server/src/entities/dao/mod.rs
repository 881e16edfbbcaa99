pub mod recipe;

pub use recipe::{NewRecipe, Recipe, RecipeUpdate, TIMESTAMP_FORMAT, format_timestamp, now_timestamp};
