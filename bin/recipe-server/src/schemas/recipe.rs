use crate::entities::Recipe;
use crate::entities::dao::format_timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /recipes` and `PATCH /recipes/{id}`.
///
/// Every field is required and strictly typed: `cost` given as a JSON
/// string is rejected rather than coerced.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeRequest {
    #[schema(example = "チキンカレー")]
    pub title: String,
    #[schema(example = "45分")]
    pub making_time: String,
    #[schema(example = "4人")]
    pub serves: String,
    #[schema(example = "玉ねぎ,肉,スパイス")]
    pub ingredients: String,
    #[schema(example = 1000)]
    pub cost: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i64,
    pub title: String,
    pub making_time: String,
    pub serves: String,
    pub ingredients: String,
    pub cost: i64,
    #[schema(example = "2016-01-10 12:10:12")]
    pub created_at: String,
    #[schema(example = "2016-01-10 12:10:12")]
    pub updated_at: String,
}

/// `GET /recipes`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeListResponse {
    pub recipes: Vec<RecipeResponse>,
}

/// Single-recipe envelope. `recipe` always holds exactly one element.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeEnvelope {
    pub message: String,
    pub recipe: Vec<RecipeResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body for 400, 404 and 500 responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Recipe {
    pub fn to_response(&self) -> RecipeResponse {
        RecipeResponse {
            id: self.id,
            title: self.title.clone(),
            making_time: self.making_time.clone(),
            serves: self.serves.clone(),
            ingredients: self.ingredients.clone(),
            cost: self.cost,
            created_at: format_timestamp(&self.created_at),
            updated_at: format_timestamp(&self.updated_at),
        }
    }
}

impl RecipeEnvelope {
    pub fn single(message: &str, recipe: &Recipe) -> Self {
        Self {
            message: message.to_owned(),
            recipe: vec![recipe.to_response()],
        }
    }
}
