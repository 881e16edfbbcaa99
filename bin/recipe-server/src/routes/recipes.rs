//! Recipe CRUD endpoints.
//!
//! `PATCH` is a full replace: it takes the same body as `POST` and every
//! field is required. Single-recipe responses wrap the row in a one-element
//! `recipe` array.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;
use utoipa::OpenApi;

use crate::entities::dao::now_timestamp;
use crate::entities::{NewRecipe, RecipeStore, RecipeUpdate};
use crate::error::ServerError;
use crate::extract::{ValidJson, ValidPath};
use crate::schemas::recipe::{
    ErrorResponse, MessageResponse, RecipeEnvelope, RecipeListResponse, RecipeRequest,
    RecipeResponse,
};
use crate::state::AppState;

pub const CREATED_MESSAGE: &str = "Recipe successfully created!";
pub const DETAILS_MESSAGE: &str = "Recipe details by id";
pub const UPDATED_MESSAGE: &str = "Recipe successfully updated!";
pub const REMOVED_MESSAGE: &str = "Recipe successfully removed!";
const NOT_FOUND_DETAIL: &str = "Recipe not found";

#[derive(OpenApi)]
#[openapi(
    paths(list_recipes, create_recipe, get_recipe, update_recipe, delete_recipe),
    components(schemas(
        RecipeRequest,
        RecipeResponse,
        RecipeListResponse,
        RecipeEnvelope,
        MessageResponse,
        ErrorResponse
    ))
)]
pub struct RecipesApi;

/// Register recipe routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/{id}",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
}

fn not_found() -> ServerError {
    ServerError::NotFound(NOT_FOUND_DETAIL.to_owned())
}

#[utoipa::path(
    get,
    path = "/recipes",
    tag = "recipes",
    responses(
        (status = 200, description = "All recipes", body = RecipeListResponse),
        (status = 500, description = "Storage error", body = ErrorResponse),
    )
)]
pub async fn list_recipes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RecipeListResponse>, ServerError> {
    let recipes = state.store.list_all().await?;
    Ok(Json(RecipeListResponse {
        recipes: recipes.iter().map(|r| r.to_response()).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/recipes",
    tag = "recipes",
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Recipe created", body = RecipeEnvelope),
        (status = 400, description = "Missing or mistyped field", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse),
    )
)]
pub async fn create_recipe(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<RecipeRequest>,
) -> Result<Json<RecipeEnvelope>, ServerError> {
    let now = now_timestamp();
    let id = state
        .store
        .insert(NewRecipe {
            title: req.title,
            making_time: req.making_time,
            serves: req.serves,
            ingredients: req.ingredients,
            cost: req.cost,
            created_at: now,
            updated_at: now,
        })
        .await?;
    info!(id, "recipe created");

    let recipe = state
        .store
        .get_by_id(id)
        .await?
        .ok_or_else(|| ServerError::Internal(format!("recipe {id} missing right after insert")))?;
    Ok(Json(RecipeEnvelope::single(CREATED_MESSAGE, &recipe)))
}

#[utoipa::path(
    get,
    path = "/recipes/{id}",
    tag = "recipes",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe found", body = RecipeEnvelope),
        (status = 400, description = "Id is not an integer", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
    )
)]
pub async fn get_recipe(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<RecipeEnvelope>, ServerError> {
    let recipe = state.store.get_by_id(id).await?.ok_or_else(not_found)?;
    Ok(Json(RecipeEnvelope::single(DETAILS_MESSAGE, &recipe)))
}

#[utoipa::path(
    patch,
    path = "/recipes/{id}",
    tag = "recipes",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Recipe replaced", body = RecipeEnvelope),
        (status = 400, description = "Bad id or missing/mistyped field", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
    )
)]
pub async fn update_recipe(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
    ValidJson(req): ValidJson<RecipeRequest>,
) -> Result<Json<RecipeEnvelope>, ServerError> {
    if state.store.get_by_id(id).await?.is_none() {
        return Err(not_found());
    }

    state
        .store
        .update_by_id(
            id,
            RecipeUpdate {
                title: req.title,
                making_time: req.making_time,
                serves: req.serves,
                ingredients: req.ingredients,
                cost: req.cost,
                updated_at: now_timestamp(),
            },
        )
        .await?;
    info!(id, "recipe updated");

    // A concurrent delete between the update and this read is reported as 404.
    let recipe = state.store.get_by_id(id).await?.ok_or_else(not_found)?;
    Ok(Json(RecipeEnvelope::single(UPDATED_MESSAGE, &recipe)))
}

#[utoipa::path(
    delete,
    path = "/recipes/{id}",
    tag = "recipes",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe removed", body = MessageResponse),
        (status = 400, description = "Id is not an integer", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
    )
)]
pub async fn delete_recipe(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<MessageResponse>, ServerError> {
    if state.store.get_by_id(id).await?.is_none() {
        return Err(not_found());
    }
    state.store.delete_by_id(id).await?;
    info!(id, "recipe removed");
    Ok(Json(MessageResponse {
        message: REMOVED_MESSAGE.to_owned(),
    }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::routes::testing::test_app;

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    fn payload() -> Value {
        json!({ "title": "T", "making_time": "10 min", "serves": "2", "ingredients": "a,b", "cost": 5 })
    }

    async fn count(app: &Router) -> usize {
        let (_, body) = call(app, Method::GET, "/recipes", None).await;
        body["recipes"].as_array().unwrap().len()
    }

    #[tokio::test]
    async fn list_returns_seed() {
        let (app, _dir) = test_app().await;
        let (status, body) = call(&app, Method::GET, "/recipes", None).await;
        assert_eq!(status, StatusCode::OK);
        let recipes = body["recipes"].as_array().unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0]["id"], 1);
        assert_eq!(recipes[0]["title"], "チキンカレー");
        assert_eq!(recipes[0]["created_at"], "2016-01-10 12:10:12");
        assert_eq!(recipes[1]["id"], 2);
        assert_eq!(recipes[1]["cost"], 700);
    }

    #[tokio::test]
    async fn create_echoes_fields_with_fresh_id() {
        let (app, _dir) = test_app().await;
        let (status, body) = call(&app, Method::POST, "/recipes", Some(payload())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Recipe successfully created!");
        let recipe = body["recipe"].as_array().unwrap();
        assert_eq!(recipe.len(), 1);
        let r = &recipe[0];
        assert_eq!(r["id"], 3);
        assert_eq!(r["title"], "T");
        assert_eq!(r["making_time"], "10 min");
        assert_eq!(r["serves"], "2");
        assert_eq!(r["ingredients"], "a,b");
        assert_eq!(r["cost"], 5);
        assert_eq!(r["created_at"], r["updated_at"]);
        assert_eq!(count(&app).await, 3);
    }

    #[tokio::test]
    async fn get_existing_and_missing() {
        let (app, _dir) = test_app().await;
        let (status, body) = call(&app, Method::GET, "/recipes/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Recipe details by id");
        assert_eq!(body["recipe"][0]["id"], 1);

        let (status, body) = call(&app, Method::GET, "/recipes/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Recipe not found");
    }

    #[tokio::test]
    async fn update_keeps_created_at() {
        let (app, _dir) = test_app().await;
        let (_, before) = call(&app, Method::GET, "/recipes/2", None).await;
        let body = json!({
            "title": "new", "making_time": "5 min", "serves": "1", "ingredients": "egg", "cost": 300
        });
        let (status, updated) = call(&app, Method::PATCH, "/recipes/2", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["message"], "Recipe successfully updated!");

        let (_, after) = call(&app, Method::GET, "/recipes/2", None).await;
        let (b, a) = (&before["recipe"][0], &after["recipe"][0]);
        assert_eq!(a["title"], "new");
        assert_eq!(a["cost"], 300);
        assert_eq!(a["created_at"], b["created_at"]);
        assert_eq!(b["updated_at"], "2016-01-11 13:10:12");
        // Fixed-width timestamps compare correctly as strings.
        assert!(a["updated_at"].as_str().unwrap() > b["updated_at"].as_str().unwrap());
        assert_eq!(updated["recipe"][0]["updated_at"], a["updated_at"]);
    }

    #[tokio::test]
    async fn update_requires_every_field() {
        let (app, _dir) = test_app().await;
        let partial = json!({ "title": "only title" });
        let (status, body) = call(&app, Method::PATCH, "/recipes/1", Some(partial)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Recipe creation failed!");
        let (_, after) = call(&app, Method::GET, "/recipes/1", None).await;
        assert_eq!(after["recipe"][0]["title"], "チキンカレー");
    }

    #[tokio::test]
    async fn update_missing_is_404() {
        let (app, _dir) = test_app().await;
        let (status, _) = call(&app, Method::PATCH, "/recipes/42", Some(payload())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(count(&app).await, 2);
    }

    #[tokio::test]
    async fn delete_then_get_and_delete_again() {
        let (app, _dir) = test_app().await;
        let (status, body) = call(&app, Method::DELETE, "/recipes/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Recipe successfully removed!" }));

        let (status, _) = call(&app, Method::GET, "/recipes/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, Method::DELETE, "/recipes/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn string_cost_is_rejected_without_writing() {
        let (app, _dir) = test_app().await;
        let mut body = payload();
        body["cost"] = json!("5");
        let (status, resp) = call(&app, Method::POST, "/recipes", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["message"], "Recipe creation failed!");
        assert!(resp["detail"].as_str().is_some_and(|d| !d.is_empty()));
        assert_eq!(count(&app).await, 2);
    }

    #[tokio::test]
    async fn missing_field_is_rejected_without_writing() {
        for field in ["title", "making_time", "serves", "ingredients", "cost"] {
            let (app, _dir) = test_app().await;
            let mut body = payload();
            body.as_object_mut().unwrap().remove(field);
            let (status, resp) = call(&app, Method::POST, "/recipes", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "omitting {field}");
            assert_eq!(resp["message"], "Recipe creation failed!");
            assert_eq!(count(&app).await, 2);
        }
    }

    #[tokio::test]
    async fn non_integer_id_is_validation_failure() {
        let (app, _dir) = test_app().await;
        let (status, body) = call(&app, Method::GET, "/recipes/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Recipe creation failed!");
    }

    #[tokio::test]
    async fn ids_are_not_reused() {
        let (app, _dir) = test_app().await;
        let (_, first) = call(&app, Method::POST, "/recipes", Some(payload())).await;
        let first_id = first["recipe"][0]["id"].as_i64().unwrap();
        call(&app, Method::DELETE, &format!("/recipes/{first_id}"), None).await;
        let (_, second) = call(&app, Method::POST, "/recipes", Some(payload())).await;
        assert!(second["recipe"][0]["id"].as_i64().unwrap() > first_id);
    }
}
