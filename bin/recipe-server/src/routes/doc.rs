use crate::routes::{health, recipes};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "recipe-server",
    description = "Recipe catalog API",
    version = "0.1.0"
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(recipes::RecipesApi::openapi());
    root
}
