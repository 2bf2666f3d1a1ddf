use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{
        dao::RecipeGraph,
        entities::{
            ingredient::{self, Measure},
            recipe, step,
        },
    },
    domain::{
        Action, Denial, PolicyChain, PolicyContext, Principal, is_demo_account,
        policy::require_authenticated,
    },
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    routes::{CurrentUser, entry::api_path},
    services::{
        ServiceContext,
        forms::{ChildMode, IngredientForm, RecipeForm, StepForm},
        recipe_service::{RecipeOverview, RecipeService},
    },
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub duration_minutes: Option<i32>,
    pub duration_display: String,
    pub image: Option<String>,
    pub is_public: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub name: String,
    pub description: String,
    pub duration_minutes: Option<i32>,
    pub duration_display: String,
}

#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub name: String,
    pub quantity: Option<f64>,
    pub measure: Option<Measure>,
}

#[derive(Debug, Serialize)]
pub struct RecipeDetailResponse {
    pub recipe: RecipeResponse,
    pub steps: Vec<StepResponse>,
    pub ingredients: Vec<IngredientResponse>,
    /// Whether the caller may update or delete this recipe.
    pub can_modify: bool,
}

#[derive(Debug, Serialize)]
pub struct RecipeListResponse {
    pub user_recipes: Vec<RecipeResponse>,
    pub public_recipes: Vec<RecipeResponse>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
}

/// Bodies are parsed inside the handler so authentication is checked first.
type Payload<T> = Result<Json<T>, JsonRejection>;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/{recipe_id}",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .route("/recipes/{recipe_id}/steps", post(create_step))
        .route("/recipes/{recipe_id}/ingredients", post(create_ingredient))
        .with_state(state)
}

async fn index(CurrentUser(user): CurrentUser) -> Result<Redirect, AppError> {
    authenticated(user.as_ref())?;
    Ok(Redirect::to(&api_path("/recipes")))
}

async fn list_recipes(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<RecipeListResponse> {
    let user = authenticated(user.as_ref())?;
    let listing = recipe_service(&state).list_for(user).await?;
    JsonApiResponse::ok(RecipeListResponse {
        user_recipes: listing.user_recipes.into_iter().map(Into::into).collect(),
        public_recipes: listing.public_recipes.into_iter().map(Into::into).collect(),
    })
}

async fn create_recipe(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    body: Payload<RecipeForm>,
) -> Result<Response, AppError> {
    let user = authenticated(user.as_ref())?;
    let service = recipe_service(&state);
    let demo = &state.config.demo;

    // Only the demo account is capped, so only it pays for the count.
    let owned_recipes = if is_demo_account(user, &demo.username) {
        service.count_by_owner(&user.user_id).await?
    } else {
        0
    };

    let chain = PolicyChain::recipe_creation(&demo.username, owned_recipes, demo.recipe_limit);
    match chain.evaluate(&PolicyContext::new(Some(user))) {
        Ok(()) => {}
        Err(Denial::QuotaExceeded { message }) => {
            return Ok(JsonApiResponse::<serde_json::Value>::see_other(
                &api_path("/recipes"),
                message,
            ));
        }
        Err(denial) => return Err(denial.into()),
    }

    let draft = payload(body)?.validate()?;
    let graph = service.create(user, draft).await?;
    let detail = detail_response(graph, true);
    JsonApiResponse::with_status(StatusCode::CREATED, "created", detail)
        .map(IntoResponse::into_response)
}

async fn get_recipe(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<Uuid>,
) -> ApiResult<RecipeDetailResponse> {
    let user = authenticated(user.as_ref())?;
    let service = recipe_service(&state);
    let graph = service.load(&recipe_id).await?;
    authorize(Some(user), &graph.recipe, Action::Read)?;

    let can_modify = graph.recipe.access().is_owned_by(user);
    JsonApiResponse::ok(detail_response(graph, can_modify))
}

async fn update_recipe(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<Uuid>,
    body: Payload<RecipeForm>,
) -> ApiResult<RecipeDetailResponse> {
    let user = authenticated(user.as_ref())?;
    let service = recipe_service(&state);
    let graph = service.load(&recipe_id).await?;
    authorize(Some(user), &graph.recipe, Action::Modify)?;

    let draft = payload(body)?.validate()?;
    let graph = service.update(graph, draft).await?;
    JsonApiResponse::with_status(StatusCode::OK, "updated", detail_response(graph, true))
}

async fn delete_recipe(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    let user = authenticated(user.as_ref())?;
    let service = recipe_service(&state);
    let graph = service.load(&recipe_id).await?;
    authorize(Some(user), &graph.recipe, Action::Modify)?;

    let id = service.delete(&graph.recipe).await?;
    JsonApiResponse::with_status(StatusCode::OK, "deleted", DeletedResponse { id })
}

async fn create_step(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<Uuid>,
    body: Payload<StepForm>,
) -> ApiResult<StepResponse> {
    let user = authenticated(user.as_ref())?;
    let service = recipe_service(&state);
    let graph = service.load(&recipe_id).await?;
    authorize(Some(user), &graph.recipe, Action::Modify)?;

    let fields = payload(body)?
        .validate_at("step", ChildMode::Direct)?
        .ok_or_else(|| AppError::bad_request("step.name is required"))?;
    let step = service.add_step(&graph.recipe, fields).await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "created", step.into())
}

async fn create_ingredient(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<Uuid>,
    body: Payload<IngredientForm>,
) -> ApiResult<IngredientResponse> {
    let user = authenticated(user.as_ref())?;
    let service = recipe_service(&state);
    let graph = service.load(&recipe_id).await?;
    authorize(Some(user), &graph.recipe, Action::Modify)?;

    let fields = payload(body)?
        .validate_at("ingredient", ChildMode::Direct)?
        .ok_or_else(|| AppError::bad_request("ingredient.name is required"))?;
    let ingredient = service.add_ingredient(&graph.recipe, fields).await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "created", ingredient.into())
}

fn recipe_service(state: &AppState) -> RecipeService {
    ServiceContext::from_state(state).recipe()
}

/// Authentication runs before anything is loaded.
fn authenticated(user: Option<&Principal>) -> Result<&Principal, AppError> {
    PolicyChain::new()
        .check("authenticated", require_authenticated)
        .evaluate(&PolicyContext::new(user))?;
    user.ok_or_else(|| AppError::from(Denial::Unauthenticated))
}

fn payload<T>(body: Payload<T>) -> Result<T, AppError> {
    body.map(|Json(body)| body)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

fn authorize(user: Option<&Principal>, recipe: &recipe::Model, action: Action) -> Result<(), AppError> {
    let ctx = PolicyContext::new(user).on_recipe(recipe.access(), action);
    Ok(PolicyChain::recipe_access().evaluate(&ctx)?)
}

fn detail_response(graph: RecipeGraph, can_modify: bool) -> RecipeDetailResponse {
    let duration_display = graph.recipe.duration_display(&graph.steps);
    RecipeDetailResponse {
        recipe: recipe_response(graph.recipe, duration_display),
        steps: graph.steps.into_iter().map(Into::into).collect(),
        ingredients: graph.ingredients.into_iter().map(Into::into).collect(),
        can_modify,
    }
}

fn recipe_response(model: recipe::Model, duration_display: String) -> RecipeResponse {
    RecipeResponse {
        id: model.id,
        owner_id: model.user_id,
        title: model.title,
        description: model.description,
        duration_minutes: model.duration_minutes,
        duration_display,
        image: model.image,
        is_public: model.is_public,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

impl From<RecipeOverview> for RecipeResponse {
    fn from(overview: RecipeOverview) -> Self {
        recipe_response(overview.recipe, overview.duration_display)
    }
}

impl From<step::Model> for StepResponse {
    fn from(model: step::Model) -> Self {
        Self {
            duration_display: model.duration_display(),
            id: model.id,
            recipe_id: model.recipe_id,
            name: model.name,
            description: model.description,
            duration_minutes: model.duration_minutes,
        }
    }
}

impl From<ingredient::Model> for IngredientResponse {
    fn from(model: ingredient::Model) -> Self {
        Self {
            id: model.id,
            recipe_id: model.recipe_id,
            name: model.name,
            quantity: model.quantity,
            measure: model.measure,
        }
    }
}
