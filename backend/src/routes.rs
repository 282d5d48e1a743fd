use rocket::{State, get, post, delete, http::Status, serde::json::Json};
use rustrict::CensorStr;
use tracing::{debug, instrument};
use shared::{
    CreateItemRequest, Error, ErrorCode, ItemResponse, LeaderboardResponse, MessageResponse, VoteReceipt,
    VoteRequest, VotedItems,
};
use crate::{
    auth::{AdminUser, AuthUser, SessionKeys},
    config::Settings,
    error::ApiError,
    processor::VoteProcessor,
    rate_limiter::RateLimiter,
    store::SharedStore,
    utils::{clamp_limit, parse_item_id, parse_user_id},
};

const VOTE_WINDOW_MINUTES: i64 = 1;

pub struct AppState {
    pub store: SharedStore,
    pub sessions: SessionKeys,
    pub vote_limiter: RateLimiter,
    pub settings: Settings,
}

impl AppState {
    pub fn new(store: SharedStore, settings: Settings) -> Self {
        Self {
            sessions: SessionKeys::new(settings.session_secret.as_bytes()),
            vote_limiter: RateLimiter::new(settings.vote_attempts_per_minute, VOTE_WINDOW_MINUTES),
            store,
            settings,
        }
    }
}

#[get("/products-with-votes")]
pub async fn products_with_votes(state: &State<AppState>) -> Result<Json<LeaderboardResponse>, ApiError> {
    let data = VoteProcessor::list_with_votes(state.store.as_ref()).await?;
    Ok(Json(LeaderboardResponse { success: true, data }))
}

#[get("/top-voted?<limit>")]
pub async fn top_voted(state: &State<AppState>, limit: Option<usize>) -> Result<Json<LeaderboardResponse>, ApiError> {
    let limit = clamp_limit(limit, state.settings.top_voted_limit, state.settings.max_top_voted_limit);
    let data = VoteProcessor::top_voted(state.store.as_ref(), limit).await?;
    Ok(Json(LeaderboardResponse { success: true, data }))
}

#[get("/user/<user_id>/voted-products")]
pub async fn user_voted_products(
    state: &State<AppState>,
    user_id: &str,
    user: AuthUser,
) -> Result<Json<VotedItems>, ApiError> {
    let target = parse_user_id(user_id)?;
    if target != user.id && !user.is_admin() {
        debug!("User {} tried to read votes of {}", user.id, target);
        return Err(Error::new(ErrorCode::Forbidden, "You can only view your own votes").into());
    }

    VoteProcessor::voted_items(state.store.as_ref(), target)
        .await
        .map(Json)
        .map_err(ApiError::from)
}

#[instrument(skip(state, request, user), fields(user_id = %user.id))]
#[post("/vote", data = "<request>")]
pub async fn submit_votes(
    state: &State<AppState>,
    request: Json<VoteRequest>,
    user: AuthUser,
) -> Result<Json<VoteReceipt>, ApiError> {
    let rate_limit_key = format!("submit_votes:{}", user.id);
    state.vote_limiter.check_rate_limit(&rate_limit_key)?;

    VoteProcessor::submit_votes(state.store.as_ref(), user.id, &request.selected)
        .await
        .map(Json)
        .map_err(ApiError::from)
}

#[instrument(skip(state, request, admin), fields(admin_id = %admin.0.id))]
#[post("/wishlist-item", data = "<request>")]
pub async fn add_wishlist_item(
    state: &State<AppState>,
    request: Json<CreateItemRequest>,
    admin: AdminUser,
) -> Result<Json<ItemResponse>, ApiError> {
    if request.name.is_inappropriate() {
        return Err(Error::invalid(format!("Possible profanity detected in name: {}", request.name.trim())).into());
    }

    let item = VoteProcessor::add_voteable_item(state.store.as_ref(), &request.name).await?;
    Ok(Json(ItemResponse {
        success: true,
        message: "Wishlist item added successfully".into(),
        data: item,
    }))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
#[delete("/wishlist-item/<id>")]
pub async fn delete_wishlist_item(
    state: &State<AppState>,
    id: &str,
    admin: AdminUser,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_item_id(id)?;
    VoteProcessor::remove_voteable_item(state.store.as_ref(), id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Wishlist item removed successfully".into(),
    }))
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}
