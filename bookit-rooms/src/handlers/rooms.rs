//! Room endpoints
//!
//! Each handler parses its input, calls the room store once or twice, and maps
//! the outcome to a response. Failures surface as [`ApiError`].

use std::str::FromStr;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use super::error::{ApiError, ApiOperation};
use super::response::{DeleteResponse, RoomListResponse, RoomResponse};
use crate::ids::RoomId;
use crate::query::{QueryParams, QuerySpec};
use crate::repository::{Document, Patch};
use crate::rooms::{NewRoom, Room};
use crate::state::{AppState, RoomStore};

fn parse_room_id(raw: &str, operation: ApiOperation) -> Result<RoomId, ApiError> {
    RoomId::from_str(raw).map_err(|e| {
        ApiError::bad_request(operation, format!("Invalid room id: {e}"))
            .with_entity(Room::ENTITY, raw)
    })
}

fn room_not_found(id: &RoomId, operation: ApiOperation) -> ApiError {
    ApiError::not_found(Room::ENTITY, id.as_str()).with_operation(operation)
}

/// `GET /api/rooms`
///
/// Supports `keyword`, `page` and arbitrary `field` / `field[op]` filters.
/// `filteredRoomCount` counts every match; `rooms` holds only the requested page.
pub async fn all_rooms<S: RoomStore>(
    State(state): State<AppState<S>>,
    query: Result<Query<QueryParams>, QueryRejection>,
) -> Result<RoomListResponse, ApiError> {
    let Query(params) = query?;
    let listing = &state.config().listing;
    let res_per_page = listing.results_per_page.max(1);

    let rooms_count = state.rooms().count_all().await?;

    let criteria = QuerySpec::new()
        .search(&params, &listing.search_field)
        .filter(&params);
    let filtered_room_count = state.rooms().count_matching(&criteria).await?;

    let page = criteria.paginate(&params, res_per_page);
    let rooms = state.rooms().fetch_page(&page).await?;

    let response = RoomListResponse::new(rooms_count, filtered_room_count, res_per_page, rooms);
    tracing::debug!(
        rooms_count,
        filtered_room_count,
        page = params.page(),
        total_pages = response.total_pages(),
        returned = response.rooms.len(),
        "Listed rooms"
    );

    Ok(response)
}

/// `POST /api/admin/rooms`
pub async fn new_room<S: RoomStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<NewRoom>, JsonRejection>,
) -> Result<RoomResponse, ApiError> {
    let Json(draft) = payload?;

    let room = state.rooms().create(draft).await?;

    tracing::info!(room_id = %room.id, name = %room.name, "Room created");
    Ok(RoomResponse::new(room))
}

/// `GET /api/rooms/{id}`
pub async fn get_room_details<S: RoomStore>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> Result<RoomResponse, ApiError> {
    let id = parse_room_id(&raw_id, ApiOperation::Get)?;

    let room = state
        .rooms()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| room_not_found(&id, ApiOperation::Get))?;

    Ok(RoomResponse::new(room))
}

/// `PUT /api/admin/rooms/{id}`
///
/// The body is merged field by field onto the stored room. `_id` and
/// `createdAt` cannot be changed.
pub async fn update_room<S: RoomStore>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Patch>, JsonRejection>,
) -> Result<RoomResponse, ApiError> {
    let id = parse_room_id(&raw_id, ApiOperation::Update)?;
    let Json(patch) = payload.map_err(|e| ApiError::from(e).with_operation(ApiOperation::Update))?;

    let room = state
        .rooms()
        .update(&id, patch)
        .await?
        .ok_or_else(|| room_not_found(&id, ApiOperation::Update))?;

    tracing::info!(room_id = %room.id, "Room updated");
    Ok(RoomResponse::new(room))
}

/// `DELETE /api/admin/rooms/{id}`
pub async fn delete_room<S: RoomStore>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> Result<DeleteResponse, ApiError> {
    let id = parse_room_id(&raw_id, ApiOperation::Delete)?;

    if !state.rooms().delete(&id).await? {
        return Err(room_not_found(&id, ApiOperation::Delete));
    }

    tracing::info!(room_id = %id, "Room deleted");
    Ok(DeleteResponse::default())
}
