//! Success bodies for room endpoints

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::rooms::Room;

/// `{ success, room }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomResponse {
    pub success: bool,
    pub room: Room,
}

impl RoomResponse {
    pub fn new(room: Room) -> Self {
        Self {
            success: true,
            room,
        }
    }
}

impl IntoResponse for RoomResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Body of `GET /api/rooms`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomListResponse {
    pub success: bool,
    /// Size of the whole collection
    pub rooms_count: u64,
    /// Rooms matching search and filters, ignoring pagination
    pub filtered_room_count: u64,
    pub res_per_page: u64,
    /// The requested page
    pub rooms: Vec<Room>,
}

impl RoomListResponse {
    pub fn new(
        rooms_count: u64,
        filtered_room_count: u64,
        res_per_page: u64,
        rooms: Vec<Room>,
    ) -> Self {
        Self {
            success: true,
            rooms_count,
            filtered_room_count,
            res_per_page,
            rooms,
        }
    }

    /// Number of pages the filtered set spans
    pub fn total_pages(&self) -> u64 {
        self.filtered_room_count.div_ceil(self.res_per_page.max(1))
    }
}

impl IntoResponse for RoomListResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// `{ success: true }`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

impl Default for DeleteResponse {
    fn default() -> Self {
        Self { success: true }
    }
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
