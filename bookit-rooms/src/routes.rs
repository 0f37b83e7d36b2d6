//! Route table

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{all_rooms, delete_room, get_room_details, new_room, update_room};
use crate::health::{health, readiness};
use crate::state::{AppState, RoomStore};

/// Build the application router over `state`
///
/// | Method | Path                    |
/// |--------|-------------------------|
/// | GET    | `/health`               |
/// | GET    | `/ready`                |
/// | GET    | `/api/rooms`            |
/// | GET    | `/api/rooms/{id}`       |
/// | POST   | `/api/admin/rooms`      |
/// | PUT    | `/api/admin/rooms/{id}` |
/// | DELETE | `/api/admin/rooms/{id}` |
pub fn router<S: RoomStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health::<S>))
        .route("/ready", get(readiness::<S>))
        .route("/api/rooms", get(all_rooms::<S>))
        .route("/api/rooms/{id}", get(get_room_details::<S>))
        .route("/api/admin/rooms", post(new_room::<S>))
        .route(
            "/api/admin/rooms/{id}",
            put(update_room::<S>).delete(delete_room::<S>),
        )
        .with_state(state)
}
