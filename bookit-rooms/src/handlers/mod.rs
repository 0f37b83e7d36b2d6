//! HTTP handlers for the room endpoints
//!
//! - [`rooms`]: list, create, get, update, delete
//! - [`ApiError`]: failures with automatic status mapping and a uniform JSON body
//! - [`RoomResponse`], [`RoomListResponse`], [`DeleteResponse`]: success bodies

mod error;
mod response;
pub mod rooms;

pub use error::{ApiError, ApiErrorKind, ApiErrorResponse, ApiOperation};
pub use response::{DeleteResponse, RoomListResponse, RoomResponse};
pub use rooms::{all_rooms, delete_room, get_room_details, new_room, update_room};
