//! Application state shared across handlers

use std::sync::Arc;

use crate::config::Config;
use crate::ids::RoomId;
use crate::repository::{Patch, Repository};
use crate::rooms::{NewRoom, Room};

/// A room collection usable as handler state
///
/// Implemented for every cloneable [`Repository`] over rooms.
pub trait RoomStore: Repository<RoomId, Room, NewRoom, Patch> + Clone + 'static {}

impl<T> RoomStore for T where T: Repository<RoomId, Room, NewRoom, Patch> + Clone + 'static {}

/// Configuration plus the room collection
///
/// Cloning is cheap: configuration is behind an `Arc` and stores share their
/// backing collection.
#[derive(Clone)]
pub struct AppState<S> {
    config: Arc<Config>,
    rooms: S,
}

impl<S: RoomStore> AppState<S> {
    /// Create state from configuration and a room store
    pub fn new(config: Config, rooms: S) -> Self {
        Self {
            config: Arc::new(config),
            rooms,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the room collection
    pub fn rooms(&self) -> &S {
        &self.rooms
    }
}
