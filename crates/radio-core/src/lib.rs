pub mod backend;
pub mod config;
pub mod controller;
pub mod platform;
pub mod registry;
pub mod station;

pub use backend::{PlaybackError, PlayerBackend};
pub use controller::PlaybackController;
pub use registry::{RegistryError, StationRegistry};
pub use station::Station;
