pub mod catalog;
pub mod config;
pub mod error;
pub mod handoff;
pub mod model;
pub mod platform;
pub mod playback;
pub mod session;
pub mod store;

pub use error::{CatalogError, PlaybackError, StoreError};
pub use model::{MediaItem, NavigationPayload, Route};
pub use session::{AmbientSession, Backdrop};
