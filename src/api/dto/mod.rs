//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names are camelCase on the wire.

pub mod common_dto;
pub mod player_dto;
pub mod session_dto;

pub use common_dto::*;
pub use player_dto::*;
pub use session_dto::*;
