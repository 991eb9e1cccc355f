//! Request and response DTOs for the devlink API.

mod request;
mod response;

pub use request::{LoginRequest, RegisterRequest};
pub use response::{ApiResponse, LoginResponse, MeResponse, RefreshResponse, UserInfo};
