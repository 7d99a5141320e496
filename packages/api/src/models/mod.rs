//! Data models for the application.

mod user;
mod wire;

#[cfg(feature = "server")]
pub use user::User;
pub use user::UserInfo;
pub use wire::{
    AddressResponse, AuthResponse, Credentials, LastLocationResponse, LocationUpdate,
    StatusResponse,
};
