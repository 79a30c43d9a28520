pub mod models;
pub mod secure_storage;
pub mod service;
pub mod session;

pub use models::{AuthEvent, LoginRequest, LoginResponse, LogoutReason};
pub use secure_storage::{SecureStorage, StoredAuthInfo};
pub use service::AuthService;
pub use session::SessionContext;
