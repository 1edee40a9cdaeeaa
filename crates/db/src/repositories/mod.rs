//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods that validate input
//! return [`DbError`](crate::DbError); plain reads return `sqlx::Error`.

pub mod account_repo;
pub mod project_repo;
pub mod transfer_repo;
pub mod user_repo;

pub use account_repo::AccountRepo;
pub use project_repo::ProjectRepo;
pub use transfer_repo::TransferRepo;
pub use user_repo::UserRepo;
