//! Canonical resource paths for deposit entities.

use crate::types::DbId;

pub fn project_path(project_id: DbId) -> String {
    format!("/project/{project_id}/")
}

/// Users are addressed by username, not by id.
pub fn user_path(username: &str) -> String {
    format!("/user/{username}/")
}

pub fn transfer_path(transfer_id: DbId) -> String {
    format!("/transfer/{transfer_id}/")
}
