use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    #[default]
    Student,
    Faculty,
    Admin,
}

impl UserRole {
    /// Faculty and admins manage quizzes and may see everyone's attempts.
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Faculty | UserRole::Admin)
    }
}
