use crate::error::AppError;
use crate::list::{FilterField, ListSpec};
use crate::model::{Card, User};
use crate::service::crud::{CrudService, Resource};
use crate::service::merge::Patch;
use crate::service::validation::{patch_text, required_text};
use serde::{Deserialize, Serialize};

pub const USER_LIST: ListSpec = ListSpec {
    orderable: &["id", "name", "created_at", "updated_at"],
    filterable: &[
        FilterField::int("id"),
        FilterField::text("username"),
        FilterField::text("email"),
    ],
    search_column: Some("name"),
};

pub type UserService = CrudService<User>;

/// A listed user with their live cards.
#[derive(Clone, Debug, Serialize)]
pub struct UserWithCards {
    #[serde(flatten)]
    pub user: User,
    pub cards: Vec<Card>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub score: i64,
}

/// Partial update. `None` leaves the stored value as is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub score: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl Patch<User> for UpdateUserRequest {
    fn apply(&self, target: &mut User) -> Result<(), AppError> {
        patch_text("name", self.name.as_ref(), &mut target.name)?;
        patch_text("Username", self.username.as_ref(), &mut target.username)?;
        patch_text("Email", self.email.as_ref(), &mut target.email)?;
        if let Some(score) = self.score {
            target.score = score;
        }
        Ok(())
    }
}

impl Resource for User {
    type Draft = CreateUserRequest;
    type Patch = UpdateUserRequest;
    const LIST: ListSpec = USER_LIST;

    fn from_draft(draft: CreateUserRequest) -> Result<Self, AppError> {
        Ok(User {
            name: required_text("name", &draft.name)?,
            email: required_text("email", &draft.email)?,
            username: required_text("username", &draft.username)?,
            score: draft.score,
            ..Default::default()
        })
    }
}
