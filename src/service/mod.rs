//! Use cases: one generic CRUD orchestrator plus the per-entity rules.

mod cards;
mod crud;
mod merge;
mod users;
mod validation;

pub use cards::{
    CardPatch, CardService, CardWithOwner, CreateCardRequest, NewCard, UpdateCardRequest, CARD_LIST,
};
pub use crud::{CrudService, ListResponse, Resource};
pub use merge::{merge, Patch};
pub use users::{CreateUserRequest, UpdateUserRequest, UserService, UserWithCards, USER_LIST};
pub use validation::{patch_text, required_text};
