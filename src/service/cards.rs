//! Cards always belong to one user. The owner comes from the route, is checked
//! against the acting user by the HTTP layer, and must be a live user here.

use crate::config::ListConfig;
use crate::error::{AppError, Operation};
use crate::list::{Filter, FilterField, ListRequest, ListSpec};
use crate::model::{Card, Entity, User};
use crate::service::crud::{CrudService, ListResponse, Resource};
use crate::service::merge::{merge, Patch};
use crate::service::users::UserWithCards;
use crate::service::validation::{patch_text, required_text};
use crate::store::Repository;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub const CARD_LIST: ListSpec = ListSpec {
    orderable: &["id", "name_card", "card_type", "created_at", "updated_at"],
    filterable: &[FilterField::int("id"), FilterField::text("card_type")],
    search_column: Some("name_card"),
};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateCardRequest {
    #[serde(default)]
    pub name_card: String,
    #[serde(default)]
    pub card_type: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateCardRequest {
    pub name_card: Option<String>,
    pub card_type: Option<String>,
    /// Claimed owner. Must match the owner in the route when given.
    pub user_id: Option<i64>,
}

/// Create payload with the owner attached.
#[derive(Clone, Debug)]
pub struct NewCard {
    pub name_card: String,
    pub card_type: String,
    pub user_id: i64,
}

/// A listed card with its owner. `user` is null if the owner is no longer live.
#[derive(Clone, Debug, Serialize)]
pub struct CardWithOwner {
    #[serde(flatten)]
    pub card: Card,
    pub user: Option<User>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardPatch {
    pub name_card: Option<String>,
    pub card_type: Option<String>,
    pub user_id: Option<i64>,
    /// Resolved owner the merged card must still belong to.
    pub owner: i64,
}

impl CardPatch {
    pub fn new(request: UpdateCardRequest, owner: i64) -> Self {
        CardPatch {
            name_card: request.name_card,
            card_type: request.card_type,
            user_id: request.user_id,
            owner,
        }
    }
}

impl Patch<Card> for CardPatch {
    fn apply(&self, target: &mut Card) -> Result<(), AppError> {
        patch_text("name_card", self.name_card.as_ref(), &mut target.name_card)?;
        patch_text("card_type", self.card_type.as_ref(), &mut target.card_type)?;
        if let Some(user_id) = self.user_id {
            target.user_id = user_id;
        }
        Ok(())
    }

    fn check(&self, merged: &Card) -> Result<(), AppError> {
        if merged.user_id != self.owner {
            return Err(AppError::invalid_parameter("user_id"));
        }
        Ok(())
    }
}

impl Resource for Card {
    type Draft = NewCard;
    type Patch = CardPatch;
    const LIST: ListSpec = CARD_LIST;

    fn from_draft(draft: NewCard) -> Result<Self, AppError> {
        Ok(Card {
            name_card: required_text("name_card", &draft.name_card)?,
            card_type: required_text("card_type", &draft.card_type)?,
            user_id: draft.user_id,
            ..Default::default()
        })
    }
}

#[derive(Clone)]
pub struct CardService {
    cards: CrudService<Card>,
    users: Arc<dyn Repository<User>>,
}

impl CardService {
    pub fn new(
        cards: Arc<dyn Repository<Card>>,
        users: Arc<dyn Repository<User>>,
        list: ListConfig,
    ) -> Self {
        CardService {
            cards: CrudService::new(cards, list),
            users,
        }
    }

    /// The owner must be a live user. A missing one is the caller's mistake.
    async fn resolve_owner(&self, owner: i64) -> Result<User, AppError> {
        self.users.get_by_id(owner).await.map_err(|e| {
            if e.is_not_found() {
                AppError::invalid_parameter("user_id")
            } else {
                AppError::persistence(Operation::Read, User::RESOURCE, e)
            }
        })
    }

    pub async fn create(&self, owner: i64, request: CreateCardRequest) -> Result<Card, AppError> {
        let card = Card::from_draft(NewCard {
            name_card: request.name_card,
            card_type: request.card_type,
            user_id: owner,
        })?;
        self.resolve_owner(owner).await?;
        self.cards.insert(card).await
    }

    /// Another owner's card is reported as missing.
    pub async fn get(&self, owner: i64, id: i64) -> Result<Card, AppError> {
        let card = self.cards.get_by_id(id).await?;
        if card.user_id != owner {
            return Err(AppError::not_found(Card::RESOURCE));
        }
        Ok(card)
    }

    pub async fn update(
        &self,
        owner: i64,
        id: i64,
        request: UpdateCardRequest,
    ) -> Result<Card, AppError> {
        let existing = self.get(owner, id).await?;
        self.resolve_owner(owner).await?;
        let merged = merge(&existing, CardPatch::new(request, owner))?;
        self.cards.save(merged).await
    }

    pub async fn delete(&self, owner: i64, id: i64) -> Result<(), AppError> {
        let card = self.get(owner, id).await?;
        self.cards.remove(&card, false).await
    }

    /// One page of the owner's cards, each with its owner embedded.
    pub async fn list(
        &self,
        owner: i64,
        request: ListRequest,
    ) -> Result<ListResponse<CardWithOwner>, AppError> {
        let cards = self
            .cards
            .get_list(request, Filter::new().and("user_id", owner))
            .await?;
        let mut ids: Vec<i64> = cards.rows.iter().map(|c| c.user_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let owners: HashMap<i64, User> = self
            .users
            .get_related("id", ids)
            .await
            .map_err(|e| AppError::persistence(Operation::Read, User::RESOURCE, e))?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        Ok(cards.map_rows(|card| CardWithOwner {
            user: owners.get(&card.user_id).cloned(),
            card,
        }))
    }

    /// Embed each listed user's live cards, fetched in one lookup.
    pub async fn attach_to(
        &self,
        users: ListResponse<User>,
    ) -> Result<ListResponse<UserWithCards>, AppError> {
        let ids: Vec<i64> = users.rows.iter().map(|u| u.id).collect();
        let mut owned: HashMap<i64, Vec<Card>> = HashMap::new();
        for card in self.cards.get_related("user_id", ids).await? {
            owned.entry(card.user_id).or_default().push(card);
        }
        Ok(users.map_rows(|user| {
            let cards = owned.remove(&user.id).unwrap_or_default();
            UserWithCards { user, cards }
        }))
    }
}
