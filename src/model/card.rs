use crate::model::{Entity, Timestamps};
use crate::sql::BindValue;
use serde::{Deserialize, Serialize};

/// A card owned by exactly one user (`user_id`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Card {
    pub id: i64,
    pub name_card: String,
    pub card_type: String,
    pub user_id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub stamps: Timestamps,
}

impl Entity for Card {
    const TABLE: &'static str = "cards";
    const RESOURCE: &'static str = "card";
    const FIELDS: &'static [&'static str] = &["name_card", "card_type", "user_id"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn stamps(&self) -> &Timestamps {
        &self.stamps
    }

    fn stamps_mut(&mut self) -> &mut Timestamps {
        &mut self.stamps
    }

    fn field(&self, column: &str) -> Option<BindValue> {
        Some(match column {
            "id" => BindValue::Int(self.id),
            "name_card" => BindValue::Text(self.name_card.clone()),
            "card_type" => BindValue::Text(self.card_type.clone()),
            "user_id" => BindValue::Int(self.user_id),
            _ => return None,
        })
    }
}
