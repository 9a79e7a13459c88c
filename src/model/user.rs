use crate::model::{Entity, Timestamps};
use crate::sql::BindValue;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub username: String,
    pub score: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub stamps: Timestamps,
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const RESOURCE: &'static str = "user";
    const FIELDS: &'static [&'static str] = &["name", "email", "username", "score"];
    const CASCADE: &'static [(&'static str, &'static str)] = &[("cards", "user_id")];

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
            "name" => BindValue::Text(self.name.clone()),
            "email" => BindValue::Text(self.email.clone()),
            "username" => BindValue::Text(self.username.clone()),
            "score" => BindValue::Int(self.score),
            _ => return None,
        })
    }
}
