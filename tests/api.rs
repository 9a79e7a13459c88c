//! Drives the full router over the in-memory store.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use cardbook::{app, AppConfig, AppState, USER_ID_HEADER};
use serde_json::{json, Value};
use tower::ServiceExt;

struct Client {
    app: Router,
    actor: Option<i64>,
    bearer: Option<&'static str>,
}

impl Client {
    fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    fn with_config(config: AppConfig) -> Self {
        Client {
            app: app(AppState::in_memory(&config)),
            actor: None,
            bearer: None,
        }
    }

    fn acting_as(&self, id: i64) -> Self {
        Client {
            app: self.app.clone(),
            actor: Some(id),
            bearer: self.bearer,
        }
    }

    async fn raw(&self, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(id) = self.actor {
            request = request.header(USER_ID_HEADER, id.to_string());
        }
        if let Some(key) = self.bearer {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", key));
        }
        let response = self
            .app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = body.map(|v| Body::from(v.to_string())).unwrap_or_else(Body::empty);
        self.raw(method, uri, body).await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    /// Create a card as its owner and return its URI.
    async fn create_card(&self, owner: i64, name_card: &str) -> String {
        let cards = format!("/api/users/{}/cards", owner);
        let (status, body) = self
            .acting_as(owner)
            .send(
                Method::POST,
                &cards,
                Some(json!({ "name_card": name_card, "card_type": "credit" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        format!("{}/{}", cards, body["data"]["id"])
    }

    async fn create_user(&self, name: &str) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/users",
                Some(json!({
                    "name": name,
                    "email": format!("{}@example.com", name),
                    "username": name,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn health_and_readiness() {
    let client = Client::new();
    let (status, body) = client.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let (status, body) = client.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "memory");
}

#[tokio::test]
async fn user_create_and_read() {
    let client = Client::new();
    let id = client.create_user("ann").await;
    let (status, body) = client.get(&format!("/api/users/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "ann");
    assert_eq!(body["data"]["score"], 0);
    assert!(body["data"]["created_at"].is_string());
    assert!(body["data"].get("deleted_at").is_none());
}

#[tokio::test]
async fn whitespace_username_leaves_user_unchanged() {
    let client = Client::new();
    let id = client.create_user("ann").await;
    let uri = format!("/api/users/{}", id);

    let (status, body) = client.send(Method::PUT, &uri, Some(json!({ "username": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_parameter");
    assert_eq!(body["error"]["message"], "Invalid parameter: `Username`.");

    let (_, body) = client.get(&uri).await;
    assert_eq!(body["data"]["username"], "ann");
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let client = Client::new();
    let id = client.create_user("ann").await;
    let uri = format!("/api/users/{}", id);
    let (status, body) = client.send(Method::PUT, &uri, Some(json!({ "score": 42 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["score"], 42);
    assert_eq!(body["data"]["email"], "ann@example.com");
}

#[tokio::test]
async fn second_page_of_twenty_five_users() {
    let client = Client::new();
    for i in 0..25 {
        client.create_user(&format!("user{}", i)).await;
    }
    let (status, body) = client.get("/api/users?page=2&limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"], json!({ "page": 2, "limit": 10, "total": 25 }));
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, (11..=20).collect::<Vec<_>>());
}

#[tokio::test]
async fn unbounded_list_reports_rows_returned() {
    let client = Client::new();
    for i in 0..3 {
        client.create_user(&format!("user{}", i)).await;
    }
    let (status, body) = client.get("/api/users?page=3&limit=-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["meta"]["limit"], -1);
    assert_eq!(body["meta"]["total"], 3);
}

#[tokio::test]
async fn list_rejects_bad_limit_and_ignores_unknown_order() {
    let client = Client::new();
    client.create_user("ann").await;
    let (status, body) = client.get("/api/users?limit=-5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid parameter: `limit`.");

    let (status, body) = client.get("/api/users?order_by=password&search=AN").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
}

#[tokio::test]
async fn soft_deleted_user_is_not_found() {
    let client = Client::new();
    let id = client.create_user("ann").await;
    let uri = format!("/api/users/{}", id);

    let (status, _) = client.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = client.get(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(body["error"]["message"], "User not found.");

    let (_, body) = client.get("/api/users").await;
    assert_eq!(body["meta"]["total"], 0);
    let (_, body) = client.get("/api/users?include_deleted=true").await;
    assert_eq!(body["meta"]["total"], 1);
    assert!(body["data"][0]["deleted_at"].is_string());

    let (status, _) = client.send(Method::DELETE, &format!("{}?hard=true", uri), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = client.get("/api/users?include_deleted=true").await;
    assert_eq!(body["meta"]["total"], 0);
}

#[tokio::test]
async fn bad_path_id_and_body() {
    let client = Client::new();
    let (status, body) = client.get("/api/users/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid parameter: `user_id`.");

    let (status, body) = client
        .raw(Method::POST, "/api/users", Body::from("{not json"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid parameter: `body`.");
}

#[tokio::test]
async fn me_requires_actor() {
    let client = Client::new();
    let id = client.create_user("ann").await;
    let (status, body) = client.get("/api/users/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let (status, body) = client.acting_as(id).get("/api/users/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);
}

#[tokio::test]
async fn card_lifecycle_for_owner() {
    let client = Client::new();
    let id = client.create_user("ann").await;
    let owner = client.acting_as(id);
    let cards = format!("/api/users/{}/cards", id);

    let (status, body) = owner
        .send(Method::POST, &cards, Some(json!({ "name_card": " Visa ", "card_type": "credit" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name_card"], "Visa");
    assert_eq!(body["data"]["user_id"], id);
    let card_uri = format!("{}/{}", cards, body["data"]["id"]);

    let (status, body) = owner
        .send(Method::PUT, &card_uri, Some(json!({ "card_type": "debit" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["card_type"], "debit");
    assert_eq!(body["data"]["name_card"], "Visa");

    let (_, body) = owner.get(&format!("{}?card_type=debit", cards)).await;
    assert_eq!(body["meta"]["total"], 1);

    let (status, _) = owner.send(Method::DELETE, &card_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = owner.get(&card_uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Card not found.");
}

#[tokio::test]
async fn empty_name_card_is_rejected() {
    let client = Client::new();
    let id = client.create_user("ann").await;
    let (status, body) = client
        .acting_as(id)
        .send(
            Method::POST,
            &format!("/api/users/{}/cards", id),
            Some(json!({ "name_card": "", "card_type": "credit" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid parameter: `name_card`.");
}

#[tokio::test]
async fn cards_of_another_user_are_forbidden() {
    let client = Client::new();
    let ann = client.create_user("ann").await;
    let bob = client.create_user("bob").await;
    let (status, body) = client
        .acting_as(bob)
        .get(&format!("/api/users/{}/cards", ann))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "No permission.");
}

#[tokio::test]
async fn api_key_guards_api_routes() {
    let config = AppConfig {
        api_key: Some("valid-key".into()),
        ..AppConfig::default()
    };
    let mut client = Client::with_config(config);
    let (status, _) = client.get("/api/users").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = client.get("/health").await;
    assert_eq!(status, StatusCode::OK);

    client.bearer = Some("wrong-key");
    assert_eq!(client.get("/api/users").await.0, StatusCode::UNAUTHORIZED);
    client.bearer = Some("valid-key");
    assert_eq!(client.get("/api/users").await.0, StatusCode::OK);
}

#[tokio::test]
async fn deleting_a_user_takes_their_cards_along() {
    let client = Client::new();
    let ann = client.create_user("ann").await;
    let bob = client.create_user("bob").await;
    let ann_card = client.create_card(ann, "Visa").await;
    let bob_card = client.create_card(bob, "Amex").await;
    let owner = client.acting_as(ann);
    let user_uri = format!("/api/users/{}", ann);

    let (status, _) = client.send(Method::DELETE, &user_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = owner.get(&ann_card).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Card not found.");
    let (_, body) = owner.get(&format!("{}/cards", user_uri)).await;
    assert_eq!(body["meta"]["total"], 0);

    let (status, _) = client.send(Method::DELETE, &format!("{}?hard=true", user_uri), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(owner.get(&ann_card).await.0, StatusCode::NOT_FOUND);
    assert_eq!(client.acting_as(bob).get(&bob_card).await.0, StatusCode::OK);
}

#[tokio::test]
async fn lists_embed_related_rows() {
    let client = Client::new();
    let ann = client.create_user("ann").await;
    client.create_user("bob").await;
    client.create_card(ann, "Visa").await;
    let dropped = client.create_card(ann, "Amex").await;
    let owner = client.acting_as(ann);
    owner.send(Method::DELETE, &dropped, None).await;

    let (status, body) = client.get("/api/users?order_by=id").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["username"], "ann");
    let cards = body["data"][0]["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["name_card"], "Visa");
    assert_eq!(body["data"][1]["cards"], json!([]));

    let (status, body) = owner.get(&format!("/api/users/{}/cards", ann)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["name_card"], "Visa");
    assert_eq!(body["data"][0]["user"]["id"], ann);
    assert_eq!(body["data"][0]["user"]["username"], "ann");
}
