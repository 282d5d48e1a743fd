use std::sync::Arc;
use backend::{auth::SessionKeys, build_rocket, config::Settings, routes::AppState, store::MemoryStore};
use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::{Client, LocalResponse};
use serde_json::{json, Value};
use shared::{Role, SessionClaims};
use uuid::Uuid;

const SECRET: &str = "integration-secret-integration-secret";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn client_with(attempts_per_minute: &str) -> Client {
    client_from(&[("VOTE_ATTEMPTS_PER_MINUTE", attempts_per_minute)]).await
}

async fn client_from(overrides: &[(&str, &str)]) -> Client {
    init_tracing();
    let settings = Settings::from_lookup(|key| match key {
        "SESSION_SECRET" => Some(SECRET.to_string()),
        _ => overrides.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string()),
    })
    .expect("settings");
    let state = AppState::new(Arc::new(MemoryStore::new()), settings);
    Client::tracked(build_rocket(state)).await.expect("valid rocket instance")
}

async fn client() -> Client {
    client_with("1000").await
}

fn bearer(user: Uuid, role: Role) -> Header<'static> {
    let claims = SessionClaims::new(user, role, time::Duration::hours(1));
    let token = SessionKeys::new(SECRET.as_bytes()).issue(&claims).expect("token");
    Header::new("Authorization", format!("Bearer {token}"))
}

async fn body(response: LocalResponse<'_>) -> Value {
    response.into_json::<Value>().await.expect("json body")
}

async fn add_item(client: &Client, admin: Uuid, name: &str) -> Uuid {
    let response = client.post("/api/votes/wishlist-item")
        .header(ContentType::JSON)
        .header(bearer(admin, Role::Admin))
        .body(json!({ "name": name }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let id = body(response).await["data"]["id"].as_str().expect("id").to_string();
    Uuid::parse_str(&id).expect("uuid")
}

async fn vote<'c>(client: &'c Client, user: Uuid, ids: &[Uuid]) -> LocalResponse<'c> {
    client.post("/api/votes/vote")
        .header(ContentType::JSON)
        .header(bearer(user, Role::Customer))
        .body(json!({ "selected": ids }).to_string())
        .dispatch()
        .await
}

#[rocket::async_test]
async fn voting_flow_end_to_end() {
    let client = client().await;
    let admin = Uuid::new_v4();
    let a = add_item(&client, admin, "Air fryer").await;
    let b = add_item(&client, admin, "Standing desk").await;
    add_item(&client, admin, "Espresso machine").await;
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());

    let response = vote(&client, u1, &[a, b]).await;
    assert_eq!(response.status(), Status::Ok);
    let receipt = body(response).await;
    assert_eq!(receipt["votesUpdated"], 2);
    assert_eq!(receipt["success"], true);

    let response = vote(&client, u1, &[a]).await;
    assert_eq!(response.status(), Status::Conflict);
    let error = body(response).await;
    assert_eq!(error["code"], "alreadyVoted");
    assert_eq!(error["conflicts"][0]["name"], "Air fryer");

    assert_eq!(vote(&client, u2, &[a]).await.status(), Status::Ok);

    let response = client.get("/api/votes/top-voted?limit=2").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let top = body(response).await;
    let rows = top["data"].as_array().expect("rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Air fryer");
    assert_eq!(rows[0]["voteCount"], 2);
    assert_eq!(rows[1]["name"], "Standing desk");
    assert_eq!(rows[1]["voteCount"], 1);

    let all = body(client.get("/api/votes/products-with-votes").dispatch().await).await;
    assert_eq!(all["data"].as_array().expect("rows").len(), 3);

    let response = client.get(format!("/api/votes/user/{u1}/voted-products"))
        .header(bearer(u1, Role::Customer))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let voted = body(response).await;
    let ids = voted["productIds"].as_array().expect("ids");
    assert_eq!(ids.len(), 2);
}

#[rocket::async_test]
async fn top_voted_defaults_to_three() {
    let client = client().await;
    let admin = Uuid::new_v4();
    for name in ["One", "Two", "Three", "Four", "Five"] {
        add_item(&client, admin, name).await;
    }
    let top = body(client.get("/api/votes/top-voted").dispatch().await).await;
    assert_eq!(top["data"].as_array().expect("rows").len(), 3);
}

#[rocket::async_test]
async fn votes_require_a_session() {
    let client = client().await;
    let response = client.post("/api/votes/vote")
        .header(ContentType::JSON)
        .body(json!({ "selected": [Uuid::new_v4()] }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
    assert_eq!(body(response).await["code"], "unauthorized");

    let response = client.post("/api/votes/vote")
        .header(ContentType::JSON)
        .header(Header::new("Authorization", "Bearer forged.token"))
        .body(json!({ "selected": [Uuid::new_v4()] }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn empty_vote_is_rejected() {
    let client = client().await;
    let response = vote(&client, Uuid::new_v4(), &[]).await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response).await["code"], "invalidRequest");
}

#[rocket::async_test]
async fn admin_routes_reject_customers() {
    let client = client().await;
    let response = client.post("/api/votes/wishlist-item")
        .header(ContentType::JSON)
        .header(bearer(Uuid::new_v4(), Role::Customer))
        .body(json!({ "name": "Drone" }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
    assert_eq!(body(response).await["code"], "forbidden");

    let id = add_item(&client, Uuid::new_v4(), "Drone").await;
    let response = client.delete(format!("/api/votes/wishlist-item/{id}"))
        .header(bearer(Uuid::new_v4(), Role::Customer))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
}

#[rocket::async_test]
async fn item_lifecycle_errors() {
    let client = client().await;
    let admin = Uuid::new_v4();
    let id = add_item(&client, admin, "Drone").await;

    let response = client.post("/api/votes/wishlist-item")
        .header(ContentType::JSON)
        .header(bearer(admin, Role::Admin))
        .body(json!({ "name": "  Drone " }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Conflict);
    assert_eq!(body(response).await["code"], "duplicateName");

    let response = client.delete(format!("/api/votes/wishlist-item/{id}"))
        .header(bearer(admin, Role::Admin))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client.delete(format!("/api/votes/wishlist-item/{id}"))
        .header(bearer(admin, Role::Admin))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response).await["code"], "notFound");

    let response = client.delete("/api/votes/wishlist-item/not-a-uuid")
        .header(bearer(admin, Role::Admin))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn users_only_read_their_own_votes() {
    let client = client().await;
    let (owner, other) = (Uuid::new_v4(), Uuid::new_v4());

    let response = client.get(format!("/api/votes/user/{owner}/voted-products"))
        .header(bearer(other, Role::Customer))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client.get(format!("/api/votes/user/{owner}/voted-products"))
        .header(bearer(other, Role::Admin))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client.get(format!("/api/votes/user/{owner}/voted-products")).dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn vote_submissions_are_rate_limited() {
    let client = client_with("2").await;
    let admin = Uuid::new_v4();
    let ids = [
        add_item(&client, admin, "One").await,
        add_item(&client, admin, "Two").await,
        add_item(&client, admin, "Three").await,
    ];
    let user = Uuid::new_v4();

    assert_eq!(vote(&client, user, &ids[..1]).await.status(), Status::Ok);
    assert_eq!(vote(&client, user, &ids[1..2]).await.status(), Status::Ok);
    let response = vote(&client, user, &ids[2..]).await;
    assert_eq!(response.status(), Status::TooManyRequests);
    assert_eq!(body(response).await["code"], "rateLimited");
}

#[rocket::async_test]
async fn malformed_vote_ids_are_bad_requests() {
    let client = client().await;
    let response = client.post("/api/votes/vote")
        .header(ContentType::JSON)
        .header(bearer(Uuid::new_v4(), Role::Customer))
        .body(json!({ "selected": ["not-a-uuid"] }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let error = body(response).await;
    assert_eq!(error["code"], "invalidRequest");
    assert_eq!(error["status"], 400);
}

#[rocket::async_test]
async fn json_bodies_do_not_need_a_content_type() {
    let client = client().await;
    let admin = Uuid::new_v4();
    let id = add_item(&client, admin, "Air fryer").await;

    let response = client.post("/api/votes/vote")
        .header(bearer(Uuid::new_v4(), Role::Customer))
        .body(json!({ "selected": [id] }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client.post("/api/votes/vote")
        .header(bearer(Uuid::new_v4(), Role::Customer))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response).await["code"], "invalidRequest");
}

#[rocket::async_test]
async fn profane_item_names_are_rejected() {
    let client = client().await;
    let response = client.post("/api/votes/wishlist-item")
        .header(ContentType::JSON)
        .header(bearer(Uuid::new_v4(), Role::Admin))
        .body(json!({ "name": "fuck this blender" }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response).await["code"], "invalidRequest");

    let all = body(client.get("/api/votes/products-with-votes").dispatch().await).await;
    assert!(all["data"].as_array().expect("rows").is_empty());
}

#[rocket::async_test]
async fn cors_only_echoes_the_configured_origin() {
    let client = client_from(&[("ALLOWED_ORIGIN", "https://shop.example")]).await;

    let response = client.get("/api/votes/top-voted")
        .header(Header::new("Origin", "https://shop.example"))
        .dispatch()
        .await;
    assert_eq!(response.headers().get_one("Access-Control-Allow-Origin"), Some("https://shop.example"));
    assert_eq!(response.headers().get_one("Access-Control-Allow-Credentials"), Some("true"));

    for origin in ["https://shop.example.attacker.net", "https://shop.examplex", "http://shop.example"] {
        let response = client.get("/api/votes/top-voted")
            .header(Header::new("Origin", origin))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.headers().get_one("Access-Control-Allow-Origin"), None);
        assert_eq!(response.headers().get_one("Access-Control-Allow-Credentials"), None);
    }
}
