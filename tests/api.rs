//! Black-box HTTP tests against a live PostgreSQL database.
//!
//! Each test resets and reseeds the catalog, so they must not share a
//! database concurrently. Run with:
//!
//!   DATABASE_URL=postgres://localhost/catalog_test \
//!     cargo test --test api -- --ignored --test-threads=1

use reqwest::StatusCode;
use serde_json::{json, Value};

use catalog_api::{auth, fixtures, migration, routes, store, AppState};

const API_TOKEN: &str = "test-api-token-0001";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Migrate, reset, reseed (5 manufacturers, 100 products), and serve the
    /// production router on an ephemeral port.
    async fn spawn() -> Self {
        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a test database");
        store::ensure_database_exists(&database_url)
            .await
            .expect("ensure database");
        let pool = store::connect(&database_url, 5).await.expect("connect");
        migration::run(&pool).await.expect("migrations");

        sqlx::query("TRUNCATE product, manufacturer RESTART IDENTITY")
            .execute(&pool)
            .await
            .expect("reset catalog tables");
        sqlx::query("DELETE FROM api_token")
            .execute(&pool)
            .await
            .expect("reset tokens");
        auth::provision_token(&pool, API_TOKEN, "test")
            .await
            .expect("provision token");
        fixtures::seed_demo(&pool).await.expect("seed");

        let app = routes::app(AppState::new(pool));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn get_json(srv: &TestServer, path: &str) -> (StatusCode, Value) {
    let res = reqwest::Client::new()
        .get(srv.url(path))
        .header("x-api-token", API_TOKEN)
        .send()
        .await
        .unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn collection_envelope_and_first_page() {
    let srv = TestServer::spawn().await;
    let (status, body) = get_json(&srv, "/api/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["@context"], "/api/contexts/Product");
    assert_eq!(body["@id"], "/api/products");
    assert_eq!(body["@type"], "hydra:Collection");
    assert_eq!(body["hydra:totalItems"], 100);
    assert_eq!(body["hydra:member"].as_array().unwrap().len(), 5);

    let view = &body["hydra:view"];
    assert_eq!(view["@id"], "/api/products?page=1");
    assert_eq!(view["@type"], "hydra:PartialCollectionView");
    assert_eq!(view["hydra:first"], "/api/products?page=1");
    assert_eq!(view["hydra:last"], "/api/products?page=20");
    assert_eq!(view["hydra:next"], "/api/products?page=2");
    assert!(view.get("hydra:previous").is_none());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn second_page_links_both_ways() {
    let srv = TestServer::spawn().await;
    let (_, body) = get_json(&srv, "/api/products?page=2").await;

    let view = &body["hydra:view"];
    assert_eq!(view["@id"], "/api/products?page=2");
    assert_eq!(view["hydra:previous"], "/api/products?page=1");
    assert_eq!(view["hydra:next"], "/api/products?page=3");
    assert_eq!(view["hydra:last"], "/api/products?page=20");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn create_product_normalizes_issue_date() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .post(srv.url("/api/products"))
        .header("x-api-token", API_TOKEN)
        .json(&json!({
            "mpn": "1234",
            "name": "A Test Product",
            "description": "A Test Description",
            "issueDate": "1985-07-31",
            "manufacturer": "/api/manufacturers/1",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["mpn"], "1234");
    assert_eq!(body["name"], "A Test Product");
    assert_eq!(body["description"], "A Test Description");
    assert_eq!(body["issueDate"], "1985-07-31T00:00:00+00:00");
    assert_eq!(body["manufacturer"], "/api/manufacturers/1");
    assert!(body["id"].as_i64().is_some());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn create_then_fetch_round_trips_all_fields() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .post(srv.url("/api/products"))
        .header("x-api-token", API_TOKEN)
        .json(&json!({
            "mpn": "RT-77",
            "name": "Round Trip",
            "description": "Survives a create-then-get cycle",
            "issueDate": "2022-02-02",
            "manufacturer": "/api/manufacturers/2",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = get_json(&srv, &format!("/api/products/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    for field in ["mpn", "name", "description", "issueDate", "manufacturer", "id"] {
        assert_eq!(fetched[field], created[field], "field {field} must round-trip");
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn partial_update_touches_only_the_given_field() {
    let srv = TestServer::spawn().await;
    let (_, before) = get_json(&srv, "/api/products/1").await;

    let res = reqwest::Client::new()
        .put(srv.url("/api/products/1"))
        .header("x-api-token", API_TOKEN)
        .json(&json!({ "description": "An updated description" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["@id"], "/api/products/1");
    assert_eq!(updated["description"], "An updated description");
    assert_eq!(updated["name"], before["name"]);
    assert_eq!(updated["mpn"], before["mpn"]);
    assert_eq!(updated["issueDate"], before["issueDate"]);
    assert_eq!(updated["manufacturer"], before["manufacturer"]);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn null_manufacturer_is_a_constraint_violation() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .post(srv.url("/api/products"))
        .header("x-api-token", API_TOKEN)
        .json(&json!({
            "mpn": "1234",
            "name": "A Test Product",
            "description": "A Test Description",
            "issueDate": "1985-07-31",
            "manufacturer": null,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["@context"], "/api/contexts/ConstraintViolationList");
    assert_eq!(body["@type"], "ConstraintViolationList");
    assert_eq!(body["hydra:title"], "An error occurred");
    assert_eq!(
        body["hydra:description"],
        "manufacturer: This value should not be null."
    );
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn unresolvable_manufacturer_reference_is_the_same_violation() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .post(srv.url("/api/products"))
        .header("x-api-token", API_TOKEN)
        .json(&json!({
            "mpn": "1234",
            "name": "A Test Product",
            "description": "A Test Description",
            "issueDate": "1985-07-31",
            "manufacturer": "/api/manufacturers/9999",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body["hydra:description"],
        "manufacturer: This value should not be null."
    );
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn invalid_token_gets_401_and_mutates_nothing() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .put(srv.url("/api/products/1"))
        .header("x-api-token", "fake-token")
        .json(&json!({ "description": "An updated description" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Invalid credentials.");

    let (_, product) = get_json(&srv, "/api/products/1").await;
    assert_ne!(product["description"], "An updated description");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn page_zero_is_invalid_but_beyond_range_is_empty() {
    let srv = TestServer::spawn().await;

    let (status, body) = get_json(&srv, "/api/products?page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["@type"], "hydra:Error");

    let (status, body) = get_json(&srv, "/api/products?page=25").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hydra:totalItems"], 100);
    assert!(body["hydra:member"].as_array().unwrap().is_empty());
    assert_eq!(body["hydra:view"]["hydra:last"], "/api/products?page=20");
    assert!(body["hydra:view"].get("hydra:next").is_none());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn filters_count_over_the_filtered_set() {
    let srv = TestServer::spawn().await;

    // Products are seeded round-robin over 5 manufacturers: 20 each.
    let (_, body) = get_json(&srv, "/api/products?manufacturer.id=1").await;
    assert_eq!(body["hydra:totalItems"], 20);
    assert_eq!(body["hydra:view"]["hydra:last"], "/api/products?manufacturer.id=1&page=4");

    let (_, body) = get_json(&srv, "/api/products?manufacturer.countryCode=USA").await;
    assert_eq!(body["hydra:totalItems"], 20);

    let (_, body) = get_json(&srv, "/api/products?name=Product%20100").await;
    assert_eq!(body["hydra:totalItems"], 1);
    assert_eq!(body["hydra:member"][0]["name"], "Product 100");

    let (status, _) = get_json(&srv, "/api/products?manufacturer.id=acme").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn issue_date_ordering_is_client_controlled() {
    let srv = TestServer::spawn().await;

    let (_, body) = get_json(&srv, "/api/products?order[issueDate]=desc").await;
    assert_eq!(body["hydra:member"][0]["name"], "Product 100");

    let (_, body) = get_json(&srv, "/api/products?order[issueDate]=asc").await;
    assert_eq!(body["hydra:member"][0]["name"], "Product 1");

    let (status, _) = get_json(&srv, "/api/products?order[issueDate]=sideways").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn deleting_a_manufacturer_cascades_to_its_products() {
    let srv = TestServer::spawn().await;

    let res = reqwest::Client::new()
        .delete(srv.url("/api/manufacturers/1"))
        .header("x-api-token", API_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let (status, _) = get_json(&srv, "/api/manufacturers/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = get_json(&srv, "/api/products?manufacturer.id=1").await;
    assert_eq!(body["hydra:totalItems"], 0);

    let (_, body) = get_json(&srv, "/api/products").await;
    assert_eq!(body["hydra:totalItems"], 80);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn manufacturer_validation_reports_every_violation() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .post(srv.url("/api/manufacturers"))
        .header("x-api-token", API_TOKEN)
        .json(&json!({
            "name": "   ",
            "description": "Plastic housings",
            "countryCode": "DEUX",
            "listedDate": "2021-06-01",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body["hydra:description"],
        "name: This value should not be blank.\n\
         countryCode: This value is too long. It should have 3 characters or less."
    );
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn manufacturer_item_lists_its_products() {
    let srv = TestServer::spawn().await;
    let (status, body) = get_json(&srv, "/api/manufacturers/2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["@context"], "/api/contexts/Manufacturer");
    assert_eq!(body["@id"], "/api/manufacturers/2");
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 20);
    assert_eq!(products[0], "/api/products/2");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn health_routes_are_open_but_api_is_not() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/api/products")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
