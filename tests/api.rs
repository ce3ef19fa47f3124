use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;
use zoomies_storefront::{
    domain::aggregates::{DeliveryOption, Item, NewEmployee, NewItem, Order, OrderStatus, UserProfile, UserRole},
    domain::value_objects::{Category, EmployeeId, StoreId},
    events::EventPublisher,
    geo::NominatimClient,
    repository::{EmployeeRepository, ItemRepository, MemoryRepository, OrderRepository, UserRepository},
    routes,
    state::{AppState, Settings},
    storage::{LocalStorage, MemoryStorage},
};

struct TestApp {
    app: Router,
    repo: MemoryRepository,
}

fn test_app() -> TestApp {
    let repo = MemoryRepository::new();
    let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
    // Nothing listens here, so reverse geocoding always falls back to the coordinate label.
    let geocoder = NominatimClient::new("http://127.0.0.1:9").unwrap();
    let state = AppState::new(repo.clone(), storage, EventPublisher::disabled(), geocoder, Settings::default());
    TestApp { app: routes::router(state), repo }
}

async fn send(app: &Router, method: &str, uri: &str, headers: &[(&str, &str)], body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        req = req.header(*name, *value);
    }
    let req = match body {
        Some(body) => req.header("content-type", "application/json").body(Body::from(body.to_string())).unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, value)
}

async fn add_item(repo: &MemoryRepository, name: &str, category: Category) -> Item {
    let new = NewItem { name: name.into(), price: Decimal::new(1299, 2), category: Some(category), ..Default::default() };
    repo.insert_item(new.normalized().unwrap()).await.unwrap()
}

async fn add_employee(repo: &MemoryRepository, email: &str, store: &str, role: &str) -> EmployeeId {
    let new = NewEmployee {
        email: email.into(),
        password: "pw".into(),
        name: "Staff".into(),
        store_id: store.into(),
        role: Some(role.parse().unwrap()),
    };
    repo.insert_employee(new.normalized()).await.unwrap().id
}

fn order(id: &str, store: Option<&str>, minute: u32) -> Order {
    Order {
        id: id.into(),
        user_id: "U1".into(),
        items: vec![],
        pet_for: None,
        delivery_option: DeliveryOption::Store,
        address: Some("Store".into()),
        store_id: store.map(StoreId::from),
        delivery_address: None,
        status: OrderStatus::Pending,
        created_at: Some(Utc.with_ymd_and_hms(2026, 1, 1, 10, minute, 0).unwrap()),
        updated_at: None,
    }
}

#[tokio::test]
async fn test_health() {
    let t = test_app();
    let (status, body) = send(&t.app, "GET", "/health", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_items_filtered_by_category() {
    let t = test_app();
    add_item(&t.repo, "Cat Comb", Category::Cat).await;
    let bone = add_item(&t.repo, "Chew Bone", Category::Dog).await;

    let (status, body) = send(&t.app, "GET", "/api/v1/items?category=dog", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Chew Bone");

    let (status, body) = send(&t.app, "GET", &format!("/api/v1/items/{}", bone.id), &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "dog");

    let (status, _) = send(&t.app, "GET", "/api/v1/items/nope", &[], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_holds_one_item() {
    let t = test_app();
    let comb = add_item(&t.repo, "Cat Comb", Category::Cat).await;
    let bone = add_item(&t.repo, "Chew Bone", Category::Dog).await;

    let (status, body) = send(&t.app, "POST", "/api/v1/cart/s1", &[], Some(json!({"itemId": comb.id}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalItems"], 1);

    let (status, body) = send(&t.app, "POST", "/api/v1/cart/s1", &[], Some(json!({"itemId": bone.id}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Giveaway allows only 1 item");

    let uri = format!("/api/v1/cart/s1/{}", comb.id);
    let (status, body) = send(&t.app, "PATCH", &uri, &[], Some(json!({"delta": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only 1 quantity allowed");

    let (_, body) = send(&t.app, "GET", "/api/v1/cart/s1", &[], None).await;
    assert_eq!(body["items"][0]["quantity"], 1);
    assert_eq!(body["items"][0]["name"], "Cat Comb");

    let (status, body) = send(&t.app, "PATCH", &uri, &[], Some(json!({"delta": -1}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalItems"], 0);

    let (_, body) = send(&t.app, "GET", "/api/v1/cart/other-browser", &[], None).await;
    assert_eq!(body["items"], json!([]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_simultaneous_adds_keep_one_item() {
    let t = test_app();
    let comb = add_item(&t.repo, "Cat Comb", Category::Cat).await;
    let bone = add_item(&t.repo, "Chew Bone", Category::Dog).await;

    let (first, second) = tokio::join!(
        send(&t.app, "POST", "/api/v1/cart/s1", &[], Some(json!({"itemId": comb.id}))),
        send(&t.app, "POST", "/api/v1/cart/s1", &[], Some(json!({"itemId": bone.id}))),
    );
    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::BAD_REQUEST]);

    let (_, body) = send(&t.app, "GET", "/api/v1/cart/s1", &[], None).await;
    assert_eq!(body["totalItems"], 1);
}

#[tokio::test]
async fn test_checkout_preconditions_write_nothing() {
    let t = test_app();
    let comb = add_item(&t.repo, "Cat Comb", Category::Cat).await;
    let pickup = json!({"deliveryOption": "store"});

    let (status, body) = send(&t.app, "POST", "/api/v1/checkout/s1", &[("x-user-id", "U1")], Some(pickup.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["redirect"], "/items");

    send(&t.app, "POST", "/api/v1/cart/s1", &[], Some(json!({"itemId": comb.id}))).await;
    let (status, body) = send(&t.app, "POST", "/api/v1/checkout/s1", &[], Some(pickup)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/login");

    let custom = json!({"deliveryOption": "custom", "address": "   "});
    let (status, body) = send(&t.app, "POST", "/api/v1/checkout/s1", &[("x-user-id", "U1")], Some(custom)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please select your delivery location");

    assert_eq!(t.repo.order_count().unwrap(), 0);
}

#[tokio::test]
async fn test_checkout_then_confirmation_clears_cart() {
    let t = test_app();
    let comb = add_item(&t.repo, "Cat Comb", Category::Cat).await;
    send(&t.app, "POST", "/api/v1/cart/s1", &[], Some(json!({"itemId": comb.id}))).await;

    let body = json!({
        "deliveryOption": "custom",
        "address": "221B Baker Street",
        "coordinates": {"lat": 51.5237, "lng": -0.1585},
        "details": {"house": "221B", "city": "London"},
        "petFor": "Miso"
    });
    let (status, receipt) = send(&t.app, "POST", "/api/v1/checkout/s1", &[("x-user-id", "U1")], Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = receipt["orderId"].as_str().unwrap().to_string();
    assert!(receipt["redirect"].as_str().unwrap().starts_with("/order-placed"));

    let stored = t.repo.get_order(&order_id.as_str().into()).await.unwrap().unwrap();
    assert_eq!(stored.store_id.as_ref().map(StoreId::as_str), Some("store1"));
    assert_eq!(stored.address.as_deref(), Some("221B Baker Street"));
    assert_eq!(stored.delivery_address.as_ref().unwrap().details.city, "London");
    assert_eq!(stored.status, OrderStatus::Pending);

    // Placing does not empty the cart; loading the confirmation does.
    let (_, cart) = send(&t.app, "GET", "/api/v1/cart/s1", &[], None).await;
    assert_eq!(cart["totalItems"], 1);

    let uri = format!("/api/v1/orders/{order_id}/confirmation?session=s1");
    let (status, _) = send(&t.app, "GET", &uri, &[("x-user-id", "U2")], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, confirmation) = send(&t.app, "GET", &uri, &[("x-user-id", "U1")], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmation["order"]["petFor"], "Miso");
    let (_, cart) = send(&t.app, "GET", "/api/v1/cart/s1", &[], None).await;
    assert_eq!(cart["totalItems"], 0);

    let (_, mine) = send(&t.app, "GET", "/api/v1/orders/mine", &[("x-user-id", "U1")], None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_dashboard_merges_legacy_orders() {
    let t = test_app();
    add_employee(&t.repo, "groomer@zoomies.test", "S", "employee").await;
    t.repo.seed_order(order("A", Some("S"), 2)).unwrap();
    t.repo.seed_order(order("B", None, 3)).unwrap();
    t.repo.seed_order(order("C", Some("T"), 1)).unwrap();

    let creds = json!({"email": "Groomer@Zoomies.test", "password": "pw"});
    let (status, session) = send(&t.app, "POST", "/api/v1/employees/login/b1", &[], Some(creds)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["storeId"], "S");
    assert!(session.get("password").is_none());

    let staff = [("x-session-id", "b1")];
    let (status, orders) = send(&t.app, "GET", "/api/v1/dashboard/orders", &staff, None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = orders.as_array().unwrap().iter().map(|o| o["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["B", "A"]);

    let (status, _) = send(&t.app, "GET", "/api/v1/dashboard/orders?store_id=T", &staff, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&t.app, "GET", "/api/v1/dashboard/orders", &[], None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&t.app, "DELETE", "/api/v1/employees/login/b1", &[], None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&t.app, "GET", "/api/v1/employees/me", &staff, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status_update_scoped_to_store() {
    let t = test_app();
    add_employee(&t.repo, "groomer@zoomies.test", "S", "employee").await;
    t.repo.seed_order(order("A", Some("S"), 1)).unwrap();
    t.repo.seed_order(order("C", Some("T"), 2)).unwrap();
    send(&t.app, "POST", "/api/v1/employees/login/b1", &[], Some(json!({"email": "groomer@zoomies.test", "password": "pw"})))
        .await;
    let staff = [("x-session-id", "b1")];

    let (status, _) = send(&t.app, "PUT", "/api/v1/orders/A/status", &staff, Some(json!({"status": "ready"}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(t.repo.get_order(&"A".into()).await.unwrap().unwrap().status, OrderStatus::Ready);

    let (status, _) = send(&t.app, "PUT", "/api/v1/orders/C/status", &staff, Some(json!({"status": "ready"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&t.app, "PUT", "/api/v1/orders/ghost/status", &staff, Some(json!({"status": "ready"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deactivated_employee_loses_session() {
    let t = test_app();
    let id = add_employee(&t.repo, "groomer@zoomies.test", "S", "manager").await;
    send(&t.app, "POST", "/api/v1/employees/login/b1", &[], Some(json!({"email": "groomer@zoomies.test", "password": "pw"})))
        .await;
    let (status, me) = send(&t.app, "GET", "/api/v1/employees/me", &[("x-session-id", "b1")], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "manager");

    t.repo
        .update_employee(&id, zoomies_storefront::domain::aggregates::EmployeeUpdate { is_active: Some(false), ..Default::default() })
        .await
        .unwrap();
    let (status, _) = send(&t.app, "GET", "/api/v1/employees/me", &[("x-session-id", "b1")], None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) =
        send(&t.app, "POST", "/api/v1/employees/login/b2", &[], Some(json!({"email": "groomer@zoomies.test", "password": "pw"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password.");
}

#[tokio::test]
async fn test_admin_routes_gated() {
    let t = test_app();
    let item = json!({"name": "  Paw Balm ", "price": 4.5, "description": " "});

    let (status, _) = send(&t.app, "POST", "/api/v1/items", &[], Some(item.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&t.app, "POST", "/api/v1/items", &[("x-user-id", "U1")], Some(item.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut admin = UserProfile::new("ADMIN".into());
    admin.role = UserRole::Admin;
    t.repo.upsert_profile(admin).await.unwrap();
    let as_admin = [("x-user-id", "ADMIN")];

    let (status, created) = send(&t.app, "POST", "/api/v1/items", &as_admin, Some(item)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Paw Balm");
    assert_eq!(created["category"], "dog");
    assert_eq!(created["image"], "/logo.png");
    assert!(created["description"].is_null());

    let (status, _) = send(&t.app, "POST", "/api/v1/items", &as_admin, Some(json!({"name": "Bad", "price": -1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    t.repo.seed_order(order("A", Some("S"), 1)).unwrap();
    let (status, all) = send(&t.app, "GET", "/api/v1/admin/orders", &as_admin, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);

    let new_employee = json!({"email": "New@Zoomies.test", "password": "pw", "name": "New", "storeId": "S"});
    let (status, employee) = send(&t.app, "POST", "/api/v1/admin/employees", &as_admin, Some(new_employee)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(employee["email"], "new@zoomies.test");
    assert_eq!(employee["role"], "employee");
    assert_eq!(employee["isActive"], true);
}

#[tokio::test]
async fn test_missing_store_gives_placeholder() {
    let t = test_app();
    let (status, store) = send(&t.app, "GET", "/api/v1/stores/store9", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store["name"], "Store");
    assert_eq!(store["address"], "—");
}

#[tokio::test]
async fn test_geocoding_messages() {
    let t = test_app();
    let (status, body) = send(&t.app, "GET", "/api/v1/geocode/search?q=", &[], None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please enter a location to search.");

    let denied = json!({"error": {"code": 1, "message": "User denied Geolocation"}});
    let (status, body) = send(&t.app, "POST", "/api/v1/geocode/locate", &[], Some(denied)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Permission denied: Please allow access to your location in browser settings.");

    let expired = json!({"error": {"code": 3, "message": "Timeout expired"}});
    let (status, body) = send(&t.app, "POST", "/api/v1/geocode/locate", &[], Some(expired)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Request timed out: Please try again.");

    let found = json!({"coords": {"lat": 28.6139, "lng": 77.209}});
    let (status, body) = send(&t.app, "POST", "/api/v1/geocode/locate", &[], Some(found)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], "Lat: 28.6139, Lng: 77.2090");
}

#[tokio::test]
async fn test_pet_profile() {
    let t = test_app();
    let (status, _) = send(&t.app, "GET", "/api/v1/profile", &[], None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let pet = json!({"petType": "cat", "selectedPetName": "Miso"});
    let (status, profile) = send(&t.app, "PUT", "/api/v1/profile/pet", &[("x-user-id", "U1")], Some(pet)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["hasPetProfile"], true);
    assert_eq!(profile["petType"], "cat");
    assert_eq!(profile["role"], "user");
}
