//! Postgres-backed document store
//!
//! Queries are built at runtime (`query_as::<_, Row>`), so the crate compiles without
//! a live database. Nested order parts (`items`, `delivery_address`) are JSONB.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;

use super::{
    EmployeeFilter, EmployeeRepository, ItemRepository, OrderRepository, RepoResult, RepositoryError,
    StoreRepository, UserRepository,
};
use crate::domain::aggregates::{
    CartEntry, DeliveryAddress, Employee, EmployeeUpdate, Item, ItemChanges, NewEmployee, NewOrder, NewStore,
    NormalizedItem, Order, OrderStatus, Store, StoreChanges, UserProfile, UserRole,
};
use crate::domain::value_objects::{Category, Coordinates, EmployeeId, ItemId, OrderId, Price, StoreId, UserId};

/// Opens the pool used by [`PgRepository`].
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
}

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn corrupt(what: &str, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::DataCorruption(format!("{what}: {err}"))
}

fn require_row(rows_affected: u64, what: &'static str) -> RepoResult<()> {
    if rows_affected == 0 { Err(RepositoryError::NotFound(what)) } else { Ok(()) }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: String,
    name: String,
    price: Decimal,
    image: Option<String>,
    category: Option<String>,
    description: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<ItemRow> for Item {
    type Error = RepositoryError;
    fn try_from(r: ItemRow) -> RepoResult<Self> {
        Ok(Item {
            id: r.id.into(),
            name: r.name,
            price: Price::new(r.price).map_err(|e| corrupt("items.price", e))?,
            image: r.image.filter(|i| !i.is_empty()).unwrap_or_else(|| crate::domain::aggregates::item::DEFAULT_ITEM_IMAGE.into()),
            category: Category::from_stored(r.category.as_deref()),
            description: r.description,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StoreRow {
    id: String,
    name: String,
    address: Option<String>,
    phone: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<StoreRow> for Store {
    fn from(r: StoreRow) -> Self {
        Store {
            id: r.id.into(),
            name: r.name,
            address: r.address,
            phone: r.phone,
            coordinates: r.lat.zip(r.lng).map(|(lat, lng)| Coordinates::new(lat, lng)),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: String,
    email: String,
    password: String,
    name: String,
    store_id: String,
    role: Option<String>,
    is_active: Option<bool>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = RepositoryError;
    fn try_from(r: EmployeeRow) -> RepoResult<Self> {
        let role = match r.role.as_deref() {
            None | Some("") => Default::default(),
            Some(role) => role.parse().map_err(|e| corrupt("employees.role", e))?,
        };
        Ok(Employee {
            id: r.id.into(),
            email: r.email,
            password: r.password,
            name: r.name,
            store_id: r.store_id.into(),
            role,
            is_active: r.is_active.unwrap_or(true),
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    items: Json<Vec<CartEntry>>,
    pet_for: Option<String>,
    delivery_option: String,
    address: Option<String>,
    store_id: Option<String>,
    delivery_address: Option<Json<DeliveryAddress>>,
    status: String,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;
    fn try_from(r: OrderRow) -> RepoResult<Self> {
        Ok(Order {
            id: r.id.into(),
            user_id: r.user_id.into(),
            items: r.items.0,
            pet_for: r.pet_for,
            delivery_option: r.delivery_option.parse().map_err(|e| corrupt("orders.delivery_option", e))?,
            address: r.address,
            store_id: r.store_id.map(StoreId::from),
            delivery_address: r.delivery_address.map(|d| d.0),
            status: r.status.parse().map_err(|e| corrupt("orders.status", e))?,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

fn orders(rows: Vec<OrderRow>) -> RepoResult<Vec<Order>> { rows.into_iter().map(Order::try_from).collect() }

#[derive(sqlx::FromRow)]
struct UserRow {
    uid: String,
    role: Option<String>,
    has_pet_profile: Option<bool>,
    pet_type: Option<String>,
    selected_pet_name: Option<String>,
    addresses: Option<Json<Vec<serde_json::Value>>>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for UserProfile {
    fn from(r: UserRow) -> Self {
        UserProfile {
            uid: r.uid.into(),
            role: if r.role.as_deref() == Some("admin") { UserRole::Admin } else { UserRole::User },
            has_pet_profile: r.has_pet_profile.unwrap_or(false),
            pet_type: r.pet_type.and_then(|p| p.parse().ok()),
            selected_pet_name: r.selected_pet_name,
            addresses: r.addresses.map(|a| a.0).unwrap_or_default(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const ITEM_COLUMNS: &str = "id, name, price, image, category, description, created_at, updated_at";
const STORE_COLUMNS: &str = "id, name, address, phone, lat, lng, created_at, updated_at";
const EMPLOYEE_COLUMNS: &str = "id, email, password, name, store_id, role, is_active, created_at, updated_at";
const ORDER_COLUMNS: &str =
    "id, user_id, items, pet_for, delivery_option, address, store_id, delivery_address, status, created_at, updated_at";

impl ItemRepository for PgRepository {
    async fn list_items(&self, category: Option<Category>) -> RepoResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE $1::text IS NULL OR category = $1 ORDER BY created_at DESC NULLS LAST"
        ))
        .bind(category.map(|c| c.as_str()))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Item::try_from).collect()
    }

    async fn get_item(&self, id: &ItemId) -> RepoResult<Option<Item>> {
        sqlx::query_as::<_, ItemRow>(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(Item::try_from)
            .transpose()
    }

    async fn insert_item(&self, item: NormalizedItem) -> RepoResult<Item> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "INSERT INTO items (id, name, price, image, category, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW()) RETURNING {ITEM_COLUMNS}"
        ))
        .bind(ItemId::generate().as_str())
        .bind(&item.name)
        .bind(item.price.amount())
        .bind(&item.image)
        .bind(item.category.as_str())
        .bind(&item.description)
        .fetch_one(&self.pool)
        .await?;
        Item::try_from(row)
    }

    async fn update_item(&self, id: &ItemId, changes: ItemChanges) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE items SET name = COALESCE($2, name), price = COALESCE($3, price), image = COALESCE($4, image), \
             category = COALESCE($5, category), description = CASE WHEN $6 THEN $7 ELSE description END, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_str())
        .bind(&changes.name)
        .bind(changes.price.map(|p| p.amount()))
        .bind(&changes.image)
        .bind(changes.category.map(|c| c.as_str()))
        .bind(changes.description.is_some())
        .bind(changes.description.flatten())
        .execute(&self.pool)
        .await?;
        require_row(result.rows_affected(), "item")
    }

    async fn delete_item(&self, id: &ItemId) -> RepoResult<()> {
        sqlx::query("DELETE FROM items WHERE id = $1").bind(id.as_str()).execute(&self.pool).await?;
        Ok(())
    }
}

impl StoreRepository for PgRepository {
    async fn list_stores(&self) -> RepoResult<Vec<Store>> {
        let rows = sqlx::query_as::<_, StoreRow>(&format!("SELECT {STORE_COLUMNS} FROM stores ORDER BY name"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Store::from).collect())
    }

    async fn get_store(&self, id: &StoreId) -> RepoResult<Option<Store>> {
        Ok(sqlx::query_as::<_, StoreRow>(&format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(Store::from))
    }

    async fn insert_store(&self, store: NewStore) -> RepoResult<Store> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "INSERT INTO stores (id, name, address, phone, lat, lng, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW()) RETURNING {STORE_COLUMNS}"
        ))
        .bind(StoreId::generate().as_str())
        .bind(&store.name)
        .bind(&store.address)
        .bind(&store.phone)
        .bind(store.coordinates.map(|c| c.lat))
        .bind(store.coordinates.map(|c| c.lng))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn update_store(&self, id: &StoreId, changes: StoreChanges) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE stores SET name = COALESCE($2, name), \
             address = CASE WHEN $3 THEN $4 ELSE address END, phone = CASE WHEN $5 THEN $6 ELSE phone END, \
             lat = COALESCE($7, lat), lng = COALESCE($8, lng), updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_str())
        .bind(&changes.name)
        .bind(changes.address.is_some())
        .bind(changes.address.clone().flatten())
        .bind(changes.phone.is_some())
        .bind(changes.phone.clone().flatten())
        .bind(changes.coordinates.map(|c| c.lat))
        .bind(changes.coordinates.map(|c| c.lng))
        .execute(&self.pool)
        .await?;
        require_row(result.rows_affected(), "store")
    }

    async fn delete_store(&self, id: &StoreId) -> RepoResult<()> {
        sqlx::query("DELETE FROM stores WHERE id = $1").bind(id.as_str()).execute(&self.pool).await?;
        Ok(())
    }
}

impl EmployeeRepository for PgRepository {
    async fn list_employees(&self, filter: EmployeeFilter) -> RepoResult<Vec<Employee>> {
        let rows = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees \
             WHERE ($1::text IS NULL OR store_id = $1) AND (NOT $2 OR COALESCE(is_active, TRUE)) ORDER BY name"
        ))
        .bind(filter.store_id.as_ref().map(StoreId::as_str))
        .bind(filter.active_only)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Employee::try_from).collect()
    }

    async fn get_employee(&self, id: &EmployeeId) -> RepoResult<Option<Employee>> {
        sqlx::query_as::<_, EmployeeRow>(&format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(Employee::try_from)
            .transpose()
    }

    async fn insert_employee(&self, employee: NewEmployee) -> RepoResult<Employee> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            "INSERT INTO employees (id, email, password, name, store_id, role, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, TRUE, NOW(), NOW()) RETURNING {EMPLOYEE_COLUMNS}"
        ))
        .bind(EmployeeId::generate().as_str())
        .bind(&employee.email)
        .bind(&employee.password)
        .bind(&employee.name)
        .bind(employee.store_id.as_str())
        .bind(employee.role.unwrap_or_default().as_str())
        .fetch_one(&self.pool)
        .await?;
        Employee::try_from(row)
    }

    async fn update_employee(&self, id: &EmployeeId, update: EmployeeUpdate) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE employees SET email = COALESCE($2, email), password = COALESCE($3, password), \
             name = COALESCE($4, name), store_id = COALESCE($5, store_id), role = COALESCE($6, role), \
             is_active = COALESCE($7, is_active), updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_str())
        .bind(&update.email)
        .bind(&update.password)
        .bind(&update.name)
        .bind(update.store_id.as_ref().map(StoreId::as_str))
        .bind(update.role.map(|r| r.as_str()))
        .bind(update.is_active)
        .execute(&self.pool)
        .await?;
        require_row(result.rows_affected(), "employee")
    }

    async fn delete_employee(&self, id: &EmployeeId) -> RepoResult<()> {
        sqlx::query("DELETE FROM employees WHERE id = $1").bind(id.as_str()).execute(&self.pool).await?;
        Ok(())
    }
}

impl OrderRepository for PgRepository {
    async fn insert_order(&self, order: NewOrder) -> RepoResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (id, user_id, items, pet_for, delivery_option, address, store_id, delivery_address, \
             status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW()) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(OrderId::generate().as_str())
        .bind(order.user_id.as_str())
        .bind(Json(&order.items))
        .bind(&order.pet_for)
        .bind(order.delivery_option.as_str())
        .bind(&order.address)
        .bind(order.store_id.as_str())
        .bind(order.delivery_address.as_ref().map(Json))
        .bind(OrderStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;
        Order::try_from(row)
    }

    async fn get_order(&self, id: &OrderId) -> RepoResult<Option<Order>> {
        sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn orders_by_store(&self, store_id: &StoreId) -> RepoResult<Vec<Order>> {
        orders(
            sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE store_id = $1"))
                .bind(store_id.as_str())
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn recent_orders(&self, limit: usize) -> RepoResult<Vec<Order>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        orders(
            sqlx::query_as::<_, OrderRow>(&format!(
                "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC NULLS FIRST LIMIT $1"
            ))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?,
        )
    }

    async fn orders_by_user(&self, user_id: &UserId) -> RepoResult<Vec<Order>> {
        orders(
            sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1"))
                .bind(user_id.as_str())
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn all_orders(&self) -> RepoResult<Vec<Order>> {
        orders(sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders")).fetch_all(&self.pool).await?)
    }

    async fn set_order_status(&self, id: &OrderId, status: OrderStatus, at: DateTime<Utc>) -> RepoResult<()> {
        let result = sqlx::query("UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id.as_str())
            .bind(status.as_str())
            .bind(at)
            .execute(&self.pool)
            .await?;
        require_row(result.rows_affected(), "order")
    }
}

impl UserRepository for PgRepository {
    async fn get_profile(&self, uid: &UserId) -> RepoResult<Option<UserProfile>> {
        Ok(sqlx::query_as::<_, UserRow>(
            "SELECT uid, role, has_pet_profile, pet_type, selected_pet_name, addresses, created_at, updated_at \
             FROM users WHERE uid = $1",
        )
        .bind(uid.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(UserProfile::from))
    }

    async fn upsert_profile(&self, profile: UserProfile) -> RepoResult<()> {
        let role = match profile.role { UserRole::Admin => "admin", UserRole::User => "user" };
        sqlx::query(
            "INSERT INTO users (uid, role, has_pet_profile, pet_type, selected_pet_name, addresses, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW()) \
             ON CONFLICT (uid) DO UPDATE SET role = $2, has_pet_profile = $3, pet_type = $4, \
             selected_pet_name = $5, addresses = $6, updated_at = NOW()",
        )
        .bind(profile.uid.as_str())
        .bind(role)
        .bind(profile.has_pet_profile)
        .bind(profile.pet_type.map(|p| p.as_str()))
        .bind(&profile.selected_pet_name)
        .bind(Json(&profile.addresses))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
