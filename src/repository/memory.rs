//! In-process document store

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use super::{
    EmployeeFilter, EmployeeRepository, ItemRepository, OrderRepository, RepoResult, RepositoryError,
    StoreRepository, UserRepository,
};
use crate::domain::aggregates::{
    Employee, EmployeeUpdate, Item, ItemChanges, NewEmployee, NewOrder, NewStore, NormalizedItem, Order,
    OrderStatus, Store, StoreChanges, UserProfile,
};
use crate::domain::value_objects::{Category, EmployeeId, ItemId, OrderId, StoreId, UserId};

#[derive(Default)]
struct Collections {
    items: BTreeMap<ItemId, Item>,
    stores: BTreeMap<StoreId, Store>,
    employees: BTreeMap<EmployeeId, Employee>,
    orders: BTreeMap<OrderId, Order>,
    users: BTreeMap<UserId, UserProfile>,
}

/// Cloning shares the underlying collections.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    inner: Arc<RwLock<Collections>>,
    unavailable: Arc<AtomicBool>,
    scan_unavailable: Arc<AtomicBool>,
}

impl MemoryRepository {
    pub fn new() -> Self { Self::default() }

    /// While set, every call fails with [`RepositoryError::Unavailable`], as a lost
    /// database connection would.
    pub fn set_unavailable(&self, unavailable: bool) { self.unavailable.store(unavailable, Ordering::SeqCst); }

    /// While set, only [`OrderRepository::recent_orders`] fails.
    pub fn set_scan_unavailable(&self, unavailable: bool) { self.scan_unavailable.store(unavailable, Ordering::SeqCst); }

    /// Stores a document exactly as given, including legacy shapes the write path no
    /// longer produces (no store id, no timestamps).
    pub fn seed_order(&self, order: Order) -> RepoResult<()> {
        self.write()?.orders.insert(order.id.clone(), order);
        Ok(())
    }

    pub fn seed_store(&self, store: Store) -> RepoResult<()> {
        self.write()?.stores.insert(store.id.clone(), store);
        Ok(())
    }

    pub fn order_count(&self) -> RepoResult<usize> { Ok(self.read()?.orders.len()) }

    fn check(&self) -> RepoResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("memory store switched off".into()));
        }
        Ok(())
    }

    fn check_scan(&self) -> RepoResult<()> {
        if self.scan_unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("order scan switched off".into()));
        }
        Ok(())
    }

    fn read(&self) -> RepoResult<RwLockReadGuard<'_, Collections>> {
        self.check()?;
        self.inner.read().map_err(|_| RepositoryError::Unavailable("lock poisoned".into()))
    }

    fn write(&self) -> RepoResult<RwLockWriteGuard<'_, Collections>> {
        self.check()?;
        self.inner.write().map_err(|_| RepositoryError::Unavailable("lock poisoned".into()))
    }
}

/// Scan order for the legacy window: orders without a timestamp first, then newest first.
fn untimestamped_then_newest(orders: &mut [Order]) {
    orders.sort_by(|a, b| a.created_at.is_some().cmp(&b.created_at.is_some()).then(b.created_at.cmp(&a.created_at)));
}

impl ItemRepository for MemoryRepository {
    async fn list_items(&self, category: Option<Category>) -> RepoResult<Vec<Item>> {
        Ok(self.read()?.items.values().filter(|i| category.map_or(true, |c| i.category == c)).cloned().collect())
    }

    async fn get_item(&self, id: &ItemId) -> RepoResult<Option<Item>> { Ok(self.read()?.items.get(id).cloned()) }

    async fn insert_item(&self, item: NormalizedItem) -> RepoResult<Item> {
        let now = Utc::now();
        let item = Item {
            id: ItemId::generate(),
            name: item.name,
            price: item.price,
            image: item.image,
            category: item.category,
            description: item.description,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.write()?.items.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    async fn update_item(&self, id: &ItemId, changes: ItemChanges) -> RepoResult<()> {
        let mut guard = self.write()?;
        let item = guard.items.get_mut(id).ok_or(RepositoryError::NotFound("item"))?;
        changes.apply(item, Utc::now());
        Ok(())
    }

    async fn delete_item(&self, id: &ItemId) -> RepoResult<()> {
        self.write()?.items.remove(id);
        Ok(())
    }
}

impl StoreRepository for MemoryRepository {
    async fn list_stores(&self) -> RepoResult<Vec<Store>> { Ok(self.read()?.stores.values().cloned().collect()) }

    async fn get_store(&self, id: &StoreId) -> RepoResult<Option<Store>> { Ok(self.read()?.stores.get(id).cloned()) }

    async fn insert_store(&self, store: NewStore) -> RepoResult<Store> {
        let now = Utc::now();
        let store = Store {
            id: StoreId::generate(),
            name: store.name,
            address: store.address,
            phone: store.phone,
            coordinates: store.coordinates,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.write()?.stores.insert(store.id.clone(), store.clone());
        Ok(store)
    }

    async fn update_store(&self, id: &StoreId, changes: StoreChanges) -> RepoResult<()> {
        let mut guard = self.write()?;
        let store = guard.stores.get_mut(id).ok_or(RepositoryError::NotFound("store"))?;
        changes.apply(store, Utc::now());
        Ok(())
    }

    async fn delete_store(&self, id: &StoreId) -> RepoResult<()> {
        self.write()?.stores.remove(id);
        Ok(())
    }
}

impl EmployeeRepository for MemoryRepository {
    async fn list_employees(&self, filter: EmployeeFilter) -> RepoResult<Vec<Employee>> {
        Ok(self
            .read()?
            .employees
            .values()
            .filter(|e| filter.store_id.as_ref().map_or(true, |s| &e.store_id == s))
            .filter(|e| !filter.active_only || e.is_active)
            .cloned()
            .collect())
    }

    async fn get_employee(&self, id: &EmployeeId) -> RepoResult<Option<Employee>> {
        Ok(self.read()?.employees.get(id).cloned())
    }

    async fn insert_employee(&self, employee: NewEmployee) -> RepoResult<Employee> {
        let now = Utc::now();
        let employee = Employee {
            id: EmployeeId::generate(),
            email: employee.email,
            password: employee.password,
            name: employee.name,
            store_id: employee.store_id,
            role: employee.role.unwrap_or_default(),
            is_active: true,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.write()?.employees.insert(employee.id.clone(), employee.clone());
        Ok(employee)
    }

    async fn update_employee(&self, id: &EmployeeId, update: EmployeeUpdate) -> RepoResult<()> {
        let mut guard = self.write()?;
        let employee = guard.employees.get_mut(id).ok_or(RepositoryError::NotFound("employee"))?;
        update.apply(employee, Utc::now());
        Ok(())
    }

    async fn delete_employee(&self, id: &EmployeeId) -> RepoResult<()> {
        self.write()?.employees.remove(id);
        Ok(())
    }
}

impl OrderRepository for MemoryRepository {
    async fn insert_order(&self, order: NewOrder) -> RepoResult<Order> {
        let order = Order::from_new(OrderId::generate(), order, Utc::now());
        self.write()?.orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: &OrderId) -> RepoResult<Option<Order>> { Ok(self.read()?.orders.get(id).cloned()) }

    async fn orders_by_store(&self, store_id: &StoreId) -> RepoResult<Vec<Order>> {
        Ok(self.read()?.orders.values().filter(|o| o.belongs_to_store(store_id)).cloned().collect())
    }

    async fn recent_orders(&self, limit: usize) -> RepoResult<Vec<Order>> {
        self.check_scan()?;
        let mut orders: Vec<Order> = self.read()?.orders.values().cloned().collect();
        untimestamped_then_newest(&mut orders);
        orders.truncate(limit);
        Ok(orders)
    }

    async fn orders_by_user(&self, user_id: &UserId) -> RepoResult<Vec<Order>> {
        Ok(self.read()?.orders.values().filter(|o| &o.user_id == user_id).cloned().collect())
    }

    async fn all_orders(&self) -> RepoResult<Vec<Order>> { Ok(self.read()?.orders.values().cloned().collect()) }

    async fn set_order_status(&self, id: &OrderId, status: OrderStatus, at: DateTime<Utc>) -> RepoResult<()> {
        let mut guard = self.write()?;
        let order = guard.orders.get_mut(id).ok_or(RepositoryError::NotFound("order"))?;
        order.set_status(status, at);
        Ok(())
    }
}

impl UserRepository for MemoryRepository {
    async fn get_profile(&self, uid: &UserId) -> RepoResult<Option<UserProfile>> {
        Ok(self.read()?.users.get(uid).cloned())
    }

    async fn upsert_profile(&self, mut profile: UserProfile) -> RepoResult<()> {
        let now = Utc::now();
        profile.created_at.get_or_insert(now);
        profile.updated_at = Some(now);
        self.write()?.users.insert(profile.uid.clone(), profile);
        Ok(())
    }
}
