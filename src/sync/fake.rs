//! In-memory stand-in for the REST API, used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::Resource;
use crate::api::{ApiError, RemoteApi};
use crate::db::CachedRecord;
use crate::mapper::{Categories, ListItems, Pantries, PantryItems, Products, ShoppingLists};
use crate::models::{
    Page, WireCategory, WireListItem, WirePantry, WirePantryItem, WireProduct, WireShoppingList,
};

/// Resources the fake server can create from an input.
pub(crate) trait FakeResource: Resource {
    fn build(id: &str, input: &Self::Input) -> Self::Wire;
}

pub(crate) struct FakeApi<R: Resource> {
    collections: Mutex<HashMap<Option<String>, Vec<R::Wire>>>,
    failing: Mutex<HashSet<Option<String>>>,
    fail_writes: AtomicBool,
    fetches: AtomicUsize,
    next_id: AtomicUsize,
}

fn server_error() -> ApiError {
    ApiError::Status {
        status: 500,
        body: "internal error".to_string(),
    }
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        body: "not found".to_string(),
    }
}

impl<R: FakeResource> FakeApi<R> {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            fail_writes: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
            next_id: AtomicUsize::new(1000),
        }
    }

    /// Replaces the server-side collection under `parent`.
    pub fn seed(&self, parent: Option<&str>, wires: Vec<R::Wire>) {
        self.collections
            .lock()
            .unwrap()
            .insert(parent.map(String::from), wires);
    }

    pub fn remote(&self, parent: Option<&str>) -> Vec<R::Wire> {
        self.collections
            .lock()
            .unwrap()
            .get(&parent.map(String::from))
            .cloned()
            .unwrap_or_default()
    }

    /// Makes every fetch under `parent` fail with a 500.
    pub fn fail_parent(&self, parent: Option<&str>) {
        self.failing.lock().unwrap().insert(parent.map(String::from));
    }

    pub fn heal_parent(&self, parent: Option<&str>) {
        self.failing
            .lock()
            .unwrap()
            .remove(&parent.map(String::from));
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check_writes(&self) -> Result<(), ApiError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(server_error())
        } else {
            Ok(())
        }
    }

    fn position(wires: &[R::Wire], parent: Option<&str>, id: &str) -> Option<usize> {
        wires
            .iter()
            .position(|w| R::to_record(w.clone(), parent).id() == id)
    }
}

#[async_trait]
impl<R: FakeResource> RemoteApi<R> for FakeApi<R> {
    async fn fetch_page(
        &self,
        parent: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<Page<R::Wire>, ApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let key = parent.map(String::from);
        if self.failing.lock().unwrap().contains(&key) {
            return Err(server_error());
        }
        let collections = self.collections.lock().unwrap();
        let all = collections.get(&key).map(Vec::as_slice).unwrap_or_default();
        Ok(Page::slice(all, page, per_page))
    }

    async fn create(&self, parent: Option<&str>, input: &R::Input) -> Result<R::Wire, ApiError> {
        self.check_writes()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let wire = R::build(&id, input);
        self.collections
            .lock()
            .unwrap()
            .entry(parent.map(String::from))
            .or_default()
            .push(wire.clone());
        Ok(wire)
    }

    async fn update(
        &self,
        parent: Option<&str>,
        id: &str,
        input: &R::Input,
    ) -> Result<R::Wire, ApiError> {
        self.check_writes()?;
        let mut collections = self.collections.lock().unwrap();
        let wires = collections
            .get_mut(&parent.map(String::from))
            .ok_or_else(not_found)?;
        let index = Self::position(wires, parent, id).ok_or_else(not_found)?;
        let wire = R::build(id, input);
        wires[index] = wire.clone();
        Ok(wire)
    }

    async fn delete(&self, parent: Option<&str>, id: &str) -> Result<(), ApiError> {
        self.check_writes()?;
        let mut collections = self.collections.lock().unwrap();
        let wires = collections
            .get_mut(&parent.map(String::from))
            .ok_or_else(not_found)?;
        let index = Self::position(wires, parent, id).ok_or_else(not_found)?;
        wires.remove(index);
        Ok(())
    }
}

pub(crate) fn list(id: &str, name: &str) -> WireShoppingList {
    WireShoppingList {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        recurring: false,
        owner: None,
        shared_with: Vec::new(),
        last_purchased_at: None,
        updated_at: None,
    }
}

pub(crate) fn list_item(id: &str, product_id: &str) -> WireListItem {
    WireListItem {
        id: id.to_string(),
        product: None,
        product_id: Some(product_id.to_string()),
        quantity: 1.0,
        unit: String::new(),
        purchased: false,
    }
}

pub(crate) fn category(id: &str, name: &str) -> WireCategory {
    WireCategory {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub(crate) fn product(id: &str, name: &str, category_id: Option<&str>) -> WireProduct {
    WireProduct {
        id: id.to_string(),
        name: name.to_string(),
        category: None,
        category_id: category_id.map(String::from),
    }
}

pub(crate) fn pantry(id: &str, name: &str) -> WirePantry {
    WirePantry {
        id: id.to_string(),
        name: name.to_string(),
        owner: None,
        shared_with: Vec::new(),
    }
}

pub(crate) fn pantry_item(id: &str, product_id: &str, quantity: f64) -> WirePantryItem {
    WirePantryItem {
        id: id.to_string(),
        product: None,
        product_id: Some(product_id.to_string()),
        quantity,
        unit: String::new(),
    }
}

impl FakeResource for ShoppingLists {
    fn build(id: &str, input: &Self::Input) -> Self::Wire {
        WireShoppingList {
            description: input.description.clone(),
            recurring: input.recurring,
            ..list(id, &input.name)
        }
    }
}

impl FakeResource for ListItems {
    fn build(id: &str, input: &Self::Input) -> Self::Wire {
        WireListItem {
            quantity: input.quantity,
            unit: input.unit.clone(),
            purchased: input.purchased,
            ..list_item(id, &input.product_id)
        }
    }
}

impl FakeResource for Categories {
    fn build(id: &str, input: &Self::Input) -> Self::Wire {
        category(id, &input.name)
    }
}

impl FakeResource for Products {
    fn build(id: &str, input: &Self::Input) -> Self::Wire {
        product(id, &input.name, input.category_id.as_deref())
    }
}

impl FakeResource for Pantries {
    fn build(id: &str, input: &Self::Input) -> Self::Wire {
        pantry(id, &input.name)
    }
}

impl FakeResource for PantryItems {
    fn build(id: &str, input: &Self::Input) -> Self::Wire {
        WirePantryItem {
            unit: input.unit.clone(),
            ..pantry_item(id, &input.product_id, input.quantity)
        }
    }
}
