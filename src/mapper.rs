//! Resource definitions: endpoint, cache table and wire-to-record mapping for
//! each entity kind.
//!
//! Mapping is total. Missing optional fields fall back to empty strings,
//! empty lists or `None`; relations may arrive nested or as a flat id.

use crate::db::CachedRecord;
use crate::models::id::relation_id;
use crate::models::{
    CategoryInput, CategoryRecord, ListInput, ListItemInput, ListItemRecord, PantryInput,
    PantryItemInput, PantryItemRecord, PantryRecord, ProductInput, ProductRecord,
    ShoppingListRecord, WireCategory, WireListItem, WirePantry, WirePantryItem, WireProduct,
    WireShoppingList, WireUser,
};
use crate::sync::Resource;

pub struct ShoppingLists;
pub struct ListItems;
pub struct Categories;
pub struct Products;
pub struct Pantries;
pub struct PantryItems;

fn owner_name(owner: Option<WireUser>) -> Option<String> {
    owner.map(|u| u.display_name()).filter(|n| !n.is_empty())
}

fn member_names(users: Vec<WireUser>) -> Vec<String> {
    users
        .iter()
        .map(WireUser::display_name)
        .filter(|n| !n.is_empty())
        .collect()
}

fn child_path(collection: &str, parent: Option<&str>, children: &str) -> String {
    format!("{}/{}/{}", collection, parent.unwrap_or_default(), children)
}

impl Resource for ShoppingLists {
    const NAME: &'static str = "shopping_lists";
    type Wire = WireShoppingList;
    type Record = ShoppingListRecord;
    type Input = ListInput;

    fn collection_path(_parent: Option<&str>) -> String {
        "/api/shopping-lists".to_string()
    }

    fn to_record(wire: WireShoppingList, _parent: Option<&str>) -> ShoppingListRecord {
        ShoppingListRecord {
            id: wire.id,
            name: wire.name,
            description: wire.description.unwrap_or_default(),
            recurring: wire.recurring,
            owner: owner_name(wire.owner),
            shared_with: member_names(wire.shared_with),
            last_purchased_at: wire.last_purchased_at,
            updated_at: wire.updated_at,
            pending_delete: false,
        }
    }
}

impl Resource for ListItems {
    const NAME: &'static str = "list_items";
    type Wire = WireListItem;
    type Record = ListItemRecord;
    type Input = ListItemInput;

    fn collection_path(parent: Option<&str>) -> String {
        child_path(&ShoppingLists::collection_path(None), parent, "items")
    }

    fn to_record(wire: WireListItem, parent: Option<&str>) -> ListItemRecord {
        ListItemRecord {
            id: wire.id,
            list_id: parent.unwrap_or_default().to_string(),
            product_id: relation_id(wire.product, wire.product_id),
            quantity: wire.quantity,
            unit: wire.unit,
            purchased: wire.purchased,
            pending_delete: false,
        }
    }
}

impl Resource for Categories {
    const NAME: &'static str = "categories";
    type Wire = WireCategory;
    type Record = CategoryRecord;
    type Input = CategoryInput;

    fn collection_path(_parent: Option<&str>) -> String {
        "/api/categories".to_string()
    }

    fn to_record(wire: WireCategory, _parent: Option<&str>) -> CategoryRecord {
        CategoryRecord {
            id: wire.id,
            name: wire.name,
            pending_delete: false,
        }
    }
}

impl Resource for Products {
    const NAME: &'static str = "products";
    type Wire = WireProduct;
    type Record = ProductRecord;
    type Input = ProductInput;

    fn collection_path(_parent: Option<&str>) -> String {
        "/api/products".to_string()
    }

    fn to_record(wire: WireProduct, _parent: Option<&str>) -> ProductRecord {
        ProductRecord {
            id: wire.id,
            name: wire.name,
            category_id: relation_id(wire.category, wire.category_id),
            pending_delete: false,
        }
    }
}

impl Resource for Pantries {
    const NAME: &'static str = "pantries";
    type Wire = WirePantry;
    type Record = PantryRecord;
    type Input = PantryInput;

    fn collection_path(_parent: Option<&str>) -> String {
        "/api/pantries".to_string()
    }

    fn to_record(wire: WirePantry, _parent: Option<&str>) -> PantryRecord {
        PantryRecord {
            id: wire.id,
            name: wire.name,
            owner: owner_name(wire.owner),
            shared_with: member_names(wire.shared_with),
            pending_delete: false,
        }
    }
}

impl Resource for PantryItems {
    const NAME: &'static str = "pantry_items";
    type Wire = WirePantryItem;
    type Record = PantryItemRecord;
    type Input = PantryItemInput;

    fn collection_path(parent: Option<&str>) -> String {
        child_path(&Pantries::collection_path(None), parent, "items")
    }

    fn to_record(wire: WirePantryItem, parent: Option<&str>) -> PantryItemRecord {
        PantryItemRecord {
            id: wire.id,
            pantry_id: parent.unwrap_or_default().to_string(),
            product_id: relation_id(wire.product, wire.product_id),
            quantity: wire.quantity,
            unit: wire.unit,
            pending_delete: false,
        }
    }
}

impl CachedRecord for ShoppingListRecord {
    fn id(&self) -> &str {
        &self.id
    }
    fn pending_delete(&self) -> bool {
        self.pending_delete
    }
    fn set_pending_delete(&mut self, pending: bool) {
        self.pending_delete = pending;
    }
}

impl CachedRecord for ListItemRecord {
    fn id(&self) -> &str {
        &self.id
    }
    fn parent_id(&self) -> Option<&str> {
        Some(&self.list_id)
    }
    fn pending_delete(&self) -> bool {
        self.pending_delete
    }
    fn set_pending_delete(&mut self, pending: bool) {
        self.pending_delete = pending;
    }
}

impl CachedRecord for CategoryRecord {
    fn id(&self) -> &str {
        &self.id
    }
    fn pending_delete(&self) -> bool {
        self.pending_delete
    }
    fn set_pending_delete(&mut self, pending: bool) {
        self.pending_delete = pending;
    }
}

impl CachedRecord for ProductRecord {
    fn id(&self) -> &str {
        &self.id
    }
    fn pending_delete(&self) -> bool {
        self.pending_delete
    }
    fn set_pending_delete(&mut self, pending: bool) {
        self.pending_delete = pending;
    }
}

impl CachedRecord for PantryRecord {
    fn id(&self) -> &str {
        &self.id
    }
    fn pending_delete(&self) -> bool {
        self.pending_delete
    }
    fn set_pending_delete(&mut self, pending: bool) {
        self.pending_delete = pending;
    }
}

impl CachedRecord for PantryItemRecord {
    fn id(&self) -> &str {
        &self.id
    }
    fn parent_id(&self) -> Option<&str> {
        Some(&self.pantry_id)
    }
    fn pending_delete(&self) -> bool {
        self.pending_delete
    }
    fn set_pending_delete(&mut self, pending: bool) {
        self.pending_delete = pending;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_from_minimal_payload() {
        let wire: WireShoppingList = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        let record = ShoppingLists::to_record(wire, None);

        assert_eq!(record.id, "3");
        assert_eq!(record.name, "");
        assert_eq!(record.description, "");
        assert!(!record.recurring);
        assert_eq!(record.owner, None);
        assert!(record.shared_with.is_empty());
    }

    #[test]
    fn test_null_wire_fields_map_to_defaults() {
        let wire: WirePantryItem = serde_json::from_str(
            r#"{"id": 9, "product": null, "product_id": null, "quantity": null, "unit": null}"#,
        )
        .unwrap();
        let record = PantryItems::to_record(wire, Some("2"));

        assert_eq!(record.id, "9");
        assert_eq!(record.pantry_id, "2");
        assert_eq!(record.product_id, None);
        assert_eq!(record.quantity, 1.0);
        assert_eq!(record.unit, "");

        let wire: WireShoppingList =
            serde_json::from_str(r#"{"name": "Lost", "owner": {"name": null, "email": "a@b.c"}}"#)
                .unwrap();
        let record = ShoppingLists::to_record(wire, None);
        assert_eq!(record.id, "");
        assert_eq!(record.owner.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn test_list_owner_and_members() {
        let wire: WireShoppingList = serde_json::from_str(
            r#"{
                "id": "5",
                "name": "Weekly",
                "description": null,
                "owner": {"id": 1, "name": "Ana", "surname": "Paz", "email": "ana@example.com"},
                "shared_with": [
                    {"id": 2, "email": "bo@example.com"},
                    {"id": 3}
                ]
            }"#,
        )
        .unwrap();
        let record = ShoppingLists::to_record(wire, None);

        assert_eq!(record.owner.as_deref(), Some("Ana Paz"));
        assert_eq!(record.shared_with, vec!["bo@example.com", "3"]);
        assert_eq!(record.description, "");
    }

    #[test]
    fn test_list_item_nested_product_wins() {
        let wire: WireListItem = serde_json::from_str(
            r#"{"id": 9, "product": {"id": 4, "name": "Milk"}, "product_id": 8, "unit": "l"}"#,
        )
        .unwrap();
        let record = ListItems::to_record(wire, Some("1"));

        assert_eq!(record.list_id, "1");
        assert_eq!(record.product_id.as_deref(), Some("4"));
        assert_eq!(record.quantity, 1.0);
        assert!(!record.purchased);
        assert_eq!(CachedRecord::parent_id(&record), Some("1"));
    }

    #[test]
    fn test_list_item_flat_product_id() {
        let wire: WireListItem =
            serde_json::from_str(r#"{"id": 9, "product_id": "8", "quantity": 2.5}"#).unwrap();
        let record = ListItems::to_record(wire, Some("1"));

        assert_eq!(record.product_id.as_deref(), Some("8"));
        assert_eq!(record.quantity, 2.5);
    }

    #[test]
    fn test_list_item_without_product() {
        let wire: WireListItem = serde_json::from_str(r#"{"id": 9, "product": null}"#).unwrap();
        let record = ListItems::to_record(wire, Some("1"));
        assert_eq!(record.product_id, None);
    }

    #[test]
    fn test_product_category() {
        let nested: WireProduct =
            serde_json::from_str(r#"{"id": 4, "name": "Milk", "category": {"id": 2}}"#).unwrap();
        assert_eq!(
            Products::to_record(nested, None).category_id.as_deref(),
            Some("2")
        );

        let flat: WireProduct =
            serde_json::from_str(r#"{"id": 4, "name": "Milk", "category_id": 2.0}"#).unwrap();
        assert_eq!(
            Products::to_record(flat, None).category_id.as_deref(),
            Some("2")
        );
    }

    #[test]
    fn test_pantry_item_scoped_to_parent() {
        let wire: WirePantryItem =
            serde_json::from_str(r#"{"id": 1, "product": {"id": 4}, "quantity": 3, "unit": "kg"}"#)
                .unwrap();
        let record = PantryItems::to_record(wire, Some("7"));

        assert_eq!(record.pantry_id, "7");
        assert_eq!(record.product_id.as_deref(), Some("4"));
        assert_eq!(record.quantity, 3.0);
    }

    #[test]
    fn test_collection_paths() {
        assert_eq!(ShoppingLists::collection_path(None), "/api/shopping-lists");
        assert_eq!(
            ListItems::collection_path(Some("4")),
            "/api/shopping-lists/4/items"
        );
        assert_eq!(Categories::collection_path(None), "/api/categories");
        assert_eq!(Products::collection_path(None), "/api/products");
        assert_eq!(
            PantryItems::collection_path(Some("2")),
            "/api/pantries/2/items"
        );
    }
}
