//! Record-to-view joins.
//!
//! Every function here is total: a missing product or category becomes
//! `None`, and children whose parent is not in the input are dropped.

use std::collections::HashMap;

use crate::models::{
    Category, CategoryRecord, ListEntry, ListItemRecord, Pantry, PantryEntry, PantryItemRecord,
    PantryRecord, Product, ProductRecord, ShoppingList, ShoppingListRecord,
};

pub fn category_view(record: &CategoryRecord) -> Category {
    Category {
        id: record.id.clone(),
        name: record.name.clone(),
        pending_delete: record.pending_delete,
    }
}

pub fn join_product(product: &ProductRecord, categories: &[CategoryRecord]) -> Product {
    let category = product
        .category_id
        .as_deref()
        .and_then(|id| categories.iter().find(|c| c.id == id))
        .map(category_view);
    product_view(product, category)
}

pub fn join_products(products: &[ProductRecord], categories: &[CategoryRecord]) -> Vec<Product> {
    let by_id: HashMap<&str, &CategoryRecord> =
        categories.iter().map(|c| (c.id.as_str(), c)).collect();

    products
        .iter()
        .map(|product| {
            let category = product
                .category_id
                .as_deref()
                .and_then(|id| by_id.get(id))
                .map(|c| category_view(c));
            product_view(product, category)
        })
        .collect()
}

fn product_view(product: &ProductRecord, category: Option<Category>) -> Product {
    Product {
        id: product.id.clone(),
        name: product.name.clone(),
        category,
        pending_delete: product.pending_delete,
    }
}

fn index_products(products: &[Product]) -> HashMap<&str, &Product> {
    products.iter().map(|p| (p.id.as_str(), p)).collect()
}

fn resolve(products: &HashMap<&str, &Product>, product_id: Option<&str>) -> Option<Product> {
    product_id
        .and_then(|id| products.get(id))
        .map(|p| (*p).clone())
}

fn list_entry(item: &ListItemRecord, products: &HashMap<&str, &Product>) -> ListEntry {
    ListEntry {
        id: item.id.clone(),
        product_id: item.product_id.clone(),
        product: resolve(products, item.product_id.as_deref()),
        quantity: item.quantity,
        unit: item.unit.clone(),
        purchased: item.purchased,
        pending_delete: item.pending_delete,
    }
}

fn list_view(list: &ShoppingListRecord, items: Vec<ListEntry>) -> ShoppingList {
    ShoppingList {
        id: list.id.clone(),
        name: list.name.clone(),
        description: list.description.clone(),
        recurring: list.recurring,
        owner: list.owner.clone(),
        shared_with: list.shared_with.clone(),
        items,
        pending_delete: list.pending_delete,
    }
}

/// One list with its items. Items of other lists are ignored.
pub fn join_list(
    list: &ShoppingListRecord,
    items: &[ListItemRecord],
    products: &[Product],
) -> ShoppingList {
    let products = index_products(products);
    let entries = items
        .iter()
        .filter(|item| item.list_id == list.id)
        .map(|item| list_entry(item, &products))
        .collect();
    list_view(list, entries)
}

/// Every list with its items, in list order.
pub fn join_lists(
    lists: &[ShoppingListRecord],
    items: &[ListItemRecord],
    products: &[Product],
) -> Vec<ShoppingList> {
    let products = index_products(products);
    let mut by_list: HashMap<&str, Vec<ListEntry>> = HashMap::new();
    for item in items {
        by_list
            .entry(item.list_id.as_str())
            .or_default()
            .push(list_entry(item, &products));
    }

    lists
        .iter()
        .map(|list| {
            let entries = by_list.remove(list.id.as_str()).unwrap_or_default();
            list_view(list, entries)
        })
        .collect()
}

fn pantry_entry(item: &PantryItemRecord, products: &HashMap<&str, &Product>) -> PantryEntry {
    PantryEntry {
        id: item.id.clone(),
        product_id: item.product_id.clone(),
        product: resolve(products, item.product_id.as_deref()),
        quantity: item.quantity,
        unit: item.unit.clone(),
        pending_delete: item.pending_delete,
    }
}

fn pantry_view(pantry: &PantryRecord, items: Vec<PantryEntry>) -> Pantry {
    Pantry {
        id: pantry.id.clone(),
        name: pantry.name.clone(),
        owner: pantry.owner.clone(),
        shared_with: pantry.shared_with.clone(),
        items,
        pending_delete: pantry.pending_delete,
    }
}

pub fn join_pantry(
    pantry: &PantryRecord,
    items: &[PantryItemRecord],
    products: &[Product],
) -> Pantry {
    let products = index_products(products);
    let entries = items
        .iter()
        .filter(|item| item.pantry_id == pantry.id)
        .map(|item| pantry_entry(item, &products))
        .collect();
    pantry_view(pantry, entries)
}

pub fn join_pantries(
    pantries: &[PantryRecord],
    items: &[PantryItemRecord],
    products: &[Product],
) -> Vec<Pantry> {
    let products = index_products(products);
    let mut by_pantry: HashMap<&str, Vec<PantryEntry>> = HashMap::new();
    for item in items {
        by_pantry
            .entry(item.pantry_id.as_str())
            .or_default()
            .push(pantry_entry(item, &products));
    }

    pantries
        .iter()
        .map(|pantry| {
            let entries = by_pantry.remove(pantry.id.as_str()).unwrap_or_default();
            pantry_view(pantry, entries)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(id: &str) -> ShoppingListRecord {
        ShoppingListRecord {
            id: id.to_string(),
            name: format!("List {}", id),
            description: String::new(),
            recurring: false,
            owner: None,
            shared_with: Vec::new(),
            last_purchased_at: None,
            updated_at: None,
            pending_delete: false,
        }
    }

    fn item(id: &str, list_id: &str, product_id: Option<&str>) -> ListItemRecord {
        ListItemRecord {
            id: id.to_string(),
            list_id: list_id.to_string(),
            product_id: product_id.map(String::from),
            quantity: 1.0,
            unit: String::new(),
            purchased: false,
            pending_delete: false,
        }
    }

    fn product(id: &str, category_id: Option<&str>) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            name: format!("Product {}", id),
            category_id: category_id.map(String::from),
            pending_delete: false,
        }
    }

    fn category(id: &str) -> CategoryRecord {
        CategoryRecord {
            id: id.to_string(),
            name: format!("Category {}", id),
            pending_delete: false,
        }
    }

    #[test]
    fn test_orphan_children_are_dropped() {
        let lists = vec![list("L1")];
        let items = vec![
            item("a", "L1", None),
            item("b", "L1", None),
            item("c", "L2", None),
        ];

        let joined = join_lists(&lists, &items, &[]);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].items.len(), 2);

        let single = join_list(&lists[0], &items, &[]);
        let ids: Vec<&str> = single.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_list_without_items() {
        let joined = join_lists(&[list("L1"), list("L2")], &[item("a", "L2", None)], &[]);
        assert!(joined[0].items.is_empty());
        assert_eq!(joined[1].items.len(), 1);
    }

    #[test]
    fn test_products_resolved_with_category() {
        let products = join_products(
            &[product("p1", Some("c1")), product("p2", Some("missing")), product("p3", None)],
            &[category("c1")],
        );
        assert_eq!(products[0].category.as_ref().unwrap().name, "Category c1");
        assert_eq!(products[1].category, None);
        assert_eq!(products[2].category, None);

        let items = vec![item("a", "L1", Some("p1")), item("b", "L1", Some("gone"))];
        let joined = join_list(&list("L1"), &items, &products);

        let first = joined.items[0].product.as_ref().unwrap();
        assert_eq!(first.name, "Product p1");
        assert_eq!(first.category.as_ref().unwrap().id, "c1");
        assert_eq!(joined.items[1].product, None);
        assert_eq!(joined.items[1].product_id.as_deref(), Some("gone"));
    }

    #[test]
    fn test_join_single_product() {
        let joined = join_product(&product("p1", Some("c1")), &[category("c1")]);
        assert_eq!(joined.category.unwrap().id, "c1");
        assert_eq!(join_product(&product("p1", None), &[]).category, None);
    }

    #[test]
    fn test_pending_flags_carry_over() {
        let mut pending_list = list("L1");
        pending_list.pending_delete = true;
        let mut pending_item = item("a", "L1", None);
        pending_item.pending_delete = true;

        let joined = join_list(&pending_list, &[pending_item], &[]);
        assert!(joined.pending_delete);
        assert!(joined.items[0].pending_delete);
    }

    #[test]
    fn test_join_pantries() {
        let pantries = vec![PantryRecord {
            id: "P1".to_string(),
            name: "Home".to_string(),
            owner: Some("Ana".to_string()),
            shared_with: Vec::new(),
            pending_delete: false,
        }];
        let items = vec![
            PantryItemRecord {
                id: "x".to_string(),
                pantry_id: "P1".to_string(),
                product_id: Some("p1".to_string()),
                quantity: 2.0,
                unit: "kg".to_string(),
                pending_delete: false,
            },
            PantryItemRecord {
                id: "y".to_string(),
                pantry_id: "P9".to_string(),
                product_id: None,
                quantity: 1.0,
                unit: String::new(),
                pending_delete: false,
            },
        ];
        let products = join_products(&[product("p1", None)], &[]);

        let joined = join_pantries(&pantries, &items, &products);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].items.len(), 1);
        assert_eq!(joined[0].items[0].product.as_ref().unwrap().id, "p1");

        let single = join_pantry(&pantries[0], &items, &products);
        assert_eq!(single, joined[0]);
    }
}
