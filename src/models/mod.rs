pub mod id;
mod page;
mod pantry;
mod product;
mod shopping_list;
mod user;
mod views;

pub use page::Page;
pub use pantry::{
    PantryInput, PantryItemInput, PantryItemRecord, PantryRecord, WirePantry, WirePantryItem,
};
pub use product::{
    CategoryInput, CategoryRecord, ProductInput, ProductRecord, WireCategory, WireProduct,
};
pub use shopping_list::{
    ListInput, ListItemInput, ListItemRecord, ShoppingListRecord, WireListItem, WireShoppingList,
};
pub use user::WireUser;
pub use views::{Category, ListEntry, Pantry, PantryEntry, Product, ShoppingList};
