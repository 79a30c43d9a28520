pub mod api_commands;
pub mod models;
pub mod resolver;

pub use models::{Category, CreateCategoryRequest};
pub use resolver::{
    resolve_name, resolve_or_create, suggested_category_names, CategoryResolution,
};
