//! SMS categorization: the category set, the LLM-backed categorizer and its
//! result cache.

pub mod cache;
pub mod categorizer;
pub mod category;

pub use cache::CategoryCache;
pub use categorizer::Categorizer;
pub use category::Category;
