//! Container, iterator, id and merge utilities shared by the whole core.

pub mod ids;
pub mod itr;
pub mod map;
pub mod merge;

pub use ids::IdRegistry;
pub use itr::Itr;
pub use map::SohlMap;
pub use merge::{merge_into, merge_object};
