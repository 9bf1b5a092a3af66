//! Fluent, reusable query builders over a document [`Collection`].
//!
//! A builder is configured once (collection, mapper, key field) and can then
//! be executed any number of times, from any number of threads. Mutators such
//! as `key` return a new builder and never change the one they are called on.
//!
//! Driver failures surface as [`DomainError::Store`](crate::errorz::DomainError);
//! absent targets as [`DomainError::NotFound`](crate::errorz::DomainError).
mod count;
mod create_one;
mod cursor;
mod delete_many;
mod delete_one;
mod embedded_find_many;
mod embedded_get_one;
mod embedded_pull;
mod embedded_push;
mod embedded_update;
mod filter;
mod find_many;
mod get_one;
mod merge_fields;
mod types;
mod update_one;
mod util;

pub use count::Count;
pub use create_one::CreateOne;
pub use cursor::drain_cursor;
pub use delete_many::DeleteMany;
pub use delete_one::DeleteOne;
pub use embedded_find_many::EmbeddedFindMany;
pub use embedded_get_one::EmbeddedGetOne;
pub use embedded_pull::EmbeddedPull;
pub use embedded_push::EmbeddedPush;
pub use embedded_update::EmbeddedUpdate;
pub use filter::{Filter, Selector};
pub use find_many::FindMany;
pub use get_one::GetOne;
pub use merge_fields::MergeFields;
pub use update_one::UpdateOne;
pub use types::{
    Collection, DEFAULT_KEY, DeleteReport, DocumentCursor, FromStore, ToStore, UpdateReport,
};
pub use util::singular;
