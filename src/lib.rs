pub mod config;
pub mod errors;
pub mod errorz;
pub mod logger;
pub mod memory;
pub mod query;

#[cfg(test)]
mod test_support;

pub use errors::DbError;
pub use errorz::{DomainError, ErrorKind};
