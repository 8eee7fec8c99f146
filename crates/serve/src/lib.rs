pub mod meta;
pub mod queries;
pub mod resolver;
pub mod store;

pub use queries::{Lookup, PAGE_SIZE};
pub use resolver::{resolve, Resolver};
pub use store::{Cardinality, ContentStore, Params, Query, StoreError};
