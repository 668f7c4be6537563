pub mod filter;
pub mod mutation;
pub mod pagination;
pub mod query;

pub use mutation::Mutation;
pub use query::Query;
