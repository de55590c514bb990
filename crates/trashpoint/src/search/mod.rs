//! Nearest-stop query handling.
//!
//! Turns a raw coordinate into a [`QueryResult`] by validating the input,
//! querying a [`GeoIndex`](crate::GeoIndex) snapshot and applying the
//! distance threshold policy of a [`QueryConfig`].

mod orchestration;

pub use orchestration::{
    DEFAULT_LIMIT, NotFoundReason, QueryConfig, QueryResult, QueryStatus, handle_query,
};
