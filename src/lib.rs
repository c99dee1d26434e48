//! streamfeed
//!
//! Stream rendering pipeline of a social feed client: domain objects become
//! typed visual items, are sized asynchronously, kept in a filterable store,
//! applied to a render surface through a serialized mutation queue, and
//! placed by a multi-column waterfall layout.
//!
//! The pure core (`model`, `stream::generator`, `stream::diff`, `layout`) is
//! free of I/O; `stream::sizing`, `stream::queue` and `stream::loader` are
//! the async shell around it.

pub mod config;
pub mod layout;
pub mod logging;
pub mod model;
pub mod source;
pub mod stream;

pub mod integration;
