//! Messages retrieved from the upstream member message source.
//!
//! - [`entities::Message`]: one immutable chat message
//! - [`page::PageCursor`] / [`page::MessagePage`]: pagination state and results

pub mod entities;
pub mod page;
