//! Feed serialization for collected articles.
//!
//! Two formats are produced from the same [`Collection`]:
//! - [`json`]: a JSON Feed 1.1 document
//! - [`atom`]: an Atom feed
//!
//! Both carry the site favicon captured during the listing scan as the
//! feed-level icon.
//!
//! [`Collection`]: crate::models::Collection

pub mod atom;
pub mod json;
