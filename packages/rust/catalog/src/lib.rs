//! Catalog builder: turns the paginated release feed into a deduplicated,
//! time-ordered version catalog restricted to a trailing time window.
//!
//! The feed serves newest-first and has no server-side date filtering, so
//! the builder pages defensively and stops as soon as a page's oldest
//! record falls behind the cutoff. See [`build_catalog`].

mod builder;
mod store;

pub use builder::build_catalog;
pub use store::{read_catalog, write_catalog};
