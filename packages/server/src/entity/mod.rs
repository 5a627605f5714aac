//! Database entities.
//!
//! `catalog` tables live in the global site catalog; `site` tables live in
//! each site's own database file. Schema sync is scoped by module path, so the
//! two groups never leak into each other's database.

pub mod catalog;
pub mod site;

/// Module prefixes used to scope schema sync per database.
pub const CATALOG_SCHEMA: &str = "folio_server::entity::catalog::*";
pub const SITE_SCHEMA: &str = "folio_server::entity::site::*";
