//! Data access for the global catalog and the per-site databases.

pub mod cache;
pub mod catalog;
pub mod site;

pub use cache::RepoManager;
pub use catalog::{NewSite, SiteStore};
pub use site::{
    ContentInput, ImageInput, LayoutInput, ParamInput, SectionInput, SiteRepo, VariantInput,
};
