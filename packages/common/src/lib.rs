pub mod blocks;
pub mod error;
pub mod frontmatter;
pub mod hash;
pub mod index;
pub mod markdown;
pub mod model;
pub mod paths;
pub mod slug;

pub use error::ModelError;
pub use hash::ContentHash;
pub use model::{
    ContentItem, ContentKind, HeaderStyle, ImagePurpose, MetaInfo, SectionRef, SiteMode, TagRef,
};
