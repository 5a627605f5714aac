pub mod content;
pub mod content_image;
pub mod content_tag;
pub mod image;
pub mod image_variant;
pub mod layout;
pub mod meta;
pub mod param;
pub mod section;
pub mod section_image;
pub mod tag;
pub mod user;
