pub mod content;
pub mod generate;
pub mod image;
pub mod param;
pub mod section;
pub mod shared;
pub mod site;
pub mod web;
