pub mod json;
pub mod site;
