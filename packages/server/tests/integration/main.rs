mod binder;
mod common;
mod content;
mod image;
mod param;
mod publish;
mod section;
mod site;
