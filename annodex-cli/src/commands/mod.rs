pub mod annotated;
pub mod class;
pub mod classes;
pub mod common;
pub mod info;
