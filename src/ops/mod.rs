pub mod engine;
pub mod mirror;
pub mod sort;
pub mod view;
