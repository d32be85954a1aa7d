pub mod applicator;
pub mod engine;
pub mod fill_model;
pub mod resolver;
