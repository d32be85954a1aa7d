pub mod manager;
pub mod overlay_model;
