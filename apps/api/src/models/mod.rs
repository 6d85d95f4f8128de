pub mod analysis;
pub mod section;
