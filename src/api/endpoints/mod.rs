pub mod analysis;
pub mod claim;
pub mod health;
