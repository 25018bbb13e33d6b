pub mod dataset;
pub mod user;

pub use dataset::{DatasetRepository, DatasetRepositoryTrait};
pub use user::{UserRepository, UserRepositoryTrait};
