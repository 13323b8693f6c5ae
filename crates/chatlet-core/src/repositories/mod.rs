pub mod error;
pub mod selected_model;

pub use error::{RepositoryError, RepositoryResult};
pub use selected_model::{
    BoxFuture, InMemorySelectedModelRepository, JsonSelectedModelRepository,
    SelectedModelRepository,
};
