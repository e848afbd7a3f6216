pub mod artifact_store;
pub mod documents;
pub mod repositories;

pub use artifact_store::ArtifactStore;
pub use repositories::InMemoryDocumentStore;
