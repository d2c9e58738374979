pub mod repository;

pub use repository::{MavenRepository, RemoteRepository};
