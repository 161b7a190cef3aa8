// Application layer - Use case interactors

pub mod batch_interactor;
pub mod container;
pub mod session_interactor;
pub mod upload_interactor;

// Re-export interactors
pub use batch_interactor::BatchInteractor;
pub use container::{AppContainer, DefaultAppContainer};
pub use session_interactor::SessionInteractor;
pub use upload_interactor::UploadInteractor;
