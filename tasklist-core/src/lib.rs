pub mod errors;
pub mod models;
pub mod resource;

pub use errors::*;
pub use models::*;
pub use resource::*;

pub type TaskResult<T> = Result<T, ClientError>;
