mod models;
mod queries;

pub use models::*;
pub use queries::*;
