pub mod backend;
pub mod handlers;
pub mod routes;

pub use backend::*;
pub use handlers::*;
pub use routes::*;
