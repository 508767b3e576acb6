pub mod coordinator;
pub mod directory;
pub mod reconcile;
pub mod registry;

pub use coordinator::*;
pub use directory::*;
pub use reconcile::*;
pub use registry::*;
