//! Data criteria model types

pub mod criteria;
pub mod definition;
pub mod exported;
pub mod references;
pub mod value;

// Re-exports
pub use criteria::*;
pub use definition::*;
pub use exported::*;
pub use references::*;
pub use value::*;
