pub mod boot;
pub mod coordinator;
pub mod mock;
pub mod router;

pub use boot::*;
pub use coordinator::*;
pub use router::*;
