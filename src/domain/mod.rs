mod config;
mod error;
mod fuel;
mod purchase;
mod session;

pub use config::*;
pub use error::*;
pub use fuel::*;
pub use purchase::*;
pub use session::*;
