mod address;
mod error;
mod host;
mod snapshot;
mod types;
mod value;

pub use address::*;
pub use error::*;
pub use host::*;
pub use snapshot::*;
pub use types::*;
pub use value::*;
