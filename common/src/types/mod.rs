pub mod aggregate;
pub mod buffers;
pub mod catalog;
pub mod row;

pub use aggregate::*;
pub use buffers::RollingBuffer;
pub use catalog::*;
pub use row::*;
