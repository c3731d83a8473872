pub mod persona;
pub mod roster;

pub use persona::*;
pub use roster::*;
