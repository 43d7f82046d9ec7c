//! Service identity, client assertions, and bearer tokens.

pub mod assertion;
pub mod id;
pub mod identity;
pub mod token;

pub use assertion::*;
pub use id::*;
pub use identity::*;
pub use token::*;
