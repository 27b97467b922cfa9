pub mod bridge;
pub mod installer;
pub mod registry;
pub mod resolver;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_fonts;

pub use crate::domain::model::{FontBytes, FontIdentity, FontSource, InstallOutcome, TypefaceEntry};
pub use crate::domain::ports::{ConfigProvider, DisplayNameResolver, TypefaceFactory};
pub use crate::utils::error::Result;
