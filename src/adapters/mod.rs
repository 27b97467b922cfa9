// Adapters layer: concrete implementations of the domain ports (typeface
// construction, display-name resolution).

pub mod display_name;
pub mod typeface;

pub use display_name::FileDisplayNameResolver;
pub use typeface::{InMemoryTypefaceFactory, LoadedTypeface};
