//! Whitelist-based filtering of inline CSS (`style` attribute values).
//!
//! A style value is tokenized, split into declarations, and each
//! declaration is checked against a [`CssSchema`]. Anything the schema does
//! not describe is dropped; what remains is re-serialized in a canonical
//! form that cannot break out of a quoted HTML attribute.

mod definitions;
pub mod filter;
pub mod schema;
pub mod syntax;
pub mod tokens;
pub mod values;

// Re-exports so other crates can just use `css::...` nicely.
pub use filter::{UrlFilter, sanitize_style};
pub use schema::{CssSchema, Property, SchemaError, ValueClasses};
pub use syntax::{Declaration, parse_declarations};
pub use tokens::{CssToken, tokenize};
