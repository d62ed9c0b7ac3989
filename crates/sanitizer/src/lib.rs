//! Whitelist-based sanitizer for untrusted HTML.
//!
//! Input is lexed and normalized by the `html` crate into a well-nested
//! event stream. A [`Policy`] decides per element and per attribute what
//! survives, `style` values pass through the `css` crate's filter, and the
//! result is serialized as canonical, escaped markup.
//!
//! ```
//! use sanitizer::PolicyBuilder;
//!
//! let policy = PolicyBuilder::new()
//!     .allow_elements(["b", "p"])
//!     .build()
//!     .unwrap();
//! assert_eq!(
//!     policy.sanitize("<p onclick=evil()>Hi <b>there<script>x()</script>"),
//!     "<p>Hi <b>there</b></p>"
//! );
//! ```

mod attribute;
mod builder;
pub mod config;
mod element;
mod error;
mod filter;
mod pipeline;
mod policy;
pub mod presets;
mod processor;
mod rel;
mod render;
pub mod srcset;
pub mod url;

pub use crate::attribute::{AttributePolicy, Matching, OneOf};
pub use crate::builder::{AttributeBuilder, PolicyBuilder};
pub use crate::config::{ConfigError, PolicyConfig};
pub use crate::element::{ElementDecision, ElementPolicy};
pub use crate::error::PolicyError;
pub use crate::policy::Policy;
pub use crate::presets::Preset;
pub use crate::processor::{EventProcessor, MapText, RenameElements};
pub use crate::rel::RelPolicy;
pub use css::CssSchema;
pub use html::{Attribute, EventSink, ParseError};
