//! HTML lexing and structural normalization for the sanitizer.
//!
//! Input text flows through [`tokenize`] into a [`TokenStream`], and the
//! [`Balancer`] turns tokens into a well-nested stream of events delivered to
//! an [`EventSink`]. Neither stage fails on malformed input; anomalies are
//! reported to an optional [`ErrorSink`].

mod balancer;
mod elements;
mod entities;
mod error;
mod event;
pub mod names;
mod tokenizer;
mod types;

pub use crate::balancer::{Balancer, BalancerConfig, balance, parse_events};
pub use crate::entities::decode_entities;
pub use crate::error::{ErrorSink, IgnoreErrors, ParseError, ParseErrorCode};
pub use crate::event::{Attribute, Event, EventSink, VecSink, format_events};
pub use crate::names::{TextKind, is_void_element, text_kind};
pub use crate::tokenizer::{Tokenizer, tokenize, tokenize_reporting};
pub use crate::types::{Token, TokenStream};
