//! Structural normalizer.
//!
//! Turns a token stream into well-nested events: implied closes and implied
//! parents from [`crate::elements`], scope-bounded end tags, reopening of
//! misnested formatting elements, and closing of everything still open at the
//! end of input. It never consults a policy.
//!
//! Invariant: every open event emitted for a non-void element is matched by
//! exactly one close event, in stack order.

use crate::elements::{
    ScopeKind, drops_whitespace_text, implied_closes, implied_parent, is_foreign_root,
    is_formatting, is_scope_boundary, is_scope_limited, is_table_structure,
};
use crate::error::{ErrorSink, IgnoreErrors, ParseErrorCode, report};
use crate::event::{Attribute, EventSink};
use crate::names::{TextKind, is_void_element, text_kind};
use crate::tokenizer::tokenize_reporting;
use crate::types::{Token, TokenStream};

const TARGET: &str = "html.balancer";

/// Reopening keeps at most this many formatting elements with the same name
/// and attributes, innermost first.
const MAX_IDENTICAL_REOPENS: usize = 3;

/// Formatting elements reopened over a whole document.
const REOPEN_BUDGET: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BalancerConfig {
    /// Maximum number of simultaneously open elements. Deeper start tags are
    /// dropped while their content is kept.
    pub max_depth: usize,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

#[derive(Clone, Debug)]
struct OpenElement {
    name: String,
    /// Kept only for formatting elements, which may be reopened.
    attributes: Vec<Attribute>,
}

pub struct Balancer<'e> {
    config: BalancerConfig,
    stack: Vec<OpenElement>,
    foreign_depth: usize,
    /// Raw-text element whose start tag the depth cap refused; its body and
    /// end tag are dropped with it.
    suppressed: Option<String>,
    reopen_budget: usize,
    errors: &'e mut dyn ErrorSink,
}

/// Normalize `stream` into `sink` with the default configuration.
pub fn balance(stream: TokenStream, sink: &mut dyn EventSink) {
    Balancer::new(BalancerConfig::default(), &mut IgnoreErrors).run(stream, sink);
}

/// Lex and normalize `input` into `sink`.
pub fn parse_events(
    input: &str,
    config: BalancerConfig,
    errors: &mut dyn ErrorSink,
    sink: &mut dyn EventSink,
) {
    let stream = tokenize_reporting(input, errors);
    Balancer::new(config, errors).run(stream, sink);
}

impl<'e> Balancer<'e> {
    pub fn new(config: BalancerConfig, errors: &'e mut dyn ErrorSink) -> Self {
        Self {
            config,
            stack: Vec::new(),
            foreign_depth: 0,
            suppressed: None,
            reopen_budget: REOPEN_BUDGET,
            errors,
        }
    }

    pub fn run(mut self, stream: TokenStream, sink: &mut dyn EventSink) {
        for token in stream.into_tokens() {
            self.push_token(token, sink);
        }
        self.finish(sink);
    }

    pub fn push_token(&mut self, token: Token, sink: &mut dyn EventSink) {
        if let Some(suppressed) = self.suppressed.take() {
            match &token {
                Token::Text(_) => {
                    self.suppressed = Some(suppressed);
                    return;
                }
                Token::EndTag { name, .. } if *name == suppressed => return,
                _ => {}
            }
        }
        match token {
            Token::StartTag {
                name,
                attributes,
                self_closing,
                position,
            } => self.start_tag(name, attributes, self_closing, position, sink),
            Token::EndTag { name, position } => self.end_tag(&name, position, sink),
            Token::Text(text) => self.text(&text, sink),
        }
    }

    /// Close every open element, innermost first.
    pub fn finish(mut self, sink: &mut dyn EventSink) {
        while let Some(open) = self.pop() {
            sink.close_tag(&open.name);
        }
    }

    fn current(&self) -> Option<&str> {
        self.stack.last().map(|open| open.name.as_str())
    }

    fn pop(&mut self) -> Option<OpenElement> {
        let open = self.stack.pop()?;
        if is_foreign_root(&open.name) {
            self.foreign_depth -= 1;
        }
        Some(open)
    }

    /// Push and emit an element. Returns false if the depth cap refused it.
    fn open(
        &mut self,
        name: &str,
        attributes: Vec<Attribute>,
        position: usize,
        sink: &mut dyn EventSink,
    ) -> bool {
        if self.stack.len() >= self.config.max_depth {
            report(self.errors, TARGET, ParseErrorCode::NestingTooDeep, position);
            return false;
        }
        let kept = if is_formatting(name) {
            attributes.clone()
        } else {
            Vec::new()
        };
        sink.open_tag(name, attributes);
        if is_foreign_root(name) {
            self.foreign_depth += 1;
        }
        self.stack.push(OpenElement {
            name: name.to_string(),
            attributes: kept,
        });
        true
    }

    fn start_tag(
        &mut self,
        name: String,
        attributes: Vec<Attribute>,
        self_closing: bool,
        position: usize,
        sink: &mut dyn EventSink,
    ) {
        for rule in implied_closes(&name) {
            while let Some(index) =
                self.find_implied_close(rule.closes, rule.scope, rule.current_only)
            {
                log::trace!(
                    target: TARGET,
                    "<{name}> implies </{}>",
                    self.stack[index].name
                );
                self.close_through(index, sink);
                if rule.current_only {
                    break;
                }
            }
        }
        if !self.open_implied_parents(&name, position, sink) {
            return;
        }

        if is_void_element(&name) {
            if self.stack.len() >= self.config.max_depth {
                report(self.errors, TARGET, ParseErrorCode::NestingTooDeep, position);
                return;
            }
            sink.open_tag(&name, attributes);
            return;
        }
        if self_closing && self.foreign_depth > 0 {
            if self.stack.len() < self.config.max_depth {
                sink.open_tag(&name, attributes);
                sink.close_tag(&name);
            }
            return;
        }
        let raw = text_kind(&name) != TextKind::Markup;
        if !self.open(&name, attributes, position, sink) && raw {
            log::trace!(target: TARGET, "dropping body of refused <{name}>");
            self.suppressed = Some(name);
        }
    }

    /// Synthesize wrappers such as `tbody` around a bare `tr`.
    fn open_implied_parents(
        &mut self,
        name: &str,
        position: usize,
        sink: &mut dyn EventSink,
    ) -> bool {
        let Some(implied) = implied_parent(name) else {
            return true;
        };
        let needed = self
            .current()
            .is_some_and(|current| implied.within.contains(&current));
        if !needed {
            return true;
        }
        if !self.open_implied_parents(implied.parent, position, sink) {
            return false;
        }
        log::trace!(target: TARGET, "<{name}> implies <{}>", implied.parent);
        self.open(implied.parent, Vec::new(), position, sink)
    }

    fn find_implied_close(
        &self,
        closes: &[&str],
        scope: ScopeKind,
        current_only: bool,
    ) -> Option<usize> {
        if current_only {
            let top = self.stack.len().checked_sub(1)?;
            return closes
                .contains(&self.stack[top].name.as_str())
                .then_some(top);
        }
        for index in (0..self.stack.len()).rev() {
            let name = self.stack[index].name.as_str();
            if closes.contains(&name) {
                return Some(index);
            }
            if is_scope_boundary(name, scope) {
                return None;
            }
        }
        None
    }

    /// Index of the open element an end tag for `name` closes, if it is in scope.
    fn find_end_tag_match(&self, name: &str) -> Option<usize> {
        let scope = if is_table_structure(name) {
            ScopeKind::Table
        } else {
            ScopeKind::InScope
        };
        for index in (0..self.stack.len()).rev() {
            let open = self.stack[index].name.as_str();
            if open == name {
                return Some(index);
            }
            if is_scope_boundary(open, scope) || is_scope_limited(open) {
                return None;
            }
        }
        None
    }

    /// Pop and close elements from the top down to and including `index`.
    fn close_through(&mut self, index: usize, sink: &mut dyn EventSink) -> Vec<OpenElement> {
        let mut closed = Vec::new();
        while self.stack.len() > index {
            let Some(open) = self.pop() else {
                break;
            };
            sink.close_tag(&open.name);
            closed.push(open);
        }
        closed
    }

    fn end_tag(&mut self, name: &str, position: usize, sink: &mut dyn EventSink) {
        let Some(index) = self
            .find_end_tag_match(name)
            .filter(|_| !is_void_element(name))
        else {
            report(self.errors, TARGET, ParseErrorCode::StrayEndTag, position);
            return;
        };
        let closed = self.close_through(index, sink);

        // `closed` runs innermost first and ends with the matched element.
        // Formatting elements inside a scope boundary stay closed.
        let mut reopen = Vec::new();
        for open in closed.into_iter().rev().skip(1) {
            if is_scope_boundary(&open.name, ScopeKind::InScope) {
                reopen.clear();
            } else if is_formatting(&open.name) {
                reopen.push(open);
            }
        }
        for open in limit_identical(reopen) {
            if self.reopen_budget == 0 {
                log::debug!(target: TARGET, "reopen budget spent, leaving <{}> closed", open.name);
                break;
            }
            self.reopen_budget -= 1;
            log::trace!(target: TARGET, "reopening <{}> after </{name}>", open.name);
            if !self.open(&open.name, open.attributes, position, sink) {
                break;
            }
        }
    }

    fn text(&mut self, text: &str, sink: &mut dyn EventSink) {
        if text.is_empty() {
            return;
        }
        let structural = self.current().is_some_and(drops_whitespace_text);
        if structural && text.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')) {
            return;
        }
        sink.text(text);
    }
}

/// Keep the innermost [`MAX_IDENTICAL_REOPENS`] copies of each formatting
/// element, preserving outermost-first order.
fn limit_identical(reopen: Vec<OpenElement>) -> Vec<OpenElement> {
    let mut kept: Vec<OpenElement> = Vec::with_capacity(reopen.len());
    for open in reopen.into_iter().rev() {
        let twins = kept
            .iter()
            .filter(|k| k.name == open.name && k.attributes == open.attributes)
            .count();
        if twins < MAX_IDENTICAL_REOPENS {
            kept.push(open);
        }
    }
    kept.reverse();
    kept
}
