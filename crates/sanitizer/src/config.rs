//! Policies declared in TOML files.
//!
//! ```toml
//! presets = ["formatting", "tables"]
//! elements = ["a", "p", "span"]
//! protocols = ["https"]
//! styling = true
//! require_rels = ["nofollow"]
//!
//! [[attributes]]
//! names = ["href"]
//! elements = ["a"]
//!
//! [[attributes]]
//! names = ["dir"]
//! values = ["ltr", "rtl"]
//! ignore_case = true
//! ```

use crate::builder::PolicyBuilder;
use crate::error::PolicyError;
use crate::policy::Policy;
use crate::presets::Preset;
use css::CssSchema;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read policy {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse policy: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// One group of attributes sharing a scope and value filters.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AttributeConfig {
    pub names: Vec<String>,
    /// Elements the attributes are allowed on; empty means every element.
    pub elements: Vec<String>,
    /// Regular expression the whole value must match.
    pub pattern: Option<String>,
    /// Enumerated accepted values.
    pub values: Option<Vec<String>>,
    pub ignore_case: bool,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    pub presets: Vec<Preset>,
    pub elements: Vec<String>,
    pub drop_elements: Vec<String>,
    pub attributes: Vec<AttributeConfig>,
    pub protocols: Vec<String>,
    pub standard_protocols: bool,
    pub styling: bool,
    /// Style properties on top of the default whitelist.
    pub style_properties: Vec<String>,
    pub urls_in_styles: bool,
    pub text_in: Vec<String>,
    pub no_text_in: Vec<String>,
    pub require_rels: Vec<String>,
    pub skip_rels: Vec<String>,
    pub allow_without_attributes: Vec<String>,
    pub max_depth: Option<usize>,
}

impl PolicyConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn builder(&self) -> Result<PolicyBuilder, ConfigError> {
        let mut builder = PolicyBuilder::new()
            .allow_elements(&self.elements)
            .drop_elements(&self.drop_elements)
            .allow_url_protocols(&self.protocols)
            .allow_text_in(&self.text_in)
            .disallow_text_in(&self.no_text_in)
            .require_rels_on_links(&self.require_rels)
            .skip_rels_on_links(&self.skip_rels)
            .allow_without_attributes(&self.allow_without_attributes);
        for preset in &self.presets {
            builder = builder.allow_preset(*preset);
        }
        if self.standard_protocols {
            builder = builder.allow_standard_url_protocols();
        }
        if self.styling || !self.style_properties.is_empty() {
            let extra = CssSchema::with_properties(&self.style_properties)
                .map_err(PolicyError::from)?;
            builder = builder.allow_styling_with(&CssSchema::default_whitelist().union(&extra));
        }
        if self.urls_in_styles {
            builder = builder.allow_urls_in_styles(|_: &str, _: &str, url: &str| {
                Some(url.to_string())
            });
        }
        if let Some(max_depth) = self.max_depth {
            builder = builder.max_nesting_depth(max_depth);
        }
        for group in &self.attributes {
            let mut attributes = builder.allow_attributes(&group.names);
            if let Some(pattern) = &group.pattern {
                attributes = attributes.matching_regex(pattern);
            }
            if let Some(values) = &group.values {
                attributes = attributes.matching_values(group.ignore_case, values);
            }
            builder = if group.elements.is_empty() {
                attributes.globally()
            } else {
                attributes.on_elements(&group.elements)
            };
        }
        Ok(builder)
    }

    pub fn build(&self) -> Result<Policy, ConfigError> {
        Ok(self.builder()?.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_policies_match_builder_policies() {
        let config = PolicyConfig::from_toml_str(
            r#"
            elements = ["a", "p", "span"]
            standard_protocols = true
            styling = true
            require_rels = ["nofollow"]

            [[attributes]]
            names = ["href"]
            elements = ["a"]

            [[attributes]]
            names = ["dir"]
            values = ["LTR", "rtl"]
            ignore_case = true
            "#,
        )
        .unwrap();
        let policy = config.build().unwrap();
        assert_eq!(
            policy.sanitize(
                "<p dir=Ltr><a href='https://x/' onclick=f()>x</a>\
                 <span style='color: red; position: fixed'>y</span></p>"
            ),
            "<p dir=\"ltr\"><a href=\"https://x/\" rel=\"nofollow\">x</a>\
             <span style=\"color:red\">y</span></p>"
        );
    }

    #[test]
    fn presets_combine_with_explicit_rules() {
        let config = PolicyConfig::from_toml_str(
            r#"
            presets = ["tables"]
            elements = ["b"]
            "#,
        )
        .unwrap();
        assert_eq!(config.presets, vec![Preset::Tables]);
        assert_eq!(
            config.build().unwrap().sanitize("<table><tr><td><b>x</b><i>y"),
            "<table><tbody><tr><td><b>x</b>y</td></tr></tbody></table>"
        );
    }

    #[test]
    fn extra_style_properties_extend_the_whitelist() {
        let config = PolicyConfig::from_toml_str(
            r#"
            elements = ["span"]
            style_properties = ["overflow-wrap"]
            "#,
        )
        .unwrap();
        let policy = config.build().unwrap();
        assert_eq!(
            policy.sanitize("<span style='overflow-wrap: anywhere; color: blue'>x</span>"),
            "<span style=\"overflow-wrap:anywhere;color:blue\">x</span>"
        );
    }

    #[test]
    fn mistakes_are_typed() {
        assert!(matches!(
            PolicyConfig::from_toml_str("elements = 3"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            PolicyConfig::from_toml_str("unknown_key = true"),
            Err(ConfigError::Toml(_))
        ));
        let unknown_property = PolicyConfig {
            style_properties: vec!["colour".into()],
            ..PolicyConfig::default()
        };
        assert!(matches!(
            unknown_property.build(),
            Err(ConfigError::Policy(PolicyError::Schema(_)))
        ));
        let bad_rel = PolicyConfig {
            require_rels: vec!["a b".into()],
            ..PolicyConfig::default()
        };
        assert!(matches!(
            bad_rel.build(),
            Err(ConfigError::Policy(PolicyError::RelTokenWhitespace(_)))
        ));
        assert!(matches!(
            PolicyConfig::load("/nonexistent/policy.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
