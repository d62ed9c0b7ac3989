use crate::definitions::{DEFAULT_WHITELIST, definitions};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::BitOr;
use std::sync::LazyLock;
use thiserror::Error;

/// Token classes a property accepts beyond its literal keywords.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ValueClasses(u16);

impl ValueClasses {
    /// Numbers, percentages and dimensions with a known unit.
    pub const QUANTITY: Self = Self(1 << 0);
    /// `#rgb`-style hex colors.
    pub const HASH_VALUE: Self = Self(1 << 1);
    /// Quantities below zero; only meaningful together with `QUANTITY`.
    pub const NEGATIVE: Self = Self(1 << 2);
    pub const STRING: Self = Self(1 << 3);
    /// `url(...)`; bare strings are treated as URLs too.
    pub const URL: Self = Self(1 << 4);
    /// Arbitrary identifiers, e.g. font family names.
    pub const UNRESERVED_WORD: Self = Self(1 << 5);
    pub const UNICODE_RANGE: Self = Self(1 << 6);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ValueClasses {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Grammar of one property (or of one function's arguments).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Property {
    pub classes: ValueClasses,
    /// Lowercase keywords accepted verbatim.
    pub literals: BTreeSet<String>,
    /// Lowercase function name to the schema key describing its arguments,
    /// e.g. `"rgb"` to `"rgb()"`.
    pub functions: BTreeMap<String, String>,
}

impl Property {
    pub fn new<L, F, K, V>(classes: ValueClasses, literals: L, functions: F) -> Self
    where
        L: IntoIterator,
        L::Item: AsRef<str>,
        F: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            classes,
            literals: literals
                .into_iter()
                .map(|literal| literal.as_ref().to_ascii_lowercase())
                .collect(),
            functions: functions
                .into_iter()
                .map(|(name, key)| (name.as_ref().to_ascii_lowercase(), key.into()))
                .collect(),
        }
    }

    fn merge(&mut self, other: &Property) {
        self.classes = self.classes | other.classes;
        self.literals.extend(other.literals.iter().cloned());
        for (name, key) in &other.functions {
            self.functions
                .entry(name.clone())
                .or_insert_with(|| key.clone());
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown CSS property `{0}`")]
    UnknownProperty(String),
}

/// Whitelist of CSS properties and the values each accepts.
///
/// Keys ending in `()` describe function arguments rather than properties
/// and are only reachable through a property's `functions` table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CssSchema {
    properties: BTreeMap<String, Property>,
}

static DEFAULT_SCHEMA: LazyLock<CssSchema> = LazyLock::new(|| {
    let (schema, unknown) = CssSchema::select(DEFAULT_WHITELIST.iter().copied());
    debug_assert!(unknown.is_empty(), "default whitelist names {unknown:?}");
    schema
});

impl CssSchema {
    /// The conservative set of properties used by `allow_styling()`.
    pub fn default_whitelist() -> &'static CssSchema {
        &DEFAULT_SCHEMA
    }

    /// Every property with a built-in definition.
    pub fn definitions() -> &'static CssSchema {
        definitions()
    }

    /// Build a schema from built-in definitions, including the argument
    /// grammars of functions the named properties reference.
    pub fn with_properties<I, S>(names: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_ascii_lowercase())
            .collect();
        let (schema, unknown) = Self::select(names.iter().map(String::as_str));
        match unknown.into_iter().next() {
            Some(name) => Err(SchemaError::UnknownProperty(name)),
            None => Ok(schema),
        }
    }

    /// Build a schema from caller-supplied grammars.
    pub fn from_properties<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = (S, Property)>,
        S: AsRef<str>,
    {
        let mut schema = Self::default();
        for (name, property) in properties {
            schema.insert(name.as_ref().to_ascii_lowercase(), &property);
        }
        schema
    }

    fn select<'a>(names: impl Iterator<Item = &'a str>) -> (Self, Vec<String>) {
        let all = definitions();
        let mut schema = Self::default();
        let mut unknown = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        for name in names {
            match all.get(name) {
                Some(property) => {
                    pending.extend(property.functions.values().cloned());
                    schema.insert(name.to_string(), property);
                }
                None => unknown.push(name.to_string()),
            }
        }
        while let Some(key) = pending.pop() {
            if schema.properties.contains_key(&key) {
                continue;
            }
            if let Some(property) = all.get(&key) {
                pending.extend(property.functions.values().cloned());
                schema.insert(key, property);
            }
        }
        (schema, unknown)
    }

    fn insert(&mut self, name: String, property: &Property) {
        self.properties.entry(name).or_default().merge(property);
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Property names, excluding function argument grammars.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties
            .keys()
            .map(String::as_str)
            .filter(|name| !name.ends_with("()"))
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Schema accepting whatever either input accepts.
    pub fn union(&self, other: &CssSchema) -> CssSchema {
        let mut out = self.clone();
        for (name, property) in &other.properties {
            out.insert(name.clone(), property);
        }
        out
    }

    /// Schema accepting only what both inputs accept.
    pub fn intersection(&self, other: &CssSchema) -> CssSchema {
        let properties = self
            .properties
            .iter()
            .filter_map(|(name, left)| {
                let right = other.properties.get(name)?;
                let functions = left
                    .functions
                    .iter()
                    .filter(|(fname, key)| right.functions.get(*fname) == Some(*key))
                    .map(|(fname, key)| (fname.clone(), key.clone()))
                    .collect();
                let property = Property {
                    classes: ValueClasses(left.classes.0 & right.classes.0),
                    literals: left.literals.intersection(&right.literals).cloned().collect(),
                    functions,
                };
                Some((name.clone(), property))
            })
            .collect();
        CssSchema { properties }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_whitelist_is_conservative() {
        let schema = CssSchema::default_whitelist();
        assert!(schema.get("color").is_some());
        assert!(schema.get("font-size").is_some());
        assert!(schema.get("display").is_none());
        assert!(schema.get("position").is_none());
        assert!(schema.get("rgb()").is_some());
    }

    #[test]
    fn with_properties_pulls_in_function_grammars() {
        let schema = CssSchema::with_properties(["Color"]).unwrap();
        let names: Vec<_> = schema.property_names().collect();
        assert_eq!(names, vec!["color"]);
        assert!(schema.get("rgba()").is_some());
    }

    #[test]
    fn with_properties_rejects_unknown_names() {
        assert_eq!(
            CssSchema::with_properties(["color", "behavior"]),
            Err(SchemaError::UnknownProperty("behavior".into()))
        );
    }

    #[test]
    fn union_merges_literals_of_shared_properties() {
        let a = CssSchema::from_properties([(
            "text-align",
            Property::new(ValueClasses::empty(), ["center"], [] as [(&str, &str); 0]),
        )]);
        let b = CssSchema::with_properties(["text-align", "display"]).unwrap();
        let merged = a.union(&b);
        let property = merged.get("text-align").unwrap();
        assert!(property.literals.contains("center"));
        assert!(property.literals.contains("justify"));
        assert!(merged.get("display").is_some());
    }

    #[test]
    fn intersection_keeps_common_values() {
        let a = CssSchema::from_properties([(
            "float",
            Property::new(ValueClasses::empty(), ["left", "none"], [] as [(&str, &str); 0]),
        )]);
        let b = CssSchema::with_properties(["float", "clear"]).unwrap();
        let both = a.intersection(&b);
        assert_eq!(both.property_names().collect::<Vec<_>>(), vec!["float"]);
        assert!(!both.get("float").unwrap().literals.contains("right"));
    }
}
