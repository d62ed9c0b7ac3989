//! Static structural categories consulted by the balancer.
//!
//! Every repair decision is a table lookup here; the balancer itself only
//! walks the open-element stack.

/// Scope flavors used when searching the open-element stack.
///
/// The flavor is chosen by the caller's context (which start or end tag is
/// being handled), not by the element being searched for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScopeKind {
    /// Baseline scope; also bounded by scope-limited elements.
    InScope,
    Button,
    ListItem,
    DefinitionList,
    /// Bounded only by the table itself.
    Table,
    /// Bounded by table sections or the table.
    TableBody,
    /// Bounded by rows, sections or the table.
    TableRow,
}

pub(crate) fn is_scope_boundary(name: &str, kind: ScopeKind) -> bool {
    match kind {
        ScopeKind::InScope => matches!(
            name,
            "html"
                | "table"
                | "template"
                | "td"
                | "th"
                | "caption"
                | "marquee"
                | "object"
                | "applet"
        ) || is_scope_limited(name),
        ScopeKind::Button => is_scope_boundary(name, ScopeKind::InScope) || name == "button",
        ScopeKind::ListItem => {
            is_scope_boundary(name, ScopeKind::InScope)
                || matches!(name, "ol" | "ul" | "menu" | "dir")
        }
        ScopeKind::DefinitionList => is_scope_boundary(name, ScopeKind::InScope) || name == "dl",
        ScopeKind::Table => matches!(name, "html" | "table" | "template"),
        ScopeKind::TableBody => {
            is_scope_boundary(name, ScopeKind::Table)
                || matches!(name, "tbody" | "thead" | "tfoot")
        }
        ScopeKind::TableRow => is_scope_boundary(name, ScopeKind::TableBody) || name == "tr",
    }
}

/// Elements that bound the reach of every end tag, including table
/// structure end tags.
pub(crate) fn is_scope_limited(name: &str) -> bool {
    name == "noscript"
}

/// End tags that may cross cell boundaries to close table structure.
pub(crate) fn is_table_structure(name: &str) -> bool {
    matches!(
        name,
        "table" | "tbody" | "thead" | "tfoot" | "tr" | "caption" | "colgroup"
    )
}

/// Formatting elements reopened after an end tag implicitly closes them.
pub(crate) fn is_formatting(name: &str) -> bool {
    matches!(
        name,
        "b" | "big"
            | "em"
            | "font"
            | "i"
            | "s"
            | "small"
            | "strike"
            | "strong"
            | "sub"
            | "sup"
            | "tt"
            | "u"
    )
}

/// Containers whose direct whitespace-only text is structural noise.
pub(crate) fn drops_whitespace_text(name: &str) -> bool {
    matches!(
        name,
        "table" | "tbody" | "thead" | "tfoot" | "tr" | "colgroup" | "select" | "optgroup"
    )
}

/// Elements that switch to foreign content, where `/>` closes any element.
pub(crate) fn is_foreign_root(name: &str) -> bool {
    matches!(name, "svg" | "math")
}

/// One implied-close rule applied before a start tag opens.
#[derive(Debug)]
pub(crate) struct ImpliedClose {
    /// Open elements this start tag closes.
    pub(crate) closes: &'static [&'static str],
    /// Scope that stops the search for `closes`.
    pub(crate) scope: ScopeKind,
    /// Only close a match that is the current node.
    pub(crate) current_only: bool,
}

/// A wrapper synthesized when a start tag appears directly inside one of `within`.
#[derive(Debug)]
pub(crate) struct ImpliedParent {
    pub(crate) parent: &'static str,
    pub(crate) within: &'static [&'static str],
}

const CLOSES_P: ImpliedClose = ImpliedClose {
    closes: &["p"],
    scope: ScopeKind::Button,
    current_only: false,
};

const CLOSES_LI: ImpliedClose = ImpliedClose {
    closes: &["li"],
    scope: ScopeKind::ListItem,
    current_only: false,
};

const CLOSES_DT_DD: ImpliedClose = ImpliedClose {
    closes: &["dt", "dd"],
    scope: ScopeKind::DefinitionList,
    current_only: false,
};

const CLOSES_OPTION: ImpliedClose = ImpliedClose {
    closes: &["option"],
    scope: ScopeKind::InScope,
    current_only: true,
};

const CLOSES_OPTGROUP: ImpliedClose = ImpliedClose {
    closes: &["optgroup"],
    scope: ScopeKind::InScope,
    current_only: true,
};

const CLOSES_HEADING: ImpliedClose = ImpliedClose {
    closes: &["h1", "h2", "h3", "h4", "h5", "h6"],
    scope: ScopeKind::InScope,
    current_only: true,
};

const CLOSES_CELL: ImpliedClose = ImpliedClose {
    closes: &["td", "th"],
    scope: ScopeKind::TableRow,
    current_only: false,
};

const CLOSES_ROW: ImpliedClose = ImpliedClose {
    closes: &["td", "th", "tr"],
    scope: ScopeKind::TableBody,
    current_only: false,
};

const CLOSES_SECTION: ImpliedClose = ImpliedClose {
    closes: &[
        "td", "th", "tr", "tbody", "thead", "tfoot", "caption", "colgroup",
    ],
    scope: ScopeKind::Table,
    current_only: false,
};

/// Implied-close rules for a start tag, applied in order.
pub(crate) fn implied_closes(name: &str) -> &'static [ImpliedClose] {
    match name {
        "li" => &[CLOSES_P, CLOSES_LI],
        "dt" | "dd" => &[CLOSES_P, CLOSES_DT_DD],
        "option" => &[CLOSES_OPTION],
        "optgroup" => &[CLOSES_OPTION, CLOSES_OPTGROUP],
        "td" | "th" => &[CLOSES_CELL],
        "tr" => &[CLOSES_ROW],
        "tbody" | "thead" | "tfoot" | "caption" | "colgroup" => &[CLOSES_SECTION],
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => &[CLOSES_P, CLOSES_HEADING],
        "address" | "article" | "aside" | "blockquote" | "center" | "details" | "dialog"
        | "dir" | "div" | "dl" | "fieldset" | "figcaption" | "figure" | "footer" | "form"
        | "header" | "hgroup" | "hr" | "listing" | "main" | "menu" | "nav" | "ol" | "p"
        | "plaintext" | "pre" | "section" | "summary" | "table" | "ul" | "xmp" => &[CLOSES_P],
        _ => &[],
    }
}

pub(crate) fn implied_parent(name: &str) -> Option<&'static ImpliedParent> {
    const TBODY: ImpliedParent = ImpliedParent {
        parent: "tbody",
        within: &["table"],
    };
    const TR: ImpliedParent = ImpliedParent {
        parent: "tr",
        within: &["table", "tbody", "thead", "tfoot"],
    };
    const COLGROUP: ImpliedParent = ImpliedParent {
        parent: "colgroup",
        within: &["table"],
    };
    match name {
        "tr" => Some(&TBODY),
        "td" | "th" => Some(&TR),
        "col" => Some(&COLGROUP),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_item_scope_stops_at_lists_and_noscript() {
        assert!(is_scope_boundary("ul", ScopeKind::ListItem));
        assert!(is_scope_boundary("noscript", ScopeKind::ListItem));
        assert!(!is_scope_boundary("div", ScopeKind::ListItem));
    }

    #[test]
    fn table_scope_ignores_cells() {
        assert!(!is_scope_boundary("td", ScopeKind::Table));
        assert!(is_scope_boundary("td", ScopeKind::InScope));
        assert!(is_scope_boundary("tr", ScopeKind::TableRow));
        assert!(!is_scope_boundary("tr", ScopeKind::TableBody));
    }

    #[test]
    fn categories_cover_table_and_list_family() {
        assert_eq!(implied_closes("tr").len(), 1);
        assert!(implied_closes("li").iter().any(|rule| rule.closes == ["li"]));
        assert!(implied_closes("span").is_empty());
        assert_eq!(implied_parent("td").map(|p| p.parent), Some("tr"));
        assert!(implied_parent("div").is_none());
    }
}
