//! Well-known storage-format namespaces

use serde::{Deserialize, Serialize};

/// Namespace prefixes the storage format embeds in page bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KnownNamespace {
    /// Macros, layouts, structured widgets (`ac:`)
    Ac,
    /// Resource identifiers: pages, attachments, users (`ri:`)
    Ri,
    /// Template and miscellaneous elements (`at:`)
    At,
}

impl KnownNamespace {
    pub const ALL: [KnownNamespace; 3] = [KnownNamespace::Ac, KnownNamespace::Ri, KnownNamespace::At];

    pub fn prefix(&self) -> &'static str {
        match self {
            KnownNamespace::Ac => "ac",
            KnownNamespace::Ri => "ri",
            KnownNamespace::At => "at",
        }
    }

    pub fn uri(&self) -> &'static str {
        match self {
            KnownNamespace::Ac => "http://www.atlassian.com/schema/confluence/4/ac/",
            KnownNamespace::Ri => "http://www.atlassian.com/schema/confluence/4/ri/",
            KnownNamespace::At => "http://www.atlassian.com/schema/confluence/4/at/",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "ac" => Some(KnownNamespace::Ac),
            "ri" => Some(KnownNamespace::Ri),
            "at" => Some(KnownNamespace::At),
            _ => None,
        }
    }

    /// Find which well-known prefixes appear anywhere in the raw content.
    ///
    /// This is a plain substring scan; a prefix mentioned only in text still
    /// counts, which at worst adds an unused declaration to the wrapper.
    pub fn detect(content: &str) -> Vec<KnownNamespace> {
        Self::ALL
            .iter()
            .copied()
            .filter(|ns| content.contains(&format!("{}:", ns.prefix())))
            .collect()
    }
}

/// Namespace of a parsed element, resolved from its prefix
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    /// Unprefixed (plain XHTML)
    Html,
    Known(KnownNamespace),
    /// Any other prefix, kept verbatim
    Other(String),
}

impl Namespace {
    pub fn from_prefix(prefix: Option<&str>) -> Self {
        match prefix {
            None => Namespace::Html,
            Some(p) => match KnownNamespace::from_prefix(p) {
                Some(known) => Namespace::Known(known),
                None => Namespace::Other(p.to_string()),
            },
        }
    }

    pub fn is_html(&self) -> bool {
        matches!(self, Namespace::Html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_prefixes() {
        let found = KnownNamespace::detect(r#"<ac:structured-macro ac:name="info"><ri:page/></ac:structured-macro>"#);
        assert_eq!(found, vec![KnownNamespace::Ac, KnownNamespace::Ri]);
        assert!(KnownNamespace::detect("<p>plain</p>").is_empty());
    }

    #[test]
    fn test_namespace_from_prefix() {
        assert_eq!(Namespace::from_prefix(None), Namespace::Html);
        assert_eq!(Namespace::from_prefix(Some("at")), Namespace::Known(KnownNamespace::At));
        assert_eq!(Namespace::from_prefix(Some("x")), Namespace::Other("x".into()));
    }
}
