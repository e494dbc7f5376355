/// The markup family a reader or writer speaks.
///
/// Each flavor has its own spelling of type tags and nil markers, and its
/// own idea of which names are significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    Xml,
    Json,
}

impl Flavor {
    /// Name of the attribute carrying a type tag.
    #[inline]
    pub const fn type_attribute(self) -> &'static str {
        match self {
            Self::Xml => "xsi:type",
            Self::Json => "$type",
        }
    }

    /// Name of the attribute marking an element as nil.
    #[inline]
    pub const fn nil_attribute(self) -> &'static str {
        match self {
            Self::Xml => "xsi:nil",
            Self::Json => "$nil",
        }
    }

    /// Returns `true` if `name` is reserved by the flavor.
    #[inline]
    pub fn is_reserved_attribute(self, name: &str) -> bool {
        match self {
            Self::Xml => name.starts_with("xsi:") || name.starts_with("xmlns"),
            Self::Json => name.starts_with('$'),
        }
    }

    /// Attributes are written as ordinary members and read back as child elements.
    #[inline]
    pub const fn attributes_as_members(self) -> bool {
        matches!(self, Self::Json)
    }

    /// A list may be written as repeated sibling elements.
    #[inline]
    pub const fn inline_lists(self) -> bool {
        matches!(self, Self::Xml)
    }

    /// The root element name is part of the document.
    #[inline]
    pub const fn named_root(self) -> bool {
        matches!(self, Self::Xml)
    }

    /// List items carry their own element name.
    #[inline]
    pub const fn named_items(self) -> bool {
        matches!(self, Self::Xml)
    }
}
