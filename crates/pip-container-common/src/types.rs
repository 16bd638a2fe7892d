//! Component locators: five-segment descriptors and factory type names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ContainerError, Result};

/// Text token standing for "any value" in a descriptor segment.
pub const WILDCARD: &str = "*";

/// Five-segment component locator: `group:type:kind:name:version`.
///
/// A `None` segment is a wildcard. Two descriptors match when every segment
/// pair is equal or at least one side of the pair is a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Descriptor {
    group: Option<String>,
    kind_type: Option<String>,
    kind: Option<String>,
    name: Option<String>,
    version: Option<String>,
}

fn segment(value: &str) -> Option<String> {
    if value.is_empty() || value == WILDCARD {
        None
    } else {
        Some(value.to_owned())
    }
}

fn segments_match(left: Option<&str>, right: Option<&str>) -> bool {
    match (left, right) {
        (Some(l), Some(r)) => l == r,
        _ => true,
    }
}

impl Descriptor {
    /// Creates a descriptor; `"*"` or an empty string in any position is a wildcard.
    #[must_use]
    pub fn new(group: &str, kind_type: &str, kind: &str, name: &str, version: &str) -> Self {
        Self {
            group: segment(group),
            kind_type: segment(kind_type),
            kind: segment(kind),
            name: segment(name),
            version: segment(version),
        }
    }

    /// Logical group, e.g. `pip-services`.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Logical component type, e.g. `logger`.
    #[must_use]
    pub fn kind_type(&self) -> Option<&str> {
        self.kind_type.as_deref()
    }

    /// Implementation kind, e.g. `console`.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Unique component name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Implementation version.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Structural match with wildcards on either side.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        segments_match(self.group(), other.group())
            && segments_match(self.kind_type(), other.kind_type())
            && segments_match(self.kind(), other.kind())
            && segments_match(self.name(), other.name())
            && segments_match(self.version(), other.version())
    }

    /// Returns `true` if no segment is a wildcard.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.group.is_some()
            && self.kind_type.is_some()
            && self.kind.is_some()
            && self.name.is_some()
            && self.version.is_some()
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |s: Option<&str>| s.unwrap_or(WILDCARD).to_owned();
        write!(
            f,
            "{}:{}:{}:{}:{}",
            part(self.group()),
            part(self.kind_type()),
            part(self.kind()),
            part(self.name()),
            part(self.version())
        )
    }
}

impl FromStr for Descriptor {
    type Err = ContainerError;

    fn from_str(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.trim().split(':').collect();
        let [group, kind_type, kind, name, version] = parts.as_slice() else {
            return Err(ContainerError::config(format!(
                "descriptor \"{value}\" is in wrong format, expected group:type:kind:name:version"
            )));
        };
        Ok(Self::new(group, kind_type, kind, name, version))
    }
}

impl TryFrom<String> for Descriptor {
    type Error = ContainerError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Descriptor> for String {
    fn from(value: Descriptor) -> Self {
        value.to_string()
    }
}

/// Factory type hint used by `type:` configuration sections: `name[,library]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    name: String,
    library: Option<String>,
}

impl TypeName {
    /// Creates a type name with an optional library qualifier.
    #[must_use]
    pub fn new(name: impl Into<String>, library: Option<&str>) -> Self {
        Self {
            name: name.into(),
            library: library.map(str::to_owned),
        }
    }

    /// Unqualified type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Library (package) qualifier, if given.
    #[must_use]
    pub fn library(&self) -> Option<&str> {
        self.library.as_deref()
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.library {
            Some(library) => write!(f, "{},{library}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl FromStr for TypeName {
    type Err = ContainerError;

    fn from_str(value: &str) -> Result<Self> {
        let mut parts = value.splitn(2, ',').map(str::trim);
        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(ContainerError::config(format!(
                "type \"{value}\" is in wrong format, expected name[,library]"
            )));
        }
        let library = parts.next().filter(|l| !l.is_empty());
        Ok(Self::new(name, library))
    }
}

/// Key under which a component is created and registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Five-segment descriptor.
    Descriptor(Descriptor),
    /// Factory type hint.
    Type(TypeName),
}

impl Locator {
    /// Returns `true` if `self` and `other` identify the same component.
    ///
    /// Descriptors match structurally; type names match by equality; a
    /// descriptor never matches a type name.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Descriptor(a), Self::Descriptor(b)) => a.matches(b),
            (Self::Type(a), Self::Type(b)) => a == b,
            _ => false,
        }
    }

    /// Returns the descriptor if this locator is one.
    #[must_use]
    pub const fn as_descriptor(&self) -> Option<&Descriptor> {
        match self {
            Self::Descriptor(d) => Some(d),
            Self::Type(_) => None,
        }
    }
}

impl From<Descriptor> for Locator {
    fn from(value: Descriptor) -> Self {
        Self::Descriptor(value)
    }
}

impl From<TypeName> for Locator {
    fn from(value: TypeName) -> Self {
        Self::Type(value)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Descriptor(d) => fmt::Display::fmt(d, f),
            Self::Type(t) => fmt::Display::fmt(t, f),
        }
    }
}
