use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Dotted, hierarchical identity of a mapping node.
///
/// Every node of the metamodel is keyed by its role: `Order`, `Order.customer`,
/// `Customer.orders.{element}`, `Order.{id}`. A role is unique within a
/// metamodel and its parent relation forms a tree rooted at an entity name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NavigableRole {
    full: Arc<str>,
}

/// Query-time traversal path used while building fetch graphs.
///
/// Unlike a [`NavigableRole`], a path may repeat segments
/// (`Employee.manager.manager`), since the same mapping can be reached
/// more than once during a traversal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NavigablePath {
    full: Arc<str>,
}

impl NavigableRole {
    /// Local name of an entity or composite identifier.
    pub const IDENTIFIER: &'static str = "{id}";

    /// Local name of a collection's element part.
    pub const ELEMENT: &'static str = "{element}";

    /// Local name of a list index or map key part.
    pub const INDEX: &'static str = "{index}";

    /// Local name of an id-bag's row identifier.
    pub const COLLECTION_ID: &'static str = "{collection-id}";

    /// Local name of a foreign-key descriptor.
    pub const FOREIGN_KEY: &'static str = "{fk}";

    /// Local name of a synthesized key-side composite.
    pub const INVERSE: &'static str = "{inverse}";

    /// Local name of a discriminator.
    pub const DISCRIMINATOR: &'static str = "{discriminator}";

    pub fn new(root: impl AsRef<str>) -> NavigableRole {
        let root = root.as_ref();
        assert!(!root.is_empty(), "role root must not be empty");
        NavigableRole { full: root.into() }
    }

    /// Returns the role of a child node named `local`.
    pub fn append(&self, local: impl AsRef<str>) -> NavigableRole {
        NavigableRole {
            full: join(&self.full, local.as_ref()),
        }
    }

    /// Appends every segment of a dotted relative path.
    pub fn append_path(&self, relative: &str) -> NavigableRole {
        relative
            .split('.')
            .fold(self.clone(), |role, segment| role.append(segment))
    }

    pub fn parent(&self) -> Option<NavigableRole> {
        parent_of(&self.full).map(|full| NavigableRole { full: full.into() })
    }

    pub fn local_name(&self) -> &str {
        local_of(&self.full)
    }

    pub fn root_name(&self) -> &str {
        self.full.split('.').next().unwrap_or(&self.full)
    }

    pub fn full_path(&self) -> &str {
        &self.full
    }

    pub fn is_root(&self) -> bool {
        !self.full.contains('.')
    }

    /// Returns `true` if this role is `other` or a descendant of it.
    pub fn starts_with(&self, other: &NavigableRole) -> bool {
        self.full.as_ref() == other.full.as_ref()
            || (self.full.starts_with(other.full.as_ref())
                && self.full.as_bytes()[other.full.len()] == b'.')
    }
}

impl NavigablePath {
    pub fn new(root: impl AsRef<str>) -> NavigablePath {
        NavigablePath {
            full: root.as_ref().into(),
        }
    }

    pub fn append(&self, local: impl AsRef<str>) -> NavigablePath {
        NavigablePath {
            full: join(&self.full, local.as_ref()),
        }
    }

    pub fn parent(&self) -> Option<NavigablePath> {
        parent_of(&self.full).map(|full| NavigablePath { full: full.into() })
    }

    pub fn local_name(&self) -> &str {
        local_of(&self.full)
    }

    pub fn full_path(&self) -> &str {
        &self.full
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        self.full.matches('.').count()
    }

    /// Returns `true` if this path ends with the dotted `suffix`, aligned on
    /// segment boundaries.
    pub fn is_suffix(&self, suffix: &str) -> bool {
        self.trim_suffix(suffix).is_some() || self.full.as_ref() == suffix
    }

    /// Removes the dotted `suffix` from the end of this path.
    ///
    /// Returns `None` if the path does not end with `suffix` or if nothing
    /// would remain.
    pub fn trim_suffix(&self, suffix: &str) -> Option<NavigablePath> {
        let rest = self.full.strip_suffix(suffix)?;
        let rest = rest.strip_suffix('.')?;
        Some(NavigablePath { full: rest.into() })
    }
}

fn join(base: &str, local: &str) -> Arc<str> {
    debug_assert!(!local.is_empty());
    format!("{base}.{local}").into()
}

fn parent_of(full: &str) -> Option<&str> {
    full.rfind('.').map(|pos| &full[..pos])
}

fn local_of(full: &str) -> &str {
    match full.rfind('.') {
        Some(pos) => &full[pos + 1..],
        None => full,
    }
}

impl Borrow<str> for NavigableRole {
    fn borrow(&self) -> &str {
        &self.full
    }
}

impl fmt::Display for NavigableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl fmt::Debug for NavigableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NavigableRole({})", self.full)
    }
}

impl fmt::Display for NavigablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl fmt::Debug for NavigablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NavigablePath({})", self.full)
    }
}
