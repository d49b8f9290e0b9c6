//! Named lifetime tiers.

use std::fmt;
use std::sync::Arc;

/// Name of the default tier every registration lands in unless pinned elsewhere.
pub const ROOT_SCOPE: &str = "root";

/// A named lifetime tier, e.g. `root`, `workspace`, `page`, `editor`.
///
/// A scope is only a registration-time tag. Its declared parent is nominal:
/// resolution never walks it. Cross-tier lookup happens solely through the
/// parent provider handed to [`Container::provider`](crate::Container::provider),
/// so the host wires the runtime provider chain to mirror this hierarchy.
///
/// # Examples
///
/// ```rust
/// use tiered_di::Scope;
///
/// let workspace = Scope::new("workspace");
/// let page = Scope::child_of("page", &workspace);
///
/// assert_eq!(page.key(), "page");
/// assert_eq!(page.parent().map(Scope::name), Some("workspace"));
/// assert_eq!(page.ancestors().map(Scope::name).collect::<Vec<_>>(), ["workspace"]);
/// assert!(Scope::root().is_root());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    name: Arc<str>,
    parent: Option<Arc<Scope>>,
}

impl Scope {
    /// Creates a tier with no declared parent.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            parent: None,
        }
    }

    /// Creates a tier declaring `parent` as its enclosing tier.
    pub fn child_of(name: impl Into<Arc<str>>, parent: &Scope) -> Self {
        Self {
            name: name.into(),
            parent: Some(Arc::new(parent.clone())),
        }
    }

    /// The default tier.
    pub fn root() -> Self {
        Self::new(ROOT_SCOPE)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flat registration key. Only the name participates.
    pub fn key(&self) -> &str {
        &self.name
    }

    pub(crate) fn key_arc(&self) -> &Arc<str> {
        &self.name
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.parent.as_deref()
    }

    /// Declared ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &Scope> {
        std::iter::successors(self.parent(), |scope| scope.parent())
    }

    pub fn is_root(&self) -> bool {
        &*self.name == ROOT_SCOPE
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Scope {
    fn from(name: &str) -> Self {
        Scope::new(name)
    }
}
