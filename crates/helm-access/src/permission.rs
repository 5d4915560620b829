//! Hierarchical permission nodes pooled process-wide by dotted name.
//!
//! Requesting `a.b.c` lazily creates and links `a.b` and `a`. The pool is
//! append-only and guarantees one instance per name for the lifetime of the
//! process, so pointer identity equals name equality. Checks resolve the
//! most specific explicit setting first, then parent `.*` wildcards, then
//! recurse up the chain; an unset root is denied.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock};

use crate::invoker::Invoker;

/// Suffix that turns a permission name into a subtree-wide wildcard.
pub const PERMISSION_WILDCARD_SUFFIX: &str = ".*";

fn permission_pool() -> &'static Mutex<BTreeMap<String, Arc<Permission>>> {
    static POOL: OnceLock<Mutex<BTreeMap<String, Arc<Permission>>>> = OnceLock::new();
    POOL.get_or_init(|| Mutex::new(BTreeMap::new()))
}

#[derive(Debug)]
/// Public struct `Permission` used across Helm components.
pub struct Permission {
    name: String,
    parent: Option<Arc<Permission>>,
}

impl Permission {
    /// Returns the pooled permission for `name`, creating it and its
    /// ancestor chain if absent.
    pub fn get(name: &str) -> Arc<Permission> {
        let mut pool = permission_pool()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Self::get_or_create(&mut pool, name)
    }

    fn get_or_create(
        pool: &mut BTreeMap<String, Arc<Permission>>,
        name: &str,
    ) -> Arc<Permission> {
        if let Some(existing) = pool.get(name) {
            return Arc::clone(existing);
        }
        let parent = name
            .rsplit_once('.')
            .map(|(parent_name, _)| Self::get_or_create(pool, parent_name));
        let created = Arc::new(Permission {
            name: name.to_string(),
            parent,
        });
        pool.insert(name.to_string(), Arc::clone(&created));
        tracing::debug!(permission = %name, "created permission pool entry");
        created
    }

    /// Pooled permission for `<this>.<segment>`.
    pub fn child(&self, segment: &str) -> Arc<Permission> {
        Permission::get(&format!("{}.{}", self.name, segment))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<Permission>> {
        self.parent.as_ref()
    }

    /// Whether `invoker` holds this permission.
    ///
    /// Operators always pass. An explicit setting for exactly this name
    /// wins; otherwise the parent's `.*` wildcard setting wins; otherwise
    /// the check recurses into the parent. A root with no setting denies.
    pub fn allows(&self, invoker: &dyn Invoker) -> bool {
        if invoker.is_operator() {
            return true;
        }
        if let Some(explicit) = invoker.permission_setting(&self.name) {
            return explicit;
        }
        match &self.parent {
            Some(parent) => {
                let wildcard = format!("{}{}", parent.name, PERMISSION_WILDCARD_SUFFIX);
                if let Some(explicit) = invoker.permission_setting(&wildcard) {
                    return explicit;
                }
                parent.allows(invoker)
            }
            None => false,
        }
    }
}
