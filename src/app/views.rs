//! Rendered dashboard pages, cached until a mutation revalidates their path.
//!
//! Entries are keyed by (path, organization, role) so a page never leaks
//! across tenants or shows controls a role cannot use. Revalidation is by exact
//! path name only.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use crate::app::domain::OrganizationRole;

pub const DASHBOARD: &str = "/dashboard";
pub const STORES: &str = "/dashboard/stores";
pub const CUSTOMERS: &str = "/dashboard/customers";
pub const COUPONS: &str = "/dashboard/coupons";
pub const SHIFTS: &str = "/dashboard/shifts";
pub const VISITS: &str = "/dashboard/visits";
pub const ORGANIZATION_SETTINGS: &str = "/dashboard/settings/organization";

/// Identifies one cached rendering. `variant` distinguishes renderings of the
/// same path that depend on query parameters. Callers must only vary it over a
/// bounded set (such as ids that exist in the tenant), never over raw input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewKey {
    path: &'static str,
    variant: String,
    organization_id: String,
    role: OrganizationRole,
    latest_only: bool,
}

impl ViewKey {
    pub fn new(path: &'static str, organization_id: impl Into<String>, role: OrganizationRole) -> Self {
        Self {
            path,
            variant: String::new(),
            organization_id: organization_id.into(),
            role,
            latest_only: false,
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    /// Like `with_variant`, but caching this rendering evicts the other
    /// variants of the same page. For variants that age out, like today's date.
    pub fn with_latest_variant(self, variant: impl Into<String>) -> Self {
        Self {
            latest_only: true,
            ..self.with_variant(variant)
        }
    }

    fn same_page(&self, other: &ViewKey) -> bool {
        self.path == other.path && self.organization_id == other.organization_id && self.role == other.role
    }
}

#[derive(Debug, Default)]
struct Entries {
    pages: HashMap<ViewKey, String>,
    /// Bumped on every revalidation of a path.
    generations: HashMap<&'static str, u64>,
}

impl Entries {
    fn generation(&self, path: &str) -> u64 {
        self.generations.get(path).copied().unwrap_or(0)
    }

    fn insert(&mut self, key: ViewKey, html: String) {
        if key.latest_only {
            self.pages.retain(|other, _| !other.same_page(&key));
        }
        self.pages.insert(key, html);
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewCache {
    entries: Arc<RwLock<Entries>>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ViewKey) -> Option<String> {
        self.entries.read().ok()?.pages.get(key).cloned()
    }

    pub fn put(&self, key: ViewKey, html: String) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, html);
        }
    }

    /// Number of cached renderings across every tenant.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.pages.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached rendering of exactly this path, all variants included.
    /// Renders already in flight for the path will not be stored.
    pub fn revalidate_path(&self, path: &'static str) {
        if let Ok(mut entries) = self.entries.write() {
            let before = entries.pages.len();
            entries.pages.retain(|key, _| key.path != path);
            let dropped = before - entries.pages.len();
            *entries.generations.entry(path).or_insert(0) += 1;
            tracing::debug!(path, dropped, "revalidated view");
        }
    }

    /// Return the cached rendering, or render, cache and return it.
    /// Render failures are not cached, and neither is a rendering whose path
    /// was revalidated while it was being produced.
    pub async fn get_or_render<F, Fut, E>(&self, key: ViewKey, render: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        let lookup = self
            .entries
            .read()
            .ok()
            .map(|entries| (entries.pages.get(&key).cloned(), entries.generation(key.path)));
        let started_at = match lookup {
            Some((Some(html), _)) => return Ok(html),
            Some((None, generation)) => generation,
            None => return render().await,
        };

        let html = render().await?;
        if let Ok(mut entries) = self.entries.write() {
            if entries.generation(key.path) == started_at {
                entries.insert(key, html.clone());
            } else {
                tracing::debug!(path = key.path, "discarded render of revalidated view");
            }
        }
        Ok(html)
    }
}
