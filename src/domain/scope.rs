use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// The set of sites a moderator may act on.
///
/// Unscoped moderators (organization admins) see everything. Scoped
/// moderators see only events and comments for their sites, plus
/// site-less account-level events, which are global by definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModerationScope {
    Unscoped,
    Sites(HashSet<Uuid>),
}

impl ModerationScope {
    pub fn sites<I: IntoIterator<Item = Uuid>>(ids: I) -> Self {
        ModerationScope::Sites(ids.into_iter().collect())
    }

    pub fn is_scoped(&self) -> bool {
        matches!(self, ModerationScope::Sites(_))
    }

    /// Pure, cheap membership check run per subscriber per event.
    pub fn allows(&self, site_id: Option<Uuid>) -> bool {
        match (self, site_id) {
            (ModerationScope::Unscoped, _) => true,
            (ModerationScope::Sites(_), None) => true,
            (ModerationScope::Sites(sites), Some(site_id)) => sites.contains(&site_id),
        }
    }
}
