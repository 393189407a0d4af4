//! Moderation bypass for admins and whitelisted identities.

use std::collections::HashSet;
use std::sync::Arc;

use crate::store::SharedList;

/// Decides which authors skip moderation entirely.
#[derive(Clone)]
pub struct BypassAuthority {
    admins: Arc<HashSet<i64>>,
    whitelist: Arc<SharedList<i64>>,
}

impl BypassAuthority {
    pub fn new(admins: impl IntoIterator<Item = i64>, whitelist: Arc<SharedList<i64>>) -> Self {
        Self {
            admins: Arc::new(admins.into_iter().collect()),
            whitelist,
        }
    }

    /// Static bot administrators (also the only users allowed to run admin commands).
    pub fn is_admin(&self, id: i64) -> bool {
        self.admins.contains(&id)
    }

    pub fn is_whitelisted(&self, id: i64) -> bool {
        self.whitelist.contains(&id)
    }

    /// Admins and whitelisted users or channels are exempt from every check.
    pub fn is_exempt(&self, id: i64) -> bool {
        self.is_admin(id) || self.is_whitelisted(id)
    }
}
