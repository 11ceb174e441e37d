//! Request tokens for in-flight lookups
//!
//! Each dispatched lookup gets a token from a monotonic counter. Only the
//! latest token issued for a target may write to it; anything older that
//! completes afterwards is dropped.

use std::collections::HashMap;

/// Display target a lookup writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupTarget {
    RoleList,
    UserRoles,
    RoleUsers,
    UserSearch,
}

/// Identifies one dispatched lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Issues tokens and remembers which one is current for each target
#[derive(Debug, Default)]
pub struct RequestTracker {
    next: u64,
    latest: HashMap<LookupTarget, RequestToken>,
    pending: HashMap<LookupTarget, RequestToken>,
}

impl RequestTracker {
    /// Issue a token for `target`, superseding any earlier one
    pub fn issue(&mut self, target: LookupTarget) -> RequestToken {
        self.next += 1;
        let token = RequestToken(self.next);
        self.latest.insert(target, token);
        self.pending.insert(target, token);
        token
    }

    /// Accept a completed lookup if it is still the latest for its target
    pub fn complete(&mut self, target: LookupTarget, token: RequestToken) -> bool {
        if self.latest.get(&target) != Some(&token) {
            return false;
        }
        self.pending.remove(&target);
        true
    }

    pub fn is_pending(&self, target: LookupTarget) -> bool {
        self.pending.contains_key(&target)
    }

    pub fn any_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
