use std::{
    fmt,
    net::IpAddr,
    time::{Duration, Instant},
};

use actnet_shared::ProfileId;
use log::info;

/// What a ban applies to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BanTarget {
    Profile(ProfileId),
    Address(IpAddr),
}

impl fmt::Display for BanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BanTarget::Profile(profile_id) => write!(f, "profile {}", profile_id),
            BanTarget::Address(address) => write!(f, "address {}", address),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct BanEntry {
    target: BanTarget,
    expires: Instant,
    reason: String,
}

/// One active ban as reported by `BanList::status`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BanStatus {
    pub target: BanTarget,
    pub remaining: Duration,
    pub reason: String,
}

/// Banned profiles and addresses. Expired bans are pruned whenever the list
/// is consulted.
#[derive(Default)]
pub struct BanList {
    entries: Vec<BanEntry>,
}

impl BanList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bans `target` until `now + duration`, replacing any earlier ban on the
    /// same target
    pub fn ban(&mut self, target: BanTarget, duration: Duration, reason: &str, now: Instant) {
        self.entries.retain(|entry| entry.target != target);
        info!("Banning {} for {}s: {}", target, duration.as_secs(), reason);
        self.entries.push(BanEntry {
            target,
            expires: now + duration,
            reason: reason.to_string(),
        });
    }

    /// Lifts a ban. Returns false if `target` wasn't banned.
    pub fn unban(&mut self, target: BanTarget) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.target != target);
        self.entries.len() != before
    }

    /// Returns the ban matching either the profile or the address
    pub fn check(
        &mut self,
        profile_id: Option<ProfileId>,
        address: Option<IpAddr>,
        now: Instant,
    ) -> Option<BanTarget> {
        self.prune(now);
        self.entries
            .iter()
            .find(|entry| match entry.target {
                BanTarget::Profile(banned) => profile_id == Some(banned),
                BanTarget::Address(banned) => address == Some(banned),
            })
            .map(|entry| entry.target)
    }

    pub fn status(&mut self, now: Instant) -> Vec<BanStatus> {
        self.prune(now);
        self.entries
            .iter()
            .map(|entry| BanStatus {
                target: entry.target,
                remaining: entry.expires.saturating_duration_since(now),
                reason: entry.reason.clone(),
            })
            .collect()
    }

    /// Number of entries, including expired ones not yet pruned
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn prune(&mut self, now: Instant) {
        self.entries.retain(|entry| entry.expires > now);
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn bans_expire_lazily() {
        let start = Instant::now();
        let mut bans = BanList::new();
        bans.ban(BanTarget::Profile(7), Duration::from_secs(60), "griefing", start);
        assert_eq!(bans.len(), 1);

        assert_eq!(
            bans.check(Some(7), None, start + Duration::from_secs(59)),
            Some(BanTarget::Profile(7))
        );
        // still stored until the next check
        assert_eq!(bans.len(), 1);

        assert_eq!(bans.check(Some(7), None, start + Duration::from_secs(60)), None);
        assert!(bans.is_empty());
    }

    #[test]
    fn address_bans_match_any_profile() {
        let now = Instant::now();
        let address = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 3));
        let mut bans = BanList::new();
        bans.ban(BanTarget::Address(address), Duration::from_secs(5), "", now);

        assert_eq!(
            bans.check(Some(1), Some(address), now),
            Some(BanTarget::Address(address))
        );
        assert_eq!(bans.check(Some(1), None, now), None);
    }

    #[test]
    fn rebanning_replaces_the_entry() {
        let now = Instant::now();
        let mut bans = BanList::new();
        bans.ban(BanTarget::Profile(2), Duration::from_secs(5), "first", now);
        bans.ban(BanTarget::Profile(2), Duration::from_secs(50), "second", now);

        let status = bans.status(now);
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].remaining, Duration::from_secs(50));
        assert_eq!(status[0].reason, "second");

        assert!(bans.unban(BanTarget::Profile(2)));
        assert!(!bans.unban(BanTarget::Profile(2)));
    }
}
