use crate::config::NetFallback;
use crate::model::{LeaderboardEntry, ScoringMode};

/// Ordering key inside the ranked bucket. Variant order matters: every
/// `Primary` key sorts ahead of every `Fallback` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Primary(i32),
    Fallback(i32),
}

impl ScoringMode {
    /// The figure an entry is ranked on under this mode. `both` exposes net
    /// figures but ranks on gross.
    #[must_use]
    pub fn sort_key(self, entry: &LeaderboardEntry, fallback: NetFallback) -> SortKey {
        match self {
            ScoringMode::Gross | ScoringMode::Both => SortKey::Primary(entry.relative_to_par),
            ScoringMode::Net => match (entry.net_relative_to_par, fallback) {
                (Some(net), _) => SortKey::Primary(net),
                (None, NetFallback::UseGross) => SortKey::Primary(entry.relative_to_par),
                (None, NetFallback::RankAfterNet) => SortKey::Fallback(entry.relative_to_par),
            },
        }
    }
}

/// Competition ("1224") ranking over keys already in ascending order: a tie
/// shares the position of its first member, and the next group's position
/// is one more than the number of entries ahead of it.
#[must_use]
pub fn competition_positions<K: PartialEq>(sorted_keys: &[K]) -> Vec<usize> {
    let mut positions = Vec::with_capacity(sorted_keys.len());
    for (i, key) in sorted_keys.iter().enumerate() {
        let position = match i.checked_sub(1) {
            Some(prev) if sorted_keys[prev] == *key => positions[prev],
            _ => i + 1,
        };
        positions.push(position);
    }
    positions
}

/// Order entries into ranked finishers, then DNF, then DQ, and fill in
/// positions. DQ wins over DNF when both flags are set. Excluded entries get
/// position 0 and keep their input order.
#[must_use]
pub fn rank_entries(
    entries: Vec<LeaderboardEntry>,
    mode: ScoringMode,
    fallback: NetFallback,
) -> Vec<LeaderboardEntry> {
    let mut ranked = Vec::new();
    let mut dnf = Vec::new();
    let mut dq = Vec::new();
    for entry in entries {
        if entry.is_dq {
            dq.push(entry);
        } else if entry.is_dnf {
            dnf.push(entry);
        } else {
            ranked.push(entry);
        }
    }

    let mut keyed: Vec<(SortKey, LeaderboardEntry)> = ranked
        .into_iter()
        .map(|e| (mode.sort_key(&e, fallback), e))
        .collect();
    keyed.sort_by(|(ka, a), (kb, b)| ka.cmp(kb).then_with(|| a.player_name.cmp(&b.player_name)));

    let keys: Vec<SortKey> = keyed.iter().map(|(k, _)| *k).collect();
    let positions = competition_positions(&keys);

    let mut out = Vec::with_capacity(keyed.len() + dnf.len() + dq.len());
    for ((_, mut entry), position) in keyed.into_iter().zip(positions) {
        entry.position = position;
        out.push(entry);
    }
    for mut entry in dnf.into_iter().chain(dq) {
        entry.position = 0;
        out.push(entry);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_leave_gaps() {
        assert_eq!(competition_positions(&[-2, -2, 1, 1, 5]), vec![1, 1, 3, 3, 5]);
        assert_eq!(competition_positions(&[0, 0, 1, 2, 2, 3]), vec![1, 1, 3, 4, 4, 6]);
        assert!(competition_positions::<i32>(&[]).is_empty());
    }

    #[test]
    fn fallback_keys_sort_after_primary() {
        assert!(SortKey::Primary(40) < SortKey::Fallback(-10));
    }
}
