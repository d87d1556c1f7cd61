//! Hunter selection.

use std::collections::HashSet;

use doghunt_host::{PlayerId, Role};
use rand::Rng;

use crate::StartError;

/// The two sides of a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub hunter: PlayerId,
    /// Everyone else, in input order.
    pub hunted: Vec<PlayerId>,
}

/// Picks the hunter and partitions the rest into the hunted faction.
pub struct RoundSelector;

impl RoundSelector {
    /// Chooses the hunter uniformly at random among `participants`.
    ///
    /// The hunted faction is everyone else, minus anyone `role_of` still
    /// reports as `Hunter` from a stale previous round. Duplicate ids are
    /// collapsed first, so no participant appears twice across the output.
    ///
    /// Production callers pass a fresh `rand::rng()` per call.
    pub fn select<F, R>(
        participants: &[PlayerId],
        role_of: F,
        rng: &mut R,
    ) -> Result<Selection, StartError>
    where
        F: Fn(PlayerId) -> Option<Role>,
        R: Rng,
    {
        let pool = distinct(participants);
        if pool.is_empty() {
            return Err(StartError::SelectionFailed);
        }

        let hunter = pool[rng.random_range(0..pool.len())];
        let hunted = pool
            .into_iter()
            .filter(|p| *p != hunter)
            .filter(|p| {
                let stale = role_of(*p) == Some(Role::Hunter);
                if stale {
                    tracing::warn!(player = %p, "excluding stale hunter from hunted faction");
                }
                !stale
            })
            .collect();

        Ok(Selection { hunter, hunted })
    }
}

/// Removes duplicate ids, keeping the first occurrence.
pub(crate) fn distinct(participants: &[PlayerId]) -> Vec<PlayerId> {
    let mut seen = HashSet::with_capacity(participants.len());
    participants
        .iter()
        .copied()
        .filter(|p| seen.insert(*p))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn ids(raw: &[u64]) -> Vec<PlayerId> {
        raw.iter().copied().map(PlayerId).collect()
    }

    fn no_roles(_: PlayerId) -> Option<Role> {
        Some(Role::Spectator)
    }

    #[test]
    fn test_one_hunter_and_the_rest_hunted() {
        let roster = ids(&[1, 2, 3, 4, 5]);
        for _ in 0..100 {
            let sel = RoundSelector::select(&roster, no_roles, &mut rand::rng()).unwrap();
            assert!(roster.contains(&sel.hunter));
            assert!(!sel.hunted.contains(&sel.hunter));
            assert_eq!(sel.hunted.len(), roster.len() - 1);

            let mut union: Vec<_> = sel.hunted.clone();
            union.push(sel.hunter);
            union.sort();
            assert_eq!(union, roster);
        }
    }

    #[test]
    fn test_hunted_keeps_input_order() {
        let roster = ids(&[9, 3, 7]);
        let sel = RoundSelector::select(&roster, no_roles, &mut rand::rng()).unwrap();
        let expected: Vec<_> = roster.iter().copied().filter(|p| *p != sel.hunter).collect();
        assert_eq!(sel.hunted, expected);
    }

    #[test]
    fn test_every_participant_gets_picked_over_many_trials() {
        let roster = ids(&[1, 2, 3, 4, 5]);
        let mut counts: HashMap<PlayerId, usize> = HashMap::new();
        for _ in 0..1000 {
            let sel = RoundSelector::select(&roster, no_roles, &mut rand::rng()).unwrap();
            *counts.entry(sel.hunter).or_default() += 1;
        }
        for p in &roster {
            assert!(counts.get(p).copied().unwrap_or(0) > 0, "{p} was never picked");
        }
    }

    #[test]
    fn test_stale_hunter_is_excluded_from_hunted() {
        let roster = ids(&[1, 2, 3]);
        let role_of = |p: PlayerId| {
            if p == PlayerId(3) {
                Some(Role::Hunter)
            } else {
                Some(Role::Spectator)
            }
        };
        for _ in 0..50 {
            let sel = RoundSelector::select(&roster, role_of, &mut rand::rng()).unwrap();
            assert!(!sel.hunted.contains(&PlayerId(3)));
        }
    }

    #[test]
    fn test_duplicates_are_collapsed() {
        let roster = ids(&[1, 1, 2, 2]);
        let sel = RoundSelector::select(&roster, no_roles, &mut rand::rng()).unwrap();
        assert_eq!(sel.hunted.len(), 1);
        assert_ne!(sel.hunted[0], sel.hunter);
    }

    #[test]
    fn test_empty_pool_fails() {
        let result = RoundSelector::select(&[], no_roles, &mut rand::rng());
        assert_eq!(result, Err(StartError::SelectionFailed));
    }
}
