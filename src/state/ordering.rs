//! Ordering resolution.
//!
//! Produces one valid event ordering from a baseline identifier set, a
//! preferred ordering and the hints revealed so far.
//!
//! # Invariant
//!
//! The output is always a permutation of the baseline identifiers: nothing
//! foreign, nothing missing, nothing repeated. This holds for any `preferred`
//! input, including empty, truncated or reordered lists and lists with
//! unknown identifiers.
//!
//! # Algorithm
//!
//! ```text
//! preferred ──sanitize──▶ candidate ──remove anchored──▶ free ──(enforce relative)──▶ free'
//!                                                                                     │
//! anchors ──▶ slot map ──────────────────────────────────────────────▶ fill gaps L→R ◀┘
//! ```

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use super::config::{AnchorConflictPolicy, RelativePolicy, ResolverPolicy};
use super::hint::Hint;

/// Conflicting anchor hints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("conflicting anchors for position {position}: {existing} and {incoming}")]
    AnchorPositionConflict {
        position: usize,
        existing: String,
        incoming: String,
    },

    #[error("event {event_id} anchored at both position {first} and position {second}")]
    AnchorEventConflict {
        event_id: String,
        first: usize,
        second: usize,
    },
}

/// Resolves orderings under a fixed policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderingResolver {
    policy: ResolverPolicy,
}

impl OrderingResolver {
    pub fn new(policy: ResolverPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ResolverPolicy {
        &self.policy
    }

    /// Resolve an ordering.
    ///
    /// Fails only when anchors conflict and the policy rejects conflicts.
    pub fn resolve(
        &self,
        baseline: &[String],
        preferred: &[String],
        hints: &[Hint],
    ) -> Result<Vec<String>, ResolveError> {
        let ids = unique_in_order(baseline.iter().map(String::as_str), None);
        let known: HashSet<&str> = ids.iter().copied().collect();

        let candidate = sanitize(&ids, &known, preferred);
        let slots = self.place_anchors(&known, ids.len(), hints)?;

        let anchored: HashSet<&str> = slots.iter().flatten().copied().collect();
        let mut free: Vec<&str> = candidate
            .into_iter()
            .filter(|id| !anchored.contains(id))
            .collect();

        if self.policy.relative == RelativePolicy::Enforce {
            free = enforce_relative(free, hints);
        }

        let mut free = free.into_iter();
        let ordering = slots
            .into_iter()
            .filter_map(|slot| slot.or_else(|| free.next()))
            .map(str::to_string)
            .collect();

        Ok(ordering)
    }

    /// Build the position -> event map from anchor hints.
    fn place_anchors<'a>(
        &self,
        known: &HashSet<&'a str>,
        len: usize,
        hints: &'a [Hint],
    ) -> Result<Vec<Option<&'a str>>, ResolveError> {
        let mut slots: Vec<Option<&'a str>> = vec![None; len];
        let mut anchored_at: HashMap<&'a str, usize> = HashMap::new();

        for hint in hints {
            let Hint::Anchor { event_id, position } = hint else {
                continue;
            };
            let (event_id, position) = (event_id.as_str(), *position);

            if !known.contains(event_id) {
                tracing::warn!(event_id, position, "ignoring anchor for unknown event");
                continue;
            }
            if position >= len {
                tracing::warn!(event_id, position, len, "ignoring anchor outside the ordering");
                continue;
            }

            if let Some(existing) = slots[position] {
                if existing == event_id {
                    continue;
                }
                match self.policy.anchor_conflict {
                    AnchorConflictPolicy::Reject => {
                        return Err(ResolveError::AnchorPositionConflict {
                            position,
                            existing: existing.to_string(),
                            incoming: event_id.to_string(),
                        });
                    }
                    AnchorConflictPolicy::LastWins => {
                        anchored_at.remove(existing);
                    }
                }
            }

            if let Some(first) = anchored_at.get(event_id).copied() {
                match self.policy.anchor_conflict {
                    AnchorConflictPolicy::Reject => {
                        return Err(ResolveError::AnchorEventConflict {
                            event_id: event_id.to_string(),
                            first,
                            second: position,
                        });
                    }
                    AnchorConflictPolicy::LastWins => {
                        slots[first] = None;
                    }
                }
            }

            slots[position] = Some(event_id);
            anchored_at.insert(event_id, position);
        }

        Ok(slots)
    }
}

/// Resolve with the default policy.
pub fn resolve_ordering(
    baseline: &[String],
    preferred: &[String],
    hints: &[Hint],
) -> Result<Vec<String>, ResolveError> {
    OrderingResolver::default().resolve(baseline, preferred, hints)
}

/// Deduplicate, keeping first occurrences, optionally dropping unknown IDs.
fn unique_in_order<'a>(
    ids: impl Iterator<Item = &'a str>,
    known: Option<&HashSet<&str>>,
) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    ids.filter(|id| known.map_or(true, |k| k.contains(id)))
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Turn the preferred ordering into a full permutation of `ids`.
fn sanitize<'a>(ids: &[&'a str], known: &HashSet<&str>, preferred: &'a [String]) -> Vec<&'a str> {
    if preferred.is_empty() {
        return ids.to_vec();
    }

    let mut candidate = unique_in_order(preferred.iter().map(String::as_str), Some(known));
    let present: HashSet<&str> = candidate.iter().copied().collect();
    candidate.extend(ids.iter().copied().filter(|id| !present.contains(id)));
    candidate
}

/// Stable topological reorder of `free` honoring relative hints between free
/// events. Among unconstrained events the current order is kept.
///
/// Hints are taken in array order; one that would close a cycle with the hints
/// already kept is dropped, so every event stays near its candidate slot.
fn enforce_relative<'a>(free: Vec<&'a str>, hints: &[Hint]) -> Vec<&'a str> {
    let index: HashMap<&str, usize> = free.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); free.len()];
    let mut indegree = vec![0usize; free.len()];
    let mut edges: HashSet<(usize, usize)> = HashSet::new();

    for hint in hints {
        let Hint::Relative {
            earlier_event_id,
            later_event_id,
        } = hint
        else {
            continue;
        };
        let earlier = index.get(earlier_event_id.as_str());
        let later = index.get(later_event_id.as_str());
        let (Some(&e), Some(&l)) = (earlier, later) else {
            continue;
        };
        if e == l || edges.contains(&(e, l)) {
            continue;
        }
        if reaches(&successors, l, e) {
            tracing::warn!(
                earlier = earlier_event_id.as_str(),
                later = later_event_id.as_str(),
                "dropping relative hint that contradicts earlier hints"
            );
            continue;
        }
        edges.insert((e, l));
        successors[e].push(l);
        indegree[l] += 1;
    }

    if edges.is_empty() {
        return free;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = indegree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut ordered = Vec::with_capacity(free.len());
    while let Some(Reverse(i)) = ready.pop() {
        ordered.push(free[i]);
        for &next in &successors[i] {
            indegree[next] -= 1;
            if indegree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    ordered
}

/// Check if `to` is reachable from `from`.
fn reaches(successors: &[Vec<usize>], from: usize, to: usize) -> bool {
    let mut visited = vec![false; successors.len()];
    let mut stack = vec![from];
    while let Some(node) = stack.pop() {
        if node == to {
            return true;
        }
        if std::mem::replace(&mut visited[node], true) {
            continue;
        }
        stack.extend(successors[node].iter().copied());
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn is_permutation(output: &[String], baseline: &[String]) -> bool {
        let mut a = output.to_vec();
        let mut b = baseline.to_vec();
        a.sort();
        b.sort();
        a == b
    }

    fn enforcing() -> OrderingResolver {
        OrderingResolver::new(ResolverPolicy::new().with_relative(RelativePolicy::Enforce))
    }

    fn last_wins() -> OrderingResolver {
        OrderingResolver::new(
            ResolverPolicy::new().with_anchor_conflict(AnchorConflictPolicy::LastWins),
        )
    }

    #[test]
    fn test_policy_accessor() {
        assert_eq!(*OrderingResolver::default().policy(), ResolverPolicy::default());
        assert_eq!(enforcing().policy().relative, RelativePolicy::Enforce);
        assert_eq!(
            last_wins().policy().anchor_conflict,
            AnchorConflictPolicy::LastWins
        );
    }

    #[test]
    fn test_anchor_moves_event() {
        let baseline = ids(&["a", "b", "c"]);
        let preferred = ids(&["b", "a", "c"]);
        let hints = vec![Hint::anchor("b", 2)];

        let order = resolve_ordering(&baseline, &preferred, &hints).unwrap();
        assert_eq!(order, ids(&["a", "c", "b"]));
    }

    #[test]
    fn test_empty_preferred_uses_baseline() {
        let baseline = ids(&["a", "b", "c"]);
        let order = resolve_ordering(&baseline, &[], &[]).unwrap();
        assert_eq!(order, baseline);
    }

    #[test]
    fn test_empty_baseline() {
        let order = resolve_ordering(&[], &ids(&["a"]), &[Hint::anchor("a", 0)]).unwrap();
        assert!(order.is_empty());
    }

    #[test]
    fn test_sanitize_preferred() {
        let baseline = ids(&["a", "b", "c", "d"]);
        // Truncated, duplicated, with a foreign identifier
        let preferred = ids(&["c", "x", "c", "a"]);

        let order = resolve_ordering(&baseline, &preferred, &[]).unwrap();
        assert_eq!(order, ids(&["c", "a", "b", "d"]));
    }

    #[test]
    fn test_multiple_anchors() {
        let baseline = ids(&["a", "b", "c", "d", "e"]);
        let hints = vec![Hint::anchor("e", 0), Hint::anchor("a", 4)];

        let order = resolve_ordering(&baseline, &baseline, &hints).unwrap();
        assert_eq!(order, ids(&["e", "b", "c", "d", "a"]));
    }

    #[test]
    fn test_malformed_anchors_are_ignored() {
        let baseline = ids(&["a", "b", "c"]);
        let hints = vec![Hint::anchor("zz", 0), Hint::anchor("a", 3)];

        let order = resolve_ordering(&baseline, &ids(&["c", "b", "a"]), &hints).unwrap();
        assert_eq!(order, ids(&["c", "b", "a"]));
    }

    #[test]
    fn test_duplicate_anchor_is_not_a_conflict() {
        let baseline = ids(&["a", "b", "c"]);
        let hints = vec![Hint::anchor("a", 1), Hint::anchor("a", 1)];

        let order = resolve_ordering(&baseline, &baseline, &hints).unwrap();
        assert_eq!(order, ids(&["b", "a", "c"]));
    }

    #[test]
    fn test_position_conflict_rejected() {
        let baseline = ids(&["a", "b", "c"]);
        let hints = vec![Hint::anchor("a", 1), Hint::anchor("b", 1)];

        let err = resolve_ordering(&baseline, &baseline, &hints).unwrap_err();
        assert_eq!(
            err,
            ResolveError::AnchorPositionConflict {
                position: 1,
                existing: "a".to_string(),
                incoming: "b".to_string(),
            }
        );
    }

    #[test]
    fn test_event_conflict_rejected() {
        let baseline = ids(&["a", "b", "c"]);
        let hints = vec![Hint::anchor("a", 0), Hint::anchor("a", 2)];

        let err = resolve_ordering(&baseline, &baseline, &hints).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::AnchorEventConflict { first: 0, second: 2, .. }
        ));
    }

    #[test]
    fn test_position_conflict_last_wins() {
        let baseline = ids(&["a", "b", "c"]);
        let hints = vec![Hint::anchor("a", 1), Hint::anchor("c", 1)];

        let order = last_wins().resolve(&baseline, &baseline, &hints).unwrap();
        assert_eq!(order, ids(&["a", "c", "b"]));
    }

    #[test]
    fn test_event_conflict_last_wins() {
        let baseline = ids(&["a", "b", "c"]);
        let hints = vec![Hint::anchor("a", 0), Hint::anchor("a", 2)];

        let order = last_wins().resolve(&baseline, &baseline, &hints).unwrap();
        assert_eq!(order, ids(&["b", "c", "a"]));
    }

    #[test]
    fn test_relative_is_advisory_by_default() {
        let baseline = ids(&["a", "b", "c"]);
        let preferred = ids(&["c", "b", "a"]);
        let hints = vec![Hint::relative("a", "c"), Hint::bracket("b", 0, 10)];

        let order = resolve_ordering(&baseline, &preferred, &hints).unwrap();
        assert_eq!(order, preferred);
    }

    #[test]
    fn test_relative_enforced() {
        let baseline = ids(&["a", "b", "c", "d"]);
        let preferred = ids(&["d", "c", "b", "a"]);
        let hints = vec![Hint::relative("a", "c")];

        let order = enforcing().resolve(&baseline, &preferred, &hints).unwrap();
        assert_eq!(order, ids(&["d", "b", "a", "c"]));
    }

    #[test]
    fn test_relative_enforced_keeps_satisfied_order() {
        let baseline = ids(&["a", "b", "c"]);
        let hints = vec![Hint::relative("a", "c"), Hint::relative("b", "c")];

        let order = enforcing().resolve(&baseline, &baseline, &hints).unwrap();
        assert_eq!(order, baseline);
    }

    #[test]
    fn test_relative_touching_anchor_is_left_to_anchor() {
        let baseline = ids(&["a", "b", "c"]);
        let hints = vec![Hint::anchor("a", 2), Hint::relative("a", "b")];

        let order = enforcing().resolve(&baseline, &baseline, &hints).unwrap();
        assert_eq!(order, ids(&["b", "c", "a"]));
    }

    #[test]
    fn test_relative_cycle_drops_later_hint() {
        let baseline = ids(&["a", "b", "c", "d"]);
        let preferred = ids(&["d", "b", "a", "c"]);
        let hints = vec![Hint::relative("a", "b"), Hint::relative("b", "a")];

        let order = enforcing().resolve(&baseline, &preferred, &hints).unwrap();
        // c stays behind the contradicting pair
        assert_eq!(order, ids(&["d", "a", "b", "c"]));
    }

    #[test]
    fn test_relative_long_cycle_keeps_trailing_events_last() {
        let baseline = ids(&["a", "b", "c", "d", "e"]);
        let hints = vec![
            Hint::relative("c", "a"),
            Hint::relative("a", "b"),
            Hint::relative("b", "c"),
        ];

        let order = enforcing().resolve(&baseline, &baseline, &hints).unwrap();
        assert_eq!(order, ids(&["c", "a", "b", "d", "e"]));
    }

    #[test]
    fn test_bracket_never_moves_events() {
        let baseline = ids(&["a", "b", "c"]);
        let preferred = ids(&["b", "c", "a"]);
        let hints = vec![Hint::bracket("a", 1000, 1100)];

        let order = enforcing().resolve(&baseline, &preferred, &hints).unwrap();
        assert_eq!(order, preferred);
    }

    fn puzzle_ids() -> impl Strategy<Value = Vec<String>> {
        (1usize..8).prop_map(|n| (0..n).map(|i| format!("e{}", i)).collect())
    }

    fn resolution_case() -> impl Strategy<Value = (Vec<String>, Vec<String>, Vec<Hint>)> {
        puzzle_ids().prop_flat_map(|baseline| {
            let n = baseline.len();
            let pool: Vec<String> = baseline
                .iter()
                .cloned()
                .chain(["x".to_string(), "y".to_string()])
                .collect();
            let preferred = proptest::collection::vec(proptest::sample::select(pool), 0..n + 3);
            let target = Just(baseline.clone()).prop_shuffle();
            (Just(baseline), preferred, target, 0..=n)
        })
        .prop_map(|(baseline, preferred, target, k)| {
            // Anchors drawn from one permutation never conflict
            let hints: Vec<Hint> = target
                .iter()
                .enumerate()
                .take(k)
                .map(|(pos, id)| Hint::anchor(id.clone(), pos))
                .collect();
            (baseline, preferred, hints)
        })
    }

    proptest! {
        #[test]
        fn output_is_permutation((baseline, preferred, hints) in resolution_case()) {
            for resolver in [OrderingResolver::default(), enforcing()] {
                let order = resolver.resolve(&baseline, &preferred, &hints).unwrap();
                prop_assert!(is_permutation(&order, &baseline));
            }
        }

        #[test]
        fn anchors_are_enforced((baseline, preferred, hints) in resolution_case()) {
            let order = resolve_ordering(&baseline, &preferred, &hints).unwrap();
            for hint in &hints {
                if let Hint::Anchor { event_id, position } = hint {
                    prop_assert_eq!(&order[*position], event_id);
                }
            }
        }

        #[test]
        fn enforced_relative_is_permutation(
            baseline in puzzle_ids(),
            raw in proptest::collection::vec((0usize..8, 0usize..8), 0..12),
        ) {
            let hints: Vec<Hint> = raw
                .into_iter()
                .map(|(e, l)| Hint::relative(format!("e{}", e), format!("e{}", l)))
                .collect();
            let order = enforcing().resolve(&baseline, &[], &hints).unwrap();
            prop_assert!(is_permutation(&order, &baseline));
        }

        #[test]
        fn last_wins_is_total(
            baseline in puzzle_ids(),
            raw in proptest::collection::vec((0usize..8, 0usize..8), 0..10),
        ) {
            let hints: Vec<Hint> = raw
                .into_iter()
                .map(|(e, pos)| Hint::anchor(format!("e{}", e), pos))
                .collect();
            let order = last_wins().resolve(&baseline, &[], &hints).unwrap();
            prop_assert!(is_permutation(&order, &baseline));
        }
    }
}
