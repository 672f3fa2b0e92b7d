//! Dense `position_order` maintenance for ordered sibling lists.
//!
//! Course sections (siblings under a course) and course classes (siblings
//! under a section) share one invariant: the active items of a parent hold
//! exactly the positions `0..n`. The planners here take a snapshot of the
//! active siblings and return the [`Reposition`]s needed to keep that
//! invariant across insert, remove and move. Callers persist the plan inside
//! the same transaction that took the snapshot.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Position};

/// An active item as seen by the planners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sibling {
    pub id: DbId,
    pub position: Position,
}

/// One row whose position must change from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reposition {
    pub id: DbId,
    pub from: Position,
    pub to: Position,
}

/// Outcome of inspecting a parent's active siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DensityReport {
    pub active_count: usize,
    pub is_dense: bool,
    /// Positions held by more than one active sibling.
    pub duplicates: Vec<Position>,
    /// Positions in `0..active_count` nobody holds.
    pub gaps: Vec<Position>,
    /// Positions outside `0..active_count`.
    pub out_of_range: Vec<Position>,
}

fn count_as_position(count: usize) -> Position {
    Position::try_from(count).unwrap_or(Position::MAX)
}

/// Position a newly appended item takes: the current active count.
pub fn append_position(active_count: usize) -> Position {
    count_as_position(active_count)
}

/// Check an explicit insert target against `0..=active_count`.
pub fn validate_insert_position(target: Position, active_count: usize) -> Result<(), CoreError> {
    let max = count_as_position(active_count);
    if target < 0 || target > max {
        return Err(CoreError::Validation(format!(
            "position must be between 0 and {max}"
        )));
    }
    Ok(())
}

/// Check a move target against `0..active_count`.
pub fn validate_move_target(target: Position, active_count: usize) -> Result<(), CoreError> {
    if active_count == 0 {
        return Err(CoreError::Validation(
            "position cannot be changed: the parent has no active items".into(),
        ));
    }
    let max = count_as_position(active_count) - 1;
    if target < 0 || target > max {
        return Err(CoreError::Validation(format!(
            "position must be between 0 and {max}"
        )));
    }
    Ok(())
}

/// Inspect the snapshot for duplicates, gaps and out-of-range positions.
pub fn density_report(siblings: &[Sibling]) -> DensityReport {
    let active_count = siblings.len();
    let upper = count_as_position(active_count);

    let mut holders: BTreeMap<Position, usize> = BTreeMap::new();
    for s in siblings {
        *holders.entry(s.position).or_default() += 1;
    }

    let duplicates: Vec<Position> = holders
        .iter()
        .filter(|(_, n)| **n > 1)
        .map(|(p, _)| *p)
        .collect();
    let gaps: Vec<Position> = (0..upper).filter(|p| !holders.contains_key(p)).collect();
    let out_of_range: Vec<Position> = holders
        .keys()
        .copied()
        .filter(|p| *p < 0 || *p >= upper)
        .collect();

    DensityReport {
        active_count,
        is_dense: duplicates.is_empty() && gaps.is_empty() && out_of_range.is_empty(),
        duplicates,
        gaps,
        out_of_range,
    }
}

/// Fail with [`CoreError::Integrity`] unless positions are exactly `0..n`.
pub fn check_dense(siblings: &[Sibling]) -> Result<(), CoreError> {
    let report = density_report(siblings);
    if report.is_dense {
        return Ok(());
    }
    Err(CoreError::Integrity(format!(
        "positions are not dense among {} active siblings \
         (duplicates: {:?}, gaps: {:?}, out of range: {:?})",
        report.active_count, report.duplicates, report.gaps, report.out_of_range
    )))
}

/// Fail with [`CoreError::Integrity`] if two siblings share a position.
///
/// Gaps are tolerated here; they are what [`plan_compact`] repairs.
pub fn check_no_duplicates(siblings: &[Sibling]) -> Result<(), CoreError> {
    let report = density_report(siblings);
    if report.duplicates.is_empty() {
        return Ok(());
    }
    Err(CoreError::Integrity(format!(
        "duplicate positions {:?} among {} active siblings",
        report.duplicates, report.active_count
    )))
}

/// Open a slot at `target` by shifting every sibling at or after it up by one.
///
/// The new item is then stored at `target` by the caller.
pub fn plan_insert(siblings: &[Sibling], target: Position) -> Result<Vec<Reposition>, CoreError> {
    check_dense(siblings)?;
    validate_insert_position(target, siblings.len())?;

    Ok(siblings
        .iter()
        .filter(|s| s.position >= target)
        .map(|s| Reposition {
            id: s.id,
            from: s.position,
            to: s.position + 1,
        })
        .collect())
}

/// Renumber the remaining active siblings to `0..n`, keeping their order.
///
/// Run after the removed item has been deactivated, so it is no longer part
/// of `siblings`. Ties are impossible once duplicates are rejected, so the
/// result depends only on current positions. On an already dense snapshot
/// the plan is empty.
pub fn plan_compact(siblings: &[Sibling]) -> Result<Vec<Reposition>, CoreError> {
    check_no_duplicates(siblings)?;

    let mut ordered: Vec<Sibling> = siblings.to_vec();
    ordered.sort_by_key(|s| s.position);

    Ok(ordered
        .iter()
        .enumerate()
        .filter_map(|(index, s)| {
            let to = count_as_position(index);
            (s.position != to).then_some(Reposition {
                id: s.id,
                from: s.position,
                to,
            })
        })
        .collect())
}

/// Move sibling `id` to `new_position`, shifting the items in between by one.
///
/// Moving later pulls `(current, new]` down; moving earlier pushes
/// `[new, current)` up. Moving to the current position is a no-op.
pub fn plan_move(
    siblings: &[Sibling],
    id: DbId,
    new_position: Position,
) -> Result<Vec<Reposition>, CoreError> {
    check_dense(siblings)?;
    validate_move_target(new_position, siblings.len())?;

    let current = siblings
        .iter()
        .find(|s| s.id == id)
        .map(|s| s.position)
        .ok_or_else(|| {
            CoreError::Internal(format!("item {id} is not among the active siblings"))
        })?;

    if new_position == current {
        return Ok(Vec::new());
    }

    let mut plan: Vec<Reposition> = siblings
        .iter()
        .filter(|s| s.id != id)
        .filter_map(|s| {
            let to = if new_position > current && s.position > current && s.position <= new_position
            {
                s.position - 1
            } else if new_position < current
                && s.position >= new_position
                && s.position < current
            {
                s.position + 1
            } else {
                return None;
            };
            Some(Reposition {
                id: s.id,
                from: s.position,
                to,
            })
        })
        .collect();

    plan.push(Reposition {
        id,
        from: current,
        to: new_position,
    });
    Ok(plan)
}

/// Apply a plan to an in-memory snapshot.
pub fn apply(siblings: &mut [Sibling], plan: &[Reposition]) {
    for step in plan {
        if let Some(s) = siblings.iter_mut().find(|s| s.id == step.id) {
            s.position = step.to;
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn dense(n: usize) -> Vec<Sibling> {
        (0..n)
            .map(|i| Sibling {
                id: (i as DbId) + 100,
                position: i as Position,
            })
            .collect()
    }

    /// Ids in position order.
    fn order(siblings: &[Sibling]) -> Vec<DbId> {
        let mut sorted = siblings.to_vec();
        sorted.sort_by_key(|s| s.position);
        sorted.iter().map(|s| s.id).collect()
    }

    fn position_of(siblings: &[Sibling], id: DbId) -> Position {
        siblings.iter().find(|s| s.id == id).unwrap().position
    }

    // -- append / insert -----------------------------------------------------

    #[test]
    fn append_on_empty_parent_is_zero() {
        assert_eq!(append_position(0), 0);
        assert_eq!(append_position(3), 3);
    }

    #[test]
    fn insert_in_the_middle_shifts_tail() {
        let mut items = dense(3);
        let plan = plan_insert(&items, 1).unwrap();
        assert_eq!(plan.len(), 2);
        apply(&mut items, &plan);
        items.push(Sibling { id: 1, position: 1 });
        assert_eq!(order(&items), vec![100, 1, 101, 102]);
        check_dense(&items).unwrap();
    }

    #[test]
    fn insert_at_count_shifts_nothing() {
        assert!(plan_insert(&dense(3), 3).unwrap().is_empty());
    }

    #[test]
    fn insert_beyond_count_is_rejected() {
        let err = plan_insert(&dense(3), 4).unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg == "position must be between 0 and 3");
        assert_matches!(plan_insert(&dense(3), -1), Err(CoreError::Validation(_)));
    }

    // -- compact -------------------------------------------------------------

    #[test]
    fn removing_middle_item_compacts_tail() {
        // Scenario A: [0,1,2], remove position 1.
        let items = dense(3);
        let mut remaining: Vec<Sibling> = items.into_iter().filter(|s| s.position != 1).collect();
        let plan = plan_compact(&remaining).unwrap();
        assert_eq!(
            plan,
            vec![Reposition {
                id: 102,
                from: 2,
                to: 1
            }]
        );
        apply(&mut remaining, &plan);
        assert_eq!(position_of(&remaining, 100), 0);
        assert_eq!(position_of(&remaining, 102), 1);
    }

    #[test]
    fn compact_is_idempotent_on_dense_sequence() {
        assert!(plan_compact(&dense(5)).unwrap().is_empty());
    }

    #[test]
    fn compact_heals_arbitrary_gaps() {
        let mut items = vec![
            Sibling { id: 1, position: 4 },
            Sibling { id: 2, position: 0 },
            Sibling { id: 3, position: 9 },
        ];
        let plan = plan_compact(&items).unwrap();
        apply(&mut items, &plan);
        assert_eq!(order(&items), vec![2, 1, 3]);
        check_dense(&items).unwrap();
        assert!(plan_compact(&items).unwrap().is_empty());
    }

    #[test]
    fn compact_refuses_duplicates() {
        let items = vec![
            Sibling { id: 1, position: 0 },
            Sibling { id: 2, position: 0 },
        ];
        assert_matches!(plan_compact(&items), Err(CoreError::Integrity(_)));
    }

    // -- move ----------------------------------------------------------------

    #[test]
    fn move_last_to_first() {
        // Scenario C: [0,1,2,3], move 3 -> 0.
        let mut items = dense(4);
        let plan = plan_move(&items, 103, 0).unwrap();
        apply(&mut items, &plan);
        assert_eq!(order(&items), vec![103, 100, 101, 102]);
        assert_eq!(position_of(&items, 100), 1);
        assert_eq!(position_of(&items, 101), 2);
        assert_eq!(position_of(&items, 102), 3);
        check_dense(&items).unwrap();
    }

    #[test]
    fn move_first_to_last() {
        let mut items = dense(4);
        let plan = plan_move(&items, 100, 3).unwrap();
        apply(&mut items, &plan);
        assert_eq!(order(&items), vec![101, 102, 103, 100]);
    }

    #[test]
    fn move_touches_only_the_span() {
        let items = dense(6);
        let plan = plan_move(&items, 101, 3).unwrap();
        let touched: Vec<DbId> = plan.iter().map(|r| r.id).collect();
        assert_eq!(touched, vec![102, 103, 101]);
    }

    #[test]
    fn move_to_same_position_is_noop() {
        assert!(plan_move(&dense(3), 101, 1).unwrap().is_empty());
    }

    #[test]
    fn move_to_count_is_rejected() {
        // Scenario D: target == count is out of range.
        let items = dense(4);
        let err = plan_move(&items, 100, 4).unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg == "position must be between 0 and 3");
        assert_matches!(plan_move(&items, 100, -1), Err(CoreError::Validation(_)));
    }

    #[test]
    fn move_refuses_duplicate_positions() {
        let items = vec![
            Sibling { id: 1, position: 0 },
            Sibling { id: 2, position: 1 },
            Sibling { id: 3, position: 1 },
        ];
        assert_matches!(plan_move(&items, 1, 2), Err(CoreError::Integrity(_)));
    }

    #[test]
    fn move_of_unknown_item_is_internal() {
        assert_matches!(plan_move(&dense(2), 999, 0), Err(CoreError::Internal(_)));
    }

    #[test]
    fn move_round_trip_restores_order() {
        for n in 1..7usize {
            for i in 0..n {
                for j in 0..n {
                    let mut items = dense(n);
                    let original = order(&items);
                    let id = items[i].id;

                    let there = plan_move(&items, id, j as Position).unwrap();
                    apply(&mut items, &there);
                    let back = plan_move(&items, id, i as Position).unwrap();
                    apply(&mut items, &back);

                    assert_eq!(order(&items), original, "n={n} i={i} j={j}");
                    check_dense(&items).unwrap();
                }
            }
        }
    }

    // -- density -------------------------------------------------------------

    #[test]
    fn density_report_lists_problems() {
        let items = vec![
            Sibling { id: 1, position: 0 },
            Sibling { id: 2, position: 0 },
            Sibling { id: 3, position: 5 },
        ];
        let report = density_report(&items);
        assert!(!report.is_dense);
        assert_eq!(report.duplicates, vec![0]);
        assert_eq!(report.gaps, vec![1, 2]);
        assert_eq!(report.out_of_range, vec![5]);
    }

    #[test]
    fn empty_parent_is_dense() {
        assert!(density_report(&[]).is_dense);
        assert_matches!(validate_move_target(0, 0), Err(CoreError::Validation(_)));
    }

    /// Drive a long deterministic sequence of inserts, removals and moves and
    /// check the dense invariant after every step.
    #[test]
    fn random_operation_sequence_stays_dense() {
        let mut rng = StdRng::seed_from_u64(0x5eed_cafe);
        let mut next = |bound: usize| -> usize { rng.random_range(0..bound.max(1)) };

        let mut items: Vec<Sibling> = Vec::new();
        let mut next_id: DbId = 1;

        for _ in 0..2_000 {
            match next(4) {
                0 => {
                    let pos = append_position(items.len());
                    items.push(Sibling { id: next_id, position: pos });
                    next_id += 1;
                }
                1 => {
                    let target = next(items.len() + 1) as Position;
                    let plan = plan_insert(&items, target).unwrap();
                    apply(&mut items, &plan);
                    items.push(Sibling { id: next_id, position: target });
                    next_id += 1;
                }
                2 if !items.is_empty() => {
                    let victim = next(items.len());
                    items.remove(victim);
                    let plan = plan_compact(&items).unwrap();
                    apply(&mut items, &plan);
                }
                3 if !items.is_empty() => {
                    let id = items[next(items.len())].id;
                    let target = next(items.len()) as Position;
                    let plan = plan_move(&items, id, target).unwrap();
                    apply(&mut items, &plan);
                    assert_eq!(position_of(&items, id), target);
                }
                _ => {}
            }
            check_dense(&items).unwrap();
        }
    }
}
