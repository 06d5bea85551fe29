//! Drag-and-drop reordering with optimistic updates.
//!
//! A move is applied to the visible sequence at once, the whole new order is
//! persisted afterwards, and a failed write puts back the exact sequence that
//! was on screen before the move.

/// Where a dragged element lands relative to the element under the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

/// Cursor above the target's vertical midpoint drops before it, otherwise after.
pub fn placement_for(cursor_y: f64, target_top: f64, target_height: f64) -> Placement {
    if cursor_y < target_top + target_height / 2.0 {
        Placement::Before
    } else {
        Placement::After
    }
}

/// Final index of the dragged element for a drop on `target`.
///
/// The insertion point is computed against the original sequence and then
/// shifted down by one when the source sat in front of it, since the source
/// is removed before it is inserted.
pub fn drop_index(source: usize, target: usize, placement: Placement) -> usize {
    let insert_at = match placement {
        Placement::Before => target,
        Placement::After => target + 1,
    };
    if source < insert_at {
        insert_at - 1
    } else {
        insert_at
    }
}

/// Moves the element at `from` so it ends up at `to`; remove then insert.
///
/// Returns `false` and leaves `items` untouched when the move is a no-op or
/// either index is out of range.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// A change applied ahead of backend confirmation.
///
/// Holds a copy of the state as it was before the change; settling with a
/// failed outcome writes that copy back.
#[derive(Debug)]
pub struct Optimistic<T: Clone> {
    snapshot: T,
}

impl<T: Clone> Optimistic<T> {
    pub fn apply(state: &mut T, change: impl FnOnce(&mut T)) -> Self {
        let snapshot = state.clone();
        change(state);
        Optimistic { snapshot }
    }

    pub fn snapshot(&self) -> &T {
        &self.snapshot
    }

    /// Keeps the change on success, restores the snapshot on failure.
    pub fn settle<E>(self, state: &mut T, outcome: Result<(), E>) -> Result<(), E> {
        if outcome.is_err() {
            *state = self.snapshot;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(len: usize) -> Vec<usize> {
        (0..len).collect()
    }

    #[test]
    fn test_move_is_insertion_not_swap() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        assert!(move_item(&mut items, 0, 2));
        assert_eq!(items, vec!['b', 'c', 'a', 'd']);

        let mut items = vec!['a', 'b', 'c', 'd'];
        assert!(move_item(&mut items, 3, 1));
        assert_eq!(items, vec!['a', 'd', 'b', 'c']);
    }

    #[test]
    fn test_move_to_same_position_is_noop() {
        let mut items = vec![1, 2, 3];
        assert!(!move_item(&mut items, 1, 1));
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut items = vec![1, 2, 3];
        assert!(!move_item(&mut items, 3, 0));
        assert!(!move_item(&mut items, 0, 3));
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn test_every_move_keeps_relative_order() {
        for len in 1..=7 {
            for from in 0..len {
                for to in 0..len {
                    let mut items = seq(len);
                    move_item(&mut items, from, to);

                    assert_eq!(items[to], from);
                    let mut sorted = items.clone();
                    sorted.sort_unstable();
                    assert_eq!(sorted, seq(len));

                    let rest: Vec<usize> = items.iter().copied().filter(|&x| x != from).collect();
                    let expected: Vec<usize> = seq(len).into_iter().filter(|&x| x != from).collect();
                    assert_eq!(rest, expected, "len={len} from={from} to={to}");
                }
            }
        }
    }

    #[test]
    fn test_placement_uses_midpoint() {
        assert_eq!(placement_for(10.0, 10.0, 2.0), Placement::Before);
        assert_eq!(placement_for(10.9, 10.0, 2.0), Placement::Before);
        assert_eq!(placement_for(11.0, 10.0, 2.0), Placement::After);
        assert_eq!(placement_for(11.5, 10.0, 2.0), Placement::After);
    }

    #[test]
    fn test_drop_index_accounts_for_removal() {
        // dragging downwards
        assert_eq!(drop_index(0, 2, Placement::Before), 1);
        assert_eq!(drop_index(0, 2, Placement::After), 2);
        // dragging upwards
        assert_eq!(drop_index(3, 1, Placement::Before), 1);
        assert_eq!(drop_index(3, 1, Placement::After), 2);
        // onto itself
        assert_eq!(drop_index(2, 2, Placement::Before), 2);
        assert_eq!(drop_index(2, 2, Placement::After), 2);
        // just after the previous neighbour is where it already is
        assert_eq!(drop_index(2, 1, Placement::After), 2);
    }

    #[test]
    fn test_drop_lands_next_to_target() {
        let items = vec!['a', 'b', 'c', 'd', 'e'];
        for source in 0..items.len() {
            for target in 0..items.len() {
                if source == target {
                    continue;
                }
                for placement in [Placement::Before, Placement::After] {
                    let mut moved = items.clone();
                    move_item(&mut moved, source, drop_index(source, target, placement));
                    let s = moved.iter().position(|&c| c == items[source]).unwrap();
                    let t = moved.iter().position(|&c| c == items[target]).unwrap();
                    match placement {
                        Placement::Before => assert_eq!(s + 1, t),
                        Placement::After => assert_eq!(t + 1, s),
                    }
                }
            }
        }
    }

    #[test]
    fn test_settle_failure_restores_snapshot() {
        for len in 2..=6 {
            let mut items = seq(len);
            let before = items.clone();
            let pending = Optimistic::apply(&mut items, |v| {
                move_item(v, 0, len - 1);
            });
            assert_ne!(items, before);
            assert_eq!(pending.snapshot(), &before);

            let result = pending.settle(&mut items, Err("offline"));
            assert_eq!(result, Err("offline"));
            assert_eq!(items, before);
        }
    }

    #[test]
    fn test_settle_success_keeps_change() {
        let mut items = vec![1, 2, 3];
        let pending = Optimistic::apply(&mut items, |v| {
            move_item(v, 2, 0);
        });
        assert_eq!(pending.settle::<()>(&mut items, Ok(())), Ok(()));
        assert_eq!(items, vec![3, 1, 2]);
    }
}
