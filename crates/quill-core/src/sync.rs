//! Post/category association reconciliation.
//!
//! Given the categories a post currently has and the set it should end up
//! with, [`CategorySync::plan`] computes the minimal set of join rows to delete
//! and insert. Repositories apply both sides inside one transaction, so the
//! join table always ends up holding exactly the target set.

use std::collections::HashSet;

use crate::domain::CategoryId;
use crate::error::DomainError;

/// Changes needed to move a post's category set from its current to its target state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySync {
    /// Join rows to create, in target order.
    pub to_insert: Vec<CategoryId>,
    /// Join rows to delete, in current order.
    pub to_remove: Vec<CategoryId>,
    /// Join rows left untouched.
    pub retained: Vec<CategoryId>,
}

impl CategorySync {
    /// Compute the diff between `current` and `target`.
    ///
    /// An empty `target` is valid and removes every association. A `target`
    /// that repeats an id is a conflict.
    pub fn plan(current: &[CategoryId], target: &[CategoryId]) -> Result<Self, DomainError> {
        ensure_unique(target)?;

        let current_set: HashSet<CategoryId> = current.iter().copied().collect();
        let target_set: HashSet<CategoryId> = target.iter().copied().collect();

        let to_insert = target
            .iter()
            .copied()
            .filter(|id| !current_set.contains(id))
            .collect();
        let to_remove = current
            .iter()
            .copied()
            .filter(|id| !target_set.contains(id))
            .collect();
        let retained = target
            .iter()
            .copied()
            .filter(|id| current_set.contains(id))
            .collect();

        Ok(Self {
            to_insert,
            to_remove,
            retained,
        })
    }

    /// True when the post already has exactly the target categories.
    pub fn is_noop(&self) -> bool {
        self.to_insert.is_empty() && self.to_remove.is_empty()
    }
}

/// Fail with [`DomainError::Duplicate`] on the first repeated id.
pub fn ensure_unique(ids: &[CategoryId]) -> Result<(), DomainError> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(*id) {
            return Err(DomainError::Duplicate(format!(
                "category {id} is listed more than once"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_replaces_a_with_c_and_keeps_b() {
        let plan = CategorySync::plan(&[1, 2], &[2, 3]).unwrap();

        assert_eq!(plan.to_remove, vec![1]);
        assert_eq!(plan.to_insert, vec![3]);
        assert_eq!(plan.retained, vec![2]);
        assert!(!plan.is_noop());
    }

    #[test]
    fn test_plan_to_empty_removes_everything() {
        let plan = CategorySync::plan(&[5, 7, 9], &[]).unwrap();

        assert_eq!(plan.to_remove, vec![5, 7, 9]);
        assert!(plan.to_insert.is_empty());
        assert!(plan.retained.is_empty());
    }

    #[test]
    fn test_plan_from_empty_inserts_in_target_order() {
        let plan = CategorySync::plan(&[], &[8, 3, 6]).unwrap();

        assert_eq!(plan.to_insert, vec![8, 3, 6]);
        assert!(plan.to_remove.is_empty());
    }

    #[test]
    fn test_plan_same_set_is_noop_regardless_of_order() {
        let plan = CategorySync::plan(&[1, 2, 3], &[3, 1, 2]).unwrap();

        assert!(plan.is_noop());
        assert_eq!(plan.retained.len(), 3);
    }

    #[test]
    fn test_plan_rejects_duplicate_target_ids() {
        let result = CategorySync::plan(&[1], &[2, 2]);

        assert!(matches!(result, Err(DomainError::Duplicate(_))));
    }

    #[test]
    fn test_applying_plan_yields_target_set() {
        let cases: &[(&[CategoryId], &[CategoryId])] = &[
            (&[], &[]),
            (&[1, 2, 3], &[4]),
            (&[1, 2], &[1, 2, 3]),
            (&[10, 20, 30], &[30, 10]),
        ];

        for (current, target) in cases {
            let plan = CategorySync::plan(current, target).unwrap();

            let mut result: HashSet<CategoryId> = current.iter().copied().collect();
            for id in &plan.to_remove {
                result.remove(id);
            }
            for id in &plan.to_insert {
                assert!(result.insert(*id), "inserted {id} twice");
            }

            let expected: HashSet<CategoryId> = target.iter().copied().collect();
            assert_eq!(result, expected);
        }
    }
}
