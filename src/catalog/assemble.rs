//! Index-then-augment grouping of child records under their owners
//!
//! Child rows reference their owner only through an oid found via a
//! dependency join. Grouping builds one map from owner oid to children in a
//! single pass, then each parent takes its group by lookup, so assembly is
//! O(parents + children) and never reorders either side.

use crate::row::Oid;
use std::collections::HashMap;

/// Group `items` by owner oid, keeping the input order within each group
pub fn group_by_owner<T, F>(items: Vec<T>, owner: F) -> HashMap<Oid, Vec<T>>
where
    F: Fn(&T) -> Oid,
{
    let mut groups: HashMap<Oid, Vec<T>> = HashMap::new();
    for item in items {
        groups.entry(owner(&item)).or_default().push(item);
    }
    groups
}

/// Move each parent's group into the slot returned by `members`
///
/// Parents without a group get an empty list. Returns the number of children
/// whose owner is not among `parents`; those are dropped.
pub fn attach_members<P, C, K, M>(
    parents: &mut [P],
    mut groups: HashMap<Oid, Vec<C>>,
    parent_oid: K,
    mut members: M,
) -> usize
where
    K: Fn(&P) -> Oid,
    M: FnMut(&mut P) -> &mut Vec<C>,
{
    for parent in parents.iter_mut() {
        let group = groups.remove(&parent_oid(parent)).unwrap_or_default();
        *members(parent) = group;
    }
    groups.values().map(Vec::len).sum()
}
