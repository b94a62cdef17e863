use std::collections::HashSet;

use crate::{HealthSnapshot, Instance};

/// Healthy instances first in ranked order, then every other configured
/// instance in configured order.
///
/// Ranked entries missing from `full_list` are skipped, so the result is always
/// a permutation of `full_list`. That can happen when the cache answered with a
/// ranking built from a different list.
pub fn fallback_order(full_list: &[Instance], snapshot: &HealthSnapshot) -> Vec<Instance> {
    let configured: HashSet<&Instance> = full_list.iter().collect();
    let mut placed: HashSet<&Instance> = HashSet::with_capacity(full_list.len());
    let mut order = Vec::with_capacity(full_list.len());

    for instance in snapshot.instances() {
        if configured.contains(instance) && placed.insert(instance) {
            order.push(instance.clone());
        }
    }

    for instance in full_list {
        if placed.insert(instance) {
            order.push(instance.clone());
        }
    }

    order
}
