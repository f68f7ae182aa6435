//! Dependency ordering within a layer.
//!
//! Effect A depends on effect B when applying B first would change whether
//! A exists, what A applies to, or what A does. Both are in the same layer
//! (or sublayer) and both are, or both are not, characteristic-defining.
//!
//! Dependencies are found by simulation: B is applied to a copy of the
//! current partial view and A's existence, affected set and resolved output
//! are compared against the unmodified view.
//!
//! Ordering is a topological sort whose ready queue pops the oldest
//! timestamp first. Effects caught in a dependency loop fall back to
//! timestamp order.

use crate::cards::FilterContext;

use super::system::{Candidate, Computation};

/// True if `a` depends on `b` in the computation's current partial view.
pub(crate) fn effect_depends_on(comp: &Computation<'_>, a: &Candidate, b: &Candidate) -> bool {
    if a.slot != b.slot || a.characteristic_defining != b.characteristic_defining {
        return false;
    }
    let view = comp.view();
    if !comp.exists(b, view) {
        return false;
    }

    let mut simulated = view.clone();
    comp.apply_to(b, &mut simulated);

    let existed = comp.exists(a, view);
    if existed != comp.exists(a, &simulated) {
        return true;
    }
    if !existed {
        return false;
    }
    if comp.affected(a, view) != comp.affected(a, &simulated) {
        return true;
    }

    let ctx = FilterContext::new(a.controller, Some(a.source));
    a.modification.resolve(view, &ctx) != a.modification.resolve(&simulated, &ctx)
}

/// Order effects so that each is applied after the effects it depends on.
///
/// `timestamps[i]` orders effects when no dependency decides; `depends(i, j)`
/// reports whether effect `i` depends on effect `j`. Returns indices into
/// the input.
pub(crate) fn order_by_dependency<T: Ord + Copy>(
    timestamps: &[T],
    depends: impl Fn(usize, usize) -> bool,
) -> Vec<usize> {
    let n = timestamps.len();
    let by_age = |i: &usize| (timestamps[*i], *i);
    if n <= 1 {
        return (0..n).collect();
    }

    // depends_on[i] = effects that must be applied before i
    let mut depends_on: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut any = false;
    for (i, deps) in depends_on.iter_mut().enumerate() {
        for j in 0..n {
            if i != j && depends(i, j) {
                deps.push(j);
                any = true;
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(by_age);
    if !any {
        return order;
    }

    let mut done = vec![false; n];
    let mut result = Vec::with_capacity(n);
    while result.len() < n {
        let ready = order
            .iter()
            .copied()
            .filter(|&i| !done[i])
            .find(|&i| depends_on[i].iter().all(|&j| done[j]));

        // Nothing ready: some effects form a loop. Its oldest member goes first.
        let next = match ready {
            Some(i) => i,
            None => match order
                .iter()
                .copied()
                .find(|&i| !done[i] && in_loop(i, &depends_on, &done))
            {
                Some(i) => {
                    log::debug!("dependency loop; applying effect {} by timestamp", i);
                    i
                }
                None => break,
            },
        };
        done[next] = true;
        result.push(next);
    }
    result
}

/// Whether `start` can reach itself through unfinished dependencies.
fn in_loop(start: usize, depends_on: &[Vec<usize>], done: &[bool]) -> bool {
    let mut seen = vec![false; depends_on.len()];
    let mut pending: Vec<usize> = depends_on[start].clone();
    while let Some(node) = pending.pop() {
        if done[node] || seen[node] {
            continue;
        }
        if node == start {
            return true;
        }
        seen[node] = true;
        pending.extend(depends_on[node].iter().copied());
    }
    false
}
