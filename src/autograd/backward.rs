//! Reverse-mode gradient engine
//!
//! Every op records a [`BackwardOp`] whose vector-Jacobian product is written
//! in terms of other differentiable ops. Running [`grad`] with
//! `create_graph = true` therefore records the backward pass itself, and the
//! returned gradients can be differentiated again (double backprop).

use super::ops::{add, broadcast_scalar};
use super::Tensor;
use ndarray::ArrayD;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};

thread_local! {
    static GRAD_ENABLED: Cell<bool> = const { Cell::new(true) };
}

/// Backward rule of a recorded op
pub trait BackwardOp {
    /// Op inputs, in the order `vjp` returns their gradients
    fn inputs(&self) -> Vec<Tensor>;

    /// Vector-Jacobian product for every input.
    ///
    /// `output` is the tensor this op produced and `grad` the gradient flowing
    /// into it. Entries may be `None` for inputs that are constants.
    fn vjp(&self, output: &Tensor, grad: &Tensor) -> Vec<Option<Tensor>>;

    /// Op name for debugging
    fn name(&self) -> &'static str;
}

/// Whether ops currently record backward ops
pub fn is_grad_enabled() -> bool {
    GRAD_ENABLED.with(Cell::get)
}

struct GradModeGuard {
    previous: bool,
}

impl GradModeGuard {
    fn set(enabled: bool) -> Self {
        let previous = GRAD_ENABLED.with(|g| g.replace(enabled));
        Self { previous }
    }
}

impl Drop for GradModeGuard {
    fn drop(&mut self) {
        GRAD_ENABLED.with(|g| g.set(self.previous));
    }
}

/// Run `f` without recording any ops
pub fn no_grad<T, F: FnOnce() -> T>(f: F) -> T {
    let _guard = GradModeGuard::set(false);
    f()
}

/// Gradients of `output` with respect to each tensor in `wrt`.
///
/// A non-scalar `output` is treated as `sum(output)`. Targets that do not
/// influence `output` receive zeros. With `create_graph`, the returned
/// gradients carry their own backward ops.
pub fn grad(output: &Tensor, wrt: &[Tensor], create_graph: bool) -> Vec<Tensor> {
    let _guard = GradModeGuard::set(create_graph);

    let targets: HashSet<usize> = wrt.iter().map(Tensor::id).collect();
    let order = topological_order(output);
    let relevant = relevant_nodes(&order, &targets);

    let mut grads: HashMap<usize, Tensor> = HashMap::new();
    if output.requires_grad() && relevant.contains(&output.id()) {
        let seed = broadcast_scalar(&Tensor::scalar(1.0), &output.shape());
        grads.insert(output.id(), seed);
    }

    // Reverse topological order: every consumer runs before its producer.
    for node in order.iter().rev() {
        if !relevant.contains(&node.id()) {
            continue;
        }
        let Some(op) = node.backward_op() else {
            continue;
        };
        let Some(upstream) = grads.get(&node.id()).cloned() else {
            continue;
        };
        let input_grads = op.vjp(node, &upstream);
        for (input, input_grad) in op.inputs().iter().zip(input_grads) {
            let Some(g) = input_grad else {
                continue;
            };
            if !input.requires_grad() || !relevant.contains(&input.id()) {
                continue;
            }
            debug_assert_eq!(g.shape(), input.shape(), "vjp of {} returned wrong shape", op.name());
            let accumulated = match grads.remove(&input.id()) {
                Some(existing) => add(&existing, &g),
                None => g,
            };
            grads.insert(input.id(), accumulated);
        }
        if !targets.contains(&node.id()) {
            grads.remove(&node.id());
        }
    }

    wrt.iter()
        .map(|t| {
            grads
                .get(&t.id())
                .cloned()
                .unwrap_or_else(|| Tensor::new(ArrayD::zeros(t.data().raw_dim()), false))
        })
        .collect()
}

/// Post-order over the nodes reachable from `root` through grad-requiring edges.
fn topological_order(root: &Tensor) -> Vec<Tensor> {
    let mut order = Vec::new();
    if !root.requires_grad() {
        return order;
    }
    let mut visited: HashSet<usize> = HashSet::new();
    let mut stack: Vec<(Tensor, bool)> = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            order.push(node);
            continue;
        }
        if !visited.insert(node.id()) {
            continue;
        }
        stack.push((node.clone(), true));
        if let Some(op) = node.backward_op() {
            for input in op.inputs() {
                if input.requires_grad() && !visited.contains(&input.id()) {
                    stack.push((input, false));
                }
            }
        }
    }
    order
}

/// Nodes on some path into a target; everything else is skipped.
fn relevant_nodes(order: &[Tensor], targets: &HashSet<usize>) -> HashSet<usize> {
    let mut relevant = HashSet::new();
    // Post-order visits inputs before their consumers.
    for node in order {
        let leads = targets.contains(&node.id())
            || node
                .backward_op()
                .is_some_and(|op| op.inputs().iter().any(|i| relevant.contains(&i.id())));
        if leads {
            relevant.insert(node.id());
        }
    }
    relevant
}
