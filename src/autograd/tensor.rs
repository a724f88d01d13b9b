//! Tensor type with gradient tracking

use super::backward::{is_grad_enabled, BackwardOp};
use ndarray::{ArrayD, IxDyn};
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

struct Node {
    id: usize,
    data: RefCell<ArrayD<f32>>,
    requires_grad: bool,
    backward_op: Option<Rc<dyn BackwardOp>>,
}

/// N-dimensional `f32` tensor participating in the autograd graph.
///
/// Cloning is cheap: clones share the same node, so a parameter cloned into
/// a forward pass is the same parameter the optimizer later updates.
/// Node ids grow monotonically, so every node is younger than its inputs.
#[derive(Clone)]
pub struct Tensor {
    node: Rc<Node>,
}

impl Tensor {
    /// Create a leaf tensor
    pub fn new(data: ArrayD<f32>, requires_grad: bool) -> Self {
        Self::build(data, requires_grad, None)
    }

    /// Create a 1-D leaf tensor from a vector
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        let len = data.len();
        let array = ArrayD::from_shape_vec(IxDyn(&[len]), data)
            .expect("1-D shape always matches vector length");
        Self::new(array, requires_grad)
    }

    /// Create a leaf tensor with the given shape
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not match the product of `shape`.
    pub fn from_shape_vec(shape: &[usize], data: Vec<f32>, requires_grad: bool) -> Self {
        let array = ArrayD::from_shape_vec(IxDyn(shape), data)
            .unwrap_or_else(|e| panic!("shape {shape:?} does not match data: {e}"));
        Self::new(array, requires_grad)
    }

    /// Zero-filled leaf tensor
    pub fn zeros(shape: &[usize], requires_grad: bool) -> Self {
        Self::new(ArrayD::zeros(IxDyn(shape)), requires_grad)
    }

    /// One-filled leaf tensor
    pub fn ones(shape: &[usize], requires_grad: bool) -> Self {
        Self::new(ArrayD::ones(IxDyn(shape)), requires_grad)
    }

    /// 0-dimensional constant
    pub fn scalar(value: f32) -> Self {
        Self::new(ArrayD::from_elem(IxDyn(&[]), value), false)
    }

    /// Result of a differentiable op.
    ///
    /// Records `op` only when grad mode is on and some input requires grad.
    pub(crate) fn from_op(data: ArrayD<f32>, op: Rc<dyn BackwardOp>) -> Self {
        let track = is_grad_enabled() && op.inputs().iter().any(Tensor::requires_grad);
        if track {
            Self::build(data, true, Some(op))
        } else {
            Self::build(data, false, None)
        }
    }

    fn build(data: ArrayD<f32>, requires_grad: bool, backward_op: Option<Rc<dyn BackwardOp>>) -> Self {
        let data = if data.is_standard_layout() { data } else { data.as_standard_layout().into_owned() };
        Self {
            node: Rc::new(Node {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                data: RefCell::new(data),
                requires_grad,
                backward_op,
            }),
        }
    }

    /// Unique node id (monotonic in creation order)
    pub fn id(&self) -> usize {
        self.node.id
    }

    /// Borrow the underlying data
    pub fn data(&self) -> Ref<'_, ArrayD<f32>> {
        self.node.data.borrow()
    }

    /// Owned copy of the underlying data
    pub fn to_array(&self) -> ArrayD<f32> {
        self.node.data.borrow().clone()
    }

    /// Flattened copy of the underlying data
    pub fn to_vec(&self) -> Vec<f32> {
        self.node.data.borrow().iter().copied().collect()
    }

    /// Shape of the tensor
    pub fn shape(&self) -> Vec<usize> {
        self.node.data.borrow().shape().to_vec()
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.node.data.borrow().ndim()
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.node.data.borrow().len()
    }

    /// Whether the tensor has no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First element, intended for scalar losses
    ///
    /// # Panics
    ///
    /// Panics on an empty tensor.
    pub fn item(&self) -> f32 {
        *self.node.data.borrow().iter().next().expect("item() on empty tensor")
    }

    /// Whether gradients flow into this tensor
    pub fn requires_grad(&self) -> bool {
        self.node.requires_grad
    }

    /// Whether this tensor is a graph leaf
    pub fn is_leaf(&self) -> bool {
        self.node.backward_op.is_none()
    }

    /// Backward op that produced this tensor
    pub fn backward_op(&self) -> Option<Rc<dyn BackwardOp>> {
        self.node.backward_op.clone()
    }

    /// New leaf holding a copy of the data, cut off from the graph
    pub fn detach(&self) -> Tensor {
        Tensor::new(self.to_array(), false)
    }

    /// Copy of the data as a fresh leaf that requires grad
    pub fn detach_requires_grad(&self) -> Tensor {
        Tensor::new(self.to_array(), true)
    }

    /// Replace the data in place (parameter updates)
    ///
    /// # Panics
    ///
    /// Panics if the new data has a different shape.
    pub fn set_data(&self, data: ArrayD<f32>) {
        let mut current = self.node.data.borrow_mut();
        assert_eq!(current.shape(), data.shape(), "set_data must preserve shape");
        *current = data;
    }

    /// Mutate the data in place (parameter updates)
    pub fn update_data<F: FnOnce(&mut ArrayD<f32>)>(&self, f: F) {
        f(&mut self.node.data.borrow_mut());
    }

    /// Whether two handles refer to the same node
    pub fn ptr_eq(&self, other: &Tensor) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    /// Whether every element is finite
    pub fn is_finite(&self) -> bool {
        self.node.data.borrow().iter().all(|v| v.is_finite())
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("id", &self.node.id)
            .field("shape", &self.shape())
            .field("requires_grad", &self.node.requires_grad)
            .field("op", &self.node.backward_op.as_ref().map(|op| op.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_shape() {
        let t = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
        assert_eq!(t.shape(), vec![3]);
        assert!(t.requires_grad());
        assert!(t.is_leaf());
    }

    #[test]
    fn test_ids_are_monotonic() {
        let a = Tensor::scalar(1.0);
        let b = Tensor::scalar(2.0);
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_clone_shares_node() {
        let a = Tensor::from_vec(vec![1.0, 2.0], true);
        let b = a.clone();
        a.set_data(ndarray::arr1(&[5.0, 6.0]).into_dyn());
        assert_eq!(b.to_vec(), vec![5.0, 6.0]);
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn test_detach_is_independent() {
        let a = Tensor::from_vec(vec![1.0, 2.0], true);
        let d = a.detach();
        assert!(!d.requires_grad());
        a.set_data(ndarray::arr1(&[0.0, 0.0]).into_dyn());
        assert_eq!(d.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    #[should_panic(expected = "preserve shape")]
    fn test_set_data_rejects_shape_change() {
        let a = Tensor::zeros(&[2], true);
        a.set_data(ArrayD::zeros(IxDyn(&[3])));
    }

    #[test]
    fn test_item_and_finite() {
        let s = Tensor::scalar(f32::NAN);
        assert!(s.item().is_nan());
        assert!(!s.is_finite());
        assert!(Tensor::ones(&[2, 2], false).is_finite());
    }
}
