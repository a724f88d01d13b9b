//! Unit tests for autograd operations (forward and backward)

use super::test_utils::{max_gradient_error, weighted_sum};
use crate::autograd::{
    add, broadcast_last, broadcast_rows, div, downsample_sum, gather_time, grad, leaky_relu,
    matmul, mean, relu, reshape, scale_rows, scatter_time, sigmoid, softplus, sqrt, sub, sum,
    sum_rows, sum_to_last, tanh, transpose, upsample_nearest, Tensor,
};
use approx::assert_abs_diff_eq;
use ndarray::arr1;
use std::rc::Rc;

#[test]
fn test_sub_backward() {
    let a = Tensor::from_vec(vec![1.0, 2.0], true);
    let b = Tensor::from_vec(vec![4.0, 8.0], true);
    let g = grad(&sum(&sub(&a, &b)), &[a, b], false);
    assert_eq!(g[0].to_vec(), vec![1.0, 1.0]);
    assert_eq!(g[1].to_vec(), vec![-1.0, -1.0]);
}

#[test]
fn test_div_backward() {
    let a = Tensor::from_vec(vec![3.0], true);
    let b = Tensor::from_vec(vec![2.0], true);
    let g = grad(&sum(&div(&a, &b)), &[a, b], false);
    assert_abs_diff_eq!(g[0].item(), 0.5);
    assert_abs_diff_eq!(g[1].item(), -0.75);
}

#[test]
fn test_mean_forward_and_backward() {
    let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 6.0], true);
    let m = mean(&a);
    assert_eq!(m.shape(), Vec::<usize>::new());
    assert_abs_diff_eq!(m.item(), 3.0);
    let g = grad(&m, &[a], false);
    assert_eq!(g[0].to_vec(), vec![0.25; 4]);
}

#[test]
fn test_relu_forward_and_mask() {
    let a = Tensor::from_vec(vec![-1.0, 0.0, 2.0], true);
    let y = relu(&a);
    assert_eq!(y.to_vec(), vec![0.0, 0.0, 2.0]);
    let g = grad(&sum(&y), &[a], false);
    assert_eq!(g[0].to_vec(), vec![0.0, 0.0, 1.0]);
}

#[test]
fn test_leaky_relu_matches_max_form() {
    let a = Tensor::from_vec(vec![-2.0, 3.0], true);
    let y = leaky_relu(&a, 0.2);
    assert_abs_diff_eq!(y.to_vec()[0], -0.4);
    assert_abs_diff_eq!(y.to_vec()[1], 3.0);
    let g = grad(&sum(&y), &[a], false);
    assert_abs_diff_eq!(g[0].to_vec()[0], 0.2);
    assert_abs_diff_eq!(g[0].to_vec()[1], 1.0);
}

#[test]
fn test_sigmoid_and_softplus_are_stable() {
    let a = Tensor::from_vec(vec![-100.0, 0.0, 100.0], false);
    let s = sigmoid(&a).to_vec();
    assert_abs_diff_eq!(s[0], 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(s[1], 0.5);
    assert_abs_diff_eq!(s[2], 1.0, epsilon = 1e-6);
    let sp = softplus(&a).to_vec();
    assert!(sp.iter().all(|v| v.is_finite()));
    assert_abs_diff_eq!(sp[1], std::f32::consts::LN_2, epsilon = 1e-6);
    assert_abs_diff_eq!(sp[2], 100.0, epsilon = 1e-4);
}

#[test]
fn test_tanh_bounded() {
    let a = Tensor::from_vec(vec![-50.0, 50.0], false);
    let y = tanh(&a).to_vec();
    assert!(y.iter().all(|v| (-1.0..=1.0).contains(v)));
}

#[test]
fn test_sqrt_backward() {
    let a = Tensor::from_vec(vec![4.0], true);
    let g = grad(&sum(&sqrt(&a)), &[a], false);
    assert_abs_diff_eq!(g[0].item(), 0.25);
}

#[test]
fn test_matmul_forward_and_backward() {
    let a = Tensor::from_shape_vec(&[2, 2], vec![1.0, 2.0, 3.0, 4.0], true);
    let b = Tensor::from_shape_vec(&[2, 1], vec![5.0, 6.0], true);
    let c = matmul(&a, &b);
    assert_eq!(c.to_vec(), vec![17.0, 39.0]);
    let g = grad(&sum(&c), &[a, b], false);
    assert_eq!(g[0].to_vec(), vec![5.0, 6.0, 5.0, 6.0]);
    assert_eq!(g[1].to_vec(), vec![4.0, 6.0]);
}

#[test]
fn test_transpose_shape() {
    let a = Tensor::from_shape_vec(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], false);
    let t = transpose(&a);
    assert_eq!(t.shape(), vec![3, 2]);
    assert_eq!(t.to_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
}

#[test]
fn test_row_reductions() {
    let a = Tensor::from_shape_vec(&[2, 2, 2], (1..=8).map(|v| v as f32).collect(), true);
    let rows = sum_rows(&a);
    assert_eq!(rows.to_vec(), vec![10.0, 26.0]);
    let channels = sum_to_last(&a);
    assert_eq!(channels.to_vec(), vec![16.0, 20.0]);

    let v = Tensor::from_vec(vec![1.0, -1.0], false);
    assert_eq!(broadcast_rows(&v, &[2, 1, 2]).to_vec(), vec![1.0, 1.0, -1.0, -1.0]);
    assert_eq!(broadcast_last(&v, &[2, 2]).to_vec(), vec![1.0, -1.0, 1.0, -1.0]);
}

#[test]
fn test_scale_rows_backward() {
    let a = Tensor::from_shape_vec(&[2, 2], vec![1.0, 2.0, 3.0, 4.0], true);
    let factors = Rc::new(arr1(&[2.0, -1.0]));
    let y = scale_rows(&a, factors);
    assert_eq!(y.to_vec(), vec![2.0, 4.0, -3.0, -4.0]);
    let g = grad(&sum(&y), &[a], false);
    assert_eq!(g[0].to_vec(), vec![2.0, 2.0, -1.0, -1.0]);
}

#[test]
fn test_reshape_round_trip_gradient() {
    let a = Tensor::from_shape_vec(&[2, 3], vec![1.0; 6], true);
    let err = max_gradient_error(|t| weighted_sum(&reshape(t, &[3, 2])), &[2, 3], &a.to_vec(), 1e-2);
    assert!(err < 1e-2);
}

#[test]
fn test_upsample_repeats_samples() {
    let x = Tensor::from_shape_vec(&[1, 2, 1], vec![1.0, 2.0], true);
    let y = upsample_nearest(&x, 3);
    assert_eq!(y.to_vec(), vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
    let g = grad(&sum(&y), &[x], false);
    assert_eq!(g[0].to_vec(), vec![3.0, 3.0]);
    assert_eq!(downsample_sum(&y, 3).to_vec(), vec![3.0, 6.0]);
}

#[test]
fn test_gather_scatter_adjoint() {
    let x = Tensor::from_shape_vec(&[1, 3, 1], vec![1.0, 2.0, 3.0], true);
    let index = Rc::new(vec![1, 0, 1]);
    let y = gather_time(&x, Rc::clone(&index));
    assert_eq!(y.to_vec(), vec![2.0, 1.0, 2.0]);
    let g = grad(&sum(&y), &[x], false);
    assert_eq!(g[0].to_vec(), vec![1.0, 2.0, 0.0]);
    let back = scatter_time(&y, index, 3);
    assert_eq!(back.to_vec(), vec![1.0, 4.0, 0.0]);
}

#[test]
fn test_constant_inputs_do_not_track() {
    let a = Tensor::from_vec(vec![1.0], false);
    let b = Tensor::from_vec(vec![2.0], false);
    let c = add(&a, &b);
    assert!(!c.requires_grad());
    assert!(c.is_leaf());
}
