//! Double-backprop checks: gradients of gradient-dependent losses

use super::test_utils::{max_gradient_error, weighted_sum};
use crate::autograd::{
    add_scalar, conv1d, conv1d_transpose, grad, matmul, mean, reshape, sigmoid, sqrt,
    square, sum, sum_rows, tanh, Tensor,
};
use proptest::prelude::*;

/// Slope penalty `mean((‖∇ₓ sum(f(x))‖ - 1)²)` with the norm over non-batch axes
fn slope_penalty(x: &Tensor, scores: &Tensor) -> Tensor {
    let g = grad(&sum(scores), &[x.clone()], true).remove(0);
    let slopes = sqrt(&add_scalar(&sum_rows(&square(&g)), 1e-12));
    mean(&square(&add_scalar(&slopes, -1.0)))
}

#[test]
fn test_penalty_of_quadratic_is_exact() {
    // f(x) = sum(x²) per row, ∇ = 2x, ‖∇‖ = 2‖x‖
    let x = Tensor::from_shape_vec(&[2, 2], vec![3.0, 4.0, 0.0, 0.5], true);
    let scores = sum_rows(&square(&x));
    let penalty = slope_penalty(&x, &scores);
    // rows: ‖∇‖ = 10 and 1
    assert!((penalty.item() - 40.5).abs() < 1e-3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_second_order_through_conv(
        x in prop::collection::vec(-1.0f32..1.0, 16),
        w in prop::collection::vec(-0.5f32..0.5, 12)
    ) {
        let input = Tensor::from_shape_vec(&[2, 8, 1], x, true);
        let err = max_gradient_error(
            |kernel| {
                let h = tanh(&conv1d(&input, kernel, 2));
                let g = grad(&weighted_sum(&h), &[input.clone()], true).remove(0);
                sum(&square(&g))
            },
            &[3, 1, 4],
            &w,
            1e-2,
        );
        prop_assert!(err < 3e-2, "conv double-backprop error {}", err);
    }

    #[test]
    fn prop_second_order_through_transpose_conv(
        x in prop::collection::vec(-1.0f32..1.0, 8),
        w in prop::collection::vec(-0.5f32..0.5, 10)
    ) {
        let input = Tensor::from_shape_vec(&[2, 2, 2], x, true);
        let err = max_gradient_error(
            |kernel| {
                let h = sigmoid(&conv1d_transpose(&input, kernel, 2));
                let g = grad(&weighted_sum(&h), &[input.clone()], true).remove(0);
                sum(&square(&g))
            },
            &[5, 1, 2],
            &w,
            1e-2,
        );
        prop_assert!(err < 3e-2, "transpose conv double-backprop error {}", err);
    }

    #[test]
    fn prop_slope_penalty_gradient_wrt_weights(
        x in prop::collection::vec(-0.5f32..0.5, 6),
        w in prop::collection::vec(0.5f32..1.5, 6)
    ) {
        // Positive weights and bounded inputs keep every slope well away from zero
        let input = Tensor::from_shape_vec(&[2, 3], x, true);
        let err = max_gradient_error(
            |weights| {
                let hidden = tanh(&matmul(&input, weights));
                let scores = reshape(&matmul(&hidden, &Tensor::ones(&[2, 1], false)), &[2]);
                slope_penalty(&input, &scores)
            },
            &[3, 2],
            &w,
            1e-2,
        );
        prop_assert!(err < 3e-2, "slope penalty gradient error {}", err);
    }
}
