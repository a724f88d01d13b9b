//! Property-based gradient checks for convolutions and time resampling

use super::test_utils::{max_gradient_error, weighted_sum};
use crate::autograd::{
    conv1d, conv1d_transpose, gather_time, square, tanh, upsample_nearest, Tensor,
};
use proptest::prelude::*;
use std::rc::Rc;

/// (batch, length, in_channels, out_channels, kernel_len, stride)
fn conv_dims() -> impl Strategy<Value = (usize, usize, usize, usize, usize, usize)> {
    (1usize..3, 3usize..10, 1usize..3, 1usize..3, 1usize..6, 1usize..4)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_conv1d_input_gradient_check(
        (b, l, ci, co, k, s) in conv_dims(),
        values in prop::collection::vec(-1.0f32..1.0, 80)
    ) {
        let x = &values[..b * l * ci];
        let kernel = Tensor::from_shape_vec(&[k, ci, co], values[40..40 + k * ci * co].to_vec(), false);
        let err = max_gradient_error(
            |t| weighted_sum(&square(&conv1d(t, &kernel, s))),
            &[b, l, ci],
            x,
            1e-2,
        );
        prop_assert!(err < 2e-2, "conv1d input gradient error {}", err);
    }

    #[test]
    fn prop_conv1d_weight_gradient_check(
        (b, l, ci, co, k, s) in conv_dims(),
        values in prop::collection::vec(-1.0f32..1.0, 80)
    ) {
        let input = Tensor::from_shape_vec(&[b, l, ci], values[..b * l * ci].to_vec(), false);
        let w = &values[40..40 + k * ci * co];
        let err = max_gradient_error(
            |t| weighted_sum(&square(&conv1d(&input, t, s))),
            &[k, ci, co],
            w,
            1e-2,
        );
        prop_assert!(err < 2e-2, "conv1d weight gradient error {}", err);
    }

    #[test]
    fn prop_conv1d_transpose_gradient_check(
        (b, l, ci, co, k, s) in conv_dims(),
        values in prop::collection::vec(-1.0f32..1.0, 80)
    ) {
        // Kernel layout (K, out, in)
        let kernel = Tensor::from_shape_vec(&[k, co, ci], values[40..40 + k * ci * co].to_vec(), false);
        let x = &values[..b * l * ci];
        let err = max_gradient_error(
            |t| weighted_sum(&tanh(&conv1d_transpose(t, &kernel, s))),
            &[b, l, ci],
            x,
            1e-2,
        );
        prop_assert!(err < 2e-2, "conv1d_transpose gradient error {}", err);
    }

    #[test]
    fn prop_conv1d_output_length_is_ceil(
        (b, l, ci, co, k, s) in conv_dims()
    ) {
        let y = conv1d(&Tensor::zeros(&[b, l, ci], false), &Tensor::zeros(&[k, ci, co], false), s);
        prop_assert_eq!(y.shape(), vec![b, l.div_ceil(s), co]);
    }

    #[test]
    fn prop_resample_gradient_check(
        x in prop::collection::vec(-1.0f32..1.0, 8),
        factor in 1usize..4,
        shift in 0usize..4
    ) {
        let index: Rc<Vec<usize>> = Rc::new((0..4).map(|t| (t + shift) % 4).collect());
        let err = max_gradient_error(
            |t| weighted_sum(&square(&upsample_nearest(&gather_time(t, Rc::clone(&index)), factor))),
            &[2, 4, 1],
            &x,
            1e-2,
        );
        prop_assert!(err < 2e-2, "resample gradient error {}", err);
    }
}
