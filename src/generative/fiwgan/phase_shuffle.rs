//! Phase shuffle: shift a whole batch in time by a random number of samples,
//! filling the exposed edge by reflection.

use crate::autograd::{gather_time, Context, Tensor};
use rand::Rng;
use std::rc::Rc;

/// Source index for every output step of a shift by `phase` samples.
///
/// Positive phases pad on the left and drop the tail, negative phases pad on
/// the right and drop the head. Padding mirrors the signal without repeating
/// the edge sample.
pub fn shift_index(len: usize, phase: i64) -> Vec<usize> {
    assert!(phase.unsigned_abs() < len as u64, "phase must be shorter than the signal");
    let pad_l = phase.max(0) as usize;
    let pad_r = (-phase).max(0) as usize;
    (0..len)
        .map(|t| {
            let j = t + pad_r;
            if j < pad_l {
                pad_l - j
            } else if j - pad_l < len {
                j - pad_l
            } else {
                2 * (len - 1) - (j - pad_l)
            }
        })
        .collect()
}

/// Shift `x` of shape `(B, L, C)` by a fixed phase
pub fn phase_shift(x: &Tensor, phase: i64) -> Tensor {
    if phase == 0 {
        return x.clone();
    }
    let len = x.shape()[1];
    gather_time(x, Rc::new(shift_index(len, phase)))
}

/// Shift `x` by a phase drawn uniformly from `[-rad, rad]`.
///
/// A no-op outside training or when `rad` is zero.
pub fn phase_shuffle(x: &Tensor, rad: usize, ctx: &Context) -> Tensor {
    if rad == 0 || !ctx.is_training() {
        return x.clone();
    }
    let rad = rad as i64;
    let phase = ctx.with_rng(|rng| rng.random_range(-rad..=rad));
    phase_shift(x, phase)
}
