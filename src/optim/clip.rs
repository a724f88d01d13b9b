//! Parameter clipping utilities

use crate::Tensor;

/// Clamp every element of every parameter into `[min, max]`
///
/// Used for the weight constraint of the original Wasserstein critic.
/// Returns how many elements were changed.
pub fn clip_by_value(params: &[Tensor], min: f32, max: f32) -> usize {
    assert!(min <= max, "clip range is empty");
    let mut clipped = 0;
    for param in params {
        param.update_data(|data| {
            data.mapv_inplace(|v| {
                let c = v.clamp(min, max);
                if c != v {
                    clipped += 1;
                }
                c
            });
        });
    }
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clip_by_value_counts_changes() {
        let a = Tensor::from_vec(vec![-0.5, 0.005, 0.02], true);
        let n = clip_by_value(&[a.clone()], -0.01, 0.01);
        assert_eq!(n, 2);
        assert_eq!(a.to_vec(), vec![-0.01, 0.005, 0.01]);
    }

    proptest! {
        #[test]
        fn prop_clip_bounds_every_element(
            values in prop::collection::vec(-10.0f32..10.0, 1..64)
        ) {
            let t = Tensor::from_vec(values, true);
            clip_by_value(&[t.clone()], -0.01, 0.01);
            prop_assert!(t.to_vec().iter().all(|v| (-0.01..=0.01).contains(v)));
        }
    }
}
