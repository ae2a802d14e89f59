//! Property tests for frame scaling

use pisight_eye::processing::scaled_dimensions;
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_longer_side_matches_target(width in 1u32..8000, height in 1u32..8000, target in 1u32..4000) {
        let (w, h) = scaled_dimensions(width, height, target).unwrap();
        prop_assert_eq!(w.max(h), target);
        prop_assert!(w >= 1 && h >= 1);
    }

    #[test]
    fn test_orientation_preserved(width in 1u32..8000, height in 1u32..8000, target in 2u32..4000) {
        let (w, h) = scaled_dimensions(width, height, target).unwrap();
        if width > height {
            prop_assert!(w >= h);
        } else if height > width {
            prop_assert!(h >= w);
        } else {
            prop_assert_eq!(w, h);
        }
    }

    #[test]
    fn test_aspect_ratio_within_rounding(width in 1u32..8000, height in 1u32..8000, target in 1u32..4000) {
        let (w, h) = scaled_dimensions(width, height, target).unwrap();
        let (long, short) = if width >= height { (width, height) } else { (height, width) };
        let scaled_short = w.min(h) as f64;
        let exact = short as f64 * target as f64 / long as f64;
        prop_assert!((scaled_short - exact.max(1.0)).abs() <= 0.5 + 1e-9);
    }

    #[test]
    fn test_swapping_sides_swaps_result(width in 1u32..8000, height in 1u32..8000, target in 1u32..4000) {
        let (w, h) = scaled_dimensions(width, height, target).unwrap();
        let (w2, h2) = scaled_dimensions(height, width, target).unwrap();
        prop_assert_eq!((w, h), (h2, w2));
    }
}
