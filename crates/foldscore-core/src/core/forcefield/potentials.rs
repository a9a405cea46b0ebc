#[inline]
pub fn soft_sphere_overlap(dist: f64, radius_i: f64, radius_j: f64, softness: f64) -> f64 {
    let overlap = radius_i + radius_j + softness - dist;
    if overlap > 0.0 { overlap * overlap } else { 0.0 }
}

#[inline]
pub fn neg_log_probability(probability: f64, floor: f64, cap: f64) -> f64 {
    let p = probability.clamp(floor, 1.0);
    (-p.ln()).clamp(0.0, cap)
}

/// Bilinear interpolation on the unit square; `fx`, `fy` in `[0, 1]`.
#[inline]
pub fn bilinear(v00: f64, v10: f64, v01: f64, v11: f64, fx: f64, fy: f64) -> f64 {
    let bottom = v00 * (1.0 - fx) + v10 * fx;
    let top = v01 * (1.0 - fx) + v11 * fx;
    bottom * (1.0 - fy) + top * fy
}

#[inline]
pub fn gaussian_2d(dx: f64, dy: f64, sigma_x: f64, sigma_y: f64) -> f64 {
    let zx = dx / sigma_x;
    let zy = dy / sigma_y;
    (-0.5 * (zx * zx + zy * zy)).exp()
}

#[inline]
pub fn harmonic(value: f64, target: f64, k: f64) -> f64 {
    let d = value - target;
    k * d * d
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn soft_sphere_is_zero_beyond_contact_distance() {
        assert_eq!(soft_sphere_overlap(3.7, 1.7, 1.7, 0.2), 0.0);
        assert_eq!(soft_sphere_overlap(5.0, 1.7, 1.7, 0.2), 0.0);
    }

    #[test]
    fn soft_sphere_is_square_of_overlap() {
        // 1.7 + 1.7 + 0.2 - 2.8 = 0.8
        assert!(f64_approx_equal(soft_sphere_overlap(2.8, 1.7, 1.7, 0.2), 0.64));
    }

    #[test]
    fn reducing_two_overlaps_from_point_eight_to_point_two_saves_one_point_two() {
        let before = 2.0 * soft_sphere_overlap(2.8, 1.7, 1.7, 0.2);
        let after = 2.0 * soft_sphere_overlap(3.4, 1.7, 1.7, 0.2);
        assert!(f64_approx_equal(before - after, 1.2));
    }

    #[test]
    fn neg_log_probability_is_clipped_to_cap() {
        assert!(f64_approx_equal(neg_log_probability(1e-12, 1e-6, 10.0), 10.0));
        assert!(f64_approx_equal(neg_log_probability(1.0, 1e-6, 10.0), 0.0));
        assert!(f64_approx_equal(neg_log_probability(2.0, 1e-6, 10.0), 0.0));
    }

    #[test]
    fn neg_log_probability_of_half_is_ln_two() {
        assert!(f64_approx_equal(
            neg_log_probability(0.5, 1e-6, 10.0),
            std::f64::consts::LN_2
        ));
    }

    #[test]
    fn bilinear_reproduces_corners_and_centre() {
        assert!(f64_approx_equal(bilinear(1.0, 2.0, 3.0, 4.0, 0.0, 0.0), 1.0));
        assert!(f64_approx_equal(bilinear(1.0, 2.0, 3.0, 4.0, 1.0, 0.0), 2.0));
        assert!(f64_approx_equal(bilinear(1.0, 2.0, 3.0, 4.0, 0.0, 1.0), 3.0));
        assert!(f64_approx_equal(bilinear(1.0, 2.0, 3.0, 4.0, 1.0, 1.0), 4.0));
        assert!(f64_approx_equal(bilinear(1.0, 2.0, 3.0, 4.0, 0.5, 0.5), 2.5));
    }

    #[test]
    fn gaussian_peaks_at_origin() {
        assert!(f64_approx_equal(gaussian_2d(0.0, 0.0, 10.0, 20.0), 1.0));
        assert!(gaussian_2d(10.0, 0.0, 10.0, 20.0) < 1.0);
    }

    #[test]
    fn harmonic_is_quadratic_in_deviation() {
        assert!(f64_approx_equal(harmonic(5.0, 3.0, 0.3), 1.2));
        assert!(f64_approx_equal(harmonic(3.0, 3.0, 0.3), 0.0));
    }
}
