//! Squared Euclidean distance for runtime-length f32 vectors.
//!
//! Dimension is a runtime parameter (spec: D chosen at load time), unlike the
//! const-generic `[T; N]` kernels this crate's AVX2 shape was lifted from, so
//! the SIMD path here walks the slice in chunks of 8 and folds a scalar
//! remainder rather than requiring `N % 8 == 0`.

/// Squared Euclidean distance between two equal-length vectors.
///
/// Returns squared distance, not the square root: every caller only compares
/// ranks, and the square root is a monotone transform so this is safe to skip.
///
/// # Panics
/// Panics (debug only) if `a.len() != b.len()`.
#[inline]
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must share a dimension");

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            // Safety: we've just checked AVX2 is available.
            return unsafe { squared_euclidean_avx2(a, b) };
        }
    }
    squared_euclidean_scalar(a, b)
}

#[inline]
fn squared_euclidean_scalar(a: &[f32], b: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        let diff = x - y;
        sum += diff * diff;
    }
    sum
}

/// AVX2 path for the common-case chunk of the vector, scalar fallback for
/// the `len % 8` remainder.
///
/// # Safety
/// Caller must ensure the CPU supports AVX2 (checked via
/// `is_x86_feature_detected!` in [`squared_euclidean`]).
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn squared_euclidean_avx2(a: &[f32], b: &[f32]) -> f32 {
    use std::arch::x86_64::*;

    let len = a.len();
    let simd_width = 8;
    let chunks = len - (len % simd_width);

    let mut acc = _mm256_setzero_ps();
    let mut i = 0;
    while i < chunks {
        unsafe {
            let va = _mm256_loadu_ps(a.as_ptr().add(i));
            let vb = _mm256_loadu_ps(b.as_ptr().add(i));
            let diff = _mm256_sub_ps(va, vb);
            acc = _mm256_fmadd_ps(diff, diff, acc);
        }
        i += simd_width;
    }

    let mut lanes = [0f32; 8];
    unsafe { _mm256_storeu_ps(lanes.as_mut_ptr(), acc) };
    let mut sum: f32 = lanes.iter().sum();

    for j in chunks..len {
        let diff = a[j] - b[j];
        sum += diff * diff;
    }
    sum
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::Rng;

    use super::*;

    fn random_vec(dim: usize) -> Vec<f32> {
        let mut rng = rand::rng();
        (0..dim).map(|_| rng.random_range(-1.0..1.0)).collect()
    }

    #[test]
    fn zero_distance_to_self() {
        let v = random_vec(100);
        assert_abs_diff_eq!(squared_euclidean(&v, &v), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn symmetric() {
        let a = random_vec(37);
        let b = random_vec(37);
        assert_abs_diff_eq!(
            squared_euclidean(&a, &b),
            squared_euclidean(&b, &a),
            epsilon = 1e-5
        );
    }

    #[test]
    fn matches_scalar_for_non_multiple_of_eight() {
        for dim in [1usize, 3, 7, 8, 9, 15, 16, 17, 100, 103] {
            let a = random_vec(dim);
            let b = random_vec(dim);
            let scalar = squared_euclidean_scalar(&a, &b);
            let dispatched = squared_euclidean(&a, &b);
            assert_abs_diff_eq!(scalar, dispatched, epsilon = 1e-3);
        }
    }

    #[test]
    fn known_value() {
        let a = [1.0f32, 2.0, 3.0];
        let b = [4.0f32, 6.0, 3.0];
        // (3^2 + 4^2 + 0^2) = 25
        assert_abs_diff_eq!(squared_euclidean(&a, &b), 25.0, epsilon = 1e-6);
    }
}
