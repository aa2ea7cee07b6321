use num_complex::Complex64;

/// Resultants shorter than this fraction of the summed magnitudes count as zero.
const BALANCED_TOLERANCE: f64 = 1e-9;

/// Vector sum of the phasors `magnitude_k ∠ angle_k`, angles in degrees.
pub fn phasor_sum(magnitudes: &[f64], angles: &[f64]) -> Complex64 {
    magnitudes
        .iter()
        .zip(angles)
        .map(|(&magnitude, &angle)| Complex64::from_polar(magnitude, angle.to_radians()))
        .sum()
}

/// Angle in degrees of the vector sum of the currents `I_k ∠ θ_k`.
///
/// A (numerically) balanced set has no defined direction and yields 0°.
pub fn inn_angle(currents: &[f64], current_angles: &[f64]) -> f64 {
    let resultant = phasor_sum(currents, current_angles);
    let total: f64 = currents.iter().map(|value| value.abs()).sum();

    if !resultant.is_finite() || resultant.norm() <= BALANCED_TOLERANCE * total {
        return 0.0;
    }
    resultant.arg().to_degrees()
}
