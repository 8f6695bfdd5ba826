//! Streaming Butterworth band-pass filter in second-order-section form
//!
//! The design pipeline mirrors the classic analog-prototype route: Butterworth
//! poles, low-pass to band-pass transform, bilinear transform, then pairing of
//! conjugate poles into biquad sections. Applying the filter carries the
//! per-channel recursive state across chunk boundaries, so chunked filtering
//! is numerically identical to filtering one continuous sequence.

use core::f64::consts::PI;
use num_complex::Complex64;
use nscope_core::{SampleChunk, ScopeError, ScopeResult};
use serde::{Deserialize, Serialize};

/// Default band-pass order used by the scope layer.
pub const DEFAULT_BP_ORDER: usize = 2;

/// Band-pass configuration parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandpassConfig {
    /// Frequency at which the signal is high-passed (Hz)
    pub low_hz: f64,
    /// Frequency at which the signal is low-passed (Hz)
    pub high_hz: f64,
    /// Butterworth design order (number of biquad sections)
    pub order: usize,
}

impl BandpassConfig {
    pub fn new(low_hz: f64, high_hz: f64, order: usize) -> Self {
        Self {
            low_hz,
            high_hz,
            order,
        }
    }
}

/// Single biquad section, a0 normalized to 1.
///
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sos {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

/// Stateful band-pass filter for chunked multichannel streams.
///
/// The recursive state stays `None` until the first non-empty chunk arrives;
/// it is then seeded with the steady-state step response scaled by each
/// channel's DC level in that chunk, which suppresses the startup transient a
/// zero state would produce. Reconfiguring discards the state so coefficients
/// and state can never mix across designs.
#[derive(Debug, Clone)]
pub struct StreamingBandpass {
    config: BandpassConfig,
    sample_rate: f64,
    sos: Vec<Sos>,
    // steady-state step-response template per section, to be scaled by the
    // channel DC level on first use
    zi_unit: Vec<[f64; 2]>,
    // per-channel, per-section delay state; None = uninitialized
    state: Option<Vec<Vec<[f64; 2]>>>,
}

impl StreamingBandpass {
    /// Design a new filter for the given configuration and sample rate.
    pub fn new(config: BandpassConfig, sample_rate: f64) -> ScopeResult<Self> {
        let mut filter = StreamingBandpass {
            config,
            sample_rate,
            sos: Vec::new(),
            zi_unit: Vec::new(),
            state: None,
        };
        filter.configure(config, sample_rate)?;
        Ok(filter)
    }

    /// Recompute the design. Any existing recursive state is discarded.
    pub fn configure(&mut self, config: BandpassConfig, sample_rate: f64) -> ScopeResult<()> {
        if sample_rate <= 0.0 {
            return Err(ScopeError::InvalidFilterConfig {
                reason: format!("sample rate must be positive, got {}", sample_rate),
            });
        }
        if config.order == 0 {
            return Err(ScopeError::InvalidFilterConfig {
                reason: "filter order must be at least 1".to_string(),
            });
        }
        let nyquist = 0.5 * sample_rate;
        let low = config.low_hz / nyquist;
        let high = config.high_hz / nyquist;
        if !(low > 0.0 && low < 1.0) || !(high > 0.0 && high < 1.0) {
            return Err(ScopeError::InvalidFilterConfig {
                reason: format!(
                    "normalized cutoffs must lie in (0, 1): low {:.4}, high {:.4} (nyquist {} Hz)",
                    low, high, nyquist
                ),
            });
        }
        if low >= high {
            return Err(ScopeError::InvalidFilterConfig {
                reason: format!(
                    "low cutoff {} Hz must be below high cutoff {} Hz",
                    config.low_hz, config.high_hz
                ),
            });
        }

        let sos = butter_bandpass_sos(config.order, low, high)?;
        self.zi_unit = sos_step_state(&sos);
        self.sos = sos;
        self.config = config;
        self.sample_rate = sample_rate;
        self.state = None;
        Ok(())
    }

    /// Current configuration.
    pub fn config(&self) -> BandpassConfig {
        self.config
    }

    /// Number of cascaded biquad sections.
    pub fn sections(&self) -> usize {
        self.sos.len()
    }

    /// True once the first non-empty chunk has seeded the recursive state.
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Mark the recursive state uninitialized, keeping the coefficients.
    pub fn reset(&mut self) {
        self.state = None;
    }

    /// Filter a chunk in place, carrying state into the next call.
    pub fn apply(&mut self, chunk: &mut SampleChunk) {
        if chunk.is_empty() {
            return;
        }
        let channels = chunk.channels();
        let samples = chunk.samples();

        let needs_init = self
            .state
            .as_ref()
            .map_or(true, |st| st.len() != channels);
        if needs_init {
            // Seed with the steady-state response to each channel's DC level
            // in this first chunk.
            let mut state = Vec::with_capacity(channels);
            for ch in 0..channels {
                let mut sum = 0.0;
                for s in 0..samples {
                    sum += chunk.value(s, ch);
                }
                let mean = sum / samples as f64;
                state.push(
                    self.zi_unit
                        .iter()
                        .map(|z| [z[0] * mean, z[1] * mean])
                        .collect::<Vec<_>>(),
                );
            }
            self.state = Some(state);
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };

        // Direct form II transposed, section by section.
        for s in 0..samples {
            for ch in 0..channels {
                let mut x = chunk.value(s, ch);
                for (sec, z) in self.sos.iter().zip(state[ch].iter_mut()) {
                    let y = sec.b0 * x + z[0];
                    z[0] = sec.b1 * x - sec.a1 * y + z[1];
                    z[1] = sec.b2 * x - sec.a2 * y;
                    x = y;
                }
                *chunk.value_mut(s, ch) = x;
            }
        }
    }

    /// Magnitude response at a normalized frequency (1.0 = Nyquist).
    pub fn frequency_response(&self, normalized: f64) -> f64 {
        let zinv = Complex64::from_polar(1.0, -PI * normalized);
        let mut h = Complex64::new(1.0, 0.0);
        for sec in &self.sos {
            let num = Complex64::new(sec.b0, 0.0)
                + Complex64::new(sec.b1, 0.0) * zinv
                + Complex64::new(sec.b2, 0.0) * zinv * zinv;
            let den = Complex64::new(1.0, 0.0)
                + Complex64::new(sec.a1, 0.0) * zinv
                + Complex64::new(sec.a2, 0.0) * zinv * zinv;
            h *= num / den;
        }
        h.norm()
    }
}

/// Butterworth band-pass design as `order` cascaded biquad sections.
///
/// `low`/`high` are normalized to the Nyquist frequency and already
/// validated. Follows analog prototype -> lp2bp -> bilinear with the
/// conventional fs = 2 normalization, so cutoffs land exactly on the
/// requested digital frequencies after pre-warping.
fn butter_bandpass_sos(order: usize, low: f64, high: f64) -> ScopeResult<Vec<Sos>> {
    const FS: f64 = 2.0;
    let warped_lo = 2.0 * FS * libm::tan(PI * low / FS);
    let warped_hi = 2.0 * FS * libm::tan(PI * high / FS);
    let bw = warped_hi - warped_lo;
    let wo = (warped_lo * warped_hi).sqrt();

    // Butterworth prototype: poles evenly spaced on the left unit semicircle
    let n = order as i32;
    let mut prototype = Vec::with_capacity(order);
    let mut m = -(n - 1);
    while m <= n - 1 {
        let theta = PI * m as f64 / (2.0 * n as f64);
        prototype.push(-Complex64::from_polar(1.0, theta));
        m += 2;
    }

    // Low-pass to band-pass: each prototype pole splits into two
    let wo2 = Complex64::new(wo * wo, 0.0);
    let mut analog_poles = Vec::with_capacity(2 * order);
    for p in prototype {
        let s = p * Complex64::new(bw / 2.0, 0.0);
        let d = (s * s - wo2).sqrt();
        analog_poles.push(s + d);
        analog_poles.push(s - d);
    }
    // `order` analog zeros sit at s = 0; the transform gain is bw^order
    let k_analog = bw.powi(n);

    // Bilinear transform
    let fs2 = 2.0 * FS;
    let mut digital_poles = Vec::with_capacity(analog_poles.len());
    let mut denom = Complex64::new(1.0, 0.0);
    for &p in &analog_poles {
        let d = Complex64::new(fs2, 0.0) - p;
        digital_poles.push((Complex64::new(fs2, 0.0) + p) / d);
        denom *= d;
    }
    // analog zeros at 0 map to z = +1; the degree difference adds zeros at -1
    let k = k_analog * (Complex64::new(fs2.powi(n), 0.0) / denom).re;

    // Pair poles into sections; every section keeps one zero at +1 and one
    // at -1, so its numerator is proportional to [1, 0, -1]
    let pairs = pair_conjugates(&digital_poles)?;
    let mut sections = Vec::with_capacity(pairs.len());
    for (i, (p, q)) in pairs.iter().enumerate() {
        let a1 = -(p + q).re;
        let a2 = (p * q).re;
        let g = if i == 0 { k } else { 1.0 };
        sections.push(Sos {
            b0: g,
            b1: 0.0,
            b2: -g,
            a1,
            a2,
        });
    }
    Ok(sections)
}

/// Group a conjugate-closed pole set into conjugate (or real-real) pairs.
fn pair_conjugates(poles: &[Complex64]) -> ScopeResult<Vec<(Complex64, Complex64)>> {
    let tol = |p: &Complex64| 1e-8 * (1.0 + p.norm());
    let mut pairs: Vec<(Complex64, Complex64)> = poles
        .iter()
        .copied()
        .filter(|p| p.im > tol(p))
        .map(|p| (p, p.conj()))
        .collect();
    let mut reals: Vec<f64> = poles
        .iter()
        .copied()
        .filter(|p| p.im.abs() <= tol(p))
        .map(|p| p.re)
        .collect();
    reals.sort_by(|a, b| a.total_cmp(b));
    if reals.len() % 2 != 0 {
        return Err(ScopeError::InvalidFilterConfig {
            reason: "band-pass design produced an unpaired real pole".to_string(),
        });
    }
    for pair in reals.chunks_exact(2) {
        pairs.push((
            Complex64::new(pair[0], 0.0),
            Complex64::new(pair[1], 0.0),
        ));
    }
    if pairs.len() * 2 != poles.len() {
        return Err(ScopeError::InvalidFilterConfig {
            reason: "band-pass design produced an inconsistent pole pairing".to_string(),
        });
    }
    Ok(pairs)
}

/// Per-section steady-state delay values for a unit step input.
///
/// Scaling these by a channel's DC level yields a state from which a constant
/// input produces its steady-state output immediately, with no transient.
/// The DC gain of each section scales the template handed to the next one.
fn sos_step_state(sos: &[Sos]) -> Vec<[f64; 2]> {
    let mut scale = 1.0;
    let mut zi = Vec::with_capacity(sos.len());
    for sec in sos {
        let b_sum = sec.b0 + sec.b1 + sec.b2;
        let a_sum = 1.0 + sec.a1 + sec.a2;
        // Fixed point of the transposed direct-form-II state recursion
        let c0 = sec.b1 - sec.a1 * sec.b0;
        let c1 = sec.b2 - sec.a2 * sec.b0;
        let z0 = (c0 + c1) / a_sum;
        let z1 = ((1.0 + sec.a1) * c1 - sec.a2 * c0) / a_sum;
        zi.push([scale * z0, scale * z1]);
        scale *= b_sum / a_sum;
    }
    zi
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_1_SQRT_2;

    fn make_filter(low: f64, high: f64, order: usize, rate: f64) -> StreamingBandpass {
        StreamingBandpass::new(BandpassConfig::new(low, high, order), rate).unwrap()
    }

    /// Deterministic broadband-ish test signal.
    fn test_signal(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| {
                let t = i as f64 / 250.0;
                2.5 + (2.0 * PI * 10.0 * t).sin()
                    + 0.4 * (2.0 * PI * 35.0 * t).sin()
                    + 0.1 * ((i * 2654435761_usize) % 1000) as f64 / 1000.0
            })
            .collect()
    }

    #[test]
    fn test_invalid_configurations_rejected() {
        let cases = [
            (40.0, 8.0, 2),   // low >= high
            (0.0, 40.0, 2),   // low out of (0, 1) normalized
            (8.0, 125.0, 2),  // high at Nyquist
            (8.0, 300.0, 2),  // high beyond Nyquist
            (8.0, 40.0, 0),   // zero order
        ];
        for (low, high, order) in cases {
            let result = StreamingBandpass::new(BandpassConfig::new(low, high, order), 250.0);
            assert!(
                matches!(result, Err(ScopeError::InvalidFilterConfig { .. })),
                "({low}, {high}, order {order}) should be rejected"
            );
        }
        assert!(matches!(
            StreamingBandpass::new(BandpassConfig::new(1.0, 40.0, 2), 0.0),
            Err(ScopeError::InvalidFilterConfig { .. })
        ));
    }

    #[test]
    fn test_section_count_matches_order() {
        for order in 1..=4 {
            let filter = make_filter(4.0, 40.0, order, 250.0);
            assert_eq!(filter.sections(), order);
        }
    }

    #[test]
    fn test_band_edges_and_center_gain() {
        let (low_hz, high_hz, rate) = (8.0, 30.0, 250.0);
        let filter = make_filter(low_hz, high_hz, 2, rate);
        let nyquist = 0.5 * rate;

        // -3 dB at both requested cutoffs
        for edge in [low_hz / nyquist, high_hz / nyquist] {
            let gain = filter.frequency_response(edge);
            assert!(
                (gain - FRAC_1_SQRT_2).abs() < 1e-6,
                "edge gain {} at {}",
                gain,
                edge
            );
        }

        // unity at the (pre-warped) geometric band center
        let warped_lo = 4.0 * libm::tan(PI * low_hz / nyquist / 2.0);
        let warped_hi = 4.0 * libm::tan(PI * high_hz / nyquist / 2.0);
        let wo = (warped_lo * warped_hi).sqrt();
        let center = 2.0 / PI * libm::atan(wo / 4.0);
        let gain = filter.frequency_response(center);
        assert!((gain - 1.0).abs() < 1e-6, "center gain {}", gain);

        // stop-band extremes
        assert!(filter.frequency_response(1e-9) < 1e-6);
        assert!(filter.frequency_response(1.0) < 1e-6);
    }

    #[test]
    fn test_dc_level_produces_no_startup_transient() {
        let mut filter = make_filter(1.0, 40.0, 2, 250.0);
        let mut chunk = SampleChunk::single_channel(vec![5.0; 200]);
        filter.apply(&mut chunk);
        for (i, &y) in chunk.as_slice().iter().enumerate() {
            assert!(y.abs() < 1e-9, "sample {} leaked transient {}", i, y);
        }
        assert!(filter.is_initialized());
    }

    #[test]
    fn test_chunking_invariance_after_shared_first_chunk() {
        let signal = test_signal(600);
        let (head, tail) = signal.split_at(100);

        let mut whole = make_filter(4.0, 40.0, 2, 250.0);
        let mut first = SampleChunk::single_channel(head.to_vec());
        whole.apply(&mut first);
        let mut rest = SampleChunk::single_channel(tail.to_vec());
        whole.apply(&mut rest);
        let reference = rest.channel(0).unwrap();

        let mut chunked = make_filter(4.0, 40.0, 2, 250.0);
        let mut first2 = SampleChunk::single_channel(head.to_vec());
        chunked.apply(&mut first2);
        assert_eq!(first.channel(0).unwrap(), first2.channel(0).unwrap());

        let mut produced = Vec::with_capacity(tail.len());
        let mut offset = 0;
        for size in [1usize, 7, 3, 64, 125, 300] {
            let end = (offset + size).min(tail.len());
            let mut piece = SampleChunk::single_channel(tail[offset..end].to_vec());
            chunked.apply(&mut piece);
            produced.extend(piece.channel(0).unwrap());
            offset = end;
        }
        assert_eq!(offset, tail.len());

        for (i, (a, b)) in reference.iter().zip(produced.iter()).enumerate() {
            let tol = 1e-9 * (1.0 + a.abs());
            assert!(
                (a - b).abs() <= tol,
                "sample {} diverged: {} vs {}",
                i,
                a,
                b
            );
        }
    }

    #[test]
    fn test_multichannel_state_is_independent() {
        let signal = test_signal(400);
        let mut per_channel = make_filter(4.0, 40.0, 2, 250.0);
        let mut mono = SampleChunk::single_channel(signal.clone());
        per_channel.apply(&mut mono);

        // same signal on both columns of a stereo chunk
        let mut interleaved = Vec::with_capacity(signal.len() * 2);
        for &x in &signal {
            interleaved.push(x);
            interleaved.push(x);
        }
        let mut stereo_filter = make_filter(4.0, 40.0, 2, 250.0);
        let mut stereo = SampleChunk::new(interleaved, 2).unwrap();
        stereo_filter.apply(&mut stereo);

        let expected = mono.channel(0).unwrap();
        for ch in 0..2 {
            let got = stereo.channel(ch).unwrap();
            for (a, b) in expected.iter().zip(got.iter()) {
                assert!((a - b).abs() <= 1e-12);
            }
        }
    }

    #[test]
    fn test_reconfigure_resets_state() {
        let mut filter = make_filter(4.0, 40.0, 2, 250.0);
        let mut chunk = SampleChunk::single_channel(test_signal(50));
        filter.apply(&mut chunk);
        assert!(filter.is_initialized());

        filter
            .configure(BandpassConfig::new(1.0, 30.0, 2), 250.0)
            .unwrap();
        assert!(!filter.is_initialized());
        assert_eq!(filter.config().low_hz, 1.0);
    }

    #[test]
    fn test_empty_chunk_is_a_no_op() {
        let mut filter = make_filter(4.0, 40.0, 2, 250.0);
        let mut empty = SampleChunk::empty(1);
        filter.apply(&mut empty);
        assert!(!filter.is_initialized());
    }
}
