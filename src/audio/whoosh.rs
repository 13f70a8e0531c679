//! Procedural whoosh synthesis.
//!
//! The whoosh is built from two layers and no recorded samples:
//!
//! - a burst of linearly decaying white noise, darkened by a low-pass
//!   filter whose cutoff sweeps down, and
//! - a quiet band-limited sawtooth whose pitch sweeps up.
//!
//! The tone layer runs through its own gain envelope and then joins the
//! filtered noise on the bus gain, which carries the main swell. The whole
//! graph is rendered offline into a mono buffer that an output session
//! plays in one go.

use super::param::AutomationParam;
use crate::error::AudioError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Resonance of the low-pass filter, 1 dB expressed as a linear Q.
const LOWPASS_Q: f64 = 1.122_018_454;

/// Lowest sample rate a whoosh is rendered at, in Hz.
pub const MIN_SAMPLE_RATE: u32 = 8_000;

/// Lowest cutoff the filter is tuned to, in Hz.
const MIN_CUTOFF_HZ: f64 = 10.0;

/// Recipe for one whoosh. Times are seconds from the start of the sound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhooshParams {
    /// Length of the noise buffer.
    pub noise_duration: f64,
    /// Low-pass cutoff at onset, in Hz.
    pub cutoff_start_hz: f32,
    /// Low-pass cutoff at the end of the sweep, in Hz.
    pub cutoff_end_hz: f32,
    /// When the cutoff sweep ends.
    pub cutoff_sweep_end: f64,
    /// The "silent" endpoint of every exponential envelope.
    pub silence_floor: f32,
    /// Peak of the bus gain.
    pub noise_peak: f32,
    /// When the bus gain reaches its peak.
    pub noise_attack_end: f64,
    /// When the bus gain is back at the floor.
    pub noise_release_end: f64,
    /// Sawtooth frequency at onset, in Hz.
    pub tone_start_hz: f32,
    /// Sawtooth frequency at the end of the sweep, in Hz.
    pub tone_end_hz: f32,
    /// When the pitch sweep ends.
    pub tone_sweep_end: f64,
    /// Peak of the tone gain, kept well below the noise peak.
    pub tone_peak: f32,
    /// When the tone gain reaches its peak.
    pub tone_attack_end: f64,
    /// When the tone gain is back at the floor.
    pub tone_release_end: f64,
    /// When the noise source stops.
    pub noise_stop: f64,
    /// When the tone source stops.
    pub tone_stop: f64,
    /// How long after playback starts the output session is released, in ms.
    pub release_after_ms: u64,
}

impl Default for WhooshParams {
    fn default() -> Self {
        Self {
            noise_duration: 0.3,
            cutoff_start_hz: 2200.0,
            cutoff_end_hz: 400.0,
            cutoff_sweep_end: 0.25,
            silence_floor: 0.0001,
            noise_peak: 1.0,
            noise_attack_end: 0.06,
            noise_release_end: 0.32,
            tone_start_hz: 280.0,
            tone_end_hz: 900.0,
            tone_sweep_end: 0.18,
            tone_peak: 0.14,
            tone_attack_end: 0.04,
            tone_release_end: 0.25,
            noise_stop: 0.35,
            tone_stop: 0.30,
            release_after_ms: 700,
        }
    }
}

impl WhooshParams {
    /// Duration of the rendered sound: the later of the two stop times.
    pub fn duration(&self) -> f64 {
        self.noise_stop.max(self.tone_stop)
    }

    /// Builds the automation timelines for this recipe.
    ///
    /// # Errors
    ///
    /// Fails if any envelope endpoint is not strictly positive or the
    /// times are out of order.
    pub fn build_graph(&self) -> Result<WhooshGraph, AudioError> {
        let mut cutoff = AutomationParam::new(self.cutoff_start_hz);
        cutoff
            .set_value_at_time(self.cutoff_start_hz, 0.0)?
            .exponential_ramp_to_value_at_time(self.cutoff_end_hz, self.cutoff_sweep_end)?;

        let mut bus_gain = AutomationParam::new(1.0);
        bus_gain
            .set_value_at_time(self.silence_floor, 0.0)?
            .exponential_ramp_to_value_at_time(self.noise_peak, self.noise_attack_end)?
            .exponential_ramp_to_value_at_time(self.silence_floor, self.noise_release_end)?;

        let mut tone_freq = AutomationParam::new(self.tone_start_hz);
        tone_freq
            .set_value_at_time(self.tone_start_hz, 0.0)?
            .exponential_ramp_to_value_at_time(self.tone_end_hz, self.tone_sweep_end)?;

        let mut tone_gain = AutomationParam::new(1.0);
        tone_gain
            .set_value_at_time(self.silence_floor, 0.0)?
            .exponential_ramp_to_value_at_time(self.tone_peak, self.tone_attack_end)?
            .exponential_ramp_to_value_at_time(self.silence_floor, self.tone_release_end)?;

        Ok(WhooshGraph {
            cutoff,
            bus_gain,
            tone_freq,
            tone_gain,
            noise_stop: self.noise_stop,
            tone_stop: self.tone_stop,
        })
    }

    /// Renders one whoosh at `sample_rate`, drawing noise from `rng`.
    ///
    /// # Errors
    ///
    /// Returns error if the recipe is invalid or `sample_rate` is below
    /// [`MIN_SAMPLE_RATE`].
    pub fn render<R: Rng>(
        &self,
        sample_rate: u32,
        rng: &mut R,
    ) -> Result<Vec<f32>, AudioError> {
        if sample_rate < MIN_SAMPLE_RATE {
            return Err(AudioError::UnsupportedSampleRate {
                rate: sample_rate,
                min: MIN_SAMPLE_RATE,
            });
        }
        let graph = self.build_graph()?;
        let noise = NoiseBuffer::generate(sample_rate, self.noise_duration, rng);
        Ok(graph.render(&noise, sample_rate))
    }
}

/// A block of amplitude-enveloped white noise.
///
/// Sample `i` of `n` is uniform in `[-1, 1]` scaled by `1 - i/n`, so the
/// burst starts at full scale and fades linearly toward silence.
#[derive(Debug, Clone)]
pub struct NoiseBuffer {
    samples: Vec<f32>,
}

impl NoiseBuffer {
    /// Fills a buffer of `sample_rate * duration` samples.
    pub fn generate<R: Rng>(sample_rate: u32, duration: f64, rng: &mut R) -> Self {
        let len = (sample_rate as f64 * duration.max(0.0)) as usize;
        let samples = (0..len)
            .map(|i| rng.random_range(-1.0f32..=1.0) * Self::envelope(i, len))
            .collect();
        Self { samples }
    }

    /// The linear decay envelope applied to sample `index` of `len`.
    pub fn envelope(index: usize, len: usize) -> f32 {
        if len == 0 {
            return 0.0;
        }
        1.0 - index as f32 / len as f32
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

/// The automation timelines and stop times of one whoosh.
#[derive(Debug, Clone)]
pub struct WhooshGraph {
    pub cutoff: AutomationParam,
    pub bus_gain: AutomationParam,
    pub tone_freq: AutomationParam,
    pub tone_gain: AutomationParam,
    pub noise_stop: f64,
    pub tone_stop: f64,
}

impl WhooshGraph {
    /// Renders the graph sample by sample.
    ///
    /// Both sources start at time zero. Each falls silent at its stop time
    /// (or, for the noise, when the buffer runs out).
    pub fn render(&self, noise: &NoiseBuffer, sample_rate: u32) -> Vec<f32> {
        let rate = sample_rate as f64;
        let len = (self.noise_stop.max(self.tone_stop) * rate).ceil() as usize;
        let mut out = Vec::with_capacity(len);

        let mut lowpass = LowPass::default();
        let mut saw = Sawtooth::default();

        for i in 0..len {
            let t = i as f64 / rate;

            let noise_in = if t < self.noise_stop {
                noise.samples().get(i).copied().unwrap_or(0.0)
            } else {
                0.0
            };
            lowpass.set_cutoff(self.cutoff.value_at(t) as f64, rate);
            let filtered = lowpass.process(noise_in);

            let tone = if t < self.tone_stop {
                let freq = self.tone_freq.value_at(t) as f64;
                saw.next_sample(freq / rate) * self.tone_gain.value_at(t)
            } else {
                0.0
            };

            out.push((filtered + tone) * self.bus_gain.value_at(t));
        }

        out
    }
}

/// Second-order low-pass filter (RBJ cookbook), transposed direct form II.
#[derive(Debug, Clone, Default)]
struct LowPass {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z1: f64,
    z2: f64,
}

impl LowPass {
    fn set_cutoff(&mut self, cutoff_hz: f64, sample_rate: f64) {
        let nyquist = (sample_rate * 0.5 - 1.0).max(MIN_CUTOFF_HZ);
        let freq = cutoff_hz.clamp(MIN_CUTOFF_HZ, nyquist);
        let w0 = 2.0 * PI * freq / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * LOWPASS_Q);

        let a0 = 1.0 + alpha;
        self.b0 = (1.0 - cos_w0) / 2.0 / a0;
        self.b1 = (1.0 - cos_w0) / a0;
        self.b2 = self.b0;
        self.a1 = -2.0 * cos_w0 / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    fn process(&mut self, x: f32) -> f32 {
        let x = x as f64;
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y as f32
    }
}

/// Band-limited sawtooth using a polyBLEP correction at the wrap.
#[derive(Debug, Clone, Default)]
struct Sawtooth {
    phase: f64,
}

impl Sawtooth {
    /// Advances by `increment` cycles and returns the next sample.
    fn next_sample(&mut self, increment: f64) -> f32 {
        let dt = increment.clamp(0.0, 0.5);
        let naive = 2.0 * self.phase - 1.0;
        let value = naive - poly_blep(self.phase, dt);

        self.phase += dt;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        value as f32
    }
}

fn poly_blep(phase: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        0.0
    } else if phase < dt {
        let t = phase / dt;
        t + t - t * t - 1.0
    } else if phase > 1.0 - dt {
        let t = (phase - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_noise_length_tracks_sample_rate() {
        let params = WhooshParams::default();
        for rate in [22_050u32, 44_100, 48_000] {
            let noise = NoiseBuffer::generate(rate, params.noise_duration, &mut rng());
            assert_eq!(noise.len(), (rate as f64 * 0.3) as usize);
        }
    }

    #[test]
    fn test_noise_follows_linear_decay_envelope() {
        let noise = NoiseBuffer::generate(48_000, 0.25, &mut rng());
        let len = noise.len();

        assert_eq!(NoiseBuffer::envelope(0, len), 1.0);
        assert!(NoiseBuffer::envelope(len - 1, len) < 1e-3);

        for (i, sample) in noise.samples().iter().enumerate() {
            assert!(sample.abs() <= NoiseBuffer::envelope(i, len) + f32::EPSILON);
        }

        let head: f32 = noise.samples()[..len / 10].iter().map(|s| s.abs()).sum();
        let tail: f32 = noise.samples()[len - len / 10..].iter().map(|s| s.abs()).sum();
        assert!(head > tail * 5.0);
    }

    #[test]
    fn test_render_length_covers_latest_stop() {
        let params = WhooshParams::default();
        let out = params.render(44_100, &mut rng()).unwrap();
        assert_eq!(out.len(), (0.35f64 * 44_100.0).ceil() as usize);
    }

    #[test]
    fn test_render_swells_then_fades() {
        let params = WhooshParams::default();
        let rate = 48_000;
        let out = params.render(rate, &mut rng()).unwrap();

        let window_peak = |from: f64, to: f64| {
            let a = (from * rate as f64) as usize;
            let b = (to * rate as f64) as usize;
            out[a..b].iter().fold(0.0f32, |m, s| m.max(s.abs()))
        };

        let onset = window_peak(0.0, 0.005);
        let body = window_peak(0.04, 0.08);
        let tail = window_peak(0.33, 0.35);

        assert!(onset < body * 0.1, "onset {onset} body {body}");
        assert!(tail < 1e-3, "tail {tail}");
        assert!(out.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_cutoff_and_pitch_sweep_directions() {
        let graph = WhooshParams::default().build_graph().unwrap();
        assert!(graph.cutoff.value_at(0.0) > graph.cutoff.value_at(0.25));
        assert!((graph.cutoff.value_at(0.25) - 400.0).abs() < 0.5);
        assert!(graph.tone_freq.value_at(0.18) > graph.tone_freq.value_at(0.0) * 3.0);
        assert!(graph.tone_gain.value_at(0.04) < graph.bus_gain.value_at(0.06));
    }

    #[test]
    fn test_zero_floor_is_rejected() {
        let params = WhooshParams {
            silence_floor: 0.0,
            ..WhooshParams::default()
        };
        assert!(matches!(
            params.build_graph(),
            Err(AudioError::NonPositiveRamp { .. })
        ));
    }

    #[test]
    fn test_tiny_sample_rate_is_rejected() {
        let params = WhooshParams::default();
        for rate in [0u32, 16, MIN_SAMPLE_RATE - 1] {
            assert!(matches!(
                params.render(rate, &mut rng()),
                Err(AudioError::UnsupportedSampleRate { min: MIN_SAMPLE_RATE, .. })
            ));
        }
        assert!(params.render(MIN_SAMPLE_RATE, &mut rng()).is_ok());
    }

    #[test]
    fn test_lowpass_tolerates_tiny_rate() {
        let mut lowpass = LowPass::default();
        lowpass.set_cutoff(2200.0, 16.0);
        assert!(lowpass.process(1.0).is_finite());
    }

    #[test]
    fn test_sawtooth_stays_bounded() {
        let mut saw = Sawtooth::default();
        for _ in 0..10_000 {
            let s = saw.next_sample(900.0 / 48_000.0);
            assert!((-1.5..=1.5).contains(&s));
        }
    }
}
