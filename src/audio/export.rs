//! WAV export of the synthesized whoosh.
//!
//! Renders one whoosh offline and writes it as a mono 16-bit WAV file,
//! which is handy for auditioning recipe changes without a live device.

use super::whoosh::WhooshParams;
use crate::error::AudioError;
use hound::{SampleFormat, WavSpec, WavWriter};
use rand::Rng;
use std::path::Path;

/// Renders `params` at `sample_rate` and writes the result to `output_path`.
///
/// # Arguments
///
/// * `params` - The whoosh recipe
/// * `sample_rate` - Output sample rate in Hz
/// * `output_path` - Path for the output WAV file
/// * `rng` - Noise source
///
/// # Returns
///
/// The number of samples written
///
/// # Errors
///
/// Returns error if the recipe is invalid or the file cannot be written.
pub fn export_whoosh_wav<P: AsRef<Path>, R: Rng>(
    params: &WhooshParams,
    sample_rate: u32,
    output_path: P,
    rng: &mut R,
) -> Result<usize, AudioError> {
    let samples = params.render(sample_rate, rng)?;

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(output_path.as_ref(), spec)?;

    for sample in &samples {
        // Convert f32 (-1.0 to 1.0) to i16
        let value = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer.write_sample(value)?;
    }

    writer.finalize()?;
    Ok(samples.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_export_writes_mono_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whoosh.wav");
        let mut rng = StdRng::seed_from_u64(1);

        let written =
            export_whoosh_wav(&WhooshParams::default(), 22_050, &path, &mut rng).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, 22_050);
        assert_eq!(reader.len() as usize, written);
        assert!(written > 0);
    }

    #[test]
    fn test_export_rejects_tiny_sample_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whoosh.wav");
        let mut rng = StdRng::seed_from_u64(1);

        let result = export_whoosh_wav(&WhooshParams::default(), 16, &path, &mut rng);

        assert!(matches!(
            result,
            Err(AudioError::UnsupportedSampleRate { rate: 16, .. })
        ));
        assert!(!path.exists());
    }
}
