use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type, Q_BUTTERWORTH_F32};

use crate::audio_api::{FilterKind, FilterSpec};

// lowest cutoff we accept; below this the coefficients get numerically silly
const MIN_CUTOFF_HZ: f32 = 10.0;

pub struct Filter {
    inner: DirectForm2Transposed<f32>,
}

impl Filter {
    // None when the coefficients can't be built for this rate; the voice then plays unfiltered
    pub fn new(spec: FilterSpec, sample_rate: f32) -> Option<Self> {
        let nyquist = sample_rate * 0.5;
        let cutoff = spec.cutoff_hz.clamp(MIN_CUTOFF_HZ, nyquist * 0.99);
        let kind = match spec.kind {
            FilterKind::LowPass => Type::LowPass,
            FilterKind::HighPass => Type::HighPass,
        };
        let coeffs =
            Coefficients::<f32>::from_params(kind, sample_rate.hz(), cutoff.hz(), Q_BUTTERWORTH_F32)
                .ok()?;
        Some(Self {
            inner: DirectForm2Transposed::<f32>::new(coeffs),
        })
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        self.inner.run(x)
    }
}
