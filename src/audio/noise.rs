use std::sync::Arc;

use rand::Rng;

pub const NOISE_SECONDS: u32 = 2;

// Uniform white noise in [-1, 1], shared by every noise voice. Clones share
// the samples.
#[derive(Clone, Debug)]
pub struct NoiseBuffer {
    samples: Arc<[f32]>,
}

impl NoiseBuffer {
    pub fn generate(sample_rate: u32) -> Self {
        Self::generate_with(&mut rand::rng(), sample_rate)
    }

    pub fn generate_with<R: Rng>(rng: &mut R, sample_rate: u32) -> Self {
        let len = (sample_rate * NOISE_SECONDS) as usize;
        let samples: Arc<[f32]> = (0..len).map(|_| rng.random_range(-1.0f32..=1.0)).collect();
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.samples.get(index).copied()
    }

    #[cfg(test)]
    pub fn shares_storage_with(&self, other: &NoiseBuffer) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_two_seconds_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = NoiseBuffer::generate_with(&mut rng, 8000);
        assert_eq!(noise.len(), 16000);
        assert!((0..noise.len()).all(|i| {
            let s = noise.get(i).unwrap();
            (-1.0..=1.0).contains(&s)
        }));
        // not a constant buffer
        assert_ne!(noise.get(0), noise.get(1));
    }

    #[test]
    fn test_clones_share_samples() {
        let noise = NoiseBuffer::generate(100);
        let copy = noise.clone();
        assert!(copy.shares_storage_with(&noise));
        assert_eq!(noise.get(noise.len()), None);
    }
}
