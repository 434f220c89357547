//! Electromagnetic pickup
//!
//! The tine swings in front of a magnetic pickup that sits slightly off the
//! tine's resting axis. Flux through the coil is not linear in displacement:
//! the tine gets closer to the magnet on one side of its swing than the
//! other, so the output compresses asymmetrically and gains even harmonics.
//! That asymmetry is the characteristic "bark" of a hard-struck tine piano.
//!
//! # Transfer Function
//!
//! We reuse the soft clip curve and shift it by the pickup offset:
//!
//!   f(x) = s(drive * (x + offset)) - s(drive * offset)
//!   s(x) = x / (1 + |x|)
//!
//! Subtracting `s(drive * offset)` keeps f(0) = 0 so a resting tine produces
//! exact silence. f is strictly increasing, so a larger displacement always
//! produces a larger output swing. The DC the asymmetry introduces is removed
//! downstream by a high-pass filter.
//!
//! # Offset Values
//!
//!   0.0      = symmetric, odd harmonics only (mellow)
//!   0.2-0.4  = classic voicing
//!   0.5+     = strongly asymmetric, growly

/// Soft clipping using x / (1 + |x|) transfer function.
#[inline]
pub fn soft_clip(sample: f32, drive: f32) -> f32 {
    let x = sample * drive;
    x / (1.0 + x.abs())
}

#[derive(Debug, Clone, Copy)]
pub struct Pickup {
    drive: f32,
    offset: f32,
    rest: f32,
}

impl Pickup {
    pub fn new(drive: f32, offset: f32) -> Self {
        Self {
            drive,
            offset,
            rest: soft_clip(offset, drive),
        }
    }

    /// Convert tine displacement into coil voltage.
    #[inline]
    pub fn process(&self, displacement: f32) -> f32 {
        soft_clip(displacement + self.offset, self.drive) - self.rest
    }
}
