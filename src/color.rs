use bitflags::bitflags;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Logical pixel color, one value per channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

bitflags! {
    /// Channels that get a random value; the rest stay at zero
    pub struct Channels: u8 {
        const RED = 0b001;
        const GREEN = 0b010;
        const BLUE = 0b100;
    }
}

impl Channels {
    /// Enabled set for the given flags, all three when none is set
    pub fn from_flags(red: bool, green: bool, blue: bool) -> Self {
        let mut channels = Channels::empty();
        channels.set(Channels::RED, red);
        channels.set(Channels::GREEN, green);
        channels.set(Channels::BLUE, blue);

        if channels.is_empty() {
            Channels::all()
        } else {
            channels
        }
    }
}

/// Random color source, re-rolled once per block row-group
pub struct ColorPlane {
    channels: Channels,
    rng: StdRng,
}

impl ColorPlane {
    /// Seeded planes repeat the same pattern on every run
    pub fn new(channels: Channels, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { channels, rng }
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Fresh raw color; disabled channels are always 0
    pub fn roll(&mut self) -> Color {
        let mut channel = |flag: Channels| {
            if self.channels.contains(flag) {
                self.rng.gen::<u8>()
            } else {
                0
            }
        };

        let red = channel(Channels::RED);
        let green = channel(Channels::GREEN);
        let blue = channel(Channels::BLUE);
        Color::new(red, green, blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_enables_all() {
        assert_eq!(Channels::from_flags(false, false, false), Channels::all());
    }

    #[test]
    fn test_single_flag_enables_only_that_channel() {
        let channels = Channels::from_flags(true, false, false);
        assert_eq!(channels, Channels::RED);

        let channels = Channels::from_flags(false, true, true);
        assert_eq!(channels, Channels::GREEN | Channels::BLUE);
    }

    #[test]
    fn test_disabled_channels_roll_zero() {
        let mut plane = ColorPlane::new(Channels::RED, Some(7));
        for _ in 0..256 {
            let color = plane.roll();
            assert_eq!(color.green, 0);
            assert_eq!(color.blue, 0);
        }
    }

    #[test]
    fn test_seeded_planes_repeat() {
        let mut a = ColorPlane::new(Channels::all(), Some(42));
        let mut b = ColorPlane::new(Channels::all(), Some(42));
        for _ in 0..32 {
            assert_eq!(a.roll(), b.roll());
        }
    }

    #[test]
    fn test_enabled_channel_varies() {
        let mut plane = ColorPlane::new(Channels::BLUE, Some(1));
        let first = plane.roll().blue;
        assert!((0..64).any(|_| plane.roll().blue != first));
    }
}
