use crate::config::RenderMode;

/// Attributes of one pixel format the driver offers.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ConfigTraits {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
    pub depth: u8,
    pub stencil: u8,
    pub samples: u8,
    pub hardware_accelerated: bool,
}

/// Pixel format wanted for the GL window.
///
/// RGBA8, double-buffered, no multisampling, no stencil. Depth only when the
/// mode draws with depth.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PixelFormatRequest {
    pub color_bits: u8,
    pub alpha_bits: u8,
    pub depth_bits: u8,
    pub stencil_bits: u8,
}

impl PixelFormatRequest {
    pub fn for_mode(mode: RenderMode) -> Self {
        Self {
            color_bits: 8,
            alpha_bits: 8,
            depth_bits: if mode.uses_depth() { 24 } else { 0 },
            stencil_bits: 0,
        }
    }

    /// Ranks a format; higher is closer. `None` when it cannot satisfy the request.
    ///
    /// Every missing bit disqualifies. Every surplus bit costs a point,
    /// multisampling costs more, and software formats rank below all
    /// hardware ones.
    pub fn score(&self, c: &ConfigTraits) -> Option<u32> {
        let channels = [c.red, c.green, c.blue];
        if channels.iter().any(|&b| b < self.color_bits)
            || c.alpha < self.alpha_bits
            || c.depth < self.depth_bits
            || c.stencil < self.stencil_bits
        {
            return None;
        }

        let surplus: u32 = channels
            .iter()
            .map(|&b| (b - self.color_bits) as u32)
            .sum::<u32>()
            + (c.alpha - self.alpha_bits) as u32
            + (c.depth - self.depth_bits) as u32
            + (c.stencil - self.stencil_bits) as u32;

        let mut score = 1_000u32.saturating_sub(surplus + 50 * c.samples as u32);
        if c.hardware_accelerated {
            score += 1_000;
        }
        Some(score)
    }

    /// Index of the best acceptable format, if any.
    pub fn pick(&self, offered: &[ConfigTraits]) -> Option<usize> {
        offered
            .iter()
            .enumerate()
            .filter_map(|(i, c)| self.score(c).map(|s| (i, s)))
            // Earliest wins a tie, matching the driver's own ordering.
            .max_by(|(ia, sa), (ib, sb)| sa.cmp(sb).then(ib.cmp(ia)))
            .map(|(i, _)| i)
    }

    /// Index the config picker settles on.
    ///
    /// Falls back to the first offer when none is acceptable; the caller
    /// rescores the result and reports it.
    pub fn choose(&self, offered: &[ConfigTraits]) -> usize {
        self.pick(offered).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba8(depth: u8) -> ConfigTraits {
        ConfigTraits {
            red: 8,
            green: 8,
            blue: 8,
            alpha: 8,
            depth,
            stencil: 0,
            samples: 0,
            hardware_accelerated: true,
        }
    }

    #[test]
    fn depth_is_requested_only_for_cube() {
        assert_eq!(PixelFormatRequest::for_mode(RenderMode::Flat).depth_bits, 0);
        assert_eq!(PixelFormatRequest::for_mode(RenderMode::Cube).depth_bits, 24);
    }

    #[test]
    fn missing_depth_disqualifies_in_cube_mode() {
        let req = PixelFormatRequest::for_mode(RenderMode::Cube);
        assert!(req.score(&rgba8(0)).is_none());
        assert!(req.score(&rgba8(16)).is_none());
        assert!(req.score(&rgba8(24)).is_some());
    }

    #[test]
    fn missing_alpha_disqualifies() {
        let req = PixelFormatRequest::for_mode(RenderMode::Flat);
        let c = ConfigTraits { alpha: 0, ..rgba8(0) };
        assert!(req.score(&c).is_none());
    }

    #[test]
    fn exact_match_beats_surplus() {
        let req = PixelFormatRequest::for_mode(RenderMode::Flat);
        let exact = req.score(&rgba8(0)).unwrap();
        let deep = req.score(&rgba8(24)).unwrap();
        let stencil = req.score(&ConfigTraits { stencil: 8, ..rgba8(0) }).unwrap();
        assert!(exact > deep);
        assert!(exact > stencil);
    }

    #[test]
    fn multisampling_is_penalised() {
        let req = PixelFormatRequest::for_mode(RenderMode::Flat);
        let msaa = ConfigTraits { samples: 4, ..rgba8(0) };
        assert!(req.score(&rgba8(0)).unwrap() > req.score(&msaa).unwrap());
    }

    #[test]
    fn hardware_beats_any_software_format() {
        let req = PixelFormatRequest::for_mode(RenderMode::Cube);
        let software_exact = ConfigTraits { hardware_accelerated: false, ..rgba8(24) };
        let hardware_wasteful = ConfigTraits { stencil: 8, samples: 8, ..rgba8(32) };
        assert!(req.score(&hardware_wasteful).unwrap() > req.score(&software_exact).unwrap());
    }

    #[test]
    fn pick_skips_unacceptable_and_prefers_first_on_tie() {
        let req = PixelFormatRequest::for_mode(RenderMode::Cube);
        let offered = [rgba8(0), rgba8(32), rgba8(24), rgba8(24)];
        assert_eq!(req.pick(&offered), Some(2));
        assert_eq!(req.pick(&[rgba8(0)]), None);
        assert_eq!(req.pick(&[]), None);
    }

    #[test]
    fn choose_falls_back_to_first_offer() {
        let req = PixelFormatRequest::for_mode(RenderMode::Cube);
        assert_eq!(req.choose(&[rgba8(16), rgba8(24), rgba8(24)]), 1);
        assert_eq!(req.choose(&[rgba8(0), rgba8(16)]), 0);
        assert!(req.score(&rgba8(0)).is_none());
    }
}
