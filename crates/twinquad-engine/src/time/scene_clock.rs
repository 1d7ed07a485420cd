use std::time::{Duration, Instant};

/// Timing snapshot for one loop iteration.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick.
    pub dt: f32,

    /// Scene time in seconds; drives the cube animation.
    pub elapsed: f32,

    /// Monotonic iteration counter, starting at 0.
    pub frame_index: u64,
}

#[derive(Debug, Clone)]
enum Source {
    Wall {
        last: Instant,
        dt_min: Duration,
        dt_max: Duration,
    },
    Fixed {
        step: f64,
    },
}

/// Scene clock shared by every backend within one loop iteration.
///
/// Wall mode measures real time with delta clamping, so a debugger pause or a
/// minimized window does not make the cube jump. Fixed mode advances by an
/// exact step per tick, which makes runs reproducible.
#[derive(Debug, Clone)]
pub struct SceneClock {
    source: Source,
    elapsed: f64,
    frame_index: u64,
}

impl SceneClock {
    /// Wall-clock time with default clamps.
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Wall-clock time with custom delta clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            source: Source::Wall {
                last: Instant::now(),
                dt_min,
                dt_max,
            },
            elapsed: 0.0,
            frame_index: 0,
        }
    }

    /// Exactly `step` seconds per tick.
    ///
    /// `step` must be finite and positive; callers validate user input.
    pub fn fixed(step: f32) -> Self {
        debug_assert!(step.is_finite() && step > 0.0, "invalid fixed step {step}");
        Self {
            source: Source::Fixed { step: step as f64 },
            elapsed: 0.0,
            frame_index: 0,
        }
    }

    /// `fixed(step)` when a step is given, wall clock otherwise.
    pub fn from_step(step: Option<f32>) -> Self {
        step.map_or_else(Self::new, Self::fixed)
    }

    /// Resets the wall-clock baseline without touching elapsed time.
    pub fn reset(&mut self) {
        if let Source::Wall { last, .. } = &mut self.source {
            *last = Instant::now();
        }
    }

    /// Advances the clock and returns the snapshot for this iteration.
    pub fn tick(&mut self) -> FrameTime {
        let dt = match &mut self.source {
            Source::Wall { last, dt_min, dt_max } => {
                let now = Instant::now();
                let dt = now.saturating_duration_since(*last).clamp(*dt_min, *dt_max);
                *last = now;
                dt.as_secs_f64()
            }
            Source::Fixed { step } => *step,
        };

        self.elapsed += dt;

        let ft = FrameTime {
            dt: dt as f32,
            elapsed: self.elapsed as f32,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for SceneClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_step_accumulates_exactly() {
        let mut clock = SceneClock::fixed(0.25);
        let times: Vec<f32> = (0..4).map(|_| clock.tick().elapsed).collect();
        assert_eq!(times, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn frame_index_starts_at_zero() {
        let mut clock = SceneClock::fixed(0.5);
        assert_eq!(clock.tick().frame_index, 0);
        assert_eq!(clock.tick().frame_index, 1);
    }

    #[test]
    fn wall_clock_delta_is_clamped() {
        let min = Duration::from_millis(5);
        let max = Duration::from_millis(10);
        let mut clock = SceneClock::with_clamps(min, max);

        let ft = clock.tick();
        assert!(ft.dt >= min.as_secs_f32() && ft.dt <= max.as_secs_f32());

        std::thread::sleep(Duration::from_millis(30));
        let ft = clock.tick();
        assert!((ft.dt - max.as_secs_f32()).abs() < 1e-6);
    }

    #[test]
    fn from_step_picks_source() {
        let mut fixed = SceneClock::from_step(Some(0.01));
        assert_eq!(fixed.tick().dt, 0.01);

        let mut wall = SceneClock::from_step(None);
        assert!(wall.tick().dt > 0.0);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "invalid fixed step")]
    fn non_finite_step_is_rejected() {
        SceneClock::fixed(f32::NAN);
    }

    #[test]
    fn reset_keeps_elapsed() {
        let mut clock = SceneClock::fixed(1.0);
        clock.tick();
        clock.reset();
        assert_eq!(clock.tick().elapsed, 2.0);
    }
}
