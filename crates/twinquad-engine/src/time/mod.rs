//! Scene timing.
//!
//! One `SceneClock` drives every backend so they animate in lockstep:
//! call `tick()` once per loop iteration and hand the same `FrameTime` to all.

mod scene_clock;

pub use scene_clock::{FrameTime, SceneClock};
