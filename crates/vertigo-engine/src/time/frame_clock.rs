/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct FrameTime {
    /// Time elapsed since the previous frame callback, in seconds.
    pub dt: f32,

    /// Host timestamp of this frame callback, in milliseconds.
    pub timestamp_ms: f64,

    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,
}

/// How the delta of the very first frame is derived.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum FirstFrame {
    /// The first frame reports `dt = 0`.
    #[default]
    Zero,

    /// The previous timestamp starts at 0, so the first frame reports the raw
    /// first timestamp as its delta. Host timestamps are usually large, so this
    /// produces a big synthetic step; kept for hosts that depend on it.
    SinceOrigin,
}

/// Clock configuration.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClockConfig {
    pub first_frame: FirstFrame,

    /// Upper bound for a single delta, in seconds. `None` (the default)
    /// reports the full gap between timestamps.
    pub max_delta: Option<f32>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            first_frame: FirstFrame::Zero,
            max_delta: None,
        }
    }
}

/// Frame clock producing `FrameTime` snapshots from host timestamps.
///
/// The host hands each frame callback a monotonically increasing timestamp in
/// milliseconds (the `requestAnimationFrame` convention); the clock turns
/// consecutive timestamps into deltas in seconds.
#[derive(Debug, Clone)]
pub struct FrameClock {
    config: ClockConfig,
    last_ms: Option<f64>,
    frame_index: u64,
}

impl FrameClock {
    pub fn new(config: ClockConfig) -> Self {
        Self {
            config,
            last_ms: None,
            frame_index: 0,
        }
    }

    /// Clock whose first delta is measured from timestamp zero.
    pub fn reference() -> Self {
        Self::new(ClockConfig {
            first_frame: FirstFrame::SinceOrigin,
            max_delta: None,
        })
    }

    pub fn config(&self) -> ClockConfig {
        self.config
    }

    /// Number of frames ticked so far.
    pub fn frames(&self) -> u64 {
        self.frame_index
    }

    /// Forgets the previous timestamp; the next tick is treated as a first frame.
    ///
    /// Useful after a scene swap or when resuming from suspension.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    /// Advances the clock to `timestamp_ms` and returns a new `FrameTime`.
    pub fn tick(&mut self, timestamp_ms: f64) -> FrameTime {
        let previous = match (self.last_ms, self.config.first_frame) {
            (Some(last), _) => last,
            (None, FirstFrame::Zero) => timestamp_ms,
            (None, FirstFrame::SinceOrigin) => 0.0,
        };

        // Timestamps that run backwards yield a zero step rather than a negative one.
        let mut dt = ((timestamp_ms - previous) * 0.001).max(0.0) as f32;
        if let Some(max) = self.config.max_delta {
            dt = dt.min(max);
        }

        self.last_ms = Some(timestamp_ms);

        let ft = FrameTime {
            dt,
            timestamp_ms,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(ClockConfig::default())
    }
}
