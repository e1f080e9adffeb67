// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rolling pacing metrics and grading.

use alloc::string::String;

use cadence_core::policy::PacingMode;

/// Per-frame metrics sample fed into [`PacingTracker::observe`].
#[derive(Clone, Copy, Debug)]
pub struct PacingSample {
    /// Pacing policy of the observed output.
    pub mode: PacingMode,
    /// Interval since the previous presented frame, in ms.
    pub delta_ms: f64,
    /// Nominal refresh interval, in ms.
    pub target_ms: f64,
    /// The frame missed its vblank (delayed-frame machinery engaged).
    pub missed: bool,
}

/// Letter grade for pacing quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacingGrade {
    /// Tight cadence and low miss rate.
    A,
    /// Good cadence with moderate misses.
    B,
    /// Degraded but usable.
    C,
    /// Visibly broken pacing.
    D,
}

impl PacingGrade {
    /// Returns a short label for HUD rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// Aggregated report returned by [`PacingTracker::observe`].
#[derive(Clone, Copy, Debug)]
pub struct PacingReport {
    /// Current grade.
    pub grade: PacingGrade,
    /// Misses per 1000 observed frames.
    pub miss_rate_per_1000: f64,
    /// Current frame's absolute cadence error in milliseconds.
    pub cadence_error_ms: f64,
    /// Total frames observed.
    pub total_frames: u64,
    /// Total misses observed.
    pub missed_frames: u64,
}

/// Rolling pacing tracker with fixed-size frame-delta history.
#[derive(Debug)]
pub struct PacingTracker<const N: usize> {
    deltas_ms: [f64; N],
    cursor: usize,
    total_frames: u64,
    missed_frames: u64,
}

impl<const N: usize> Default for PacingTracker<N> {
    fn default() -> Self {
        Self::new(16.67)
    }
}

impl<const N: usize> PacingTracker<N> {
    /// Creates a tracker with `seed_delta_ms` prefilled in the ring buffer.
    #[must_use]
    pub const fn new(seed_delta_ms: f64) -> Self {
        Self {
            deltas_ms: [seed_delta_ms; N],
            cursor: 0,
            total_frames: 0,
            missed_frames: 0,
        }
    }

    /// Observes one frame and returns an updated report.
    #[must_use]
    pub fn observe(&mut self, sample: PacingSample) -> PacingReport {
        self.total_frames = self.total_frames.saturating_add(1);
        self.deltas_ms[self.cursor % N] = sample.delta_ms;
        self.cursor = (self.cursor + 1) % N;

        if sample.missed {
            self.missed_frames = self.missed_frames.saturating_add(1);
        }

        let miss_rate = if self.total_frames == 0 {
            0.0
        } else {
            self.missed_frames as f64 * 1000.0 / self.total_frames as f64
        };

        let cadence_error = (sample.delta_ms - sample.target_ms).abs();
        let grade = grade_for(sample.mode, cadence_error, miss_rate);

        PacingReport {
            grade,
            miss_rate_per_1000: miss_rate,
            cadence_error_ms: cadence_error,
            total_frames: self.total_frames,
            missed_frames: self.missed_frames,
        }
    }

    /// Returns ring-buffer frame deltas oldest→newest.
    #[must_use]
    pub fn frame_deltas(&self) -> [f64; N] {
        let mut out = [0.0; N];
        let mut i = 0;
        while i < N {
            let idx = (self.cursor + i) % N;
            out[i] = self.deltas_ms[idx];
            i += 1;
        }
        out
    }

    /// Returns an ASCII sparkline over `frame_deltas()`.
    #[must_use]
    pub fn sparkline_ascii(&self, min_ms: f64, max_ms: f64) -> String {
        const LEVELS: &[u8] = b" .:-=+*#%@";
        let mut out = String::with_capacity(N);
        let mut i = 0;
        while i < N {
            let idx = (self.cursor + i) % N;
            let v = self.deltas_ms[idx].clamp(min_ms, max_ms);
            let t = (v - min_ms) / (max_ms - min_ms);
            #[expect(
                clippy::cast_possible_truncation,
                reason = "index is clamped to ASCII level count"
            )]
            let level = (t * (LEVELS.len() as f64 - 1.0) + 0.5) as usize;
            out.push(LEVELS[level] as char);
            i += 1;
        }
        out
    }
}

fn grade_for(mode: PacingMode, cadence_error_ms: f64, miss_rate_per_1000: f64) -> PacingGrade {
    // Fenced outputs promise deadline-driven pacing; hold them to tighter
    // thresholds than tick-paced ones.
    let (a_err, b_err, c_err, a_miss, b_miss, c_miss) = match mode {
        PacingMode::Fenced => (2.0, 5.0, 10.0, 1.0, 5.0, 15.0),
        PacingMode::Legacy => (6.0, 12.0, 25.0, 10.0, 30.0, 80.0),
    };

    if cadence_error_ms < a_err && miss_rate_per_1000 < a_miss {
        PacingGrade::A
    } else if cadence_error_ms < b_err && miss_rate_per_1000 < b_miss {
        PacingGrade::B
    } else if cadence_error_ms < c_err && miss_rate_per_1000 < c_miss {
        PacingGrade::C
    } else {
        PacingGrade::D
    }
}
