// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! POSIX host glue for cadence.
//!
//! This crate provides the platform half of the scheduler's collaborator
//! contracts on Linux-class systems:
//!
//! - [`now`] — monotonic nanosecond host time via `clock_gettime`
//! - [`PosixTimerHost`] — a `timerfd`-backed
//!   [`TimerHost`](cadence_core::timer::TimerHost) whose fds plug into any
//!   poll-based compositor event loop

mod time;
mod timerfd;

pub use time::now;
pub use timerfd::{PosixTimerHost, TimerExpiry};
