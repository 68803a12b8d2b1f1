// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use chrono::{FixedOffset, Offset, Utc};
use park_alloc_core::penalty::Penalty;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationConfig {
    /// Base cost of leaving the preferred zone, before the zone multiplier.
    pub base_penalty: Penalty,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            base_penalty: Penalty::new(10.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RollbackConfig {
    /// Operations kept for undo. The oldest is dropped once this is exceeded.
    pub capacity: usize,
}

impl Default for RollbackConfig {
    fn default() -> Self {
        Self { capacity: 1_000 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    pub peak_zone_limit: usize,
    /// Offset used to bucket request creation times by hour of day.
    pub hour_offset: FixedOffset,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            peak_zone_limit: 5,
            hour_offset: Utc.fix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SystemConfig {
    pub alloc: AllocationConfig,
    pub rollback: RollbackConfig,
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigBuildError {
    InvalidBasePenalty(f64),
    ZeroRollbackCapacity,
    ZeroPeakZoneLimit,
    InvalidHourOffset(i32),
}

impl Display for ConfigBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ConfigBuildError::*;
        match self {
            InvalidBasePenalty(v) => {
                write!(f, "Base penalty {} must be a finite, non-negative number", v)
            }
            ZeroRollbackCapacity => write!(f, "Rollback capacity must be positive"),
            ZeroPeakZoneLimit => write!(f, "Peak zone limit must be positive"),
            InvalidHourOffset(secs) => write!(f, "Hour offset of {}s is out of range", secs),
        }
    }
}

impl std::error::Error for ConfigBuildError {}

/// Builder for `SystemConfig`.
pub struct SystemConfigBuilder {
    base_penalty: f64,
    rollback_capacity: usize,
    peak_zone_limit: usize,
    hour_offset_secs: i32,
}

impl Default for SystemConfigBuilder {
    fn default() -> Self {
        Self {
            base_penalty: 10.0,
            rollback_capacity: 1_000,
            peak_zone_limit: 5,
            hour_offset_secs: 0,
        }
    }
}

impl SystemConfigBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn base_penalty(mut self, v: f64) -> Self {
        self.base_penalty = v;
        self
    }

    #[inline]
    pub fn rollback_capacity(mut self, v: usize) -> Self {
        self.rollback_capacity = v;
        self
    }

    #[inline]
    pub fn peak_zone_limit(mut self, v: usize) -> Self {
        self.peak_zone_limit = v;
        self
    }

    /// East-of-UTC offset in seconds for the hourly histogram.
    #[inline]
    pub fn hour_offset_secs(mut self, v: i32) -> Self {
        self.hour_offset_secs = v;
        self
    }

    pub fn build(self) -> Result<SystemConfig, ConfigBuildError> {
        if !self.base_penalty.is_finite() || self.base_penalty < 0.0 {
            return Err(ConfigBuildError::InvalidBasePenalty(self.base_penalty));
        }
        if self.rollback_capacity == 0 {
            return Err(ConfigBuildError::ZeroRollbackCapacity);
        }
        if self.peak_zone_limit == 0 {
            return Err(ConfigBuildError::ZeroPeakZoneLimit);
        }
        let hour_offset = FixedOffset::east_opt(self.hour_offset_secs)
            .ok_or(ConfigBuildError::InvalidHourOffset(self.hour_offset_secs))?;

        Ok(SystemConfig {
            alloc: AllocationConfig {
                base_penalty: Penalty::new(self.base_penalty),
            },
            rollback: RollbackConfig {
                capacity: self.rollback_capacity,
            },
            analytics: AnalyticsConfig {
                peak_zone_limit: self.peak_zone_limit,
                hour_offset,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_matches_defaults() {
        let built = SystemConfigBuilder::new().build().unwrap();
        assert_eq!(built, SystemConfig::default());
        assert_eq!(built.alloc.base_penalty.value(), 10.0);
        assert_eq!(built.rollback.capacity, 1_000);
        assert_eq!(built.analytics.peak_zone_limit, 5);
    }

    #[test]
    fn test_builder_validation() {
        assert_eq!(
            SystemConfigBuilder::new().base_penalty(-1.0).build(),
            Err(ConfigBuildError::InvalidBasePenalty(-1.0))
        );
        assert!(matches!(
            SystemConfigBuilder::new().base_penalty(f64::NAN).build(),
            Err(ConfigBuildError::InvalidBasePenalty(_))
        ));
        assert_eq!(
            SystemConfigBuilder::new().rollback_capacity(0).build(),
            Err(ConfigBuildError::ZeroRollbackCapacity)
        );
        assert_eq!(
            SystemConfigBuilder::new().peak_zone_limit(0).build(),
            Err(ConfigBuildError::ZeroPeakZoneLimit)
        );
        assert_eq!(
            SystemConfigBuilder::new().hour_offset_secs(90_000).build(),
            Err(ConfigBuildError::InvalidHourOffset(90_000))
        );
    }

    #[test]
    fn test_zero_base_penalty_is_allowed() {
        let cfg = SystemConfigBuilder::new().base_penalty(0.0).build().unwrap();
        assert_eq!(cfg.alloc.base_penalty.value(), 0.0);
    }
}
