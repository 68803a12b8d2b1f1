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

use super::err::WorkloadConfigBuildError;
use rand::Rng;
use std::fmt::Display;

/// Relative frequency of each action kind after the initial registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionWeights {
    pub register: u32,
    pub request: u32,
    pub occupy: u32,
    pub release: u32,
    pub cancel: u32,
    pub rollback: u32,
    pub advance: u32,
}

impl ActionWeights {
    #[inline]
    pub fn total(&self) -> u32 {
        self.register
            + self.request
            + self.occupy
            + self.release
            + self.cancel
            + self.rollback
            + self.advance
    }
}

impl Default for ActionWeights {
    fn default() -> Self {
        Self {
            register: 5,
            request: 30,
            occupy: 20,
            release: 15,
            cancel: 5,
            rollback: 5,
            advance: 20,
        }
    }
}

/// Configuration for a synthetic parking workload.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadConfig {
    pub(crate) initial_vehicles: usize,
    pub(crate) steps: usize,
    pub(crate) weights: ActionWeights,
    pub(crate) max_rollback: usize,
    pub(crate) max_advance_secs: u32,
    pub(crate) seed: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            initial_vehicles: 40,
            steps: 400,
            weights: ActionWeights::default(),
            max_rollback: 3,
            max_advance_secs: 1800,
            seed: 42,
        }
    }
}

impl WorkloadConfig {
    #[inline]
    pub fn initial_vehicles(&self) -> usize {
        self.initial_vehicles
    }

    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    #[inline]
    pub fn weights(&self) -> &ActionWeights {
        &self.weights
    }

    #[inline]
    pub fn max_rollback(&self) -> usize {
        self.max_rollback
    }

    #[inline]
    pub fn max_advance_secs(&self) -> u32 {
        self.max_advance_secs
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Total number of actions the generator will emit.
    #[inline]
    pub fn len(&self) -> usize {
        self.initial_vehicles + self.steps
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Display for WorkloadConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorkloadConfig {{ initial_vehicles: {}, steps: {}, max_rollback: {}, \
             max_advance_secs: {}, seed: {} }}",
            self.initial_vehicles, self.steps, self.max_rollback, self.max_advance_secs, self.seed
        )
    }
}

/// Builder for `WorkloadConfig`.
pub struct WorkloadConfigBuilder {
    initial_vehicles: usize,
    steps: usize,
    weights: ActionWeights,
    max_rollback: usize,
    max_advance_secs: u32,
    seed: u64,
}

impl Default for WorkloadConfigBuilder {
    fn default() -> Self {
        let defaults = WorkloadConfig::default();
        Self {
            initial_vehicles: defaults.initial_vehicles,
            steps: defaults.steps,
            weights: defaults.weights,
            max_rollback: defaults.max_rollback,
            max_advance_secs: defaults.max_advance_secs,
            seed: rand::rng().random(),
        }
    }
}

impl WorkloadConfigBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn initial_vehicles(mut self, v: usize) -> Self {
        self.initial_vehicles = v;
        self
    }

    #[inline]
    pub fn steps(mut self, v: usize) -> Self {
        self.steps = v;
        self
    }

    #[inline]
    pub fn weights(mut self, v: ActionWeights) -> Self {
        self.weights = v;
        self
    }

    #[inline]
    pub fn max_rollback(mut self, v: usize) -> Self {
        self.max_rollback = v;
        self
    }

    #[inline]
    pub fn max_advance_secs(mut self, v: u32) -> Self {
        self.max_advance_secs = v;
        self
    }

    #[inline]
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    pub fn build(self) -> Result<WorkloadConfig, WorkloadConfigBuildError> {
        if self.weights.total() == 0 {
            return Err(WorkloadConfigBuildError::ZeroTotalWeight);
        }
        if self.initial_vehicles == 0 && self.weights.register == 0 {
            return Err(WorkloadConfigBuildError::NoVehicles);
        }
        if self.weights.rollback > 0 && self.max_rollback == 0 {
            return Err(WorkloadConfigBuildError::ZeroRollbackDepth);
        }
        if self.weights.advance > 0 && self.max_advance_secs == 0 {
            return Err(WorkloadConfigBuildError::ZeroAdvanceBound);
        }

        Ok(WorkloadConfig {
            initial_vehicles: self.initial_vehicles,
            steps: self.steps,
            weights: self.weights,
            max_rollback: self.max_rollback,
            max_advance_secs: self.max_advance_secs,
            seed: self.seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_are_valid() {
        let cfg = WorkloadConfigBuilder::new().seed(7).build().unwrap();
        assert_eq!(cfg.seed(), 7);
        assert_eq!(cfg.len(), 440);
    }

    #[test]
    fn test_builder_rejects_degenerate_settings() {
        let silent = ActionWeights {
            register: 0,
            request: 0,
            occupy: 0,
            release: 0,
            cancel: 0,
            rollback: 0,
            advance: 0,
        };
        assert_eq!(
            WorkloadConfigBuilder::new().weights(silent).build(),
            Err(WorkloadConfigBuildError::ZeroTotalWeight)
        );

        let no_register = ActionWeights {
            register: 0,
            ..ActionWeights::default()
        };
        assert_eq!(
            WorkloadConfigBuilder::new()
                .initial_vehicles(0)
                .weights(no_register)
                .build(),
            Err(WorkloadConfigBuildError::NoVehicles)
        );

        assert_eq!(
            WorkloadConfigBuilder::new().max_rollback(0).build(),
            Err(WorkloadConfigBuildError::ZeroRollbackDepth)
        );
        assert_eq!(
            WorkloadConfigBuilder::new().max_advance_secs(0).build(),
            Err(WorkloadConfigBuildError::ZeroAdvanceBound)
        );
    }
}
