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

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadConfigBuildError {
    /// Every action weight is zero, so nothing could ever be drawn.
    ZeroTotalWeight,
    NoVehicles,
    ZeroRollbackDepth,
    ZeroAdvanceBound,
}

impl Display for WorkloadConfigBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use WorkloadConfigBuildError::*;
        match self {
            ZeroTotalWeight => write!(f, "At least one action weight must be positive"),
            NoVehicles => write!(f, "Workload needs at least one vehicle"),
            ZeroRollbackDepth => write!(f, "max_rollback must be positive when rollbacks are drawn"),
            ZeroAdvanceBound => write!(f, "max_advance_secs must be positive"),
        }
    }
}

impl std::error::Error for WorkloadConfigBuildError {}
