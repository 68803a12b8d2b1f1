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

use num_traits::ToPrimitive;

/// `round(100 × part / whole)`, or 0 when `whole` is zero.
pub fn percent<T: ToPrimitive>(part: T, whole: T) -> u32 {
    let (Some(part), Some(whole)) = (part.to_f64(), whole.to_f64()) else {
        return 0;
    };
    if whole <= 0.0 {
        return 0;
    }
    (part / whole * 100.0).round().max(0.0) as u32
}

/// `round(sum / count)`, or 0 for an empty sample.
pub fn rounded_mean<T: ToPrimitive>(sum: T, count: usize) -> u64 {
    if count == 0 {
        return 0;
    }
    let sum = sum.to_f64().unwrap_or(0.0);
    (sum / count as f64).round().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(percent(1u32, 8u32), 13);
        assert_eq!(percent(1u32, 3u32), 33);
        assert_eq!(percent(2u32, 3u32), 67);
    }

    #[test]
    fn test_percent_of_empty_whole_is_zero() {
        assert_eq!(percent(0usize, 0usize), 0);
    }

    #[test]
    fn test_rounded_mean() {
        assert_eq!(rounded_mean(5u64, 2), 3);
        assert_eq!(rounded_mean(4u64, 3), 1);
        assert_eq!(rounded_mean(10u64, 0), 0);
    }
}
