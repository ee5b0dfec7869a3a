// ABOUTME: Injectable uniform random source for template gating and selection
// ABOUTME: Production draws from the thread RNG; tests substitute fixed or scripted sequences
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use rand::Rng;

/// Source of independent uniform draws in `[0, 1)`
pub trait RandomSource: Send + Sync {
    /// Next uniform draw in `[0, 1)`
    fn next_f64(&self) -> f64;

    /// Uniform index in `0..len`; `len` must be non-zero
    fn pick(&self, len: usize) -> usize {
        let scaled = (self.next_f64() * len as f64) as usize;
        scaled.min(len.saturating_sub(1))
    }
}

/// Draws from `rand::thread_rng`, one independent draw per call
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(f64);

    impl RandomSource for Constant {
        fn next_f64(&self) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_pick_stays_in_range() {
        assert_eq!(Constant(0.0).pick(3), 0);
        assert_eq!(Constant(0.5).pick(3), 1);
        assert_eq!(Constant(0.999_999).pick(3), 2);
    }

    #[test]
    fn test_thread_random_in_unit_interval() {
        let source = ThreadRandom;
        for _ in 0..100 {
            let draw = source.next_f64();
            assert!((0.0..1.0).contains(&draw));
        }
    }
}
