use super::params::Params;

/// Stagnant generations tolerated before the mutation rate starts growing.
pub const STAGNATION_LIMIT: usize = 10;
pub const MAX_ADAPTIVE_RATE: f64 = 0.3;
pub const MIN_ADAPTIVE_RATE: f64 = 0.001;
const EXPLORE_FACTOR: f64 = 1.5;
const EXPLOIT_FACTOR: f64 = 0.95;

/// Fixed-rate mode keeps the effective rate inside this band.
pub const FIXED_RATE_BAND: (f64, f64) = (0.01, 0.02);

#[derive(Debug, Clone, PartialEq)]
pub struct MutationController {
    base_rate: f64,
    adaptive: bool,
    current_rate: f64,
    stagnation: usize,
}

impl MutationController {
    pub fn new(params: &Params) -> Self {
        Self {
            base_rate: params.mutation_rate,
            adaptive: params.adaptive_mutation,
            current_rate: params.mutation_rate,
            stagnation: 0,
        }
    }

    pub fn reset(&mut self) {
        self.current_rate = self.base_rate;
        self.stagnation = 0;
    }

    pub fn stagnation(&self) -> usize {
        self.stagnation
    }

    /// Rate used by the mutation operator.
    pub fn rate(&self) -> f64 {
        if self.adaptive {
            self.current_rate
        } else {
            self.base_rate.clamp(FIXED_RATE_BAND.0, FIXED_RATE_BAND.1)
        }
    }

    /// Records whether the generation strictly improved the global best and,
    /// in adaptive mode, moves the rate: up while stagnating for more than
    /// [`STAGNATION_LIMIT`] generations, down otherwise.
    pub fn record(&mut self, improved: bool) {
        if improved {
            self.stagnation = 0;
        } else {
            self.stagnation += 1;
        }
        if !self.adaptive {
            return;
        }
        self.current_rate = if self.stagnation > STAGNATION_LIMIT {
            (self.current_rate * EXPLORE_FACTOR).min(MAX_ADAPTIVE_RATE)
        } else {
            (self.current_rate * EXPLOIT_FACTOR).max(MIN_ADAPTIVE_RATE)
        };
    }
}
