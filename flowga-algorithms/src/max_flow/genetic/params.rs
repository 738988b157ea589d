use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Params {
    /// Number of individuals in every generation
    /// At least 2
    pub population_size: usize,

    /// Number of generations before the run stops on its own
    pub generations: usize,

    /// Per-edge probability of resampling an edge during mutation
    /// Without adaptive mutation the effective rate is kept within [0.01, 0.02]
    pub mutation_rate: f64,

    /// Probability that two parents are recombined instead of cloned
    /// Keep in [0, 1]
    pub crossover_rate: f64,

    /// Number of best individuals copied unchanged into the next generation
    pub elite_count: usize,

    /// Number of augmenting paths extracted from each parent during crossover
    /// Keep between 1 and 5, larger values make crossover much slower
    pub max_paths_crossover: usize,

    /// Number of individuals competing in each tournament
    /// Parents are picked uniformly when the population is not larger than this
    pub tournament_size: usize,

    /// Raises the mutation rate during stagnation and lowers it otherwise
    pub adaptive_mutation: bool,

    /// Periodically replaces a few non-elite individuals with freshly biased ones
    pub fresh_immigrants: bool,

    /// Number of generations between population traces
    /// Only impacts logging but not algorithm behavior
    pub nb_gen_traces: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            population_size: 30,
            generations: 100,
            mutation_rate: 0.03,
            crossover_rate: 0.8,
            elite_count: 3,
            max_paths_crossover: 2,
            tournament_size: 3,
            adaptive_mutation: false,
            fresh_immigrants: false,
            nb_gen_traces: 10,
        }
    }
}

/// Alternative spellings accepted for some hyperparameters.
const ALIASES: [(&str, &str); 3] = [
    ("pop_size", "population_size"),
    ("top_k", "elite_count"),
    ("max_generations", "generations"),
];

impl Params {
    /// Initialize with defaults()
    /// Then update any user-provided key and clamp values into their valid ranges
    pub fn initialize(hyperparameters: &Option<Map<String, Value>>) -> Self {
        let mut merged_params =
            serde_json::to_value(Self::default()).unwrap_or_else(|_| Value::Object(Map::new()));
        if let (Value::Object(ref mut obj), Some(map)) = (&mut merged_params, hyperparameters) {
            for (k, v) in map {
                let key = ALIASES
                    .iter()
                    .find(|(alias, _)| alias == k)
                    .map_or(k.as_str(), |(_, name)| *name);
                obj.insert(key.to_string(), v.clone());
            }
        }

        if let Value::Object(ref map) = merged_params {
            for (k, v) in map {
                debug!("{:25} is set to {}", k, v);
            }
        }

        // If anything is off, fall back to defaults
        serde_json::from_value::<Self>(merged_params)
            .unwrap_or_default()
            .sanitized()
    }

    pub fn sanitized(mut self) -> Self {
        self.population_size = self.population_size.max(2);
        self.elite_count = self.elite_count.min(self.population_size);
        self.mutation_rate = self.mutation_rate.clamp(0.0, 1.0);
        self.crossover_rate = self.crossover_rate.clamp(0.0, 1.0);
        self.nb_gen_traces = self.nb_gen_traces.max(1);
        self
    }
}
