pub mod edmonds_karp;
pub use edmonds_karp::{EdmondsKarp, MaxFlowResult};
