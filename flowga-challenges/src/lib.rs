pub mod max_flow;
