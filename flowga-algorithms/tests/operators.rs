use flowga_algorithms::max_flow::genetic::adaptive::{MutationController, MAX_ADAPTIVE_RATE, MIN_ADAPTIVE_RATE};
use flowga_algorithms::max_flow::genetic::balancer::balance;
use flowga_algorithms::max_flow::genetic::crossover::{accumulate_paths, crossover};
use flowga_algorithms::max_flow::genetic::mutation::mutate;
use flowga_algorithms::max_flow::genetic::population::*;
use flowga_algorithms::max_flow::genetic::Params;
use flowga_challenges::max_flow::baselines::edmonds_karp;
use flowga_challenges::max_flow::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde_json::json;

fn build(triples: &[(NodeId, NodeId, u64)], source: NodeId, sink: NodeId) -> FlowNetwork {
    let edges: Vec<Edge> = triples.iter().map(|&t| Edge::from(t)).collect();
    FlowNetwork::new(&edges, source, sink)
}

fn diamond() -> FlowNetwork {
    build(
        &[(0, 1, 10), (0, 2, 5), (1, 2, 15), (1, 3, 5), (2, 3, 10)],
        0,
        3,
    )
}

fn chain(length: u32) -> FlowNetwork {
    let triples: Vec<(NodeId, NodeId, u64)> = (0..length).map(|i| (i, i + 1, 10)).collect();
    build(&triples, 0, length)
}

#[test]
fn test_balance_respects_capacity() {
    let challenge = Challenge::generate_instance(&[9; 32], &Difficulty::from(vec![25, 40])).unwrap();
    let network = challenge.network();
    let mut rng = SmallRng::seed_from_u64(1);
    for _ in 0..50 {
        let raw: Vec<u64> = network
            .links()
            .iter()
            .map(|link| rng.gen_range(0..=3 * link.capacity))
            .collect();
        let mut flow = Flow::from_values(raw);
        balance(&network, &mut flow);
        assert!(flow.within_capacity(&network));
    }
}

#[test]
fn test_balance_keeps_conserved_flow() {
    let network = diamond();
    let optimal = edmonds_karp::solve(&network).flow;
    let mut flow = optimal.clone();
    balance(&network, &mut flow);
    assert_eq!(flow, optimal);
}

#[test]
fn test_balance_pushes_excess_downstream() {
    let network = build(&[(0, 1, 5), (1, 2, 5)], 0, 2);
    let mut flow = Flow::from_values(vec![5, 0]);
    balance(&network, &mut flow);
    assert_eq!(flow.values(), &[5, 5]);
}

#[test]
fn test_balance_scales_down_unroutable_excess() {
    let network = build(&[(0, 1, 10), (1, 2, 4)], 0, 2);
    let mut flow = Flow::from_values(vec![10, 0]);
    balance(&network, &mut flow);
    assert_eq!(flow.values(), &[4, 4]);
}

#[test]
fn test_balance_fills_deficit_from_upstream() {
    let network = build(&[(0, 1, 10), (1, 2, 4)], 0, 2);
    let mut flow = Flow::from_values(vec![0, 4]);
    balance(&network, &mut flow);
    assert_eq!(flow.values(), &[4, 4]);
}

#[test]
fn test_balance_clamps_and_pads_raw_values() {
    let network = build(&[(0, 1, 3), (1, 2, 3), (2, 3, 3)], 0, 3);
    let mut flow = Flow::from_values(vec![9]);
    balance(&network, &mut flow);
    assert_eq!(flow.values(), &[3, 3, 3]);
}

#[test]
fn test_balance_on_deep_chains() {
    // Excess travels with the node order and settles in one round
    let long = chain(5);
    let mut forward = Flow::from_values(vec![10, 0, 0, 0, 0]);
    balance(&long, &mut forward);
    assert!(forward.is_conserved(&long));
    assert_eq!(fitness(&long, &forward), 10);

    // A deficit travels one node per round, against the node order
    let short = chain(4);
    let mut backward = Flow::from_values(vec![0, 0, 0, 10]);
    balance(&short, &mut backward);
    assert!(backward.is_conserved(&short));

    let mut backward = Flow::from_values(vec![0, 0, 0, 0, 10]);
    balance(&long, &mut backward);
    assert_eq!(backward.values(), &[0, 10, 10, 10, 10]);
    assert!(!backward.is_conserved(&long));
    assert_eq!(fitness(&long, &backward), INFEASIBLE_FITNESS);
}

#[test]
fn test_balance_failure_rate_on_long_chain() {
    let network = chain(12);
    let mut rng = SmallRng::seed_from_u64(5);
    let mut infeasible = 0;
    for _ in 0..200 {
        let flow = random_individual(&network, &mut rng);
        assert!(flow.within_capacity(&network));
        if fitness(&network, &flow) == INFEASIBLE_FITNESS {
            infeasible += 1;
        }
    }
    // Random flows on a long chain rarely survive three rounds
    assert!(infeasible > 0);
}

#[test]
fn test_fitness() {
    let network = diamond();
    let optimal = edmonds_karp::solve(&network).flow;
    assert_eq!(fitness(&network, &optimal), 15);
    assert_eq!(fitness(&network, &Flow::zeros(&network)), 0);
    assert_eq!(
        fitness(&network, &Flow::from_values(vec![5, 0, 0, 0, 0])),
        INFEASIBLE_FITNESS
    );
    // Flow circulating back into the source does not reach the sink
    let looped = build(&[(0, 1, 5), (1, 0, 5), (0, 2, 3)], 0, 2);
    assert_eq!(fitness(&looped, &Flow::from_values(vec![4, 4, 2])), 2);
}

#[test]
fn test_crossover_of_identical_parents() {
    let network = diamond();
    let mut rng = SmallRng::seed_from_u64(11);
    let parent = random_individual(&network, &mut rng);

    let single = accumulate_paths(&network, &[&parent], 2);
    let doubled = accumulate_paths(&network, &[&parent, &parent], 2);
    for e in 0..network.num_edges() {
        assert_eq!(doubled[e], 2 * single[e]);
    }

    let params = Params {
        crossover_rate: 1.0,
        ..Params::default()
    };
    for _ in 0..10 {
        let child = crossover(&network, &parent, &parent, &params, &mut rng);
        assert!(child.within_capacity(&network));
    }
}

#[test]
fn test_crossover_from_empty_parents() {
    let network = diamond();
    let zero = Flow::zeros(&network);
    let params = Params {
        crossover_rate: 1.0,
        max_paths_crossover: 2,
        ..Params::default()
    };
    let mut rng = SmallRng::seed_from_u64(0);
    // Paths 0-1-2-3 (10) and 0-1-3 (5) from each parent, clamped and balanced
    let child = crossover(&network, &zero, &zero, &params, &mut rng);
    assert_eq!(child.values(), &[10, 2, 8, 2, 10]);
    assert_eq!(fitness(&network, &child), 12);
}

#[test]
fn test_crossover_disabled_clones_a_parent() {
    let network = diamond();
    let mut rng = SmallRng::seed_from_u64(2);
    let a = random_individual(&network, &mut rng);
    let b = Flow::zeros(&network);
    let params = Params {
        crossover_rate: 0.0,
        ..Params::default()
    };
    for _ in 0..10 {
        let child = crossover(&network, &a, &b, &params, &mut rng);
        assert!(child == a || child == b);
    }
}

#[test]
fn test_mutation() {
    let network = diamond();
    let optimal = edmonds_karp::solve(&network).flow;
    let mut rng = SmallRng::seed_from_u64(3);

    let mut unchanged = optimal.clone();
    mutate(&network, &mut unchanged, 0.0, &mut rng);
    assert_eq!(unchanged, optimal);

    for _ in 0..20 {
        let mut flow = optimal.clone();
        mutate(&network, &mut flow, 1.0, &mut rng);
        assert!(flow.within_capacity(&network));
    }

    let mut empty = Flow::default();
    mutate(&network, &mut empty, 0.5, &mut rng);
    assert_eq!(empty.values().len(), network.num_edges());
}

#[test]
fn test_fixed_mutation_rate_band() {
    let high = MutationController::new(&Params {
        mutation_rate: 0.5,
        ..Params::default()
    });
    assert_eq!(high.rate(), 0.02);
    let low = MutationController::new(&Params {
        mutation_rate: 0.001,
        ..Params::default()
    });
    assert_eq!(low.rate(), 0.01);
}

#[test]
fn test_adaptive_mutation_rate() {
    let mut controller = MutationController::new(&Params {
        mutation_rate: 0.1,
        adaptive_mutation: true,
        ..Params::default()
    });
    assert_eq!(controller.rate(), 0.1);

    controller.record(true);
    assert!((controller.rate() - 0.095).abs() < 1e-12);

    for _ in 0..10 {
        controller.record(false);
    }
    assert_eq!(controller.stagnation(), 10);
    let before = controller.rate();
    controller.record(false);
    assert!((controller.rate() - before * 1.5).abs() < 1e-12);

    for _ in 0..50 {
        controller.record(false);
    }
    assert_eq!(controller.rate(), MAX_ADAPTIVE_RATE);

    for _ in 0..500 {
        controller.record(true);
    }
    assert_eq!(controller.rate(), MIN_ADAPTIVE_RATE);

    controller.reset();
    assert_eq!(controller.rate(), 0.1);
    assert_eq!(controller.stagnation(), 0);
}

#[test]
fn test_params_initialize() {
    assert_eq!(Params::initialize(&None), Params::default());

    let hyperparameters = json!({
        "population_size": 1,
        "crossover_rate": 2.0,
        "elite_count": 10,
        "adaptive_mutation": true,
    });
    let params = Params::initialize(&hyperparameters.as_object().cloned());
    assert_eq!(params.population_size, 2);
    assert_eq!(params.crossover_rate, 1.0);
    assert_eq!(params.elite_count, 2);
    assert!(params.adaptive_mutation);
    assert_eq!(params.generations, 100);

    let aliases = json!({ "pop_size": 12, "top_k": 4 });
    let params = Params::initialize(&aliases.as_object().cloned());
    assert_eq!(params.population_size, 12);
    assert_eq!(params.elite_count, 4);

    let invalid = json!({ "generations": "many" });
    assert_eq!(
        Params::initialize(&invalid.as_object().cloned()),
        Params::default()
    );
}

#[test]
fn test_initial_population() {
    let challenge = Challenge::generate_instance(&[1; 32], &Difficulty::from(vec![10, 20])).unwrap();
    let network = challenge.network();
    let mut rng = SmallRng::seed_from_u64(4);
    let population = initial_population(&network, 7, &mut rng);
    assert_eq!(population.len(), 7);
    for flow in &population {
        assert_eq!(flow.values().len(), network.num_edges());
        assert!(flow.within_capacity(&network));
    }
}

#[test]
fn test_diverse_individual_bias() {
    // No interior nodes, so balancing leaves the sampled value alone
    let network = build(&[(0, 1, 100)], 0, 1);
    let mut rng = SmallRng::seed_from_u64(6);
    for _ in 0..50 {
        let flow = diverse_individual(&network, 0.9, &mut rng);
        assert!(flow.get(0) >= 90 && flow.get(0) <= 100);
    }
    assert_eq!(diverse_individual(&network, 1.0, &mut rng).get(0), 100);
}

#[test]
fn test_tournament_and_rank() {
    let scores = [-1, 5, 3, 5, -1];
    let mut rng = SmallRng::seed_from_u64(8);
    // The whole population competes, the first best sampled wins
    let winner = tournament_select(&scores, scores.len(), &mut rng);
    assert_eq!(scores[winner], 5);
    for _ in 0..20 {
        let winner = tournament_select(&scores, 2, &mut rng);
        assert!(winner < scores.len());
    }
    assert_eq!(rank(&scores), vec![1, 3, 2, 0, 4]);
}

#[test]
fn test_top_solutions_are_padded() {
    let network = diamond();
    let population = vec![Flow::zeros(&network), edmonds_karp::solve(&network).flow];
    let scores: Vec<i64> = population.iter().map(|f| fitness(&network, f)).collect();
    let top = top_solutions(&population, &scores, &rank(&scores));
    assert_eq!(top.len(), TOP_K_REPORTED);
    assert_eq!(top[0].fitness, 15);
    assert_eq!(top[1].fitness, 0);
    assert_eq!(top[2], RankedFlow::placeholder());
    assert!(top[4].flow.is_empty());
}
