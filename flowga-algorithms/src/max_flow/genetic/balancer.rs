use flowga_challenges::max_flow::{Flow, FlowNetwork};

/// Number of relaxation sweeps over the interior nodes.
pub const BALANCE_ROUNDS: usize = 3;

/// Projects an arbitrary assignment onto the capacity box and then tries to
/// restore conservation at interior nodes.
///
/// Every edge is first clamped to `[0, capacity]`. Each round then visits the
/// interior nodes in index order. A node with more inflow than outflow pushes
/// the excess onto its outgoing edges up to their spare capacity; whatever is
/// left is removed by scaling all incoming edges by
/// `(inflow - remaining) / inflow`, truncated. A deficit is handled the same
/// way with the roles of incoming and outgoing edges swapped.
///
/// The result always respects capacities. Conservation is not guaranteed:
/// long chains can need more rounds than are run, and those flows are left
/// for the fitness function to reject.
pub fn balance(network: &FlowNetwork, flow: &mut Flow) {
    if flow.values().len() != network.num_edges() {
        let mut values = flow.values().to_vec();
        values.resize(network.num_edges(), 0);
        *flow = Flow::from_values(values);
    }
    let values = flow.values_mut();
    for (e, value) in values.iter_mut().enumerate() {
        *value = (*value).min(network.capacity(e));
    }

    for _ in 0..BALANCE_ROUNDS {
        for node in network.interior_nodes() {
            let inflow = total(values, network.incoming(node));
            let outflow = total(values, network.outgoing(node));
            if inflow > outflow {
                relax(
                    network,
                    values,
                    network.outgoing(node),
                    network.incoming(node),
                    inflow - outflow,
                );
            } else if outflow > inflow {
                relax(
                    network,
                    values,
                    network.incoming(node),
                    network.outgoing(node),
                    outflow - inflow,
                );
            }
        }
    }
}

/// Absorbs `amount` by raising `raise` edges, then shrinks `shrink` edges
/// proportionally by whatever could not be absorbed.
fn relax(network: &FlowNetwork, values: &mut [u64], raise: &[usize], shrink: &[usize], amount: u64) {
    let mut remaining = amount;
    for &e in raise {
        let space = network.capacity(e) - values[e];
        if space > 0 {
            let adjustment = space.min(remaining);
            values[e] += adjustment;
            remaining -= adjustment;
            if remaining == 0 {
                return;
            }
        }
    }

    let current = total(values, shrink);
    if current > 0 {
        let kept = current.saturating_sub(remaining) as u128;
        for &e in shrink {
            values[e] = (values[e] as u128 * kept / current as u128) as u64;
        }
    }
}

fn total(values: &[u64], edges: &[usize]) -> u64 {
    edges
        .iter()
        .fold(0u64, |sum, &e| sum.saturating_add(values[e]))
}
