use anyhow::Result;
use cascade_algo::{SeedPolicy, SeedSelector};
use cascade_core::topology_stats;
use cascade_io::load_topology;

use cascade_cli::cli::StatsArgs;

pub fn handle(args: &StatsArgs) -> Result<()> {
    let topology = load_topology(&args.topology.buses, &args.topology.branches)?;
    let stats = topology_stats(&topology);

    println!("Topology statistics for {}:", args.topology.buses.display());
    println!("  Buses         : {}", stats.node_count);
    println!("  Branches      : {}", stats.edge_count);
    println!(
        "  Components    : {} (largest {})",
        stats.connected_components, stats.largest_component
    );
    println!(
        "  Degree [min/avg/max]: {}/{:.2}/{}",
        stats.min_degree, stats.avg_degree, stats.max_degree
    );
    println!("  Density       : {:.4}", stats.density);

    if topology.is_empty() || args.top == 0 {
        return Ok(());
    }

    let selector = SeedSelector::new(&topology);
    let scores = selector.betweenness();
    for policy in [SeedPolicy::HighDegree, SeedPolicy::HighBetweenness] {
        let Some(ranking) = selector.ranking(policy) else {
            continue;
        };
        println!("Top {} buses by {}:", args.top.min(ranking.len()), policy);
        for idx in ranking.into_iter().take(args.top) {
            println!(
                "  {:>8}  degree {:>4}  betweenness {:.4}",
                topology.bus_id(idx),
                topology.degree_at(idx),
                scores[idx.index()]
            );
        }
    }
    Ok(())
}
