use crate::error::Error;
use crate::network::{Network, StationId};
use crate::pathfinder::{find_path, Occupancy, Path, Query, SearchMode};
use crate::schedule;
use log::*;

/// Routes handed out to the trains of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Distinct routes in discovery order.
    pub routes: Vec<Path>,
    /// Index into `routes` for every train, train 1 first.
    pub assignment: Vec<usize>,
    /// How many trains may be released per turn.
    pub concurrent: usize,
}

impl Allocation {
    pub fn num_trains(&self) -> usize {
        self.assignment.len()
    }

    pub fn route_of(&self, train: usize) -> &Path {
        &self.routes[self.assignment[train]]
    }

    fn shares_routes(&self) -> bool {
        self.routes.len() == 1 || self.routes.len() < self.num_trains()
    }

    pub fn summary(&self, network: &Network) -> String {
        self.routes
            .iter()
            .enumerate()
            .map(|(idx, route)| {
                let trains = self
                    .assignment
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| **r == idx)
                    .map(|(t, _)| format!("T{}", t + 1))
                    .collect::<Vec<_>>();
                format!(
                    "  route {} ({} hops): {}  <- {}",
                    idx + 1,
                    route.len() - 1,
                    route
                        .iter()
                        .map(|id| network.name(*id))
                        .collect::<Vec<_>>()
                        .join("-"),
                    trains.join(" ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Picks one route per train between `start` and `end`.
///
/// A greedy pass collects routes that do not share interior stations. When
/// that leaves trains sharing routes, a probe pass looks for a decomposition
/// that avoids routes as short as the first one, and whichever allocation
/// finishes in fewer turns is kept.
pub fn allocate(
    network: &Network,
    start: StationId,
    end: StationId,
    mode: SearchMode,
    trains: usize,
) -> Result<Allocation, Error> {
    let _h = hprof::enter("allocate");
    if trains == 0 {
        return Err(Error::InvalidTrainCount);
    }

    let base = Query::new(start, end, mode);
    let greedy = discover(network, &base, trains).ok_or(Error::NoPathFound)?;
    debug!(
        "Greedy pass found {} route(s) for {} train(s)",
        greedy.routes.len(),
        trains
    );
    if !greedy.shares_routes() {
        return Ok(greedy);
    }

    let probe_query = Query {
        baseline_len: Some(greedy.routes[0].len()),
        ..base
    };
    let probe = match discover(network, &probe_query, trains) {
        Some(probe) if probe.routes.len() > 1 => probe,
        _ => {
            debug!("Probe pass found no alternative decomposition");
            return Ok(greedy);
        }
    };

    let greedy_turns = schedule::count_turns(&greedy);
    let probe_turns = schedule::count_turns(&probe);
    debug!(
        "Greedy allocation takes {} turns, probe allocation with {} routes takes {}",
        greedy_turns,
        probe.routes.len(),
        probe_turns
    );
    if prefer_probe(greedy_turns, probe_turns) {
        Ok(probe)
    } else {
        Ok(greedy)
    }
}

/// The probe allocation replaces the greedy one only if it is strictly
/// faster; equal turn counts keep the greedy routes.
pub fn prefer_probe(greedy_turns: usize, probe_turns: usize) -> bool {
    probe_turns < greedy_turns
}

/// One allocation pass with its own occupancy. `None` when not even a first
/// route exists.
fn discover(network: &Network, query: &Query, trains: usize) -> Option<Allocation> {
    let mut occupancy = Occupancy::new(network.len());
    let first = find_path(network, query, &mut occupancy)?;
    let base_len = first.len();
    let query = Query {
        direct_taken: base_len == 2,
        ..*query
    };

    let mut routes = vec![first];
    let mut remaining = trains - 1;
    while remaining > 0 {
        match find_path(network, &query, &mut occupancy) {
            Some(path) if extra_hops(path.len(), base_len) < remaining as isize => {
                trace!("Accepted route with {} stations", path.len());
                routes.push(path);
                remaining -= 1;
            }
            Some(path) => {
                trace!(
                    "Route with {} stations is too long for {} remaining train(s)",
                    path.len(),
                    remaining
                );
                break;
            }
            None => break,
        }
    }

    let route_lens = routes.iter().map(|r| r.len()).collect::<Vec<_>>();
    let mut assignment = (0..routes.len()).collect::<Vec<_>>();
    assignment.extend(rotate_remaining(&route_lens, remaining));

    Some(Allocation {
        concurrent: routes.len(),
        routes,
        assignment,
    })
}

fn extra_hops(len: usize, base_len: usize) -> isize {
    len as isize - base_len as isize
}

/// Hands the trains that did not get a route of their own to the known
/// routes in turn. A route is skipped while its detour is not shorter than the
/// number of trains still waiting; that train takes the first route and the
/// rotation starts over.
fn rotate_remaining(route_lens: &[usize], remaining: usize) -> Vec<usize> {
    let base_len = route_lens[0];
    let mut next = 0;
    let mut out = Vec::with_capacity(remaining);
    for waiting in (1..=remaining).rev() {
        if extra_hops(route_lens[next], base_len) < waiting as isize {
            out.push(next);
            next = (next + 1) % route_lens.len();
        } else {
            out.push(0);
            next = 0;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{parse, tests::LONDON};

    fn alloc(text: &str, start: &str, end: &str, trains: usize) -> (Network, Allocation) {
        let network = parse(text).unwrap();
        let allocation = allocate(
            &network,
            network.lookup(start).unwrap(),
            network.lookup(end).unwrap(),
            SearchMode::Uniform,
            trains,
        )
        .unwrap();
        (network, allocation)
    }

    #[test]
    fn disjoint_routes_for_two_trains() {
        let (_, allocation) = alloc(LONDON, "waterloo", "st_pancras", 2);
        assert_eq!(allocation.routes.len(), 2);
        assert_eq!(allocation.assignment, vec![0, 1]);
        assert_eq!(allocation.concurrent, 2);
    }

    #[test]
    fn single_train_takes_the_shortest_route() {
        let (network, allocation) = alloc(LONDON, "waterloo", "st_pancras", 1);
        assert_eq!(allocation.concurrent, 1);
        assert_eq!(allocation.route_of(0).len(), 3);
        assert_eq!(network.name(allocation.route_of(0)[1]), "victoria");
    }

    #[test]
    fn chain_shares_its_only_route() {
        let text = "stations:\na,0,0\nb,0,1\nc,0,2\nconnections:\na-b\nb-c\n";
        let (_, allocation) = alloc(text, "a", "c", 4);
        assert_eq!(allocation.routes.len(), 1);
        assert_eq!(allocation.assignment, vec![0; 4]);
        assert_eq!(allocation.concurrent, 1);
    }

    #[test]
    fn long_detours_only_pay_off_for_many_trains() {
        let text = "stations:
s,0,0
e,1,0
d1,0,1
d2,0,2
d3,1,2
connections:
s-e
s-d1
d1-d2
d2-d3
d3-e
";
        let (_, few) = alloc(text, "s", "e", 3);
        assert_eq!(few.routes.len(), 1);
        assert_eq!(few.assignment, vec![0, 0, 0]);

        let (_, many) = alloc(text, "s", "e", 6);
        assert_eq!(many.routes.len(), 2);
        assert_eq!(many.routes[1].len(), 5);
        assert_eq!(many.concurrent, 2);
        assert_eq!(many.num_trains(), 6);
    }

    #[test]
    fn rotation_falls_back_to_the_first_route() {
        assert_eq!(rotate_remaining(&[5, 6], 8), vec![0, 1, 0, 1, 0, 1, 0, 0]);
        assert_eq!(rotate_remaining(&[2, 4], 4), vec![0, 1, 0, 0]);
        assert_eq!(rotate_remaining(&[3], 3), vec![0, 0, 0]);
        assert!(rotate_remaining(&[3, 3], 0).is_empty());
    }

    #[test]
    fn probe_policy_breaks_ties_for_greedy() {
        assert!(prefer_probe(9, 8));
        assert!(!prefer_probe(8, 8));
        assert!(!prefer_probe(7, 8));
    }

    #[test]
    fn probe_replaces_a_slower_greedy_allocation() {
        let text = "stations:
jungle,5,16
green_belt,6,1
village,5,7
mountain,9,16
treetop,0,4
grasslands,15,13
suburbs,4,9
clouds,0,0
wetlands,2,12
farms,11,10
downtown,4,4
metropolis,3,20
industrial,1,18
desert,9,0

connections:
jungle-grasslands
mountain-treetop
clouds-wetlands
downtown-metropolis
green_belt-village
suburbs-clouds
industrial-desert
jungle-farms
village-mountain
wetlands-desert
grasslands-suburbs
jungle-green_belt
farms-downtown
treetop-desert
metropolis-industrial
mountain-wetlands
farms-mountain
";
        let (_, allocation) = alloc(text, "jungle", "desert", 10);
        assert_eq!(allocation.concurrent, 3);
        assert!(allocation.routes.iter().all(|r| r.len() == 6));
        assert_eq!(schedule::count_turns(&allocation), 8);
    }

    #[test]
    fn unreachable_end_is_an_error() {
        let network = parse("stations:\na,0,0\nb,1,1\nconnections:\n").unwrap();
        let err = allocate(&network, 0, 1, SearchMode::Uniform, 3).unwrap_err();
        assert_eq!(err.to_string(), "no path found");
    }
}
