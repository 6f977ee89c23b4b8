use crate::allocator::Allocation;
use crate::network::{Network, StationId};
use log::*;
use serde_json::json;
use std::path::Path;

/// 1-based train number as printed.
pub type TrainId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    NotDeparted,
    At(usize),
    Arrived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub train: TrainId,
    pub station: StationId,
}

#[derive(serde::Serialize)]
struct MoveRecord<'a> {
    train: TrainId,
    station: &'a str,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Schedule {
    /// Moves made in each turn, in train order. Turns without moves are not
    /// recorded.
    pub turns: Vec<Vec<Move>>,
}

/// Runs all trains of `allocation` to the end station.
///
/// Trains are released `concurrent` at a time, one batch per turn. Each turn
/// every released train advances one station unless another train has
/// travelled the exact same stations so far, in which case it waits.
pub fn run(allocation: &Allocation) -> Schedule {
    let num_trains = allocation.num_trains();
    let batch = allocation.concurrent.max(1);
    let mut cursors = vec![Cursor::NotDeparted; num_trains];
    let mut released = batch.min(num_trains);
    let mut schedule = Schedule::default();

    for turn in 0.. {
        if turn > 0 {
            released = (released + batch).min(num_trains);
        }

        let mut moves = Vec::new();
        for train in 0..released {
            let route = allocation.route_of(train);
            let next = match cursors[train] {
                Cursor::Arrived => continue,
                Cursor::NotDeparted => 1,
                Cursor::At(idx) => idx + 1,
            };
            if next >= route.len() {
                cursors[train] = Cursor::Arrived;
                continue;
            }
            if shadows_other_train(allocation, &cursors, train, next) {
                trace!("T{} waits in turn {}", train + 1, turn + 1);
                continue;
            }
            cursors[train] = Cursor::At(next);
            moves.push(Move {
                train: train + 1,
                station: route[next],
            });
        }

        if moves.is_empty() {
            break;
        }
        schedule.turns.push(moves);
    }

    schedule
}

/// Would moving `train` to `next` give it the same station history as some
/// other train on the network?
fn shadows_other_train(allocation: &Allocation, cursors: &[Cursor], train: usize, next: usize) -> bool {
    let history = &allocation.route_of(train)[..=next];
    cursors.iter().enumerate().any(|(other, cursor)| {
        other != train
            && *cursor == Cursor::At(next)
            && &allocation.route_of(other)[..=next] == history
    })
}

pub fn count_turns(allocation: &Allocation) -> usize {
    let _p = hprof::enter("count turns");
    run(allocation).turns.len()
}

pub fn format_turn(network: &Network, moves: &[Move]) -> String {
    moves
        .iter()
        .map(|m| format!("T{}-{}", m.train, network.name(m.station)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The schedule as printed on stdout, one line per turn.
pub fn print_schedule(network: &Network, schedule: &Schedule) -> String {
    let mut out = String::new();
    for moves in schedule.turns.iter() {
        out.push_str(&format_turn(network, moves));
        out.push('\n');
    }
    out
}

pub fn write_plan_json(
    filename: &Path,
    network: &Network,
    allocation: &Allocation,
    schedule: &Schedule,
) -> std::io::Result<()> {
    std::fs::write(
        filename,
        serde_json::to_string_pretty(&plan_json(network, allocation, schedule))?,
    )?;
    Ok(())
}

fn plan_json(network: &Network, allocation: &Allocation, schedule: &Schedule) -> serde_json::Value {
    let routes = allocation
        .routes
        .iter()
        .map(|r| r.iter().map(|id| network.name(*id)).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    let turns = schedule
        .turns
        .iter()
        .map(|moves| {
            moves
                .iter()
                .map(|m| MoveRecord {
                    train: m.train,
                    station: network.name(m.station),
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    json!({
        "routes": routes,
        "assignment": allocation.assignment,
        "concurrent": allocation.concurrent,
        "turns": turns,
    })
}
