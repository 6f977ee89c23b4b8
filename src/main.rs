use log::*;

mod allocator;
mod error;
mod network;
mod pathfinder;
mod schedule;

use error::Error;
use pathfinder::SearchMode;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "railrun", about = "Turn-by-turn train dispatcher.")]
struct Opt {
    /// Network map with a `stations:` and a `connections:` section
    #[structopt(name = "FILE")]
    #[structopt(parse(from_os_str))]
    file: PathBuf,

    /// Station every train starts from
    #[structopt(name = "START")]
    start: String,

    /// Station every train must reach
    #[structopt(name = "END")]
    end: String,

    /// Number of trains to dispatch
    #[structopt(name = "TRAINS", allow_hyphen_values = true)]
    trains: String,

    /// Guide the path search by the Manhattan distance to the end station
    /// instead of hop count alone.
    #[structopt(short, long)]
    astar: bool,

    /// Write the schedule as JSON to this file.
    #[structopt(short = "o", long)]
    #[structopt(parse(from_os_str))]
    plan_output: Option<PathBuf>,

    /// Activate debug mode
    #[structopt(short, long)]
    verbose: bool,
}

fn main() {
    let opt = Opt::from_args();
    let level = if opt.verbose {
        if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    } else {
        LevelFilter::Error
    };
    if let Err(e) = simple_logger::SimpleLogger::new().with_level(level).init() {
        eprintln!("Logging disabled: {}", e);
    }
    info!("{:#?}", opt);

    let result = run(&opt);

    if opt.verbose {
        hprof::end_frame();
        hprof::profiler().print_timing();
    }

    match result {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Validates the invocation, plans the run and returns the printed schedule.
fn run(opt: &Opt) -> Result<String, Error> {
    let trains = parse_train_count(&opt.trains)?;
    if opt.start == opt.end {
        return Err(Error::SameStartAndEnd);
    }

    let network = {
        let _h = hprof::enter("read file");
        network::read(&opt.file)?
    };
    let (start, end) = match (network.lookup(&opt.start), network.lookup(&opt.end)) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(Error::StationNotFound),
    };

    let mode = if opt.astar {
        SearchMode::Heuristic
    } else {
        SearchMode::Uniform
    };
    let allocation = allocator::allocate(&network, start, end, mode, trains)?;
    info!(
        "Dispatching {} trains over {} routes",
        trains,
        allocation.routes.len()
    );
    debug!("Routes:\n{}", allocation.summary(&network));

    let schedule = {
        let _h = hprof::enter("schedule");
        schedule::run(&allocation)
    };
    info!("All trains arrive after {} turns.", schedule.turns.len());

    if let Some(f) = &opt.plan_output {
        schedule::write_plan_json(f, &network, &allocation, &schedule).map_err(|source| {
            Error::Write {
                path: f.clone(),
                source,
            }
        })?;
        info!("Wrote plan to file {}", f.display());
    }

    Ok(schedule::print_schedule(&network, &schedule))
}

fn parse_train_count(arg: &str) -> Result<usize, Error> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::InvalidTrainCount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn train_count_must_be_positive() {
        assert_eq!(parse_train_count("4").unwrap(), 4);
        for bad in &["0", "-2", "two", "", "1.5"] {
            assert_eq!(
                parse_train_count(bad).unwrap_err().to_string(),
                "number of trains must be positive int"
            );
        }
    }
}
