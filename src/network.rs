use crate::error::Error;
use log::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub const MAX_STATIONS: usize = 10_000;

pub type StationId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    pub name: String,
    pub x: u32,
    pub y: u32,
}

/// Undirected rail network. Stations are stored in file order and addressed
/// by their index; adjacency lists keep connection order.
#[derive(Debug, Default)]
pub struct Network {
    stations: Vec<Station>,
    adjacency: Vec<Vec<StationId>>,
    by_name: HashMap<String, StationId>,
    by_coord: HashMap<(u32, u32), StationId>,
    edges: HashSet<(StationId, StationId)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Stations,
    Connections,
}

impl Network {
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn num_connections(&self) -> usize {
        self.edges.len()
    }

    pub fn station(&self, id: StationId) -> &Station {
        &self.stations[id]
    }

    pub fn name(&self, id: StationId) -> &str {
        &self.stations[id].name
    }

    pub fn lookup(&self, name: &str) -> Option<StationId> {
        self.by_name.get(name).copied()
    }

    pub fn neighbours(&self, id: StationId) -> &[StationId] {
        &self.adjacency[id]
    }

    /// Grid distance between two stations, the search heuristic.
    pub fn manhattan(&self, a: StationId, b: StationId) -> u64 {
        let (a, b) = (self.station(a), self.station(b));
        u64::from(a.x.abs_diff(b.x)) + u64::from(a.y.abs_diff(b.y))
    }

    fn add_station(&mut self, line: &str) -> Result<(), Error> {
        let fields = line.split(',').collect::<Vec<_>>();
        let name = fields[0];
        let coords = match fields.as_slice() {
            [_, x, y] => x.parse::<u32>().ok().zip(y.parse::<u32>().ok()),
            _ => None,
        };
        let (x, y) = coords.ok_or_else(|| Error::InvalidCoordinates(name.to_string()))?;
        if name.is_empty() {
            return Err(Error::InvalidName);
        }
        if self.by_name.contains_key(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }
        if let Some(other) = self.by_coord.get(&(x, y)) {
            return Err(Error::DuplicateCoordinates(
                self.stations[*other].name.clone(),
                name.to_string(),
            ));
        }

        let id = self.stations.len();
        self.by_name.insert(name.to_string(), id);
        self.by_coord.insert((x, y), id);
        self.stations.push(Station { name: name.to_string(), x, y });
        self.adjacency.push(Vec::new());
        Ok(())
    }

    fn add_connection(&mut self, line: &str) -> Result<(), Error> {
        let invalid = || Error::InvalidConnection(line.to_string());
        let (a, b) = line.split_once('-').ok_or_else(invalid)?;
        let a = self.lookup(a).ok_or_else(invalid)?;
        let b = self.lookup(b).ok_or_else(invalid)?;
        if a == b {
            return Err(invalid());
        }
        if !self.edges.insert((a.min(b), a.max(b))) {
            return Err(Error::DuplicateConnection(
                self.stations[a].name.clone(),
                self.stations[b].name.clone(),
            ));
        }
        self.adjacency[a].push(b);
        self.adjacency[b].push(a);
        Ok(())
    }
}

/// Drops the comment part of a line and every space character.
fn strip_line(line: &str) -> String {
    let content = line.split('#').next().unwrap_or("");
    content.chars().filter(|c| *c != ' ').collect()
}

pub fn parse(text: &str) -> Result<Network, Error> {
    let mut network = Network::default();
    let mut section = Section::Preamble;

    for raw in text.lines() {
        let line = strip_line(raw);
        if line.is_empty() {
            continue;
        }
        match (section, line.as_str()) {
            (Section::Preamble, "stations:") | (Section::Stations, "stations:") => {
                section = Section::Stations;
            }
            (Section::Preamble, _) => return Err(Error::StationsSectionMissing),
            (Section::Connections, "stations:") => return Err(Error::ConnectionsSectionMissing),
            (_, "connections:") => section = Section::Connections,
            (Section::Stations, entry) => network.add_station(entry)?,
            (Section::Connections, entry) => network.add_connection(entry)?,
        }
    }

    match section {
        Section::Preamble => return Err(Error::StationsSectionMissing),
        Section::Stations => return Err(Error::ConnectionsSectionMissing),
        Section::Connections => {}
    }
    if network.len() > MAX_STATIONS {
        return Err(Error::TooManyStations(network.len()));
    }

    debug!(
        "Network has {} stations and {} connections",
        network.len(),
        network.num_connections()
    );
    Ok(network)
}

pub fn read(path: &Path) -> Result<Network, Error> {
    trace!("Loading file {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let _h = hprof::enter("parse");
    parse(&text)
}
