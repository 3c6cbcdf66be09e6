//! Binary pattern database file.
//!
//! Layout (version 1):
//! - Header:
//!   magic: [u8;4] = b"15PD"
//!   version: u8 = 1
//!   groups: u8
//!   goal: [u8;16]  symbol values, row-major
//!   per group: size u8, then `size` tile labels ascending
//! - Records, group-major. A group of k tiles has `16!/(15-k)!` records of
//!   `ceil((k+1)/2)` bytes of big-endian packed board indices (the blank in the
//!   most significant nibble, then the labels ascending) followed by one cost
//!   byte. Records are sorted by their packed value so equal databases encode
//!   to equal bytes.
//! - Trailer: checksum u32 LE = CRC32C of all preceding bytes
//!
//! `save` writes to a sibling temporary file and renames it over the target,
//! so an interrupted write never leaves a truncated database behind.

use log::info;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::database::{PatternDatabase, PatternTable};
use crate::error::PuzzleError;
use crate::pattern::{Partition, PatternGroup};
use crate::puzzle::{State, CELLS};

const MAGIC: &[u8; 4] = b"15PD";
const VERSION: u8 = 1;
const FIXED_HEADER_LEN: usize = 4 + 1 + 1 + CELLS;
const CHECKSUM_LEN: usize = 4;

fn placement_bytes(group: &PatternGroup) -> usize {
    (group.nibbles() * 4).div_ceil(8)
}

pub fn record_len(group: &PatternGroup) -> usize {
    placement_bytes(group) + 1
}

fn corrupt(msg: impl Into<String>) -> PuzzleError {
    PuzzleError::CorruptDatabase(msg.into())
}

/// Serializes `db`. Every table has to hold exactly one entry per placement
/// of its group; a short table or a key from another group is an error
/// rather than a file that `decode` would refuse.
pub fn encode(db: &PatternDatabase) -> Result<Vec<u8>, PuzzleError> {
    let groups = db.partition().groups();
    let records: usize = groups.iter().map(|g| g.entry_count() * record_len(g)).sum();
    let labels: usize = groups.iter().map(|g| 1 + g.len()).sum();
    let mut buf = Vec::with_capacity(FIXED_HEADER_LEN + labels + records + CHECKSUM_LEN);

    buf.extend_from_slice(MAGIC);
    buf.push(VERSION);
    buf.push(groups.len() as u8);
    buf.extend_from_slice(db.goal().layout());
    for group in groups {
        buf.push(group.len() as u8);
        buf.extend_from_slice(group.tiles());
    }

    for (index, table) in db.tables().iter().enumerate() {
        let group = table.group();
        if table.len() != group.entry_count() {
            return Err(PuzzleError::BuildInvariant {
                group: index,
                expected: group.entry_count(),
                found: table.len(),
            });
        }
        let width = placement_bytes(group);
        let mut rows = table
            .iter()
            .map(|(key, cost)| {
                group
                    .pack(key)
                    .map(|packed| (packed, cost))
                    .ok_or_else(|| PuzzleError::DatabaseInconsistency {
                        group: index,
                        key: key.to_string(),
                    })
            })
            .collect::<Result<Vec<(u32, u8)>, _>>()?;
        rows.sort_unstable();
        for (packed, cost) in rows {
            buf.extend_from_slice(&packed.to_be_bytes()[4 - width..]);
            buf.push(cost);
        }
    }

    let checksum = crc32c::crc32c(&buf);
    buf.extend_from_slice(&checksum.to_le_bytes());
    Ok(buf)
}

pub fn decode(bytes: &[u8]) -> Result<PatternDatabase, PuzzleError> {
    if bytes.len() < FIXED_HEADER_LEN + CHECKSUM_LEN {
        return Err(corrupt("file too short"));
    }

    let (content, trailer) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    let file_crc = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    if file_crc != crc32c::crc32c(content) {
        return Err(corrupt("checksum mismatch"));
    }

    if &content[..4] != MAGIC {
        return Err(corrupt("bad magic"));
    }
    if content[4] != VERSION {
        return Err(corrupt(format!("unsupported version {}", content[4])));
    }
    let group_count = content[5] as usize;

    let mut goal = [0u8; CELLS];
    goal.copy_from_slice(&content[6..FIXED_HEADER_LEN]);
    let goal = State::from_values(goal).map_err(|e| corrupt(format!("goal: {}", e)))?;

    let mut off = FIXED_HEADER_LEN;
    let mut labels = Vec::with_capacity(group_count);
    for _ in 0..group_count {
        let size = *content.get(off).ok_or_else(|| corrupt("truncated group header"))? as usize;
        let tiles = content
            .get(off + 1..off + 1 + size)
            .ok_or_else(|| corrupt("truncated group header"))?;
        labels.push(tiles.to_vec());
        off += 1 + size;
    }
    let partition = Partition::new(labels).map_err(|e| corrupt(e.to_string()))?;

    let expected: usize = partition
        .groups()
        .iter()
        .map(|g| g.entry_count() * record_len(g))
        .sum();
    let found = content.len() - off;
    if found != expected {
        return Err(corrupt(format!(
            "expected {} record bytes, found {}",
            expected, found
        )));
    }

    let mut tables = Vec::with_capacity(partition.groups().len());
    for (index, group) in partition.groups().iter().enumerate() {
        let width = placement_bytes(group);
        let section = &content[off..off + group.entry_count() * record_len(group)];
        off += section.len();

        let mut costs = HashMap::with_capacity(group.entry_count());
        for record in section.chunks_exact(record_len(group)) {
            let packed = record[..width]
                .iter()
                .fold(0u32, |acc, &b| acc << 8 | b as u32);
            let key = group.unpack(packed).ok_or_else(|| {
                corrupt(format!("group {}: invalid placement {:#x}", index, packed))
            })?;
            if costs.insert(key, record[width]).is_some() {
                return Err(corrupt(format!("group {}: duplicate placement {}", index, key)));
            }
        }
        tables.push(PatternTable::new(group.clone(), costs));
    }

    Ok(PatternDatabase::from_tables(goal, partition, tables))
}

pub fn save<P: AsRef<Path>>(db: &PatternDatabase, path: P) -> Result<(), PuzzleError> {
    let data = encode(db)?;
    let dir = match path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path.as_ref()).map_err(|e| e.error)?;
    info!(
        "Wrote pattern database ({} bytes) to {}",
        data.len(),
        path.as_ref().display()
    );
    Ok(())
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<PatternDatabase, PuzzleError> {
    let data = fs::read(path.as_ref())?;
    let db = decode(&data)?;
    info!(
        "Loaded pattern database {} from {}",
        db.partition(),
        path.as_ref().display()
    );
    Ok(db)
}
