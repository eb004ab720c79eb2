//! Reader for plain-text branch traces.
//!
//! A trace starts with a header line describing the predictor, followed by
//! one resolved branch per line:
//!
//! ```text
//! 8 2 4 1 LocalHist LocalTables not_using_share
//! 0x00001000 T 0x00002000
//! 0x00001008 N 0x00001100
//! ```

use std::path::Path;
use itertools::Itertools;
use log::debug;
use thiserror::Error;

use crate::branch::*;
use crate::error::InitError;
use crate::predictor::*;

/// Errors produced while reading a trace.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("trace is missing a header line")]
    MissingHeader,

    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    #[error("line {line}: {source}")]
    Config {
        line: usize,
        #[source]
        source: InitError,
    },
}

fn syntax(line: usize, reason: impl ToString) -> TraceError {
    TraceError::Syntax { line, reason: reason.to_string() }
}

fn parse_addr(line: usize, s: &str) -> Result<u32, TraceError> {
    let digits = s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16)
        .map_err(|e| syntax(line, format!("bad address '{}': {}", s, e)))
}

fn parse_num(line: usize, s: &str) -> Result<u32, TraceError> {
    s.parse::<u32>()
        .map_err(|e| syntax(line, format!("bad number '{}': {}", s, e)))
}

fn parse_scope(line: usize, s: &str, global: &str, local: &str)
    -> Result<Scope, TraceError>
{
    if s == global {
        Ok(Scope::Global)
    } else if s == local {
        Ok(Scope::Local)
    } else {
        Err(syntax(line, format!("expected {} or {}, got '{}'", global, local, s)))
    }
}

fn parse_sharing(line: usize, s: &str) -> Result<u32, TraceError> {
    match s {
        "not_using_share" => Ok(0),
        "using_share_lsb" => Ok(1),
        "using_share_mid" => Ok(2),
        _ => Err(syntax(line, format!("unknown sharing mode '{}'", s))),
    }
}

/// Parse a header line into a predictor configuration.
pub fn parse_header(line: usize, s: &str) -> Result<BTBConfig, TraceError> {
    let (size, hist, tag, state, ghist, gtable, share) = s.split_whitespace()
        .collect_tuple()
        .ok_or_else(|| syntax(line, "expected 7 header fields"))?;

    let history = parse_scope(line, ghist, "GlobalHist", "LocalHist")?;
    let table = parse_scope(line, gtable, "GlobalTables", "LocalTables")?;
    BTBConfig::from_raw(
        parse_num(line, size)?,
        parse_num(line, hist)?,
        parse_num(line, tag)?,
        parse_num(line, state)?,
        history.is_global(),
        table.is_global(),
        parse_sharing(line, share)?,
    ).map_err(|source| TraceError::Config { line, source })
}

/// Parse a single resolved branch.
pub fn parse_record(line: usize, s: &str) -> Result<BranchRecord, TraceError> {
    let (pc, dir, tgt) = s.split_whitespace()
        .collect_tuple()
        .ok_or_else(|| syntax(line, "expected '<pc> <T|N> <target>'"))?;
    let outcome = match dir {
        "T" => Outcome::T,
        "N" => Outcome::N,
        _ => return Err(syntax(line, format!("bad direction '{}'", dir))),
    };
    Ok(BranchRecord::new(parse_addr(line, pc)?, parse_addr(line, tgt)?, outcome))
}

/// A predictor configuration and the sequence of branches to replay on it.
#[derive(Clone, Debug)]
pub struct Trace {
    pub name: String,
    pub cfg: BTBConfig,
    pub records: Vec<BranchRecord>,
}
impl Trace {
    /// Parse a trace from text.
    pub fn parse(name: &str, text: &str) -> Result<Self, TraceError> {
        let mut lines = text.lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let (line, header) = lines.next().ok_or(TraceError::MissingHeader)?;
        let cfg = parse_header(line, header)?;
        let records = lines
            .map(|(line, l)| parse_record(line, l))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("parsed trace '{}': {} records", name, records.len());
        Ok(Self { name: name.to_string(), cfg, records })
    }

    /// Read a trace from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| {
            TraceError::Io { path: path.display().to_string(), source }
        })?;
        let name = path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse(&name, &text)
    }

    /// Return the number of records
    pub fn num_entries(&self) -> usize { self.records.len() }

    pub fn name(&self) -> &str { &self.name }

    pub fn as_slice(&self) -> &[BranchRecord] { &self.records }

    /// Build a predictor from the header and replay every record on it,
    /// in order.
    pub fn replay(&self) -> Result<BTBStats, InitError> {
        let mut btb = self.cfg.build()?;
        for record in self.records.iter() {
            let _ = btb.simulate(record);
        }
        Ok(btb.stats())
    }
}
