//! Parsers for the raw (`-r`) reports printed by `collie`
//!
//! Reports are `\n`-terminated lines of single-space separated fields.
//! Every line a parser visits must be complete; a final line without its
//! newline means the report was cut short and the whole parse fails.
//! Parsers take the raw stdout bytes; a report that is not valid UTF-8 is a
//! parse failure at the line holding the first bad byte.
//!
//! ```text
//! node info -r:
//! 0 15245667872 117571104 0%
//! Total 15245667872 117571104 0% 20972341
//!
//! vdi list -r:
//! s 650f4363-dd7b-4aba-a954-7d6e1ab0ba51 1 2097152000 0 2088763392 1343921684 5fda1
//! = 650f4363-dd7b-4aba-a954-7d6e1ab0ba51 2 2097152000 381681664 1707081728 1343921685 5fda2
//! ```

use crate::domain::model::Volume;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

const NODE_INFO: &str = "node info";
const VDI_LIST: &str = "vdi list";

const TOTAL_PREFIX: &str = "Total ";
const CURRENT_MARKER: u8 = b'=';

// =============================================================================
// Parsed Records
// =============================================================================

/// Cluster-wide usage from `node info`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterCapacity {
    pub capacity: u64,
    pub allocation: u64,
}

impl ClusterCapacity {
    pub fn available(&self) -> u64 {
        self.capacity.saturating_sub(self.allocation)
    }
}

/// Size and usage of one VDI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VdiUsage {
    pub capacity: u64,
    pub allocation: u64,
}

/// Leading fields of a current-VDI line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VdiRecord<'a> {
    name: &'a str,
    usage: VdiUsage,
}

// =============================================================================
// Line and Field Scanning
// =============================================================================

/// Iterates the complete lines of a report, numbered from 1
struct ReportLines<'a> {
    report: &'static str,
    rest: &'a str,
    line_no: usize,
}

impl<'a> ReportLines<'a> {
    fn new(report: &'static str, output: &'a str) -> Self {
        Self {
            report,
            rest: output,
            line_no: 0,
        }
    }
}

impl<'a> Iterator for ReportLines<'a> {
    type Item = Result<(usize, &'a str)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        self.line_no += 1;

        let rest = self.rest;
        match rest.find('\n') {
            Some(end) => {
                let line = &rest[..end];
                self.rest = &rest[end + 1..];
                Some(Ok((self.line_no, line)))
            }
            None => {
                self.rest = "";
                Some(Err(Error::parse(
                    self.report,
                    self.line_no,
                    "truncated line (no trailing newline)",
                )))
            }
        }
    }
}

/// Cursor over the fields of one line
struct FieldCursor<'a> {
    report: &'static str,
    line_no: usize,
    line: &'a str,
    pos: usize,
}

impl<'a> FieldCursor<'a> {
    fn new(report: &'static str, line_no: usize, line: &'a str, pos: usize) -> Self {
        Self {
            report,
            line_no,
            line,
            pos,
        }
    }

    fn error(&self, reason: impl Into<String>) -> Error {
        Error::parse(self.report, self.line_no, reason)
    }

    fn peek(&self) -> Option<u8> {
        self.line.as_bytes().get(self.pos).copied()
    }

    /// Consume exactly one field separator
    fn separator(&mut self, before: &str) -> Result<()> {
        match self.peek() {
            Some(b' ') | Some(b'\t') => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(self.error(format!("expected separator before {}", before))),
            None => Err(self.error(format!("missing {}", before))),
        }
    }

    /// Read an unsigned decimal field that ends at a separator or end of line
    fn read_u64(&mut self, field: &str) -> Result<u64> {
        let start = self.pos;
        let digits = self.line.as_bytes()[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();

        if digits == 0 {
            return Err(match self.peek() {
                None => self.error(format!("missing {}", field)),
                Some(_) => self.error(format!("{} is not a number", field)),
            });
        }
        self.pos += digits;

        if !matches!(self.peek(), None | Some(b' ') | Some(b'\t')) {
            return Err(self.error(format!("{} is not a number", field)));
        }

        self.line[start..self.pos]
            .parse()
            .map_err(|_| self.error(format!("{} does not fit in 64 bits", field)))
    }

    /// Read a volume name: up to the first unescaped space, escapes kept
    fn read_name(&mut self) -> Result<&'a str> {
        let line = self.line;
        let bytes = line.as_bytes();
        let start = self.pos;

        while self.pos < bytes.len() && bytes[self.pos] != b' ' {
            if bytes[self.pos] == b'\\' {
                self.pos += 1;
                if self.pos >= bytes.len() {
                    return Err(self.error("dangling escape in volume name"));
                }
            }
            self.pos += 1;
        }

        if self.pos == start {
            return Err(self.error("missing volume name"));
        }
        Ok(&line[start..self.pos])
    }
}

/// Parse a current-VDI line: `= <name> <id> <capacity> <allocation> ...`
fn parse_vdi_record(line_no: usize, line: &str) -> Result<VdiRecord<'_>> {
    if line.as_bytes().get(1) != Some(&b' ') {
        return Err(Error::parse(
            VDI_LIST,
            line_no,
            "expected a space after the status marker",
        ));
    }

    let mut cursor = FieldCursor::new(VDI_LIST, line_no, line, 2);
    let name = cursor.read_name()?;
    cursor.separator("vdi id")?;
    cursor.read_u64("vdi id")?;
    cursor.separator("capacity")?;
    let capacity = cursor.read_u64("capacity")?;
    cursor.separator("allocation")?;
    let allocation = cursor.read_u64("allocation")?;

    Ok(VdiRecord {
        name,
        usage: VdiUsage {
            capacity,
            allocation,
        },
    })
}

/// Decode raw stdout, locating the first invalid byte by line
fn report_text<'a>(report: &'static str, raw: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(raw).map_err(|e| {
        let valid = &raw[..e.valid_up_to()];
        let line_no = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        Error::parse(report, line_no, format!("invalid UTF-8: {}", e))
    })
}

fn is_current(line: &str) -> bool {
    line.as_bytes().first() == Some(&CURRENT_MARKER)
}

// =============================================================================
// Report Parsers
// =============================================================================

/// Parse `node info -r`: the first `Total` line gives capacity and usage
pub fn parse_node_info<R: AsRef<[u8]> + ?Sized>(output: &R) -> Result<ClusterCapacity> {
    let output = report_text(NODE_INFO, output.as_ref())?;
    let mut lines_seen = 0;

    for line in ReportLines::new(NODE_INFO, output) {
        let (line_no, line) = line?;
        lines_seen = line_no;

        if !line.starts_with(TOTAL_PREFIX) {
            continue;
        }

        let mut cursor = FieldCursor::new(NODE_INFO, line_no, line, TOTAL_PREFIX.len());
        let capacity = cursor.read_u64("total size")?;
        cursor.separator("used size")?;
        let allocation = cursor.read_u64("used size")?;

        if allocation > capacity {
            return Err(cursor.error(format!(
                "used size {} exceeds total size {}",
                allocation, capacity
            )));
        }

        return Ok(ClusterCapacity {
            capacity,
            allocation,
        });
    }

    Err(Error::parse(NODE_INFO, lines_seen, "no Total line"))
}

/// Parse `vdi list -r` into the pool's current volumes, in report order.
///
/// Snapshot lines are skipped. Any malformed current line fails the whole
/// report; nothing parsed before it is returned.
pub fn parse_vdi_list<R: AsRef<[u8]> + ?Sized>(
    pool_name: &str,
    output: &R,
) -> Result<Vec<Volume>> {
    let output = report_text(VDI_LIST, output.as_ref())?;
    let mut volumes = Vec::new();

    for line in ReportLines::new(VDI_LIST, output) {
        let (line_no, line) = line?;
        if !is_current(line) {
            continue;
        }

        let record = parse_vdi_record(line_no, line)?;
        let mut volume = Volume::new(record.name, record.usage.capacity);
        volume.allocation = record.usage.allocation;
        volume.bind_to(pool_name);
        volumes.push(volume);
    }

    Ok(volumes)
}

/// Parse `vdi list <name> -r`: usage of the first current line
pub fn parse_vdi<R: AsRef<[u8]> + ?Sized>(output: &R) -> Result<VdiUsage> {
    let output = report_text(VDI_LIST, output.as_ref())?;
    let mut lines_seen = 0;

    for line in ReportLines::new(VDI_LIST, output) {
        let (line_no, line) = line?;
        lines_seen = line_no;

        if is_current(line) {
            return parse_vdi_record(line_no, line).map(|record| record.usage);
        }
    }

    Err(Error::parse(VDI_LIST, lines_seen, "no current vdi line"))
}
