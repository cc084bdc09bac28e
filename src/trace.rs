//! Valgrind lackey style memory traces.
//!
//! Each line has the form `<op> <hex-address>,<size>`, for example
//!
//! ```text
//! I 0400d7d4,8
//!  M 0421c7f0,4
//!  L 04f6b868,8
//!  S 7ff0005c8,8
//! ```

use crate::address;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io;

#[derive(
    Debug, strum::EnumIter, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Kind {
    /// Instruction fetch, never reaches the data cache.
    Instruction,
    Load,
    Store,
    /// A load immediately followed by a store to the same address.
    Modify,
}

impl Kind {
    #[must_use]
    pub fn from_op(op: char) -> Option<Self> {
        match op {
            'I' => Some(Kind::Instruction),
            'L' => Some(Kind::Load),
            'S' => Some(Kind::Store),
            'M' => Some(Kind::Modify),
            _ => None,
        }
    }

    #[must_use]
    pub fn op(self) -> char {
        match self {
            Kind::Instruction => 'I',
            Kind::Load => 'L',
            Kind::Store => 'S',
            Kind::Modify => 'M',
        }
    }

    /// Data cache accesses performed for a record of this kind, in order.
    #[must_use]
    pub fn accesses(self) -> &'static [stats::AccessKind] {
        use stats::AccessKind::{LOAD, STORE};
        match self {
            Kind::Instruction => &[],
            Kind::Load => &[LOAD],
            Kind::Store => &[STORE],
            Kind::Modify => &[LOAD, STORE],
        }
    }
}

/// One memory operation of a trace.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub kind: Kind,
    pub addr: address,
    /// Number of bytes accessed. Not used by the cache model.
    pub size: u64,
}

impl Record {
    #[must_use]
    pub fn new(kind: Kind, addr: address, size: u64) -> Self {
        Self { kind, addr, size }
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:x},{}", self.kind.op(), self.addr, self.size)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed trace line {0:?}")]
    Malformed(String),
    #[error("unknown operation {op:?} in trace line {line:?}")]
    UnknownOperation { op: char, line: String },
    #[error("invalid address {addr:?} in trace line {line:?}")]
    InvalidAddress { addr: String, line: String },
    #[error("invalid size {size:?} in trace line {line:?}")]
    InvalidSize { size: String, line: String },
    #[error("trace line {0:?} is not valid UTF-8")]
    InvalidUtf8(String),
}

static LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\S)\s+(?:0[xX])?([0-9a-fA-F]+)\s*,\s*([0-9]+)\s*$").unwrap()
});

/// Parses a single trace line.
///
/// # Returns
/// `Ok(None)` for blank lines.
///
/// # Errors
/// When the line is not of the form `<op> <hex-address>,<size>` or the
/// operation is not one of `I`, `L`, `S` or `M`.
pub fn parse_line(line: &str) -> Result<Option<Record>, ParseError> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let captures = LINE_REGEX
        .captures(line)
        .ok_or_else(|| ParseError::Malformed(line.to_string()))?;

    let op = captures[1].chars().next().unwrap_or_default();
    let kind = Kind::from_op(op).ok_or_else(|| ParseError::UnknownOperation {
        op,
        line: line.to_string(),
    })?;
    let addr =
        address::from_str_radix(&captures[2], 16).map_err(|_| ParseError::InvalidAddress {
            addr: captures[2].to_string(),
            line: line.to_string(),
        })?;
    let size = captures[3]
        .parse::<u64>()
        .map_err(|_| ParseError::InvalidSize {
            size: captures[3].to_string(),
            line: line.to_string(),
        })?;
    Ok(Some(Record { kind, addr, size }))
}

/// Parses a raw trace line.
///
/// # Errors
/// Same as [`parse_line`], and when the line is not valid UTF-8.
pub fn parse_bytes(line: &[u8]) -> Result<Option<Record>, ParseError> {
    let line = std::str::from_utf8(line)
        .map_err(|_| ParseError::InvalidUtf8(String::from_utf8_lossy(line).into_owned()))?;
    parse_line(line)
}

pub trait BufReadLine {
    /// Reads the next line as raw bytes, including the trailing newline.
    fn read_line<'buf>(&mut self, buffer: &'buf mut Vec<u8>)
        -> Option<io::Result<&'buf mut Vec<u8>>>;
}

impl<R> BufReadLine for R
where
    R: io::BufRead,
{
    fn read_line<'buf>(
        &mut self,
        buffer: &'buf mut Vec<u8>,
    ) -> Option<io::Result<&'buf mut Vec<u8>>> {
        buffer.clear();

        io::BufRead::read_until(self, b'\n', buffer)
            .map(|u| if u == 0 { None } else { Some(buffer) })
            .transpose()
    }
}

/// Iterator over the records of a trace.
///
/// Malformed lines, including lines that are not valid UTF-8, are skipped.
/// I/O errors are yielded and end the iteration.
#[derive(Debug)]
pub struct Reader<R> {
    inner: R,
    buffer: Vec<u8>,
    line_number: usize,
    skipped: usize,
    failed: bool,
}

impl<R> Reader<R>
where
    R: io::BufRead,
{
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            line_number: 0,
            skipped: 0,
            failed: false,
        }
    }

    /// Number of non-blank lines skipped so far because they could not be parsed.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R> Iterator for Reader<R>
where
    R: io::BufRead,
{
    type Item = io::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let line = match BufReadLine::read_line(&mut self.inner, &mut self.buffer)? {
                Ok(line) => line,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            };
            self.line_number += 1;
            match parse_bytes(line) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => {}
                Err(err) => {
                    self.skipped += 1;
                    log::debug!("skipping trace line {}: {}", self.line_number, err);
                }
            }
        }
    }
}

/// Parses all records of an in-memory trace, skipping malformed lines.
pub fn parse_str(trace: &str) -> Vec<Record> {
    trace
        .lines()
        .filter_map(|line| match parse_line(line) {
            Ok(record) => record,
            Err(err) => {
                log::debug!("skipping trace line: {}", err);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_bytes, parse_line, parse_str, Kind, ParseError, Reader, Record};
    use color_eyre::eyre;

    #[test]
    fn test_parse_lackey_lines() {
        assert_eq!(
            parse_line("I 0400d7d4,8"),
            Ok(Some(Record::new(Kind::Instruction, 0x0400_d7d4, 8)))
        );
        assert_eq!(
            parse_line(" M 0421c7f0,4"),
            Ok(Some(Record::new(Kind::Modify, 0x0421_c7f0, 4)))
        );
        assert_eq!(
            parse_line(" L 04f6b868,8\n"),
            Ok(Some(Record::new(Kind::Load, 0x04f6_b868, 8)))
        );
        assert_eq!(
            parse_line(" S 7ff0005c8,8"),
            Ok(Some(Record::new(Kind::Store, 0x7_ff00_05c8, 8)))
        );
        assert_eq!(
            parse_line("L 0x10, 1"),
            Ok(Some(Record::new(Kind::Load, 0x10, 1)))
        );
        assert_eq!(
            parse_line("I  0400d7d4,8"),
            Ok(Some(Record::new(Kind::Instruction, 0x0400_d7d4, 8)))
        );
    }

    #[test]
    fn test_parse_blank_line() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   \t"), Ok(None));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_line("X 10,1"),
            Err(ParseError::UnknownOperation {
                op: 'X',
                line: "X 10,1".to_string()
            })
        );
        assert!(matches!(
            parse_line("L 10"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(
            parse_line("L zz,1"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(
            parse_line("==1234== lackey"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(
            parse_line("L 1ffffffffffffffff,1"),
            Err(ParseError::InvalidAddress { .. })
        ));
        assert!(matches!(
            parse_line("L 10,99999999999999999999999"),
            Err(ParseError::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_record_display() {
        let record = Record::new(Kind::Modify, 0x20, 1);
        assert_eq!(record.to_string(), "M 20,1");
        assert_eq!(parse_line(&record.to_string()), Ok(Some(record)));
    }

    #[test]
    fn test_kind_accesses() {
        use stats::AccessKind::{LOAD, STORE};
        assert!(Kind::Instruction.accesses().is_empty());
        assert_eq!(Kind::Load.accesses(), &[LOAD]);
        assert_eq!(Kind::Store.accesses(), &[STORE]);
        assert_eq!(Kind::Modify.accesses(), &[LOAD, STORE]);
    }

    #[test]
    fn test_reader_skips_malformed_lines() -> eyre::Result<()> {
        let trace = "I 0400d7d4,8\n L 10,1\n\ngarbage\n Q 20,1\n S 18,4\n";
        let mut reader = Reader::new(trace.as_bytes());
        let records = reader.by_ref().collect::<Result<Vec<_>, _>>()?;
        assert_eq!(
            records,
            vec![
                Record::new(Kind::Instruction, 0x0400_d7d4, 8),
                Record::new(Kind::Load, 0x10, 1),
                Record::new(Kind::Store, 0x18, 4),
            ]
        );
        assert_eq!(reader.skipped(), 2);
        assert_eq!(parse_str(trace), records);
        Ok(())
    }

    #[test]
    fn test_reader_skips_invalid_utf8() -> eyre::Result<()> {
        let trace: &[u8] = b" L 10,1\n L \xff\xfe,1\n S 20,1\n";
        let mut reader = Reader::new(trace);
        let records = reader.by_ref().collect::<Result<Vec<_>, _>>()?;
        assert_eq!(
            records,
            vec![
                Record::new(Kind::Load, 0x10, 1),
                Record::new(Kind::Store, 0x20, 1),
            ]
        );
        assert_eq!(reader.skipped(), 1);
        assert!(matches!(
            parse_bytes(b"M \xff,1"),
            Err(ParseError::InvalidUtf8(_))
        ));
        assert_eq!(
            parse_bytes(b" M 20,1\r\n"),
            Ok(Some(Record::new(Kind::Modify, 0x20, 1)))
        );
        Ok(())
    }

    #[test]
    fn test_reader_last_line_without_newline() -> eyre::Result<()> {
        let records = Reader::new(" L 10,1\n S 18,4".as_bytes()).collect::<Result<Vec<_>, _>>()?;
        assert_eq!(
            records,
            vec![
                Record::new(Kind::Load, 0x10, 1),
                Record::new(Kind::Store, 0x18, 4),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_reader_empty() {
        let reader = Reader::new(std::io::empty());
        assert_eq!(reader.count(), 0);
    }

    struct FailingReader;

    impl std::io::Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn test_reader_io_error_ends_iteration() {
        let mut reader = Reader::new(std::io::BufReader::new(FailingReader));
        assert!(matches!(reader.next(), Some(Err(_))));
        assert!(reader.next().is_none());
    }
}
