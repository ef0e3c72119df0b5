use chrono::NaiveDate;
use std::io::{self, BufRead, Write};

use crate::error::{Error, Result};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d-%m-%Y"];

/// A manual prediction target typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualInput {
    Index(i64),
    Date(NaiveDate),
}

impl ManualInput {
    /// Integers are day indices and must be non-negative; anything else is
    /// read as a `YYYY-MM-DD` or `DD-MM-YYYY` date.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::InvalidManualInput("empty input".to_string()));
        }

        if let Ok(day_index) = input.parse::<i64>() {
            if day_index < 0 {
                return Err(Error::InvalidManualInput(format!(
                    "day index must be non-negative, got {}",
                    day_index
                )));
            }
            return Ok(ManualInput::Index(day_index));
        }

        parse_date(input).map(ManualInput::Date)
    }
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .ok_or_else(|| Error::InvalidManualInput(format!("cannot read {:?} as a date", input)))
}

/// Asks until a valid index or date is given. Invalid entries are reported
/// and asked for again; end of input is an error.
pub fn prompt_manual_input<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> Result<ManualInput> {
    loop {
        write!(writer, "Day index or date (YYYY-MM-DD): ")?;
        writer.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before a valid value was entered",
            )));
        }

        match ManualInput::parse(&line) {
            Ok(input) => return Ok(input),
            Err(e) => writeln!(writer, "{}", e)?,
        }
    }
}
