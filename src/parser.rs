//! Parser for the testing instrument's `;`-delimited curve files.
//!
//! A file starts with a free-form preamble of `key;value` header lines, of
//! which only the part serial number and the measuring program number are
//! used. The `s;mm;KN` column header switches to the data section, where
//! every row with at least four fields contributes an (x, y) sample taken
//! from fields 1 and 2.
//!
//! ```text
//! Part serial number;SN42
//! Measuring program number;7
//! s;mm;KN
//! 0;0.0;0.0;x
//! 1;1.5;3.2;x
//! ```

use crate::constants::{
    DATA_SECTION_SENTINEL, DEFAULT_PROGRAM_NUMBER, FIELD_DELIMITER, MIN_DATA_FIELDS,
    PROGRAM_NUMBER_PREFIX, SERIAL_NUMBER_PREFIX, X_FIELD_INDEX, Y_FIELD_INDEX,
};
use crate::models::{MeasurementRecord, Sample};

/// Section of the file the parser is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Header lines before the column sentinel
    Preamble,
    /// Sample rows; there is no transition out of this state
    DataSection,
}

/// Row-level counters gathered during one parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    pub sentinel_seen: bool,
    pub rows_accepted: usize,
    pub rows_skipped: usize,
}

/// Fields collected while walking through the file
#[derive(Debug)]
struct RecordAccumulator {
    serial_number: String,
    program_number: i32,
    samples: Vec<Sample>,
}

impl Default for RecordAccumulator {
    fn default() -> Self {
        Self {
            serial_number: String::new(),
            program_number: DEFAULT_PROGRAM_NUMBER,
            samples: Vec::new(),
        }
    }
}

/// Single-pass state machine turning lines into a [`MeasurementRecord`]
#[derive(Debug)]
pub struct MeasurementParser {
    state: ParserState,
    acc: RecordAccumulator,
    summary: ParseSummary,
}

impl Default for MeasurementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Preamble,
            acc: RecordAccumulator::default(),
            summary: ParseSummary::default(),
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Consume one line of input
    pub fn feed(&mut self, raw: &str) {
        let line = raw.trim();
        if line.is_empty() {
            return;
        }

        match self.state {
            ParserState::Preamble => self.feed_preamble(line),
            ParserState::DataSection => self.feed_data_row(line),
        }
    }

    fn feed_preamble(&mut self, line: &str) {
        if starts_with_ignore_case(line, SERIAL_NUMBER_PREFIX) {
            self.acc.serial_number = second_field(line).to_string();
        } else if starts_with_ignore_case(line, PROGRAM_NUMBER_PREFIX) {
            self.acc.program_number = second_field(line)
                .parse()
                .unwrap_or(DEFAULT_PROGRAM_NUMBER);
        } else if starts_with_ignore_case(line, DATA_SECTION_SENTINEL) {
            self.state = ParserState::DataSection;
            self.summary.sentinel_seen = true;
        }
    }

    fn feed_data_row(&mut self, line: &str) {
        let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        if fields.len() < MIN_DATA_FIELDS {
            self.summary.rows_skipped += 1;
            return;
        }

        match (
            parse_invariant_float(fields[X_FIELD_INDEX]),
            parse_invariant_float(fields[Y_FIELD_INDEX]),
        ) {
            (Some(x), Some(y)) => {
                self.acc.samples.push(Sample { x, y });
                self.summary.rows_accepted += 1;
            }
            _ => self.summary.rows_skipped += 1,
        }
    }

    /// End of input: hand back whatever has been accumulated
    pub fn finish(self) -> (MeasurementRecord, ParseSummary) {
        let record = MeasurementRecord {
            serial_number: self.acc.serial_number,
            program_number: self.acc.program_number,
            samples: self.acc.samples,
        };
        (record, self.summary)
    }
}

/// Parse a complete file's lines
pub fn parse_measurement<I, S>(lines: I) -> (MeasurementRecord, ParseSummary)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = MeasurementParser::new();
    for line in lines {
        parser.feed(line.as_ref());
    }
    parser.finish()
}

/// ASCII case-insensitive prefix test
fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Second `;`-separated field of a header line, trimmed
fn second_field(line: &str) -> &str {
    line.split(FIELD_DELIMITER).nth(1).unwrap_or("").trim()
}

/// Parse a number written with `.` as decimal separator, independent of locale
///
/// Non-finite values are rejected since they have no JSON representation.
fn parse_invariant_float(field: &str) -> Option<f64> {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SN42_FILE: &str = "Part serial number;SN42\n\
                             Measuring program number;7\n\
                             s;mm;KN\n\
                             0;0.0;0.0;x\n\
                             1;1.5;3.2;x\n";

    fn parse_text(text: &str) -> (MeasurementRecord, ParseSummary) {
        parse_measurement(text.lines())
    }

    #[test]
    fn test_parse_reference_file() {
        let (record, summary) = parse_text(SN42_FILE);

        assert_eq!(record.serial_number, "SN42");
        assert_eq!(record.program_number, 7);
        assert_eq!(record.x_values(), vec![0.0, 1.5]);
        assert_eq!(record.y_values(), vec![0.0, 3.2]);
        assert!(summary.sentinel_seen);
        assert_eq!(summary.rows_accepted, 2);
        assert_eq!(summary.rows_skipped, 0);
    }

    #[test]
    fn test_header_order_does_not_matter() {
        let text = "Operator;Jane\n\
                    Measuring program number;3\n\
                    Test date;2024-01-01\n\
                    Part serial number;ABC123\n\
                    s;mm;KN\n\
                    0;1.0;2.0;x\n";
        let (record, _) = parse_text(text);

        assert_eq!(record.serial_number, "ABC123");
        assert_eq!(record.program_number, 3);
    }

    #[test]
    fn test_header_prefixes_are_case_insensitive() {
        let text = "PART SERIAL NUMBER;  upper-1  \n\
                    measuring PROGRAM number;12\n\
                    S;MM;kn\n\
                    0;4.0;5.0;x\n";
        let (record, summary) = parse_text(text);

        assert_eq!(record.serial_number, "upper-1");
        assert_eq!(record.program_number, 12);
        assert!(summary.sentinel_seen);
        assert_eq!(record.samples, vec![Sample { x: 4.0, y: 5.0 }]);
    }

    #[test]
    fn test_serial_takes_only_second_field() {
        let (record, _) = parse_text("Part serial number;AB;CD\n");
        assert_eq!(record.serial_number, "AB");
    }

    #[test]
    fn test_unparseable_program_number_falls_back_to_zero() {
        let text = "Measuring program number;7\nMeasuring program number;seven\n";
        let (record, _) = parse_text(text);
        assert_eq!(record.program_number, 0);

        let (missing, _) = parse_text("Part serial number;X\n");
        assert_eq!(missing.program_number, 0);
    }

    #[test]
    fn test_short_rows_are_skipped_without_aborting() {
        let text = "Part serial number;S\n\
                    s;mm;KN\n\
                    0;1.0;2.0;x\n\
                    1;2.0\n\
                    2;3.0;4.0;x\n";
        let (record, summary) = parse_text(text);

        assert_eq!(record.x_values(), vec![1.0, 3.0]);
        assert_eq!(record.y_values(), vec![2.0, 4.0]);
        assert_eq!(summary.rows_skipped, 1);
    }

    #[test]
    fn test_rows_with_unparseable_numbers_are_skipped() {
        let text = "s;mm;KN\n\
                    0;abc;2.0;x\n\
                    1;1.0;;x\n\
                    2;1.2.3;2.0;x\n\
                    3;NaN;2.0;x\n\
                    4;inf;2.0;x\n\
                    5; -1.5e2 ;+0.25;x\n";
        let (record, summary) = parse_text(text);

        assert_eq!(record.samples, vec![Sample { x: -150.0, y: 0.25 }]);
        assert_eq!(summary.rows_accepted, 1);
        assert_eq!(summary.rows_skipped, 5);
    }

    #[test]
    fn test_missing_sentinel_yields_no_samples() {
        let text = "Part serial number;SN42\n\
                    Measuring program number;7\n\
                    0;0.0;0.0;x\n\
                    1;1.5;3.2;x\n";
        let (record, summary) = parse_text(text);

        assert_eq!(record.serial_number, "SN42");
        assert!(record.samples.is_empty());
        assert!(!summary.sentinel_seen);
        assert!(!record.is_usable());
    }

    #[test]
    fn test_header_lines_after_sentinel_are_ignored() {
        let text = "Part serial number;FIRST\n\
                    Measuring program number;1\n\
                    s;mm;KN\n\
                    0;1.0;1.0;x\n\
                    Part serial number;SECOND\n\
                    Measuring program number;2\n\
                    s;mm;KN\n\
                    1;2.0;2.0;x\n";
        let (record, summary) = parse_text(text);

        assert_eq!(record.serial_number, "FIRST");
        assert_eq!(record.program_number, 1);
        assert_eq!(record.x_values(), vec![1.0, 2.0]);
        assert_eq!(summary.rows_skipped, 3);
    }

    #[test]
    fn test_blank_lines_are_skipped_in_every_state() {
        let mut parser = MeasurementParser::new();
        parser.feed("   ");
        assert_eq!(parser.state(), ParserState::Preamble);
        parser.feed("s;mm;KN");
        assert_eq!(parser.state(), ParserState::DataSection);
        parser.feed("");
        parser.feed("\t");
        parser.feed("0;1.0;2.0;x");

        let (record, summary) = parser.finish();
        assert_eq!(record.samples.len(), 1);
        assert_eq!(summary.rows_skipped, 0);
    }

    #[test]
    fn test_x_and_y_lengths_match_valid_row_count() {
        let mut text = String::from("Part serial number;LEN\ns;mm;KN\n");
        let mut expected = 0;
        for i in 0..50 {
            if i % 7 == 0 {
                text.push_str(&format!("{};bad;1.0;x\n", i));
            } else if i % 5 == 0 {
                text.push_str(&format!("{};1.0\n", i));
            } else {
                text.push_str(&format!("{};{}.5;{}.25;x;extra\n", i, i, i));
                expected += 1;
            }
        }

        let (record, summary) = parse_text(&text);

        assert_eq!(record.x_values().len(), expected);
        assert_eq!(record.y_values().len(), expected);
        assert_eq!(summary.rows_accepted, expected);
    }

    #[test]
    fn test_non_ascii_line_does_not_panic_prefix_check() {
        let (record, _) = parse_text("Prüfteil Nr;ÄÖÜ\nÄ\n");
        assert_eq!(record, MeasurementRecord::default());
    }
}
