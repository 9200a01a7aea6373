//! Reader and writer for the backing file's delimited-text format.
//!
//! One record per line, fields separated by `,`. A field that contains the
//! delimiter, a double quote, or a line break (or that starts with
//! whitespace) is wrapped in double quotes with inner quotes doubled, so
//! free-form descriptions always read back unchanged.
//!
//! The reader never fails: it is the first stage of the store's
//! best-effort read path. Malformed quoting is taken literally and an
//! unterminated quoted field simply runs to the end of the input, which
//! [`Parsed::open_quote`] reports so an appender can close it first.

use std::iter::Peekable;
use std::str::Chars;

use crate::record::Record;

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Append one encoded record, including its trailing `\n`, to `out`.
pub fn write_record<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        let field = field.as_ref();
        if needs_quotes(field) {
            out.push(QUOTE);
            for c in field.chars() {
                if c == QUOTE {
                    out.push(QUOTE);
                }
                out.push(c);
            }
            out.push(QUOTE);
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}

/// Encode a full record set as file contents.
pub fn write_records(records: &[Record]) -> String {
    let mut out = String::new();
    for record in records {
        write_record(&mut out, record.fields());
    }
    out
}

/// Records read from a whole input, and how the input ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parsed {
    pub records: Vec<Record>,
    /// The input ended inside a quoted field. Anything appended is read
    /// as part of that field until a closing quote is written.
    pub open_quote: bool,
}

/// Parse file contents into records, skipping blank lines.
pub fn read_records(input: &str) -> Vec<Record> {
    parse(input).records
}

/// Like [`read_records`], also reporting a torn quoted field at the end.
pub fn parse(input: &str) -> Parsed {
    let mut chars = input.chars().peekable();
    let mut line = 1usize;
    let mut records = Vec::new();
    let mut open_quote = false;

    loop {
        match chars.peek().copied() {
            None => break,
            Some('\n') => {
                chars.next();
                line += 1;
                continue;
            }
            Some('\r') if next_is_newline(&chars) => {
                chars.next();
                chars.next();
                line += 1;
                continue;
            }
            Some(_) => {}
        }

        let start = line;
        let mut fields = Vec::new();
        loop {
            let (field, end) = read_field(&mut chars, &mut line);
            fields.push(field);
            match end {
                FieldEnd::Delimiter => {}
                FieldEnd::Record => break,
                FieldEnd::OpenQuote => {
                    open_quote = true;
                    break;
                }
            }
        }
        records.push(Record::new(start, fields));
    }

    Parsed {
        records,
        open_quote,
    }
}

fn needs_quotes(field: &str) -> bool {
    if field.is_empty() {
        return false;
    }
    if field == r"\." {
        return true;
    }
    if field.contains([DELIMITER, QUOTE, '\r', '\n']) {
        return true;
    }
    field.chars().next().is_some_and(char::is_whitespace)
}

#[derive(Debug, PartialEq, Eq)]
enum FieldEnd {
    Delimiter,
    Record,
    /// End of input inside a quoted field.
    OpenQuote,
}

/// True when the character after the current peeked one is `\n`.
fn next_is_newline(chars: &Peekable<Chars<'_>>) -> bool {
    let mut ahead = chars.clone();
    ahead.next();
    ahead.peek() == Some(&'\n')
}

fn read_field(chars: &mut Peekable<Chars<'_>>, line: &mut usize) -> (String, FieldEnd) {
    let mut field = String::new();

    if chars.peek() == Some(&QUOTE) {
        chars.next();
        loop {
            match chars.next() {
                None => return (field, FieldEnd::OpenQuote),
                Some(QUOTE) => match chars.peek().copied() {
                    None => return (field, FieldEnd::Record),
                    Some(QUOTE) => {
                        chars.next();
                        field.push(QUOTE);
                    }
                    Some(DELIMITER) => {
                        chars.next();
                        return (field, FieldEnd::Delimiter);
                    }
                    Some('\n') => {
                        chars.next();
                        *line += 1;
                        return (field, FieldEnd::Record);
                    }
                    Some('\r') if next_is_newline(chars) => {
                        chars.next();
                        chars.next();
                        *line += 1;
                        return (field, FieldEnd::Record);
                    }
                    // Stray quote after a quoted run: keep it and read the
                    // remainder of the field unquoted.
                    Some(_) => {
                        field.push(QUOTE);
                        return read_unquoted(chars, line, field);
                    }
                },
                Some('\r') if chars.peek() == Some(&'\n') => {
                    chars.next();
                    *line += 1;
                    field.push('\n');
                }
                Some('\n') => {
                    *line += 1;
                    field.push('\n');
                }
                Some(c) => field.push(c),
            }
        }
    }

    read_unquoted(chars, line, field)
}

fn read_unquoted(
    chars: &mut Peekable<Chars<'_>>,
    line: &mut usize,
    mut field: String,
) -> (String, FieldEnd) {
    loop {
        match chars.next() {
            None => return (field, FieldEnd::Record),
            Some(DELIMITER) => return (field, FieldEnd::Delimiter),
            Some('\n') => {
                *line += 1;
                return (field, FieldEnd::Record);
            }
            Some('\r') if chars.peek() == Some(&'\n') => {
                chars.next();
                *line += 1;
                return (field, FieldEnd::Record);
            }
            Some(c) => field.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(fields: &[&str]) -> String {
        let mut out = String::new();
        write_record(&mut out, fields);
        out
    }

    fn fields_of(input: &str) -> Vec<Vec<String>> {
        read_records(input)
            .into_iter()
            .map(|r| r.fields().to_vec())
            .collect()
    }

    #[test]
    fn plain_fields_are_not_quoted() {
        assert_eq!(
            encode(&["1", "buy milk", "2024-01-15T10:30:00Z", "false"]),
            "1,buy milk,2024-01-15T10:30:00Z,false\n"
        );
    }

    #[test]
    fn delimiter_quote_and_newline_force_quoting() {
        assert_eq!(encode(&["a,b"]), "\"a,b\"\n");
        assert_eq!(encode(&["say \"hi\""]), "\"say \"\"hi\"\"\"\n");
        assert_eq!(encode(&["two\nlines"]), "\"two\nlines\"\n");
        assert_eq!(encode(&["cr\ronly"]), "\"cr\ronly\"\n");
    }

    #[test]
    fn leading_whitespace_and_backslash_dot_are_quoted() {
        assert_eq!(encode(&[" padded"]), "\" padded\"\n");
        assert_eq!(encode(&["\tindented"]), "\"\tindented\"\n");
        assert_eq!(encode(&[r"\."]), "\"\\.\"\n");
        assert_eq!(encode(&["trailing "]), "trailing \n");
    }

    #[test]
    fn empty_field_is_never_quoted() {
        assert_eq!(encode(&["1", "", "x"]), "1,,x\n");
    }

    #[test]
    fn awkward_descriptions_survive_a_round_trip() {
        let descriptions = [
            "call Bob, then Alice",
            "the \"important\" one",
            "first line\nsecond line",
            "windows\r\nbreak",
            "  leading spaces",
            "\"",
            ",",
            "",
            "émoji ✓",
        ];
        for description in descriptions {
            let encoded = encode(&["7", description, "2024-01-15T10:30:00Z", "true"]);
            let parsed = fields_of(&encoded);
            // The reader folds an embedded CRLF to LF, like any line break.
            let expected = description.replace("\r\n", "\n");
            assert_eq!(parsed.len(), 1, "{description:?} split into several records");
            assert_eq!(parsed[0][1], expected, "description {description:?}");
            assert_eq!(parsed[0][3], "true");
        }
    }

    #[test]
    fn blank_lines_and_crlf_endings_are_tolerated() {
        let input = "\n1,a,t,false\r\n\r\n2,b,t,true\n\n";
        let records = read_records(input);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fields(), ["1", "a", "t", "false"]);
        assert_eq!(records[0].line(), 2);
        assert_eq!(records[1].fields(), ["2", "b", "t", "true"]);
        assert_eq!(records[1].line(), 4);
    }

    #[test]
    fn multi_line_field_advances_line_numbers() {
        let input = "1,\"a\nb\",t,false\n2,c,t,false\n";
        let records = read_records(input);
        assert_eq!(records[0].line(), 1);
        assert_eq!(records[0].fields()[1], "a\nb");
        assert_eq!(records[1].line(), 3);
    }

    #[test]
    fn malformed_quoting_is_read_literally() {
        assert_eq!(fields_of("1,say \"hi\",t,f\n")[0][1], "say \"hi\"");
        assert_eq!(fields_of("1,\"ab\"cd,t,f\n")[0][1], "ab\"cd");
        assert_eq!(fields_of("1,\"never closed")[0], vec!["1", "never closed"]);
    }

    #[test]
    fn input_ending_inside_quotes_is_reported() {
        assert!(parse("1,ok,t,false\n2,\"torn, desc").open_quote);
        assert!(parse("2,\"torn\nstill open\n").open_quote);
        assert!(parse("2,\"say \"\"").open_quote);

        assert!(!parse("2,\"closed\"").open_quote);
        assert!(!parse("2,\"closed\",t,false\n").open_quote);
        assert!(!parse("2,unquoted").open_quote);
        assert!(!parse("").open_quote);
    }

    #[test]
    fn closing_a_torn_field_separates_what_follows() {
        let mut text = String::from("1,ok,t,false\n2,\"torn, desc");
        text.push_str("\"\n");
        write_record(&mut text, &["3", "after", "t", "false"]);

        let parsed = parse(&text);
        assert!(!parsed.open_quote);
        let fields: Vec<_> = parsed.records.iter().map(|r| r.fields().to_vec()).collect();
        assert_eq!(fields[1], vec!["2", "torn, desc"]);
        assert_eq!(fields[2], vec!["3", "after", "t", "false"]);
    }

    #[test]
    fn missing_final_newline_and_trailing_delimiter() {
        assert_eq!(fields_of("1,a,t,false"), vec![vec!["1", "a", "t", "false"]]);
        assert_eq!(fields_of("1,a,\n"), vec![vec!["1", "a", ""]]);
    }

    #[test]
    fn empty_input_has_no_records() {
        assert!(read_records("").is_empty());
        assert!(read_records("\n\n").is_empty());
    }
}
