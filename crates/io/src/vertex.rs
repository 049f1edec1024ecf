use pointgroups_core::{CancelToken, ConvertConfig, ParseError, PointRecord, DEFAULT_COLOR};
use std::io::{self, BufRead};

use crate::header::{read_trimmed_line, Encoding, Format, Header, Role, Width};

#[derive(Debug, Clone, Copy)]
struct Slot {
    role: Role,
    width: Width,
}

/// Streaming vertex decoder.
///
/// Yields exactly `header.vertex_count` records in file order, or stops at the
/// first error. Cancellation is only observed between whole records.
pub struct Vertices<R> {
    reader: R,
    encoding: Encoding,
    format: Format,
    slots: Vec<Slot>,
    config: ConvertConfig,
    expected: u32,
    decoded: u32,
    cancel: Option<CancelToken>,
    finished: bool,
    line: Vec<u8>,
    record: Vec<u8>,
}

impl<R: BufRead> Vertices<R> {
    /// `reader` must be positioned just past the header.
    pub fn new(reader: R, header: &Header, config: ConvertConfig) -> Self {
        let has_color = header.has_color();
        let slots = header
            .properties
            .iter()
            .map(|p| Slot {
                role: match p.role {
                    Role::Red | Role::Green | Role::Blue if !has_color => Role::Other,
                    role => role,
                },
                width: p.width,
            })
            .collect();

        Self {
            reader,
            encoding: header.encoding,
            format: header.format,
            slots,
            config,
            expected: header.vertex_count,
            decoded: 0,
            cancel: None,
            finished: false,
            line: Vec::new(),
            record: vec![0u8; header.stride()],
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn truncated(&self) -> ParseError {
        ParseError::TruncatedData {
            expected: self.expected,
            decoded: self.decoded,
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> ParseError {
        ParseError::InvalidVertex {
            index: self.decoded,
            reason: reason.into(),
        }
    }

    fn decode_one(&mut self) -> Result<PointRecord, ParseError> {
        match self.encoding {
            Encoding::BinaryLittleEndian => self.decode_binary(),
            Encoding::Ascii => self.decode_ascii(),
            Encoding::BinaryBigEndian => Err(ParseError::UnsupportedEncoding(
                "binary_big_endian PLY is not supported".into(),
            )),
        }
    }

    fn decode_binary(&mut self) -> Result<PointRecord, ParseError> {
        if let Err(e) = self.reader.read_exact(&mut self.record) {
            return Err(match e.kind() {
                io::ErrorKind::UnexpectedEof => self.truncated(),
                _ => ParseError::Io(e),
            });
        }

        let mut fields = Fields::default();
        let mut offset = 0;
        for slot in &self.slots {
            let size = slot.width.byte_size();
            if slot.role != Role::Other {
                fields.assign(slot.role, slot.width.decode_le(&self.record[offset..offset + size]));
            }
            offset += size;
        }
        Ok(fields.finish(&self.config))
    }

    fn decode_ascii(&mut self) -> Result<PointRecord, ParseError> {
        let line = loop {
            match read_trimmed_line(&mut self.reader, &mut self.line)? {
                None => return Err(self.truncated()),
                Some(line) if line.is_empty() => continue,
                Some(line) => break line,
            }
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let parse = |i: usize| -> Result<f64, ParseError> {
            tokens[i]
                .parse::<f64>()
                .map_err(|e| self.invalid(format!("token '{}': {}", tokens[i], e)))
        };

        let mut fields = Fields::default();
        match self.format {
            Format::Off => {
                if tokens.len() < 3 {
                    return Err(self.invalid(format!(
                        "expected at least 3 coordinates, got {}",
                        tokens.len()
                    )));
                }
                fields.assign(Role::X, parse(0)?);
                fields.assign(Role::Y, parse(1)?);
                fields.assign(Role::Z, parse(2)?);
                if tokens.len() >= 6 {
                    fields.assign(Role::Red, parse(3)?);
                    fields.assign(Role::Green, parse(4)?);
                    fields.assign(Role::Blue, parse(5)?);
                }
            }
            Format::Ply => {
                if tokens.len() < self.slots.len() {
                    return Err(self.invalid(format!(
                        "expected {} fields, got {}",
                        self.slots.len(),
                        tokens.len()
                    )));
                }
                for (i, slot) in self.slots.iter().enumerate() {
                    if slot.role != Role::Other {
                        fields.assign(slot.role, parse(i)?);
                    }
                }
            }
        }
        Ok(fields.finish(&self.config))
    }
}

impl<R: BufRead> Iterator for Vertices<R> {
    type Item = Result<PointRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.decoded == self.expected {
            self.finished = true;
            return None;
        }
        if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            self.finished = true;
            return Some(Err(ParseError::Cancelled {
                decoded: self.decoded,
            }));
        }

        match self.decode_one() {
            Ok(record) => {
                self.decoded += 1;
                Some(Ok(record))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        let remaining = (self.expected - self.decoded) as usize;
        (0, Some(remaining))
    }
}

/// Per-record accumulator; colour stays `None` unless a colour role is seen.
#[derive(Default)]
struct Fields {
    raw: [f64; 3],
    color: Option<[u8; 3]>,
}

impl Fields {
    fn assign(&mut self, role: Role, value: f64) {
        match role {
            Role::X => self.raw[0] = value,
            Role::Y => self.raw[1] = value,
            Role::Z => self.raw[2] = value,
            Role::Red => self.color.get_or_insert(DEFAULT_COLOR)[0] = to_channel(value),
            Role::Green => self.color.get_or_insert(DEFAULT_COLOR)[1] = to_channel(value),
            Role::Blue => self.color.get_or_insert(DEFAULT_COLOR)[2] = to_channel(value),
            Role::Other => {}
        }
    }

    fn finish(self, config: &ConvertConfig) -> PointRecord {
        PointRecord::new(
            config.transform(self.raw),
            self.color.unwrap_or(DEFAULT_COLOR),
        )
    }
}

fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
