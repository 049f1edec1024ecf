use pointgroups_core::{ParseError, PointRecord};
use std::io::{self, BufRead, Write};

use crate::header::{read_trimmed_line, Encoding, Format, Header, PropertyDescriptor, Role, Width};

/// Parses the counts line that follows the `OFF` magic. Face and edge counts
/// are ignored; OFF vertex lines are always `x y z [r g b]`.
pub(crate) fn parse_off_header<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> Result<Header, ParseError> {
    let counts = loop {
        match read_trimmed_line(reader, buf)? {
            None => {
                return Err(ParseError::MalformedHeader(
                    "OFF header ends before the counts line".into(),
                ))
            }
            Some(line) if line.is_empty() || line.starts_with('#') => continue,
            Some(line) => break line,
        }
    };

    let vertex_count = counts
        .split_whitespace()
        .next()
        .and_then(|t| t.parse::<u32>().ok())
        .ok_or_else(|| {
            ParseError::MalformedHeader(format!("invalid OFF counts line '{}'", counts))
        })?;

    let properties = ["x", "y", "z"]
        .iter()
        .enumerate()
        .map(|(i, name)| PropertyDescriptor {
            index: i as u32,
            role: Role::from_name(name),
            width: Width::Float32,
            name: name.to_string(),
        })
        .collect();

    Ok(Header {
        format: Format::Off,
        encoding: Encoding::Ascii,
        vertex_count,
        properties,
    })
}

/// Writes an OFF file with per-vertex colours and no faces.
pub fn write_off<W: Write>(mut w: W, records: &[PointRecord]) -> io::Result<()> {
    writeln!(w, "OFF")?;
    writeln!(w, "{} 0", records.len())?;
    for r in records {
        let [x, y, z] = r.position;
        let [red, green, blue] = r.color;
        writeln!(w, "{} {} {} {} {} {}", x, y, z, red, green, blue)?;
    }
    w.flush()
}
