use pointgroups_core::{ParseError, PointGroup, PointRecord};
use std::io::{self, BufRead, Write};

use crate::header::{read_trimmed_line, Encoding, Format, Header, PropertyDescriptor, Role, Width};

/// Parses PLY header lines after the `ply` magic, up to and including
/// `end_header`.
///
/// Only properties of `element vertex` join the property table. Validation
/// order: encoding first, so big-endian input is rejected before anything
/// else about it is judged, then the position roles.
pub(crate) fn parse_ply_header<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> Result<Header, ParseError> {
    let mut encoding = None;
    let mut vertex_count = None;
    let mut properties: Vec<PropertyDescriptor> = Vec::new();
    let mut in_vertex_element = false;

    loop {
        let line = read_trimmed_line(reader, buf)?.ok_or_else(|| {
            ParseError::MalformedHeader("stream ended before end_header".into())
        })?;

        if line == "end_header" {
            break;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.first().copied() {
            Some("format") => {
                let kind = parts.get(1).copied().unwrap_or_default();
                encoding = Some(if kind == "ascii" {
                    Encoding::Ascii
                } else if kind.contains("binary") {
                    if kind.contains("little_endian") {
                        Encoding::BinaryLittleEndian
                    } else {
                        Encoding::BinaryBigEndian
                    }
                } else {
                    return Err(ParseError::MalformedHeader(format!(
                        "unrecognised format line '{}'",
                        line
                    )));
                });
            }
            Some("element") => {
                in_vertex_element = parts.get(1) == Some(&"vertex");
                if in_vertex_element {
                    let count = parts
                        .get(2)
                        .and_then(|t| t.parse::<u32>().ok())
                        .ok_or_else(|| {
                            ParseError::MalformedHeader(format!(
                                "invalid element vertex line '{}'",
                                line
                            ))
                        })?;
                    vertex_count = Some(count);
                }
            }
            Some("property") if in_vertex_element => {
                if parts.get(1) == Some(&"list") {
                    return Err(ParseError::MalformedHeader(format!(
                        "list property on vertex element: '{}'",
                        line
                    )));
                }
                if parts.len() < 3 {
                    return Err(ParseError::MalformedHeader(format!(
                        "invalid property line '{}'",
                        line
                    )));
                }
                properties.push(PropertyDescriptor {
                    index: properties.len() as u32,
                    role: Role::from_name(parts[2]),
                    width: Width::from_type_name(parts[1]),
                    name: parts[2].to_string(),
                });
            }
            // comment, obj_info, properties of other elements
            _ => {}
        }
    }

    let encoding =
        encoding.ok_or_else(|| ParseError::MalformedHeader("PLY format line missing".into()))?;
    let vertex_count = vertex_count
        .ok_or_else(|| ParseError::MalformedHeader("PLY declares no vertex element".into()))?;

    if encoding == Encoding::BinaryBigEndian {
        return Err(ParseError::UnsupportedEncoding(
            "binary_big_endian PLY is not supported".into(),
        ));
    }

    let header = Header {
        format: Format::Ply,
        encoding,
        vertex_count,
        properties,
    };
    header.check_roles()?;
    Ok(header)
}

fn write_ply_header<W: Write>(w: &mut W, format: &str, count: usize) -> io::Result<()> {
    w.write_all(b"ply\n")?;
    writeln!(w, "format {} 1.0", format)?;
    writeln!(w, "element vertex {}", count)?;
    w.write_all(b"property float x\n")?;
    w.write_all(b"property float y\n")?;
    w.write_all(b"property float z\n")?;
    w.write_all(b"property uchar red\n")?;
    w.write_all(b"property uchar green\n")?;
    w.write_all(b"property uchar blue\n")?;
    w.write_all(b"end_header\n")
}

/// Write records as ASCII PLY (`float x y z`, `uchar red green blue`).
pub fn write_ply_ascii<W: Write>(mut w: W, records: &[PointRecord]) -> io::Result<()> {
    write_ply_header(&mut w, "ascii", records.len())?;
    for r in records {
        let [x, y, z] = r.position;
        let [red, green, blue] = r.color;
        writeln!(w, "{} {} {} {} {} {}", x, y, z, red, green, blue)?;
    }
    w.flush()
}

/// Write records as binary_little_endian PLY. Positions are narrowed to `f32`.
pub fn write_ply_binary<W: Write>(mut w: W, records: &[PointRecord]) -> io::Result<()> {
    write_ply_header(&mut w, "binary_little_endian", records.len())?;
    for r in records {
        for v in r.position {
            w.write_all(&(v as f32).to_le_bytes())?;
        }
        w.write_all(&r.color)?;
    }
    w.flush()
}

/// Write one point group as binary_little_endian PLY. Positions are written
/// as stored (re-based), so reading the file back is bit-exact.
pub fn write_group_ply<W: Write>(mut w: W, group: &PointGroup) -> io::Result<()> {
    write_ply_header(&mut w, "binary_little_endian", group.len())?;
    for (p, c) in group.positions.iter().zip(&group.colors) {
        for v in p {
            w.write_all(&v.to_le_bytes())?;
        }
        w.write_all(c)?;
    }
    w.flush()
}
