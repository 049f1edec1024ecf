use pointgroups_core::ParseError;
use std::io::BufRead;
use tracing::debug;

use crate::{off, ply};

/// File family, detected from the magic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Off,
    Ply,
}

impl Format {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "off" => Some(Format::Off),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

/// What a vertex property means to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    X,
    Y,
    Z,
    Red,
    Green,
    Blue,
    Other,
}

impl Role {
    pub fn from_name(name: &str) -> Self {
        match name {
            "x" => Role::X,
            "y" => Role::Y,
            "z" => Role::Z,
            "red" | "r" => Role::Red,
            "green" | "g" => Role::Green,
            "blue" | "b" => Role::Blue,
            _ => Role::Other,
        }
    }
}

/// On-disk width of a scalar property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Float32,
    Float64,
    UInt8,
}

impl Width {
    /// Unknown type names are assumed to be 4 bytes wide so that the record
    /// stride stays aligned.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "double" | "float64" => Width::Float64,
            "uchar" | "uint8" => Width::UInt8,
            _ => Width::Float32,
        }
    }

    pub fn byte_size(self) -> usize {
        match self {
            Width::Float32 => 4,
            Width::Float64 => 8,
            Width::UInt8 => 1,
        }
    }

    /// `bytes` must hold exactly `byte_size()` bytes.
    pub fn decode_le(self, bytes: &[u8]) -> f64 {
        match self {
            Width::Float32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
            Width::Float64 => f64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ]),
            Width::UInt8 => bytes[0] as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub index: u32,
    pub role: Role,
    pub width: Width,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub format: Format,
    pub encoding: Encoding,
    pub vertex_count: u32,
    /// Vertex properties in on-disk order.
    pub properties: Vec<PropertyDescriptor>,
}

impl Header {
    pub fn role_index(&self, role: Role) -> Option<usize> {
        self.properties.iter().position(|p| p.role == role)
    }

    /// Colour is all-or-nothing: a partial RGB set counts as absent.
    pub fn has_color(&self) -> bool {
        [Role::Red, Role::Green, Role::Blue]
            .iter()
            .all(|&r| self.role_index(r).is_some())
    }

    /// Bytes per binary vertex record.
    pub fn stride(&self) -> usize {
        self.properties.iter().map(|p| p.width.byte_size()).sum()
    }

    pub(crate) fn check_roles(&self) -> Result<(), ParseError> {
        for (role, name) in [(Role::X, "x"), (Role::Y, "y"), (Role::Z, "z")] {
            if self.role_index(role).is_none() {
                return Err(ParseError::MissingPositionProperty(name));
            }
        }
        for role in [
            Role::X,
            Role::Y,
            Role::Z,
            Role::Red,
            Role::Green,
            Role::Blue,
        ] {
            if self.properties.iter().filter(|p| p.role == role).count() > 1 {
                return Err(ParseError::MalformedHeader(format!(
                    "property role {:?} declared more than once",
                    role
                )));
            }
        }
        Ok(())
    }
}

/// Reads one `\n`-terminated line, trimmed. `None` at end of stream.
pub(crate) fn read_trimmed_line<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> std::io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(buf).trim().to_string()))
}

/// Parses the header and leaves `reader` positioned at the first byte of
/// vertex data.
///
/// The format is taken from the magic line; a `hint` (usually derived from
/// the file extension) must agree with it.
pub fn read_header<R: BufRead>(reader: &mut R, hint: Option<Format>) -> Result<Header, ParseError> {
    let mut buf = Vec::new();
    let magic = loop {
        match read_trimmed_line(reader, &mut buf)? {
            None => return Err(ParseError::MalformedHeader("source is empty".into())),
            Some(line) if line.is_empty() => continue,
            Some(line) => break line,
        }
    };

    let format = match magic.as_str() {
        "OFF" => Format::Off,
        "ply" => Format::Ply,
        other => {
            return Err(ParseError::MalformedHeader(format!(
                "unrecognised magic line '{}'",
                other
            )))
        }
    };

    if let Some(expected) = hint {
        if expected != format {
            return Err(ParseError::MalformedHeader(format!(
                "expected {:?} data but found {:?} magic line",
                expected, format
            )));
        }
    }

    let header = match format {
        Format::Off => off::parse_off_header(reader, &mut buf)?,
        Format::Ply => ply::parse_ply_header(reader, &mut buf)?,
    };

    debug!(
        format = ?header.format,
        encoding = ?header.encoding,
        vertices = header.vertex_count,
        properties = header.properties.len(),
        color = header.has_color(),
        "parsed header"
    );

    Ok(header)
}
