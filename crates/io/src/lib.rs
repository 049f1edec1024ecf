#![forbid(unsafe_code)]

pub mod header;
pub mod off;
pub mod ply;
pub mod source;
pub mod vertex;

pub use header::{read_header, Encoding, Format, Header, PropertyDescriptor, Role, Width};
pub use off::write_off;
pub use ply::{write_group_ply, write_ply_ascii, write_ply_binary};
pub use source::{format_of, open_source, resolve_source};
pub use vertex::Vertices;
