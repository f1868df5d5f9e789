//! Human-readable rendering of raw received bytes.
//!
//! Printable ASCII passes through, line feeds become newlines and every other
//! byte is escaped as `[XX]` in uppercase hex.

use std::fmt::{self, Write as _};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteClass {
    Printable(char),
    Newline,
    Other(u8),
}

impl ByteClass {
    pub fn of(byte: u8) -> Self {
        match byte {
            32..=126 => Self::Printable(byte as char),
            b'\n' => Self::Newline,
            _ => Self::Other(byte),
        }
    }
}

impl fmt::Display for ByteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Printable(c) => write!(f, "{c}"),
            Self::Newline => f.write_str("\n"),
            Self::Other(b) => write!(f, "[{}]", hex::encode_upper([*b])),
        }
    }
}

pub fn render(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        // Writing into a String cannot fail.
        let _ = write!(out, "{}", ByteClass::of(b));
    }
    out
}

/// Writes rendered data to an output stream, flushing after every buffer so
/// nothing is held back between arrivals.
pub struct Renderer<W: Write> {
    out: W,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(render(bytes).as_bytes())?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_byte_classifies() {
        for b in 0..=255u8 {
            let text = render(&[b]);
            match b {
                32..=126 => assert_eq!(text, (b as char).to_string()),
                10 => assert_eq!(text, "\n"),
                _ => assert_eq!(text, format!("[{b:02X}]")),
            }
        }
    }

    #[test]
    fn test_hex_padding() {
        assert_eq!(render(&[0]), "[00]");
        assert_eq!(render(&[9]), "[09]");
        assert_eq!(render(&[13]), "[0D]");
        assert_eq!(render(&[127]), "[7F]");
        assert_eq!(render(&[255]), "[FF]");
    }

    #[test]
    fn test_class_of() {
        assert_eq!(ByteClass::of(b' '), ByteClass::Printable(' '));
        assert_eq!(ByteClass::of(b'~'), ByteClass::Printable('~'));
        assert_eq!(ByteClass::of(10), ByteClass::Newline);
        assert_eq!(ByteClass::of(31), ByteClass::Other(31));
    }

    #[test]
    fn test_mixed_buffer() {
        assert_eq!(render(&[72, 105, 10, 0]), "Hi\n[00]");
    }

    #[test]
    fn test_order_preserved() {
        let buf = b"1 the quick\r\n\x00\xffok";
        let joined: String = buf.iter().map(|&b| render(&[b])).collect();
        assert_eq!(render(buf), joined);
        assert_eq!(render(buf), "1 the quick[0D]\n[00][FF]ok");
    }

    #[test]
    fn test_empty_buffer() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_renderer_appends_across_calls() {
        let mut renderer = Renderer::new(Vec::new());
        renderer.write(b"ab\x01").unwrap();
        renderer.write(b"\ncd").unwrap();
        assert_eq!(String::from_utf8(renderer.into_inner()).unwrap(), "ab[01]\ncd");
    }
}
