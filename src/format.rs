//! Record rendering into fixed scratch buffers.
//!
//! Record layout:
//!
//! ```text
//! [COLOR]<time>|<uptime_ms:010>|<L>|<component>|<function>:<message>[RESET]\r\n
//! ```
//!
//! Rendering never allocates. A message that does not fit is cut short, but
//! room for the color reset and the line terminator is always kept, so every
//! record that reaches the channel ends with `\r\n`.

use core::fmt::{self, Write};

use crate::level::{LogLevel, COLOR_RESET};
use crate::status::Status;

/// Record terminator.
pub const LINE_END: &str = "\r\n";

/// Provider of the human readable time prefix.
///
/// Implementations write directly into the record being composed, so the
/// string only has to live for the duration of the call.
pub trait TimeSource: Sync {
    fn write_time(&self, out: &mut dyn Write) -> fmt::Result;
}

/// Time source that writes nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTime;

impl TimeSource for NoTime {
    fn write_time(&self, _out: &mut dyn Write) -> fmt::Result {
        Ok(())
    }
}

/// Truncating `fmt::Write` adapter over a byte slice.
pub struct BufWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
    truncated: bool,
}

impl<'a> BufWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            truncated: false,
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// True once any write was cut short.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl<'a> Write for BufWriter<'a> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let remaining = self.buf.len() - self.pos;
        let to_write = bytes.len().min(remaining);
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        if to_write < bytes.len() {
            self.truncated = true;
        }
        Ok(())
    }
}

/// Format a message into a buffer.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: fmt::Arguments<'_>) -> Result<usize, Status> {
    let mut writer = BufWriter::new(buf);
    writer.write_fmt(args).map_err(|_| Status::Failed)?;
    Ok(writer.len())
}

/// Fixed fields of a record.
pub struct RecordHeader<'a> {
    pub level: LogLevel,
    pub uptime_ms: u32,
    pub component: &'a str,
    pub function: &'a str,
    pub color: bool,
    pub time: &'a dyn TimeSource,
}

/// Render one complete record into `buf`.
///
/// Returns the record length. Fails with [`Status::Failed`] when the time
/// source or the message formatting reports an error, or when `buf` cannot
/// even hold the terminator.
pub fn render_record(
    buf: &mut [u8],
    header: &RecordHeader<'_>,
    args: fmt::Arguments<'_>,
) -> Result<usize, Status> {
    let reset = if header.color { COLOR_RESET } else { "" };
    let suffix_len = reset.len() + LINE_END.len();
    if buf.len() < suffix_len {
        return Err(Status::Failed);
    }

    let body_cap = buf.len() - suffix_len;
    let body_len = {
        let mut writer = BufWriter::new(&mut buf[..body_cap]);
        compose(&mut writer, header, args).map_err(|_| Status::Failed)?;
        writer.len()
    };

    let mut pos = body_len;
    for part in [reset, LINE_END] {
        buf[pos..pos + part.len()].copy_from_slice(part.as_bytes());
        pos += part.len();
    }
    Ok(pos)
}

fn compose(out: &mut BufWriter<'_>, header: &RecordHeader<'_>, args: fmt::Arguments<'_>) -> fmt::Result {
    if header.color {
        out.write_str(header.level.color())?;
    }
    header.time.write_time(out)?;
    write!(
        out,
        "|{:010}|{}|{}|{}:",
        header.uptime_ms,
        header.level.as_char(),
        header.component,
        header.function
    )?;
    out.write_fmt(args)
}

/// Space separated uppercase hex pairs, e.g. `01 02 FF`.
#[derive(Clone, Copy, Debug)]
pub struct HexChunk<'a>(pub &'a [u8]);

impl fmt::Display for HexChunk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_char(' ')?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTime(&'static str);

    impl TimeSource for FixedTime {
        fn write_time(&self, out: &mut dyn Write) -> fmt::Result {
            out.write_str(self.0)
        }
    }

    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    fn header(color: bool, time: &dyn TimeSource) -> RecordHeader<'_> {
        RecordHeader {
            level: LogLevel::Info,
            uptime_ms: 1234,
            component: "Net",
            function: "connect",
            color,
            time,
        }
    }

    #[test]
    fn test_format_to_buffer() {
        let mut buf = [0u8; 32];
        let len = format_to_buffer(&mut buf, format_args!("Hello {}", 42)).unwrap();
        assert_eq!(&buf[..len], b"Hello 42");
    }

    #[test]
    fn test_render_plain_record() {
        let mut buf = [0u8; 128];
        let len = render_record(&mut buf, &header(false, &NoTime), format_args!("up {}", 3)).unwrap();
        assert_eq!(&buf[..len], b"|0000001234|I|Net|connect:up 3\r\n");
    }

    #[test]
    fn test_uptime_field_spans_full_u32_range() {
        let mut buf = [0u8; 128];
        let mut last = header(false, &NoTime);
        last.uptime_ms = u32::MAX;
        let len = render_record(&mut buf, &last, format_args!("x")).unwrap();
        assert_eq!(&buf[..len], b"|4294967295|I|Net|connect:x\r\n");

        // after the wrap
        last.uptime_ms = u32::MAX.wrapping_add(1);
        let len = render_record(&mut buf, &last, format_args!("x")).unwrap();
        assert_eq!(&buf[..len], b"|0000000000|I|Net|connect:x\r\n");
    }

    #[test]
    fn test_render_colored_record_with_time() {
        let mut buf = [0u8; 128];
        let time = FixedTime("12:00:01");
        let len = render_record(&mut buf, &header(true, &time), format_args!("ok")).unwrap();
        assert_eq!(
            &buf[..len],
            b"\x1b[32m12:00:01|0000001234|I|Net|connect:ok\x1b[0m\r\n"
        );
    }

    #[test]
    fn test_render_truncates_but_keeps_terminator() {
        let mut buf = [0u8; 40];
        let len = render_record(
            &mut buf,
            &header(false, &NoTime),
            format_args!("{}", "a very long message that cannot possibly fit"),
        )
        .unwrap();

        assert_eq!(len, 40);
        assert!(buf[..len].ends_with(b"\r\n"));
        assert!(buf[..len].starts_with(b"|0000001234|I|Net|connect:a very"));
    }

    #[test]
    fn test_render_fails_on_format_error() {
        let mut buf = [0u8; 64];
        let result = render_record(&mut buf, &header(false, &NoTime), format_args!("{}", Broken));
        assert_eq!(result, Err(Status::Failed));
    }

    #[test]
    fn test_render_rejects_tiny_buffer() {
        let mut buf = [0u8; 1];
        let result = render_record(&mut buf, &header(false, &NoTime), format_args!("x"));
        assert_eq!(result, Err(Status::Failed));
    }

    #[test]
    fn test_hex_chunk() {
        assert_eq!(format!("{}", HexChunk(&[0x01, 0x02, 0x03, 0x04, 0x05])), "01 02 03 04 05");
        assert_eq!(format!("{}", HexChunk(&[0xAB])), "AB");
        assert_eq!(format!("{}", HexChunk(&[])), "");
    }

    #[test]
    fn test_buf_writer_reports_truncation() {
        let mut buf = [0u8; 4];
        let mut writer = BufWriter::new(&mut buf);
        writer.write_str("abcdef").unwrap();
        assert_eq!(writer.len(), 4);
        assert!(writer.is_truncated());
    }
}
