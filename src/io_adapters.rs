use std::cell::RefCell;
use std::io::{Cursor, Read, Result as IoResult, Write};
use std::process::Stdio;
use std::rc::Rc;

/// Memory-backed reader standing in for standard input.
pub struct MemReader {
    cursor: Cursor<Vec<u8>>,
}

impl MemReader {
    /// Create a MemReader that will read from the provided buffer.
    pub fn new(buf: Vec<u8>) -> Self {
        Self {
            cursor: Cursor::new(buf),
        }
    }
}

impl Read for MemReader {
    fn read(&mut self, out: &mut [u8]) -> IoResult<usize> {
        self.cursor.read(out)
    }
}

impl crate::command::InputStream for MemReader {
    /// A child process cannot read from our memory, so it gets an empty stdin.
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::null()
    }
}

/// Memory-backed writer capturing what built-ins print.
///
/// Cloning shares the buffer, so a clone kept by the caller sees everything
/// written through the one handed to a command.
#[derive(Clone, Default)]
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

impl crate::command::OutputStream for MemWriter {
    /// Child output cannot be captured in memory without a pipe; it is discarded.
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffer() {
        let writer = MemWriter::new();
        let mut handle = writer.clone();
        write!(handle, "hello ").unwrap();
        writeln!(handle, "world").unwrap();
        assert_eq!(writer.contents(), "hello world\n");
    }

    #[test]
    fn test_reader_yields_buffer() {
        let mut reader = MemReader::new(b"line\n".to_vec());
        let mut s = String::new();
        reader.read_to_string(&mut s).unwrap();
        assert_eq!(s, "line\n");
    }
}
