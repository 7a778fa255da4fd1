use std::cell::RefCell;
use std::io::{self, Result as IoResult, Write};
use std::rc::Rc;

/// How a spawned program's standard output reaches the shell's output sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildOutput {
    /// The child writes straight to the inherited file descriptor.
    Inherit,
    /// The child's output is piped back and written into the sink.
    Capture,
}

/// Output stream of the shell that also knows how spawned programs should
/// share it.
///
/// Implemented for the process stdout (children inherit it) and for
/// [`MemWriter`] (children are captured into memory).
pub trait Stdout: Write {
    fn child_output(&self) -> ChildOutput {
        ChildOutput::Inherit
    }
}

impl Stdout for io::Stdout {}

/// Memory-backed writer for capturing everything the shell prints.
///
/// Cloning the handle returned by [`MemWriter::with_handle`] lets the caller
/// read the collected bytes while the writer itself is owned by the shell.
#[derive(Default)]
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience: create writer and return (writer, rc_handle).
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let mw = MemWriter::new();
        let rc = mw.buf.clone();
        (mw, rc)
    }

    /// Collected output decoded as UTF-8, lossily.
    pub fn contents(handle: &Rc<RefCell<Vec<u8>>>) -> String {
        String::from_utf8_lossy(&handle.borrow()).into_owned()
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

impl Stdout for MemWriter {
    fn child_output(&self) -> ChildOutput {
        ChildOutput::Capture
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_sees_writes() {
        let (mut writer, handle) = MemWriter::with_handle();
        writeln!(writer, "ll ls -l").unwrap();
        writer.write_all(b"la ls -a\n").unwrap();

        assert_eq!(MemWriter::contents(&handle), "ll ls -l\nla ls -a\n");
        assert_eq!(writer.child_output(), ChildOutput::Capture);
    }

    #[test]
    fn test_process_stdout_is_inherited() {
        assert_eq!(io::stdout().child_output(), ChildOutput::Inherit);
    }
}
