/// Build a conjunction of Boolean expressions.
#[macro_export]
macro_rules! z3_and {
    ($first:expr, $( $x:expr, )*) => {
        {
            use z3::ast::{Ast, Bool};
            let first = $first;
            Bool::and(first.get_ctx(),  &[first, $($x,)*])
        }
    };
    ($( $x:expr ),*) => { $crate::z3_and!($($x,)*) }
}

/// Wrap the writer and write a prefix at the start of each line. Lines are
/// separated by '\n'.
#[derive(Debug)]
pub struct PrefixWriter<'a, W> {
    prefix: &'a [u8],
    line_start: bool,
    writer: W,
}

impl<'a, W> PrefixWriter<'a, W> {
    pub fn new(prefix: &'a [u8], writer: W) -> Self {
        PrefixWriter {
            prefix,
            line_start: true,
            writer,
        }
    }
}

impl<W: std::io::Write> std::io::Write for PrefixWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        for line in buf.split_inclusive(|c| *c == b'\n') {
            if self.line_start {
                self.writer.write_all(self.prefix)?;
            }
            self.writer.write_all(line)?;
            self.line_start = line.ends_with(b"\n");
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}
