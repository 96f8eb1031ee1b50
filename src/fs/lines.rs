//! Line streams over plain or gzip-compressed artifact files

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Lines of an artifact with the `\n` or `\r\n` terminator removed
///
/// Invalid UTF-8 is replaced rather than rejected, so one bad byte does not
/// hide the rest of the file. Decompression and I/O errors are yielded once,
/// after which the stream ends.
pub struct Lines {
    reader: Box<dyn BufRead>,
    buf: Vec<u8>,
    done: bool,
}

impl Iterator for Lines {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Open `path` for line-by-line reading, decompressing `.gz` files
pub fn read_lines(path: &Path) -> Result<Lines> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader: Box<dyn BufRead> = if is_gzip(path) {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(Lines {
        reader,
        buf: Vec::new(),
        done: false,
    })
}
