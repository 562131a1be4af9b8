//! Binary datasets of validated books.
//!
//! A dataset is a small header followed by one frame per book:
//!
//! ```text
//! +------+---------+----------------------------------------+
//! | SHLV | version | frame | frame | ...                    |
//! +------+---------+----------------------------------------+
//!   4 B     1 B      u32 LE payload length + MessagePack Book
//! ```
//!
//! Books are encoded with `rmp-serde` as named maps, so a reader from a
//! later build tolerates added optional fields. Frames are written and read
//! in insertion order; there is no index.
//!
//! # Examples
//!
//! ```
//! use shelver::persist::{BookReader, BookWriter};
//! use shelver::{Book, Genre};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let book = Book {
//!     title: "Dune".to_string(),
//!     authors: "Herbert".to_string(),
//!     price: 12.99,
//!     isbn: "0201038013".to_string(),
//!     genre: Genre::SportsMemorabilia,
//!     year: 1999,
//! };
//!
//! let mut buffer = Vec::new();
//! {
//!     let mut writer = BookWriter::new(&mut buffer)?;
//!     writer.write_book(&book)?;
//!     writer.finish()?;
//! }
//!
//! let mut reader = BookReader::new(buffer.as_slice())?;
//! assert_eq!(reader.read_book()?, Some(book));
//! assert_eq!(reader.read_book()?, None);
//! # Ok(())
//! # }
//! ```

use std::io::{ErrorKind, Read, Write};

use crate::book::Book;
use crate::error::{Result, ShelverError};

/// Leading bytes of every dataset.
pub const MAGIC: [u8; 4] = *b"SHLV";

/// Current format version.
pub const FORMAT_VERSION: u8 = 1;

/// Largest frame a reader will allocate for.
const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

/// Writes books to a binary dataset.
#[derive(Debug)]
pub struct BookWriter<W: Write> {
    writer: W,
    books_written: usize,
    finished: bool,
    scratch: Vec<u8>,
}

impl<W: Write> BookWriter<W> {
    /// Create a writer and emit the dataset header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be written.
    pub fn new(mut writer: W) -> Result<Self> {
        writer.write_all(&MAGIC)?;
        writer.write_all(&[FORMAT_VERSION])?;
        Ok(BookWriter {
            writer,
            books_written: 0,
            finished: false,
            scratch: Vec::new(),
        })
    }

    /// Append one book.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer was finished, the book cannot be
    /// encoded, or an I/O error occurs.
    pub fn write_book(&mut self, book: &Book) -> Result<()> {
        if self.finished {
            return Err(ShelverError::InvalidDataset(
                "Cannot write to a finished writer".to_string(),
            ));
        }

        self.scratch.clear();
        rmp_serde::encode::write_named(&mut self.scratch, book)?;
        let len = u32::try_from(self.scratch.len())
            .ok()
            .filter(|len| *len <= MAX_FRAME_LEN)
            .ok_or_else(|| {
                ShelverError::InvalidDataset(format!(
                    "book frame of {} bytes is too large",
                    self.scratch.len()
                ))
            })?;

        self.writer.write_all(&len.to_le_bytes())?;
        self.writer.write_all(&self.scratch)?;
        self.books_written += 1;
        Ok(())
    }

    /// Append every book from an iterator, returning how many were written.
    ///
    /// # Errors
    ///
    /// Stops at the first failing book.
    pub fn write_all<'a, I>(&mut self, books: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Book>,
    {
        let mut count = 0;
        for book in books {
            self.write_book(book)?;
            count += 1;
        }
        Ok(count)
    }

    /// Number of books written so far.
    #[must_use]
    pub fn books_written(&self) -> usize {
        self.books_written
    }

    /// Flush the underlying writer. Further writes are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.finished = true;
        Ok(())
    }
}

/// Reads books back from a binary dataset.
#[derive(Debug)]
pub struct BookReader<R: Read> {
    reader: R,
    books_read: usize,
    scratch: Vec<u8>,
}

impl<R: Read> BookReader<R> {
    /// Create a reader and check the dataset header.
    ///
    /// # Errors
    ///
    /// Returns [`ShelverError::InvalidDataset`] if the magic or version is
    /// wrong, or an I/O error.
    pub fn new(mut reader: R) -> Result<Self> {
        let mut header = [0u8; 5];
        reader.read_exact(&mut header).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                ShelverError::InvalidDataset("dataset header is truncated".to_string())
            } else {
                ShelverError::IoError(e)
            }
        })?;

        if header[..4] != MAGIC {
            return Err(ShelverError::InvalidDataset(
                "not a book dataset (bad magic)".to_string(),
            ));
        }
        if header[4] != FORMAT_VERSION {
            return Err(ShelverError::InvalidDataset(format!(
                "unsupported dataset version {}",
                header[4]
            )));
        }

        Ok(BookReader {
            reader,
            books_read: 0,
            scratch: Vec::new(),
        })
    }

    /// Read the next book.
    ///
    /// Returns `Ok(None)` at a clean end of stream.
    ///
    /// # Errors
    ///
    /// Returns [`ShelverError::InvalidDataset`] for a truncated frame, a
    /// decode error for a corrupt payload, or an I/O error.
    pub fn read_book(&mut self) -> Result<Option<Book>> {
        let mut len_bytes = [0u8; 4];
        let filled = read_fully(&mut self.reader, &mut len_bytes)?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < len_bytes.len() {
            return Err(ShelverError::InvalidDataset(format!(
                "frame length of book {} is truncated",
                self.books_read + 1
            )));
        }

        let len = u32::from_le_bytes(len_bytes);
        if len > MAX_FRAME_LEN {
            return Err(ShelverError::InvalidDataset(format!(
                "frame of book {} claims {len} bytes",
                self.books_read + 1
            )));
        }

        self.scratch.resize(len as usize, 0);
        if read_fully(&mut self.reader, &mut self.scratch)? < self.scratch.len() {
            return Err(ShelverError::InvalidDataset(format!(
                "frame of book {} is truncated",
                self.books_read + 1
            )));
        }

        let book = rmp_serde::from_slice(&self.scratch)?;
        self.books_read += 1;
        Ok(Some(book))
    }

    /// Read all remaining books.
    ///
    /// # Errors
    ///
    /// Returns the first error; books read before it are discarded.
    pub fn read_all(&mut self) -> Result<Vec<Book>> {
        let mut books = Vec::new();
        while let Some(book) = self.read_book()? {
            books.push(book);
        }
        Ok(books)
    }

    /// Number of books read so far.
    #[must_use]
    pub fn books_read(&self) -> usize {
        self.books_read
    }
}

impl<R: Read> Iterator for BookReader<R> {
    type Item = Result<Book>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_book().transpose()
    }
}

/// Fill `buf` as far as the stream allows, returning the bytes read.
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {},
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
