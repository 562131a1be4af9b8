//! Interactive, paginated viewing of loaded datasets.
//!
//! Two pieces live here:
//!
//! - [`PageCursor`], a pure state machine over `len` records that turns a
//!   signed step into a window `[top, last]` plus BOF/EOF flags.
//! - [`Navigator`], the console session: a main menu (`v`/`s`/`x`), a file
//!   sub-menu (`1`-`9`) and the viewing loop that feeds integers to a cursor.
//!
//! # Paging
//!
//! `current` is the anchor the next step starts from. A forward step of
//! `n > 1` shows `[current, current + n - 1]` and moves the anchor past the
//! window, so consecutive forward pages never overlap. A backward step of
//! `n < -1` shows `[current - |n| + 1, current]` and moves the anchor before
//! the window. Hitting either end clamps the window and raises the matching
//! flag; moving in the opposite direction clears it. `1` and `-1` show the
//! anchor record alone.
//!
//! A backward step starts from `current`, not from the last record shown.
//! After a forward page the anchor is the record after the window, so the
//! next backward page includes it: with 10 records, `5` shows `[0, 4]` and
//! then `-3` shows `[3, 5]`.
//!
//! ```
//! use shelver::navigator::PageCursor;
//!
//! let mut cursor = PageCursor::new(10);
//! cursor.step(7);
//! assert_eq!(cursor.window(), Some(0..=6));
//! cursor.step(7);
//! assert_eq!(cursor.window(), Some(7..=9));
//! assert!(cursor.at_eof());
//! cursor.step(-20);
//! assert_eq!(cursor.window(), Some(0..=9));
//! assert!(cursor.at_bof());
//! ```

use std::io::{BufRead, Write};
use std::ops::RangeInclusive;

use crate::book::Book;
use crate::error::Result;
use crate::genre::Genre;
use crate::store::Library;

/// Window position and boundary flags over a fixed number of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    len: usize,
    top: usize,
    last: usize,
    current: usize,
    at_bof: bool,
    at_eof: bool,
}

impl PageCursor {
    /// A cursor showing the first record alone.
    #[must_use]
    pub fn new(len: usize) -> Self {
        PageCursor {
            len,
            top: 0,
            last: 0,
            current: 0,
            at_bof: false,
            at_eof: false,
        }
    }

    /// Move by `n` records. `0` leaves the cursor unchanged, as does any
    /// step over an empty dataset.
    pub fn step(&mut self, n: i64) {
        if n == 0 || self.len == 0 {
            return;
        }

        let max = self.len - 1;
        let span = usize::try_from(n.unsigned_abs() - 1).unwrap_or(usize::MAX);

        if span == 0 {
            self.top = self.current;
            self.last = self.current;
            self.at_bof = false;
            self.at_eof = false;
        } else if n > 0 {
            self.top = self.current;
            let end = self.current.saturating_add(span);
            if end > max {
                self.last = max;
                self.current = max;
                self.at_eof = true;
            } else {
                self.last = end;
                self.current = (end + 1).min(max);
                self.at_eof = false;
            }
            self.at_bof = false;
        } else {
            self.last = self.current;
            if span > self.current {
                self.top = 0;
                self.at_bof = true;
            } else {
                self.top = self.current - span;
                self.at_bof = false;
            }
            self.current = self.top.saturating_sub(1);
            self.at_eof = false;
        }
    }

    /// Indices of the displayed records, or `None` when there are none.
    #[must_use]
    pub fn window(&self) -> Option<RangeInclusive<usize>> {
        (self.len > 0).then_some(self.top..=self.last)
    }

    /// The displayed records of `books`.
    ///
    /// `books` should be the slice the cursor was created for.
    #[must_use]
    pub fn slice<'a>(&self, books: &'a [Book]) -> &'a [Book] {
        match self.window() {
            Some(range) if *range.end() < books.len() => &books[range],
            _ => &[],
        }
    }

    /// Index the next step starts from.
    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Whether the last backward step hit the first record.
    #[must_use]
    pub fn at_bof(&self) -> bool {
        self.at_bof
    }

    /// Whether the last forward step hit the final record.
    #[must_use]
    pub fn at_eof(&self) -> bool {
        self.at_eof
    }
}

/// Choice made at the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// `v` - view the selected dataset.
    View,
    /// `s` - choose another dataset.
    Select,
    /// `x` - end the session.
    Exit,
}

impl MenuChoice {
    /// Parse trimmed, case-insensitive input.
    #[must_use]
    pub fn parse(input: &str) -> Option<MenuChoice> {
        match input.trim().to_lowercase().as_str() {
            "v" => Some(MenuChoice::View),
            "s" => Some(MenuChoice::Select),
            "x" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Choice made at the file sub-menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChoice {
    /// `1`-`8` - a genre.
    Genre(Genre),
    /// `9` - keep the current selection.
    Cancel,
}

impl FileChoice {
    /// Parse a single digit `1`-`9`.
    #[must_use]
    pub fn parse(input: &str) -> Option<FileChoice> {
        let input = input.trim();
        let mut chars = input.chars();
        let digit = chars.next()?.to_digit(10)?;
        if chars.next().is_some() {
            return None;
        }
        match digit {
            9 => Some(FileChoice::Cancel),
            1..=8 => Genre::ALL
                .get(digit as usize - 1)
                .copied()
                .map(FileChoice::Genre),
            _ => None,
        }
    }
}

const RULE: &str = "-----------------------------";

/// Console session over a [`Library`].
///
/// Input is line-oriented; invalid entries re-prompt. End of input ends the
/// session as if `x` had been chosen.
#[derive(Debug)]
pub struct Navigator<'a, R: BufRead, W: Write> {
    library: &'a Library,
    input: R,
    output: W,
    selected: Genre,
}

impl<'a, R: BufRead, W: Write> Navigator<'a, R, W> {
    /// Start a session with the first genre selected.
    pub fn new(library: &'a Library, input: R, output: W) -> Self {
        Navigator {
            library,
            input,
            output,
            selected: Genre::ALL[0],
        }
    }

    /// The currently selected genre.
    #[must_use]
    pub fn selected(&self) -> Genre {
        self.selected
    }

    /// Give back the output writer.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the menu loop until `x` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the console cannot be read or written.
    pub fn run(&mut self) -> Result<()> {
        loop {
            match self.main_menu()? {
                Some(MenuChoice::View) => {
                    if !self.view()? {
                        break;
                    }
                },
                Some(MenuChoice::Select) => match self.file_menu()? {
                    Some(FileChoice::Genre(genre)) => {
                        tracing::debug!(genre = %genre, "dataset selected");
                        self.selected = genre;
                    },
                    Some(FileChoice::Cancel) => {},
                    None => break,
                },
                Some(MenuChoice::Exit) => {
                    writeln!(self.output, "You chose to exit, exiting the program.")?;
                    break;
                },
                None => break,
            }
        }
        self.output.flush()?;
        Ok(())
    }

    fn describe(&self, genre: Genre) -> String {
        format!(
            "{} ({} records)",
            genre.binary_file_name(),
            self.library.count(genre)
        )
    }

    /// Read one line, `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn main_menu(&mut self) -> Result<Option<MenuChoice>> {
        writeln!(self.output)?;
        writeln!(self.output, "{RULE}")?;
        writeln!(self.output, "         Main Menu")?;
        writeln!(self.output, "{RULE}")?;
        writeln!(
            self.output,
            "v View the selected file: {}",
            self.describe(self.selected)
        )?;
        writeln!(self.output, "s Select a file to view")?;
        writeln!(self.output, "x Exit")?;
        writeln!(self.output, "{RULE}")?;
        writeln!(self.output)?;

        loop {
            let Some(line) = self.prompt("Enter your choice: ")? else {
                return Ok(None);
            };
            if let Some(choice) = MenuChoice::parse(&line) {
                return Ok(Some(choice));
            }
            writeln!(self.output, "Invalid choice. Please enter 'v', 's', or 'x'.")?;
        }
    }

    fn file_menu(&mut self) -> Result<Option<FileChoice>> {
        writeln!(self.output)?;
        writeln!(self.output, "{RULE}")?;
        writeln!(self.output, "         File Sub-Menu")?;
        writeln!(self.output, "{RULE}")?;
        writeln!(self.output)?;
        for (i, genre) in Genre::ALL.into_iter().enumerate() {
            writeln!(self.output, "{}  {}", i + 1, self.describe(genre))?;
        }
        writeln!(self.output, "9  Exit")?;
        writeln!(self.output, "{RULE}")?;

        loop {
            writeln!(self.output)?;
            let Some(line) = self.prompt("Enter your choice: ")? else {
                return Ok(None);
            };
            if let Some(choice) = FileChoice::parse(&line) {
                return Ok(Some(choice));
            }
            writeln!(
                self.output,
                "Invalid choice. Please enter a digit between 1 and 9"
            )?;
        }
    }

    /// View the selected dataset. Returns `false` if input ended.
    fn view(&mut self) -> Result<bool> {
        let library = self.library;
        let books = library.books(self.selected);
        let mut cursor = PageCursor::new(books.len());

        writeln!(self.output)?;
        writeln!(self.output, "viewing: {}", self.describe(self.selected))?;

        loop {
            self.show(&cursor, books)?;

            let n = loop {
                let Some(line) = self.prompt("Enter n ")? else {
                    return Ok(false);
                };
                match line.trim().parse::<i64>() {
                    Ok(n) => break n,
                    Err(_) => writeln!(
                        self.output,
                        "Invalid input. Please enter a valid integer."
                    )?,
                }
            };

            if n == 0 {
                return Ok(true);
            }
            cursor.step(n);
        }
    }

    fn show(&mut self, cursor: &PageCursor, books: &[Book]) -> Result<()> {
        writeln!(self.output)?;
        if books.is_empty() {
            writeln!(self.output, "(no records)")?;
            return Ok(());
        }
        if cursor.at_bof() {
            writeln!(self.output, "BOF has been reached")?;
            writeln!(self.output)?;
        }
        for book in cursor.slice(books) {
            writeln!(self.output, "{book}")?;
        }
        if cursor.at_eof() {
            writeln!(self.output, "EOF has been reached")?;
        }
        Ok(())
    }
}
