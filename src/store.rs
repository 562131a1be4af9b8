//! In-memory record stores.
//!
//! [`RecordStore`] is the write side: an append-only sequence of validated
//! books for one genre, filled by the semantic stage. [`Library`] is the read
//! side: every genre's books as loaded back from their binary datasets, which
//! the navigator pages through.
//!
//! Insertion order is the only order; nothing is ever sorted.

use indexmap::IndexMap;

use crate::book::Book;
use crate::genre::Genre;

/// Default number of books a new store has room for before growing.
pub const DEFAULT_CAPACITY: usize = 100;

/// Append-only books for one genre.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordStore {
    genre: Genre,
    books: Vec<Book>,
}

impl RecordStore {
    /// Create an empty store with [`DEFAULT_CAPACITY`].
    #[must_use]
    pub fn new(genre: Genre) -> Self {
        Self::with_capacity(genre, DEFAULT_CAPACITY)
    }

    /// Create an empty store with room for `capacity` books.
    #[must_use]
    pub fn with_capacity(genre: Genre, capacity: usize) -> Self {
        RecordStore {
            genre,
            books: Vec::with_capacity(capacity),
        }
    }

    /// The genre this store holds.
    #[must_use]
    pub fn genre(&self) -> Genre {
        self.genre
    }

    /// Append a book.
    pub fn push(&mut self, book: Book) {
        self.books.push(book);
    }

    /// Number of books stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Books in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Book> {
        self.books.iter()
    }

    /// Books as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Book] {
        &self.books
    }

    /// Give up the books.
    #[must_use]
    pub fn into_books(self) -> Vec<Book> {
        self.books
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Book;
    type IntoIter = std::slice::Iter<'a, Book>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Every genre's books, keyed and ordered by [`Genre::ALL`].
///
/// A genre whose dataset could not be loaded is present with no books.
#[derive(Debug, Clone, PartialEq)]
pub struct Library {
    datasets: IndexMap<Genre, Vec<Book>>,
}

impl Default for Library {
    fn default() -> Self {
        Library {
            datasets: Genre::ALL.into_iter().map(|g| (g, Vec::new())).collect(),
        }
    }
}

impl Library {
    /// An empty library with all eight genres present.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a genre's books.
    pub fn insert(&mut self, genre: Genre, books: Vec<Book>) {
        self.datasets.insert(genre, books);
    }

    /// A genre's books.
    #[must_use]
    pub fn books(&self, genre: Genre) -> &[Book] {
        self.datasets
            .get(&genre)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of books in a genre.
    #[must_use]
    pub fn count(&self, genre: Genre) -> usize {
        self.books(genre).len()
    }

    /// Total books across all genres.
    #[must_use]
    pub fn total(&self) -> usize {
        self.datasets.values().map(Vec::len).sum()
    }
}

impl From<Vec<RecordStore>> for Library {
    fn from(stores: Vec<RecordStore>) -> Self {
        let mut library = Library::new();
        for store in stores {
            let genre = store.genre();
            library.insert(genre, store.into_books());
        }
        library
    }
}
