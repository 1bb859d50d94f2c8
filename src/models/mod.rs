pub mod book;
pub mod genre;

pub use book::{Book, BookPatch, NewBook, ReadingStatus};
pub use genre::Genre;
