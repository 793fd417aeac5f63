pub mod book;
pub mod rating;
pub mod wishlist;

pub use book::{derive_book_id, Book, BookRow, BookSummary};
pub use rating::RatingRow;
pub use wishlist::{WishlistEntry, WishlistRow};
