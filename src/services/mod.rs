//! Services Layer
//!
//! Business logic kept apart from the HTTP handlers. Handlers hold an
//! `AppState` and call into these; tests call them directly.

pub mod book_service;
pub mod feedback;
pub mod in_flight;
pub mod library_filter;
pub mod metadata_service;
pub mod selection;
pub mod stats_service;

// Re-export for convenience
pub use book_service::{BookService, DetailsUpdate, ManualEntry, ScannedBook, StatusChange, StatusUpdate};
pub use feedback::{Feedback, HapticStyle, SoundCue, TracingFeedback};
pub use in_flight::{InFlight, InFlightTicket, OperationGuards};
pub use library_filter::{LibraryCounts, StatusFilter, filter_books, unread_books};
pub use metadata_service::{MetadataResolver, normalize_isbn};
pub use selection::{FilterMode, FilterUpdate, GenreFilter, SpinOutcome, Wheel, WheelState};
pub use stats_service::{ChallengeKind, ChallengeTargets, StatsReport};
