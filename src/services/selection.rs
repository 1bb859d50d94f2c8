//! Selection Service - the "wheel" that picks the next book to read
//!
//! Without a genre filter the wheel samples up to three unread books at
//! random. With a filter it asks the backend for the matching unread books
//! and shows that result as-is: no client-side re-filtering and no cap.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::sync::Mutex;

use super::feedback::{Feedback, HapticStyle, SoundCue};
use crate::domain::{BookRepository, DomainError};
use crate::models::{Book, ReadingStatus};

/// Picks shown when no genre filter is active
pub const WHEEL_PICKS: usize = 3;

/// Uniform sample without replacement, in random order
pub fn pick_random<R: Rng + ?Sized>(books: &[Book], count: usize, rng: &mut R) -> Vec<Book> {
    let mut shuffled = books.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(count);
    shuffled
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    Include,
    Exclude,
}

/// Genre selection plus include/exclude mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreFilter {
    mode: FilterMode,
    genres: Vec<String>,
}

impl GenreFilter {
    pub fn new(mode: FilterMode, genres: impl IntoIterator<Item = String>) -> Self {
        let mut filter = Self {
            mode,
            genres: Vec::new(),
        };
        for genre in genres {
            if !filter.genres.contains(&genre) {
                filter.genres.push(genre);
            }
        }
        filter
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    /// Add the genre if absent, remove it if present
    pub fn toggle(&mut self, genre: &str) {
        if let Some(pos) = self.genres.iter().position(|g| g == genre) {
            self.genres.remove(pos);
        } else {
            self.genres.push(genre.to_string());
        }
    }

    /// Switching to the other mode drops the selection
    pub fn set_mode(&mut self, mode: FilterMode) {
        if self.mode != mode {
            self.mode = mode;
            self.genres.clear();
        }
    }

    pub fn clear(&mut self) {
        self.genres.clear();
    }

    pub fn describe(&self) -> String {
        if self.genres.is_empty() {
            return "All genres".to_string();
        }
        let label = match self.mode {
            FilterMode::Include => "Including",
            FilterMode::Exclude => "Excluding",
        };
        format!("{}: {}", label, self.genres.join(", "))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum WheelState {
    #[default]
    Idle,
    Selecting,
    ResultReady(Vec<Book>),
    NoMatch,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SpinOutcome {
    Picked {
        books: Vec<Book>,
        #[serde(skip)]
        filter: GenreFilter,
    },
    NoMatch {
        #[serde(skip)]
        filter: GenreFilter,
    },
    /// The unread collection is empty, nothing was requested
    NoBooks {
        #[serde(skip)]
        filter: GenreFilter,
    },
    /// A spin is already in flight; this trigger was ignored
    Busy,
}

impl SpinOutcome {
    /// The filter this spin ran with; `None` for an ignored trigger
    pub fn filter(&self) -> Option<&GenreFilter> {
        match self {
            SpinOutcome::Picked { filter, .. }
            | SpinOutcome::NoMatch { filter }
            | SpinOutcome::NoBooks { filter } => Some(filter),
            SpinOutcome::Busy => None,
        }
    }
}

/// Filter changes carried by a spin request. Absent fields keep the
/// session values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FilterUpdate {
    pub genres: Option<Vec<String>>,
    pub mode: Option<FilterMode>,
}

impl FilterUpdate {
    fn apply_to(self, current: &GenreFilter) -> GenreFilter {
        GenreFilter::new(
            self.mode.unwrap_or(current.mode()),
            self.genres.unwrap_or_else(|| current.genres().to_vec()),
        )
    }
}

/// Holds the `Selecting` claim. Dropping it unsettled (a cancelled spin)
/// puts the wheel back to `Idle`.
struct SelectingClaim<'a> {
    state: &'a StdMutex<WheelState>,
    settled: bool,
}

impl SelectingClaim<'_> {
    fn settle(mut self, next: WheelState) {
        *lock(self.state) = next;
        self.settled = true;
    }
}

impl Drop for SelectingClaim<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("Spin abandoned before it finished, wheel reset to idle");
            *lock(self.state) = WheelState::Idle;
        }
    }
}

fn lock(state: &StdMutex<WheelState>) -> MutexGuard<'_, WheelState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One selection session. Only one spin may be in flight at a time.
#[derive(Debug, Default)]
pub struct Wheel {
    state: StdMutex<WheelState>,
    filter: Mutex<GenreFilter>,
}

impl Wheel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WheelState {
        lock(&self.state).clone()
    }

    pub async fn filter(&self) -> GenreFilter {
        self.filter.lock().await.clone()
    }

    pub async fn set_filter(&self, filter: GenreFilter) {
        *self.filter.lock().await = filter;
    }

    pub async fn toggle_genre(&self, genre: &str) -> GenreFilter {
        let mut filter = self.filter.lock().await;
        filter.toggle(genre);
        filter.clone()
    }

    pub async fn set_mode(&self, mode: FilterMode) -> GenreFilter {
        let mut filter = self.filter.lock().await;
        filter.set_mode(mode);
        filter.clone()
    }

    /// Claim `Selecting`, returning the state it replaced
    fn try_claim(&self) -> Option<(SelectingClaim<'_>, WheelState)> {
        let mut state = lock(&self.state);
        if *state == WheelState::Selecting {
            return None;
        }
        let previous = std::mem::replace(&mut *state, WheelState::Selecting);
        Some((
            SelectingClaim {
                state: &self.state,
                settled: false,
            },
            previous,
        ))
    }

    /// Run one selection over the caller's unread collection.
    ///
    /// `update` is applied to the session filter only once this spin owns
    /// the wheel; an ignored trigger changes nothing.
    pub async fn spin<R: BookRepository + ?Sized>(
        &self,
        repo: &R,
        unread: &[Book],
        update: Option<FilterUpdate>,
        feedback: &dyn Feedback,
    ) -> Result<SpinOutcome, DomainError> {
        let Some((claim, previous)) = self.try_claim() else {
            tracing::debug!("Spin ignored, one is already in flight");
            return Ok(SpinOutcome::Busy);
        };

        let filter = {
            let mut current = self.filter.lock().await;
            if let Some(update) = update {
                *current = update.apply_to(&current);
            }
            current.clone()
        };

        if unread.is_empty() {
            claim.settle(previous);
            return Ok(SpinOutcome::NoBooks { filter });
        }

        feedback.play(SoundCue::Wheel);
        tracing::info!("Spinning the wheel: {}", filter.describe());

        let result = if filter.is_empty() {
            let mut rng = rand::thread_rng();
            Ok(pick_random(unread, WHEEL_PICKS, &mut rng))
        } else {
            match filter.mode() {
                FilterMode::Include => repo.books_by_genre(filter.genres()).await,
                FilterMode::Exclude => repo.books_excluding_genre(filter.genres()).await,
            }
        };

        match result {
            Ok(books) if books.is_empty() => {
                claim.settle(WheelState::NoMatch);
                Ok(SpinOutcome::NoMatch { filter })
            }
            Ok(books) => {
                feedback.haptic(HapticStyle::Success);
                claim.settle(WheelState::ResultReady(books.clone()));
                Ok(SpinOutcome::Picked { books, filter })
            }
            Err(e) => {
                tracing::error!("Error spinning wheel: {}", e);
                claim.settle(WheelState::Error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Reflect a status change made from the result view on the shown picks
    pub fn mark_status(&self, book_id: &str, status: ReadingStatus) {
        if let WheelState::ResultReady(books) = &mut *lock(&self.state) {
            for book in books.iter_mut().filter(|b| b.id == book_id) {
                book.status = status;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookPatch, NewBook};
    use crate::services::feedback::testing::{Cue, RecordingFeedback};
    use crate::services::library_filter::fixtures::book;
    use async_trait::async_trait;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    /// Answers the two genre procedures from an in-memory list and records calls
    #[derive(Default)]
    struct FakeLibrary {
        books: Vec<Book>,
        fail: bool,
        /// Genre procedures never answer
        stall: bool,
        calls: StdMutex<Vec<&'static str>>,
    }

    impl FakeLibrary {
        fn with(books: Vec<Book>) -> Self {
            Self {
                books,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn unread(&self) -> impl Iterator<Item = &Book> {
            self.books
                .iter()
                .filter(|b| b.status == ReadingStatus::Unread)
        }
    }

    #[async_trait]
    impl BookRepository for FakeLibrary {
        async fn find_all(&self, _: crate::domain::BookFilter) -> Result<Vec<Book>, DomainError> {
            Ok(self.books.clone())
        }
        async fn find_by_id(&self, _: &str) -> Result<Option<Book>, DomainError> {
            unimplemented!()
        }
        async fn find_by_isbn(&self, _: &str) -> Result<Option<Book>, DomainError> {
            unimplemented!()
        }
        async fn create(&self, _: NewBook) -> Result<Book, DomainError> {
            unimplemented!()
        }
        async fn update(&self, _: &str, _: BookPatch) -> Result<Book, DomainError> {
            unimplemented!()
        }
        async fn delete(&self, _: &str) -> Result<(), DomainError> {
            unimplemented!()
        }

        async fn books_by_genre(&self, genres: &[String]) -> Result<Vec<Book>, DomainError> {
            self.calls.lock().unwrap().push("get_books_by_genre");
            if self.stall {
                std::future::pending::<()>().await;
            }
            if self.fail {
                return Err(DomainError::Database("rpc failed".to_string()));
            }
            Ok(self
                .unread()
                .filter(|b| genres.iter().any(|g| b.has_genre(g)))
                .cloned()
                .collect())
        }

        async fn books_excluding_genre(
            &self,
            genres: &[String],
        ) -> Result<Vec<Book>, DomainError> {
            self.calls.lock().unwrap().push("get_books_excluding_genre");
            Ok(self
                .unread()
                .filter(|b| !genres.iter().any(|g| b.has_genre(g)))
                .cloned()
                .collect())
        }
    }

    fn abc() -> Vec<Book> {
        vec![
            book("A", "A", ReadingStatus::Unread, &["Fiction"]),
            book("B", "B", ReadingStatus::Unread, &["Mystery"]),
            book("C", "C", ReadingStatus::Unread, &["Fiction", "Mystery"]),
        ]
    }

    fn ids(books: &[Book]) -> HashSet<String> {
        books.iter().map(|b| b.id.clone()).collect()
    }

    fn many(n: usize) -> Vec<Book> {
        (0..n)
            .map(|i| book(&i.to_string(), "t", ReadingStatus::Unread, &[]))
            .collect()
    }

    #[test]
    fn pick_random_takes_three_distinct_books() {
        let books = many(10);
        let mut rng = StdRng::seed_from_u64(7);
        let picks = pick_random(&books, WHEEL_PICKS, &mut rng);
        assert_eq!(picks.len(), 3);
        assert_eq!(ids(&picks).len(), 3);
    }

    #[test]
    fn pick_random_with_fewer_books_returns_all_of_them() {
        let books = many(2);
        let picks = pick_random(&books, WHEEL_PICKS, &mut StdRng::seed_from_u64(1));
        assert_eq!(ids(&picks), ids(&books));
    }

    #[test]
    fn pick_random_is_not_deterministic_across_seeds() {
        let books = many(20);
        let first = pick_random(&books, WHEEL_PICKS, &mut StdRng::seed_from_u64(1));
        let differs = (2..50).any(|seed| {
            pick_random(&books, WHEEL_PICKS, &mut StdRng::seed_from_u64(seed)) != first
        });
        assert!(differs);
    }

    #[test]
    fn pick_random_has_no_strong_bias() {
        let books = many(4);
        let mut rng = StdRng::seed_from_u64(42);
        let mut firsts = [0usize; 4];
        for _ in 0..4000 {
            let pick = pick_random(&books, 1, &mut rng);
            firsts[pick[0].id.parse::<usize>().unwrap()] += 1;
        }
        // Expect ~1000 each
        assert!(firsts.iter().all(|&n| (800..1200).contains(&n)), "{:?}", firsts);
    }

    #[test]
    fn toggle_adds_and_removes() {
        let mut filter = GenreFilter::default();
        filter.toggle("Mystery");
        filter.toggle("Fiction");
        assert_eq!(filter.genres(), ["Mystery", "Fiction"]);
        filter.toggle("Mystery");
        assert_eq!(filter.genres(), ["Fiction"]);
    }

    #[test]
    fn switching_mode_clears_selection() {
        let mut filter = GenreFilter::new(FilterMode::Include, ["Mystery".to_string()]);
        filter.set_mode(FilterMode::Exclude);
        assert_eq!(filter.mode(), FilterMode::Exclude);
        assert!(filter.is_empty());
    }

    #[test]
    fn setting_same_mode_keeps_selection() {
        let mut filter = GenreFilter::new(FilterMode::Exclude, ["Mystery".to_string()]);
        filter.set_mode(FilterMode::Exclude);
        assert_eq!(filter.genres(), ["Mystery"]);
    }

    #[test]
    fn describe_names_mode_and_genres() {
        assert_eq!(GenreFilter::default().describe(), "All genres");
        let filter = GenreFilter::new(
            FilterMode::Exclude,
            ["Horror".to_string(), "Poetry".to_string(), "Horror".to_string()],
        );
        assert_eq!(filter.describe(), "Excluding: Horror, Poetry");
    }

    #[tokio::test]
    async fn unfiltered_spin_samples_locally() {
        let library = FakeLibrary::with(many(8));
        let feedback = RecordingFeedback::default();
        let wheel = Wheel::new();

        let outcome = wheel.spin(&library, &library.books, None, &feedback).await.unwrap();

        let SpinOutcome::Picked { books, .. } = outcome else {
            panic!("expected picks, got {:?}", outcome);
        };
        assert_eq!(ids(&books).len(), 3);
        assert!(library.calls().is_empty());
        assert_eq!(wheel.state(), WheelState::ResultReady(books));
        assert_eq!(
            feedback.cues(),
            vec![Cue::Sound(SoundCue::Wheel), Cue::Haptic(HapticStyle::Success)]
        );
    }

    #[tokio::test]
    async fn include_filter_returns_server_result_verbatim() {
        let library = FakeLibrary::with(abc());
        let wheel = Wheel::new();
        wheel
            .set_filter(GenreFilter::new(FilterMode::Include, ["Mystery".to_string()]))
            .await;

        let outcome = wheel
            .spin(&library, &library.books, None, &RecordingFeedback::default())
            .await
            .unwrap();

        let SpinOutcome::Picked { books, .. } = outcome else {
            panic!("expected picks");
        };
        assert_eq!(ids(&books), ids(&abc()[1..]));
        assert_eq!(library.calls(), vec!["get_books_by_genre"]);
    }

    #[tokio::test]
    async fn exclude_filter_uses_the_exclusion_procedure() {
        let library = FakeLibrary::with(abc());
        let wheel = Wheel::new();
        wheel
            .set_filter(GenreFilter::new(FilterMode::Exclude, ["Mystery".to_string()]))
            .await;

        let outcome = wheel
            .spin(&library, &library.books, None, &RecordingFeedback::default())
            .await
            .unwrap();

        let SpinOutcome::Picked { books, .. } = outcome else {
            panic!("expected picks");
        };
        assert_eq!(ids(&books), HashSet::from(["A".to_string()]));
        assert_eq!(library.calls(), vec!["get_books_excluding_genre"]);
    }

    #[tokio::test]
    async fn filtered_result_is_not_capped() {
        let books: Vec<Book> = (0..6)
            .map(|i| book(&i.to_string(), "t", ReadingStatus::Unread, &["Fantasy"]))
            .collect();
        let library = FakeLibrary::with(books);
        let wheel = Wheel::new();
        wheel.toggle_genre("Fantasy").await;

        let outcome = wheel
            .spin(&library, &library.books, None, &RecordingFeedback::default())
            .await
            .unwrap();

        assert!(matches!(outcome, SpinOutcome::Picked { books, .. } if books.len() == 6));
    }

    #[tokio::test]
    async fn empty_filtered_result_is_no_match_not_error() {
        let library = FakeLibrary::with(abc());
        let feedback = RecordingFeedback::default();
        let wheel = Wheel::new();
        wheel.toggle_genre("Poetry").await;

        let outcome = wheel.spin(&library, &library.books, None, &feedback).await.unwrap();

        assert!(matches!(
            outcome,
            SpinOutcome::NoMatch { filter } if filter.mode() == FilterMode::Include
        ));
        assert_eq!(wheel.state(), WheelState::NoMatch);
        assert_eq!(feedback.cues(), vec![Cue::Sound(SoundCue::Wheel)]);
    }

    #[tokio::test]
    async fn empty_collection_makes_no_request() {
        let library = FakeLibrary::default();
        let wheel = Wheel::new();
        wheel.toggle_genre("Fiction").await;

        let outcome = wheel
            .spin(&library, &[], None, &RecordingFeedback::default())
            .await
            .unwrap();

        assert!(matches!(outcome, SpinOutcome::NoBooks { .. }));
        assert!(library.calls().is_empty());
        assert_eq!(wheel.state(), WheelState::Idle);
    }

    #[tokio::test]
    async fn backend_failure_sets_error_state() {
        let library = FakeLibrary {
            books: abc(),
            fail: true,
            ..Default::default()
        };
        let wheel = Wheel::new();
        wheel.toggle_genre("Fiction").await;

        let err = wheel
            .spin(&library, &library.books, None, &RecordingFeedback::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Database(_)));
        assert!(matches!(wheel.state(), WheelState::Error(_)));
    }

    #[tokio::test]
    async fn spin_while_selecting_is_ignored() {
        let library = FakeLibrary::with(abc());
        let wheel = Wheel::new();
        *lock(&wheel.state) = WheelState::Selecting;

        let outcome = wheel
            .spin(&library, &library.books, None, &RecordingFeedback::default())
            .await
            .unwrap();

        assert_eq!(outcome, SpinOutcome::Busy);
        assert_eq!(wheel.state(), WheelState::Selecting);
    }

    #[tokio::test]
    async fn a_new_spin_is_allowed_after_a_result() {
        let library = FakeLibrary::with(abc());
        let wheel = Wheel::new();
        let feedback = RecordingFeedback::default();

        wheel.spin(&library, &library.books, None, &feedback).await.unwrap();
        let again = wheel.spin(&library, &library.books, None, &feedback).await.unwrap();

        assert!(matches!(again, SpinOutcome::Picked { .. }));
    }

    #[tokio::test]
    async fn mark_status_updates_the_shown_pick() {
        let library = FakeLibrary::with(abc());
        let wheel = Wheel::new();
        wheel
            .spin(&library, &library.books, None, &RecordingFeedback::default())
            .await
            .unwrap();

        wheel.mark_status("B", ReadingStatus::Reading);

        let WheelState::ResultReady(books) = wheel.state() else {
            panic!("expected result");
        };
        let b = books.iter().find(|b| b.id == "B").unwrap();
        assert_eq!(b.status, ReadingStatus::Reading);
    }

    #[tokio::test]
    async fn cancelled_spin_releases_the_wheel() {
        let library = FakeLibrary {
            books: abc(),
            stall: true,
            ..Default::default()
        };
        let wheel = Wheel::new();
        wheel.toggle_genre("Fiction").await;
        let feedback = RecordingFeedback::default();

        let first = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            wheel.spin(&library, &library.books, None, &feedback),
        )
        .await;
        assert!(first.is_err());
        assert_eq!(wheel.state(), WheelState::Idle);

        let clear = FilterUpdate {
            genres: Some(Vec::new()),
            ..Default::default()
        };
        let again = wheel
            .spin(&library, &library.books, Some(clear), &feedback)
            .await
            .unwrap();
        assert!(matches!(again, SpinOutcome::Picked { .. }));
    }

    #[tokio::test]
    async fn ignored_trigger_keeps_the_session_filter() {
        let library = FakeLibrary::with(abc());
        let wheel = Wheel::new();
        let mystery = GenreFilter::new(FilterMode::Include, ["Mystery".to_string()]);
        wheel.set_filter(mystery.clone()).await;
        *lock(&wheel.state) = WheelState::Selecting;

        let outcome = wheel
            .spin(
                &library,
                &library.books,
                Some(FilterUpdate {
                    genres: Some(vec!["Poetry".to_string()]),
                    mode: Some(FilterMode::Exclude),
                }),
                &RecordingFeedback::default(),
            )
            .await
            .unwrap();

        assert_eq!(outcome, SpinOutcome::Busy);
        assert_eq!(outcome.filter(), None);
        assert_eq!(wheel.filter().await, mystery);
        assert!(library.calls().is_empty());
    }

    #[tokio::test]
    async fn spin_request_updates_the_filter_it_runs_with() {
        let library = FakeLibrary::with(abc());
        let wheel = Wheel::new();
        wheel.toggle_genre("Fiction").await;

        let outcome = wheel
            .spin(
                &library,
                &library.books,
                Some(FilterUpdate {
                    mode: Some(FilterMode::Exclude),
                    ..Default::default()
                }),
                &RecordingFeedback::default(),
            )
            .await
            .unwrap();

        let used = GenreFilter::new(FilterMode::Exclude, ["Fiction".to_string()]);
        assert_eq!(outcome.filter(), Some(&used));
        assert_eq!(wheel.filter().await, used);
        assert_eq!(library.calls(), vec!["get_books_excluding_genre"]);
        assert!(matches!(outcome, SpinOutcome::Picked { books, .. } if books[0].id == "B"));
    }
}
