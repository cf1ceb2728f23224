//! Async query abstraction for data fetching.
//!
//! Inspired by TanStack Query, this module provides a `Query<T, E>` type that
//! encapsulates an async request, its loading state and its outcome. The
//! request runs on a spawned task; the result comes back over a channel and
//! is picked up by `poll()` on the UI tick, so the event loop never blocks.
//!
//! # Example
//!
//! ```ignore
//! let api = api.clone();
//! let mut query = Query::new(move || {
//!     let api = api.clone();
//!     async move { api.list_all().await }
//! });
//!
//! // Start fetching
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//! ```

use futures::future::BoxFuture;
use std::future::Future;
use tokio::sync::mpsc;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T, E> {
  /// Query has not been started, its result was taken, or its task went
  /// away without answering
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(E),
}

/// A factory function that creates futures for fetching data
type FetcherFn<T, E> = Box<dyn Fn() -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

/// Async query with state management.
///
/// `is_loading()` is true from `fetch()` until the result has been polled,
/// whichever way the request ends. Busy indicators built on it therefore
/// always clear once the request settles.
pub struct Query<T, E = String> {
  state: QueryState<T, E>,
  fetcher: FetcherFn<T, E>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, E>>>,
}

impl<T: Send + 'static, E: Send + 'static> Query<T, E> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is a closure that returns a future. It will be called
  /// each time `fetch()` or `refetch()` is invoked.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || -> BoxFuture<'static, Result<T, E>> { Box::pin(fetcher()) }),
      receiver: None,
    }
  }

  /// Check if the query is currently loading.
  pub fn is_loading(&self) -> bool {
    matches!(self.state, QueryState::Loading)
  }

  /// Start fetching data if not already loading.
  ///
  /// This is a no-op if the query is already loading.
  pub fn fetch(&mut self) {
    if self.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Force a refetch, even if already loading or data exists.
  pub fn refetch(&mut self) {
    // Cancel any pending fetch by dropping the receiver
    self.receiver = None;
    self.start_fetch();
  }

  /// Poll for results from a pending fetch.
  ///
  /// Returns `true` if the request settled (data, error, or the task died).
  /// Call this in your event loop tick handler.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    // Try to receive without blocking
    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Task ended without sending (panicked or runtime shutting down)
        self.state = QueryState::Idle;
        self.receiver = None;
        true
      }
    }
  }

  /// Move a settled result out of the query, leaving it idle.
  ///
  /// Returns `None` while loading, when nothing has been fetched, or when
  /// the task died without answering.
  pub fn take_result(&mut self) -> Option<Result<T, E>> {
    match std::mem::replace(&mut self.state, QueryState::Idle) {
      QueryState::Success(data) => Some(Ok(data)),
      QueryState::Error(error) => Some(Err(error)),
      other => {
        self.state = other;
        None
      }
    }
  }

  /// Internal: start the fetch operation
  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    let future = (self.fetcher)();
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(result);
    });
  }
}

// Query is not Clone because the fetcher is boxed and receiver is owned.

impl<T: std::fmt::Debug, E: std::fmt::Debug> std::fmt::Debug for Query<T, E> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}
