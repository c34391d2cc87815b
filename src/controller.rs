use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

use crate::client::RecipeSource;
use crate::config::EmptyQueryPolicy;
use crate::model::RecipeSummary;
use crate::render::{ingest, render_list, IngestedRecipe, RecipeRow};
use crate::SearchError;

/// A fetch that has been issued for a committed query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub query: String,
}

/// Status of the most recently issued fetch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Pending { seq: u64 },
    Succeeded { seq: u64, count: usize },
    Failed { seq: u64, error: String },
}

/// What happened to a completed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Results replaced the result list
    Applied { seq: u64, count: usize },
    /// The fetch failed; the result list was left as it was
    Failed { seq: u64 },
    /// A newer fetch had been issued, so this response was dropped
    Discarded { seq: u64, latest: u64 },
}

/// Draft query, committed query and result list, plus fetch bookkeeping
///
/// Sequence numbers start at 1 and increase with every issued fetch. Only the
/// response carrying the highest issued number may touch the result list.
#[derive(Debug)]
pub struct SearchState {
    draft: String,
    committed: String,
    results: Vec<IngestedRecipe>,
    status: FetchStatus,
    last_issued: u64,
    policy: EmptyQueryPolicy,
}

impl SearchState {
    pub fn new(default_query: impl Into<String>, policy: EmptyQueryPolicy) -> Self {
        Self {
            draft: String::new(),
            committed: default_query.into(),
            results: Vec::new(),
            status: FetchStatus::Idle,
            last_issued: 0,
            policy,
        }
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Commit the draft and clear it
    ///
    /// Returns the fetch to run when the committed query changed, `None` when the
    /// same query was submitted again.
    pub fn submit(&mut self) -> Result<Option<FetchRequest>, SearchError> {
        if self.draft.trim().is_empty() && self.policy == EmptyQueryPolicy::Reject {
            return Err(SearchError::EmptyQuery);
        }

        let draft = std::mem::take(&mut self.draft);
        if draft == self.committed {
            debug!("Query {:?} unchanged, not refetching", draft);
            return Ok(None);
        }

        self.committed = draft;
        Ok(Some(self.begin_fetch()))
    }

    /// Issue a fetch for the current committed query
    pub fn begin_fetch(&mut self) -> FetchRequest {
        self.last_issued += 1;
        self.status = FetchStatus::Pending {
            seq: self.last_issued,
        };
        FetchRequest {
            seq: self.last_issued,
            query: self.committed.clone(),
        }
    }

    /// Apply the outcome of fetch `seq`
    pub fn apply(
        &mut self,
        seq: u64,
        outcome: Result<Vec<RecipeSummary>, SearchError>,
    ) -> ApplyOutcome {
        if seq != self.last_issued {
            return ApplyOutcome::Discarded {
                seq,
                latest: self.last_issued,
            };
        }

        match outcome {
            Ok(recipes) => {
                self.results = ingest(recipes);
                let count = self.results.len();
                self.status = FetchStatus::Succeeded { seq, count };
                ApplyOutcome::Applied { seq, count }
            }
            Err(e) => {
                self.status = FetchStatus::Failed {
                    seq,
                    error: e.to_string(),
                };
                ApplyOutcome::Failed { seq }
            }
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn committed_query(&self) -> &str {
        &self.committed
    }

    pub fn results(&self) -> &[IngestedRecipe] {
        &self.results
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn last_fetch_failed(&self) -> bool {
        matches!(self.status, FetchStatus::Failed { .. })
    }
}

/// Drives a [`SearchState`] against a [`RecipeSource`]
///
/// Each fetch runs on its own tokio task; overlapping fetches are not cancelled,
/// and stale ones are discarded when they complete.
#[derive(Clone)]
pub struct QueryController {
    state: Arc<Mutex<SearchState>>,
    source: Arc<dyn RecipeSource>,
}

impl QueryController {
    pub fn new(
        source: Arc<dyn RecipeSource>,
        default_query: impl Into<String>,
        policy: EmptyQueryPolicy,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(SearchState::new(default_query, policy))),
            source,
        }
    }

    fn state(&self) -> MutexGuard<'_, SearchState> {
        // State is only ever replaced wholesale, so a poisoned lock still holds a
        // consistent value.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fetch results for the default query
    pub fn start(&self) -> JoinHandle<ApplyOutcome> {
        let request = self.state().begin_fetch();
        self.fetch_results(request)
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.state().set_draft(text);
    }

    /// Commit the draft and, when the committed query changed, start its fetch
    pub fn submit(&self) -> Result<Option<JoinHandle<ApplyOutcome>>, SearchError> {
        let request = self.state().submit()?;
        Ok(request.map(|request| self.fetch_results(request)))
    }

    /// Run `request` on a new task and apply its outcome
    pub fn fetch_results(&self, request: FetchRequest) -> JoinHandle<ApplyOutcome> {
        let state = Arc::clone(&self.state);
        let source = Arc::clone(&self.source);

        tokio::spawn(async move {
            let FetchRequest { seq, query } = request;
            let result = source.search(&query).await;
            if let Err(e) = &result {
                warn!("Search #{} for {:?} failed: {}", seq, query, e);
            }

            let outcome = state
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .apply(seq, result);

            match &outcome {
                ApplyOutcome::Applied { count, .. } => {
                    info!("Search #{} for {:?} returned {} recipes", seq, query, count)
                }
                ApplyOutcome::Discarded { latest, .. } => warn!(
                    "Discarding stale search #{} for {:?}, #{} is newer",
                    seq, query, latest
                ),
                ApplyOutcome::Failed { .. } => {}
            }
            outcome
        })
    }

    pub fn draft(&self) -> String {
        self.state().draft().to_string()
    }

    pub fn committed_query(&self) -> String {
        self.state().committed_query().to_string()
    }

    pub fn results(&self) -> Vec<IngestedRecipe> {
        self.state().results().to_vec()
    }

    pub fn rows(&self) -> Vec<RecipeRow> {
        render_list(self.state().results())
    }

    pub fn status(&self) -> FetchStatus {
        self.state().status().clone()
    }
}
