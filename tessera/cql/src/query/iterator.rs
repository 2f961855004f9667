//! Paged slice iterator

use super::executor::RowDecoder;
use super::planner::SlicePlan;
use crate::entity::{EntityProxifier, PassThroughProxifier};
use crate::error::{CqlResult, ValidationError};
use crate::session::{PreparedStatement, ResultSet, Session};
use crate::types::CqlValue;
use std::mem;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

enum IteratorState<T> {
    /// Holds an unread entity and its clustering key
    Ready { entity: T, key: Vec<CqlValue> },
    EmptyBuffer,
    Exhausted,
}

/// Lazy iterator over a slice, fetching one page of `batch_size` rows at a
/// time.
///
/// A continuation page is requested only after a full page was consumed.
/// The overall limit is a client-side budget. Once [`has_next`] returned
/// `false` the iterator stays exhausted and issues no further I/O.
///
/// [`has_next`]: SliceQueryIterator::has_next
pub struct SliceQueryIterator<T, P = PassThroughProxifier> {
    session: Arc<dyn Session>,
    plan: SlicePlan,
    decoder: RowDecoder<T, P>,
    continuation: PreparedStatement,
    page: ResultSet,
    page_len: usize,
    pages_fetched: usize,
    /// Clustering key of the last row taken from the current page
    last_key: Option<Vec<CqlValue>>,
    /// Clustering key of the last entity returned by `next`
    last_returned: Option<Vec<CqlValue>>,
    remaining: Option<u32>,
    state: IteratorState<T>,
}

impl<T, P: EntityProxifier> SliceQueryIterator<T, P> {
    pub(crate) fn new(
        session: Arc<dyn Session>,
        plan: SlicePlan,
        decoder: RowDecoder<T, P>,
        continuation: PreparedStatement,
        first_page: ResultSet,
    ) -> Self {
        let remaining = plan.limit();
        Self {
            session,
            plan,
            decoder,
            continuation,
            page_len: first_page.len(),
            page: first_page,
            pages_fetched: 1,
            last_key: None,
            last_returned: None,
            remaining,
            state: IteratorState::EmptyBuffer,
        }
    }

    pub async fn has_next(&mut self) -> CqlResult<bool> {
        loop {
            match self.state {
                IteratorState::Ready { .. } => return Ok(true),
                IteratorState::Exhausted => return Ok(false),
                IteratorState::EmptyBuffer => self.fill_buffer().await?,
            }
        }
    }

    /// Next entity, `None` once exhausted
    pub async fn next(&mut self) -> CqlResult<Option<T>> {
        if !self.has_next().await? {
            return Ok(None);
        }
        match mem::replace(&mut self.state, IteratorState::EmptyBuffer) {
            IteratorState::Ready { entity, key } => {
                self.last_returned = Some(key);
                Ok(Some(entity))
            }
            other => {
                self.state = other;
                Ok(None)
            }
        }
    }

    /// Delete the row most recently returned by [`next`](Self::next)
    #[instrument(skip(self), fields(entity = self.plan.entity_name()))]
    pub async fn remove_last(&mut self) -> CqlResult<()> {
        let key = self.last_returned.as_ref().ok_or_else(|| {
            ValidationError::InvalidQuery("There is no returned row to remove".to_string())
        })?;
        let statement = self.plan.row_delete_statement(key);
        self.session
            .execute(&statement.bind(self.plan.consistency()))
            .await?;
        self.last_returned = None;
        debug!(table = %self.plan.table(), "Iterated row removed");
        Ok(())
    }

    /// Pages requested so far, the first page included
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, IteratorState::Exhausted)
    }

    async fn fill_buffer(&mut self) -> CqlResult<()> {
        if self.remaining == Some(0) {
            trace!("Slice limit reached");
            self.state = IteratorState::Exhausted;
            return Ok(());
        }

        if let Some(row) = self.page.next() {
            let key = self.decoder.clustering_key(&row)?;
            self.last_key = Some(key.clone());
            let entity = self.decoder.decode(&row, key.clone())?;
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }
            self.state = IteratorState::Ready { entity, key };
            return Ok(());
        }

        // A short page is the last one
        let batch_size = self.plan.batch_size() as usize;
        match &self.last_key {
            Some(last_key) if self.page_len >= batch_size => {
                let values = self.plan.continuation_values(last_key);
                let statement = self.continuation.bind(values, self.plan.consistency());
                self.page = self.session.execute(&statement).await?;
                self.page_len = self.page.len();
                self.pages_fetched += 1;
                debug!(
                    rows = self.page_len,
                    page = self.pages_fetched,
                    "Slice continuation page fetched"
                );
                if self.page.is_empty() {
                    self.state = IteratorState::Exhausted;
                }
            }
            _ => self.state = IteratorState::Exhausted,
        }
        Ok(())
    }
}
