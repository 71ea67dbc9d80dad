use crate::{Error, Result};
use did_anchor_core::NotificationEntry;
use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
};
use tokio::sync::{Semaphore, TryAcquireError};

#[derive(Debug, Default)]
struct NotificationQueueState {
    /// Cursor of the entry at the front of entry_vd.  Cursors are positions in commit order,
    /// starting at 0.
    front_cursor: u64,
    entry_vd: VecDeque<NotificationEntry>,
}

impl NotificationQueueState {
    fn next_cursor(&self) -> u64 {
        self.front_cursor + self.entry_vd.len() as u64
    }
}

/// Bounded queue of notifications of committed anchors, read by cursor.
///
/// Reading doesn't consume anything, so any number of readers may page through the queue
/// independently.  An entry's slot is only released by acknowledge.  Pushing into a full queue
/// waits until a slot is released; entries are never dropped.  A read from a cursor that
/// precedes the oldest retained entry, or that is past the newest one, is an error.
#[derive(Debug)]
pub(crate) struct NotificationQueue {
    state_ml: Mutex<NotificationQueueState>,
    free_slot_semaphore: Semaphore,
    read_batch_size: usize,
}

impl NotificationQueue {
    pub fn new(capacity: usize, read_batch_size: usize) -> Self {
        Self {
            state_ml: Mutex::new(NotificationQueueState::default()),
            free_slot_semaphore: Semaphore::new(capacity.max(1)),
            read_batch_size: read_batch_size.max(1),
        }
    }
    fn state(&self) -> std::sync::MutexGuard<'_, NotificationQueueState> {
        self.state_ml.lock().unwrap_or_else(PoisonError::into_inner)
    }
    /// Append an entry, waiting for a free slot if the queue is full.  Returns the entry's cursor,
    /// or Error::QueueClosed if the queue was closed before a slot became free.
    pub async fn push(&self, notification_entry: NotificationEntry) -> Result<u64> {
        let permit = match self.free_slot_semaphore.try_acquire() {
            Ok(permit) => permit,
            Err(TryAcquireError::NoPermits) => {
                tracing::warn!(
                    "notification queue is full; waiting for readers to acknowledge entries"
                );
                self.free_slot_semaphore
                    .acquire()
                    .await
                    .map_err(|_| Error::QueueClosed)?
            }
            Err(TryAcquireError::Closed) => return Err(Error::QueueClosed),
        };
        // The slot is handed back by acknowledge.
        permit.forget();
        let mut state_g = self.state();
        let cursor = state_g.next_cursor();
        state_g.entry_vd.push_back(notification_entry);
        Ok(cursor)
    }
    /// Return up to read_batch_size entries strictly after `since_cursor`, each with its cursor,
    /// and whether more remain.  A negative cursor reads from the start of the stream.
    pub fn read(&self, since_cursor: i64) -> Result<(bool, Vec<(u64, NotificationEntry)>)> {
        let state_g = self.state();
        let first_cursor = since_cursor.saturating_add(1).max(0) as u64;
        if first_cursor < state_g.front_cursor {
            return Err(Error::CursorExpired {
                cursor: since_cursor,
                oldest_cursor: state_g.front_cursor,
            });
        }
        if first_cursor > state_g.next_cursor() {
            return Err(Error::CursorAhead {
                cursor: since_cursor,
                next_cursor: state_g.next_cursor(),
            });
        }
        let skip = (first_cursor - state_g.front_cursor) as usize;
        let entry_v = state_g
            .entry_vd
            .iter()
            .skip(skip)
            .take(self.read_batch_size)
            .cloned()
            .enumerate()
            .map(|(i, notification_entry)| (first_cursor + i as u64, notification_entry))
            .collect::<Vec<_>>();
        let has_more = skip + entry_v.len() < state_g.entry_vd.len();
        Ok((has_more, entry_v))
    }
    /// Release every entry at or before `through_cursor`, returning how many were released.
    /// Acknowledging entries that were already released is a no-op.
    pub fn acknowledge(&self, through_cursor: u64) -> Result<usize> {
        let released_count = {
            let mut state_g = self.state();
            if through_cursor >= state_g.next_cursor() {
                return Err(Error::CursorAhead {
                    cursor: i64::try_from(through_cursor).unwrap_or(i64::MAX),
                    next_cursor: state_g.next_cursor(),
                });
            }
            let mut released_count = 0usize;
            while state_g.front_cursor <= through_cursor && state_g.entry_vd.pop_front().is_some() {
                state_g.front_cursor += 1;
                released_count += 1;
            }
            released_count
        };
        if released_count > 0 {
            self.free_slot_semaphore.add_permits(released_count);
        }
        Ok(released_count)
    }
    /// Make every pending and future push fail with Error::QueueClosed.
    pub fn close(&self) {
        self.free_slot_semaphore.close();
    }
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.state().entry_vd.len()
    }
}
