/*
[INPUT]:  TaskSource + task id, page size
[OUTPUT]: Log entries not returned by an earlier call
[POS]:    Polling layer - incremental task log tailing
[UPDATE]: When the log paging contract changes
*/

use std::sync::Arc;

use super::TaskSource;
use crate::http::Result;
use crate::types::TaskLogEntry;

pub const DEFAULT_LOG_PAGE_SIZE: u32 = 50;

/// Cursor over a task's paged log.
///
/// Entries are assumed to arrive in ascending `id` order.
#[derive(Debug)]
pub struct LogTail<S: ?Sized> {
    source: Arc<S>,
    task_id: String,
    page_size: u32,
    page: u32,
    last_id: Option<i64>,
}

impl<S> LogTail<S>
where
    S: TaskSource + ?Sized,
{
    pub fn new(source: Arc<S>, task_id: impl Into<String>) -> Self {
        Self::with_page_size(source, task_id, DEFAULT_LOG_PAGE_SIZE)
    }

    pub fn with_page_size(source: Arc<S>, task_id: impl Into<String>, page_size: u32) -> Self {
        Self {
            source,
            task_id: task_id.into(),
            page_size: page_size.max(1),
            page: 1,
            last_id: None,
        }
    }

    pub fn last_id(&self) -> Option<i64> {
        self.last_id
    }

    /// Fetch every entry appended since the previous call.
    ///
    /// The cursor only moves when every page was fetched, so a failed call
    /// is repeated in full by the next one.
    pub async fn next_batch(&mut self) -> Result<Vec<TaskLogEntry>> {
        let mut fresh = Vec::new();
        let mut page_no = self.page;
        let mut last_id = self.last_id;

        loop {
            let page = self
                .source
                .fetch_logs(&self.task_id, page_no, self.page_size)
                .await?;
            let full = page.items.len() >= self.page_size as usize;
            let has_next = page.has_next();

            for entry in page.items {
                if last_id.is_none_or(|last| entry.id > last) {
                    last_id = Some(entry.id);
                    fresh.push(entry);
                }
            }

            if full && has_next {
                page_no += 1;
            } else {
                break;
            }
        }

        self.page = page_no;
        self.last_id = last_id;
        Ok(fresh)
    }
}
