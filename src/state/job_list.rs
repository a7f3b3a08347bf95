//! Owned state container for the dashboard's job list.
//!
//! Two independent sources mutate the current page: explicit fetches and
//! asynchronous push events. Fetches replace the page atomically and are
//! guarded by a request token so a superseded response can never overwrite
//! newer state; push events patch single rows in place and never change
//! page membership, order, or count.

use tracing::debug;

use crate::api::error::ApiError;
use crate::api::job::models::{Job, JobPage, JobStatus, JobType, StatusEvent};

/// A fetch the state has asked for, tagged with the token it was issued with
///
/// The caller performs the request and feeds the outcome back through
/// [`JobListState::apply_fetch`] with the same token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSpec {
    pub token: u64,
    pub page: u32,
    pub job_type: Option<JobType>,
    pub status: Option<JobStatus>,
}

/// The current page of jobs plus filter/pagination controls
pub struct JobListState {
    jobs: Vec<Job>,
    count: u64,
    has_next: bool,
    has_previous: bool,
    page: u32,
    job_type: Option<JobType>,
    status: Option<JobStatus>,
    token: u64,
    loading: bool,
    error: Option<String>,
}

impl JobListState {
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            count: 0,
            has_next: false,
            has_previous: false,
            page: 1,
            job_type: None,
            status: None,
            token: 0,
            loading: false,
            error: None,
        }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn job_type_filter(&self) -> Option<JobType> {
        self.job_type
    }

    pub fn status_filter(&self) -> Option<JobStatus> {
        self.status
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn has_previous(&self) -> bool {
        self.has_previous
    }

    /// Change the filters; always resets to page 1
    pub fn set_filter(
        &mut self,
        job_type: Option<JobType>,
        status: Option<JobStatus>,
    ) -> FetchSpec {
        self.job_type = job_type;
        self.status = status;
        self.page = 1;
        self.issue()
    }

    /// Jump to a specific page (clamped to 1)
    pub fn set_page(&mut self, page: u32) -> FetchSpec {
        self.page = page.max(1);
        self.issue()
    }

    /// Advance a page, gated on the presence of a next cursor
    pub fn next_page(&mut self) -> Option<FetchSpec> {
        if self.has_next {
            Some(self.set_page(self.page + 1))
        } else {
            None
        }
    }

    /// Go back a page, gated on the presence of a previous cursor
    pub fn previous_page(&mut self) -> Option<FetchSpec> {
        if self.has_previous && self.page > 1 {
            Some(self.set_page(self.page - 1))
        } else {
            None
        }
    }

    /// Refetch the current filter/page; used after delete, retry, and edit
    ///
    /// Mutations always go through a full refetch rather than a local
    /// splice, since changing one row can shift the page boundary.
    pub fn refresh(&mut self) -> FetchSpec {
        self.issue()
    }

    /// Invalidate any in-flight fetch and describe the next one
    fn issue(&mut self) -> FetchSpec {
        self.token += 1;
        self.loading = true;
        self.error = None;
        FetchSpec {
            token: self.token,
            page: self.page,
            job_type: self.job_type,
            status: self.status,
        }
    }

    /// Apply a completed fetch; stale responses are discarded
    ///
    /// Returns whether the response was applied. A response whose token no
    /// longer matches belongs to a superseded filter/page and must not
    /// overwrite current state, regardless of completion order.
    pub fn apply_fetch(&mut self, token: u64, result: Result<JobPage, ApiError>) -> bool {
        if token != self.token {
            debug!("Discarding stale job list response (token {} != {})", token, self.token);
            return false;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                // Whole-page replacement; never partial.
                self.jobs = page.results;
                self.count = page.count;
                self.has_next = page.next.is_some();
                self.has_previous = page.previous.is_some();
                self.error = None;
            }
            Err(e) => {
                self.jobs = Vec::new();
                self.count = 0;
                self.has_next = false;
                self.has_previous = false;
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Merge one push event into the current page
    ///
    /// At most one row changes: status/result of the matching job, in
    /// place, keeping position and every other field. Events for jobs not
    /// on this page are ignored; count and cursors never move.
    pub fn apply_event(&mut self, event: &StatusEvent) -> bool {
        match self.jobs.iter_mut().find(|job| job.id == event.id) {
            Some(job) => {
                job.status = event.status;
                job.result = event.result.clone();
                true
            }
            None => false,
        }
    }

    /// Page size inferred from the fetched page, not a fixed constant
    ///
    /// On the last page of a multi-page set the returned slice can be
    /// shorter than the real page size, so it is derived from the rows on
    /// the earlier pages instead.
    pub fn page_size(&self) -> usize {
        let len = self.jobs.len();
        if self.page <= 1 || self.has_next {
            return len;
        }
        let pages_before = u64::from(self.page - 1);
        let prior_rows = self.count.saturating_sub(len as u64);
        if prior_rows == 0 {
            return len;
        }
        (prior_rows / pages_before) as usize
    }

    /// Row serial number for the job at `index` on the current page
    pub fn serial(&self, index: usize) -> u64 {
        u64::from(self.page - 1) * self.page_size() as u64 + index as u64 + 1
    }

    /// Total number of pages; an empty result set still renders page 1 of 1
    pub fn total_pages(&self) -> u64 {
        let size = self.page_size() as u64;
        if self.count == 0 || size == 0 {
            return 1;
        }
        self.count.div_ceil(size)
    }
}

impl Default for JobListState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::job::models::{JobStatus, JobType, ScheduleType};
    use chrono::Utc;

    fn job(id: i64) -> Job {
        Job {
            id,
            job_type: JobType::SendEmail,
            status: JobStatus::Pending,
            schedule_type: ScheduleType::Immediate,
            scheduled_time: None,
            frequency: None,
            parameters: None,
            result: None,
            file_url: None,
            retries: 0,
            max_retries: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn page(ids: &[i64], count: u64, next: bool, previous: bool) -> JobPage {
        JobPage {
            results: ids.iter().copied().map(job).collect(),
            count,
            next: next.then(|| "next".to_string()),
            previous: previous.then(|| "prev".to_string()),
        }
    }

    #[test]
    fn changing_filter_resets_page_to_one() {
        let mut state = JobListState::new();
        let spec = state.set_page(3);
        state.apply_fetch(spec.token, Ok(page(&[21, 22], 22, false, true)));
        assert_eq!(state.page(), 3);

        let spec = state.set_filter(Some(JobType::FileUpload), None);
        assert_eq!(spec.page, 1);
        assert_eq!(state.page(), 1);
        assert_eq!(spec.job_type, Some(JobType::FileUpload));
    }

    #[test]
    fn successful_fetch_replaces_the_whole_page() {
        let mut state = JobListState::new();
        let spec = state.refresh();
        assert!(state.loading());

        let applied = state.apply_fetch(spec.token, Ok(page(&[1, 2, 3], 3, false, false)));
        assert!(applied);
        assert!(!state.loading());
        assert_eq!(state.jobs().len(), 3);
        assert_eq!(state.count(), 3);
        assert!(!state.has_next());
    }

    #[test]
    fn stale_response_does_not_overwrite_newer_state() {
        let mut state = JobListState::new();
        let page2 = state.set_page(2);
        let page3 = state.set_page(3);

        // Page 3 resolves first, then the superseded page 2 arrives late.
        assert!(state.apply_fetch(page3.token, Ok(page(&[31, 32], 40, true, true))));
        assert!(!state.apply_fetch(page2.token, Ok(page(&[21, 22], 40, true, true))));

        assert_eq!(state.jobs()[0].id, 31);
        assert_eq!(state.page(), 3);
    }

    #[test]
    fn fetch_error_surfaces_and_empties_the_page() {
        let mut state = JobListState::new();
        let spec = state.refresh();
        state.apply_fetch(spec.token, Ok(page(&[1], 1, false, false)));

        let spec = state.refresh();
        state.apply_fetch(
            spec.token,
            Err(ApiError::Validation("Failed to load jobs".to_string())),
        );
        assert!(state.error().is_some());
        assert!(state.jobs().is_empty());
        assert_eq!(state.total_pages(), 1);
    }

    #[test]
    fn push_event_updates_matching_row_in_place() {
        let mut state = JobListState::new();
        let spec = state.refresh();
        state.apply_fetch(spec.token, Ok(page(&[5, 6, 7], 3, false, false)));

        let event = StatusEvent {
            id: 6,
            status: JobStatus::Completed,
            result: Some(serde_json::json!({"sent": true})),
        };
        assert!(state.apply_event(&event));

        // Same position, only status/result changed, count untouched.
        assert_eq!(state.jobs()[1].id, 6);
        assert_eq!(state.jobs()[1].status, JobStatus::Completed);
        assert!(state.jobs()[1].result.is_some());
        assert_eq!(state.jobs()[0].status, JobStatus::Pending);
        assert_eq!(state.count(), 3);
    }

    #[test]
    fn push_event_for_absent_id_changes_nothing() {
        let mut state = JobListState::new();
        let spec = state.refresh();
        state.apply_fetch(spec.token, Ok(page(&[5, 6], 20, true, false)));

        let event = StatusEvent {
            id: 999,
            status: JobStatus::Failed,
            result: None,
        };
        assert!(!state.apply_event(&event));
        assert_eq!(state.jobs().len(), 2);
        assert_eq!(state.count(), 20);
        assert!(state.has_next());
    }

    #[test]
    fn later_events_for_the_same_id_win() {
        let mut state = JobListState::new();
        let spec = state.refresh();
        state.apply_fetch(spec.token, Ok(page(&[1], 1, false, false)));

        state.apply_event(&StatusEvent { id: 1, status: JobStatus::Running, result: None });
        state.apply_event(&StatusEvent { id: 1, status: JobStatus::Failed, result: None });
        assert_eq!(state.jobs()[0].status, JobStatus::Failed);
    }

    #[test]
    fn serials_are_stable_on_a_short_last_page() {
        let mut state = JobListState::new();
        // 23 jobs, page size 10: page 3 holds 3 rows.
        let spec = state.set_page(3);
        state.apply_fetch(spec.token, Ok(page(&[21, 22, 23], 23, false, true)));

        assert_eq!(state.page_size(), 10);
        assert_eq!(state.serial(0), 21);
        assert_eq!(state.serial(2), 23);
        assert_eq!(state.total_pages(), 3);
    }

    #[test]
    fn serials_on_a_full_middle_page() {
        let mut state = JobListState::new();
        let spec = state.set_page(2);
        state.apply_fetch(
            spec.token,
            Ok(page(&[11, 12, 13, 14, 15, 16, 17, 18, 19, 20], 23, true, true)),
        );

        assert_eq!(state.page_size(), 10);
        assert_eq!(state.serial(0), 11);
        assert_eq!(state.serial(9), 20);
    }

    #[test]
    fn zero_results_render_page_one_of_one() {
        let mut state = JobListState::new();
        let spec = state.refresh();
        state.apply_fetch(spec.token, Ok(page(&[], 0, false, false)));

        assert!(state.jobs().is_empty());
        assert_eq!(state.count(), 0);
        assert_eq!(state.page(), 1);
        assert_eq!(state.total_pages(), 1);
    }

    #[test]
    fn pagination_is_gated_on_cursor_presence() {
        let mut state = JobListState::new();
        let spec = state.refresh();
        state.apply_fetch(spec.token, Ok(page(&[1, 2], 2, false, false)));

        assert!(state.next_page().is_none());
        assert!(state.previous_page().is_none());

        let spec = state.refresh();
        state.apply_fetch(spec.token, Ok(page(&[1, 2], 10, true, false)));
        let next = state.next_page().expect("next page should be offered");
        assert_eq!(next.page, 2);
    }
}
