//! Navigation shell and event loop.
//!
//! One route is mounted at a time. All asynchronous work flows through a
//! single mpsc channel of [`AppEvent`]s fed by the keyboard reader thread,
//! spawned request tasks (each tagged with the token it was issued for),
//! and the push-channel forwarder. Nothing blocks drawing; views render
//! loading placeholders while requests are outstanding.

pub mod dashboard;
pub mod detail;
pub mod forms;
pub mod stats;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::Backend;
use ratatui::style::Color;
use ratatui::Frame;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::api::error::ApiError;
use crate::api::job::dto::{BulkEmailRequest, CreateJobRequest, UpdateJobRequest, UploadJobRequest};
use crate::api::job::models::{Job, JobPage, JobStats, JobStatus, JobType, StatusEvent};
use crate::api::ApiClient;
use crate::push::{self, AlternatePort, PushHandle};
use crate::state::{FetchSpec, JobListState, StatsState};
use forms::{ActiveForm, FormAction};

/// Static route table; one view mounted at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    SendEmail,
    BulkSendEmail,
    UploadFile,
    JobDetails(i64),
    EditJob(i64),
}

/// What the details view currently shows
pub enum DetailView {
    Loading,
    Loaded(Job),
    Error(String),
}

/// A destructive action awaiting explicit confirmation
#[derive(Debug, Clone, Copy)]
pub struct PendingDelete {
    pub id: i64,
    /// Whether the delete was requested from the details view
    pub from_details: bool,
}

/// Mutating actions whose completion flows back through the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Delete,
    Retry,
}

/// Everything the event loop reacts to
pub enum AppEvent {
    Input(KeyEvent),
    JobsLoaded {
        token: u64,
        result: Result<JobPage, ApiError>,
    },
    StatsLoaded {
        token: u64,
        result: Result<JobStats, ApiError>,
    },
    JobLoaded {
        id: i64,
        result: Result<Job, ApiError>,
    },
    Push(StatusEvent),
    ActionDone {
        action: ActionKind,
        from_details: bool,
        result: Result<(), ApiError>,
    },
    SubmitDone {
        result: Result<(), ApiError>,
    },
    DownloadUrlReady {
        result: Result<String, ApiError>,
    },
}

pub struct App {
    pub(crate) api: Arc<ApiClient>,
    tx: mpsc::UnboundedSender<AppEvent>,
    pub(crate) route: Route,
    pub(crate) jobs: JobListState,
    pub(crate) stats: StatsState,
    pub(crate) selected: usize,
    pub(crate) detail: DetailView,
    pub(crate) form: Option<ActiveForm>,
    push: Option<PushHandle>,
    pub(crate) confirm: Option<PendingDelete>,
    pub(crate) flash: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(api: ApiClient, tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            api: Arc::new(api),
            tx,
            route: Route::Dashboard,
            jobs: JobListState::new(),
            stats: StatsState::new(),
            selected: 0,
            detail: DetailView::Loading,
            form: None,
            push: None,
            confirm: None,
            flash: None,
            should_quit: false,
        }
    }

    /// Run the event loop until the user quits
    pub async fn run<B: Backend>(
        mut self,
        terminal: &mut Terminal<B>,
        mut rx: mpsc::UnboundedReceiver<AppEvent>,
    ) -> io::Result<()> {
        spawn_input_reader(self.tx.clone());
        self.mount_dashboard();

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            match rx.recv().await {
                Some(event) => self.handle(event),
                None => break,
            }
            // Coalesce whatever else is already queued before redrawing.
            while let Ok(event) = rx.try_recv() {
                self.handle(event);
            }
        }
        info!("Dashboard exiting");
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        match self.route {
            Route::Dashboard => dashboard::render(frame, self),
            Route::JobDetails(_) => detail::render(frame, self),
            Route::SendEmail | Route::BulkSendEmail | Route::UploadFile | Route::EditJob(_) => {
                forms::render(frame, self)
            }
        }
    }

    fn handle(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(key) => self.handle_key(key),
            AppEvent::JobsLoaded { token, result } => {
                if self.jobs.apply_fetch(token, result) {
                    let len = self.jobs.jobs().len();
                    self.selected = self.selected.min(len.saturating_sub(1));
                }
            }
            AppEvent::StatsLoaded { token, result } => {
                self.stats.apply(token, result);
            }
            AppEvent::JobLoaded { id, result } => self.on_job_loaded(id, result),
            AppEvent::Push(event) => {
                self.jobs.apply_event(&event);
                // Aggregate counts may have changed either way.
                self.spawn_stats();
            }
            AppEvent::ActionDone {
                action,
                from_details,
                result,
            } => self.on_action_done(action, from_details, result),
            AppEvent::SubmitDone { result } => self.on_submit_done(result),
            AppEvent::DownloadUrlReady { result } => match result {
                Ok(url) => self.flash = Some(format!("Download URL: {}", url)),
                Err(e) => self.flash = Some(e.to_string()),
            },
        }
    }

    // ── Navigation ──────────────────────────────────────────────────────

    fn mount_dashboard(&mut self) {
        self.route = Route::Dashboard;
        self.form = None;
        self.confirm = None;
        let spec = self.jobs.refresh();
        self.spawn_list(spec);
        self.spawn_stats();
        if self.push.is_none() {
            self.open_push_channel();
        }
    }

    fn mount_details(&mut self, id: i64) {
        self.leave_dashboard();
        self.route = Route::JobDetails(id);
        self.detail = DetailView::Loading;
        self.spawn_get_job(id);
    }

    fn mount_form(&mut self, route: Route) {
        self.leave_dashboard();
        self.route = route;
        self.form = Some(match route {
            Route::SendEmail => ActiveForm::email(),
            Route::BulkSendEmail => ActiveForm::bulk(),
            Route::UploadFile => ActiveForm::upload(),
            Route::EditJob(id) => {
                self.spawn_get_job(id);
                ActiveForm::edit_loading(id)
            }
            _ => unreachable!("not a form route"),
        });
    }

    /// Tear down dashboard-owned resources when navigating away
    ///
    /// The push connection is exclusively owned by the dashboard lifecycle;
    /// dropping the handle aborts the task, so nothing is buffered while
    /// another view is mounted.
    fn leave_dashboard(&mut self) {
        self.push = None;
        self.confirm = None;
        self.flash = None;
    }

    fn open_push_channel(&mut self) {
        let (handle, mut events) = push::spawn(self.api.base_url(), Box::new(AlternatePort::default()));
        self.push = Some(handle);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if tx.send(AppEvent::Push(event)).is_err() {
                    break;
                }
            }
            debug!("Push forwarder stopped");
        });
    }

    // ── Key handling ────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        // A pending delete confirmation captures all input first.
        if let Some(pending) = self.confirm {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.confirm = None;
                    self.spawn_delete(pending);
                }
                _ => self.confirm = None,
            }
            return;
        }

        match self.route {
            Route::Dashboard => self.handle_dashboard_key(key),
            Route::JobDetails(id) => self.handle_details_key(id, key),
            _ => {
                let action = self
                    .form
                    .as_mut()
                    .and_then(|form| forms::handle_key(form, key));
                match action {
                    Some(FormAction::Submit) => self.submit_form(),
                    Some(FormAction::Cancel) => self.mount_dashboard(),
                    None => {}
                }
            }
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => {
                let spec = self.jobs.refresh();
                self.spawn_list(spec);
                self.spawn_stats();
            }
            KeyCode::Char('t') => {
                let next = cycle_type_filter(self.jobs.job_type_filter());
                let spec = self.jobs.set_filter(next, self.jobs.status_filter());
                self.selected = 0;
                self.spawn_list(spec);
            }
            KeyCode::Char('s') => {
                let next = cycle_status_filter(self.jobs.status_filter());
                let spec = self.jobs.set_filter(self.jobs.job_type_filter(), next);
                self.selected = 0;
                self.spawn_list(spec);
            }
            KeyCode::Char('n') | KeyCode::Right => {
                if let Some(spec) = self.jobs.next_page() {
                    self.selected = 0;
                    self.spawn_list(spec);
                }
            }
            KeyCode::Char('p') | KeyCode::Left => {
                if let Some(spec) = self.jobs.previous_page() {
                    self.selected = 0;
                    self.spawn_list(spec);
                }
            }
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                let len = self.jobs.jobs().len();
                if len > 0 {
                    self.selected = (self.selected + 1).min(len - 1);
                }
            }
            KeyCode::Enter => {
                if let Some(job) = self.selected_job() {
                    self.mount_details(job.id);
                }
            }
            KeyCode::Char('e') => {
                if let Some(job) = self.selected_job() {
                    if job.is_editable() {
                        self.mount_form(Route::EditJob(job.id));
                    } else {
                        self.flash = Some("This job cannot be edited.".to_string());
                    }
                }
            }
            KeyCode::Char('y') => {
                if let Some(job) = self.selected_job() {
                    if job.is_retryable() {
                        self.spawn_retry(job.id);
                    } else {
                        self.flash = Some("Only failed jobs can be retried.".to_string());
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(job) = self.selected_job() {
                    self.confirm = Some(PendingDelete {
                        id: job.id,
                        from_details: false,
                    });
                }
            }
            KeyCode::Char('g') => {
                if let Some(job) = self.selected_job() {
                    if job.has_artifact() {
                        self.spawn_download_url(job.id);
                    } else {
                        self.flash = Some("This job has no downloadable file.".to_string());
                    }
                }
            }
            KeyCode::Char('1') => self.mount_form(Route::SendEmail),
            KeyCode::Char('2') => self.mount_form(Route::BulkSendEmail),
            KeyCode::Char('3') => self.mount_form(Route::UploadFile),
            _ => {}
        }
    }

    fn handle_details_key(&mut self, id: i64, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => self.mount_dashboard(),
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('d') => {
                self.confirm = Some(PendingDelete {
                    id,
                    from_details: true,
                });
            }
            KeyCode::Char('g') => {
                if let DetailView::Loaded(job) = &self.detail {
                    if job.has_artifact() {
                        self.spawn_download_url(job.id);
                    } else {
                        self.flash = Some("This job has no downloadable file.".to_string());
                    }
                }
            }
            _ => {}
        }
    }

    fn selected_job(&self) -> Option<&Job> {
        self.jobs.jobs().get(self.selected)
    }

    // ── Completions ─────────────────────────────────────────────────────

    fn on_job_loaded(&mut self, id: i64, result: Result<Job, ApiError>) {
        match self.route {
            Route::JobDetails(route_id) if route_id == id => {
                self.detail = match result {
                    Ok(job) => DetailView::Loaded(job),
                    Err(e) => DetailView::Error(e.to_string()),
                };
            }
            Route::EditJob(route_id) if route_id == id => {
                if let Some(form) = self.form.as_mut() {
                    form.prefill_edit(result);
                }
            }
            // A response for a view that is no longer mounted.
            _ => debug!("Dropping job {} response for stale route", id),
        }
    }

    fn on_action_done(
        &mut self,
        action: ActionKind,
        from_details: bool,
        result: Result<(), ApiError>,
    ) {
        match result {
            Ok(()) => {
                if from_details {
                    // Deleted the job being viewed: nothing left to show.
                    self.mount_dashboard();
                } else {
                    // Removing or re-enqueuing a row can shift the page
                    // boundary; always refetch instead of splicing.
                    let spec = self.jobs.refresh();
                    self.spawn_list(spec);
                    self.spawn_stats();
                }
            }
            Err(e) => {
                self.flash = Some(match action {
                    ActionKind::Delete => "Failed to delete job.".to_string(),
                    ActionKind::Retry => e.to_string(),
                });
            }
        }
    }

    fn on_submit_done(&mut self, result: Result<(), ApiError>) {
        match result {
            Ok(()) => self.mount_dashboard(),
            Err(e) => {
                if let Some(form) = self.form.as_mut() {
                    form.submit_failed(e.to_string());
                }
            }
        }
    }

    // ── Spawned requests ────────────────────────────────────────────────

    fn spawn_list(&self, spec: FetchSpec) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.list_jobs(spec.page, spec.job_type, spec.status).await;
            let _ = tx.send(AppEvent::JobsLoaded {
                token: spec.token,
                result,
            });
        });
    }

    fn spawn_stats(&mut self) {
        let token = self.stats.begin();
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.stats().await;
            let _ = tx.send(AppEvent::StatsLoaded { token, result });
        });
    }

    fn spawn_get_job(&self, id: i64) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.get_job(id).await;
            let _ = tx.send(AppEvent::JobLoaded { id, result });
        });
    }

    fn spawn_delete(&self, pending: PendingDelete) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.delete_job(pending.id).await;
            let _ = tx.send(AppEvent::ActionDone {
                action: ActionKind::Delete,
                from_details: pending.from_details,
                result,
            });
        });
    }

    fn spawn_retry(&self, id: i64) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.retry_job(id).await;
            let _ = tx.send(AppEvent::ActionDone {
                action: ActionKind::Retry,
                from_details: false,
                result,
            });
        });
    }

    fn spawn_download_url(&self, id: i64) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.download_url(id).await;
            let _ = tx.send(AppEvent::DownloadUrlReady { result });
        });
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match form.build_payload() {
            Ok(payload) => {
                form.submitting();
                let api = self.api.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = send_payload(&api, payload).await;
                    let _ = tx.send(AppEvent::SubmitDone { result });
                });
            }
            Err(None) => {} // not submittable right now (loading, already submitting)
            Err(Some(msg)) => form.submit_failed(msg),
        }
    }
}

/// A built form payload ready for its one REST call
pub enum Payload {
    Create(CreateJobRequest),
    Bulk(BulkEmailRequest),
    Upload(UploadJobRequest),
    Update { id: i64, request: UpdateJobRequest },
}

async fn send_payload(api: &ApiClient, payload: Payload) -> Result<(), ApiError> {
    match payload {
        Payload::Create(request) => api.create_job(&request).await.map(|_| ()),
        Payload::Bulk(request) => api.create_bulk_email(&request).await,
        Payload::Upload(request) => api.upload_file(&request).await,
        Payload::Update { id, request } => api.update_job(id, &request).await.map(|_| ()),
    }
}

/// Shared status palette for table cells and the details view
pub(crate) fn status_color(status: JobStatus) -> Color {
    match status {
        JobStatus::Pending => Color::Blue,
        JobStatus::Running => Color::Yellow,
        JobStatus::Completed => Color::Green,
        JobStatus::Failed => Color::Red,
    }
}

fn cycle_type_filter(current: Option<JobType>) -> Option<JobType> {
    match current {
        None => Some(JobType::SendEmail),
        Some(JobType::SendEmail) => Some(JobType::FileUpload),
        Some(_) => None,
    }
}

fn cycle_status_filter(current: Option<JobStatus>) -> Option<JobStatus> {
    match current {
        None => Some(JobStatus::Pending),
        Some(JobStatus::Pending) => Some(JobStatus::Running),
        Some(JobStatus::Running) => Some(JobStatus::Completed),
        Some(JobStatus::Completed) => Some(JobStatus::Failed),
        Some(JobStatus::Failed) => None,
    }
}

/// Feed terminal key events into the app channel from a plain thread
///
/// crossterm's reader blocks, so it lives off the runtime; the thread ends
/// once the receiving side is gone.
fn spawn_input_reader(tx: mpsc::UnboundedSender<AppEvent>) {
    std::thread::spawn(move || loop {
        match event::poll(Duration::from_millis(200)) {
            Ok(true) => {
                if let Ok(Event::Key(key)) = event::read() {
                    // Ctrl+C always quits, regardless of view.
                    let forced_quit = key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL);
                    let event = if forced_quit {
                        AppEvent::Input(KeyEvent::from(KeyCode::Char('q')))
                    } else {
                        AppEvent::Input(key)
                    };
                    if tx.send(event).is_err() {
                        break;
                    }
                }
            }
            Ok(false) => {
                if tx.is_closed() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_filter_cycles_through_all_and_back_to_none() {
        let mut current = None;
        current = cycle_type_filter(current);
        assert_eq!(current, Some(JobType::SendEmail));
        current = cycle_type_filter(current);
        assert_eq!(current, Some(JobType::FileUpload));
        current = cycle_type_filter(current);
        assert_eq!(current, None);
    }

    #[test]
    fn status_filter_cycles_through_all_and_back_to_none() {
        let mut current = None;
        for expected in [
            Some(JobStatus::Pending),
            Some(JobStatus::Running),
            Some(JobStatus::Completed),
            Some(JobStatus::Failed),
            None,
        ] {
            current = cycle_status_filter(current);
            assert_eq!(current, expected);
        }
    }
}
