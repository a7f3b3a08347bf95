use reqwest::multipart;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::error::{ApiError, Result};
use super::job::dto::{BulkEmailRequest, CreateJobRequest, UpdateJobRequest, UploadJobRequest};
use super::job::models::{Job, JobPage, JobStats, JobStatus, JobType};

/// Error body the service attaches to rejected requests
#[derive(Deserialize)]
struct ServerError {
    error: Option<String>,
}

/// Thin wrapper around the job service REST API
///
/// Does nothing beyond URL/payload shaping and error mapping. All write
/// operations are fire-and-forget from the UI's perspective: callers
/// refetch or navigate on success and surface the error inline on failure.
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    /// Create a client for the given API base URL (e.g. `http://localhost:8000/api`)
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base,
        }
    }

    /// The configured API base URL, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// List one page of jobs matching the given filters
    pub async fn list_jobs(
        &self,
        page: u32,
        job_type: Option<JobType>,
        status: Option<JobStatus>,
    ) -> Result<JobPage> {
        let mut url = format!("{}/jobs/?page={}", self.base, page);
        if let Some(jt) = job_type {
            url.push_str(&format!("&job_type={}", jt.as_str()));
        }
        if let Some(st) = status {
            url.push_str(&format!("&status={}", st.as_str()));
        }
        debug!("Listing jobs: {}", url);

        let res = self.http.get(&url).send().await?;
        if !res.status().is_success() {
            warn!("Job list returned {}", res.status());
            return Err(ApiError::Validation("Failed to load jobs".to_string()));
        }
        Ok(res.json::<JobPage>().await?)
    }

    /// Fetch a single job by id
    pub async fn get_job(&self, id: i64) -> Result<Job> {
        let url = format!("{}/jobs/{}/", self.base, id);
        let res = self.http.get(&url).send().await?;
        if !res.status().is_success() {
            warn!("Job {} fetch returned {}", id, res.status());
            return Err(ApiError::NotFound(id));
        }
        Ok(res.json::<Job>().await?)
    }

    /// Create a single email job
    pub async fn create_job(&self, req: &CreateJobRequest) -> Result<Job> {
        let url = format!("{}/jobs/", self.base);
        info!("Creating {} job", req.job_type.as_str());

        let res = self.http.post(&url).json(req).send().await?;
        if !res.status().is_success() {
            return Err(self.write_error(res, "Failed to create job").await);
        }
        Ok(res.json::<Job>().await?)
    }

    /// Create a bulk email job (one rendered message per recipient)
    pub async fn create_bulk_email(&self, req: &BulkEmailRequest) -> Result<()> {
        let url = format!("{}/jobs/send-email/", self.base);
        info!("Creating bulk email job for {} recipients", req.emails.len());

        let res = self.http.post(&url).json(req).send().await?;
        if !res.status().is_success() {
            return Err(self.write_error(res, "Failed to create bulk email job").await);
        }
        Ok(())
    }

    /// Create a file-upload job from a local file (multipart)
    pub async fn upload_file(&self, req: &UploadJobRequest) -> Result<()> {
        let url = format!("{}/jobs/upload-file/", self.base);
        let file_name = req
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        info!("Uploading file {} as a job", file_name);

        let bytes = tokio::fs::read(&req.path).await.map_err(|e| {
            ApiError::Validation(format!("Cannot read {}: {}", req.path.display(), e))
        })?;

        let mut form = multipart::Form::new()
            .part("file", multipart::Part::bytes(bytes).file_name(file_name))
            .text("schedule_type", req.schedule_type.as_str());
        if let Some(time) = req.scheduled_time {
            form = form.text("scheduled_time", time.to_rfc3339());
        }

        let res = self.http.post(&url).multipart(form).send().await?;
        if !res.status().is_success() {
            return Err(self.write_error(res, "Failed to create file upload job").await);
        }
        Ok(())
    }

    /// Reschedule an editable job
    ///
    /// The server enforces editability; callers should pre-check
    /// [`Job::is_editable`] before offering the action.
    pub async fn update_job(&self, id: i64, req: &UpdateJobRequest) -> Result<Job> {
        let url = format!("{}/jobs/{}/", self.base, id);
        info!("Updating schedule of job {}", id);

        let res = self.http.patch(&url).json(req).send().await?;
        match res.status() {
            s if s.is_success() => Ok(res.json::<Job>().await?),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(id)),
            StatusCode::CONFLICT => {
                Err(ApiError::StateConflict(self.reason(res, "This job cannot be edited").await))
            }
            _ => Err(self.write_error(res, "Failed to update job").await),
        }
    }

    /// Delete a job
    ///
    /// Destructive: the UI requires explicit confirmation before calling.
    pub async fn delete_job(&self, id: i64) -> Result<()> {
        let url = format!("{}/jobs/{}/", self.base, id);
        info!("Deleting job {}", id);

        let res = self.http.delete(&url).send().await?;
        match res.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(id)),
            _ => Err(ApiError::Validation("Failed to delete job".to_string())),
        }
    }

    /// Re-enqueue a failed job
    pub async fn retry_job(&self, id: i64) -> Result<()> {
        let url = format!("{}/jobs/{}/retry/", self.base, id);
        info!("Retrying job {}", id);

        let res = self.http.post(&url).send().await?;
        match res.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(id)),
            _ => {
                // The service explains why the job is not retryable.
                Err(ApiError::StateConflict(self.reason(res, "Failed to retry job").await))
            }
        }
    }

    /// Fetch aggregate job counts
    pub async fn stats(&self) -> Result<JobStats> {
        let url = format!("{}/jobs/stats/", self.base);
        let res = self.http.get(&url).send().await?;
        if !res.status().is_success() {
            return Err(ApiError::Validation("Failed to load stats".to_string()));
        }
        Ok(res.json::<JobStats>().await?)
    }

    /// Fetch a short-lived download URL for the job's artifact
    pub async fn download_url(&self, id: i64) -> Result<String> {
        #[derive(Deserialize)]
        struct DownloadUrl {
            download_url: Option<String>,
        }

        let url = format!("{}/jobs/{}/download-url/", self.base, id);
        let res = self.http.get(&url).send().await?;
        if !res.status().is_success() {
            return Err(ApiError::StateConflict("Failed to get download URL".to_string()));
        }
        let body: DownloadUrl = res.json().await?;
        body.download_url
            .ok_or_else(|| ApiError::StateConflict("No download URL returned".to_string()))
    }

    /// Server-supplied reason string, or a fallback when the body is opaque
    async fn reason(&self, res: reqwest::Response, fallback: &str) -> String {
        match res.json::<ServerError>().await {
            Ok(ServerError { error: Some(msg) }) => msg,
            _ => fallback.to_string(),
        }
    }

    /// Map a non-2xx write response to the generic validation failure
    async fn write_error(&self, res: reqwest::Response, fallback: &str) -> ApiError {
        let status = res.status();
        let msg = self.reason(res, fallback).await;
        warn!("Write rejected with {}: {}", status, msg);
        ApiError::Validation(msg)
    }
}
