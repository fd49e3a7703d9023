// crates/api-gateway-services/src/http.rs
// ============================================================================
// Module: HTTP Service Clients
// Description: HTTP/JSON clients for the backend microservices.
// Purpose: Carry the execution context's credential and deadline to backends.
// Dependencies: reqwest, serde, serde_json, tokio, tracing
// ============================================================================

//! ## Overview
//! [`HttpServices`] holds one client per microservice endpoint. Every call:
//! - attaches `Authorization: Bearer <token>` when the context carries one,
//! - uses the smaller of the service request timeout and the context's
//!   remaining deadline,
//! - races the call against the context's cancellation token so a cancelled
//!   invocation drops the in-flight request.
//!
//! Security posture: backend responses are untrusted; bodies are size
//! limited and error previews are truncated. Credentials are never logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use api_gateway_config::ServicesConfig;
use api_gateway_core::ExecutionContext;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ServiceError;
use crate::models::Announcement;
use crate::models::Course;
use crate::models::Grade;
use crate::models::GradeRecord;
use crate::models::Homework;
use crate::models::NewAnnouncement;
use crate::models::NewCourse;
use crate::models::NewGrade;
use crate::models::NewHomework;
use crate::models::NewStaff;
use crate::models::NewStudent;
use crate::models::Staff;
use crate::models::Student;
use crate::service::CoursesService;
use crate::service::GradesService;
use crate::service::StaffService;
use crate::service::StudentsService;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum backend response body size.
pub const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

/// Maximum characters of a backend error body kept in error messages.
const MAX_ERROR_PREVIEW_CHARS: usize = 256;

/// Correlation header forwarded to backends.
const REQUEST_ID_HEADER: &str = "x-request-id";

// ============================================================================
// SECTION: Endpoint
// ============================================================================

/// One microservice endpoint.
#[derive(Debug, Clone)]
struct Endpoint {
    /// Service label used in errors and logs.
    service: &'static str,
    /// Base URL.
    base: Url,
    /// HTTP client.
    client: Client,
    /// Per-call timeout ceiling.
    request_timeout: Duration,
}

impl Endpoint {
    /// Builds an endpoint client.
    fn new(
        service: &'static str,
        base: &str,
        config: &ServicesConfig,
    ) -> Result<Self, ServiceError> {
        let base = Url::parse(base.trim()).map_err(|err| ServiceError::Config {
            service,
            message: format!("invalid base url: {err}"),
        })?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ServiceError::Config {
                service,
                message: "base url must be an http or https url".to_string(),
            });
        }
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .redirect(Policy::none())
            .build()
            .map_err(|err| ServiceError::Config {
                service,
                message: err.to_string(),
            })?;
        Ok(Self {
            service,
            base,
            client,
            request_timeout: config.request_timeout(),
        })
    }

    /// Builds a request URL from escaped path segments and query pairs.
    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ServiceError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ServiceError::Config {
                service: self.service,
                message: "base url cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Issues a GET request and decodes the JSON response.
    async fn get<T>(
        &self,
        ctx: &ExecutionContext,
        segments: &[&str],
        query: &[(&str, &str)],
        resource: &str,
    ) -> Result<T, ServiceError>
    where
        T: DeserializeOwned + Send,
    {
        let url = self.url(segments, query)?;
        tracing::debug!(service = self.service, path = url.path(), "backend get");
        self.send(ctx, self.client.get(url), resource).await
    }

    /// Issues a POST request with a JSON body and decodes the JSON response.
    async fn post<B, T>(
        &self,
        ctx: &ExecutionContext,
        segments: &[&str],
        body: &B,
        resource: &str,
    ) -> Result<T, ServiceError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let url = self.url(segments, &[])?;
        tracing::debug!(service = self.service, path = url.path(), "backend post");
        self.send(ctx, self.client.post(url).json(body), resource).await
    }

    /// Applies context headers and limits, then executes the request.
    async fn send<T>(
        &self,
        ctx: &ExecutionContext,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<T, ServiceError>
    where
        T: DeserializeOwned + Send,
    {
        if ctx.is_cancelled() {
            return Err(ServiceError::Cancelled {
                service: self.service,
            });
        }
        let timeout = ctx
            .remaining()
            .map_or(self.request_timeout, |remaining| remaining.min(self.request_timeout));
        if timeout.is_zero() {
            return Err(ServiceError::Timeout {
                service: self.service,
            });
        }

        let mut request =
            request.timeout(timeout).header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(value) = ctx.authorization_header() {
            let header = HeaderValue::from_str(&value).map_err(|_| ServiceError::Config {
                service: self.service,
                message: "invalid bearer token header".to_string(),
            })?;
            request = request.header(AUTHORIZATION, header);
        }
        if let Some(header) = ctx.request_id().and_then(|id| HeaderValue::from_str(id).ok()) {
            request = request.header(REQUEST_ID_HEADER, header);
        }

        let call = async {
            let response = request.send().await.map_err(|err| self.transport_error(&err))?;
            let status = response.status();
            let body = self.read_body(response).await?;
            if !status.is_success() {
                return Err(self.status_error(status, &body, resource));
            }
            serde_json::from_slice(&body).map_err(|err| ServiceError::Decode {
                service: self.service,
                message: err.to_string(),
            })
        };

        tokio::select! {
            biased;
            () = ctx.cancellation().cancelled() => {
                tracing::debug!(service = self.service, "backend call abandoned");
                Err(ServiceError::Cancelled { service: self.service })
            }
            result = call => result,
        }
    }

    /// Reads a response body while enforcing [`MAX_RESPONSE_BYTES`].
    async fn read_body(&self, mut response: reqwest::Response) -> Result<Vec<u8>, ServiceError> {
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|err| self.transport_error(&err))? {
            if body.len().saturating_add(chunk.len()) > MAX_RESPONSE_BYTES {
                return Err(ServiceError::ResponseTooLarge {
                    service: self.service,
                    limit: MAX_RESPONSE_BYTES,
                });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    /// Maps a reqwest failure.
    fn transport_error(&self, err: &reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout {
                service: self.service,
            }
        } else {
            ServiceError::Transport {
                service: self.service,
                message: err.to_string(),
            }
        }
    }

    /// Maps a non-success status.
    fn status_error(&self, status: StatusCode, body: &[u8], resource: &str) -> ServiceError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Unauthorized {
                service: self.service,
                status: status.as_u16(),
            },
            StatusCode::NOT_FOUND => ServiceError::NotFound {
                service: self.service,
                resource: resource.to_string(),
            },
            _ => {
                let preview: String = String::from_utf8_lossy(body)
                    .trim()
                    .chars()
                    .take(MAX_ERROR_PREVIEW_CHARS)
                    .collect();
                ServiceError::Status {
                    service: self.service,
                    status: status.as_u16(),
                    message: preview,
                }
            }
        }
    }
}

// ============================================================================
// SECTION: HTTP Services
// ============================================================================

/// HTTP/JSON clients for the four microservices.
#[derive(Debug, Clone)]
pub struct HttpServices {
    /// Students endpoint.
    students: Endpoint,
    /// Staff endpoint.
    staff: Endpoint,
    /// Courses endpoint (courses, homework, announcements).
    courses: Endpoint,
    /// Grades endpoint.
    grades: Endpoint,
}

impl HttpServices {
    /// Builds clients for every configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] when a base URL or client is invalid.
    pub fn from_config(config: &ServicesConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            students: Endpoint::new("students", &config.students, config)?,
            staff: Endpoint::new("staff", &config.staff, config)?,
            courses: Endpoint::new("courses", &config.courses, config)?,
            grades: Endpoint::new("grades", &config.grades, config)?,
        })
    }
}

#[async_trait]
impl StudentsService for HttpServices {
    async fn get_student(&self, ctx: &ExecutionContext, id: &str) -> Result<Student, ServiceError> {
        self.students.get(ctx, &["students", id], &[], &format!("student {id}")).await
    }

    async fn create_student(
        &self,
        ctx: &ExecutionContext,
        input: NewStudent,
    ) -> Result<Student, ServiceError> {
        self.students.post(ctx, &["students"], &input, "students").await
    }
}

#[async_trait]
impl StaffService for HttpServices {
    async fn get_staff(&self, ctx: &ExecutionContext, id: &str) -> Result<Staff, ServiceError> {
        self.staff.get(ctx, &["staff", id], &[], &format!("staff member {id}")).await
    }

    async fn create_staff(
        &self,
        ctx: &ExecutionContext,
        input: NewStaff,
    ) -> Result<Staff, ServiceError> {
        self.staff.post(ctx, &["staff"], &input, "staff").await
    }
}

#[async_trait]
impl CoursesService for HttpServices {
    async fn get_course(&self, ctx: &ExecutionContext, id: &str) -> Result<Course, ServiceError> {
        self.courses.get(ctx, &["courses", id], &[], &format!("course {id}")).await
    }

    async fn create_course(
        &self,
        ctx: &ExecutionContext,
        input: NewCourse,
    ) -> Result<Course, ServiceError> {
        self.courses.post(ctx, &["courses"], &input, "courses").await
    }

    async fn course_students(
        &self,
        ctx: &ExecutionContext,
        course_id: &str,
    ) -> Result<Vec<Student>, ServiceError> {
        let resource = format!("course {course_id}");
        self.courses.get(ctx, &["courses", course_id, "students"], &[], &resource).await
    }

    async fn course_homework(
        &self,
        ctx: &ExecutionContext,
        course_id: &str,
    ) -> Result<Vec<Homework>, ServiceError> {
        let resource = format!("course {course_id}");
        self.courses.get(ctx, &["courses", course_id, "homework"], &[], &resource).await
    }

    async fn create_homework(
        &self,
        ctx: &ExecutionContext,
        input: NewHomework,
    ) -> Result<Homework, ServiceError> {
        let resource = format!("course {}", input.course_id);
        self.courses
            .post(ctx, &["courses", input.course_id.as_str(), "homework"], &input, &resource)
            .await
    }

    async fn course_announcements(
        &self,
        ctx: &ExecutionContext,
        course_id: &str,
    ) -> Result<Vec<Announcement>, ServiceError> {
        let resource = format!("course {course_id}");
        self.courses.get(ctx, &["courses", course_id, "announcements"], &[], &resource).await
    }

    async fn create_announcement(
        &self,
        ctx: &ExecutionContext,
        input: NewAnnouncement,
    ) -> Result<Announcement, ServiceError> {
        let resource = format!("course {}", input.course_id);
        self.courses
            .post(ctx, &["courses", input.course_id.as_str(), "announcements"], &input, &resource)
            .await
    }
}

#[async_trait]
impl GradesService for HttpServices {
    async fn student_course_grades(
        &self,
        ctx: &ExecutionContext,
        student_id: &str,
        course_id: &str,
        semester: &str,
    ) -> Result<Vec<Grade>, ServiceError> {
        let query = [("studentId", student_id), ("courseId", course_id), ("semester", semester)];
        let records: Vec<GradeRecord> =
            self.grades.get(ctx, &["grades"], &query, "grades").await?;
        Ok(records.into_iter().map(Grade::from).collect())
    }

    async fn create_grade(
        &self,
        ctx: &ExecutionContext,
        input: NewGrade,
    ) -> Result<Grade, ServiceError> {
        let record: GradeRecord = self.grades.post(ctx, &["grades"], &input, "grades").await?;
        Ok(Grade::from(record))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use api_gateway_config::ServicesConfig;

    use super::Endpoint;

    #[test]
    fn url_escapes_path_segments() {
        let config = ServicesConfig::default();
        let endpoint = Endpoint::new("students", "http://localhost:50052/api/", &config).unwrap();
        let url = endpoint.url(&["students", "a/b c"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:50052/api/students/a%2Fb%20c");
    }

    #[test]
    fn url_encodes_query_pairs() {
        let config = ServicesConfig::default();
        let endpoint = Endpoint::new("grades", "http://localhost:50051", &config).unwrap();
        let url = endpoint.url(&["grades"], &[("semester", "Fall 2024")]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:50051/grades?semester=Fall+2024");
    }

    #[test]
    fn rejects_non_http_base() {
        let config = ServicesConfig::default();
        assert!(Endpoint::new("staff", "mailto:staff@example.com", &config).is_err());
    }
}
