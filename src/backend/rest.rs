//! REST client for the institution's management backend.
//!
//! Implements [`ScheduleService`] over HTTPS with bearer-token auth. The
//! request/response bodies are exactly the wire shapes in [`crate::api`];
//! endpoint paths follow the backend's resource layout.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::error::{BackendResult, ErrorContext};
use super::{BackendError, ScheduleService};
use crate::api::{
    ConflictCheck, NewSectionSubject, ProfessorConflictQuery, ProfessorId, RoomConflictQuery,
    SectionConflictQuery, SectionId, SectionScheduleData, SectionSubjectId, SemesterId, Slot,
    SlotId,
};
use crate::config::BackendSettings;

/// REST-over-HTTPS schedule service client.
#[derive(Clone)]
pub struct RestScheduleService {
    client: Client,
    base_url: String,
    bearer_token: String,
}

#[derive(Deserialize)]
struct CreatedSectionSubject {
    id: SectionSubjectId,
}

impl RestScheduleService {
    /// Build a client from backend settings.
    pub fn from_settings(settings: &BackendSettings) -> BackendResult<Self> {
        if settings.base_url.is_empty() {
            return Err(BackendError::configuration(
                "REST backend requires 'backend.base_url' setting",
            ));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| BackendError::configuration(format!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            bearer_token: settings.bearer_token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.client
            .request(method, url)
            .bearer_auth(&self.bearer_token)
    }

    /// Map a non-success HTTP status to the backend error taxonomy.
    async fn check_status(response: Response, operation: &str) -> BackendResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let context = ErrorContext::new(operation);
        let body = response.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, body)
        };

        Err(match status {
            StatusCode::NOT_FOUND => BackendError::not_found_with_context(message, context),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                BackendError::Timeout {
                    message,
                    context: context.retryable(),
                }
            }
            s if s.is_client_error() => BackendError::Validation { message, context },
            _ => BackendError::Internal { message, context },
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: Response,
        operation: &str,
    ) -> BackendResult<T> {
        let checked = Self::check_status(response, operation).await?;
        checked.json::<T>().await.map_err(|e| {
            BackendError::internal(format!("Malformed response body: {}", e))
                .with_operation(operation)
        })
    }
}

#[async_trait]
impl ScheduleService for RestScheduleService {
    async fn fetch_section_schedule(
        &self,
        section_id: SectionId,
    ) -> BackendResult<SectionScheduleData> {
        let response = self
            .request(Method::GET, &format!("sections/{}/schedule", section_id))
            .send()
            .await?;
        Self::decode(response, "fetch_section_schedule").await
    }

    async fn save_slot(&self, slot: Slot) -> BackendResult<Slot> {
        let response = match slot.id {
            Some(id) => {
                self.request(Method::PATCH, &format!("slots/{}", id))
                    .json(&slot)
                    .send()
                    .await?
            }
            None => self.request(Method::POST, "slots").json(&slot).send().await?,
        };
        Self::decode(response, "save_slot").await
    }

    async fn delete_slot(&self, slot_id: SlotId) -> BackendResult<()> {
        let response = self
            .request(Method::DELETE, &format!("slots/{}", slot_id))
            .send()
            .await?;
        Self::check_status(response, "delete_slot").await?;
        Ok(())
    }

    async fn check_section_conflict(
        &self,
        query: SectionConflictQuery,
    ) -> BackendResult<ConflictCheck> {
        let response = self
            .request(Method::POST, "conflicts/section")
            .json(&query)
            .send()
            .await?;
        Self::decode(response, "check_section_conflict").await
    }

    async fn check_professor_conflict(
        &self,
        query: ProfessorConflictQuery,
    ) -> BackendResult<ConflictCheck> {
        let response = self
            .request(Method::POST, "conflicts/professor")
            .json(&query)
            .send()
            .await?;
        Self::decode(response, "check_professor_conflict").await
    }

    async fn check_room_conflict(
        &self,
        query: RoomConflictQuery,
    ) -> BackendResult<ConflictCheck> {
        let response = self
            .request(Method::POST, "conflicts/room")
            .json(&query)
            .send()
            .await?;
        Self::decode(response, "check_room_conflict").await
    }

    async fn create_section_subject(
        &self,
        request: NewSectionSubject,
    ) -> BackendResult<SectionSubjectId> {
        let response = self
            .request(Method::POST, "section-subjects")
            .json(&request)
            .send()
            .await?;
        let created: CreatedSectionSubject =
            Self::decode(response, "create_section_subject").await?;
        Ok(created.id)
    }

    async fn fetch_professor_schedule(
        &self,
        professor_id: ProfessorId,
        semester_id: SemesterId,
    ) -> BackendResult<Vec<Slot>> {
        let response = self
            .request(Method::GET, &format!("professors/{}/schedule", professor_id))
            .query(&[("semester_id", semester_id.value())])
            .send()
            .await?;
        Self::decode(response, "fetch_professor_schedule").await
    }
}
