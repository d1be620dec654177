//! Resource API
//!
//! One method per upstream resource/verb the UI uses. Payload and data
//! types are chosen by the caller; the upstream schema is owned by the
//! backend.

use bytes::Bytes;
use kernel::envelope::ApiEnvelope;
use kernel::id::{CommunityId, JoinRequestId};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::application::send::RequestClient;
use crate::domain::request::{FormPart, RequestEnvelope};
use crate::domain::store::SessionStore;
use crate::error::ClientResult;

/// File handed to [`RequestClient::upload_dataset`]
#[derive(Debug, Clone)]
pub struct DatasetFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl<S> RequestClient<S>
where
    S: SessionStore + Send + Sync + 'static,
{
    // ------------------------------------------------------------------
    // Community categories
    // ------------------------------------------------------------------

    pub async fn list_categories<T: DeserializeOwned>(&self) -> ClientResult<ApiEnvelope<T>> {
        self.send(&RequestEnvelope::get("/community-category")).await
    }

    pub async fn create_category<P, T>(&self, payload: &P) -> ClientResult<ApiEnvelope<T>>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(&RequestEnvelope::post("/community-category").with_json(payload)?)
            .await
    }

    // ------------------------------------------------------------------
    // Communities
    // ------------------------------------------------------------------

    pub async fn list_communities<T: DeserializeOwned>(
        &self,
        query: &[(&str, &str)],
    ) -> ClientResult<ApiEnvelope<T>> {
        let envelope = query
            .iter()
            .fold(RequestEnvelope::get("/community"), |env, (k, v)| {
                env.with_query(*k, *v)
            });
        self.send(&envelope).await
    }

    pub async fn get_community<T: DeserializeOwned>(
        &self,
        id: &CommunityId,
    ) -> ClientResult<ApiEnvelope<T>> {
        self.send(&RequestEnvelope::get(format!("/community/{id}")))
            .await
    }

    pub async fn create_community<P, T>(&self, payload: &P) -> ClientResult<ApiEnvelope<T>>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(&RequestEnvelope::post("/community").with_json(payload)?)
            .await
    }

    pub async fn update_community<P, T>(
        &self,
        id: &CommunityId,
        payload: &P,
    ) -> ClientResult<ApiEnvelope<T>>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(&RequestEnvelope::put(format!("/community/{id}")).with_json(payload)?)
            .await
    }

    pub async fn delete_community<T: DeserializeOwned>(
        &self,
        id: &CommunityId,
    ) -> ClientResult<ApiEnvelope<T>> {
        self.send(&RequestEnvelope::delete(format!("/community/{id}")))
            .await
    }

    // ------------------------------------------------------------------
    // Posts
    // ------------------------------------------------------------------

    pub async fn list_posts<T: DeserializeOwned>(
        &self,
        community: Option<&CommunityId>,
    ) -> ClientResult<ApiEnvelope<T>> {
        let mut envelope = RequestEnvelope::get("/community-post");
        if let Some(community) = community {
            envelope = envelope.with_query("community_id", community.as_str());
        }
        self.send(&envelope).await
    }

    pub async fn create_post<P, T>(&self, payload: &P) -> ClientResult<ApiEnvelope<T>>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(&RequestEnvelope::post("/community-post").with_json(payload)?)
            .await
    }

    pub async fn update_post<P, T>(&self, id: &str, payload: &P) -> ClientResult<ApiEnvelope<T>>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(&RequestEnvelope::put(format!("/community-post/{id}")).with_json(payload)?)
            .await
    }

    pub async fn delete_post<T: DeserializeOwned>(&self, id: &str) -> ClientResult<ApiEnvelope<T>> {
        self.send(&RequestEnvelope::delete(format!("/community-post/{id}")))
            .await
    }

    // ------------------------------------------------------------------
    // Join requests
    // ------------------------------------------------------------------

    pub async fn list_join_requests<T: DeserializeOwned>(
        &self,
        community: Option<&CommunityId>,
    ) -> ClientResult<ApiEnvelope<T>> {
        let mut envelope = RequestEnvelope::get("/community-join-request");
        if let Some(community) = community {
            envelope = envelope.with_query("community_id", community.as_str());
        }
        self.send(&envelope).await
    }

    pub async fn submit_join_request<P, T>(&self, payload: &P) -> ClientResult<ApiEnvelope<T>>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(&RequestEnvelope::post("/community-join-request").with_json(payload)?)
            .await
    }

    pub async fn approve_join_request<T: DeserializeOwned>(
        &self,
        id: &JoinRequestId,
    ) -> ClientResult<ApiEnvelope<T>> {
        self.send(&RequestEnvelope::post(format!(
            "/community-join-request/{id}/approve"
        )))
        .await
    }

    pub async fn reject_join_request<T: DeserializeOwned>(
        &self,
        id: &JoinRequestId,
    ) -> ClientResult<ApiEnvelope<T>> {
        self.send(&RequestEnvelope::post(format!(
            "/community-join-request/{id}/reject"
        )))
        .await
    }

    // ------------------------------------------------------------------
    // Datasets
    // ------------------------------------------------------------------

    /// Multipart upload: the file under `file` plus text `fields`
    pub async fn upload_dataset<T: DeserializeOwned>(
        &self,
        file: DatasetFile,
        fields: &[(&str, &str)],
    ) -> ClientResult<ApiEnvelope<T>> {
        let mut parts: Vec<FormPart> = fields
            .iter()
            .map(|(name, value)| FormPart::text(*name, *value))
            .collect();
        parts.push(FormPart::file(
            "file",
            file.file_name,
            file.content_type,
            file.bytes,
        ));

        self.send(&RequestEnvelope::post("/datasets/upload").with_parts(parts))
            .await
    }
}
