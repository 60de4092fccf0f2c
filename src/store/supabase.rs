//! Supabase REST and Storage client using the service_role key

use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::Config;

/// PostgREST query parameters.
///
/// Values are percent-encoded by reqwest when the request is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, key: &str, value: String) -> Self {
        self.pairs.push((key.to_string(), value));
        self
    }

    pub fn select(self, columns: &str) -> Self {
        self.push("select", columns.to_string())
    }

    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.push(column, format!("eq.{}", value.to_string()))
    }

    /// Case-insensitive pattern match on the literal `value`.
    ///
    /// PostgREST turns every `*` into `%` and offers no escape for it, so a `*`
    /// is sent as the single-character wildcard `_`. Rows can therefore match
    /// loosely; callers compare the returned values themselves.
    pub fn ilike(self, column: &str, value: &str) -> Self {
        let mut pattern = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '\\' | '%' | '_' => {
                    pattern.push('\\');
                    pattern.push(c);
                }
                '*' => pattern.push('_'),
                _ => pattern.push(c),
            }
        }
        self.push(column, format!("ilike.{}", pattern))
    }

    pub fn order(self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.push("order", format!("{}.{}", column, direction))
    }

    pub fn limit(self, limit: u32) -> Self {
        self.push("limit", limit.to_string())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// Supabase client for server-side database operations
/// Uses service_role key which bypasses RLS - handle with care!
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_role_key: String,
}

impl SupabaseClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            service_role_key: config.supabase_service_role_key.clone(),
        }
    }

    /// Get the REST API URL for a table
    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", self.service_role_key))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, SupabaseError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(SupabaseError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Make an authenticated GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>, SupabaseError> {
        let request = self.client.get(self.rest_url(table)).query(query.pairs());
        let response = self.send(request).await?;
        response.json().await.map_err(SupabaseError::Parse)
    }

    /// Make an authenticated GET request expecting a single row
    pub async fn get_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Option<T>, SupabaseError> {
        let request = self
            .client
            .get(self.rest_url(table))
            .query(query.pairs())
            .header("Accept", "application/vnd.pgrst.object+json");

        match self.send(request).await {
            Ok(response) => response.json().await.map(Some).map_err(SupabaseError::Parse),
            // No rows found
            Err(SupabaseError::Api { status: 406, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Make an authenticated POST request (insert)
    pub async fn insert<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        data: &T,
    ) -> Result<R, SupabaseError> {
        let request = self
            .client
            .post(self.rest_url(table))
            .header("Prefer", "return=representation")
            .json(data);
        let response = self.send(request).await?;

        // PostgREST returns an array, get first element
        let results: Vec<R> = response.json().await.map_err(SupabaseError::Parse)?;
        results
            .into_iter()
            .next()
            .ok_or(SupabaseError::NoRowReturned)
    }

    /// Make an authenticated PATCH request (update)
    pub async fn update<T: Serialize>(
        &self,
        table: &str,
        query: &Query,
        data: &T,
    ) -> Result<(), SupabaseError> {
        let request = self
            .client
            .patch(self.rest_url(table))
            .query(query.pairs())
            .json(data);
        self.send(request).await.map(|_| ())
    }

    /// PATCH and return the updated rows
    pub async fn update_returning<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
        data: &T,
    ) -> Result<Vec<R>, SupabaseError> {
        let request = self
            .client
            .patch(self.rest_url(table))
            .query(query.pairs())
            .header("Prefer", "return=representation")
            .json(data);
        let response = self.send(request).await?;
        response.json().await.map_err(SupabaseError::Parse)
    }

    /// Exact row count through `Prefer: count=exact`
    pub async fn count(&self, table: &str, query: &Query) -> Result<usize, SupabaseError> {
        let request = self
            .client
            .head(self.rest_url(table))
            .query(query.pairs())
            .header("Prefer", "count=exact");
        let response = self.send(request).await?;
        let status = response.status().as_u16();
        let range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        content_range_total(range).ok_or_else(|| SupabaseError::Api {
            status,
            body: format!("unexpected Content-Range: {:?}", range),
        })
    }

    /// Make an authenticated DELETE request
    pub async fn delete(&self, table: &str, query: &Query) -> Result<(), SupabaseError> {
        let request = self.client.delete(self.rest_url(table)).query(query.pairs());
        self.send(request).await.map(|_| ())
    }

    /// Call a Postgres function through PostgREST
    pub async fn rpc<T: Serialize>(&self, function: &str, args: &T) -> Result<(), SupabaseError> {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, function);
        let request = self.client.post(url).json(args);
        self.send(request).await.map(|_| ())
    }

    /// Upload an object to a storage bucket, replacing any existing object
    pub async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<(), SupabaseError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path);
        let request = self
            .client
            .post(url)
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(body);
        self.send(request).await.map(|_| ())
    }

    /// Public URL of an object in a public bucket
    pub fn public_object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        )
    }
}

/// Total from a PostgREST `Content-Range` header such as `0-9/42` or `*/0`
fn content_range_total(range: &str) -> Option<usize> {
    range.rsplit_once('/')?.1.parse().ok()
}

/// Supabase errors
#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    Request(reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(reqwest::Error),

    #[error("No row returned from insert")]
    NoRowReturned,
}

impl SupabaseError {
    fn body(&self) -> Option<&str> {
        match self {
            SupabaseError::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Storage answered that the bucket does not exist
    pub fn is_missing_bucket(&self) -> bool {
        self.body()
            .map(|b| b.to_ascii_lowercase().contains("bucket not found"))
            .unwrap_or(false)
    }

    /// Row level security refused the write
    pub fn is_rls_violation(&self) -> bool {
        match self {
            SupabaseError::Api { body, .. } => {
                body.contains("42501") || body.to_ascii_lowercase().contains("row-level security")
            }
            _ => false,
        }
    }

    /// Unique constraint violation (Postgres code 23505)
    pub fn is_unique_violation(&self) -> bool {
        match self {
            SupabaseError::Api { body, .. } => body.contains("23505"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, body: &str) -> SupabaseError {
        SupabaseError::Api {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn query_builds_postgrest_filters() {
        let query = Query::new()
            .select("id,username")
            .eq("guild_id", "g-1")
            .order("level", false)
            .limit(50);

        assert_eq!(
            query.pairs(),
            &[
                ("select".to_string(), "id,username".to_string()),
                ("guild_id".to_string(), "eq.g-1".to_string()),
                ("order".to_string(), "level.desc".to_string()),
                ("limit".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn reads_total_from_content_range() {
        assert_eq!(content_range_total("0-9/42"), Some(42));
        assert_eq!(content_range_total("*/0"), Some(0));
        assert_eq!(content_range_total("0-9/*"), None);
        assert_eq!(content_range_total(""), None);
    }

    #[test]
    fn ilike_escapes_wildcards() {
        let query = Query::new().ilike("username", "50%_off");
        assert_eq!(query.pairs()[0].1, "ilike.50\\%\\_off");

        let starred = Query::new().ilike("username", "*Iron*");
        assert_eq!(starred.pairs()[0].1, "ilike._Iron_");
    }

    #[test]
    fn classifies_storage_and_policy_failures() {
        let bucket = api(400, r#"{"statusCode":"404","error":"Bucket not found"}"#);
        assert!(bucket.is_missing_bucket());
        assert!(!bucket.is_rls_violation());

        let rls = api(
            403,
            r#"{"message":"new row violates row-level security policy for table \"profiles\""}"#,
        );
        assert!(rls.is_rls_violation());
        assert!(api(401, r#"{"code":"42501"}"#).is_rls_violation());

        let dup = api(409, r#"{"code":"23505","message":"duplicate key"}"#);
        assert!(dup.is_unique_violation());
        assert!(!SupabaseError::NoRowReturned.is_unique_violation());

        let missing_receiver = api(
            409,
            r#"{"code":"23503","message":"insert or update on table \"workout_invites\" violates foreign key constraint"}"#,
        );
        assert!(!missing_receiver.is_unique_violation());
    }
}
