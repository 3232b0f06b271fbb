//! Table endpoints: owner-scoped select, insert, full update, single-field patch, delete.

use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::{check, RestGateway};
use crate::errors::AppError;

const PREFER: &str = "Prefer";
const RETURN_REPRESENTATION: &str = "return=representation";
const RETURN_MINIMAL: &str = "return=minimal";

impl RestGateway {
    fn table_url(&self, table: &str) -> String {
        self.url(&format!("/rest/v1/{}", table))
    }

    /// All rows owned by `owner`, newest first.
    pub async fn select_owned<R: DeserializeOwned>(
        &self,
        table: &str,
        owner: Uuid,
    ) -> Result<Vec<R>, AppError> {
        let owner_filter = format!("eq.{}", owner);
        let response = self
            .authorized(self.http.get(self.table_url(table)))
            .query(&[
                ("select", "*"),
                ("user_id", owner_filter.as_str()),
                ("order", "created_at.desc"),
            ])
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Insert one row and return the stored representation.
    pub async fn insert<B: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<R, AppError> {
        let response = self
            .authorized(self.http.post(self.table_url(table)))
            .header(PREFER, HeaderValue::from_static(RETURN_REPRESENTATION))
            .json(&[body])
            .send()
            .await?;

        let rows: Vec<R> = check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::Decode(format!("Insert into {} returned no row", table)))
    }

    /// Replace the writable columns of row `id` and return the stored representation.
    pub async fn update<B: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        id: i64,
        body: &B,
    ) -> Result<R, AppError> {
        let id_filter = format!("eq.{}", id);
        let response = self
            .authorized(self.http.patch(self.table_url(table)))
            .query(&[("id", id_filter.as_str())])
            .header(PREFER, HeaderValue::from_static(RETURN_REPRESENTATION))
            .json(body)
            .send()
            .await?;

        let rows: Vec<R> = check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Row {} not found in {}", id, table)))
    }

    /// Patch a subset of the columns of row `id` without reading it back.
    pub async fn patch<B: Serialize>(&self, table: &str, id: i64, body: &B) -> Result<(), AppError> {
        let id_filter = format!("eq.{}", id);
        let response = self
            .authorized(self.http.patch(self.table_url(table)))
            .query(&[("id", id_filter.as_str())])
            .header(PREFER, HeaderValue::from_static(RETURN_MINIMAL))
            .json(body)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Delete row `id`. Succeeds whether or not the row existed.
    pub async fn delete(&self, table: &str, id: i64) -> Result<(), AppError> {
        let id_filter = format!("eq.{}", id);
        let response = self
            .authorized(self.http.delete(self.table_url(table)))
            .query(&[("id", id_filter.as_str())])
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }
}
