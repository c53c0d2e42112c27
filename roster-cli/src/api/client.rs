//! HTTP client for the rooms endpoint

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use super::models::{ApiMessage, SetRoomRequest};
use super::{RoomSubmitter, SubmitOutcome};
use crate::roster::RosterRow;

const SET_ROOM_PATH: &str = "/api/rooms/set-room";

/// reqwest-backed [`RoomSubmitter`]
#[derive(Debug, Clone)]
pub struct RoomsClient {
    http: reqwest::Client,
    base_url: String,
}

impl RoomsClient {
    /// Create a client for the API at `base_url`.
    ///
    /// Without a timeout the transport's own defaults apply.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("roster-cli/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_room_url(&self) -> String {
        format!("{}{}", self.base_url, SET_ROOM_PATH)
    }

    /// Build the authenticated POST for one row
    pub fn build_set_room_request(&self, row: &RosterRow, token: &str) -> Result<reqwest::Request> {
        self.http
            .post(self.set_room_url())
            .bearer_auth(token)
            .json(&SetRoomRequest::from(row))
            .build()
            .with_context(|| format!("Failed to build request for room {}", row.room_no))
    }
}

#[async_trait]
impl RoomSubmitter for RoomsClient {
    async fn submit(&self, row: &RosterRow, token: &str) -> Result<SubmitOutcome> {
        let request = self.build_set_room_request(row, token)?;
        let response = self.http.execute(request).await?;

        let status = response.status();
        // An unreadable body only costs us the server's message
        let body = response.text().await.unwrap_or_default();
        let message = ApiMessage::parse_message(&body);

        log::debug!("POST {} for room {} -> {}", SET_ROOM_PATH, row.room_no, status);

        if status.is_success() {
            Ok(SubmitOutcome::Accepted { message })
        } else {
            Ok(SubmitOutcome::Rejected {
                status: Some(status.as_u16()),
                message,
            })
        }
    }
}
