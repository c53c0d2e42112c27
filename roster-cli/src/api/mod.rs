//! Dormitory REST API boundary
//!
//! The importer only knows about [`RoomSubmitter`]; [`RoomsClient`] is the
//! HTTP implementation used by the CLI.

pub mod client;
pub mod models;

pub use client::RoomsClient;
pub use models::{ApiMessage, SetRoomRequest};

use anyhow::Result;
use async_trait::async_trait;

use crate::roster::RosterRow;

/// What the API made of a submitted row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 2xx response
    Accepted { message: Option<String> },
    /// Non-2xx response
    Rejected {
        status: Option<u16>,
        message: Option<String>,
    },
}

/// Sends one validated room record to the backend.
///
/// `Err` is reserved for transport failures (connection refused, timeouts,
/// broken responses); anything the server actually answered is an
/// [`SubmitOutcome`].
#[async_trait]
pub trait RoomSubmitter: Send + Sync {
    async fn submit(&self, row: &RosterRow, token: &str) -> Result<SubmitOutcome>;
}
