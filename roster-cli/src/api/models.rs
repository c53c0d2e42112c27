//! Wire types for the rooms endpoint

use serde::{Deserialize, Serialize};

use crate::roster::RosterRow;

/// Body of `POST /api/rooms/set-room`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRoomRequest<'a> {
    pub room_no: &'a str,
    pub current_student: u32,
    pub total_capacity: u32,
}

impl<'a> From<&'a RosterRow> for SetRoomRequest<'a> {
    fn from(row: &'a RosterRow) -> Self {
        Self {
            room_no: &row.room_no,
            current_student: row.current_student,
            total_capacity: row.total_capacity,
        }
    }
}

/// Response body shared by success and error replies
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiMessage {
    /// Extract a non-blank `message` from a response body, if there is one
    pub fn parse_message(body: &str) -> Option<String> {
        serde_json::from_str::<ApiMessage>(body)
            .ok()
            .and_then(|m| m.message)
            .filter(|m| !m.trim().is_empty())
    }
}
