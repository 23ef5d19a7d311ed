use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dotenv::dotenv;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, info, warn};

use crate::models::calendar::CalendarBlock;
use crate::providers::{CalendarSource, InviteRequest, InviteSink, ProviderError};

// Event wire shapes for a Google-Calendar-style events API.

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EventDateTime {
    #[serde(rename = "dateTime")]
    pub date_time: Option<DateTime<Utc>>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventResource {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

#[derive(Debug, Deserialize)]
pub struct EventsListResponse {
    #[serde(default)]
    pub items: Vec<EventResource>,
}

#[derive(Debug, Serialize)]
pub struct EventAttendee {
    pub email: String,
    #[serde(rename = "responseStatus", skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InsertEventRequest {
    pub summary: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub attendees: Vec<EventAttendee>,
}

#[derive(Debug, Deserialize)]
pub struct InsertEventResponse {
    pub id: String,
}

/// Client for the calendar provider, covering both the placeholder-block
/// search and invite creation.
pub struct CalendarClient {
    client: Client,
    endpoint: String,
    calendar_id: String,
    api_token: String,
    organizer_email: String,
    location_url: Option<String>,
}

impl CalendarClient {
    /// Create a new calendar client from environment variables
    pub fn from_env() -> Self {
        dotenv().ok();

        let calendar_id =
            env::var("CALENDAR_ID").expect("CALENDAR_ID must be set in environment");

        Self {
            client: Client::new(),
            endpoint: env::var("CALENDAR_API_ENDPOINT")
                .unwrap_or_else(|_| "https://www.googleapis.com/calendar/v3".to_string()),
            organizer_email: env::var("ORGANIZER_EMAIL").unwrap_or_else(|_| calendar_id.clone()),
            calendar_id,
            api_token: env::var("CALENDAR_API_TOKEN")
                .expect("CALENDAR_API_TOKEN must be set in environment"),
            location_url: env::var("MEETING_LOCATION_URL").ok(),
        }
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.endpoint, self.calendar_id)
    }

    async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let message = res.text().await.unwrap_or_else(|_| "<no body>".to_string());
        Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl CalendarSource for CalendarClient {
    /// Find future-dated placeholder blocks matching a name filter,
    /// ordered by start time.
    async fn find_blocks(&self, label_query: &str) -> Result<Vec<CalendarBlock>, ProviderError> {
        let url = self.events_url();
        let time_min = Utc::now().to_rfc3339();

        info!("Searching calendar for placeholder blocks named '{}'", label_query);
        debug!("API URL: {}", url);

        let res = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(&[
                ("q", label_query),
                ("timeMin", time_min.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await?;

        let res = Self::check_status(res).await?;
        let response = res.json::<EventsListResponse>().await?;

        let mut blocks = Vec::new();
        for event in response.items {
            // All-day events carry no dateTime; those and inverted windows
            // cannot be carved into slots.
            let (start, end) = match (event.start.date_time, event.end.date_time) {
                (Some(start), Some(end)) if end > start => (start, end),
                _ => {
                    warn!(
                        "Skipping event {} ('{}'): not a usable timed window",
                        event.id,
                        event.summary.as_deref().unwrap_or("")
                    );
                    continue;
                }
            };

            blocks.push(CalendarBlock {
                id: event.id,
                summary: event.summary.unwrap_or_default(),
                start_time: start,
                end_time: end,
            });
        }

        info!("Found {} usable placeholder block(s)", blocks.len());
        Ok(blocks)
    }
}

#[async_trait]
impl InviteSink for CalendarClient {
    /// Create the calendar invite with the lead as attendee and the
    /// operator as accepting organizer. Attendees are notified.
    async fn create_invite(&self, request: &InviteRequest) -> Result<String, ProviderError> {
        let url = self.events_url();

        let body = InsertEventRequest {
            summary: request.title.clone(),
            description: request.body.clone(),
            location: self.location_url.clone(),
            start: EventDateTime {
                date_time: Some(request.start_time),
                time_zone: Some("UTC".to_string()),
            },
            end: EventDateTime {
                date_time: Some(request.end_time),
                time_zone: Some("UTC".to_string()),
            },
            attendees: vec![
                EventAttendee {
                    email: self.organizer_email.clone(),
                    response_status: Some("accepted".to_string()),
                },
                EventAttendee {
                    email: request.attendee_email.clone(),
                    response_status: None,
                },
            ],
        };

        info!(
            "Creating calendar invite '{}' for {} at {} - {}",
            request.title, request.attendee_email, request.start_time, request.end_time
        );

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .query(&[("sendUpdates", "all")])
            .json(&body)
            .send()
            .await?;

        let res = Self::check_status(res).await?;
        let created = res.json::<InsertEventResponse>().await?;

        info!("Created calendar invite with ID {}", created.id);
        Ok(created.id)
    }
}
