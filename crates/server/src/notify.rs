//! Match notifications.
//!
//! A [`Notice`] is composed for the owner of a lost report when a found
//! report scores at or above the notify threshold. Delivery goes through the
//! [`Notifier`] trait; [`LogNotifier`] simply records the notice in the log.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use matcher::{Category, ReportRecord};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("lost report {lost_id} has no owner to notify")]
    NoRecipient { lost_id: String },

    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// A composed notification, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub lost_id: String,
    pub found_id: String,
    pub score: u32,
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    match value.trim() {
        "" => placeholder,
        v => v,
    }
}

impl Notice {
    pub fn compose(lost: &ReportRecord, found: &ReportRecord, score: u32) -> Result<Self, NotifyError> {
        let recipient = lost
            .created_by
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| NotifyError::NoRecipient {
                lost_id: lost.id.clone(),
            })?
            .to_string();

        let subject = format!(
            "Lost Item Found: {}",
            lost.display_name().unwrap_or("Your Item")
        );

        let body = format!(
            "Hi {recipient},\n\n\
             Good news! We have found an item that matches your lost {item} ({score}% match).\n\n\
             Here are the details provided by the finder:\n\
             ------------------------------------------------\n\
             {details}\n\
             {found_details}\n\
             ------------------------------------------------\n\n\
             Please visit the Lost & Found office or reply to this message to claim your item.\n",
            item = lost.display_name().unwrap_or("item"),
            details = item_details(lost),
            found_details = found_details(found),
        );

        Ok(Self {
            recipient,
            subject,
            body,
            lost_id: lost.id.clone(),
            found_id: found.id.clone(),
            score,
        })
    }
}

fn item_details(lost: &ReportRecord) -> String {
    let description = or_placeholder(&lost.description, "Not provided");
    match lost.category {
        Category::Money => {
            let denominations = if lost.money_denominations.is_empty() {
                "Not specified".to_string()
            } else {
                lost.money_denominations
                    .iter()
                    .map(|d| format!("{}×{}", d.count, d.denomination))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!(
                "• Category: Money\n• Total Amount: {}\n• Denominations: {denominations}\n• Description: {description}",
                lost.total_amount
            )
        }
        Category::Electronics => format!(
            "• Category: Electronics\n• Item Name: {}\n• Brand: {}\n• Model: {}\n• Description: {description}",
            or_placeholder(&lost.item_name, "Not specified"),
            or_placeholder(&lost.brand, "Not specified"),
            or_placeholder(&lost.model, "Not specified"),
        ),
        Category::Books => format!(
            "• Category: Books\n• Book Title: {}\n• Author: {}\n• Description: {description}",
            or_placeholder(&lost.book_title, "Not specified"),
            or_placeholder(&lost.author, "Not specified"),
        ),
        Category::IdCard => format!(
            "• Category: ID Card\n• Name: {}\n• Roll Number: {}\n• Description: {description}",
            or_placeholder(&lost.person_name, "Not specified"),
            or_placeholder(&lost.roll_number, "Not specified"),
        ),
        other => format!(
            "• Category: {other}\n• Item Name: {}\n• Description: {description}",
            or_placeholder(&lost.item_name, "Not specified"),
        ),
    }
}

fn found_details(found: &ReportRecord) -> String {
    let date = found
        .occurred_at
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Not specified".to_string());
    format!(
        "• Found at: {}\n• Date Found: {date}\n• Additional Notes: {}",
        or_placeholder(&found.place, "Not specified"),
        or_placeholder(&found.description, "No additional notes provided"),
    )
}

/// Delivery channel for notices.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, notice: &Notice) -> Result<(), NotifyError>;
}

/// Delivers notices by writing them to the log.
#[derive(Debug, Default)]
pub struct LogNotifier {
    delivered: AtomicUsize,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, notice: &Notice) -> Result<(), NotifyError> {
        tracing::info!(
            recipient = %notice.recipient,
            subject = %notice.subject,
            lost_id = %notice.lost_id,
            found_id = %notice.found_id,
            score = notice.score,
            "match notification"
        );
        tracing::debug!(body = %notice.body, "notification body");
        self.delivered.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
