//! Outbound mail relay seam.
//!
//! The real relay is an external collaborator; the application only depends
//! on this trait. The default implementation logs the message, which is what
//! deployments without a configured relay run with.

use crate::errors::{AppError, Result as AppResult};
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
  pub to: String,
  pub from: String,
  pub subject: String,
  pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
  async fn send(&self, to: &str, from: &str, subject: &str, html_body: &str) -> AppResult<()>;
}

/// Logs instead of sending. Stands in for the SMTP relay in development.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
  async fn send(&self, to: &str, from: &str, subject: &str, _html_body: &str) -> AppResult<()> {
    info!("Mail relay (log only): To='{}', From='{}', Subject='{}'", to, from, subject);
    Ok(())
  }
}

/// Test double that records every send and can be told to fail.
pub struct RecordingMailer {
  pub sent: Mutex<Vec<SentEmail>>,
  pub fail: bool,
}

impl RecordingMailer {
  pub fn new() -> Self {
    Self {
      sent: Mutex::new(Vec::new()),
      fail: false,
    }
  }

  pub fn failing() -> Self {
    Self {
      sent: Mutex::new(Vec::new()),
      fail: true,
    }
  }
}

impl Default for RecordingMailer {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl Mailer for RecordingMailer {
  async fn send(&self, to: &str, from: &str, subject: &str, html_body: &str) -> AppResult<()> {
    if self.fail {
      return Err(AppError::Upstream {
        source: anyhow::anyhow!("simulated mail relay failure"),
      });
    }
    self.sent.lock().unwrap().push(SentEmail {
      to: to.to_string(),
      from: from.to_string(),
      subject: subject.to_string(),
      html_body: html_body.to_string(),
    });
    Ok(())
  }
}
