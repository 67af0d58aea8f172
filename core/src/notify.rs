// mercado/src/notify.rs

//! The user-facing "show a transient message" collaborator.

use tracing::{event, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
  Success,
  Info,
  Warning,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub level: NoticeLevel,
  pub title: String,
  pub description: String,
}

impl Notice {
  pub fn new(level: NoticeLevel, title: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      level,
      title: title.into(),
      description: description.into(),
    }
  }

  pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
    Self::new(NoticeLevel::Success, title, description)
  }

  pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
    Self::new(NoticeLevel::Info, title, description)
  }

  pub fn warning(title: impl Into<String>, description: impl Into<String>) -> Self {
    Self::new(NoticeLevel::Warning, title, description)
  }

  pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
    Self::new(NoticeLevel::Error, title, description)
  }
}

pub trait Notifier: Send + Sync {
  fn notify(&self, notice: Notice);
}

/// Writes notices to the log. Used when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
  fn notify(&self, notice: Notice) {
    match notice.level {
      NoticeLevel::Success | NoticeLevel::Info => {
        event!(Level::INFO, title = %notice.title, "{}", notice.description)
      }
      NoticeLevel::Warning => event!(Level::WARN, title = %notice.title, "{}", notice.description),
      NoticeLevel::Error => event!(Level::ERROR, title = %notice.title, "{}", notice.description),
    }
  }
}
