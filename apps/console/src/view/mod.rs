//! Interface model written by the renderer and drawn to the terminal.

pub mod render;
pub mod terminal;

use std::collections::VecDeque;

use shared::domain::SessionTimestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotice {
    pub tone: Tone,
    pub text: String,
    pub dismissable: bool,
    pub link: Option<Link>,
}

impl StatusNotice {
    pub fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
            dismissable: false,
            link: None,
        }
    }

    pub fn dismissable(mut self) -> Self {
        self.dismissable = true;
        self
    }

    pub fn with_link(mut self, label: impl Into<String>, href: impl Into<String>) -> Self {
        self.link = Some(Link {
            label: label.into(),
            href: href.into(),
        });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRegion {
    pub visible: bool,
    pub notice: Option<StatusNotice>,
}

impl StatusRegion {
    pub fn replace(&mut self, notice: StatusNotice) {
        self.visible = true;
        self.notice = Some(notice);
    }

    pub fn dismiss(&mut self) {
        if self.notice.as_ref().is_some_and(|n| n.dismissable) {
            self.notice = None;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatisticsView {
    pub total_records: String,
    pub anomaly_count: String,
    pub anomaly_percentage: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    High,
    Elevated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationBlock {
    pub heading: String,
    pub emphasis: Emphasis,
    pub description: String,
    pub items: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Interface {
    pub generation_status: StatusRegion,
    pub capture_status: StatusRegion,
    pub loading: bool,
    pub results_visible: bool,
    pub statistics: StatisticsView,
    pub scatter_src: Option<String>,
    pub distribution_src: Option<String>,
    pub download_target: Option<String>,
    pub session: Option<SessionTimestamp>,
    pub recommendations: Vec<RecommendationBlock>,
    pub recommendations_visible: bool,
    notices: VecDeque<String>,
}

impl Interface {
    /// Queues a blocking notice for the user.
    pub fn alert(&mut self, message: impl Into<String>) {
        self.notices.push_back(message.into());
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        self.notices.drain(..).collect()
    }

    /// Where activating the download control navigates, if it is bound.
    pub fn activate_download(&self) -> Option<&str> {
        self.download_target.as_deref()
    }
}
