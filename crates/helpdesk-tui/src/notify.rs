//! Toast notifications.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::keymap::truncate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToastVariant {
    #[default]
    Default,
    Success,
    Destructive,
}

impl ToastVariant {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Success => "ok",
            Self::Destructive => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn new(title: impl Into<String>, variant: ToastVariant) -> Self {
        Self {
            title: title.into(),
            variant,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(title, ToastVariant::Success)
    }

    pub fn destructive(title: impl Into<String>) -> Self {
        Self::new(title, ToastVariant::Destructive)
    }
}

/// Anything that can put a message in front of the user.
pub trait Notifier: Send + Sync {
    fn show(&self, toast: Toast);
}

/// Bounded toast stack; the oldest toast is dropped when full.
#[derive(Debug)]
pub struct ToastQueue {
    limit: usize,
    toasts: Mutex<VecDeque<Toast>>,
}

impl ToastQueue {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            toasts: Mutex::new(VecDeque::new()),
        }
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, VecDeque<Toast>> {
        match self.toasts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Toasts currently on screen, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Toast> {
        self.guard().iter().cloned().collect()
    }

    /// Removes and returns every toast.
    pub fn drain(&self) -> Vec<Toast> {
        self.guard().drain(..).collect()
    }

    #[must_use]
    pub fn render_lines(&self, width: usize, max_rows: usize) -> Vec<String> {
        self.guard()
            .iter()
            .rev()
            .take(max_rows)
            .map(|toast| truncate(&format!("[{}] {}", toast.variant.label(), toast.title), width))
            .collect()
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(5)
    }
}

impl Notifier for ToastQueue {
    fn show(&self, toast: Toast) {
        match toast.variant {
            ToastVariant::Destructive => tracing::warn!(title = %toast.title, "toast"),
            ToastVariant::Default | ToastVariant::Success => {
                tracing::info!(title = %toast.title, "toast");
            }
        }
        let mut toasts = self.guard();
        while toasts.len() >= self.limit {
            toasts.pop_front();
        }
        toasts.push_back(toast);
    }
}
