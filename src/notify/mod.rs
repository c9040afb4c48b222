use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: Level,
    pub message: String,
}

// Single slot; ids keep an old dismissal timer from clearing a newer message
#[derive(Debug, Clone)]
pub struct Notifier {
    current: Option<Notification>,
    next_id: u64,
    ttl: Duration,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            current: None,
            next_id: 1,
            ttl,
        }
    }

    // Returns the id of the shown message, to be dismissed after `ttl()`
    pub fn show(&mut self, level: Level, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.current = Some(Notification {
            id,
            level,
            message: message.into(),
        });
        id
    }

    // True when the message was still showing and has been removed
    pub fn dismiss(&mut self, id: u64) -> bool {
        match &self.current {
            Some(n) if n.id == id => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_replaces_current() {
        let mut notifier = Notifier::new(Duration::from_secs(3));
        let first = notifier.show(Level::Success, "saved");
        let second = notifier.show(Level::Error, "failed");

        let current = notifier.current().unwrap();
        assert_eq!(current.id, second);
        assert_eq!(current.message, "failed");

        // the first message's timer must not clear the second one
        assert!(!notifier.dismiss(first));
        assert!(notifier.current().is_some());
        assert!(notifier.dismiss(second));
        assert!(notifier.current().is_none());
    }
}
