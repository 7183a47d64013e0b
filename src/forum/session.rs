//! Session-scoped navigation state.
//!
//! Two independent cursors: who is logged in, and which topic/discussion is
//! open. Neither is persisted; a load resets both. Transitions that do not
//! hold are precondition errors, and the caller performs no mutation when
//! one fails.

use crate::error::{AgoraError, Result};
use crate::forum::user::Role;

/// Login and navigation cursors for the single interactive operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current_user: Option<(u32, Role)>,
    open_topic: Option<u32>,
    open_discussion: Option<u32>,
}

impl Session {
    /// Creates a logged-out session with nothing open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful login. Requires a logged-out session.
    pub fn login(&mut self, user_id: u32, role: Role) -> Result<()> {
        if self.current_user.is_some() {
            return Err(AgoraError::precondition("A user is already logged in"));
        }
        self.current_user = Some((user_id, role));
        Ok(())
    }

    /// Logs out and clears both navigation cursors.
    pub fn logout(&mut self) -> Result<u32> {
        let (user_id, _) = self
            .current_user
            .take()
            .ok_or_else(|| AgoraError::precondition("No user is logged in"))?;
        self.open_topic = None;
        self.open_discussion = None;
        Ok(user_id)
    }

    /// Opens a topic. Requires no topic to be open.
    pub fn open_topic(&mut self, topic_id: u32) -> Result<()> {
        if self.open_topic.is_some() {
            return Err(AgoraError::precondition("A topic is already opened"));
        }
        self.open_topic = Some(topic_id);
        Ok(())
    }

    /// Closes the open topic.
    ///
    /// An open discussion is closed along with it, the way the original
    /// command did; the cursors still unwind discussion-before-topic.
    pub fn close_topic(&mut self) -> Result<u32> {
        let topic_id = self
            .open_topic
            .take()
            .ok_or_else(|| AgoraError::precondition("No topic selected"))?;
        self.open_discussion = None;
        Ok(topic_id)
    }

    /// Opens a discussion. Requires an open topic and no open discussion.
    pub fn open_discussion(&mut self, discussion_id: u32) -> Result<()> {
        if self.open_topic.is_none() {
            return Err(AgoraError::precondition("No topic selected"));
        }
        if self.open_discussion.is_some() {
            return Err(AgoraError::precondition("A discussion is already opened"));
        }
        self.open_discussion = Some(discussion_id);
        Ok(())
    }

    /// Closes the open discussion, leaving the topic open.
    pub fn close_discussion(&mut self) -> Result<u32> {
        if self.open_topic.is_none() {
            return Err(AgoraError::precondition("No topic selected"));
        }
        self.open_discussion
            .take()
            .ok_or_else(|| AgoraError::precondition("No discussion selected"))
    }

    /// The logged-in user id and cached role, or a precondition error.
    pub fn user(&self) -> Result<(u32, Role)> {
        self.current_user
            .ok_or_else(|| AgoraError::precondition("No user is logged in"))
    }

    /// The open topic id, or a precondition error.
    pub fn topic(&self) -> Result<u32> {
        self.open_topic
            .ok_or_else(|| AgoraError::precondition("No topic selected"))
    }

    /// The open discussion id, or a precondition error.
    pub fn discussion(&self) -> Result<u32> {
        self.open_discussion
            .ok_or_else(|| AgoraError::precondition("No discussion selected"))
    }

    /// The logged-in user, if any.
    pub fn current_user(&self) -> Option<(u32, Role)> {
        self.current_user
    }

    /// The open topic, if any.
    pub fn current_topic(&self) -> Option<u32> {
        self.open_topic
    }

    /// The open discussion, if any.
    pub fn current_discussion(&self) -> Option<u32> {
        self.open_discussion
    }

    /// Refreshes the cached role after an edit to the logged-in account.
    pub fn update_role(&mut self, role: Role) {
        if let Some((user_id, _)) = self.current_user {
            self.current_user = Some((user_id, role));
        }
    }

    /// Clears the topic cursor (and the discussion cursor under it) if the
    /// given topic is the open one. Used when a topic is removed.
    pub fn forget_topic(&mut self, topic_id: u32) {
        if self.open_topic == Some(topic_id) {
            self.open_topic = None;
            self.open_discussion = None;
        }
    }

    /// Clears the discussion cursor if the given discussion is the open
    /// one. Used when a discussion is removed.
    pub fn forget_discussion(&mut self, discussion_id: u32) {
        if self.open_discussion == Some(discussion_id) {
            self.open_discussion = None;
        }
    }

    /// Resets everything to the logged-out state. Used after a load.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
