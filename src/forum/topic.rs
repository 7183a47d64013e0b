//! Topics: top-level forum categories containing discussions.

use crate::error::{AgoraError, Result};
use crate::forum::discussion::Discussion;
use crate::forum::records::Records;
use crate::forum::user::Role;
use std::fmt;

/// A top-level category owning an ordered list of discussions.
///
/// Topic ids are handed out by the aggregate root from a single
/// process-wide counter and are never reused, even after removal or across
/// save/load cycles. Discussion ids come from this topic's own counter.
#[derive(Clone, PartialEq, Eq)]
pub struct Topic {
    title: String,
    description: String,
    creator_id: u32,
    id: u32,
    discussions: Records<Discussion>,
    next_discussion_id: u32,
}

impl fmt::Debug for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topic")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("discussion_count", &self.discussions.count())
            .finish()
    }
}

impl Topic {
    /// Creates an empty topic. The id is assigned by the caller.
    pub fn new(title: String, description: String, creator_id: u32, id: u32) -> Self {
        Self {
            title,
            description,
            creator_id,
            id,
            discussions: Records::new(),
            next_discussion_id: 0,
        }
    }

    /// Rebuilds a topic from loaded fields, including the discussion-id
    /// counter stored in the file.
    pub fn from_loaded(
        title: String,
        description: String,
        creator_id: u32,
        id: u32,
        discussions: Vec<Discussion>,
        next_discussion_id: u32,
    ) -> Self {
        Self {
            title,
            description,
            creator_id,
            id,
            discussions: Records::from_items(discussions),
            next_discussion_id,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn creator_id(&self) -> u32 {
        self.creator_id
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn discussions(&self) -> &Records<Discussion> {
        &self.discussions
    }

    pub fn discussion_count(&self) -> u32 {
        self.discussions.count()
    }

    /// Value the discussion-id counter will hand out next.
    pub fn next_discussion_id(&self) -> u32 {
        self.next_discussion_id
    }

    /// Looks a discussion up by its stored id.
    pub fn discussion(&self, discussion_id: u32) -> Option<&Discussion> {
        self.discussions.find(|d| d.id() == discussion_id)
    }

    /// Looks a discussion up by its stored id, mutably.
    pub fn discussion_mut(&mut self, discussion_id: u32) -> Result<&mut Discussion> {
        self.discussions
            .find_mut(|d| d.id() == discussion_id)
            .ok_or_else(|| AgoraError::not_found(format!("Discussion with id {}", discussion_id)))
    }

    /// Appends a discussion and returns its id.
    pub fn add_discussion(&mut self, title: String, contents: String, creator_id: u32) -> u32 {
        let id = self.next_discussion_id;
        self.next_discussion_id += 1;
        self.discussions
            .append(Discussion::new(title, contents, creator_id, id));
        id
    }

    /// Removes the discussion with the given stored id. Moderator only.
    pub fn remove_discussion(&mut self, discussion_id: u32, acting_role: Role) -> Result<()> {
        if acting_role != Role::Mod {
            return Err(AgoraError::permission(
                "Only a moderator may remove a discussion",
            ));
        }
        self.discussions
            .remove_where(|d| d.id() == discussion_id)
            .ok_or_else(|| AgoraError::not_found(format!("Discussion with id {}", discussion_id)))?;
        Ok(())
    }
}
