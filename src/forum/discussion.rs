//! Discussions: single threads within a topic.

use crate::error::{AgoraError, Result};
use crate::forum::comment::{Comment, VoteKind};
use crate::forum::records::Records;
use crate::forum::user::Role;
use std::fmt;

/// A thread of comments under a topic.
///
/// Comment ids come from a per-discussion counter: dense at creation,
/// never renumbered when a comment is removed.
#[derive(Clone, PartialEq, Eq)]
pub struct Discussion {
    title: String,
    contents: String,
    creator_id: u32,
    id: u32,
    comments: Records<Comment>,
    next_comment_id: u32,
}

impl fmt::Debug for Discussion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discussion")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("comment_count", &self.comments.count())
            .finish()
    }
}

impl Discussion {
    /// Creates an empty discussion.
    pub fn new(title: String, contents: String, creator_id: u32, id: u32) -> Self {
        Self {
            title,
            contents,
            creator_id,
            id,
            comments: Records::new(),
            next_comment_id: 0,
        }
    }

    /// Rebuilds a discussion from loaded fields, including the comment-id
    /// counter stored in the file.
    pub fn from_loaded(
        title: String,
        contents: String,
        creator_id: u32,
        id: u32,
        comments: Vec<Comment>,
        next_comment_id: u32,
    ) -> Self {
        Self {
            title,
            contents,
            creator_id,
            id,
            comments: Records::from_items(comments),
            next_comment_id,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn creator_id(&self) -> u32 {
        self.creator_id
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn comments(&self) -> &Records<Comment> {
        &self.comments
    }

    pub fn comment_count(&self) -> u32 {
        self.comments.count()
    }

    /// Value the comment-id counter will hand out next.
    pub fn next_comment_id(&self) -> u32 {
        self.next_comment_id
    }

    /// Looks a comment up by its stored id.
    pub fn comment(&self, comment_id: u32) -> Option<&Comment> {
        self.comments.find(|c| c.id() == comment_id)
    }

    /// Looks a comment up by its stored id, mutably.
    pub fn comment_mut(&mut self, comment_id: u32) -> Result<&mut Comment> {
        self.comments
            .find_mut(|c| c.id() == comment_id)
            .ok_or_else(|| AgoraError::not_found(format!("Comment with id {}", comment_id)))
    }

    /// Appends a comment and returns its id.
    pub fn add_comment(&mut self, author_id: u32, text: String) -> u32 {
        let id = self.next_comment_id;
        self.next_comment_id += 1;
        self.comments.append(Comment::new(text, author_id, id));
        id
    }

    /// Adds a reply under the comment with the given stored id.
    ///
    /// Lookup is by stored id, not by array position, so it stays correct
    /// after earlier comments have been removed.
    pub fn add_reply(&mut self, author_id: u32, comment_id: u32, text: String) -> Result<u32> {
        Ok(self.comment_mut(comment_id)?.add_reply(text, author_id))
    }

    /// Casts a vote on the comment with the given stored id.
    pub fn vote(&mut self, voter_id: u32, comment_id: u32, kind: VoteKind) -> Result<()> {
        self.comment_mut(comment_id)?.vote(voter_id, kind)
    }

    /// Removes the comment with the given stored id.
    ///
    /// Permitted only for the comment's author or a moderator. The
    /// permission check runs before any mutation, so a denial leaves the
    /// discussion untouched.
    pub fn remove_comment(
        &mut self,
        acting_user_id: u32,
        comment_id: u32,
        acting_role: Role,
    ) -> Result<()> {
        let comment = self
            .comment(comment_id)
            .ok_or_else(|| AgoraError::not_found(format!("Comment with id {}", comment_id)))?;

        if comment.author_id() != acting_user_id && acting_role != Role::Mod {
            return Err(AgoraError::permission(
                "Only the author or a moderator may remove a comment",
            ));
        }

        self.comments.remove_where(|c| c.id() == comment_id);
        Ok(())
    }

    /// Lazy depth-first walk over every comment and reply, for display.
    pub fn walk(&self) -> impl Iterator<Item = (&Comment, usize)> {
        self.comments.iter().flat_map(Comment::walk)
    }
}
