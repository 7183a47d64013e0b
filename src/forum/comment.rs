//! Comments and threaded replies.
//!
//! A reply is the same record type as a top-level comment, nested one level
//! under its parent. Each comment owns its reply list and a local reply-id
//! counter, so reply ids start at 0 under every parent independently of
//! sibling comment ids. No nesting depth limit is imposed on the model.

use crate::error::{AgoraError, Result};
use crate::forum::records::Records;
use std::fmt;

/// Direction of a vote on a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteKind {
    /// Raises the rating by one.
    Up,
    /// Lowers the rating by one.
    Down,
}

/// A user-authored message with a rating, a voter list, and nested replies.
#[derive(Clone, PartialEq, Eq)]
pub struct Comment {
    text: String,
    author_id: u32,
    id: u32,
    rating: i32,
    voters: Records<u32>,
    replies: Records<Comment>,
    next_reply_id: u32,
}

impl fmt::Debug for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comment")
            .field("id", &self.id)
            .field("author_id", &self.author_id)
            .field("rating", &self.rating)
            .field("voter_count", &self.voters.count())
            .field("reply_count", &self.replies.count())
            .finish()
    }
}

impl Comment {
    /// Creates a comment with rating 0, no voters, and no replies.
    pub fn new(text: String, author_id: u32, id: u32) -> Self {
        Self {
            text,
            author_id,
            id,
            rating: 0,
            voters: Records::new(),
            replies: Records::new(),
            next_reply_id: 0,
        }
    }

    /// Rebuilds a comment from loaded fields.
    ///
    /// The reply-id counter is not stored in the file; it resumes at the
    /// reply count, which is exact as long as replies are never removed
    /// (there is no reply-removal operation).
    pub fn from_loaded(
        text: String,
        author_id: u32,
        id: u32,
        rating: i32,
        voters: Vec<u32>,
        replies: Vec<Comment>,
    ) -> Self {
        let next_reply_id = replies.len() as u32;
        Self {
            text,
            author_id,
            id,
            rating,
            voters: Records::from_items(voters),
            replies: Records::from_items(replies),
            next_reply_id,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn author_id(&self) -> u32 {
        self.author_id
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn rating(&self) -> i32 {
        self.rating
    }

    /// Voter ids in ascending order.
    pub fn voters(&self) -> &[u32] {
        self.voters.as_slice()
    }

    /// Direct replies in creation order.
    pub fn replies(&self) -> &Records<Comment> {
        &self.replies
    }

    pub fn reply_count(&self) -> u32 {
        self.replies.count()
    }

    /// Looks a direct reply up by its local id, mutably.
    pub fn reply_mut(&mut self, reply_id: u32) -> Option<&mut Comment> {
        self.replies.find_mut(|r| r.id() == reply_id)
    }

    /// Appends a reply and returns its id.
    ///
    /// Reply ids are local to this comment: the first reply gets 0, the
    /// next 1, and so on, regardless of the parent's own id.
    pub fn add_reply(&mut self, text: String, author_id: u32) -> u32 {
        let id = self.next_reply_id;
        self.next_reply_id += 1;
        self.replies.append(Comment::new(text, author_id, id));
        id
    }

    /// Returns true if `user_id` has already voted on this comment.
    pub fn has_voted(&self, user_id: u32) -> bool {
        self.voters.as_slice().binary_search(&user_id).is_ok()
    }

    /// Records a vote by `user_id`.
    ///
    /// A second vote by the same user is rejected with
    /// [`AgoraError::DuplicateVote`] and mutates nothing. The voter list
    /// stays sorted ascending by numeric id.
    pub fn vote(&mut self, user_id: u32, kind: VoteKind) -> Result<()> {
        let slot = match self.voters.as_slice().binary_search(&user_id) {
            Ok(_) => return Err(AgoraError::DuplicateVote(user_id)),
            Err(slot) => slot,
        };
        self.voters.insert(slot, user_id);
        self.rating += match kind {
            VoteKind::Up => 1,
            VoteKind::Down => -1,
        };
        Ok(())
    }

    /// Lazy depth-first walk over this comment and all of its replies.
    ///
    /// Yields `(comment, depth)` pairs, the comment itself first at depth 0.
    pub fn walk(&self) -> CommentWalk<'_> {
        CommentWalk {
            stack: vec![(self, 0)],
        }
    }
}

/// Depth-first iterator over a comment tree. See [`Comment::walk`].
pub struct CommentWalk<'a> {
    stack: Vec<(&'a Comment, usize)>,
}

impl<'a> Iterator for CommentWalk<'a> {
    type Item = (&'a Comment, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (comment, depth) = self.stack.pop()?;
        // push replies in reverse so the first reply is visited next
        for reply in comment.replies.iter().rev() {
            self.stack.push((reply, depth + 1));
        }
        Some((comment, depth))
    }
}
