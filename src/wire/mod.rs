//! Binary save-file format.
//!
//! The whole forum serializes to one flat little-endian stream with no
//! container header and no version tag:
//!
//! 1. `user_count: u32`, `user_capacity: u32`
//! 2. per user: `role: i32` tag, then `first_name`, `last_name`,
//!    `nickname`, `password` (each `len: u32` + UTF-8 bytes), `id: u32`,
//!    `points: i32`, and the `role: i32` repeated as a trailer
//! 3. `topic_count: u32`, `topic_capacity: u32`
//! 4. per topic: `title`, `description`, `creator_id: u32`, `id: u32`,
//!    `discussion_count: u32`, `discussion_id_counter: u32`, then each
//!    discussion flat: `title`, `contents`, `creator_id`, `id`,
//!    `comment_count: u32`, `comment_id_counter: u32`, then each comment:
//!    `text`, `author_id: u32`, `id: u32`, `rating: i32`,
//!    `voter_count: u32`, `voter_ids: u32[voter_count]`,
//!    `reply_count: u32`, then `reply_count` comment records recursively.
//!
//! Nested blocks carry no length of their own beyond the explicit counts;
//! a reader must know the schema, and any schema change breaks every
//! existing file. The role tag picks which account variant to rebuild; the
//! record layout is the same for both. A crash mid-save can leave a torn
//! file behind — there is no atomic rename and no checksum.

use crate::error::{AgoraError, Result};
use crate::forum::comment::Comment;
use crate::forum::discussion::Discussion;
use crate::forum::records::Records;
use crate::forum::topic::Topic;
use crate::forum::user::{Account, Profile, Role};
use crate::validation::Validator;

/// A fully decoded save file, ready to replace in-memory state.
#[derive(Debug)]
pub struct Image {
    /// Loaded accounts, with the on-disk capacity preserved.
    pub users: Records<Account>,
    /// Loaded topics, with the on-disk capacity preserved.
    pub topics: Records<Topic>,
    /// One past the maximum user id in the file.
    pub next_user_id: u32,
    /// One past the maximum topic id in the file.
    pub next_topic_id: u32,
}

/// Serializes the whole forum to its byte representation.
pub fn encode(users: &Records<Account>, topics: &Records<Topic>) -> Vec<u8> {
    let mut w = Writer::new();

    w.put_u32(users.count());
    w.put_u32(users.capacity());
    for account in users {
        write_account(&mut w, account);
    }

    w.put_u32(topics.count());
    w.put_u32(topics.capacity());
    for topic in topics {
        write_topic(&mut w, topic);
    }

    w.into_bytes()
}

/// Parses a complete save file.
///
/// The entire input must be consumed; trailing bytes are treated as
/// corruption, the same as a truncated stream.
pub fn decode(data: &[u8]) -> Result<Image> {
    let mut r = Reader::new(data);

    let user_count = r.take_u32()?;
    Validator::check_user_count(user_count)?;
    // smallest user record: role tag + four empty strings + id/points/role
    Validator::check_count(user_count, 4 * 7, r.remaining())?;
    let user_capacity = r.take_u32()?;

    let mut accounts = Vec::with_capacity(user_count as usize);
    let mut next_user_id = 0u32;
    for _ in 0..user_count {
        let account = read_account(&mut r)?;
        next_user_id = next_user_id.max(account.id().saturating_add(1));
        accounts.push(account);
    }

    let topic_count = r.take_u32()?;
    Validator::check_topic_count(topic_count)?;
    // smallest topic record: two empty strings + four u32 fields
    Validator::check_count(topic_count, 4 * 6, r.remaining())?;
    let topic_capacity = r.take_u32()?;

    let mut topics = Vec::with_capacity(topic_count as usize);
    let mut next_topic_id = 0u32;
    for _ in 0..topic_count {
        let topic = read_topic(&mut r)?;
        next_topic_id = next_topic_id.max(topic.id().saturating_add(1));
        topics.push(topic);
    }

    if r.remaining() != 0 {
        return Err(AgoraError::wire(format!(
            "{} unread bytes after the last record",
            r.remaining()
        )));
    }

    Ok(Image {
        users: Records::from_parts(accounts, user_capacity),
        topics: Records::from_parts(topics, topic_capacity),
        next_user_id,
        next_topic_id,
    })
}

// ---- user records -------------------------------------------------------

fn write_account(w: &mut Writer, account: &Account) {
    let role = account.role();
    let profile = account.profile();

    w.put_i32(role.as_i32());
    w.put_str(profile.first_name());
    w.put_str(profile.last_name());
    w.put_str(profile.nickname());
    w.put_str(profile.password());
    w.put_u32(profile.id());
    w.put_i32(profile.points());
    w.put_i32(role.as_i32());
}

fn read_account(r: &mut Reader) -> Result<Account> {
    let tag = r.take_i32()?;
    let role = Role::from_i32(tag)
        .ok_or_else(|| AgoraError::wire(format!("Unknown role tag {}", tag)))?;

    let first_name = r.take_str()?;
    let last_name = r.take_str()?;
    let nickname = r.take_str()?;
    let password = r.take_str()?;
    let id = r.take_u32()?;
    let points = r.take_i32()?;

    let trailer = r.take_i32()?;
    if trailer != tag {
        return Err(AgoraError::wire(format!(
            "Role trailer {} does not match tag {}",
            trailer, tag
        )));
    }

    let profile = Profile::from_parts(first_name, last_name, nickname, password, id, points);
    Ok(Account::from_loaded(profile, role))
}

// ---- topic / discussion / comment records -------------------------------

fn write_topic(w: &mut Writer, topic: &Topic) {
    w.put_str(topic.title());
    w.put_str(topic.description());
    w.put_u32(topic.creator_id());
    w.put_u32(topic.id());
    w.put_u32(topic.discussion_count());
    w.put_u32(topic.next_discussion_id());
    for discussion in topic.discussions() {
        write_discussion(w, discussion);
    }
}

fn read_topic(r: &mut Reader) -> Result<Topic> {
    let title = r.take_str()?;
    let description = r.take_str()?;
    let creator_id = r.take_u32()?;
    let id = r.take_u32()?;
    let discussion_count = r.take_u32()?;
    let next_discussion_id = r.take_u32()?;
    Validator::check_count(discussion_count, 4 * 6, r.remaining())?;

    let mut discussions = Vec::with_capacity(discussion_count as usize);
    for _ in 0..discussion_count {
        discussions.push(read_discussion(r)?);
    }

    Ok(Topic::from_loaded(
        title,
        description,
        creator_id,
        id,
        discussions,
        next_discussion_id,
    ))
}

fn write_discussion(w: &mut Writer, discussion: &Discussion) {
    w.put_str(discussion.title());
    w.put_str(discussion.contents());
    w.put_u32(discussion.creator_id());
    w.put_u32(discussion.id());
    w.put_u32(discussion.comment_count());
    w.put_u32(discussion.next_comment_id());
    for comment in discussion.comments() {
        write_comment(w, comment);
    }
}

fn read_discussion(r: &mut Reader) -> Result<Discussion> {
    let title = r.take_str()?;
    let contents = r.take_str()?;
    let creator_id = r.take_u32()?;
    let id = r.take_u32()?;
    let comment_count = r.take_u32()?;
    let next_comment_id = r.take_u32()?;
    Validator::check_count(comment_count, 4 * 5, r.remaining())?;

    let mut comments = Vec::with_capacity(comment_count as usize);
    for _ in 0..comment_count {
        comments.push(read_comment(r, 0)?);
    }

    Ok(Discussion::from_loaded(
        title,
        contents,
        creator_id,
        id,
        comments,
        next_comment_id,
    ))
}

fn write_comment(w: &mut Writer, comment: &Comment) {
    w.put_str(comment.text());
    w.put_u32(comment.author_id());
    w.put_u32(comment.id());
    w.put_i32(comment.rating());
    w.put_u32(comment.voters().len() as u32);
    for voter in comment.voters() {
        w.put_u32(*voter);
    }
    w.put_u32(comment.reply_count());
    for reply in comment.replies() {
        write_comment(w, reply);
    }
}

fn read_comment(r: &mut Reader, depth: usize) -> Result<Comment> {
    Validator::check_reply_depth(depth)?;

    let text = r.take_str()?;
    let author_id = r.take_u32()?;
    let id = r.take_u32()?;
    let rating = r.take_i32()?;

    let voter_count = r.take_u32()?;
    Validator::check_count(voter_count, 4, r.remaining())?;
    let mut voters = Vec::with_capacity(voter_count as usize);
    for _ in 0..voter_count {
        voters.push(r.take_u32()?);
    }

    let reply_count = r.take_u32()?;
    Validator::check_count(reply_count, 4 * 5, r.remaining())?;
    let mut replies = Vec::with_capacity(reply_count as usize);
    for _ in 0..reply_count {
        replies.push(read_comment(r, depth + 1)?);
    }

    Ok(Comment::from_loaded(
        text, author_id, id, rating, voters, replies,
    ))
}

// ---- primitive encoding -------------------------------------------------

/// Append-only byte sink with the primitive encodings of the format.
struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn put_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Length-prefixed UTF-8 string: `len: u32` then the bytes.
    fn put_str(&mut self, value: &str) {
        self.put_u32(value.len() as u32);
        self.buf.extend_from_slice(value.as_bytes());
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Bounds-checked cursor over an untrusted byte slice.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(AgoraError::wire(format!(
                "Unexpected end of file: wanted {} bytes at offset {}, {} remain",
                len,
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn take_u32(&mut self) -> Result<u32> {
        let mut word = [0u8; 4];
        word.copy_from_slice(self.take_bytes(4)?);
        Ok(u32::from_le_bytes(word))
    }

    fn take_i32(&mut self) -> Result<i32> {
        let mut word = [0u8; 4];
        word.copy_from_slice(self.take_bytes(4)?);
        Ok(i32::from_le_bytes(word))
    }

    fn take_str(&mut self) -> Result<String> {
        let len = self.take_u32()?;
        Validator::check_string_len(len)?;
        let bytes = self.take_bytes(len as usize)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| AgoraError::wire("Invalid UTF-8 in string field"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forum::comment::VoteKind;

    fn sample_records() -> (Records<Account>, Records<Topic>) {
        let mut users = Records::new();
        users.append(Account::moderator(
            "Ada".to_string(),
            "Lovelace".to_string(),
            "ada".to_string(),
            "pw".to_string(),
            0,
        ));
        users.append(Account::regular(
            "Bob".to_string(),
            "Byte".to_string(),
            "bob".to_string(),
            "hunter2".to_string(),
            1,
        ));

        let mut topic = Topic::new("Sports".to_string(), "All sports".to_string(), 0, 0);
        let discussion_id = topic.add_discussion("Football".to_string(), "Match talk".to_string(), 0);
        {
            let discussion = topic.discussion_mut(discussion_id).unwrap();
            let comment_id = discussion.add_comment(0, "Great game".to_string());
            discussion.vote(1, comment_id, VoteKind::Up).unwrap();
            discussion
                .add_reply(1, comment_id, "Agreed".to_string())
                .unwrap();
        }
        let mut topics = Records::new();
        topics.append(topic);

        (users, topics)
    }

    #[test]
    fn test_round_trip_preserves_everything() {
        let (users, topics) = sample_records();
        let bytes = encode(&users, &topics);
        let image = decode(&bytes).unwrap();

        assert_eq!(image.users, users);
        assert_eq!(image.topics, topics);
        assert_eq!(image.next_user_id, 2);
        assert_eq!(image.next_topic_id, 1);

        // a second encode of the decoded image is byte-identical
        let again = encode(&image.users, &image.topics);
        assert_eq!(again, bytes);
    }

    #[test]
    fn test_header_layout() {
        let (users, topics) = sample_records();
        let bytes = encode(&users, &topics);

        // user_count = 2, user_capacity = 4 (doubled when the second
        // append filled the initial capacity)
        assert_eq!(&bytes[0..4], &2u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &4u32.to_le_bytes());
        // first record starts with the moderator role tag
        assert_eq!(&bytes[8..12], &1i32.to_le_bytes());
    }

    #[test]
    fn test_role_tag_written_head_and_tail() {
        let mut users = Records::new();
        users.append(Account::regular(
            "A".to_string(),
            "B".to_string(),
            "ab".to_string(),
            "pw".to_string(),
            0,
        ));
        let bytes = encode(&users, &Records::new());

        // record: tag(4) + 4 strings (4+1, 4+1, 4+2, 4+2) + id(4) + points(4) + trailer(4)
        let record = &bytes[8..];
        assert_eq!(&record[0..4], &0i32.to_le_bytes());
        let trailer_at = 4 + (4 + 1) + (4 + 1) + (4 + 2) + (4 + 2) + 4 + 4;
        assert_eq!(&record[trailer_at..trailer_at + 4], &0i32.to_le_bytes());
    }

    #[test]
    fn test_truncated_input_rejected() {
        let (users, topics) = sample_records();
        let bytes = encode(&users, &topics);

        for cut in [0, 3, 8, bytes.len() / 2, bytes.len() - 1] {
            assert!(decode(&bytes[..cut]).is_err(), "cut at {} accepted", cut);
        }
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let (users, topics) = sample_records();
        let mut bytes = encode(&users, &topics);
        bytes.push(0);
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn test_unknown_role_tag_rejected() {
        let mut users = Records::new();
        users.append(Account::regular(
            "A".to_string(),
            "B".to_string(),
            "ab".to_string(),
            "pw".to_string(),
            0,
        ));
        let mut bytes = encode(&users, &Records::new());
        // corrupt the leading role tag
        bytes[8..12].copy_from_slice(&7i32.to_le_bytes());
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn test_overclaimed_count_rejected() {
        // a header promising a million users in a dozen bytes
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1_000_000u32.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 8]);
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn test_foreign_capacity_round_trips() {
        // a file written with a capacity larger than the growth rule
        // would produce must come back out unchanged
        let (users, topics) = sample_records();
        let mut bytes = encode(&users, &topics);
        bytes[4..8].copy_from_slice(&64u32.to_le_bytes());

        let image = decode(&bytes).unwrap();
        assert_eq!(image.users.capacity(), 64);
        let again = encode(&image.users, &image.topics);
        assert_eq!(again[4..8], 64u32.to_le_bytes());
    }

    #[test]
    fn test_empty_forum_encodes_to_counts_only() {
        let bytes = encode(&Records::new(), &Records::new());
        // user_count, user_capacity, topic_count, topic_capacity
        assert_eq!(bytes.len(), 16);
        let image = decode(&bytes).unwrap();
        assert!(image.users.is_empty());
        assert!(image.topics.is_empty());
        assert_eq!(image.next_user_id, 0);
        assert_eq!(image.next_topic_id, 0);
    }

    #[test]
    fn test_nan_role_round_trips() {
        let mut users = Records::new();
        users.append(Account::from_loaded(
            Profile::from_parts(
                "X".to_string(),
                "Y".to_string(),
                "xy".to_string(),
                "pw".to_string(),
                0,
                0,
            ),
            Role::Nan,
        ));
        let bytes = encode(&users, &Records::new());
        assert_eq!(&bytes[8..12], &(-1i32).to_le_bytes());

        let image = decode(&bytes).unwrap();
        assert_eq!(image.users.get(0).unwrap().role(), Role::Nan);
    }

    #[test]
    fn test_deep_reply_nesting_rejected() {
        // hand-build a comment chain one level deeper than the reader allows
        fn nested(depth: usize) -> Comment {
            let mut comment = Comment::new("x".to_string(), 0, 0);
            if depth > 0 {
                comment.add_reply("x".to_string(), 0);
                *comment.reply_mut(0).unwrap() = nested(depth - 1);
            }
            comment
        }

        let mut topic = Topic::new("T".to_string(), "d".to_string(), 0, 0);
        topic.add_discussion("D".to_string(), "c".to_string(), 0);
        let discussion = topic.discussion_mut(0).unwrap();
        discussion.add_comment(0, "seed".to_string());
        *discussion.comment_mut(0).unwrap() = nested(crate::validation::MAX_REPLY_DEPTH + 1);

        let mut topics = Records::new();
        topics.append(topic);
        let bytes = encode(&Records::new(), &topics);
        assert!(decode(&bytes).is_err());
    }
}
