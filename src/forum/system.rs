//! The aggregate root: owns every user and topic, the id counters, the
//! session cursors, and the save-file association.
//!
//! Every operation checks its session preconditions before touching the
//! graph, so a rejected call leaves no partial mutation behind. The front
//! end maps each command onto exactly one call here and does all prompting
//! and printing itself.

use crate::error::{AgoraError, Result};
use crate::forum::comment::{Comment, VoteKind};
use crate::forum::discussion::Discussion;
use crate::forum::records::Records;
use crate::forum::session::Session;
use crate::forum::topic::Topic;
use crate::forum::user::{Account, Role};
use crate::validation::Validator;
use crate::wire;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The whole forum: users, topics, counters, and session state.
#[derive(Debug, Default)]
pub struct System {
    users: Records<Account>,
    topics: Records<Topic>,
    next_user_id: u32,
    next_topic_id: u32,
    session: Session,
    current_file: Option<PathBuf>,
}

impl System {
    /// Creates an empty forum with no file association.
    pub fn new() -> Self {
        Self::default()
    }

    // ---- accounts -------------------------------------------------------

    /// Registers a new account and returns its id.
    ///
    /// The very first account ever created becomes a moderator (the
    /// bootstrap administrator); everyone after that starts as a regular
    /// user. A nickname held by a live user is rejected.
    pub fn signup(
        &mut self,
        first_name: String,
        last_name: String,
        nickname: String,
        password: String,
    ) -> Result<u32> {
        Validator::check_nickname(&nickname)?;
        if self.find_by_nickname(&nickname).is_some() {
            return Err(AgoraError::validation(format!(
                "A user with nickname \"{}\" already exists",
                nickname
            )));
        }

        let id = self.next_user_id;
        self.next_user_id += 1;

        let account = if self.users.is_empty() {
            Account::moderator(first_name, last_name, nickname, password, id)
        } else {
            Account::regular(first_name, last_name, nickname, password, id)
        };
        info!(id, role = %account.role(), "new account registered");
        self.users.append(account);
        Ok(id)
    }

    /// Logs a user in by nickname and password. Requires a logged-out
    /// session; the role is cached on the session for permission checks.
    pub fn login(&mut self, nickname: &str, password: &str) -> Result<u32> {
        if self.session.current_user().is_some() {
            return Err(AgoraError::precondition("A user is already logged in"));
        }

        let account = self
            .find_by_nickname(nickname)
            .ok_or_else(|| AgoraError::not_found(format!("User with nickname \"{}\"", nickname)))?;

        // plaintext comparison, by design of the source format
        if account.profile().password() != password {
            return Err(AgoraError::validation("Incorrect password"));
        }

        let (id, role) = (account.id(), account.role());
        self.session.login(id, role)?;
        debug!(id, "login");
        Ok(id)
    }

    /// Logs the current user out, clearing both navigation cursors.
    pub fn logout(&mut self) -> Result<u32> {
        let id = self.session.logout()?;
        debug!(id, "logout");
        Ok(id)
    }

    /// The account with the given id, if it exists.
    pub fn user(&self, user_id: u32) -> Option<&Account> {
        self.users.find(|u| u.id() == user_id)
    }

    /// All accounts in creation order.
    pub fn users(&self) -> &Records<Account> {
        &self.users
    }

    fn find_by_nickname(&self, nickname: &str) -> Option<&Account> {
        self.users.find(|u| u.nickname() == nickname)
    }

    /// True if a live user already holds `nickname`. The front end uses
    /// this to re-prompt during signup before submitting.
    pub fn nickname_taken(&self, nickname: &str) -> bool {
        self.find_by_nickname(nickname).is_some()
    }

    /// Sets the logged-in user's first name.
    pub fn set_first_name(&mut self, first_name: String) -> Result<()> {
        let (id, _) = self.session.user()?;
        self.account_mut(id)?.profile_mut().set_first_name(first_name);
        Ok(())
    }

    /// Sets the logged-in user's last name.
    pub fn set_last_name(&mut self, last_name: String) -> Result<()> {
        let (id, _) = self.session.user()?;
        self.account_mut(id)?.profile_mut().set_last_name(last_name);
        Ok(())
    }

    /// Sets the logged-in user's password.
    pub fn set_password(&mut self, password: String) -> Result<()> {
        let (id, _) = self.session.user()?;
        self.account_mut(id)?.profile_mut().set_password(password);
        Ok(())
    }

    /// Changes another user's role. Moderator only.
    pub fn set_role(&mut self, target_user_id: u32, role: Role) -> Result<()> {
        let (actor_id, actor_role) = self.session.user()?;
        if actor_role != Role::Mod {
            return Err(AgoraError::permission("Only a moderator may change roles"));
        }
        self.account_mut(target_user_id)?.set_role(role);
        if actor_id == target_user_id {
            self.session.update_role(role);
        }
        info!(target_user_id, role = %role, "role changed");
        Ok(())
    }

    fn account_mut(&mut self, user_id: u32) -> Result<&mut Account> {
        self.users
            .find_mut(|u| u.id() == user_id)
            .ok_or_else(|| AgoraError::not_found(format!("User with id {}", user_id)))
    }

    // ---- topics ---------------------------------------------------------

    /// Creates a topic and returns its id. Requires a logged-in user.
    ///
    /// Topic ids come from a single process-wide counter and are never
    /// reused, even after removal or a reload.
    pub fn create_topic(&mut self, title: String, description: String) -> Result<u32> {
        let (creator_id, _) = self.session.user()?;
        let id = self.next_topic_id;
        self.next_topic_id += 1;
        self.topics
            .append(Topic::new(title, description, creator_id, id));
        info!(id, "topic created");
        Ok(id)
    }

    /// All topics whose title contains `fragment`, as (id, title) pairs.
    pub fn search_topics(&self, fragment: &str) -> Vec<(u32, &str)> {
        self.topics
            .iter()
            .filter(|t| t.title().contains(fragment))
            .map(|t| (t.id(), t.title()))
            .collect()
    }

    /// The topic with the given id, if it exists.
    pub fn topic(&self, topic_id: u32) -> Option<&Topic> {
        self.topics.find(|t| t.id() == topic_id)
    }

    /// All topics in creation order.
    pub fn topics(&self) -> &Records<Topic> {
        &self.topics
    }

    /// Opens the topic with the given id.
    pub fn open_topic_by_id(&mut self, topic_id: u32) -> Result<()> {
        if self.topic(topic_id).is_none() {
            return Err(AgoraError::not_found(format!("Topic with id {}", topic_id)));
        }
        self.session.open_topic(topic_id)
    }

    /// Opens the topic with the given exact title.
    pub fn open_topic_by_title(&mut self, title: &str) -> Result<u32> {
        let topic_id = self
            .topics
            .find(|t| t.title() == title)
            .map(Topic::id)
            .ok_or_else(|| AgoraError::not_found(format!("Topic titled \"{}\"", title)))?;
        self.session.open_topic(topic_id)?;
        Ok(topic_id)
    }

    /// Closes the open topic (closing any open discussion with it) and
    /// returns its id.
    pub fn close_topic(&mut self) -> Result<u32> {
        self.session.close_topic()
    }

    /// Removes a topic. Moderator only; user points are recomputed since
    /// every comment under the topic disappears with it.
    pub fn remove_topic(&mut self, topic_id: u32) -> Result<()> {
        let (_, role) = self.session.user()?;
        if role != Role::Mod {
            return Err(AgoraError::permission("Only a moderator may remove a topic"));
        }
        self.topics
            .remove_where(|t| t.id() == topic_id)
            .ok_or_else(|| AgoraError::not_found(format!("Topic with id {}", topic_id)))?;
        self.session.forget_topic(topic_id);
        info!(topic_id, "topic removed");
        self.recompute_points();
        Ok(())
    }

    /// The currently open topic.
    pub fn open_topic(&self) -> Result<&Topic> {
        let topic_id = self.session.topic()?;
        self.topic(topic_id)
            .ok_or_else(|| AgoraError::not_found(format!("Topic with id {}", topic_id)))
    }

    fn open_topic_mut(&mut self) -> Result<&mut Topic> {
        let topic_id = self.session.topic()?;
        self.topics
            .find_mut(|t| t.id() == topic_id)
            .ok_or_else(|| AgoraError::not_found(format!("Topic with id {}", topic_id)))
    }

    // ---- discussions ----------------------------------------------------

    /// Posts a discussion in the open topic and returns its id.
    pub fn post_discussion(&mut self, title: String, contents: String) -> Result<u32> {
        let (creator_id, _) = self.session.user()?;
        let topic = self.open_topic_mut()?;
        Ok(topic.add_discussion(title, contents, creator_id))
    }

    /// Opens a discussion in the open topic.
    pub fn open_discussion(&mut self, discussion_id: u32) -> Result<()> {
        let topic = self.open_topic()?;
        if topic.discussion(discussion_id).is_none() {
            return Err(AgoraError::not_found(format!(
                "Discussion with id {}",
                discussion_id
            )));
        }
        self.session.open_discussion(discussion_id)
    }

    /// Closes the open discussion, leaving the topic open.
    pub fn close_discussion(&mut self) -> Result<u32> {
        self.session.close_discussion()
    }

    /// Removes a discussion from the open topic. Moderator only; points
    /// are recomputed afterwards.
    pub fn remove_discussion(&mut self, discussion_id: u32) -> Result<()> {
        let (_, role) = self.session.user()?;
        self.open_topic_mut()?.remove_discussion(discussion_id, role)?;
        self.session.forget_discussion(discussion_id);
        info!(discussion_id, "discussion removed");
        self.recompute_points();
        Ok(())
    }

    /// The currently open discussion.
    pub fn current_discussion(&self) -> Result<&Discussion> {
        let discussion_id = self.session.discussion()?;
        self.open_topic()?
            .discussion(discussion_id)
            .ok_or_else(|| {
                AgoraError::not_found(format!("Discussion with id {}", discussion_id))
            })
    }

    fn current_discussion_mut(&mut self) -> Result<&mut Discussion> {
        let discussion_id = self.session.discussion()?;
        let topic = self.open_topic_mut()?;
        topic.discussion_mut(discussion_id)
    }

    /// The discussions of the open topic, in creation order.
    pub fn list_discussions(&self) -> Result<&Records<Discussion>> {
        Ok(self.open_topic()?.discussions())
    }

    // ---- comments -------------------------------------------------------

    /// Adds a comment to the open discussion and returns its id.
    pub fn add_comment(&mut self, text: String) -> Result<u32> {
        let (author_id, _) = self.session.user()?;
        let discussion = self.current_discussion_mut()?;
        Ok(discussion.add_comment(author_id, text))
    }

    /// Adds a reply under a comment in the open discussion.
    pub fn add_reply(&mut self, comment_id: u32, text: String) -> Result<u32> {
        let (author_id, _) = self.session.user()?;
        self.current_discussion_mut()?
            .add_reply(author_id, comment_id, text)
    }

    /// Votes on a comment in the open discussion. A repeated vote by the
    /// same user is rejected without mutation.
    pub fn vote_comment(&mut self, comment_id: u32, kind: VoteKind) -> Result<()> {
        let (voter_id, _) = self.session.user()?;
        self.current_discussion_mut()?
            .vote(voter_id, comment_id, kind)
    }

    /// Removes a comment from the open discussion. Permitted for the
    /// comment's author or a moderator.
    pub fn remove_comment(&mut self, comment_id: u32) -> Result<()> {
        let (user_id, role) = self.session.user()?;
        self.current_discussion_mut()?
            .remove_comment(user_id, comment_id, role)
    }

    /// Depth-first view of every comment and reply in the open
    /// discussion, with its nesting depth.
    pub fn list_comments(&self) -> Result<impl Iterator<Item = (&Comment, usize)>> {
        Ok(self.current_discussion()?.walk())
    }

    // ---- points ---------------------------------------------------------

    /// Zeroes every user's points and re-derives them from the rating of
    /// every comment at every nesting level across the whole forum.
    ///
    /// A full from-scratch pass every time; calling it twice in a row
    /// yields identical tallies.
    pub fn recompute_points(&mut self) {
        let mut tally: HashMap<u32, i32> = HashMap::new();
        for topic in self.topics.iter() {
            for discussion in topic.discussions().iter() {
                for (comment, _) in discussion.walk() {
                    *tally.entry(comment.author_id()).or_insert(0) += comment.rating();
                }
            }
        }
        for account in self.users.iter_mut() {
            let profile = account.profile_mut();
            profile.reset_points();
            if let Some(points) = tally.get(&profile.id()) {
                profile.change_points(*points);
            }
        }
    }

    // ---- persistence ----------------------------------------------------

    /// The path of the associated save file, if one has been set.
    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    /// Saves to the associated file.
    ///
    /// With no association yet, this is a precondition error; the front
    /// end answers it by asking for a file name and calling
    /// [`System::save_as`].
    pub fn save(&self) -> Result<()> {
        let path = self
            .current_file
            .clone()
            .ok_or_else(|| AgoraError::precondition("No save file is associated yet"))?;
        self.write_to(&path)
    }

    /// Saves to `path` and records it as the associated file.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        self.write_to(path)?;
        self.current_file = Some(path.to_path_buf());
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        let bytes = wire::encode(&self.users, &self.topics);
        fs::write(path, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "forum saved");
        Ok(())
    }

    /// Loads the forum from `path`, replacing all in-memory state.
    ///
    /// The whole file is parsed before anything is replaced, so a missing
    /// or malformed file leaves the existing state untouched. On success
    /// the session is reset, the id counters resume one past the maximum
    /// ids seen in the file, and `path` becomes the associated file.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let bytes = fs::read(path)?;
        let image = wire::decode(&bytes)?;

        info!(
            path = %path.display(),
            users = image.users.count(),
            topics = image.topics.count(),
            "forum loaded"
        );

        self.users = image.users;
        self.topics = image.topics;
        self.next_user_id = image.next_user_id;
        self.next_topic_id = image.next_topic_id;
        self.session.reset();
        self.current_file = Some(path.to_path_buf());
        Ok(())
    }

    /// The session cursors (read-only view for the front end).
    pub fn session(&self) -> &Session {
        &self.session
    }
}
