//! Integration tests for the agora forum.
//!
//! These tests verify complete workflows across the core: signup and
//! login, topic/discussion/comment navigation, voting, point
//! recomputation, and the binary save/load round trip.

use agora::forum::{Role, System, VoteKind};
use agora::AgoraError;
use tempfile::TempDir;

/// Helper: a forum with the bootstrap moderator "ada" and a regular
/// user "bob" already signed up, nobody logged in.
fn forum_with_two_users() -> System {
    let mut system = System::new();
    system
        .signup(
            "Ada".to_string(),
            "Lovelace".to_string(),
            "ada".to_string(),
            "pw".to_string(),
        )
        .expect("Failed to sign ada up");
    system
        .signup(
            "Bob".to_string(),
            "Byte".to_string(),
            "bob".to_string(),
            "pw".to_string(),
        )
        .expect("Failed to sign bob up");
    system
}

// =============================================================================
// End-to-end scenario
// =============================================================================

/// The full interactive scenario: A signs up (becomes moderator, id 0),
/// creates and opens topic "Sports", posts discussion "Football",
/// comments on it; B signs up (id 1, regular), upvotes the comment once,
/// is rejected on the second attempt; recomputation gives A one point.
#[test]
fn test_forum_scenario_end_to_end() {
    let mut system = System::new();

    // Step 1: A signs up and is granted the bootstrap moderator role
    let a = system
        .signup(
            "Alice".to_string(),
            "Adams".to_string(),
            "alice".to_string(),
            "secret".to_string(),
        )
        .expect("Failed to sign up");
    assert_eq!(a, 0);
    assert_eq!(system.user(a).unwrap().role(), Role::Mod);

    // Step 2: A creates topic "Sports" and navigates into it
    system.login("alice", "secret").expect("Failed to log in");
    let topic_id = system
        .create_topic("Sports".to_string(), "All sports".to_string())
        .expect("Failed to create topic");
    assert_eq!(topic_id, 0);
    system.open_topic_by_id(topic_id).unwrap();

    // Step 3: A posts discussion "Football" and comments on it
    let discussion_id = system
        .post_discussion("Football".to_string(), "Match talk".to_string())
        .expect("Failed to post discussion");
    assert_eq!(discussion_id, 0);
    system.open_discussion(discussion_id).unwrap();
    let comment_id = system
        .add_comment("Great game".to_string())
        .expect("Failed to add comment");
    assert_eq!(comment_id, 0);
    system.logout().unwrap();

    // Step 4: B signs up as a regular user and upvotes the comment
    let b = system
        .signup(
            "Bob".to_string(),
            "Brown".to_string(),
            "bob".to_string(),
            "hunter2".to_string(),
        )
        .expect("Failed to sign up");
    assert_eq!(b, 1);
    assert_eq!(system.user(b).unwrap().role(), Role::User);

    system.login("bob", "hunter2").unwrap();
    system.open_topic_by_id(topic_id).unwrap();
    system.open_discussion(discussion_id).unwrap();
    system.vote_comment(comment_id, VoteKind::Up).unwrap();
    assert_eq!(
        system.current_discussion().unwrap().comment(0).unwrap().rating(),
        1
    );

    // Step 5: B's second vote is rejected and changes nothing
    let err = system.vote_comment(comment_id, VoteKind::Up).unwrap_err();
    assert!(matches!(err, AgoraError::DuplicateVote(1)));
    assert_eq!(
        system.current_discussion().unwrap().comment(0).unwrap().rating(),
        1
    );

    // Step 6: recomputation credits A with the comment's rating
    system.recompute_points();
    assert_eq!(system.user(a).unwrap().profile().points(), 1);
    assert_eq!(system.user(b).unwrap().profile().points(), 0);

    // recomputation is a pure function of the tree: a second pass is a no-op
    system.recompute_points();
    assert_eq!(system.user(a).unwrap().profile().points(), 1);
    assert_eq!(system.user(b).unwrap().profile().points(), 0);
}

// =============================================================================
// Persistence round trips
// =============================================================================

/// Save followed by load reproduces the user list, the whole
/// topic/discussion/comment tree, and both id counters, so entities
/// created after the reload continue the same id sequence.
#[test]
fn test_save_load_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("forum.sav");

    let mut system = forum_with_two_users();
    system.login("ada", "pw").unwrap();
    let topic_id = system
        .create_topic("Sports".to_string(), "All sports".to_string())
        .unwrap();
    system.open_topic_by_id(topic_id).unwrap();
    let discussion_id = system
        .post_discussion("Football".to_string(), "Match talk".to_string())
        .unwrap();
    system.open_discussion(discussion_id).unwrap();
    let comment_id = system.add_comment("Great game".to_string()).unwrap();
    system.add_reply(comment_id, "Agreed!".to_string()).unwrap();
    system.logout().unwrap();

    system.login("bob", "pw").unwrap();
    system.open_topic_by_id(topic_id).unwrap();
    system.open_discussion(discussion_id).unwrap();
    system.vote_comment(comment_id, VoteKind::Up).unwrap();
    system.recompute_points();

    system.save_as(&path).expect("Failed to save");

    // Load into a fresh system and compare the observable state
    let mut reloaded = System::new();
    reloaded.load(&path).expect("Failed to load");

    assert_eq!(reloaded.users().count(), 2);
    assert_eq!(reloaded.user(0).unwrap().role(), Role::Mod);
    assert_eq!(reloaded.user(0).unwrap().nickname(), "ada");
    assert_eq!(reloaded.user(0).unwrap().profile().points(), 1);
    assert_eq!(reloaded.user(1).unwrap().role(), Role::User);

    let topic = reloaded.topic(topic_id).expect("Topic lost in round trip");
    assert_eq!(topic.title(), "Sports");
    let discussion = topic.discussion(discussion_id).unwrap();
    assert_eq!(discussion.title(), "Football");
    let comment = discussion.comment(comment_id).unwrap();
    assert_eq!(comment.text(), "Great game");
    assert_eq!(comment.rating(), 1);
    assert_eq!(comment.voters(), &[1]);
    assert_eq!(comment.reply_count(), 1);
    assert_eq!(comment.replies().get(0).unwrap().text(), "Agreed!");

    // The session does not survive the reload
    assert_eq!(reloaded.session().current_user(), None);
    assert_eq!(reloaded.session().current_topic(), None);

    // Counters resume where they left off: new entities continue the
    // same id sequence as if no reload had occurred
    reloaded.login("ada", "pw").unwrap();
    let next_topic = reloaded
        .create_topic("Music".to_string(), String::new())
        .unwrap();
    assert_eq!(next_topic, topic_id + 1);
    let next_user = reloaded
        .signup(
            "Carol".to_string(),
            "Clef".to_string(),
            "carol".to_string(),
            "pw".to_string(),
        )
        .unwrap();
    assert_eq!(next_user, 2);
}

/// A save file written once must re-encode byte-for-byte after a load,
/// including the stored capacity fields.
#[test]
fn test_second_save_is_byte_identical() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let first_path = temp_dir.path().join("first.sav");
    let second_path = temp_dir.path().join("second.sav");

    let mut system = forum_with_two_users();
    system.login("ada", "pw").unwrap();
    for title in ["One", "Two", "Three"] {
        system.create_topic(title.to_string(), String::new()).unwrap();
    }
    system.save_as(&first_path).unwrap();

    let mut reloaded = System::new();
    reloaded.load(&first_path).unwrap();
    reloaded.save_as(&second_path).unwrap();

    let first = std::fs::read(&first_path).unwrap();
    let second = std::fs::read(&second_path).unwrap();
    assert_eq!(first, second);
}

/// Loading a missing or corrupt file leaves the in-memory state alone.
#[test]
fn test_failed_load_preserves_state() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    let mut system = forum_with_two_users();
    system.login("ada", "pw").unwrap();
    system
        .create_topic("Sports".to_string(), String::new())
        .unwrap();

    // Missing file
    let missing = temp_dir.path().join("nothing.sav");
    assert!(matches!(
        system.load(&missing).unwrap_err(),
        AgoraError::Io(_)
    ));

    // Truncated file
    let truncated = temp_dir.path().join("truncated.sav");
    std::fs::write(&truncated, [0u8; 5]).unwrap();
    assert!(matches!(
        system.load(&truncated).unwrap_err(),
        AgoraError::Wire(_)
    ));

    // Nothing was replaced, the session is still live
    assert_eq!(system.users().count(), 2);
    assert_eq!(system.topics().count(), 1);
    assert!(system.session().current_user().is_some());

    // And the failed loads did not steal the file association
    assert!(matches!(
        system.save().unwrap_err(),
        AgoraError::Precondition(_)
    ));
}

/// `save` works through the association established by `save_as` or a
/// successful `load`.
#[test]
fn test_save_uses_associated_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("forum.sav");

    let mut system = forum_with_two_users();
    system.save_as(&path).unwrap();
    assert_eq!(system.current_file(), Some(path.as_path()));

    // Mutate and save again without naming the file
    system.login("ada", "pw").unwrap();
    system
        .create_topic("Sports".to_string(), String::new())
        .unwrap();
    system.save().unwrap();

    let mut reloaded = System::new();
    reloaded.load(&path).unwrap();
    assert_eq!(reloaded.topics().count(), 1);
    assert_eq!(reloaded.current_file(), Some(path.as_path()));
}

// =============================================================================
// Identity and permission properties
// =============================================================================

/// Reply ids follow 0-based call order under every parent, independent
/// of sibling comment ids.
#[test]
fn test_reply_ids_follow_call_order() {
    let mut system = forum_with_two_users();
    system.login("ada", "pw").unwrap();
    let topic_id = system
        .create_topic("T".to_string(), String::new())
        .unwrap();
    system.open_topic_by_id(topic_id).unwrap();
    let discussion_id = system
        .post_discussion("D".to_string(), String::new())
        .unwrap();
    system.open_discussion(discussion_id).unwrap();

    // Two comments, so the second has a nonzero id of its own
    system.add_comment("first".to_string()).unwrap();
    let target = system.add_comment("second".to_string()).unwrap();
    assert_eq!(target, 1);

    for expected in 0..4 {
        let reply_id = system
            .add_reply(target, format!("reply {}", expected))
            .unwrap();
        assert_eq!(reply_id, expected);
    }
}

/// Removal permissions: a regular user may remove only their own
/// comment; discussions and topics fall to moderators alone. A denied
/// removal leaves the tree untouched.
#[test]
fn test_removal_permissions() {
    let mut system = forum_with_two_users();

    // ada (moderator) builds a topic with one discussion and a comment
    system.login("ada", "pw").unwrap();
    let topic_id = system
        .create_topic("T".to_string(), String::new())
        .unwrap();
    system.open_topic_by_id(topic_id).unwrap();
    let discussion_id = system
        .post_discussion("D".to_string(), String::new())
        .unwrap();
    system.open_discussion(discussion_id).unwrap();
    let adas_comment = system.add_comment("by ada".to_string()).unwrap();
    system.logout().unwrap();

    // bob may not remove ada's comment, the discussion, or the topic
    system.login("bob", "pw").unwrap();
    system.open_topic_by_id(topic_id).unwrap();
    system.open_discussion(discussion_id).unwrap();
    let bobs_comment = system.add_comment("by bob".to_string()).unwrap();

    assert!(matches!(
        system.remove_comment(adas_comment).unwrap_err(),
        AgoraError::Permission(_)
    ));
    assert!(matches!(
        system.remove_discussion(discussion_id).unwrap_err(),
        AgoraError::Permission(_)
    ));
    assert!(matches!(
        system.remove_topic(topic_id).unwrap_err(),
        AgoraError::Permission(_)
    ));
    assert_eq!(system.current_discussion().unwrap().comment_count(), 2);

    // bob may remove his own comment
    system.remove_comment(bobs_comment).unwrap();
    assert_eq!(system.current_discussion().unwrap().comment_count(), 1);
    system.logout().unwrap();

    // the moderator may remove all of it
    system.login("ada", "pw").unwrap();
    system.open_topic_by_id(topic_id).unwrap();
    system.open_discussion(discussion_id).unwrap();
    system.remove_comment(adas_comment).unwrap();
    system.close_discussion().unwrap();
    system.remove_discussion(discussion_id).unwrap();
    system.remove_topic(topic_id).unwrap();
    assert!(system.topics().is_empty());
}

/// Removing the highest-id entity at each level leaves the neighbors
/// intact, and the counters never rewind.
#[test]
fn test_remove_highest_ids_is_bounds_safe() {
    let mut system = forum_with_two_users();
    system.login("ada", "pw").unwrap();

    for title in ["A", "B", "C"] {
        system.create_topic(title.to_string(), String::new()).unwrap();
    }
    system.remove_topic(2).unwrap();
    assert_eq!(system.topics().count(), 2);
    assert_eq!(system.topic(0).unwrap().title(), "A");
    assert_eq!(system.topic(1).unwrap().title(), "B");

    // the next topic continues past the removed id
    let next = system
        .create_topic("D".to_string(), String::new())
        .unwrap();
    assert_eq!(next, 3);

    system.open_topic_by_id(0).unwrap();
    for title in ["d0", "d1", "d2"] {
        system
            .post_discussion(title.to_string(), String::new())
            .unwrap();
    }
    system.remove_discussion(2).unwrap();
    let topic = system.topic(0).unwrap();
    assert_eq!(topic.discussion_count(), 2);
    assert_eq!(topic.discussion(1).unwrap().title(), "d1");

    system.open_discussion(0).unwrap();
    for text in ["c0", "c1", "c2"] {
        system.add_comment(text.to_string()).unwrap();
    }
    system.remove_comment(2).unwrap();
    let discussion = system.current_discussion().unwrap();
    assert_eq!(discussion.comment_count(), 2);
    assert_eq!(discussion.comment(0).unwrap().text(), "c0");
    assert_eq!(discussion.comment(1).unwrap().text(), "c1");
}

/// Cursor preconditions gate every content operation; a rejected call
/// mutates nothing.
#[test]
fn test_navigation_preconditions() {
    let mut system = forum_with_two_users();

    // nothing works logged out
    assert!(matches!(
        system.create_topic("T".to_string(), String::new()),
        Err(AgoraError::Precondition(_))
    ));

    system.login("ada", "pw").unwrap();
    let topic_id = system
        .create_topic("T".to_string(), String::new())
        .unwrap();

    // discussion ops need an open topic
    assert!(matches!(
        system.post_discussion("D".to_string(), String::new()),
        Err(AgoraError::Precondition(_))
    ));

    system.open_topic_by_id(topic_id).unwrap();
    // only one topic may be open at a time
    assert!(matches!(
        system.open_topic_by_id(topic_id),
        Err(AgoraError::Precondition(_))
    ));

    let discussion_id = system
        .post_discussion("D".to_string(), String::new())
        .unwrap();

    // comment ops need an open discussion
    assert!(matches!(
        system.add_comment("hello".to_string()),
        Err(AgoraError::Precondition(_))
    ));

    system.open_discussion(discussion_id).unwrap();
    system.add_comment("hello".to_string()).unwrap();

    // unwinding goes discussion first, then topic
    system.close_discussion().unwrap();
    assert!(matches!(
        system.close_discussion(),
        Err(AgoraError::Precondition(_))
    ));
    system.close_topic().unwrap();
    assert!(matches!(
        system.close_topic(),
        Err(AgoraError::Precondition(_))
    ));

    // logout clears the cursors wholesale
    system.open_topic_by_id(topic_id).unwrap();
    system.open_discussion(discussion_id).unwrap();
    system.logout().unwrap();
    assert_eq!(system.session().current_topic(), None);
    assert_eq!(system.session().current_discussion(), None);
}

/// Points survive the save/load cycle and recomputation stays stable
/// across it.
#[test]
fn test_points_stable_across_reload() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("forum.sav");

    let mut system = forum_with_two_users();
    system.login("ada", "pw").unwrap();
    let topic_id = system
        .create_topic("T".to_string(), String::new())
        .unwrap();
    system.open_topic_by_id(topic_id).unwrap();
    let discussion_id = system
        .post_discussion("D".to_string(), String::new())
        .unwrap();
    system.open_discussion(discussion_id).unwrap();
    let comment_id = system.add_comment("text".to_string()).unwrap();
    system.logout().unwrap();

    system.login("bob", "pw").unwrap();
    system.open_topic_by_id(topic_id).unwrap();
    system.open_discussion(discussion_id).unwrap();
    system.vote_comment(comment_id, VoteKind::Up).unwrap();
    system.recompute_points();
    assert_eq!(system.user(0).unwrap().profile().points(), 1);

    system.save_as(&path).unwrap();

    let mut reloaded = System::new();
    reloaded.load(&path).unwrap();
    assert_eq!(reloaded.user(0).unwrap().profile().points(), 1);

    // recomputing from the reloaded tree derives the same tallies
    reloaded.recompute_points();
    assert_eq!(reloaded.user(0).unwrap().profile().points(), 1);
    assert_eq!(reloaded.user(1).unwrap().profile().points(), 0);
}
