//! Console command parsing.

use std::path::PathBuf;

/// Console commands, one per core operation.
///
/// Commands that need more input than an id or a file name gather it with
/// follow-up prompts in their handlers; an argument given inline on the
/// command line is used as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Save,
    SaveAs { file: Option<PathBuf> },
    Load { file: Option<PathBuf> },
    Signup,
    Login { nickname: Option<String> },
    Logout,
    Edit,
    Create,
    Search { fragment: Option<String> },
    Open,
    Quit,
    List,
    Post,
    PostOpen { discussion_id: Option<u32> },
    PostQuit,
    RemovePost { discussion_id: Option<u32> },
    RemoveTopic { topic_id: Option<u32> },
    AddComment,
    AddReply { comment_id: Option<u32> },
    CommentVote { comment_id: Option<u32> },
    RemoveComment { comment_id: Option<u32> },
    ListComments,
    Help,
    Exit,
}

impl Command {
    /// Parses one input line. Returns `None` for an unknown command word.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.splitn(2, char::is_whitespace);
        let word = parts.next()?;
        let rest = parts.next().map(str::trim).filter(|r| !r.is_empty());

        let command = match word {
            "save" => Self::Save,
            "save_as" => Self::SaveAs {
                file: rest.map(PathBuf::from),
            },
            "load" => Self::Load {
                file: rest.map(PathBuf::from),
            },
            "signup" => Self::Signup,
            "login" => Self::Login {
                nickname: rest.map(str::to_string),
            },
            "logout" => Self::Logout,
            "edit" => Self::Edit,
            "create" => Self::Create,
            "search" => Self::Search {
                fragment: rest.map(str::to_string),
            },
            "open" => Self::Open,
            "quit" => Self::Quit,
            "list" => Self::List,
            "post" => Self::Post,
            "post_open" => Self::PostOpen {
                discussion_id: rest.and_then(|r| r.parse().ok()),
            },
            "post_quit" => Self::PostQuit,
            "remove_post" => Self::RemovePost {
                discussion_id: rest.and_then(|r| r.parse().ok()),
            },
            "remove_topic" => Self::RemoveTopic {
                topic_id: rest.and_then(|r| r.parse().ok()),
            },
            "add_comment" => Self::AddComment,
            "add_reply" => Self::AddReply {
                comment_id: rest.and_then(|r| r.parse().ok()),
            },
            "comment_vote" => Self::CommentVote {
                comment_id: rest.and_then(|r| r.parse().ok()),
            },
            "remove_comment" => Self::RemoveComment {
                comment_id: rest.and_then(|r| r.parse().ok()),
            },
            "list_comments" => Self::ListComments,
            "help" => Self::Help,
            "exit" => Self::Exit,
            _ => return None,
        };
        Some(command)
    }
}
