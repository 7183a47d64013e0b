//! Command handlers: prompts in, one core call each, results printed.
//!
//! Everything the operator sees comes from this module; the core never
//! prints. A handler that returns an error has mutated nothing, and the
//! loop surfaces the message and keeps going.

use crate::cli::command::Command;
use crate::cli::utils::{prompt_for_password, prompt_line, prompt_u32, prompt_yes_no};
use crate::error::{AgoraError, Result};
use crate::forum::{Role, System, VoteKind};
use std::path::PathBuf;

/// Routes one parsed command to its handler.
pub fn dispatch(system: &mut System, command: Command) -> Result<()> {
    match command {
        Command::Save => save(system),
        Command::SaveAs { file } => save_as(system, file),
        Command::Load { file } => load(system, file),
        Command::Signup => signup(system),
        Command::Login { nickname } => login(system, nickname),
        Command::Logout => logout(system),
        Command::Edit => edit(system),
        Command::Create => create(system),
        Command::Search { fragment } => search(system, fragment),
        Command::Open => open(system),
        Command::Quit => quit(system),
        Command::List => list(system),
        Command::Post => post(system),
        Command::PostOpen { discussion_id } => post_open(system, discussion_id),
        Command::PostQuit => post_quit(system),
        Command::RemovePost { discussion_id } => remove_post(system, discussion_id),
        Command::RemoveTopic { topic_id } => remove_topic(system, topic_id),
        Command::AddComment => add_comment(system),
        Command::AddReply { comment_id } => add_reply(system, comment_id),
        Command::CommentVote { comment_id } => comment_vote(system, comment_id),
        Command::RemoveComment { comment_id } => remove_comment(system, comment_id),
        Command::ListComments => list_comments(system),
        Command::Help => help(),
        Command::Exit => exit(system),
    }
}

fn save(system: &mut System) -> Result<()> {
    match system.save() {
        Ok(()) => {
            println!(">Current progress was saved!");
            Ok(())
        }
        Err(AgoraError::Precondition(_)) => {
            // no file associated yet: offer to create one
            if prompt_yes_no(">No previous save was found! Create a file? (Y/N): ")? {
                save_as(system, None)
            } else {
                println!(">Current progress was not saved!");
                Ok(())
            }
        }
        Err(e) => Err(e),
    }
}

fn save_as(system: &mut System, file: Option<PathBuf>) -> Result<()> {
    let file = match file {
        Some(file) => file,
        None => PathBuf::from(prompt_line(">>Enter file name: ")?),
    };
    system.save_as(&file)?;
    println!(">Current progress was saved!");
    Ok(())
}

fn load(system: &mut System, file: Option<PathBuf>) -> Result<()> {
    let file = match file {
        Some(file) => file,
        None => PathBuf::from(prompt_line(">>Enter file name: ")?),
    };
    system.load(&file)?;
    println!(">Load successful!");
    Ok(())
}

fn signup(system: &mut System) -> Result<()> {
    let first_name = prompt_line(">Enter first name: ")?;
    let last_name = prompt_line(">Enter last name: ")?;

    let mut nickname = prompt_line(">Enter nickname: ")?;
    while system.nickname_taken(&nickname) {
        println!(">A user with this nickname already exists!");
        nickname = prompt_line(">Enter a new nickname: ")?;
    }

    let password = prompt_for_password(">Enter password")?;
    let id = system.signup(first_name, last_name, nickname, password)?;
    println!(">Account created with id {}.", id);
    Ok(())
}

fn login(system: &mut System, nickname: Option<String>) -> Result<()> {
    let nickname = match nickname {
        Some(nickname) => nickname,
        None => prompt_line(">>Enter nickname: ")?,
    };
    let password = prompt_for_password(">>Enter password")?;

    let id = system.login(&nickname, &password)?;
    if let Some(account) = system.user(id) {
        println!(">Welcome, {}!", account.profile().first_name());
    }
    Ok(())
}

fn logout(system: &mut System) -> Result<()> {
    let name = system
        .session()
        .current_user()
        .and_then(|(id, _)| system.user(id))
        .map(|a| a.profile().first_name().to_string());

    system.logout()?;
    if let Some(name) = name {
        println!(">Goodbye, {}!", name);
    }
    Ok(())
}

fn edit(system: &mut System) -> Result<()> {
    // fail up front instead of prompting a logged-out operator
    system
        .session()
        .current_user()
        .ok_or_else(|| AgoraError::precondition("No user is logged in"))?;

    loop {
        let field = prompt_line(
            ">What do you want to edit (firstName, lastName, password, id, goBack): ",
        )?;
        let outcome = match field.as_str() {
            "goBack" => return Ok(()),
            "firstName" => {
                let value = prompt_line(">Enter new first name: ")?;
                system.set_first_name(value)
            }
            "lastName" => {
                let value = prompt_line(">Enter new last name: ")?;
                system.set_last_name(value)
            }
            "password" => {
                let value = prompt_for_password(">Enter new password")?;
                system.set_password(value)
            }
            "id" => edit_role(system),
            _ => {
                println!(">No such editable parameter exists!");
                continue;
            }
        };
        if let Err(e) = outcome {
            println!(">{}", e);
        }
    }
}

fn edit_role(system: &mut System) -> Result<()> {
    let target = prompt_u32(">Enter the id of the user: ")?;
    let role = loop {
        let role = prompt_line(">Enter new role of the selected user (user/mod): ")?;
        match role.to_lowercase().as_str() {
            "user" => break Role::User,
            "mod" | "moderator" => break Role::Mod,
            _ => println!(">No such role exists!"),
        }
    };
    system.set_role(target, role)
}

fn create(system: &mut System) -> Result<()> {
    let title = prompt_line(">>Enter the title of the topic: ")?;
    let description = prompt_line(">>Enter the description of the topic: ")?;
    let id = system.create_topic(title, description)?;
    println!(">Topic created with id {}.", id);
    Ok(())
}

fn search(system: &mut System, fragment: Option<String>) -> Result<()> {
    let fragment = match fragment {
        Some(fragment) => fragment,
        None => prompt_line(">>Enter key word/phrase: ")?,
    };

    let hits = system.search_topics(&fragment);
    if hits.is_empty() {
        println!(">No topic found!");
    } else {
        for (id, title) in hits {
            println!("\t>>{} {{id: {}}}", title, id);
        }
    }
    Ok(())
}

fn open(system: &mut System) -> Result<()> {
    let mode = prompt_line(">>Open by id or by full title? (id/title): ")?;
    if mode.eq_ignore_ascii_case("id") {
        let topic_id = prompt_u32(">>Enter id: ")?;
        system.open_topic_by_id(topic_id)?;
    } else {
        let title = prompt_line(">>Enter full title: ")?;
        system.open_topic_by_title(&title)?;
    }

    println!("\tWelcome to \"{}\".", system.open_topic()?.title());
    Ok(())
}

fn quit(system: &mut System) -> Result<()> {
    let topic_id = system.close_topic()?;
    if let Some(topic) = system.topic(topic_id) {
        println!("\tClosing topic \"{}\".", topic.title());
    }
    Ok(())
}

fn list(system: &mut System) -> Result<()> {
    for discussion in system.list_discussions()? {
        println!("\t{} {{id: {}}}", discussion.title(), discussion.id());
    }
    Ok(())
}

fn post(system: &mut System) -> Result<()> {
    let title = prompt_line(">>Enter the discussion's title: ")?;
    let contents = prompt_line(">>Enter the discussion's contents: ")?;
    let id = system.post_discussion(title, contents)?;
    println!(">Discussion posted with id {}.", id);
    Ok(())
}

fn post_open(system: &mut System, discussion_id: Option<u32>) -> Result<()> {
    let discussion_id = match discussion_id {
        Some(id) => id,
        None => prompt_u32(">>Enter discussion id: ")?,
    };
    system.open_discussion(discussion_id)?;

    let discussion = system.current_discussion()?;
    println!("\tWelcome to \"{}\".", discussion.title());
    println!("\tThe contents of this discussion are as follows:");
    println!("\t{}", discussion.contents());
    println!(
        "\tThere are currently {} comments in the discussion.",
        discussion.comment_count()
    );
    Ok(())
}

fn post_quit(system: &mut System) -> Result<()> {
    let discussion_id = system.close_discussion()?;
    if let Some(discussion) = system
        .open_topic()
        .ok()
        .and_then(|t| t.discussion(discussion_id))
    {
        println!("\tClosing discussion \"{}\".", discussion.title());
    }
    Ok(())
}

fn remove_post(system: &mut System, discussion_id: Option<u32>) -> Result<()> {
    let discussion_id = match discussion_id {
        Some(id) => id,
        None => prompt_u32(">>Enter the post's id: ")?,
    };
    system.remove_discussion(discussion_id)?;
    println!(">Discussion {} removed.", discussion_id);
    Ok(())
}

fn remove_topic(system: &mut System, topic_id: Option<u32>) -> Result<()> {
    let topic_id = match topic_id {
        Some(id) => id,
        None => prompt_u32(">>Enter the topic's id: ")?,
    };
    system.remove_topic(topic_id)?;
    println!(">Topic {} removed.", topic_id);
    Ok(())
}

fn add_comment(system: &mut System) -> Result<()> {
    let text = prompt_line(">Enter a comment: ")?;
    let id = system.add_comment(text)?;
    println!(">Comment added with id {}.", id);
    Ok(())
}

fn add_reply(system: &mut System, comment_id: Option<u32>) -> Result<()> {
    let comment_id = match comment_id {
        Some(id) => id,
        None => prompt_u32(">>Enter the comment's id: ")?,
    };
    let text = prompt_line(">Enter the reply: ")?;
    system.add_reply(comment_id, text)?;
    Ok(())
}

fn comment_vote(system: &mut System, comment_id: Option<u32>) -> Result<()> {
    let comment_id = match comment_id {
        Some(id) => id,
        None => prompt_u32(">>Enter the comment's id: ")?,
    };

    // check before asking for a direction, like the original did
    let (user_id, _) = system
        .session()
        .current_user()
        .ok_or_else(|| AgoraError::precondition("No user is logged in"))?;
    let discussion = system.current_discussion()?;
    let comment = discussion
        .comment(comment_id)
        .ok_or_else(|| AgoraError::not_found(format!("Comment with id {}", comment_id)))?;
    if comment.has_voted(user_id) {
        println!(">You have already voted!");
        return Ok(());
    }

    let kind = loop {
        let vote = prompt_line(">Upvote or downvote the comment (U/D): ")?;
        match vote.as_str() {
            "U" | "u" => break VoteKind::Up,
            "D" | "d" => break VoteKind::Down,
            _ => println!(">No such vote exists!"),
        }
    };
    system.vote_comment(comment_id, kind)
}

fn remove_comment(system: &mut System, comment_id: Option<u32>) -> Result<()> {
    let comment_id = match comment_id {
        Some(id) => id,
        None => prompt_u32(">>Enter the comment's id: ")?,
    };
    system.remove_comment(comment_id)?;
    println!(">Comment {} removed.", comment_id);
    Ok(())
}

fn list_comments(system: &mut System) -> Result<()> {
    let comments = system.list_comments()?;
    println!(">Comments:");
    for (comment, depth) in comments {
        println!(
            "{}From user {}: {}, rating: {} {{id: {}}}",
            "   ".repeat(depth + 1),
            comment.author_id(),
            comment.text(),
            comment.rating(),
            comment.id()
        );
    }
    Ok(())
}

fn help() -> Result<()> {
    println!(
        ">>All commands: save, save_as, load, signup, login, logout, edit, create, search, open,\n\
         quit, list, post, post_open, post_quit, add_comment, add_reply, comment_vote,\n\
         list_comments, remove_topic, remove_post, remove_comment, help, exit."
    );
    Ok(())
}

fn exit(system: &mut System) -> Result<()> {
    if prompt_yes_no(">>Do you want to save the changes? (Y/N): ")? {
        save(system)
    } else {
        println!(">>The changes were not saved!");
        Ok(())
    }
}
