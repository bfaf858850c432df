//! Subcommand handlers

use crate::output::Output;
use crate::{AuthorsCommand, Command, ListArgs, PostsCommand};
use anyhow::{anyhow, bail, Context, Result};
use quill_core::api::ApiError;
use quill_core::model::{
    AuthorUpdate, Credentials, FilterPatch, NewPost, PostId, PostUpdate, SignupRequest, UserId,
};
use quill_core::Client;
use tracing::info;

pub async fn run(client: &Client, command: Command, out: &Output) -> Result<()> {
    match command {
        Command::Signup {
            name,
            email,
            password,
        } => {
            let password = match password {
                Some(password) => password,
                None => {
                    let password = prompt("Password: ")?;
                    if prompt("Confirm password: ")? != password {
                        bail!("Passwords do not match");
                    }
                    password
                }
            };
            let request = SignupRequest {
                name,
                email,
                password_confirmation: password.clone(),
                password,
            };
            let response = client.session().signup(&request).await.map_err(report)?;
            out.user(&response.user);
        }
        Command::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Password: ")?,
            };
            let credentials = Credentials::new(email, password);
            let response = client.session().login(&credentials).await.map_err(report)?;
            out.user(&response.user);
        }
        Command::Logout => {
            require_session(client).await?;
            client.session().logout().await.map_err(report)?;
            out.message("Logged out");
        }
        Command::Whoami => {
            require_session(client).await?;
            match client.session().restore().await.map_err(report)? {
                Some(user) => out.user(&user),
                None => bail!("Not logged in"),
            }
        }
        Command::Verify => {
            require_session(client).await?;
            let body = client.session().verify_token().await.map_err(report)?;
            out.value(&body);
        }
        Command::Posts(command) => run_posts(client, command, out).await?,
        Command::Authors(command) => run_authors(client, command, out).await?,
    }
    Ok(())
}

async fn run_posts(client: &Client, command: PostsCommand, out: &Output) -> Result<()> {
    let posts = client.posts();
    match command {
        PostsCommand::List(args) => {
            posts.set_filters(list_patch(&args)).await;
            let items = posts.fetch_all().await.map_err(report)?;
            out.posts(&items);
        }
        PostsCommand::Show { id } => {
            let post = posts.fetch_one(PostId(id)).await.map_err(report)?;
            out.post(&post);
        }
        PostsCommand::ByAuthor { author } => {
            let items = posts.fetch_by_author(UserId(author)).await.map_err(report)?;
            out.posts(&items);
        }
        PostsCommand::Create { title, content } => {
            require_session(client).await?;
            let post = posts
                .create(&NewPost { title, content })
                .await
                .map_err(report)?;
            info!(post = %post.id, "post created");
            out.post(&post);
        }
        PostsCommand::Edit { id, title, content } => {
            require_session(client).await?;
            let update = PostUpdate { title, content };
            if update.title.is_none() && update.content.is_none() {
                bail!("Nothing to change: pass --title and/or --content");
            }
            let post = posts.update(PostId(id), &update).await.map_err(report)?;
            out.post(&post);
        }
        PostsCommand::Delete { id } => {
            require_session(client).await?;
            posts.delete(PostId(id)).await.map_err(report)?;
            out.message(&format!("Deleted post #{}", id));
        }
        PostsCommand::Like { id } => {
            require_session(client).await?;
            let outcome = posts.like(PostId(id)).await.map_err(report)?;
            out.like(&outcome);
        }
        PostsCommand::Unlike { id } => {
            require_session(client).await?;
            let outcome = posts.unlike(PostId(id)).await.map_err(report)?;
            out.like(&outcome);
        }
    }
    Ok(())
}

async fn run_authors(client: &Client, command: AuthorsCommand, out: &Output) -> Result<()> {
    let authors = client.authors();
    match command {
        AuthorsCommand::List => {
            let items = authors.fetch_all().await.map_err(report)?;
            out.authors(&items);
        }
        AuthorsCommand::Show { id } => {
            let author = authors.fetch_one(UserId(id)).await.map_err(report)?;
            out.user(&author);
        }
        AuthorsCommand::Stats { id } => {
            let stats = authors.fetch_stats(UserId(id)).await.map_err(report)?;
            out.stats(&stats);
        }
        AuthorsCommand::Edit {
            id,
            name,
            email,
            bio,
        } => {
            require_session(client).await?;
            let update = AuthorUpdate { name, email, bio };
            if update.is_empty() {
                bail!("Nothing to change: pass --name, --email and/or --bio");
            }
            let author = authors.update(UserId(id), &update).await.map_err(report)?;
            out.user(&author);
        }
        AuthorsCommand::Delete { id } => {
            require_session(client).await?;
            authors.delete(UserId(id)).await.map_err(report)?;
            out.message(&format!("Deleted author #{}", id));
        }
    }
    Ok(())
}

fn list_patch(args: &ListArgs) -> FilterPatch {
    FilterPatch {
        author: Some(args.author.map(UserId)),
        mine: Some(args.mine),
        sort: args.sort,
        order: args.order,
    }
}

async fn require_session(client: &Client) -> Result<()> {
    if client.session().is_authenticated().await {
        Ok(())
    } else {
        bail!("Not logged in; run `quill login` first")
    }
}

fn prompt(label: &str) -> Result<String> {
    rpassword::prompt_password(label).context("Failed to read password")
}

/// Spell out field errors; everything else keeps its own message
fn report(err: ApiError) -> anyhow::Error {
    match err.field_errors() {
        Some(fields) => {
            let details = fields
                .iter()
                .map(|(field, messages)| format!("  {}: {}", field, messages.join("; ")))
                .collect::<Vec<_>>()
                .join("\n");
            anyhow!("{}\n{}", err, details)
        }
        None => anyhow::Error::new(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::api::FieldErrors;
    use quill_core::model::{SortKey, SortOrder};

    #[test]
    fn test_list_patch_carries_every_flag() {
        let args = ListArgs {
            sort: Some(SortKey::LikesCount),
            order: None,
            mine: true,
            author: Some(4),
        };
        let patch = list_patch(&args);
        assert_eq!(patch.author, Some(Some(UserId(4))));
        assert_eq!(patch.mine, Some(true));
        assert_eq!(patch.sort, Some(SortKey::LikesCount));
        assert_eq!(patch.order, None::<SortOrder>);
    }

    #[test]
    fn test_list_patch_resets_scope() {
        let patch = list_patch(&ListArgs::default());
        assert_eq!(patch.author, Some(None));
        assert_eq!(patch.mine, Some(false));
    }

    #[test]
    fn test_report_lists_field_errors() {
        let mut fields = FieldErrors::new();
        fields.insert("email".to_string(), vec!["The email has already been taken.".to_string()]);

        let message = report(ApiError::Validation(fields)).to_string();
        assert_eq!(
            message,
            "Validation failed\n  email: The email has already been taken."
        );

        let message = report(ApiError::Unauthorized).to_string();
        assert_eq!(message, "Unauthorized");
    }
}
