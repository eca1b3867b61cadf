use clap::Parser;
use error_stack::{Report, Result, ResultExt};
use std::path::{Path, PathBuf};

use super::{RunError, Subcommand};
use agora::client::session::FileStore;
use agora::client::{render, ApiClient, Session, SessionStore};
use agora::types::form::auth::{login, register};
use agora::types::form::posts::{list, publish};
use agora::types::form::{members, upload};
use agora::types::{envelope::Empty, Envelope};

/// Create an account
#[derive(Debug, Parser)]
pub struct RegisterCommand {
    #[clap(long)]
    pub username: String,
    #[clap(long)]
    pub email: String,
    #[clap(long)]
    pub password: String,
}

/// Sign in and persist the session
#[derive(Debug, Parser)]
pub struct LoginCommand {
    #[clap(long)]
    pub username: String,
    #[clap(long)]
    pub password: String,
}

/// Submit a post for review
#[derive(Debug, Parser)]
pub struct PublishCommand {
    #[clap(long)]
    pub category: String,
    #[clap(long)]
    pub title: String,
    /// Body text; read from the file at `--content-file` when omitted.
    #[clap(long, conflicts_with = "content_file")]
    pub content: Option<String>,
    #[clap(long)]
    pub content_file: Option<PathBuf>,
}

/// Upload a file
#[derive(Debug, Parser)]
pub struct UploadCommand {
    pub file: PathBuf,
}

pub fn run(base_url: &str, session_file: &Path, command: Subcommand) -> Result<(), RunError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .change_context(RunError)
        .attach_printable("could not build tokio runtime")?;

    let client = ApiClient::new(base_url, FileStore::new(session_file));
    runtime.block_on(dispatch(&client, command))
}

/// Turns a failure envelope into a command failure carrying the
/// notice the server (or the request helper) produced.
fn accept<T>(envelope: Envelope<T>) -> Result<Envelope<T>, RunError> {
    if envelope.success {
        Ok(envelope)
    } else {
        let notice = envelope
            .message
            .unwrap_or_else(|| "Request failed".to_string());
        Err(Report::new(RunError).attach_printable(notice))
    }
}

async fn dispatch(client: &ApiClient<FileStore>, command: Subcommand) -> Result<(), RunError> {
    match command {
        Subcommand::Server(..) => unreachable!("dispatched through cli::server"),

        Subcommand::Register(args) => {
            let form = register::Request {
                username: args.username,
                email: args.email,
                password: args.password.into(),
            };

            let envelope: Envelope<register::Response> =
                client.post("/api/auth/register", &form).await;
            let envelope = accept(envelope)?;

            if let Some(message) = &envelope.message {
                println!("{message}");
            }
            if let Some(data) = &envelope.data {
                println!("Your member id is #{}", data.user_id);
            }
            Ok(())
        }

        Subcommand::Login(args) => {
            let form = login::Request {
                username: args.username,
                password: args.password.into(),
            };

            let envelope: Envelope<login::Response> = client.post("/api/auth/login", &form).await;
            let envelope = accept(envelope)?;

            let Some(data) = envelope.data else {
                return Err(Report::new(RunError)
                    .attach_printable("the server omitted the session payload"));
            };

            let session = Session {
                token: data.token,
                user: data.user,
            };
            client.store().save(&session).change_context(RunError)?;

            println!("{}", render::signed_in(&session.user));
            Ok(())
        }

        Subcommand::Logout => {
            client.store().clear().change_context(RunError)?;
            println!("Signed out.");
            Ok(())
        }

        Subcommand::Posts => {
            let envelope: Envelope<list::Response> = client.get("/api/posts").await;
            let envelope = accept(envelope)?;

            let posts = envelope.data.map(|data| data.posts).unwrap_or_default();
            print!("{}", ensure_trailing_newline(render::posts_board(&posts)));
            Ok(())
        }

        Subcommand::Members => {
            let envelope: Envelope<members::Response> = client.get("/api/members").await;
            let envelope = accept(envelope)?;

            let members = envelope.data.map(|data| data.members).unwrap_or_default();
            print!("{}", ensure_trailing_newline(render::members_board(&members)));
            Ok(())
        }

        Subcommand::Publish(args) => {
            let content = match (args.content, args.content_file) {
                (Some(content), ..) => content,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .change_context(RunError)
                    .attach_printable_lazy(|| format!("could not read {}", path.display()))?,
                (None, None) => {
                    return Err(Report::new(RunError)
                        .attach_printable("pass the body with --content or --content-file"))
                }
            };

            let form = publish::Request {
                category: args.category,
                title: args.title,
                content,
            };

            let envelope: Envelope<Empty> = client.post("/api/posts", &form).await;
            let envelope = accept(envelope)?;

            println!(
                "{}",
                envelope
                    .message
                    .unwrap_or_else(|| "Post submitted".to_string())
            );
            Ok(())
        }

        Subcommand::Upload(args) => {
            let bytes = std::fs::read(&args.file)
                .change_context(RunError)
                .attach_printable_lazy(|| format!("could not read {}", args.file.display()))?;

            let filename = args
                .file
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("upload.bin")
                .to_string();
            let content_type = content_type_for(&filename);

            let envelope: Envelope<upload::Response> = client
                .upload("/api/upload", &filename, bytes, &content_type)
                .await;
            let envelope = accept(envelope)?;

            if let Some(message) = &envelope.message {
                println!("{message}");
            }
            if let Some(data) = &envelope.data {
                println!("Served at {}", data.url);
            }
            Ok(())
        }
    }
}

fn ensure_trailing_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// The store keeps whatever content type the client declares; this is
/// a best-effort guess from the extension, octet-stream otherwise.
fn content_type_for(filename: &str) -> mime::Mime {
    match filename.rsplit('.').next() {
        Some("png") => mime::IMAGE_PNG,
        Some("jpg" | "jpeg") => mime::IMAGE_JPEG,
        Some("gif") => mime::IMAGE_GIF,
        Some("svg") => mime::IMAGE_SVG,
        Some("txt" | "md") => mime::TEXT_PLAIN,
        Some("json") => mime::APPLICATION_JSON,
        Some("pdf") => mime::APPLICATION_PDF,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_follow_the_extension() {
        assert_eq!(content_type_for("cat.png"), mime::IMAGE_PNG);
        assert_eq!(content_type_for("scan.JPG"), mime::APPLICATION_OCTET_STREAM);
        assert_eq!(content_type_for("notes.md"), mime::TEXT_PLAIN);
        assert_eq!(content_type_for("archive"), mime::APPLICATION_OCTET_STREAM);
    }
}
