//! services/client/src/terminal.rs
//!
//! A line-oriented front-end for the two sessions. It renders session state to a
//! writer and turns input lines into session events.

use std::io::Write;
use std::path::{Path, PathBuf};

use docdesk_core::domain::{format_file_size, Role};
use docdesk_core::ports::{DocumentQueryService, PinningService};
use docdesk_core::sessions::{QuerySession, SendOutcome, SharingSession};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::adapters::load_file;
use crate::error::ClientError;

/// One line of chat input.
#[derive(Debug, PartialEq, Eq)]
pub enum ChatCommand<'a> {
    Quit,
    Reset,
    Remove,
    Open(&'a str),
    Say(&'a str),
}

impl<'a> ChatCommand<'a> {
    pub fn parse(line: &'a str) -> Self {
        match line.trim() {
            "/quit" => ChatCommand::Quit,
            "/reset" => ChatCommand::Reset,
            "/remove" => ChatCommand::Remove,
            trimmed => match trimmed.strip_prefix("/open ") {
                Some(path) => ChatCommand::Open(path.trim()),
                None => ChatCommand::Say(line),
            },
        }
    }
}

//=========================================================================================
// Document Query
//=========================================================================================

/// Loads `path` and uploads it to the query backend. Upload failures are reported
/// and the chat carries on without a document.
pub async fn attach<W: Write>(
    session: &mut QuerySession,
    service: &dyn DocumentQueryService,
    path: &Path,
    out: &mut W,
) -> Result<(), ClientError> {
    let source = match load_file(path).await {
        Ok(source) => source,
        Err(e) => {
            writeln!(out, "! could not open {}: {}", path.display(), e)?;
            return Ok(());
        }
    };
    writeln!(out, "Uploading {} ({})...", source.name, format_file_size(source.size_bytes()))?;
    match session.attach_document(source, service).await {
        Ok(handle) => writeln!(out, "Document ready ({}). Ask away.", handle)?,
        Err(e) => writeln!(out, "! {}", e)?,
    }
    Ok(())
}

/// Runs the chat loop until `/quit` or end of input.
pub async fn run_query<R, W>(
    session: &mut QuerySession,
    service: &dyn DocumentQueryService,
    input: R,
    out: &mut W,
) -> Result<(), ClientError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match ChatCommand::parse(&line) {
            ChatCommand::Quit => break,
            ChatCommand::Reset => {
                session.reset_transcript();
                writeln!(out, "(transcript cleared)")?;
            }
            ChatCommand::Remove => {
                if session.remove_file() {
                    writeln!(out, "(file removed)")?;
                }
            }
            ChatCommand::Open(path) => {
                attach(session, service, &PathBuf::from(path), out).await?;
            }
            ChatCommand::Say(text) => {
                let before = session.transcript().len();
                let result = session.send_user_message(text, service).await;

                for message in &session.transcript()[before..] {
                    let speaker = match message.role {
                        Role::User => "you",
                        Role::Assistant => "assistant",
                    };
                    writeln!(out, "{}> {}", speaker, message.text)?;
                }
                match result {
                    Ok(SendOutcome::Recorded) => writeln!(out, "(no document attached yet)")?,
                    Ok(_) => {}
                    Err(e) => writeln!(out, "! {}", e)?,
                }
            }
        }
        out.flush()?;
    }
    Ok(())
}

//=========================================================================================
// Document Sharing
//=========================================================================================

/// Selects and pins each file in turn, then prints the uploaded list.
pub async fn run_share<W: Write>(
    session: &mut SharingSession,
    service: &dyn PinningService,
    paths: &[PathBuf],
    out: &mut W,
) -> Result<(), ClientError> {
    for path in paths {
        match load_file(path).await {
            Ok(source) => {
                let selected = session.select_file(source);
                writeln!(
                    out,
                    "Selected {} ({}, {})",
                    selected.name(),
                    format_file_size(selected.size_bytes()),
                    selected.mime_type()
                )?;
            }
            Err(e) => {
                writeln!(out, "! could not open {}: {}", path.display(), e)?;
                continue;
            }
        }

        match session.submit(service).await {
            Ok(record) => {
                if let Some(notice) = session.success_message() {
                    writeln!(out, "{}", notice)?;
                }
                writeln!(out, "  {}", record.retrieval_url)?;
            }
            Err(e) => {
                let message = session.error_message().map(str::to_string).unwrap_or_else(|| e.to_string());
                writeln!(out, "! {}", message)?;
            }
        }
    }

    let uploaded = session.uploaded_files();
    writeln!(out, "Uploaded files ({}):", uploaded.len())?;
    for record in uploaded {
        writeln!(
            out,
            "  {}  {}  {}  {}",
            record.name,
            format_file_size(record.size_bytes),
            record.mime_type,
            record.retrieval_url
        )?;
    }
    out.flush()?;
    Ok(())
}
