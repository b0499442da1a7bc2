use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use super::text::sort_by_date;
use crate::models::{Message, Thread};

#[derive(Serialize)]
struct ThreadView<'a> {
    participants: &'a str,
    date: String,
    messages: Vec<MessageView<'a>>,
}

#[derive(Serialize)]
struct MessageView<'a> {
    sender: &'a str,
    date: Option<String>,
    body: &'a str,
}

impl<'a> From<&'a Message> for MessageView<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            sender: &message.sender,
            date: message.timestamp.as_ref().map(|ts| ts.instant.to_rfc3339()),
            body: &message.body,
        }
    }
}

/// Print threads as a JSON array, in the same order as the text transcript
///
/// Dates are RFC 3339; messages are oldest-first; empty threads are left out.
pub fn write_json<W: Write>(out: &mut W, threads: &[Thread]) -> Result<()> {
    let views: Vec<ThreadView> = sort_by_date(threads)
        .into_iter()
        .filter(|thread| !thread.messages.is_empty())
        .map(|thread| ThreadView {
            participants: &thread.participants,
            date: thread.date.instant.to_rfc3339(),
            messages: thread.chronological().map(MessageView::from).collect(),
        })
        .collect();

    serde_json::to_writer_pretty(&mut *out, &views).context("Failed to serialize threads")?;
    writeln!(out).context("Failed to write output")?;
    Ok(())
}
