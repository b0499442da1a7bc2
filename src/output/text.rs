use std::io::{self, Write};

use crate::models::{Message, Thread};

/// Printed in place of a date for messages whose header had no meta span
pub const MISSING_DATE: &str = "-";

/// `<date>\t<sender>:\t<body>`
pub fn write_message_line<W: Write>(out: &mut W, message: &Message) -> io::Result<()> {
    match &message.timestamp {
        Some(timestamp) => write!(out, "{}", timestamp)?,
        None => write!(out, "{}", MISSING_DATE)?,
    }
    writeln!(out, "\t{}:\t{}", message.sender, message.body)
}

/// Header line followed by the thread's messages oldest-first
///
/// Threads without messages print nothing.
pub fn write_thread<W: Write>(out: &mut W, thread: &Thread) -> io::Result<()> {
    if thread.messages.is_empty() {
        return Ok(());
    }

    writeln!(out, "{}\t{}:", thread.date, thread.participants)?;
    for message in thread.chronological() {
        write_message_line(out, message)?;
    }
    Ok(())
}

/// Threads ordered by representative date, earliest first
///
/// The sort is stable: threads with equal dates keep document order.
pub fn sort_by_date(threads: &[Thread]) -> Vec<&Thread> {
    let mut sorted: Vec<&Thread> = threads.iter().collect();
    sorted.sort_by(|a, b| a.date.instant.cmp(&b.date.instant));
    sorted
}

/// Print every thread in date order
pub fn write_transcript<W: Write>(out: &mut W, threads: &[Thread]) -> io::Result<()> {
    for thread in sort_by_date(threads) {
        write_thread(out, thread)?;
    }
    out.flush()
}
