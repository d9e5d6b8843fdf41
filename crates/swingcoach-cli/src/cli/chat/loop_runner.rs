//! Main chat loop.
//!
//! Reads lines, dispatches slash commands, and streams each reply into the
//! terminal as `TextDelta` events arrive on the coordinator's event bus.
//! While a reply streams, input is still read: Ctrl+C cancels the reply and
//! a new line supersedes it.

use std::io::Write;

use console::style;
use rustyline_async::SharedWriter;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::debug;
use uuid::Uuid;

use swingcoach_types::chat::{Attachment, AttachmentKind};
use swingcoach_types::event::CoachEvent;
use swingcoach_types::llm::MessageRole;
use swingcoach_types::stream::StreamOutcome;

use crate::cli::profile::render_profile;
use crate::cli::spinner;
use crate::state::{AppState, ConcreteCoordinator};

use super::banner::welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};

/// What the loop does after a reply finished.
enum AfterReply {
    Continue,
    /// A line typed during streaming superseded the reply; send it next.
    Send(String),
    Exit,
}

/// Run the interactive chat loop.
pub async fn run_chat_loop(
    state: &AppState,
    new: bool,
    requested: Option<Uuid>,
    video: Option<String>,
) -> anyhow::Result<()> {
    let coordinator = &state.coordinator;
    let (mut conversation_id, resumed) = select_conversation(coordinator, new, requested).await?;
    let title = coordinator
        .conversation(conversation_id)
        .map(|c| c.title)
        .unwrap_or_default();
    print!(
        "{}",
        welcome_banner(&title, &conversation_id.to_string(), &state.relay_url, resumed)
    );

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut input, mut out) =
        ChatInput::new(prompt).map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;
    let mut events = coordinator.subscribe();
    let mut pending_video = video;
    let mut queued: Option<String> = None;

    loop {
        let text = match queued.take() {
            Some(text) => text,
            None => {
                let event = tokio::select! {
                    event = input.read_line() => event,
                    Some(event) = next_event(&mut events) => {
                        print_notice(&mut out, conversation_id, &event)?;
                        continue;
                    }
                };
                match event {
                    InputEvent::Eof => break,
                    InputEvent::Interrupted => {
                        writeln!(out, "\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim())?;
                        continue;
                    }
                    InputEvent::Message(text) => text,
                }
            }
        };

        if text.is_empty() {
            continue;
        }

        if let Some(command) = commands::parse(&text) {
            match command {
                ChatCommand::Help => write!(out, "{}", commands::help_text())?,
                ChatCommand::Clear => input.clear(),
                ChatCommand::Exit => break,
                ChatCommand::New => {
                    conversation_id = coordinator.start_conversation().await?;
                    writeln!(out, "\n  {} Started a new conversation.\n", style("*").cyan().bold())?;
                }
                ChatCommand::History => print_history(&mut out, coordinator, conversation_id)?,
                ChatCommand::Profile => {
                    let profile = coordinator.profile().snapshot().await;
                    write!(out, "{}", render_profile(&profile, state.catalog.as_ref()))?;
                }
                ChatCommand::Video(reference) => {
                    writeln!(
                        out,
                        "\n  {} Video {} will be attached to your next message.\n",
                        style("*").cyan().bold(),
                        style(&reference).dim()
                    )?;
                    pending_video = Some(reference);
                }
                ChatCommand::Unknown(name) => {
                    writeln!(
                        out,
                        "\n  {} Unknown command: {}. Type /help for available commands.\n",
                        style("?").yellow().bold(),
                        style(name).dim()
                    )?;
                }
            }
            continue;
        }

        let attachments: Vec<Attachment> = pending_video
            .take()
            .map(|reference| Attachment {
                kind: AttachmentKind::Video,
                reference,
            })
            .into_iter()
            .collect();

        match stream_reply(
            coordinator,
            &mut input,
            &mut out,
            &mut events,
            conversation_id,
            &text,
            attachments,
        )
        .await?
        {
            AfterReply::Continue => {}
            AfterReply::Send(next) => queued = Some(next),
            AfterReply::Exit => break,
        }
    }

    writeln!(out, "\n  {}", style("Session ended.").dim())?;
    input.flush();
    drop(input);

    let saving = spinner("Saving what the coach learned...");
    coordinator.wait_for_background().await;
    saving.finish_and_clear();
    Ok(())
}

async fn select_conversation(
    coordinator: &ConcreteCoordinator,
    new: bool,
    requested: Option<Uuid>,
) -> anyhow::Result<(Uuid, bool)> {
    if let Some(id) = requested {
        coordinator.activate(id).await?;
        return Ok((id, true));
    }
    if !new {
        if let Some(id) = coordinator.active_conversation_id().await {
            return Ok((id, true));
        }
    }
    Ok((coordinator.start_conversation().await?, false))
}

/// Next bus event, skipping over lag. `None` once the bus is closed.
async fn next_event(events: &mut broadcast::Receiver<CoachEvent>) -> Option<CoachEvent> {
    loop {
        match events.recv().await {
            Ok(event) => return Some(event),
            Err(RecvError::Lagged(skipped)) => debug!(skipped, "event receiver lagged"),
            Err(RecvError::Closed) => return None,
        }
    }
}

/// Stream one reply, printing chunks as they arrive.
async fn stream_reply(
    coordinator: &ConcreteCoordinator,
    input: &mut ChatInput,
    out: &mut SharedWriter,
    events: &mut broadcast::Receiver<CoachEvent>,
    conversation_id: Uuid,
    text: &str,
    attachments: Vec<Attachment>,
) -> anyhow::Result<AfterReply> {
    let waiting = spinner("thinking...");
    let mut printer = ReplyPrinter::new(conversation_id);
    let mut after = AfterReply::Continue;

    let send = coordinator.send_message(conversation_id, text, attachments);
    tokio::pin!(send);

    let result = loop {
        tokio::select! {
            result = &mut send => break result,
            Some(event) = next_event(events) => {
                if printer.is_first_delta(&event) {
                    waiting.finish_and_clear();
                }
                printer.print(out, &event)?;
            }
            line = input.read_line() => {
                match line {
                    InputEvent::Interrupted => {}
                    InputEvent::Eof => after = AfterReply::Exit,
                    InputEvent::Message(line) if !line.is_empty() => after = AfterReply::Send(line),
                    InputEvent::Message(_) => continue,
                }
                coordinator.cancel(conversation_id);
            }
        }
    };
    waiting.finish_and_clear();

    // Deltas published just before the exchange finished may still be queued.
    loop {
        match events.try_recv() {
            Ok(event) => printer.print(out, &event)?,
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }

    match result {
        Ok(StreamOutcome::Success(reply)) if reply.is_empty() => {
            writeln!(out, "\n  {}\n", style("The coach had nothing to say. Try rephrasing.").dim())?;
        }
        Ok(StreamOutcome::Success(_)) => writeln!(out, "\n")?,
        Ok(StreamOutcome::SuccessDespiteDisconnect(_)) => {
            writeln!(out, "\n  {}\n", style("(connection dropped, partial reply kept)").dim())?;
        }
        Ok(StreamOutcome::Cancelled) => {
            writeln!(out, "\n  {}\n", style("(reply cancelled)").dim())?;
        }
        Ok(StreamOutcome::Failed(error)) => {
            writeln!(out, "\n  {} {}", style("!").red().bold(), error.user_message())?;
            writeln!(out, "  {}\n", style("Type a message to retry, /exit to quit.").dim())?;
        }
        Err(error) => {
            writeln!(out, "\n  {} {error}\n", style("!").red().bold())?;
        }
    }

    Ok(after)
}

/// Prints reply chunks for one conversation and notices for the rest.
struct ReplyPrinter {
    conversation_id: Uuid,
    started: bool,
}

impl ReplyPrinter {
    fn new(conversation_id: Uuid) -> Self {
        Self {
            conversation_id,
            started: false,
        }
    }

    fn is_first_delta(&self, event: &CoachEvent) -> bool {
        !self.started
            && matches!(event, CoachEvent::TextDelta { conversation_id, .. } if *conversation_id == self.conversation_id)
    }

    fn print(&mut self, out: &mut SharedWriter, event: &CoachEvent) -> std::io::Result<()> {
        match event {
            CoachEvent::TextDelta {
                conversation_id,
                text,
                ..
            } if *conversation_id == self.conversation_id => {
                if !self.started {
                    self.started = true;
                    write!(out, "\n  {} ", style("Coach").cyan().bold())?;
                }
                write!(out, "{text}")?;
                out.flush()
            }
            other => print_notice(out, self.conversation_id, other),
        }
    }
}

/// Background results worth a line in the transcript.
fn print_notice(
    out: &mut SharedWriter,
    conversation_id: Uuid,
    event: &CoachEvent,
) -> std::io::Result<()> {
    match event {
        CoachEvent::ProfileUpdated { .. } => {
            writeln!(out, "  {}", style("✓ swing profile updated").dim())
        }
        CoachEvent::TitleGenerated {
            conversation_id: id,
            title,
        } if *id == conversation_id => {
            writeln!(out, "  {} {}", style("»").dim(), style(title).dim())
        }
        _ => Ok(()),
    }
}

fn print_history(
    out: &mut SharedWriter,
    coordinator: &ConcreteCoordinator,
    conversation_id: Uuid,
) -> std::io::Result<()> {
    let Some(conversation) = coordinator.conversation(conversation_id) else {
        return Ok(());
    };

    writeln!(out, "\n  {}", style(&conversation.title).bold())?;
    if let Some(summary) = &conversation.summary {
        writeln!(out, "  {}", style(summary).dim())?;
    }
    writeln!(out)?;
    for message in conversation.messages() {
        let label = match message.role {
            MessageRole::User => style("You").green().bold(),
            MessageRole::Assistant => style("Coach").cyan().bold(),
        };
        writeln!(out, "  {} {}", label, preview(&message.text_with_attachments(), 100))?;
    }
    writeln!(out)
}

/// First `max` characters of `text` on one line.
fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        flat
    }
}
