//! Interactive terminal chat against a running relay

use anyhow::Result;
use colored::Colorize;
use std::future::Future;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use application::chat_session::{ChatController, ChatView, THINKING_PLACEHOLDER};
use domain::entities::{ChatMessage, Role, TaskSnapshot};
use infrastructure::relay_client::HttpRelayClient;
use shared::types::MessageId;

const EXIT_COMMANDS: &[&str] = &["/sair", "/exit", "exit", "quit"];

/// Prints assistant text as it grows. A message whose new content does not
/// extend what is already on screen is reprinted on a fresh line.
#[derive(Default)]
pub struct TerminalView {
    current: Option<MessageId>,
    printed: String,
    thinking: bool,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the line of the message being printed, if any.
    pub fn end_reply(&mut self) {
        if self.thinking {
            clear_line();
        } else if !self.printed.is_empty() {
            println!();
        }
        self.current = None;
        self.printed.clear();
        self.thinking = false;
    }

    fn start(&mut self, id: MessageId) {
        if self.current != Some(id) {
            self.end_reply();
            self.current = Some(id);
            print!("{} ", "Assistente:".cyan().bold());
        }
    }
}

impl ChatView for TerminalView {
    fn render(&mut self, message: &ChatMessage) {
        if message.role == Role::User || message.content.is_empty() {
            return;
        }
        self.start(message.id);

        if message.loading && message.content == THINKING_PLACEHOLDER {
            print!("{}", THINKING_PLACEHOLDER.dimmed());
            self.thinking = true;
        } else {
            if self.thinking {
                clear_line();
                print!("{} ", "Assistente:".cyan().bold());
                self.thinking = false;
            }
            match message.content.strip_prefix(self.printed.as_str()) {
                Some(suffix) => print!("{}", suffix),
                None => print!("\n{}", message.content),
            }
            self.printed.clone_from(&message.content);
        }
        let _ = io::stdout().flush();
    }
}

fn clear_line() {
    print!("\r\x1b[2K");
    let _ = io::stdout().flush();
}

/// Next question from `lines`. `None` on EOF, an exit command or `interrupt`
/// firing while waiting for input.
async fn next_question<R, F>(lines: &mut Lines<R>, interrupt: F) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    F: Future,
{
    let line = tokio::select! {
        line = lines.next_line() => line?,
        _ = interrupt => None,
    };
    Ok(line.filter(|l| !EXIT_COMMANDS.contains(&l.trim())))
}

/// Read questions from stdin until EOF, an exit command or Ctrl-C at the
/// prompt. Ctrl-C during a reply abandons that reply only.
pub async fn run(relay_url: &str, tasks: Vec<TaskSnapshot>) -> Result<()> {
    let transport = Arc::new(HttpRelayClient::new(relay_url)?);
    let mut controller = ChatController::new(transport);
    let mut view = TerminalView::new();

    tracing::debug!(relay = %relay_url, conversation_id = %controller.session().conversation_id(), "Chat session started");

    if let Some(greeting) = controller.session().messages().first() {
        view.render(greeting);
        view.end_reply();
    }
    println!(
        "{}",
        format!("{} tarefas carregadas. Digite /sair para encerrar.", tasks.len()).dimmed()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", "Você:".green().bold());
        io::stdout().flush()?;

        let Some(line) = next_question(&mut lines, tokio::signal::ctrl_c()).await? else {
            println!();
            break;
        };

        let finished = tokio::select! {
            _ = controller.send(&line, tasks.clone(), &mut view) => true,
            _ = tokio::signal::ctrl_c() => false,
        };
        view.end_reply();

        if !finished {
            controller.abandon_pending(&mut view);
            view.end_reply();
        }
    }

    Ok(())
}
