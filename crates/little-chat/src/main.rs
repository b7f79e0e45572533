//! A terminal front-end for chatting with a `little-chat` backend.

#[macro_use]
extern crate tracing;

mod config;
mod render;

use std::io::Write as _;
use std::pin::pin;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use little_chat_core::storage::FileStore;
use little_chat_core::transcript::TranscriptEvent;
use little_chat_core::{ChatSession, SessionBuilder, SubmitOutcome};
use little_chat_http_backend::{HttpBackend, HttpBackendConfigBuilder};
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::sleep;

use crate::config::Config;
use crate::render::Renderer;

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    History,
    Open(&'a str),
    Help,
    Quit,
    Message(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(command) = line.trim().strip_prefix('/') else {
            return Command::Message(line);
        };
        let (name, arg) = command
            .split_once(char::is_whitespace)
            .unwrap_or((command, ""));
        match name {
            "history" => Command::History,
            "open" => Command::Open(arg.trim()),
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => Command::Message(line),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };
    debug!("using config: {config:?}");

    let backend_config =
        HttpBackendConfigBuilder::with_base_url(config.base_url).build();
    let backend = match HttpBackend::new(backend_config) {
        Ok(backend) => backend,
        Err(err) => {
            eprintln!("failed to create the HTTP client: {err}");
            return;
        }
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let mut session = SessionBuilder::with_backend(backend)
        .with_store(FileStore::new(config.storage_path))
        .with_stream_idle_timeout(config.stream_idle_timeout)
        .on_transcript(move |event| {
            event_tx.send(event.clone()).ok();
        })
        .build();

    match session.start().await {
        Ok(identity) => {
            info!("chatting as {}", identity.client_id);
        }
        Err(err) => {
            eprintln!("failed to start the session: {err}");
            return;
        }
    }
    if let Some(err) = session.history().last_error() {
        render::warning(format_args!("failed to load history: {err}"));
    }

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let mut renderer = Renderer::default();
    let mut stdin = io::BufReader::new(io::stdin());

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line(&mut stdin).await else {
            break;
        };

        match Command::parse(&line) {
            Command::Quit => break,
            Command::Help => render::help(),
            Command::History => render::history(session.history()),
            Command::Open(arg) => match arg.parse::<usize>() {
                Ok(number) if number > 0 => {
                    if let Err(err) = session.select_history(number - 1) {
                        render::error(err);
                    }
                }
                _ => render::error("usage: /open N"),
            },
            Command::Message(text) => {
                session.set_input(text);
                submit(
                    &mut session,
                    &mut event_rx,
                    &mut renderer,
                    &progress_style,
                )
                .await;
            }
        }

        while let Ok(event) = event_rx.try_recv() {
            renderer.render(&event);
        }
    }
}

async fn submit(
    session: &mut ChatSession,
    event_rx: &mut UnboundedReceiver<TranscriptEvent>,
    renderer: &mut Renderer,
    progress_style: &ProgressStyle,
) {
    let mut progress_bar = None;
    let mut waiting = true;

    let result = {
        let mut submit = pin!(session.submit());
        loop {
            if waiting {
                progress_bar
                    .get_or_insert_with(|| {
                        let progress_bar = ProgressBar::new_spinner();
                        progress_bar.set_style(progress_style.clone());
                        progress_bar.set_message("💭 Waiting for reply...");
                        progress_bar
                    })
                    .inc(1);
            }

            let sleep = sleep(Duration::from_millis(100));
            select! {
                biased;
                Some(event) = event_rx.recv() => {
                    // Finish the progress bar before printing anything else.
                    if render::is_visible(&event) {
                        if let Some(progress_bar) = progress_bar.take() {
                            progress_bar.finish_and_clear();
                        }
                        waiting = false;
                    }
                    renderer.render(&event);
                }
                result = &mut submit => break result,
                _ = sleep => {}
            }
        }
    };

    if let Some(progress_bar) = progress_bar.take() {
        progress_bar.finish_and_clear();
    }
    while let Ok(event) = event_rx.try_recv() {
        renderer.render(&event);
    }
    renderer.end_line();

    match result {
        Ok(SubmitOutcome::Ignored | SubmitOutcome::Completed) => {}
        Ok(SubmitOutcome::Incomplete) => {
            render::warning("the reply ended before it was complete");
        }
        Err(err) => {
            error!("submit failed: {err:?}");
            render::error(err);
        }
    }
}

async fn read_line<R: AsyncBufRead + Unpin>(input: &mut R) -> Option<String> {
    let mut line = String::new();

    match input.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
