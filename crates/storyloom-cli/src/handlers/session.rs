//! Interactive story session.
//!
//! Opens a story (new or saved), then interleaves terminal input with
//! playback events until the user quits, stdin closes or Ctrl-C aborts.

use std::ops::ControlFlow;

use storyloom_core::VoiceCapture;
use storyloom_session::{SessionController, SessionError, SessionEvent};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::input::{HELP, Input, parse_input};
use crate::presentation::{Renderer, improvisation_prompt};

type StdinLines = Lines<BufReader<Stdin>>;

/// How the session begins.
#[derive(Debug, Clone)]
pub enum Opening {
    New {
        theme: String,
        improvisations: Vec<String>,
    },
    Resume {
        story_id: String,
    },
}

/// Run one story session to the end.
pub async fn execute(ctx: &CliContext, opening: Opening) -> Result<(), CliError> {
    let (mut session, events) = SessionController::new(&ctx.session_config(), ctx.ports());
    let renderer = tokio::spawn(render_events(events));

    let abort = session.abort_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; aborting session");
            abort.abort();
        }
    });

    if !ctx.audio {
        println!("Narration is off; story turns will be shown as text only.");
    }

    let result = run(ctx, &mut session, opening).await;

    session.abort();
    drop(session);
    interrupt.abort();
    if let Err(e) = renderer.await {
        debug!(error = %e, "Renderer task ended abnormally");
    }

    result
}

async fn run(
    ctx: &CliContext,
    session: &mut SessionController,
    opening: Opening,
) -> Result<(), CliError> {
    let opened = match opening {
        Opening::New {
            theme,
            improvisations,
        } => session.start(&theme, improvisations).await,
        Opening::Resume { story_id } => {
            session
                .resume_existing(ctx.client.as_ref(), &story_id)
                .await
        }
    };
    match opened {
        Ok(()) => {}
        Err(SessionError::Aborted) => return Ok(()),
        Err(e) => return Err(e.into()),
    }
    info!(session = session.session_id(), "Story opened");
    println!("{HELP}");
    prompt(session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut voice = ctx.voice_capture();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(());
                };
                if on_input(session, voice.as_mut(), &mut lines, parse_input(&line))
                    .await
                    .is_break()
                {
                    return Ok(());
                }
            }
            event = session.next_playback_event() => {
                let Some(event) = event else {
                    return Ok(());
                };
                session.handle_playback_event(event);
            }
        }
    }
}

async fn on_input(
    session: &mut SessionController,
    voice: &mut dyn VoiceCapture,
    lines: &mut StdinLines,
    input: Input,
) -> ControlFlow<()> {
    match input {
        Input::Quit => ControlFlow::Break(()),
        Input::Empty => ControlFlow::Continue(()),
        Input::Help => {
            println!("{HELP}");
            ControlFlow::Continue(())
        }
        Input::Unknown(command) => {
            eprintln!("Unknown command {command}; /help lists commands");
            ControlFlow::Continue(())
        }
        Input::Pause => outcome(session.pause()),
        Input::Resume => outcome(session.resume().await),
        Input::Improvise(text) => improvise(session, &text).await,
        Input::Voice => match dictate(voice, lines).await {
            Some(text) => improvise(session, &text).await,
            None => ControlFlow::Continue(()),
        },
    }
}

async fn improvise(session: &mut SessionController, text: &str) -> ControlFlow<()> {
    let result = session.submit_improvisation(text).await;
    if result.is_ok() {
        prompt(session);
    }
    outcome(result)
}

fn prompt(session: &SessionController) {
    let remaining = session.remaining_improvisations();
    debug!(remaining, waiting = session.waiting_for_input(), "Awaiting improvisation");
    if let Some(line) = improvisation_prompt(remaining, session.waiting_for_input()) {
        println!("{line}");
    }
}

/// Report a failed operation; only an abort ends the session.
fn outcome(result: Result<(), SessionError>) -> ControlFlow<()> {
    match result {
        Ok(()) => ControlFlow::Continue(()),
        Err(SessionError::Aborted) => ControlFlow::Break(()),
        // Already published as a session event.
        Err(SessionError::Stream(_) | SessionError::Store(_)) => ControlFlow::Continue(()),
        Err(e) => {
            eprintln!("{e}");
            ControlFlow::Continue(())
        }
    }
}

async fn dictate(voice: &mut dyn VoiceCapture, lines: &mut StdinLines) -> Option<String> {
    if !voice.supported() {
        println!("Voice input is not available here; type your improvisation instead.");
        return None;
    }
    if let Err(e) = voice.start() {
        eprintln!("{e}");
        return None;
    }
    println!("Listening… press Enter when done.");
    if let Err(e) = lines.next_line().await {
        warn!(error = %e, "Failed to read input while listening");
    }

    match voice.stop().await {
        Ok(Some(transcript)) => {
            println!("Heard: {transcript}");
            Some(transcript)
        }
        Ok(None) => {
            println!("Nothing was heard.");
            None
        }
        Err(e) => {
            eprintln!("{e}");
            None
        }
    }
}

async fn render_events(mut events: UnboundedReceiver<SessionEvent>) {
    let mut renderer = Renderer::new();
    while let Some(event) = events.recv().await {
        if let Err(e) = renderer.render(&event) {
            debug!(error = %e, "Failed to render session event");
        }
    }
}
