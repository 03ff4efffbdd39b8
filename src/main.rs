use clap::{Parser, Subcommand};
use colored::*;
use domain::creation::{FollowUp, FollowUpSettings, TranscriptCreator};
use domain::editor::{EditorPhase, TranscriptEditor};
use domain::error::{DomainErrorKind, Error, InternalErrorKind};
use domain::gateway::{transcript_service::TranscriptServiceClient, TranscriptGateway};
use domain::generation::Resolution;
use domain::language::Language;
use domain::store::TranscriptStore;
use domain::Id;
use events::EventPublisher;
use log::*;
use service::{config::Config, logging::Logger, AppState};
use std::process::ExitCode;
use std::sync::Arc;

mod console;

#[derive(Parser)]
#[command(name = "transcript_admin", version)]
#[command(about = "Administer the transcripts held by a transcript service")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every transcript
    List {
        /// Only show transcripts whose video URL contains this text (case-insensitive)
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Transcribe the audio of a video
    Submit {
        url: String,

        /// Spoken language, e.g. en, ta-IN, hi-IN
        #[arg(long, short = 'L', default_value = "en")]
        language: String,

        /// Do not wait for a transcript the service only queued
        #[arg(long)]
        no_follow: bool,
    },
    /// Print one transcript
    Show { id: String },
    /// Replace the text of a completed transcript
    Edit {
        id: String,

        #[arg(long)]
        text: String,
    },
    /// Delete a transcript
    Delete { id: String },
    /// Print the download link of a transcript's text
    Download { id: String },
    /// Print the link to a transcript's audio
    Audio { id: String },
    /// List the languages the service transcribes
    Languages,
}

struct App {
    store: Arc<TranscriptStore>,
    editor: TranscriptEditor,
    creator: TranscriptCreator,
}

impl App {
    fn new(gateway: Arc<dyn TranscriptGateway>, settings: FollowUpSettings) -> Self {
        let presenter = EventPublisher::new().with_handler(Arc::new(console::ConsoleHandler));
        let store = Arc::new(TranscriptStore::new(gateway.clone(), presenter.clone()));
        // Editor and creator changes reach the store as refresh requests.
        let events = presenter.with_handler(store.clone());

        Self {
            store,
            editor: TranscriptEditor::new(gateway.clone(), events.clone()),
            creator: TranscriptCreator::new(gateway, events, settings),
        }
    }

    async fn run(&self, command: Command) -> Result<(), Error> {
        match command {
            Command::List { search } => self.list(search).await,
            Command::Submit {
                url,
                language,
                no_follow,
            } => self.submit(url, Language::from(language), !no_follow).await,
            Command::Show { id } => self.show(&Id::from(id)).await,
            Command::Edit { id, text } => self.edit(&Id::from(id), text).await,
            Command::Delete { id } => self.delete(&Id::from(id)).await,
            Command::Download { id } => self.store.request_download(&Id::from(id)).await.map(|_| ()),
            Command::Audio { id } => self.audio(&Id::from(id)).await,
            Command::Languages => {
                for language in Language::SUPPORTED {
                    println!("{:<6} {}", language.code(), language.label());
                }
                Ok(())
            }
        }
    }

    async fn load(&self) -> Result<(), Error> {
        if self.store.refresh().await == Resolution::Failed {
            let state = self.store.snapshot().await;
            if let Some(failure) = state.last_error {
                console::failure(failure.message());
                return Err(surfaced(failure.kind));
            }
        }
        Ok(())
    }

    async fn list(&self, search: Option<String>) -> Result<(), Error> {
        self.load().await?;
        if let Some(search) = search {
            self.store.set_search_query(search).await;
        }

        let visible = self.store.visible_records().await;
        if visible.is_empty() {
            println!("{}", "No transcripts found.".dimmed());
        }
        for record in &visible {
            println!("{}", console::record_line(record));
        }
        Ok(())
    }

    async fn submit(&self, url: String, language: Language, follow: bool) -> Result<(), Error> {
        console::progress(&format!("Transcribing {url} ({})...", language.label()));

        let result = self.creator.submit(url, language).await;
        let state = self.creator.snapshot().await;
        let submission = match result {
            Ok(submission) => submission,
            Err(e) => {
                if let Some(message) = &state.message {
                    console::failure(message);
                }
                return Err(e);
            }
        };

        if let Some(message) = &state.message {
            console::success(&format!("{message} (id {})", submission.id));
        }
        if let Some(preview) = &state.preview {
            println!("{preview}");
        }

        if follow && !submission.is_settled() {
            console::progress("Waiting for the service to finish...");
            match self.creator.follow_up(&submission).await? {
                FollowUp::Settled(status) => {
                    let state = self.creator.snapshot().await;
                    console::success(&format!("Transcript {} {status}", submission.id));
                    if let Some(preview) = &state.preview {
                        println!("{preview}");
                    }
                }
                FollowUp::Pending(status) => {
                    println!(
                        "Transcript {} is still {status}; check again with `show {}`",
                        submission.id, submission.id
                    );
                }
                FollowUp::Superseded => {}
            }
        }
        Ok(())
    }

    async fn show(&self, id: &Id) -> Result<(), Error> {
        self.editor.open_id(id).await;
        let state = self.editor.snapshot().await;

        match (&state.phase, &state.record) {
            (EditorPhase::Ready, Some(record)) => {
                println!("{}", console::record_line(record));
                if let Some(audio_file) = &record.audio_file {
                    println!("audio: {audio_file}");
                }
                println!("{} words", state.word_count);
                println!();
                println!("{}", state.text);
                Ok(())
            }
            _ => Err(editor_failure(state.error_message(), state.last_error.clone())),
        }
    }

    async fn edit(&self, id: &Id, text: String) -> Result<(), Error> {
        self.editor.open_id(id).await;
        let state = self.editor.snapshot().await;
        if state.phase != EditorPhase::Ready {
            return Err(editor_failure(state.error_message(), state.last_error));
        }

        self.editor.set_text(text).await?;
        let state = self.editor.snapshot().await;
        if state.can_save() && !state.is_dirty() {
            console::success(&format!("Transcript {id} already has that text"));
            self.editor.close().await;
            return Ok(());
        }
        if let Err(e) = self.editor.save().await {
            let state = self.editor.snapshot().await;
            return Err(editor_failure(state.error_message(), Some(e.error_kind)));
        }

        console::success(&format!("Saved transcript {id}"));
        self.editor.close().await;
        Ok(())
    }

    async fn delete(&self, id: &Id) -> Result<(), Error> {
        let result = self.store.request_delete(id).await;
        if let Some(message) = self.store.error_message().await {
            console::failure(message);
        }
        result?;

        console::success(&format!("Deleted transcript {id}"));
        Ok(())
    }

    async fn audio(&self, id: &Id) -> Result<(), Error> {
        self.load().await?;
        match self.store.audio_link(id).await {
            Ok(Some(link)) => println!("{link}"),
            Ok(None) => println!("{}", "The service kept no audio for this transcript.".dimmed()),
            Err(e) => {
                console::failure(&format!("Transcript {id} not found."));
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Reports an editor failure and turns it into the command's error.
fn editor_failure(message: Option<String>, kind: Option<DomainErrorKind>) -> Error {
    if let Some(message) = message {
        console::failure(&message);
    }
    surfaced(kind.unwrap_or(DomainErrorKind::Internal(
        InternalErrorKind::Other("editor is not ready".to_string()),
    )))
}

/// Error for a failure that a controller already recorded in its state.
fn surfaced(error_kind: DomainErrorKind) -> Error {
    Error {
        source: None,
        error_kind,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    service::config::load_env_file();
    let cli = Cli::parse();

    if let Err(e) = Logger::init_logger(&cli.config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let app_state = match AppState::new(cli.config) {
        Ok(app_state) => app_state,
        Err(e) => {
            error!("Failed to build the HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let gateway = match TranscriptServiceClient::from_app_state(&app_state) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Invalid transcript service URL {}: {e}", app_state.config.base_url());
            return ExitCode::FAILURE;
        }
    };
    info!("Using transcript service at {}", gateway.base_url());

    let app = App::new(gateway, FollowUpSettings::from(&app_state.config));
    match app.run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            if e.error_kind.is_transport() {
                error!(
                    "Is the transcript service running at {}?",
                    app_state.config.base_url()
                );
            }
            ExitCode::FAILURE
        }
    }
}
