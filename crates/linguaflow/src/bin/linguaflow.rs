use std::{
    io::{self, IsTerminal, Write},
    path::PathBuf,
    process,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, CommandFactory, FromArgMatches, Parser, Subcommand, ValueEnum};
use dialoguer::{Password, theme::ColorfulTheme};
use linguaflow::cli_i18n as i18n;
use linguaflow::controller::{
    Confirmation, DeleteOutcome, FixedAnswer, RateOutcome, SaveOutcome, SuggestOutcome,
    TranslateOutcome,
};
use linguaflow::config::parse_api_url;
use linguaflow::paths::expand_tilde;
use linguaflow::render::{Card, DeleteAction, render_cards_text, render_page_html};
use linguaflow::{
    ClientSettings, Controller, Layout, PanelView, Prompt, Rating, Theme, View, default_root,
};
use tracing::debug;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Layer as _, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV_KEY: &str = "LINGUAFLOW_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "linguaflow",
    version,
    about = "i18n:cli.about",
    disable_version_flag = true
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "version",
        global = true,
        action = ArgAction::SetTrue,
        help = "i18n:cli.version_flag_help"
    )]
    show_version: bool,
    #[arg(long, global = true, value_name = "DIR", help = "i18n:cli.root_help")]
    root: Option<PathBuf>,
    #[arg(long = "api-url", global = true, value_name = "URL", help = "i18n:cli.api_url_help")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "i18n:command.login.about")]
    Login(LoginArgs),
    #[command(about = "i18n:command.register.about")]
    Register(RegisterArgs),
    #[command(about = "i18n:command.guest.about")]
    Guest,
    #[command(about = "i18n:command.logout.about")]
    Logout,
    #[command(about = "i18n:command.status.about")]
    Status,
    #[command(about = "i18n:command.translate.about")]
    Translate(TranslateArgs),
    #[command(about = "i18n:command.save.about")]
    Save,
    #[command(about = "i18n:command.like.about")]
    Like,
    #[command(about = "i18n:command.dislike.about")]
    Dislike,
    #[command(about = "i18n:command.suggest.about")]
    Suggest(SuggestArgs),
    #[command(about = "i18n:command.history.about")]
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
    #[command(about = "i18n:command.saved.about")]
    Saved {
        #[command(subcommand)]
        command: SavedCommand,
    },
    #[command(about = "i18n:command.theme.about")]
    Theme {
        #[command(subcommand)]
        command: Option<ThemeCommand>,
    },
    #[command(about = "i18n:command.config.about")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCommand {
    #[command(about = "i18n:command.history.list.about")]
    List(HistoryListArgs),
    #[command(about = "i18n:command.history.open.about")]
    Open(IdArgs),
    #[command(about = "i18n:command.history.delete.about")]
    Delete(DeleteArgs),
    #[command(about = "i18n:command.history.clear.about")]
    Clear(ClearArgs),
}

#[derive(Subcommand, Debug)]
enum SavedCommand {
    #[command(about = "i18n:command.saved.list.about")]
    List(SavedListArgs),
    #[command(about = "i18n:command.saved.delete.about")]
    Delete(DeleteArgs),
    #[command(about = "i18n:command.saved.clear.about")]
    Clear(ClearArgs),
}

#[derive(Subcommand, Debug)]
enum ThemeCommand {
    #[command(about = "i18n:command.theme.show.about")]
    Show,
    #[command(about = "i18n:command.theme.toggle.about")]
    Toggle,
    #[command(about = "i18n:command.theme.set.about")]
    Set {
        #[arg(value_name = "THEME", help = "i18n:args.theme")]
        theme: Theme,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    #[command(about = "i18n:command.config.show.about")]
    Show,
    #[command(about = "i18n:command.config.set_api_url.about")]
    SetApiUrl {
        #[arg(value_name = "URL", help = "i18n:args.url")]
        url: String,
    },
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(value_name = "USER", help = "i18n:args.username")]
    username: String,
    #[arg(long, value_name = "PASSWORD", help = "i18n:args.password")]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(value_name = "USER", help = "i18n:args.username")]
    username: String,
    #[arg(long, value_name = "PASSWORD", help = "i18n:args.password")]
    password: Option<String>,
    #[arg(long = "confirm", value_name = "PASSWORD", help = "i18n:args.confirm_password")]
    confirm_password: Option<String>,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    #[arg(value_name = "TEXT", num_args = 1.., required = true, help = "i18n:args.translate.text")]
    text: Vec<String>,
    #[arg(long = "from", value_name = "LANG", help = "i18n:args.translate.from")]
    from: Option<String>,
    #[arg(long = "to", value_name = "LANG", help = "i18n:args.translate.to")]
    to: Option<String>,
}

#[derive(Args, Debug)]
struct SuggestArgs {
    #[arg(value_name = "TEXT", help = "i18n:args.suggest.text")]
    text: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Html,
}

#[derive(Args, Debug)]
struct HistoryListArgs {
    #[arg(long, value_name = "TERM", help = "i18n:args.search")]
    search: Option<String>,
    #[arg(long, help = "i18n:args.full")]
    full: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, help = "i18n:args.format")]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct SavedListArgs {
    #[arg(long, value_name = "TERM", help = "i18n:args.search")]
    search: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, help = "i18n:args.format")]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct IdArgs {
    #[arg(value_name = "ID", help = "i18n:args.id")]
    id: i64,
}

#[derive(Args, Debug)]
struct DeleteArgs {
    #[arg(value_name = "ID", help = "i18n:args.id")]
    id: i64,
    #[arg(short = 'y', long = "yes", help = "i18n:args.yes")]
    yes: bool,
}

#[derive(Args, Debug)]
struct ClearArgs {
    #[arg(short = 'y', long = "yes", help = "i18n:args.yes")]
    yes: bool,
}

/// Confirmation read from the terminal.
struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&self, question: Confirmation) -> Result<bool> {
        let messages = i18n::messages();
        print!("{}", messages.confirm_prompt(question));
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let answer = input.trim().to_ascii_lowercase();
        Ok(matches!(answer.as_str(), "y" | "yes"))
    }
}

#[tokio::main]
async fn main() {
    let messages = i18n::messages();
    let command = i18n::localize_command(Cli::command(), messages);

    let mut matches = command.get_matches();
    let cli = Cli::from_arg_matches_mut(&mut matches).unwrap_or_else(|err| err.exit());

    if cli.show_version {
        if let Some(version) = Cli::command().get_version() {
            println!("{version}");
        }
        return;
    }

    if let Err(err) = run(cli).await {
        let rendered = messages.render_anyhow(&err);
        eprintln!("{} {}", messages.error_prefix(), rendered);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let layout = resolve_layout(cli.root.clone())?;
    layout.ensure()?;
    let _guard = init_tracing(&layout)?;
    let api_url = cli.api_url.as_deref();

    // `config` must stay usable when the stored backend URL is broken.
    if let Command::Config { command } = cli.command {
        let settings = ClientSettings::read(layout.settings_path())?;
        return handle_config(&layout, settings, api_url, command);
    }

    let settings = ClientSettings::load(layout.settings_path())?;
    match cli.command {
        Command::Theme { command } => handle_theme(&layout, settings, command),
        other => {
            let mut controller = Controller::open(&layout, &settings, api_url)?;
            handle_client_command(&mut controller, &settings, other).await
        }
    }
}

fn resolve_layout(root_override: Option<PathBuf>) -> Result<Layout> {
    let root = match root_override {
        Some(path) => expand_tilde(path)?,
        None => default_root()?,
    };
    Ok(Layout::new(root))
}

fn init_tracing(layout: &Layout) -> Result<WorkerGuard> {
    let stderr_filter =
        EnvFilter::try_from_env(LOG_ENV_KEY).unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(stderr_filter);

    let file_appender = rolling::daily(layout.logs_dir(), "linguaflow.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .with_writer(file_writer)
        .with_filter(EnvFilter::new("linguaflow=debug"));

    tracing_subscriber::registry().with(stderr_layer).with(file_layer).init();

    Ok(guard)
}

async fn handle_client_command(
    controller: &mut Controller,
    settings: &ClientSettings,
    command: Command,
) -> Result<()> {
    let messages = i18n::messages();
    match command {
        Command::Login(args) => {
            let password = match args.password {
                Some(password) => password,
                None => read_password(messages.password_prompt())?,
            };
            controller.login(&args.username, &password).await?;
            println!("{}", messages.logged_in(&args.username));
        }
        Command::Register(args) => {
            let password = match args.password {
                Some(password) => password,
                None => read_password(messages.password_prompt())?,
            };
            let confirm_password = match args.confirm_password {
                Some(confirm) => confirm,
                None => read_password(messages.confirm_password_prompt())?,
            };
            controller.register(&args.username, &password, &confirm_password).await?;
            println!("{}", messages.registered(&args.username));
        }
        Command::Guest => {
            controller.continue_as_guest()?;
            println!("{}", messages.guest_mode());
        }
        Command::Logout => {
            controller.logout()?;
            println!("{}", messages.logged_out());
        }
        Command::Status => print_status(controller),
        Command::Translate(args) => handle_translate(controller, args).await?,
        Command::Save => match controller.toggle_save().await? {
            SaveOutcome::NothingToSave => println!("{}", messages.nothing_selected()),
            SaveOutcome::Saved(_) => println!("{}", messages.saved_default()),
            SaveOutcome::Unsaved { .. } => println!("{}", messages.unsaved_default()),
        },
        Command::Like => handle_rate(controller, Rating::Like).await?,
        Command::Dislike => handle_rate(controller, Rating::Dislike).await?,
        Command::Suggest(args) => {
            let suggestion = match args.text {
                Some(text) => text,
                None if !controller.is_authenticated() || controller.panel().input.is_empty() => {
                    String::new()
                }
                None => read_line(messages.suggestion_prompt())?,
            };
            match controller.suggest(&suggestion).await? {
                SuggestOutcome::NothingToSuggest => println!("{}", messages.nothing_selected()),
                SuggestOutcome::Cancelled => println!("{}", messages.cancelled()),
                SuggestOutcome::Submitted { message } => {
                    println!("{}", message.as_deref().unwrap_or(messages.suggestion_default()))
                }
            }
        }
        Command::History { command } => handle_history(controller, settings, command).await?,
        Command::Saved { command } => handle_saved(controller, settings, command).await?,
        Command::Theme { .. } | Command::Config { .. } => {}
    }
    Ok(())
}

fn print_status(controller: &Controller) {
    let messages = i18n::messages();
    let panel = controller.panel();
    let view = match controller.view() {
        View::Entry => "entry",
        View::Translate => "translate",
    };
    println!(
        "{}",
        messages.status_lines(controller.is_authenticated(), view, controller.api().base_url().as_str())
    );
    println!("{}", messages.translate_box(&panel.source_lang, &panel.target_lang));
    if !panel.input.is_empty() {
        println!();
        println!("{}", panel.input);
        println!("{}", panel.output);
        let rating = panel.status.rating.map(|rating| rating.to_string());
        println!(
            "{}",
            messages.indicators(panel.status.saved, rating.as_deref(), panel.status.suggested)
        );
    }
}

async fn handle_translate(controller: &mut Controller, args: TranslateArgs) -> Result<()> {
    let messages = i18n::messages();
    if let Some(from) = args.from.as_deref() {
        controller.set_source_lang(from)?;
    }
    if let Some(to) = args.to.as_deref() {
        controller.set_target_lang(to)?;
    }

    let text = args.text.join(" ");
    if text.trim().is_empty() {
        println!("{}", messages.nothing_to_translate());
        return Ok(());
    }

    eprintln!("{}", messages.translating());
    match controller.translate(&text).await? {
        TranslateOutcome::Empty => println!("{}", messages.nothing_to_translate()),
        TranslateOutcome::Translated { translated, history } => {
            if let Some(history) = history {
                debug!(records = history.len(), "history reloaded");
            }
            println!("{translated}");
        }
        TranslateOutcome::Failed { message } => println!("{message}"),
    }
    Ok(())
}

async fn handle_rate(controller: &mut Controller, rating: Rating) -> Result<()> {
    let messages = i18n::messages();
    match controller.rate(rating).await? {
        RateOutcome::NothingToRate => println!("{}", messages.nothing_selected()),
        RateOutcome::Rated { message, .. } => {
            println!("{}", message.as_deref().unwrap_or(messages.rating_default()))
        }
        RateOutcome::Cleared { rating } => {
            println!("{}", messages.rating_cleared(&rating.to_string()))
        }
    }
    Ok(())
}

async fn handle_history(
    controller: &mut Controller,
    settings: &ClientSettings,
    command: HistoryCommand,
) -> Result<()> {
    let messages = i18n::messages();
    match command {
        HistoryCommand::List(args) => {
            let search = args.search.as_deref();
            if args.full {
                let PanelView::Items(entries) = controller.full_history(search).await? else {
                    println!("{}", messages.panel_login_required());
                    return Ok(());
                };
                let cards: Vec<_> = entries.iter().map(Card::from_entry).collect();
                print_cards(&cards, DeleteAction::History, settings.theme, args.format, false);
            } else {
                let PanelView::Items(items) = controller.history(search).await? else {
                    println!("{}", messages.panel_login_required());
                    return Ok(());
                };
                let cards: Vec<_> = items
                    .iter()
                    .map(|item| Card::from_history(item, item.is_saved.unwrap_or(false)))
                    .collect();
                print_cards(&cards, DeleteAction::History, settings.theme, args.format, false);
            }
        }
        HistoryCommand::Open(args) => {
            let item = controller.fill_from_history(args.id).await?;
            println!("{}", messages.history_opened(item.id));
            print_status(controller);
        }
        HistoryCommand::Delete(args) => {
            let outcome = controller.delete_history_item(args.id, prompt_for(args.yes)).await?;
            print_delete_outcome(outcome, messages.item_deleted_default());
        }
        HistoryCommand::Clear(args) => {
            let outcome = controller.clear_history(prompt_for(args.yes)).await?;
            print_delete_outcome(outcome, messages.history_cleared_default());
        }
    }
    Ok(())
}

async fn handle_saved(
    controller: &mut Controller,
    settings: &ClientSettings,
    command: SavedCommand,
) -> Result<()> {
    let messages = i18n::messages();
    match command {
        SavedCommand::List(args) => {
            let PanelView::Items(items) = controller.saved(args.search.as_deref()).await? else {
                println!("{}", messages.panel_login_required());
                return Ok(());
            };
            let cards: Vec<_> = items.iter().map(Card::from_saved).collect();
            print_cards(&cards, DeleteAction::Saved, settings.theme, args.format, true);
        }
        SavedCommand::Delete(args) => {
            let outcome = controller.delete_saved_item(args.id, prompt_for(args.yes)).await?;
            print_delete_outcome(outcome, messages.item_deleted_default());
        }
        SavedCommand::Clear(args) => {
            let outcome = controller.clear_saved(prompt_for(args.yes)).await?;
            print_delete_outcome(outcome, messages.saved_cleared_default());
        }
    }
    Ok(())
}

static ASSUME_YES: FixedAnswer = FixedAnswer(true);
static STDIN_PROMPT: StdinPrompt = StdinPrompt;

fn prompt_for(yes: bool) -> &'static dyn Prompt {
    if yes { &ASSUME_YES } else { &STDIN_PROMPT }
}

fn print_delete_outcome(outcome: DeleteOutcome, fallback: &str) {
    let messages = i18n::messages();
    match outcome {
        DeleteOutcome::Cancelled => println!("{}", messages.cancelled()),
        DeleteOutcome::Deleted { message, history, saved } => {
            debug!(history = history.len(), saved = saved.len(), "panels refreshed");
            println!("{}", message.as_deref().unwrap_or(fallback));
        }
    }
}

fn print_cards(
    cards: &[Card<'_>],
    delete_action: DeleteAction,
    theme: Theme,
    format: OutputFormat,
    saved_panel: bool,
) {
    let messages = i18n::messages();
    let (title, empty) = if saved_panel {
        (messages.saved_title(), messages.no_saved())
    } else {
        (messages.history_title(), messages.no_history())
    };
    match format {
        OutputFormat::Text => print!("{}", render_cards_text(cards, empty)),
        OutputFormat::Html => print!("{}", render_page_html(title, cards, delete_action, theme, empty)),
    }
}

fn handle_theme(
    layout: &Layout,
    mut settings: ClientSettings,
    command: Option<ThemeCommand>,
) -> Result<()> {
    let messages = i18n::messages();
    match command.unwrap_or(ThemeCommand::Show) {
        ThemeCommand::Show => println!("{}", messages.theme_current(settings.theme.as_str())),
        ThemeCommand::Toggle => {
            settings.theme = settings.theme.toggled();
            settings.save(layout.settings_path())?;
            println!("{}", messages.theme_set(settings.theme.as_str()));
        }
        ThemeCommand::Set { theme } => {
            settings.theme = theme;
            settings.save(layout.settings_path())?;
            println!("{}", messages.theme_set(settings.theme.as_str()));
        }
    }
    Ok(())
}

fn handle_config(
    layout: &Layout,
    mut settings: ClientSettings,
    api_url: Option<&str>,
    command: ConfigCommand,
) -> Result<()> {
    let messages = i18n::messages();
    match command {
        ConfigCommand::Show => {
            print!("{}", settings.to_toml_string()?);
            let effective = settings.resolve_api_url(api_url)?;
            println!("# effective api_url = \"{effective}\"");
        }
        ConfigCommand::SetApiUrl { url } => {
            let parsed = parse_api_url(&url)?;
            settings.api_url = url.trim().to_string();
            settings.save(layout.settings_path())?;
            println!("{}", messages.api_url_set(parsed.as_str()));
        }
    }
    Ok(())
}

/// Read a password without echoing it; piped input is read as a plain line.
fn read_password(prompt: &str) -> Result<String> {
    if !io::stdin().is_terminal() {
        return read_line(prompt);
    }
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt.trim_end_matches([' ', ':']))
        .allow_empty_password(true)
        .interact()
        .context("failed to read password")
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input).context("failed to read from stdin")?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}
