use std::io::Write;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::client::{Endpoints, HotdealApi, HttpClient, DEFAULT_PER_PAGE};
use crate::config::{self, ConfigFile};
use crate::controller::{toggle_sources, AiSearchController, DealListController, LoadOutcome};
use crate::model::{SourceCatalog, ALL_SOURCES};
use crate::output::{self, OutputFormat};
use crate::view::widgets::CardLayout;
use crate::view::{Action, View};

pub const DEFAULT_URL: &str = "http://localhost:8000/";

const SESSION_HELP: &str = "commands: n/next, p/prev, <page number>, s <source>, ? <query>, t (toggle sources), r (reload), h (help), q (quit)";

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub url: String,
    pub source: String,
    pub page: u32,
    pub per_page: u32,
    pub timeout: Option<Duration>,
    pub layout: CardLayout,
    pub ask: Option<String>,
    pub interactive: bool,
    pub output_path: Option<String>,
    pub output_format: OutputFormat,
    pub no_color: bool,
    pub verbose: u8,
    pub sources: SourceCatalog,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let url = args
        .url
        .or(cfg.url.clone())
        .unwrap_or_else(|| DEFAULT_URL.to_string());
    Endpoints::new(&url).map_err(|e| format!("invalid backend URL '{url}': {e}"))?;

    let source = args
        .source
        .or(cfg.source.clone())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| ALL_SOURCES.to_string());

    let per_page = args.per_page.or(cfg.per_page).unwrap_or(DEFAULT_PER_PAGE);
    if per_page == 0 {
        return Err("invalid per_page in config, expected positive integer".to_string());
    }

    let layout = if args.compact {
        CardLayout::Compact
    } else {
        match cfg.layout.as_deref() {
            Some(raw) => CardLayout::parse(raw)
                .ok_or_else(|| format!("invalid layout '{raw}', expected full or compact"))?,
            None => CardLayout::Full,
        }
    };

    let output_path = args.output.or(cfg.output.clone());
    let output_format = match args.output_format.or(cfg.output_format.clone()) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}'"))?,
        None => output_path
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    let timeout = args.timeout.or(cfg.timeout).map(Duration::from_secs);
    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    Ok(RunConfig {
        url,
        source,
        page: args.page.unwrap_or(1),
        per_page,
        timeout,
        layout,
        ask: args.ask,
        interactive: args.interactive,
        output_path,
        output_format,
        no_color,
        verbose: args.verbose,
        sources: cfg.source_catalog(),
    })
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Next,
    Prev,
    Page(u32),
    Source(String),
    Ask(String),
    Toggle,
    Reload,
    Help,
    Quit,
    Unknown(String),
}

pub(crate) fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if let Some(query) = line.strip_prefix('?') {
        return Command::Ask(query.to_string());
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    match head.to_lowercase().as_str() {
        "n" | "next" => Command::Next,
        "p" | "prev" | "previous" => Command::Prev,
        "s" | "source" if !rest.is_empty() => Command::Source(rest.to_string()),
        "ask" => Command::Ask(rest.to_string()),
        "t" | "toggle" => Command::Toggle,
        "r" | "reload" => Command::Reload,
        "h" | "help" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        other => match other.parse::<u32>() {
            Ok(page) if page > 0 && rest.is_empty() => Command::Page(page),
            _ => Command::Unknown(line.to_string()),
        },
    }
}

/// Controllers plus the view they draw into. Activated controls come back
/// through the view's listener as actions on `actions`.
pub(crate) struct Session<A> {
    pub(crate) deals: DealListController<A>,
    pub(crate) search: AiSearchController<A>,
    pub(crate) view: View,
    actions: mpsc::UnboundedReceiver<Action>,
}

impl<A: HotdealApi> Session<A> {
    pub(crate) fn new(deals: DealListController<A>, search: AiSearchController<A>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Action>();
        let mut view = View::new();
        view.subscribe(move |action| {
            if tx.send(action.clone()).is_err() {
                log::warn!("session closed, dropping {action:?}");
            }
        });
        Self {
            deals,
            search,
            view,
            actions: rx,
        }
    }

    pub(crate) async fn start(&mut self, source: &str, page: u32) -> LoadOutcome {
        self.deals.render_filters(&mut self.view, source);
        self.deals.load_deals(&mut self.view, source, page).await
    }

    /// Runs every action queued by clicks so far.
    pub(crate) async fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(action) = self.actions.try_recv() {
            handled += 1;
            match action {
                Action::ToggleSources => {
                    toggle_sources(&mut self.view);
                }
                other => {
                    self.deals.handle(&mut self.view, &other).await;
                }
            }
        }
        handled
    }

    async fn click(&mut self, action: Action, missing: &str) {
        if self.view.click(&action) {
            self.drain().await;
        } else {
            self.view.alert(missing.to_string());
        }
    }

    /// Executes one session command; returns false when the session should end.
    pub(crate) async fn execute(&mut self, command: Command) -> bool {
        let current = self.deals.state().current_page;
        match command {
            Command::Next => {
                let missing = "there is no next page";
                match current.checked_add(1) {
                    Some(target) => self.click(Action::LoadPage(target), missing).await,
                    None => self.view.alert(missing),
                }
            }
            Command::Prev => {
                let target = current.saturating_sub(1).max(1);
                let missing = "there is no previous page";
                if current <= 1 {
                    self.view.alert(missing);
                } else {
                    self.click(Action::LoadPage(target), missing).await
                }
            }
            Command::Page(page) => {
                let missing = format!("page {page} is not in the pagination bar");
                self.click(Action::LoadPage(page), &missing).await
            }
            Command::Source(source) => {
                let missing = format!("unknown source '{source}'");
                self.click(Action::SelectSource(source), &missing).await
            }
            Command::Toggle => {
                self.click(Action::ToggleSources, "no AI sources to toggle").await
            }
            Command::Ask(query) => {
                self.search.run_ai_search(&mut self.view, &query).await;
            }
            Command::Reload => {
                let source = self.deals.state().current_source.clone();
                self.deals.load_deals(&mut self.view, &source, current).await;
            }
            Command::Help => self.view.alert(SESSION_HELP),
            Command::Quit => return false,
            Command::Unknown(raw) => self.view.alert(format!("unknown command '{raw}'")),
        }
        true
    }
}

fn print_view(view: &mut View) {
    print!("{}", output::render_text(view));
    view.take_prompt();
}

async fn write_output(path: &str, rendered: &[u8]) -> Result<(), String> {
    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|e| format!("failed to open output file: {e}"))?;
    outfile
        .write_all(rendered)
        .await
        .map_err(|_| "failed to write output file".to_string())
}

async fn emit(run: &RunConfig, view: &mut View) -> Result<(), String> {
    let rendered = output::render(view, run.output_format);
    match run.output_path.as_deref() {
        Some(path) => {
            write_output(path, &rendered).await?;
            format_kv_line("Output", path);
        }
        None => print!("{}", String::from_utf8_lossy(&rendered)),
    }
    view.take_prompt();
    Ok(())
}

async fn run_interactive<A: HotdealApi>(session: &mut Session<A>) -> Result<(), String> {
    println!("{}", SESSION_HELP.dimmed());
    print_view(&mut session.view);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    loop {
        print!("{} ", ">".bold().green());
        let _ = std::io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return Err(format!("failed to read command: {e}")),
        };
        if line.trim().is_empty() {
            continue;
        }
        if !session.execute(parse_command(&line)).await {
            break;
        }
        print_view(&mut session.view);
    }
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    let endpoints = Endpoints::new(&run.url).map_err(|e| e.to_string())?;
    let client = HttpClient::new(endpoints.clone(), run.timeout).map_err(|e| e.to_string())?;

    log::info!(
        "backend={} source={} page={} per_page={}",
        endpoints.base(),
        run.source,
        run.page,
        run.per_page
    );

    let deals = DealListController::new(client.clone(), endpoints, run.sources.clone())
        .per_page(run.per_page)
        .layout(run.layout);
    let search = AiSearchController::new(client);
    let mut session = Session::new(deals, search);

    if let Some(query) = run.ask.as_deref() {
        session.search.run_ai_search(&mut session.view, query).await;
        return emit(&run, &mut session.view).await;
    }

    let outcome = session.start(&run.source, run.page).await;
    log::debug!("initial load: {outcome:?}");

    if run.interactive {
        run_interactive(&mut session).await?;
        if run.output_path.is_some() {
            emit(&run, &mut session.view).await?;
        }
        return Ok(());
    }

    emit(&run, &mut session.view).await
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{e}");
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_logging(args.verbose);

    let config_path = args
        .config
        .as_deref()
        .map(config::expand_tilde)
        .or_else(config::default_config_path);

    if args.init_config {
        let path = config_path
            .as_ref()
            .ok_or_else(|| "cannot locate a home directory for the config file".to_string())?;
        if config::ensure_default_config_file(path)? {
            log::info!("wrote default config {}", path.display());
            format_kv_line("Config", &path.display().to_string());
        }
    }

    let cfg = match config_path {
        Some(path) => config::load_config(&path, args.config.is_none())?,
        None => ConfigFile::default(),
    };

    let run = build_run_config(args, cfg)?;
    log::debug!("run config: {run:?}");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
