mod config;
mod dashboard;
mod gateway;
mod session;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::{Parser, Subcommand, ValueEnum};
use pba_core::{AllyType, AppView, CalendarDate, IntakeDraft, LogType, Theme};
use pba_store::Archive;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::dashboard::{Dashboard, DashboardError, LAUNCHER, ToolOutput};
use crate::gateway::{Gateway, GatewayError, LiveCallbacks, LiveEvent};
use crate::session::{IntakeOutcome, Session, Timing};

#[derive(Parser)]
#[command(name = "pba", about = "The Pre-Birth Archive: asset dossier terminal")]
struct Cli {
    /// Data directory (defaults to PBA_DATA_DIR or ~/.pre-birth-archive)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current view and asset on file
    Status,

    /// Leave the landing screen for authentication
    Uplink,

    /// Authenticate with an email and access code
    Auth {
        /// Defaults to the last email used
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        code: String,
    },

    /// Submit intake fields; completes registration once all are valid
    Intake {
        #[arg(long)]
        name: Option<String>,
        /// Date of birth, YYYY-MM-DD
        #[arg(long)]
        dob: Option<String>,
        /// Time of birth, HH:MM
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Birth certificate or ID document to scan
        #[arg(long)]
        scan: Option<PathBuf>,
        /// Discard the saved draft first
        #[arg(long)]
        clear_draft: bool,
    },

    /// End the session and return to the landing screen
    Logout,

    /// Show or change the display theme
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeArg>,
    },

    /// Erase every archive record for the asset, then log out
    Purge {
        #[arg(long)]
        yes: bool,
    },

    /// Open the live voice uplink; stdin lines are sent as text turns
    Live,

    /// Interactive dashboard console
    Console,

    #[command(flatten)]
    Dash(DashCommand),
}

#[derive(Subcommand)]
enum DashCommand {
    /// Dossier tab
    #[command(subcommand)]
    Dossier(DossierCommand),

    /// Network tab
    #[command(subcommand)]
    Network(NetworkCommand),

    /// Explore tab: location or founding intel
    Explore {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Calendar tab
    #[command(subcommand)]
    Calendar(CalendarCommand),

    /// Ops tab
    #[command(subcommand)]
    Ops(OpsCommand),

    /// Launcher tool; lists the catalog when no id is given
    Tool { id: Option<String> },

    /// Message the Handler; prints the history when no message is given
    Chat { message: Vec<String> },

    /// Speak text in the Handler voice (raw 24 kHz PCM)
    Speak {
        #[arg(required = true)]
        text: Vec<String>,
        #[arg(long, default_value = "handler.pcm")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum DossierCommand {
    /// Life path, western and earth signs
    Metrics,
    Briefing {
        #[arg(long)]
        refresh: bool,
    },
    Directive,
    Shadow,
    Portrait {
        #[arg(long)]
        refresh: bool,
        /// Write the decoded image here
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Video {
        #[arg(long)]
        refresh: bool,
    },
    /// Archetype dossier; defaults to the asset's own earth sign
    Zodiac { animal: Option<String> },
}

#[derive(Subcommand)]
enum NetworkCommand {
    /// Compatibility scan against a target
    Scan {
        name: String,
        dob: String,
        /// Save the target as an ally of this type
        #[arg(long, value_enum)]
        save: Option<AllyArg>,
    },
    List,
    Remove { id: String },
}

#[derive(Subcommand)]
enum CalendarCommand {
    Daily {
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    Yearly,
}

#[derive(Subcommand)]
enum OpsCommand {
    Missions,
    Terminal {
        #[arg(required = true)]
        command: Vec<String>,
    },
    /// File a field report for analysis
    Report {
        #[arg(long, value_enum)]
        kind: LogArg,
        #[arg(required = true)]
        content: Vec<String>,
    },
    Reports,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Toggle,
    Dark,
    Light,
}

#[derive(Clone, Copy, ValueEnum)]
enum AllyArg {
    Family,
    Friend,
    Work,
    Partner,
    Other,
}

impl From<AllyArg> for AllyType {
    fn from(arg: AllyArg) -> Self {
        match arg {
            AllyArg::Family => AllyType::Family,
            AllyArg::Friend => AllyType::Friend,
            AllyArg::Work => AllyType::Work,
            AllyArg::Partner => AllyType::Partner,
            AllyArg::Other => AllyType::Other,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LogArg {
    Lie,
    Fear,
    Clarity,
    Impact,
}

impl From<LogArg> for LogType {
    fn from(arg: LogArg) -> Self {
        match arg {
            LogArg::Lie => LogType::Lie,
            LogArg::Fear => LogType::Fear,
            LogArg::Clarity => LogType::Clarity,
            LogArg::Impact => LogType::Impact,
        }
    }
}

/// One console line, parsed without a binary name.
#[derive(Parser)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct ConsoleLine {
    #[command(subcommand)]
    command: DashCommand,
}

struct App {
    config: Config,
    archive: Arc<Archive>,
    session: Session,
}

impl App {
    fn open(cli: &Cli) -> Result<Self> {
        let data_dir = config::resolve_data_dir(cli.data_dir.as_deref());
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;
        let config = Config::load(&data_dir)?;
        let archive = Arc::new(
            Archive::open(&config.db_path()).context("failed to open archive database")?,
        );
        let session = Session::restore(archive.clone(), Timing::from_config(&config));
        Ok(Self {
            config,
            archive,
            session,
        })
    }

    fn gateway(&self) -> Result<Gateway> {
        Gateway::new(&self.config).context("failed to build model gateway")
    }

    fn dashboard(&self) -> Result<Dashboard> {
        if self.session.view() != AppView::Dashboard {
            bail!(
                "dashboard is locked (current view: {})",
                self.session.view()
            );
        }
        let Some(profile) = self.session.profile() else {
            bail!("no asset profile on file");
        };
        Ok(Dashboard::new(
            self.gateway()?,
            self.archive.clone(),
            profile.clone(),
        ))
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut app = App::open(&cli)?;

    match cli.command {
        Commands::Status => cmd_status(&app),
        Commands::Uplink => {
            let view = app.session.uplink()?;
            println!("{view}");
            Ok(())
        }
        Commands::Auth { email, code } => cmd_auth(&mut app, email, &code).await,
        Commands::Intake {
            name,
            dob,
            time,
            location,
            scan,
            clear_draft,
        } => {
            let fields = IntakeDraft {
                full_name: name.unwrap_or_default(),
                dob: dob.unwrap_or_default(),
                birth_time: time.unwrap_or_default(),
                birth_location: location.unwrap_or_default(),
            };
            cmd_intake(&mut app, fields, scan.as_deref(), clear_draft).await
        }
        Commands::Logout => {
            let view = app.session.logout()?;
            println!("{view}");
            Ok(())
        }
        Commands::Theme { mode } => cmd_theme(&app, mode),
        Commands::Purge { yes } => {
            if !yes {
                bail!("purge erases every record for this asset; pass --yes to confirm");
            }
            let view = app.session.purge()?;
            println!("ARCHIVE PURGED. {view}");
            Ok(())
        }
        Commands::Live => cmd_live(&app.dashboard()?).await,
        Commands::Console => cmd_console(app.dashboard()?).await,
        Commands::Dash(command) => run_dash(&app.dashboard()?, command).await,
    }
}

fn cmd_status(app: &App) -> Result<()> {
    println!("view:      {}", app.session.view());
    println!("theme:     {}", app.archive.theme().as_str());
    println!("data dir:  {}", app.config.data_dir.display());
    let gateway = app.gateway()?;
    println!(
        "api key:   {}",
        if gateway.has_api_key() { "set" } else { "missing" }
    );
    println!("model:     {}", gateway.models().flash);
    match app.session.profile() {
        Some(p) => {
            println!("asset:     {} ({})", p.full_name, p.id);
            println!("dob:       {}", p.dob);
            if let Some(lp) = p.life_path_number {
                println!("life path: {lp}");
            }
        }
        None => {
            println!("asset:     none");
            if let Some(draft) = app.archive.intake_draft() {
                println!("draft:     {}", serde_json::to_string(&draft)?);
            }
        }
    }
    Ok(())
}

async fn cmd_auth(app: &mut App, email: Option<String>, code: &str) -> Result<()> {
    let email = email
        .or_else(|| app.session.remembered_email())
        .unwrap_or_default();
    println!("VERIFYING CLEARANCE...");
    let view = app.session.authenticate(&email, code).await?;
    println!("{view}");
    Ok(())
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

async fn cmd_intake(
    app: &mut App,
    fields: IntakeDraft,
    scan: Option<&Path>,
    clear_draft: bool,
) -> Result<()> {
    if clear_draft {
        app.session.clear_intake_draft()?;
    }

    let scanned = match scan {
        Some(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            println!("SCANNING DOCUMENT...");
            let extracted = app.gateway()?.extract_profile(&bytes, mime_for(path)).await;
            if extracted.is_none() {
                println!("SCAN FAILED. ENTER DATA MANUALLY.");
            }
            extracted
        }
        None => None,
    };

    match app.session.submit_intake(&fields, scanned.as_ref())? {
        IntakeOutcome::Incomplete { draft, error } => {
            println!("draft saved: {}", serde_json::to_string(&draft)?);
            bail!("intake incomplete: {error}");
        }
        IntakeOutcome::Complete(profile) => {
            println!("ASSET REGISTERED: {}", profile.id);
            let view = app
                .session
                .run_cinematic(|_, line| println!("{line}"))
                .await?;
            println!("{view}");
            Ok(())
        }
    }
}

fn cmd_theme(app: &App, mode: Option<ThemeArg>) -> Result<()> {
    let current = app.archive.theme();
    let next = match mode {
        None => current,
        Some(ThemeArg::Toggle) => current.toggled(),
        Some(ThemeArg::Dark) => Theme::Dark,
        Some(ThemeArg::Light) => Theme::Light,
    };
    if next != current {
        app.archive.set_theme(next)?;
    }
    println!("{}", next.as_str());
    Ok(())
}

async fn run_dash(dash: &Dashboard, command: DashCommand) -> Result<()> {
    match command {
        DashCommand::Dossier(cmd) => run_dossier(dash, cmd).await,
        DashCommand::Network(cmd) => run_network(dash, cmd).await,
        DashCommand::Explore { query } => {
            println!("{}", dash.intel(&query.join(" ")).await?);
            Ok(())
        }
        DashCommand::Calendar(CalendarCommand::Daily { date }) => {
            let date = date
                .map(|d| CalendarDate::parse(&d))
                .transpose()
                .context("invalid --date")?;
            println!("{}", dash.daily_frequency(date).await?);
            Ok(())
        }
        DashCommand::Calendar(CalendarCommand::Yearly) => {
            for month in dash.yearly_cycle().await? {
                println!("{:<4} {:>3}%  {}", month.month, month.freq, month.directive);
            }
            Ok(())
        }
        DashCommand::Ops(cmd) => run_ops(dash, cmd).await,
        DashCommand::Tool { id: None } => {
            for tool in LAUNCHER {
                println!("{:<12} {}", tool.id, tool.label);
            }
            Ok(())
        }
        DashCommand::Tool { id: Some(id) } => {
            match dash.open_tool(&id).await? {
                ToolOutput::Text(text) => println!("{text}"),
                ToolOutput::Yearly(months) => {
                    for month in months {
                        println!("{:<4} {:>3}%  {}", month.month, month.freq, month.directive);
                    }
                }
            }
            Ok(())
        }
        DashCommand::Chat { message } if message.is_empty() => {
            for msg in dash.chat_history() {
                println!("[{}] {}", msg.role.as_str().to_uppercase(), msg.text);
            }
            Ok(())
        }
        DashCommand::Chat { message } => {
            println!("{}", dash.chat(&message.join(" ")).await?);
            Ok(())
        }
        DashCommand::Speak { text, out } => match dash.speak(&text.join(" ")).await? {
            Some(pcm) => {
                tokio::fs::write(&out, &pcm)
                    .await
                    .with_context(|| format!("failed to write {}", out.display()))?;
                println!("{} bytes written to {}", pcm.len(), out.display());
                Ok(())
            }
            None => bail!("VOICE SYNTHESIS UNAVAILABLE."),
        },
    }
}

async fn run_dossier(dash: &Dashboard, cmd: DossierCommand) -> Result<()> {
    match cmd {
        DossierCommand::Metrics => {
            let m = dash.metrics();
            println!("life path:  {}", m.life_path);
            println!(
                "western:    {}",
                m.western.map(|s| s.name()).unwrap_or("UNKNOWN")
            );
            println!("earth:      {}", m.earth.map(|s| s.name()).unwrap_or("UNKNOWN"));
        }
        DossierCommand::Briefing { refresh } => println!("{}", dash.briefing(refresh).await?),
        DossierCommand::Directive => println!("{}", dash.strategic_directive().await?),
        DossierCommand::Shadow => println!("{}", dash.shadow_directive().await?),
        DossierCommand::Portrait { refresh, out } => {
            let Some(uri) = dash.portrait(refresh).await? else {
                bail!("VISUAL RECONSTRUCTION FAILED.");
            };
            match out {
                Some(path) => {
                    let encoded = uri.split_once(',').map_or(uri.as_str(), |(_, data)| data);
                    let bytes = STANDARD.decode(encoded).context("portrait data is not base64")?;
                    tokio::fs::write(&path, &bytes)
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("portrait written to {}", path.display());
                }
                None => println!("{uri}"),
            }
        }
        DossierCommand::Video { refresh } => {
            println!("RENDERING ASSET REEL. THIS MAY TAKE SEVERAL MINUTES...");
            match dash.video(refresh).await? {
                Some(path) => println!("{}", path.display()),
                None => bail!("VIDEO UPLINK FAILED."),
            }
        }
        DossierCommand::Zodiac { animal } => {
            println!("{}", dash.zodiac_dossier(animal.as_deref()).await?)
        }
    }
    Ok(())
}

async fn run_network(dash: &Dashboard, cmd: NetworkCommand) -> Result<()> {
    match cmd {
        NetworkCommand::Scan { name, dob, save } => {
            let report = dash.compatibility(&name, &dob).await?;
            println!("SYNC: {}%", report.score);
            println!("{}", report.summary);
            if let Some(kind) = save {
                let ally = dash.save_ally(kind.into()).await?;
                println!("ally saved: {}", ally.id);
            }
        }
        NetworkCommand::List => {
            for ally in dash.allies() {
                let score = ally
                    .compatibility
                    .map(|s| format!("{s}%"))
                    .unwrap_or_else(|| "--".to_string());
                println!(
                    "{}  {:<24} {}  {:?}  {score}",
                    ally.id, ally.name, ally.dob, ally.kind
                );
            }
        }
        NetworkCommand::Remove { id } => {
            if !dash.remove_ally(&id)? {
                bail!("no ally with id {id}");
            }
            println!("removed {id}");
        }
    }
    Ok(())
}

async fn run_ops(dash: &Dashboard, cmd: OpsCommand) -> Result<()> {
    match cmd {
        OpsCommand::Missions => {
            for m in dash.missions().await? {
                println!("[{:?}] {} ({:?})", m.priority, m.title, m.status);
                println!("    {}", m.objective);
            }
        }
        OpsCommand::Terminal { command } => {
            dash.terminal_command(&command.join(" ")).await?;
            for line in dash.terminal().await {
                println!("{line}");
            }
        }
        OpsCommand::Report { kind, content } => {
            let report = dash.field_report(kind.into(), &content.join(" ")).await?;
            println!("[REPORT ANALYSIS] {}", report.analysis.unwrap_or_default());
        }
        OpsCommand::Reports => {
            for r in dash.reports() {
                println!("{} [{}] {}", r.timestamp, r.kind.as_str(), r.content);
                if let Some(analysis) = r.analysis {
                    println!("    {analysis}");
                }
            }
        }
    }
    Ok(())
}

struct PrintCallbacks;

impl LiveCallbacks for PrintCallbacks {
    fn on_open(&self) {
        println!("UPLINK OPEN.");
    }

    fn on_message(&self, event: LiveEvent) {
        match event {
            LiveEvent::SetupComplete => tracing::debug!("live setup complete"),
            LiveEvent::Text(text) => println!("HANDLER: {text}"),
            LiveEvent::Audio(pcm) => tracing::debug!("live audio chunk: {} bytes", pcm.len()),
            LiveEvent::TurnComplete => println!("--"),
            LiveEvent::Interrupted => println!("[INTERRUPTED]"),
        }
    }

    fn on_error(&self, error: &GatewayError) {
        eprintln!("UPLINK ERROR: {error}");
    }

    fn on_close(&self) {
        println!("UPLINK CLOSED.");
    }
}

async fn cmd_live(dash: &Dashboard) -> Result<()> {
    dash.toggle_live(Arc::new(PrintCallbacks)).await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Err(e) = dash.live_send(line).await {
            eprintln!("{e}");
            break;
        }
    }
    if dash.with_state(|s| s.live_active()).await {
        dash.toggle_live(Arc::new(PrintCallbacks)).await?;
    }
    Ok(())
}

/// Send a raw 16 kHz PCM file over the live uplink in 100 ms chunks.
async fn stream_audio(dash: &Dashboard, path: &Path) -> Result<()> {
    const CHUNK: usize = 3200;
    let pcm = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    for chunk in pcm.chunks(CHUNK) {
        dash.live_send_audio(chunk).await?;
    }
    Ok(())
}

/// Line-oriented dashboard. Each command runs as its own task, so a second
/// request against a loading panel is rejected instead of queued.
async fn cmd_console(dash: Dashboard) -> Result<()> {
    println!("ARCHIVE CONSOLE. 'live' toggles the uplink, 'say <text>' and 'audio <file>' send on it, 'panels' shows panel status, 'exit' quits.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = tokio::task::JoinSet::new();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line.split_once(' ').map_or((line, ""), |(a, b)| (a, b.trim())) {
            ("", _) => continue,
            ("exit" | "quit", _) => break,
            ("live", _) => match dash.toggle_live(Arc::new(PrintCallbacks)).await {
                Ok(active) => tracing::debug!("live uplink active: {active}"),
                Err(e) => eprintln!("{e}"),
            },
            ("say", text) => {
                if let Err(e) = dash.live_send(text).await {
                    eprintln!("{e}");
                }
            }
            ("audio", path) => {
                if let Err(e) = stream_audio(&dash, Path::new(path)).await {
                    eprintln!("{e:#}");
                }
            }
            ("panels", _) => {
                for line in dash.with_state(|s| s.summary()).await {
                    println!("{line}");
                }
            }
            _ => match ConsoleLine::try_parse_from(line.split_whitespace()) {
                Ok(parsed) => {
                    let dash = dash.clone();
                    tasks.spawn(async move {
                        let result = run_dash(&dash, parsed.command).await;
                        if let Err(e) = result {
                            match e.downcast_ref::<DashboardError>() {
                                Some(DashboardError::Busy) => eprintln!("STANDBY. REQUEST IN PROGRESS."),
                                _ => eprintln!("{e:#}"),
                            }
                        }
                    });
                }
                Err(e) => eprintln!("{e}"),
            },
        }
    }

    while tasks.join_next().await.is_some() {}
    if dash.with_state(|s| s.live_active()).await {
        dash.toggle_live(Arc::new(PrintCallbacks)).await?;
    }
    Ok(())
}
