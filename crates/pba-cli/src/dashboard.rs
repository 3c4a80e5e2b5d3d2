//! Dashboard controller.
//!
//! Each tab keeps an independent [`TabState`] bundle behind one shared lock.
//! A fetch marks its bundle loading under the lock, releases it for the
//! gateway call, then stores the result. A second fetch on a bundle that is
//! still loading is rejected with [`DashboardError::Busy`] and issues no
//! request; other bundles are unaffected.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use pba_core::{
    AllyType, CalendarDate, ChatMessage, CircleMember, CompatibilityReport, EarthSign, LogType,
    MonthlyFrequency, ProfileReadout, Role, Subject, TERMINAL_GREETING, TacticalLog,
    TacticalMission, UserProfile, now_clock, short_id,
};
use pba_store::{Archive, StoreError};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::gateway::{Gateway, GatewayError, LiveCallbacks, LiveSender, LiveSession};

#[derive(Debug)]
pub enum DashboardError {
    Busy,
    EmptyInput(&'static str),
    NothingToSave,
    UnknownTool(String),
    Store(StoreError),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::Busy => write!(f, "request already in progress"),
            DashboardError::EmptyInput(what) => write!(f, "{what} is required"),
            DashboardError::NothingToSave => write!(f, "no compatibility result to save"),
            DashboardError::UnknownTool(id) => write!(f, "unknown launcher tool '{id}'"),
            DashboardError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DashboardError {}

impl From<StoreError> for DashboardError {
    fn from(e: StoreError) -> Self {
        DashboardError::Store(e)
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

/// Cached result, loading flag and placeholder for one tab panel.
#[derive(Debug, Clone)]
pub struct TabState<T> {
    result: Option<T>,
    loading: bool,
    placeholder: Option<String>,
}

impl<T> Default for TabState<T> {
    fn default() -> Self {
        Self {
            result: None,
            loading: false,
            placeholder: None,
        }
    }
}

impl<T> TabState<T> {
    pub fn with_placeholder(text: &str) -> Self {
        Self {
            placeholder: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    fn begin(&mut self) -> Result<()> {
        if self.loading {
            return Err(DashboardError::Busy);
        }
        self.loading = true;
        self.result = None;
        self.placeholder = None;
        Ok(())
    }

    fn finish(&mut self, value: Option<T>) {
        self.result = value;
        self.loading = false;
    }

    fn restore(&mut self, value: T) {
        if !self.loading {
            self.result = Some(value);
            self.placeholder = None;
        }
    }
}

pub struct LauncherTool {
    pub id: &'static str,
    pub label: &'static str,
}

pub const LAUNCHER: &[LauncherTool] = &[
    LauncherTool { id: "wealth", label: "Wealth Vector" },
    LauncherTool { id: "matrix", label: "Source Matrix" },
    LauncherTool { id: "yearly", label: "Yearly Forecast" },
    LauncherTool { id: "places", label: "Places to Live" },
    LauncherTool { id: "travel", label: "Travel Destinations" },
    LauncherTool { id: "music", label: "Music & Artists" },
    LauncherTool { id: "cars", label: "Cars" },
    LauncherTool { id: "lucky", label: "Lucky Number" },
    LauncherTool { id: "letter", label: "Letterology" },
    LauncherTool { id: "pricing", label: "Pricing Calculator" },
    LauncherTool { id: "matrix-num", label: "Matrix Numbers" },
    LauncherTool { id: "home", label: "Home Picker" },
    LauncherTool { id: "career", label: "Career Consultant" },
    LauncherTool { id: "dream", label: "Dream Interpreter" },
    LauncherTool { id: "energy", label: "Energy Insight" },
];

pub fn find_tool(id: &str) -> Option<&'static LauncherTool> {
    LAUNCHER.iter().find(|t| t.id.eq_ignore_ascii_case(id))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    Text(String),
    Yearly(Vec<MonthlyFrequency>),
}

#[derive(Debug)]
pub struct ToolModal {
    pub tool_id: &'static str,
    pub label: &'static str,
    pub state: TabState<ToolOutput>,
    /// Distinguishes reopenings of the same tool.
    token: u64,
}

pub struct DashboardState {
    pub briefing: TabState<String>,
    pub strategic: TabState<String>,
    pub shadow: TabState<String>,
    pub zodiac: TabState<String>,
    pub portrait: TabState<String>,
    pub video: TabState<PathBuf>,
    pub compatibility: TabState<CompatibilityReport>,
    compat_target: Option<Subject>,
    pub intel: TabState<String>,
    pub daily: TabState<String>,
    pub yearly: TabState<Vec<MonthlyFrequency>>,
    pub missions: TabState<Vec<TacticalMission>>,
    pub command: TabState<Vec<String>>,
    pub report: TabState<String>,
    pub chat: TabState<String>,
    pub speech: TabState<Vec<u8>>,
    pub terminal: Vec<String>,
    pub tool: Option<ToolModal>,
    tool_seq: u64,
    live: Option<LiveSession>,
}

impl DashboardState {
    fn new() -> Self {
        Self {
            briefing: TabState::default(),
            strategic: TabState::default(),
            shadow: TabState::default(),
            zodiac: TabState::default(),
            portrait: TabState::with_placeholder("NO VISUAL ON FILE."),
            video: TabState::default(),
            compatibility: TabState::default(),
            compat_target: None,
            intel: TabState::with_placeholder("AWAITING TARGET DESIGNATION."),
            daily: TabState::default(),
            yearly: TabState::default(),
            missions: TabState::with_placeholder(
                "No active directives for this asset frequency.",
            ),
            command: TabState::default(),
            report: TabState::default(),
            chat: TabState::default(),
            speech: TabState::default(),
            terminal: TERMINAL_GREETING.iter().map(|s| s.to_string()).collect(),
            tool: None,
            tool_seq: 0,
            live: None,
        }
    }

    pub fn live_active(&self) -> bool {
        self.live.as_ref().is_some_and(|s| !s.is_closed())
    }

    /// One status line per panel.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![
            panel_line("briefing", &self.briefing),
            panel_line("directive", &self.strategic),
            panel_line("shadow", &self.shadow),
            panel_line("zodiac", &self.zodiac),
            panel_line("portrait", &self.portrait),
            panel_line("video", &self.video),
            panel_line("network", &self.compatibility),
            panel_line("explore", &self.intel),
            panel_line("daily", &self.daily),
            panel_line("yearly", &self.yearly),
            panel_line("missions", &self.missions),
            panel_line("terminal", &self.command),
            panel_line("report", &self.report),
            panel_line("chat", &self.chat),
            panel_line("speech", &self.speech),
        ];
        if let Some(modal) = &self.tool {
            lines.push(panel_line(modal.tool_id, &modal.state));
        }
        lines.push(format!(
            "{:<10} {}",
            "uplink",
            if self.live_active() { "OPEN" } else { "CLOSED" }
        ));
        lines
    }
}

fn panel_line<T>(name: &str, tab: &TabState<T>) -> String {
    let status = if tab.is_loading() {
        "LOADING"
    } else if tab.result().is_some() {
        "READY"
    } else {
        tab.placeholder().unwrap_or("--")
    };
    format!("{name:<10} {status}")
}

type Select<T> = fn(&mut DashboardState) -> &mut TabState<T>;

#[derive(Clone)]
pub struct Dashboard {
    gateway: Gateway,
    archive: Arc<Archive>,
    profile: UserProfile,
    state: Arc<Mutex<DashboardState>>,
}

impl Dashboard {
    pub fn new(gateway: Gateway, archive: Arc<Archive>, profile: UserProfile) -> Self {
        Self {
            gateway,
            archive,
            profile,
            state: Arc::new(Mutex::new(DashboardState::new())),
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub async fn with_state<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }

    async fn begin<T>(&self, select: Select<T>) -> Result<()> {
        let mut state = self.state.lock().await;
        select(&mut state).begin()
    }

    async fn run<T, F>(&self, select: Select<T>, fetch: F) -> Result<T>
    where
        T: Clone,
        F: Future<Output = T>,
    {
        self.begin(select).await?;
        let value = fetch.await;
        let mut state = self.state.lock().await;
        select(&mut state).finish(Some(value.clone()));
        Ok(value)
    }

    async fn run_opt<T, F>(&self, select: Select<T>, fetch: F) -> Result<Option<T>>
    where
        T: Clone,
        F: Future<Output = Option<T>>,
    {
        self.begin(select).await?;
        let value = fetch.await;
        let mut state = self.state.lock().await;
        select(&mut state).finish(value.clone());
        Ok(value)
    }

    // --- Dossier ---

    pub fn metrics(&self) -> ProfileReadout {
        ProfileReadout::from_dob(&self.profile.dob)
    }

    /// Cached briefing unless `refresh` is set or nothing is cached.
    pub async fn briefing(&self, refresh: bool) -> Result<String> {
        if !refresh && let Some(cached) = self.archive.briefing(&self.profile.id) {
            self.state.lock().await.briefing.restore(cached.clone());
            return Ok(cached);
        }
        let text = self
            .run(|s| &mut s.briefing, self.gateway.briefing(&self.profile))
            .await?;
        if let Err(e) = self.archive.set_briefing(&self.profile.id, &text) {
            tracing::warn!("failed to cache briefing: {e}");
        }
        Ok(text)
    }

    pub async fn strategic_directive(&self) -> Result<String> {
        self.run(
            |s| &mut s.strategic,
            self.gateway.strategic_directive(&self.profile),
        )
        .await
    }

    pub async fn shadow_directive(&self) -> Result<String> {
        self.run(|s| &mut s.shadow, self.gateway.shadow_directive(&self.profile))
            .await
    }

    /// Zodiac archetype dossier. Defaults to the asset's own earth sign,
    /// which is the primary archetype.
    pub async fn zodiac_dossier(&self, animal: Option<&str>) -> Result<String> {
        let own = self.metrics().earth.map(EarthSign::name);
        let animal = match animal.map(str::trim).filter(|a| !a.is_empty()) {
            Some(a) => a.to_string(),
            None => own
                .map(str::to_string)
                .ok_or(DashboardError::EmptyInput("zodiac animal"))?,
        };
        let primary = own.is_some_and(|o| o.eq_ignore_ascii_case(&animal));
        self.run(
            |s| &mut s.zodiac,
            self.gateway.zodiac_dossier(&animal, primary),
        )
        .await
    }

    pub async fn portrait(&self, refresh: bool) -> Result<Option<String>> {
        if !refresh && let Some(cached) = self.archive.portrait(&self.profile.id) {
            self.state.lock().await.portrait.restore(cached.clone());
            return Ok(Some(cached));
        }
        let uri = self
            .run_opt(|s| &mut s.portrait, self.gateway.portrait(&self.profile))
            .await?;
        if let Some(uri) = &uri
            && let Err(e) = self.archive.set_portrait(&self.profile.id, uri)
        {
            tracing::warn!("failed to cache portrait: {e}");
        }
        Ok(uri)
    }

    pub async fn video(&self, refresh: bool) -> Result<Option<PathBuf>> {
        if !refresh
            && let Some(cached) = self.archive.video(&self.profile.id).map(PathBuf::from)
            && cached.is_file()
        {
            self.state.lock().await.video.restore(cached.clone());
            return Ok(Some(cached));
        }
        let path = self
            .run_opt(|s| &mut s.video, self.gateway.video(&self.profile))
            .await?;
        if let Some(path) = &path
            && let Err(e) = self
                .archive
                .set_video(&self.profile.id, &path.display().to_string())
        {
            tracing::warn!("failed to record video: {e}");
        }
        Ok(path)
    }

    // --- Network ---

    pub async fn compatibility(&self, name: &str, dob: &str) -> Result<CompatibilityReport> {
        let (name, dob) = (name.trim(), dob.trim());
        if name.is_empty() || dob.is_empty() {
            return Err(DashboardError::EmptyInput("target name and date of birth"));
        }
        let target = Subject::new(name, dob);
        let me = Subject::from(&self.profile);
        let report = self
            .run(
                |s| &mut s.compatibility,
                self.gateway.compatibility(&me, &target),
            )
            .await?;
        self.state.lock().await.compat_target = Some(target);
        Ok(report)
    }

    /// Store the last compatibility target as an ally, newest first.
    pub async fn save_ally(&self, kind: AllyType) -> Result<CircleMember> {
        let mut state = self.state.lock().await;
        let score = state.compatibility.result().map(|r| r.score);
        let (Some(target), Some(score)) = (state.compat_target.clone(), score) else {
            return Err(DashboardError::NothingToSave);
        };
        let mut rng = SmallRng::from_os_rng();
        let ally = CircleMember {
            id: short_id(&mut rng),
            name: target.name,
            dob: target.dob,
            kind,
            compatibility: Some(score),
        };
        self.archive.add_ally(&self.profile.id, ally.clone())?;
        state.compatibility = TabState::default();
        state.compat_target = None;
        Ok(ally)
    }

    pub fn allies(&self) -> Vec<CircleMember> {
        self.archive.allies(&self.profile.id)
    }

    pub fn remove_ally(&self, id: &str) -> Result<bool> {
        Ok(self.archive.remove_ally(&self.profile.id, id)?)
    }

    // --- Explore ---

    pub async fn intel(&self, query: &str) -> Result<String> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DashboardError::EmptyInput("search query"));
        }
        self.run(|s| &mut s.intel, self.gateway.intel(query)).await
    }

    // --- Calendar ---

    pub async fn daily_frequency(&self, date: Option<CalendarDate>) -> Result<String> {
        let date = date.unwrap_or_else(CalendarDate::today).to_string();
        self.run(
            |s| &mut s.daily,
            self.gateway.daily_frequency(&date, &self.profile),
        )
        .await
    }

    pub async fn yearly_cycle(&self) -> Result<Vec<MonthlyFrequency>> {
        let year = CalendarDate::today().year;
        self.run(
            |s| &mut s.yearly,
            self.gateway.yearly_cycle(year, &self.profile),
        )
        .await
    }

    // --- Ops ---

    pub async fn missions(&self) -> Result<Vec<TacticalMission>> {
        self.run(|s| &mut s.missions, self.gateway.missions(&self.profile))
            .await
    }

    /// Run a terminal command; the echo and output are appended to the
    /// terminal buffer.
    pub async fn terminal_command(&self, command: &str) -> Result<Vec<String>> {
        let command = command.trim();
        if command.is_empty() {
            return Err(DashboardError::EmptyInput("command"));
        }
        let lines = self
            .run(
                |s| &mut s.command,
                self.gateway.terminal_command(command, &self.profile),
            )
            .await?;
        let mut state = self.state.lock().await;
        state.terminal.push(format!("HANDLER@ARCHIVE:~$ {command}"));
        state.terminal.extend(lines.iter().cloned());
        Ok(lines)
    }

    pub fn reports(&self) -> Vec<TacticalLog> {
        self.archive.reports(&self.profile.id)
    }

    /// Analyze and file a field report (newest first).
    pub async fn field_report(&self, kind: LogType, content: &str) -> Result<TacticalLog> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DashboardError::EmptyInput("report content"));
        }
        let analysis = self
            .run(
                |s| &mut s.report,
                self.gateway.analyze_log(kind, content),
            )
            .await?;
        self.state
            .lock()
            .await
            .terminal
            .push(format!("[REPORT ANALYSIS] {analysis}"));

        let report = TacticalLog {
            id: Uuid::new_v4().to_string(),
            kind,
            content: content.to_string(),
            timestamp: now_clock(),
            analysis: Some(analysis),
        };
        self.archive.add_report(&self.profile.id, report.clone())?;
        Ok(report)
    }

    pub async fn terminal(&self) -> Vec<String> {
        self.state.lock().await.terminal.clone()
    }

    // --- Handler chat ---

    pub fn chat_history(&self) -> Vec<ChatMessage> {
        self.archive.chat_history(&self.profile.id)
    }

    /// Send one message; both sides of the exchange are persisted.
    pub async fn chat(&self, message: &str) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(DashboardError::EmptyInput("message"));
        }
        let history = self.chat_history();
        let outgoing = ChatMessage::new(Role::User, message);
        let reply = self
            .run(
                |s| &mut s.chat,
                self.gateway.chat(&history, message, &self.profile),
            )
            .await?;
        self.archive.append_chat(
            &self.profile.id,
            [outgoing, ChatMessage::new(Role::Model, reply.clone())],
        )?;
        Ok(reply)
    }

    pub async fn speak(&self, text: &str) -> Result<Option<Vec<u8>>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DashboardError::EmptyInput("text"));
        }
        self.run_opt(|s| &mut s.speech, self.gateway.text_to_speech(text))
            .await
    }

    /// Open the live uplink, or close it if one is active. Returns whether
    /// the uplink is now active.
    pub async fn toggle_live(
        &self,
        callbacks: Arc<dyn LiveCallbacks>,
    ) -> std::result::Result<bool, GatewayError> {
        let existing = self.state.lock().await.live.take();
        if let Some(session) = existing
            && !session.is_closed()
        {
            session.close().await;
            return Ok(false);
        }
        let session = self.gateway.connect_live(callbacks).await?;
        self.state.lock().await.live = Some(session);
        Ok(true)
    }

    /// Sender for the active uplink. The state lock is released before any
    /// send waits on a full queue.
    async fn live_sender(&self) -> std::result::Result<LiveSender, GatewayError> {
        let state = self.state.lock().await;
        state
            .live
            .as_ref()
            .map(LiveSession::sender)
            .ok_or(GatewayError::SessionClosed)
    }

    pub async fn live_send(&self, text: &str) -> std::result::Result<(), GatewayError> {
        self.live_sender().await?.send_text(text).await
    }

    pub async fn live_send_audio(&self, pcm: &[u8]) -> std::result::Result<(), GatewayError> {
        self.live_sender().await?.send_audio(pcm).await
    }

    // --- Launcher ---

    /// Open the tool modal and fetch its single response.
    pub async fn open_tool(&self, id: &str) -> Result<ToolOutput> {
        let tool = find_tool(id).ok_or_else(|| DashboardError::UnknownTool(id.to_string()))?;
        let token = {
            let mut state = self.state.lock().await;
            if state.tool.as_ref().is_some_and(|m| m.state.is_loading()) {
                return Err(DashboardError::Busy);
            }
            state.tool_seq += 1;
            let mut modal = ToolModal {
                tool_id: tool.id,
                label: tool.label,
                state: TabState::default(),
                token: state.tool_seq,
            };
            modal.state.begin()?;
            state.tool = Some(modal);
            state.tool_seq
        };

        let output = match tool.id {
            "wealth" => ToolOutput::Text(self.gateway.wealth_forecast(&self.profile).await),
            "matrix" => ToolOutput::Text(self.gateway.source_matrix(&self.profile).await),
            "yearly" => {
                let year = CalendarDate::today().year;
                ToolOutput::Yearly(self.gateway.yearly_cycle(year, &self.profile).await)
            }
            _ => ToolOutput::Text(self.gateway.tool_intel(tool.label, &self.profile).await),
        };

        let mut state = self.state.lock().await;
        match state.tool.as_mut() {
            Some(modal) if modal.token == token => modal.state.finish(Some(output.clone())),
            _ => tracing::debug!("tool {} dismissed before its result arrived", tool.id),
        }
        Ok(output)
    }

    pub async fn dismiss_tool(&self) {
        self.state.lock().await.tool = None;
    }
}
