use pba_core::{
    ChatMessage, CompatibilityReport, LogType, MonthlyFrequency, Priority, Role, Subject,
    TacticalMission, UserProfile, short_id,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::prompts::{self, HANDLER_INSTRUCTION};
use super::wire::{
    CompatibilityOut, Content, EmptyObject, GenerateRequest, GenerationConfig, MissionOut,
    MonthOut, Tool, response_schema,
};
use super::{Gateway, IntelRoute, or_fallback, route_intel};

/// Fixed replies substituted when an operation fails or comes back empty.
pub mod fallback {
    pub const BRIEFING: &str = "CONNECTION INTERCEPTED. TRY AGAIN.";
    pub const BRIEFING_EMPTY: &str = "NO INTELLIGENCE RETRIEVED.";
    pub const STRATEGIC: &str = "ARCHIVE ACCESS DENIED.";
    pub const STRATEGIC_EMPTY: &str = "DEEP SCAN FAILED.";
    pub const SHADOW: &str = "ACCESS TO SHADOW ARCHIVE DENIED.";
    pub const SHADOW_EMPTY: &str = "SHADOW DATA ENCRYPTED.";
    pub const COMPATIBILITY_SCORE: u8 = 50;
    pub const COMPATIBILITY_SUMMARY: &str =
        "SIGNAL INTERFERENCE DETECTED. ESTIMATED SYNC LEVEL ONLY.";
    pub const LOCATION: &str = "GEOSPATIAL UPLINK ERROR.";
    pub const LOCATION_EMPTY: &str = "GEOSPATIAL INTEL UNAVAILABLE.";
    pub const FOUNDING: &str = "INTEL UPLINK ERROR.";
    pub const FOUNDING_EMPTY: &str = "NO INTEL FOUND ON TARGET.";
    pub const TERMINAL: [&str; 2] = [
        "SYSTEM ERROR: UNABLE TO PROCESS REQUEST.",
        "SIGNAL INTERFERENCE DETECTED.",
    ];
    pub const CHAT: &str = "TRANSMISSION FAILED.";
    pub const CHAT_EMPTY: &str = "[REDACTED]";
    pub const DAILY: &str = "UPLINK ERROR.";
    pub const DAILY_EMPTY: &str = "SIGNAL DEAD.";
    pub const TOOL: &str = "TOOL OFFLINE.";
    pub const TOOL_EMPTY: &str = "TOOL DATA CORRUPTED.";
    pub const ZODIAC: &str = "ARCHIVE ERROR.";
    pub const ZODIAC_EMPTY: &str = "DATA UNAVAILABLE.";
    pub const WEALTH: &str = "ECONOMIC UPLINK FAILED.";
    pub const WEALTH_EMPTY: &str = "MARKET DATA UNAVAILABLE.";
    pub const MATRIX: &str = "SCANNING ANOMALY DETECTED.";
    pub const MATRIX_EMPTY: &str = "SOURCE MATRIX UNREADABLE.";
    pub const LOG: &str = "ERROR PROCESSING LOG.";
    pub const LOG_EMPTY: &str = "DATA CORRUPTED.";
}

fn handler(prompt: String) -> GenerateRequest {
    GenerateRequest::prompt(prompt).system(HANDLER_INSTRUCTION)
}

fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

impl Gateway {
    pub async fn briefing(&self, profile: &UserProfile) -> String {
        let request = handler(prompts::briefing(profile)).config(GenerationConfig {
            temperature: Some(0.7),
            ..GenerationConfig::default()
        });
        self.text_or(
            "briefing",
            &self.models.flash,
            request,
            fallback::BRIEFING_EMPTY,
            fallback::BRIEFING,
        )
        .await
    }

    pub async fn strategic_directive(&self, profile: &UserProfile) -> String {
        self.text_or(
            "strategic directive",
            &self.models.pro,
            handler(prompts::strategic_directive(profile)),
            fallback::STRATEGIC_EMPTY,
            fallback::STRATEGIC,
        )
        .await
    }

    pub async fn shadow_directive(&self, profile: &UserProfile) -> String {
        self.text_or(
            "shadow directive",
            &self.models.pro,
            handler(prompts::shadow_directive(profile)),
            fallback::SHADOW_EMPTY,
            fallback::SHADOW,
        )
        .await
    }

    pub async fn missions(&self, profile: &UserProfile) -> Vec<TacticalMission> {
        let request = handler(prompts::missions(profile))
            .config(GenerationConfig::json(response_schema::<Vec<MissionOut>>()));
        let result = self
            .generate_structured::<Vec<MissionOut>>(&self.models.flash, &request)
            .await;
        let raw = or_fallback("missions", result, Vec::new);

        let mut rng = SmallRng::from_os_rng();
        raw.into_iter()
            .map(|m| TacticalMission {
                id: m
                    .id
                    .filter(|id| !id.trim().is_empty())
                    .unwrap_or_else(|| short_id(&mut rng)),
                title: m.title,
                objective: m.objective,
                status: Default::default(),
                priority: m
                    .priority
                    .as_deref()
                    .map(Priority::parse_lenient)
                    .unwrap_or_default(),
            })
            .collect()
    }

    pub async fn yearly_cycle(&self, year: i64, profile: &UserProfile) -> Vec<MonthlyFrequency> {
        let request = handler(prompts::yearly_cycle(year, profile))
            .config(GenerationConfig::json(response_schema::<Vec<MonthOut>>()));
        let result = self
            .generate_structured::<Vec<MonthOut>>(&self.models.flash, &request)
            .await;
        or_fallback("yearly cycle", result, Vec::new)
            .into_iter()
            .map(|m| MonthlyFrequency {
                month: m.month,
                freq: clamp_percent(m.freq),
                directive: m.directive,
            })
            .collect()
    }

    pub async fn compatibility(&self, a: &Subject, b: &Subject) -> CompatibilityReport {
        let request = handler(prompts::compatibility(a, b))
            .config(GenerationConfig::json(response_schema::<CompatibilityOut>()));
        let result = self
            .generate_structured::<CompatibilityOut>(&self.models.flash, &request)
            .await
            .map(|out| CompatibilityReport {
                score: clamp_percent(out.score),
                summary: out.summary,
            });
        or_fallback("compatibility", result, || CompatibilityReport {
            score: fallback::COMPATIBILITY_SCORE,
            summary: fallback::COMPATIBILITY_SUMMARY.to_string(),
        })
    }

    /// Maps-grounded read on a place. No persona instruction.
    pub async fn location_intel(&self, location: &str) -> String {
        let request = GenerateRequest::prompt(prompts::location_intel(location))
            .tool(Tool::GoogleMaps(EmptyObject {}));
        self.text_or(
            "location intel",
            &self.models.maps,
            request,
            fallback::LOCATION_EMPTY,
            fallback::LOCATION,
        )
        .await
    }

    /// Search-grounded read on a brand, person, or place founding.
    pub async fn founding_intel(&self, query: &str) -> String {
        let request =
            handler(prompts::founding_intel(query)).tool(Tool::GoogleSearch(EmptyObject {}));
        self.text_or(
            "founding intel",
            &self.models.flash,
            request,
            fallback::FOUNDING_EMPTY,
            fallback::FOUNDING,
        )
        .await
    }

    pub async fn intel(&self, query: &str) -> String {
        match route_intel(query) {
            IntelRoute::Location => self.location_intel(query).await,
            IntelRoute::Founding => self.founding_intel(query).await,
        }
    }

    pub async fn terminal_command(&self, command: &str, profile: &UserProfile) -> Vec<String> {
        let request = handler(prompts::terminal_command(command, profile))
            .config(GenerationConfig::json(response_schema::<Vec<String>>()));
        let result = self
            .generate_structured::<Vec<String>>(&self.models.flash, &request)
            .await;
        or_fallback("terminal command", result, || {
            fallback::TERMINAL.iter().map(|s| s.to_string()).collect()
        })
    }

    /// One Handler chat turn over `history`, which should not yet contain
    /// `message`.
    pub async fn chat(&self, history: &[ChatMessage], message: &str, profile: &UserProfile) -> String {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|m| Content::with_role(m.role.as_str(), m.text.clone()))
            .collect();
        contents.push(Content::with_role(Role::User.as_str(), message));

        let request = GenerateRequest {
            contents,
            ..GenerateRequest::default()
        }
        .system(prompts::chat_instruction(profile));

        self.text_or(
            "chat",
            &self.models.flash,
            request,
            fallback::CHAT_EMPTY,
            fallback::CHAT,
        )
        .await
    }

    pub async fn daily_frequency(&self, date: &str, profile: &UserProfile) -> String {
        self.text_or(
            "daily frequency",
            &self.models.flash,
            handler(prompts::daily_frequency(date, profile)),
            fallback::DAILY_EMPTY,
            fallback::DAILY,
        )
        .await
    }

    pub async fn tool_intel(&self, tool: &str, profile: &UserProfile) -> String {
        self.text_or(
            "tool intel",
            &self.models.flash,
            handler(prompts::tool_intel(tool, profile)),
            fallback::TOOL_EMPTY,
            fallback::TOOL,
        )
        .await
    }

    pub async fn zodiac_dossier(&self, animal: &str, primary: bool) -> String {
        self.text_or(
            "zodiac dossier",
            &self.models.flash,
            handler(prompts::zodiac_dossier(animal, primary)),
            fallback::ZODIAC_EMPTY,
            fallback::ZODIAC,
        )
        .await
    }

    pub async fn wealth_forecast(&self, profile: &UserProfile) -> String {
        self.text_or(
            "wealth forecast",
            &self.models.flash,
            handler(prompts::wealth_forecast(profile)),
            fallback::WEALTH_EMPTY,
            fallback::WEALTH,
        )
        .await
    }

    pub async fn source_matrix(&self, profile: &UserProfile) -> String {
        self.text_or(
            "source matrix",
            &self.models.pro,
            handler(prompts::source_matrix(profile)),
            fallback::MATRIX_EMPTY,
            fallback::MATRIX,
        )
        .await
    }

    pub async fn analyze_log(&self, kind: LogType, content: &str) -> String {
        self.text_or(
            "log analysis",
            &self.models.flash,
            handler(prompts::analyze_log(kind, content)),
            fallback::LOG_EMPTY,
            fallback::LOG,
        )
        .await
    }
}
