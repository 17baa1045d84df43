//! crates/podcast_muse_core/src/compose.rs
//!
//! The advanced compose form used by the script-only flow, and the text built
//! from it: the structured generation prompt, the simulated script, and the
//! project summary saved to the backend.

use std::fmt;
use std::str::FromStr;

/// Declares a closed set of wire values with `as_str`, `FromStr` and a default.
macro_rules! choice {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident, { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownChoice {
                        field: stringify!($name),
                        value: other.to_string(),
                        expected: $name::ALL
                            .iter()
                            .map(|c| c.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {field} (expected one of: {expected})")]
pub struct UnknownChoice {
    pub field: &'static str,
    pub value: String,
    pub expected: String,
}

choice!(Language, default = Thai, {
    Thai => "th",
    English => "en",
});

choice!(EpisodeFormat, default = HowtoFramework, {
    SoloTalk => "solo_talk",
    Interview => "interview",
    CoHost => "co_host",
    Storytelling => "storytelling",
    NewsRecap => "news_recap",
    HowtoFramework => "howto_framework",
    CaseStudy => "case_study",
    Review => "review",
    Other => "other",
});

choice!(Goal, default = Educate, {
    Educate => "educate",
    Entertain => "entertain",
    BrandBuilding => "brand_building",
    LeadGen => "lead_gen",
    Sell => "sell",
    Community => "community",
});

choice!(AudienceLevel, default = General, {
    Beginner => "beginner",
    General => "general",
    Advanced => "advanced",
});

choice!(AudiencePersona, default = Creators, {
    Students => "students",
    OfficeWorkers => "office_workers",
    Creators => "creators",
    Marketers => "marketers",
    Entrepreneurs => "entrepreneurs",
    TechStaff => "tech_staff",
    Investors => "investors",
    Parents => "parents",
    Other => "other",
});

choice!(Structure, default = Hook3ActCta, {
    Hook3ActCta => "hook_3act_cta",
    ProblemSolutionCta => "problem_solution_cta",
    NewsWhyTakeaways => "news_why_takeaways",
    InterviewBlocks => "interview_blocks",
    ChecklistSteps => "checklist_steps",
    Custom => "custom",
});

choice!(NarrationPerson, default = First, {
    First => "first_person",
    Second => "second_person",
    Third => "third_person",
});

choice!(SpeakingPace, default = Normal, {
    Slow => "slow_120",
    Normal => "normal_145",
    Fast => "fast_170",
});

choice!(SsmlGuidance, default = Light, {
    None => "none",
    Light => "light",
    Rich => "rich",
});

choice!(
    /// Whether the user names the topic or lets the model title the episode.
    TopicMode, default = UserProvided, {
    UserProvided => "user_provided",
    AutoTitle => "auto_title",
});

choice!(Depth, default = Medium, {
    Shallow => "shallow_overview",
    Medium => "medium_detail",
    Deep => "deep_technical",
});

choice!(CallToAction, default = DownloadLeadMagnet, {
    Subscribe => "subscribe",
    DownloadLeadMagnet => "download_lead_magnet",
    VisitWebsite => "visit_website",
    FollowSocial => "follow_social",
    Purchase => "purchase",
    BookCall => "book_call",
    JoinNewsletter => "join_newsletter",
    None => "none",
});

choice!(SeoTitleStyle, default = BenefitLed, {
    Neutral => "neutral",
    Curiosity => "curiosity",
    BenefitLed => "benefit_led",
    NumberList => "number_list",
    Howto => "howto",
    VsCompare => "vs_compare",
});

choice!(TagsMode, default = Auto, {
    Auto => "auto",
    UserProvided => "user_provided",
});

choice!(GuestIntroDepth, default = Short, {
    Short => "short",
    Standard => "standard",
    Extended => "extended",
});

choice!(InterviewStyle, default = Mixed, {
    Fundamentals => "fundamentals",
    Insights => "insights",
    TacticalHowto => "tactical_howto",
    CareerStory => "career_story",
    Mixed => "mixed",
});

choice!(DisclaimerNeed, default = None, {
    None => "none",
    Medical => "medical",
    Financial => "financial",
    ResearchSources => "research_sources",
});

choice!(SourceLinks, default = No, {
    No => "no",
    Basic => "yes_basic",
    Strict => "yes_strict",
});

/// Episode lengths offered by the form, in minutes.
pub const EPISODE_LENGTHS: [u32; 7] = [5, 10, 15, 20, 30, 45, 60];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeForm {
    pub language: Language,
    pub episode_length_min: u32,
    pub format: EpisodeFormat,
    pub goal: Goal,
    pub audience_level: AudienceLevel,
    pub audience_persona: AudiencePersona,
    pub tone: Vec<String>,
    pub structure: Structure,
    pub narration_person: NarrationPerson,
    pub wpm_speed: SpeakingPace,
    pub ssml_guidance: SsmlGuidance,
    pub topic_mode: TopicMode,
    pub topic: String,
    pub must_include: Vec<String>,
    pub must_avoid: Vec<String>,
    pub depth: Depth,
    pub key_takeaways_count: u8,
    pub cta_type: CallToAction,
    pub seo_title_style: SeoTitleStyle,
    pub tags_mode: TagsMode,
    pub tags: String,
    pub guest_intro_depth: GuestIntroDepth,
    pub interview_questions_style: InterviewStyle,
    pub disclaimer_need: DisclaimerNeed,
    pub source_links_required: SourceLinks,
    pub brand_terms: String,
    pub custom_format: String,
    pub custom_structure: String,
    pub custom_audience_persona: String,
    pub custom_tone: String,
    pub custom_must_include: String,
    pub custom_must_avoid: String,
}

impl Default for ComposeForm {
    fn default() -> Self {
        Self {
            language: Language::Thai,
            episode_length_min: 20,
            format: EpisodeFormat::HowtoFramework,
            goal: Goal::Educate,
            audience_level: AudienceLevel::General,
            audience_persona: AudiencePersona::Creators,
            tone: vec!["friendly".into(), "expert".into(), "warm".into()],
            structure: Structure::Hook3ActCta,
            narration_person: NarrationPerson::First,
            wpm_speed: SpeakingPace::Normal,
            ssml_guidance: SsmlGuidance::Light,
            topic_mode: TopicMode::UserProvided,
            topic: String::new(),
            must_include: vec!["checklist".into(), "examples".into()],
            must_avoid: vec!["hard_sell".into()],
            depth: Depth::Medium,
            key_takeaways_count: 4,
            cta_type: CallToAction::DownloadLeadMagnet,
            seo_title_style: SeoTitleStyle::BenefitLed,
            tags_mode: TagsMode::Auto,
            tags: String::new(),
            guest_intro_depth: GuestIntroDepth::Short,
            interview_questions_style: InterviewStyle::Mixed,
            disclaimer_need: DisclaimerNeed::None,
            source_links_required: SourceLinks::No,
            brand_terms: String::new(),
            custom_format: String::new(),
            custom_structure: String::new(),
            custom_audience_persona: String::new(),
            custom_tone: String::new(),
            custom_must_include: String::new(),
            custom_must_avoid: String::new(),
        }
    }
}

/// Adds `value` to a multi-select list, or removes it when already present.
pub fn toggle_choice(list: &mut Vec<String>, value: &str) {
    if let Some(pos) = list.iter().position(|item| item == value) {
        list.remove(pos);
    } else {
        list.push(value.to_string());
    }
}

/// Path separators, reserved characters and control characters become `-`, so
/// the name always stays a single path component.
fn file_name_char(c: char) -> char {
    if c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
        '-'
    } else {
        c
    }
}

/// Episode length in minutes, limited to the lengths the form offers.
pub fn parse_episode_length(raw: &str) -> Result<u32, String> {
    let offered = || {
        EPISODE_LENGTHS
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    match raw.trim().parse::<u32>() {
        Ok(minutes) if EPISODE_LENGTHS.contains(&minutes) => Ok(minutes),
        _ => Err(format!("'{raw}' is not an offered episode length (expected one of: {})", offered())),
    }
}

/// `" (custom)"` when `selected` is the free-text option and text was given.
fn custom_suffix(selected: bool, custom: &str) -> String {
    if selected && !custom.is_empty() {
        format!(" ({custom})")
    } else {
        String::new()
    }
}

fn list_with_custom(list: &[String], custom: &str) -> String {
    let has_other = list.iter().any(|item| item == "other");
    format!("{}{}", list.join(", "), custom_suffix(has_other, custom))
}

impl ComposeForm {
    pub fn topic_is_missing(&self) -> bool {
        self.topic_mode == TopicMode::UserProvided && self.topic.trim().is_empty()
    }

    /// Builds the structured prompt sent to the script model.
    pub fn build_prompt(&self) -> String {
        let mut prompt = String::new();
        let push = |prompt: &mut String, line: String| {
            prompt.push_str(&line);
            prompt.push('\n');
        };

        push(&mut prompt, format!("[LANGUAGE]: {}", self.language));
        push(
            &mut prompt,
            format!(
                "[EPISODE_LENGTH]: {} minutes (≈ {} wpm)",
                self.episode_length_min, self.wpm_speed
            ),
        );
        push(
            &mut prompt,
            format!(
                "[FORMAT]: {}{}",
                self.format,
                custom_suffix(self.format == EpisodeFormat::Other, &self.custom_format)
            ),
        );
        push(&mut prompt, format!("[GOAL]: {}", self.goal));
        push(&mut prompt, format!("[AUDIENCE_LEVEL]: {}", self.audience_level));
        push(
            &mut prompt,
            format!(
                "[AUDIENCE_PERSONA]: {}{}",
                self.audience_persona,
                custom_suffix(
                    self.audience_persona == AudiencePersona::Other,
                    &self.custom_audience_persona
                )
            ),
        );
        push(&mut prompt, format!("[TONE]: {}", list_with_custom(&self.tone, &self.custom_tone)));
        push(&mut prompt, format!("[NARRATION_PERSON]: {}", self.narration_person));
        push(
            &mut prompt,
            format!(
                "[STRUCTURE]: {}{}",
                self.structure,
                custom_suffix(self.structure == Structure::Custom, &self.custom_structure)
            ),
        );
        push(&mut prompt, format!("[SSML_GUIDANCE]: {}", self.ssml_guidance));
        push(&mut prompt, format!("[TOPIC_MODE]: {}", self.topic_mode));
        push(&mut prompt, format!("[TOPIC]: {}", self.topic));
        push(
            &mut prompt,
            format!(
                "[MUST_INCLUDE]: {}",
                list_with_custom(&self.must_include, &self.custom_must_include)
            ),
        );
        push(
            &mut prompt,
            format!(
                "[MUST_AVOID]: {}",
                list_with_custom(&self.must_avoid, &self.custom_must_avoid)
            ),
        );
        push(&mut prompt, format!("[DEPTH]: {}", self.depth));
        push(&mut prompt, format!("[KEY_TAKEAWAYS_COUNT]: {}", self.key_takeaways_count));
        push(&mut prompt, format!("[CTA_TYPE]: {}", self.cta_type));
        push(&mut prompt, format!("[SEO_TITLE_STYLE]: {}", self.seo_title_style));
        push(&mut prompt, format!("[TAGS_MODE]: {}", self.tags_mode));
        let tags = if self.tags.is_empty() { "auto-generated" } else { self.tags.as_str() };
        push(&mut prompt, format!("[TAGS]: {tags}"));

        if self.format == EpisodeFormat::Interview {
            prompt.push('\n');
            push(&mut prompt, format!("[INTERVIEW_GUEST_INTRO_DEPTH]: {}", self.guest_intro_depth));
            push(
                &mut prompt,
                format!("[INTERVIEW_QUESTIONS_STYLE]: {}", self.interview_questions_style),
            );
        }

        prompt.push('\n');
        push(&mut prompt, "[COMPLIANCE]:".to_string());
        push(&mut prompt, format!("- disclaimer_need: {}", self.disclaimer_need));
        push(&mut prompt, format!("- source_links_required: {}", self.source_links_required));
        let brand_terms = if self.brand_terms.is_empty() { "(none)" } else { self.brand_terms.as_str() };
        push(&mut prompt, format!("- brand_terms: {brand_terms}"));

        let language_name = match self.language {
            Language::Thai => "Thai",
            Language::English => "English",
        };
        let ssml_note = match self.ssml_guidance {
            SsmlGuidance::None => "no",
            SsmlGuidance::Light => "subtle notes like (pause), (emphasize: ...)",
            SsmlGuidance::Rich => "full SSML tags",
        };
        let cta = match self.cta_type {
            CallToAction::None => "no call to action",
            other => other.as_str(),
        };

        prompt.push('\n');
        push(&mut prompt, "TASKS:".to_string());
        push(
            &mut prompt,
            format!(
                "1) Generate a full podcast script in {language_name} with hook, clear sections, transitions, and natural spoken language."
            ),
        );
        push(
            &mut prompt,
            format!(
                "2) Include [KEY TAKEAWAYS] exactly {} bullets.",
                self.key_takeaways_count
            ),
        );
        push(&mut prompt, "3) Add [TIMESTAMPS ESTIMATE] per section based on length.".to_string());
        push(
            &mut prompt,
            format!(
                "4) Provide [SHOW NOTES] summary and [SEO PACK]: 3 alternative titles ({}), description (120–160 words), tags (if auto).",
                self.seo_title_style
            ),
        );
        push(
            &mut prompt,
            format!("5) If SSML guidance = {}, add {ssml_note}.", self.ssml_guidance),
        );
        push(&mut prompt, format!("6) End with a single, clear CTA: {cta}."));
        prompt
    }

    /// The stand-in script returned by the simulated script model.
    pub fn mock_script(&self) -> String {
        let topic = if self.topic.trim().is_empty() {
            "AI Generated Podcast Episode"
        } else {
            self.topic.trim()
        };
        let welcome = match self.language {
            Language::Thai => "สวัสดีครับ ยินดีต้อนรับสู่ Podcast Muse วันนี้เราจะมาพูดถึงเรื่อง",
            Language::English => "Hello and welcome to Podcast Muse! Today we're diving into",
        };
        let takeaways: String = (1..=self.key_takeaways_count)
            .map(|n| format!("• Key takeaway {n}\n"))
            .collect();

        format!(
            "# {topic}\n\n\
             ## Introduction (Hook)\n{welcome} {topic}...\n\n\
             ## Main Content\n\n\
             ### Act 1: The Foundation\nFirst, let's understand the fundamentals...\n\n\
             ### Act 2: Key Insights\nNow let's look at deep insights and real examples...\n\n\
             ### Act 3: Practical Applications\nLet's try applying this to real life...\n\n\
             ## Key Takeaways\n{takeaways}\n\
             ## Call to Action\nThanks for listening! Don't forget to {cta}!\n\n\
             ---\n\n\
             ## Show Notes\nIn this episode we learned about {topic}...\n\n\
             ## SEO Pack\n**Alternative Titles:**\n\
             1. {topic} - Complete Guide\n\
             2. How to {topic} - Easy Steps\n\
             3. {topic} - Tips You Must Know\n",
            cta = self.cta_type,
        )
    }

    /// Title used when the generated script is saved as a project.
    pub fn project_title(&self) -> String {
        if self.topic.trim().is_empty() {
            "Untitled Podcast Script".to_string()
        } else {
            self.topic.trim().to_string()
        }
    }

    /// One-line project description, e.g. `howto_framework podcast script (20 min) - friendly, warm`.
    pub fn project_description(&self) -> String {
        format!(
            "{} podcast script ({} min) - {}",
            self.format,
            self.episode_length_min,
            self.tone.join(", ")
        )
    }

    /// File name offered when the script is exported as plain text.
    pub fn export_file_name(&self) -> String {
        let topic = self.topic.trim();
        let stem: String = if topic.is_empty() {
            "untitled".to_string()
        } else {
            topic.chars().map(file_name_char).collect()
        };
        format!("podcast-script-{stem}.txt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_round_trip_through_their_wire_names() {
        assert_eq!("interview".parse::<EpisodeFormat>(), Ok(EpisodeFormat::Interview));
        assert_eq!(SpeakingPace::Fast.as_str(), "fast_170");
        let err = "podcast".parse::<Goal>().unwrap_err();
        assert_eq!(err.field, "Goal");
        assert_eq!(err.value, "podcast");
    }

    #[test]
    fn prompt_carries_every_section_and_custom_text() {
        let form = ComposeForm {
            topic: "Budgeting".to_string(),
            format: EpisodeFormat::Other,
            custom_format: "roundtable".to_string(),
            tone: vec!["friendly".into(), "other".into()],
            custom_tone: "playful".to_string(),
            ..Default::default()
        };
        let prompt = form.build_prompt();

        assert!(prompt.starts_with("[LANGUAGE]: th\n"));
        assert!(prompt.contains("[EPISODE_LENGTH]: 20 minutes (≈ normal_145 wpm)"));
        assert!(prompt.contains("[FORMAT]: other (roundtable)"));
        assert!(prompt.contains("[TONE]: friendly, other (playful)"));
        assert!(prompt.contains("[TOPIC]: Budgeting"));
        assert!(prompt.contains("[TAGS]: auto-generated"));
        assert!(prompt.contains("- brand_terms: (none)"));
        assert!(prompt.contains("in Thai with hook"));
        assert!(prompt.contains("6) End with a single, clear CTA: download_lead_magnet."));
        assert!(!prompt.contains("[INTERVIEW_GUEST_INTRO_DEPTH]"));
    }

    #[test]
    fn interview_format_adds_interview_section() {
        let form = ComposeForm {
            format: EpisodeFormat::Interview,
            cta_type: CallToAction::None,
            ..Default::default()
        };
        let prompt = form.build_prompt();
        assert!(prompt.contains("[INTERVIEW_GUEST_INTRO_DEPTH]: short"));
        assert!(prompt.contains("[INTERVIEW_QUESTIONS_STYLE]: mixed"));
        assert!(prompt.contains("no call to action"));
    }

    #[test]
    fn topic_is_only_required_when_user_provides_it() {
        let mut form = ComposeForm::default();
        assert!(form.topic_is_missing());
        form.topic_mode = TopicMode::AutoTitle;
        assert!(!form.topic_is_missing());
    }

    #[test]
    fn toggling_a_choice_adds_then_removes_it() {
        let mut tones = vec!["friendly".to_string()];
        toggle_choice(&mut tones, "warm");
        assert_eq!(tones, vec!["friendly", "warm"]);
        toggle_choice(&mut tones, "friendly");
        assert_eq!(tones, vec!["warm"]);
    }

    #[test]
    fn export_name_stays_one_path_component() {
        let form = ComposeForm {
            topic: "../../escape".to_string(),
            ..Default::default()
        };
        let name = form.export_file_name();
        assert_eq!(name, "podcast-script-..-..-escape.txt");
        let joined = std::path::Path::new("/tmp/out").join(&name);
        assert_eq!(joined.parent(), Some(std::path::Path::new("/tmp/out")));

        let form = ComposeForm {
            topic: "AI/ML: a\\b\tc".to_string(),
            ..Default::default()
        };
        assert_eq!(form.export_file_name(), "podcast-script-AI-ML- a-b-c.txt");
    }

    #[test]
    fn unknown_choices_list_the_accepted_values() {
        let err = "fr".parse::<Language>().unwrap_err();
        assert_eq!(err.to_string(), "'fr' is not a valid Language (expected one of: th, en)");
    }

    #[test]
    fn only_offered_episode_lengths_are_accepted() {
        assert_eq!(parse_episode_length("20"), Ok(20));
        assert_eq!(parse_episode_length(" 45 "), Ok(45));
        assert!(parse_episode_length("12").unwrap_err().contains("5, 10, 15, 20, 30, 45, 60"));
        assert!(parse_episode_length("ten").is_err());
    }

    #[test]
    fn saved_project_summary_and_export_name() {
        let mut form = ComposeForm::default();
        assert_eq!(form.project_title(), "Untitled Podcast Script");
        assert_eq!(form.export_file_name(), "podcast-script-untitled.txt");
        assert_eq!(
            form.project_description(),
            "howto_framework podcast script (20 min) - friendly, expert, warm"
        );

        form.topic = "Side hustles".to_string();
        form.key_takeaways_count = 3;
        assert_eq!(form.project_title(), "Side hustles");
        let script = form.mock_script();
        assert!(script.starts_with("# Side hustles"));
        assert_eq!(script.matches("• Key takeaway").count(), 3);
    }
}
