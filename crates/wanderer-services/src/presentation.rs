//! Formatting engine activity for a terminal display
//!
//! Lines are built as lightweight markup (`<note>...</note>`) and turned into
//! ANSI styling by [`MarkupRenderer`].

use regex::{Captures, Regex};
use wanderer_core::ProcessorSnapshot;

use crate::dispatch::Activity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Error,
    Note,
    Accent,
    Success,
    Info,
    Processor,
    State,
}

impl Style {
    pub const ALL: [Style; 7] = [
        Style::Error,
        Style::Note,
        Style::Accent,
        Style::Success,
        Style::Info,
        Style::Processor,
        Style::State,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Note => "note",
            Self::Accent => "accent",
            Self::Success => "success",
            Self::Info => "info",
            Self::Processor => "processor",
            Self::State => "state",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.tag() == tag)
    }

    /// SGR parameters for this style
    fn sgr(self) -> &'static str {
        match self {
            Self::Error => "1;91",
            Self::Note => "96",
            Self::Accent => "3;93",
            Self::Success => "92",
            Self::Info => "90",
            Self::Processor => "1;33",
            Self::State => "32",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    pub content: String,
    pub style: Style,
}

impl DisplayLine {
    pub fn new(content: impl Into<String>, style: Style) -> Self {
        Self { content: content.into(), style }
    }

    pub fn to_markup(&self) -> String {
        let tag = self.style.tag();
        format!("<{tag}>{}</{tag}>", self.content)
    }
}

/// `counter | op operand | value`
pub fn format_automaton(snapshot: &ProcessorSnapshot) -> DisplayLine {
    let state = &snapshot.state;
    let content = format!(
        "{:02} | {} {:02} | {:02}",
        state.counter,
        state.operator.symbol(),
        state.operand,
        snapshot.value
    );
    DisplayLine::new(content, Style::State)
}

/// Automaton summary followed by the harmonic table, selected entry bracketed
pub fn format_processor(snapshot: &ProcessorSnapshot) -> DisplayLine {
    let harmonics: String = snapshot
        .harmonics
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if snapshot.last_index == Some(i) {
                format!("[{h:02}]")
            } else {
                format!(" {h:02} ")
            }
        })
        .collect();
    let automaton = format_automaton(snapshot);
    DisplayLine::new(format!(" {} | {harmonics}", automaton.content), Style::Processor)
}

pub fn format_event(activity: &Activity) -> DisplayLine {
    let start = activity.is_start();
    let marker = if start { "•" } else { " " };
    let mut content = format!("{marker} {:02} → {:02}", activity.input.note, activity.output.note);
    match &activity.snapshot {
        Some(snapshot) if start => {
            content.push_str(" | ");
            content.push_str(&format_processor(snapshot).content);
            DisplayLine::new(content, Style::Note)
        }
        _ if start => DisplayLine::new(content, Style::Note),
        _ => DisplayLine::new(content, Style::Info),
    }
}

/// Which of `panes` display panes a channel's activity goes to
pub fn pane_for_channel(channel: u8, panes: usize) -> usize {
    channel as usize % panes.max(1)
}

const RESET: &str = "\x1b[0m";

/// Replaces `<tag>text</tag>` spans of known styles with ANSI escapes, or
/// strips the tags when color is off. Unknown tags are left alone.
pub struct MarkupRenderer {
    pattern: Regex,
    color: bool,
}

impl MarkupRenderer {
    pub fn new(color: bool) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(r"<(\w+)>(.*?)</(\w+)>")?,
            color,
        })
    }

    pub fn render(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures| {
                let style = Style::from_tag(&caps[1]).filter(|_| caps[1] == caps[3]);
                match style {
                    Some(style) if self.color => format!("\x1b[{}m{}{RESET}", style.sgr(), &caps[2]),
                    Some(_) => caps[2].to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}
