//! Card rendering for the history and saved panels.
//!
//! Every text that comes from the backend passes through [`escape_html`] before it
//! lands in markup, including language codes.

use std::fmt::Write as _;

use time::{
    OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339,
    macros::format_description,
};

use crate::{
    api::{HistoryItem, Rating, SavedTranslation},
    config::Theme,
    controller::HistoryEntry,
};

/// Neutralise the characters that matter in HTML text and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Format a backend timestamp as `YYYY-MM-DD HH:MM:SS`; unknown shapes pass through.
pub fn format_timestamp(raw: &str) -> String {
    let output = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let trimmed = raw.trim();

    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        if let Ok(formatted) = parsed.format(output) {
            return formatted;
        }
    }

    let naive_formats = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ];
    for format in naive_formats {
        if let Ok(parsed) = PrimitiveDateTime::parse(trimmed, format) {
            if let Ok(formatted) = parsed.format(output) {
                return formatted;
            }
        }
    }

    trimmed.to_string()
}

/// Which delete handler a card's remove button calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteAction {
    History,
    Saved,
}

impl DeleteAction {
    fn handler(self, id: i64) -> String {
        match self {
            DeleteAction::History => format!("deleteHistoryItem({id})"),
            DeleteAction::Saved => format!("deleteSavedItem({id})"),
        }
    }
}

/// View of one history or saved row, independent of its source list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card<'a> {
    pub id: i64,
    pub original_text: &'a str,
    pub translated_text: &'a str,
    pub source_lang: &'a str,
    pub target_lang: &'a str,
    pub rating: Option<Rating>,
    pub suggestion: Option<&'a str>,
    pub saved: bool,
    pub created_at: &'a str,
}

impl<'a> Card<'a> {
    pub fn from_history(item: &'a HistoryItem, saved: bool) -> Self {
        Self {
            id: item.id,
            original_text: &item.original_text,
            translated_text: &item.translated_text,
            source_lang: &item.source_lang,
            target_lang: &item.target_lang,
            rating: item.rating,
            suggestion: non_empty(item.suggestion.as_deref()),
            saved,
            created_at: &item.created_at,
        }
    }

    pub fn from_entry(entry: &'a HistoryEntry) -> Self {
        Self::from_history(&entry.item, entry.saved)
    }

    pub fn from_saved(item: &'a SavedTranslation) -> Self {
        Self {
            id: item.id,
            original_text: &item.original_text,
            translated_text: &item.translated_text,
            source_lang: &item.source_lang,
            target_lang: &item.target_lang,
            rating: item.rating,
            suggestion: non_empty(item.suggestion.as_deref()),
            saved: true,
            created_at: &item.created_at,
        }
    }

    fn source_label(&self) -> &str {
        if self.source_lang.is_empty() { "?" } else { self.source_lang }
    }

    fn target_label(&self) -> &str {
        if self.target_lang.is_empty() { "?" } else { self.target_lang }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

/// Unified card markup used by both list panels.
pub fn render_card_html(card: &Card<'_>, delete_action: DeleteAction) -> String {
    let mut icons = String::new();
    match card.rating {
        Some(Rating::Like) => icons.push_str(r#"<i class="fa-solid fa-thumbs-up" title="Liked"></i>"#),
        Some(Rating::Dislike) => {
            icons.push_str(r#"<i class="fa-solid fa-thumbs-down" title="Disliked"></i>"#)
        }
        None => {}
    }
    if card.suggestion.is_some() {
        icons.push_str(r#"<i class="fa-solid fa-pen-to-square" title="Edited"></i>"#);
    }
    if card.saved {
        icons.push_str(r#"<i class="fa-solid fa-bookmark" title="Saved"></i>"#);
    }

    let mut html = String::new();
    let _ = write!(
        html,
        concat!(
            r#"<div class="history-card" data-id="{id}">"#,
            r#"<div class="history-content-row"><div class="lang-label">From: {source}</div>"#,
            r#"<div class="text-content">{original}</div></div>"#,
            r#"<div class="history-content-row"><div class="lang-label">To: {target}</div>"#,
            r#"<div class="text-content translated">{translated}</div></div>"#,
        ),
        id = card.id,
        source = escape_html(card.source_label()),
        original = escape_html(card.original_text),
        target = escape_html(card.target_label()),
        translated = escape_html(card.translated_text),
    );
    if let Some(suggestion) = card.suggestion {
        let _ = write!(
            html,
            r#"<div class="suggestion"><strong>Edit:</strong> {}</div>"#,
            escape_html(suggestion)
        );
    }
    let _ = write!(
        html,
        concat!(
            r#"<div class="timestamp">{timestamp}</div>"#,
            r#"<div class="card-actions"><div class="meta-icons">{icons}</div>"#,
            r#"<button class="remove-btn" onclick="{handler}">"#,
            r#"<i class="fa-solid fa-trash"></i> Remove</button></div></div>"#,
        ),
        timestamp = escape_html(&format_timestamp(card.created_at)),
        icons = icons,
        handler = delete_action.handler(card.id),
    );
    html
}

/// Standalone HTML document holding `cards`, themed with `data-theme`.
pub fn render_page_html(
    title: &str,
    cards: &[Card<'_>],
    delete_action: DeleteAction,
    theme: Theme,
    empty_message: &str,
) -> String {
    let mut body = String::new();
    if cards.is_empty() {
        let _ = write!(body, r#"<div class="empty">{}</div>"#, escape_html(empty_message));
    } else {
        for card in cards {
            body.push_str(&render_card_html(card, delete_action));
            body.push('\n');
        }
    }
    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\" data-theme=\"{theme}\">\n",
            "<head><meta charset=\"utf-8\"><title>{title}</title></head>\n",
            "<body>\n<h1>{title}</h1>\n<div class=\"card-list\">\n{body}</div>\n</body>\n</html>\n",
        ),
        theme = theme.as_str(),
        title = escape_html(title),
        body = body,
    )
}

/// Plain-text rendering of `cards` for the terminal.
pub fn render_cards_text(cards: &[Card<'_>], empty_message: &str) -> String {
    if cards.is_empty() {
        return format!("{empty_message}\n");
    }

    let mut out = String::new();
    for card in cards {
        let mut marks = Vec::new();
        match card.rating {
            Some(Rating::Like) => marks.push("liked"),
            Some(Rating::Dislike) => marks.push("disliked"),
            None => {}
        }
        if card.suggestion.is_some() {
            marks.push("edited");
        }
        if card.saved {
            marks.push("saved");
        }

        let _ = write!(
            out,
            "#{id}  {source} -> {target}  {timestamp}",
            id = card.id,
            source = card.source_label(),
            target = card.target_label(),
            timestamp = format_timestamp(card.created_at),
        );
        if !marks.is_empty() {
            let _ = write!(out, "  [{}]", marks.join(", "));
        }
        out.push('\n');
        let _ = writeln!(out, "  {}", card.original_text);
        let _ = writeln!(out, "  {}", card.translated_text);
        if let Some(suggestion) = card.suggestion {
            let _ = writeln!(out, "  Edit: {suggestion}");
        }
    }
    out
}
