use std::time::Duration;

use formats::feature_collection::Feature;

/// Label used when a feature has no display name.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Delay between the pointer entering a flat-map feature and its popup opening.
pub const HOVER_OPEN_DELAY: Duration = Duration::from_millis(300);

/// Navigation prefix supplied by the embedding page.
///
/// Both parts are used verbatim; `permalink_base` is expected to begin and end
/// with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationBase {
    pub base_url: String,
    pub permalink_base: String,
}

impl NavigationBase {
    pub fn new(base_url: impl Into<String>, permalink_base: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            permalink_base: permalink_base.into(),
        }
    }

    pub fn target_for_slug(&self, slug: &str) -> String {
        format!("{}{}{}", self.base_url, self.permalink_base, slug)
    }
}

/// Everything a surface needs to wire up one rendered feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureBinding {
    pub label: String,
    pub slug: String,
    /// Full-page navigation target opened on click.
    pub target: String,
}

/// Display name of `feature`, or [`UNKNOWN_LABEL`].
pub fn feature_label<'a>(feature: &'a Feature, name_field: &str) -> &'a str {
    feature.property_str(name_field).unwrap_or(UNKNOWN_LABEL)
}

/// Lowercases, trims, and joins whitespace-separated words with `-`.
///
/// `slugify(slugify(s)) == slugify(s)` for every `s`.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

pub fn bind_feature(feature: &Feature, name_field: &str, nav: &NavigationBase) -> FeatureBinding {
    let label = feature_label(feature, name_field).to_string();
    let slug = slugify(&label);
    let target = nav.target_for_slug(&slug);
    FeatureBinding {
        label,
        slug,
        target,
    }
}

/// Escapes text for insertion into HTML popups and tooltips.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// `<b>label</b>` with the label escaped, for the globe tooltip.
pub fn label_html(label: &str) -> String {
    format!("<b>{}</b>", escape_html(label))
}

/// Handle for one scheduled popup open.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HoverTicket {
    pub feature: usize,
    generation: u64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum HoverState {
    #[default]
    Idle,
    Pending(usize),
    Open(usize),
}

/// Delayed-open / immediate-close popup state for hover tooltips.
///
/// The host schedules a timer for [`HOVER_OPEN_DELAY`] on every
/// [`pointer_enter`](Self::pointer_enter) and passes the ticket back to
/// [`fire`](Self::fire) when it elapses. Any later enter or exit invalidates
/// older tickets, so a timer that outlives its pointer never opens a popup.
#[derive(Debug, Default)]
pub struct HoverDebounce {
    generation: u64,
    state: HoverState,
}

impl HoverDebounce {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> HoverState {
        self.state
    }

    /// Returns the popup to close first, if another one is open, plus the
    /// ticket to fire after the delay.
    pub fn pointer_enter(&mut self, feature: usize) -> (Option<usize>, HoverTicket) {
        self.generation = self.generation.wrapping_add(1);
        let close = match self.state {
            HoverState::Open(open) if open != feature => Some(open),
            _ => None,
        };
        self.state = match self.state {
            HoverState::Open(open) if open == feature => HoverState::Open(open),
            _ => HoverState::Pending(feature),
        };
        let ticket = HoverTicket {
            feature,
            generation: self.generation,
        };
        (close, ticket)
    }

    /// Returns the feature whose popup should open now, if the ticket is
    /// still current.
    pub fn fire(&mut self, ticket: HoverTicket) -> Option<usize> {
        if ticket.generation != self.generation {
            return None;
        }
        match self.state {
            HoverState::Pending(feature) if feature == ticket.feature => {
                self.state = HoverState::Open(feature);
                Some(feature)
            }
            _ => None,
        }
    }

    /// Cancels any pending open. Returns the popup to close, if one is open.
    pub fn pointer_exit(&mut self) -> Option<usize> {
        self.generation = self.generation.wrapping_add(1);
        let close = match self.state {
            HoverState::Open(feature) => Some(feature),
            _ => None,
        };
        self.state = HoverState::Idle;
        close
    }
}
