//! Link session state.
//!
//! Pure transitions over [`LinkSession`]; nothing here talks to the engine. Every transition
//! keeps `status == Hidden => current_url.is_empty()`.

use serde::Serialize;

use crate::engine::{LinkNode, SelectionSnapshot};
use crate::url::{PLACEHOLDER_URL, is_submittable, is_valid_url};

/// Link editor status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    /// No link session.
    #[default]
    Hidden,
    /// Showing an existing link.
    Viewing,
    /// Editing a link's destination (or a new link's).
    Editing,
}

/// One editor's link session.
#[derive(Debug, Clone)]
pub struct LinkSession {
    status: LinkStatus,
    current_url: String,
    edited_url: String,
    last_selection: Option<SelectionSnapshot>,
    link: Option<LinkNode>,
    insert_pending: bool,
}

impl Default for LinkSession {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkSession {
    /// A hidden session.
    pub fn new() -> Self {
        Self {
            status: LinkStatus::Hidden,
            current_url: String::new(),
            edited_url: PLACEHOLDER_URL.to_string(),
            last_selection: None,
            link: None,
            insert_pending: false,
        }
    }

    /// Current status.
    pub fn status(&self) -> LinkStatus {
        self.status
    }

    /// Committed destination of the link being shown (empty when hidden or inserting).
    pub fn current_url(&self) -> &str {
        &self.current_url
    }

    /// Contents of the URL input.
    pub fn edited_url(&self) -> &str {
        &self.edited_url
    }

    /// Selection captured the last time the session was shown.
    pub fn last_selection(&self) -> Option<&SelectionSnapshot> {
        self.last_selection.as_ref()
    }

    /// The link node being shown or edited (`None` while inserting a new link).
    pub fn link(&self) -> Option<&LinkNode> {
        self.link.as_ref()
    }

    /// A link-insert is in progress and nothing has been committed yet.
    pub fn is_insert_pending(&self) -> bool {
        self.insert_pending
    }

    /// Viewing or editing.
    pub fn is_active(&self) -> bool {
        self.status != LinkStatus::Hidden
    }

    /// Editing.
    pub fn is_editing(&self) -> bool {
        self.status == LinkStatus::Editing
    }

    /// Input validity for display (the placeholder counts as valid).
    pub fn is_valid_url(&self) -> bool {
        is_valid_url(&self.edited_url)
    }

    /// Whether submit would commit.
    pub fn can_submit(&self) -> bool {
        self.is_editing() && is_submittable(&self.edited_url)
    }

    fn transition(&mut self, to: LinkStatus, trigger: &'static str) {
        if self.status != to {
            tracing::debug!(from = ?self.status, ?to, trigger, "link session transition");
        }
        self.status = to;
    }

    /// The selection is in `link`; `snapshot` replaces the retained selection.
    ///
    /// Hidden/Viewing move to Viewing. Editing the same link stays in Editing (only the
    /// committed URL is refreshed); a different link ends the edit.
    pub fn view(&mut self, link: LinkNode, snapshot: SelectionSnapshot) {
        let same_link = self.link.as_ref().is_some_and(|l| l.key == link.key);
        self.current_url = link.url().to_string();
        self.last_selection = Some(snapshot);
        if self.status == LinkStatus::Editing && same_link {
            self.link = Some(link);
            return;
        }
        self.link = Some(link);
        self.insert_pending = false;
        self.edited_url = self.current_url.clone();
        self.transition(LinkStatus::Viewing, "selection in link");
    }

    /// Insert-link over plain text: edit a new link starting from the placeholder.
    pub fn begin_insert(&mut self, snapshot: SelectionSnapshot) {
        self.current_url.clear();
        self.edited_url = PLACEHOLDER_URL.to_string();
        self.last_selection = Some(snapshot);
        self.link = None;
        self.insert_pending = true;
        self.transition(LinkStatus::Editing, "insert link");
    }

    /// Insert-link inside an existing link: edit that link.
    pub fn begin_edit_of(&mut self, link: LinkNode, snapshot: SelectionSnapshot) {
        self.current_url = link.url().to_string();
        self.edited_url = self.current_url.clone();
        self.last_selection = Some(snapshot);
        self.link = Some(link);
        self.insert_pending = false;
        self.transition(LinkStatus::Editing, "insert link on existing link");
    }

    /// Viewing → Editing, seeding the input with the committed URL.
    pub fn start_edit(&mut self) -> bool {
        if self.status != LinkStatus::Viewing {
            return false;
        }
        self.edited_url = self.current_url.clone();
        self.transition(LinkStatus::Editing, "start edit");
        true
    }

    /// Replace the URL input's contents.
    pub fn set_edited_url(&mut self, url: impl Into<String>) {
        self.edited_url = url.into();
    }

    /// Leave Editing, discarding the input. Back to Viewing if a link exists (resolved, or
    /// committed and not yet re-resolved), else Hidden.
    pub fn cancel(&mut self, trigger: &'static str) -> bool {
        if self.status != LinkStatus::Editing {
            return false;
        }
        if self.link.is_some() || !self.current_url.is_empty() {
            self.edited_url = self.current_url.clone();
            self.insert_pending = false;
            self.transition(LinkStatus::Viewing, trigger);
        } else {
            self.hide(trigger);
        }
        true
    }

    /// Editing → Viewing after the engine accepted `url`.
    ///
    /// The link node is dropped here and re-resolved from the engine on the next refresh,
    /// since committing may have created or replaced it.
    pub fn commit(&mut self, url: String) {
        self.current_url = url.clone();
        self.edited_url = url;
        self.link = None;
        self.insert_pending = false;
        self.transition(LinkStatus::Viewing, "submit");
    }

    /// Back to Hidden, clearing everything.
    pub fn hide(&mut self, trigger: &'static str) {
        self.current_url.clear();
        self.edited_url = PLACEHOLDER_URL.to_string();
        self.last_selection = None;
        self.link = None;
        self.insert_pending = false;
        self.transition(LinkStatus::Hidden, trigger);
    }
}
