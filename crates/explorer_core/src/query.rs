//! Job search query DSL.
//!
//! Searches are displayed and persisted in a canonical form,
//! `Owner: x | Prefix: y | Status: z` or `JobId: JOB123`, and parsed back into a
//! [`JobSearchCriteria`] when reused from history or favorites.

pub const JOB_ID_KEY: &str = "JobId: ";
pub const OWNER_KEY: &str = "Owner: ";
pub const PREFIX_KEY: &str = "Prefix: ";
pub const STATUS_KEY: &str = "Status: ";

const SEPARATOR: &str = " | ";

/// Longest owner or prefix JES accepts.
pub const JOBS_MAX_PREFIX: usize = 8;

pub const SUBMIT_QUERY_LABEL: &str = "Submit this query";
pub const CREATE_FILTER_LABEL: &str = "Create job search filter";
pub const SEARCH_BY_ID_LABEL: &str = "Search by job ID";

/// Status values offered when editing a structured query.
pub const JOB_STATUS_OPTIONS: [&str; 4] = ["*", "Active", "Input", "Output"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobSearchCriteria {
    pub owner: Option<String>,
    pub prefix: Option<String>,
    pub job_id: Option<String>,
    pub status: Option<String>,
}

impl JobSearchCriteria {
    pub fn by_job_id(job_id: impl Into<String>) -> Self {
        Self {
            job_id: Some(job_id.into()),
            ..Self::default()
        }
    }

    /// Canonical label for this search.
    pub fn label(&self) -> String {
        create_search_label(
            self.owner.as_deref(),
            self.prefix.as_deref(),
            self.job_id.as_deref(),
            self.status.as_deref(),
        )
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        let slot = match key {
            "Owner" => &mut self.owner,
            "Prefix" => &mut self.prefix,
            "JobId" => &mut self.job_id,
            "Status" => &mut self.status,
            _ => return false,
        };
        *slot = non_empty(value).map(str::to_string);
        true
    }
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value).filter(|v| !v.is_empty())
}

/// Parses a canonical search string.
///
/// Tokens are separated by ` | ` or by whitespace that does not follow a `:`.
/// Tokens without a colon and unknown keys are dropped, never reported.
pub fn parse_job_search_query(input: &str) -> JobSearchCriteria {
    let mut criteria = JobSearchCriteria::default();
    for token in split_query_tokens(input) {
        if !token.contains(':') {
            continue;
        }
        let token = token.strip_prefix(':').unwrap_or(token);
        let mut parts = token.split(':');
        let key = parts.next().unwrap_or_default().trim();
        let value = parts.next().unwrap_or_default().trim();
        if !criteria.set(key, value) {
            explorer_logging::explorer_debug!("Ignoring unknown search key {:?}", key);
        }
    }
    criteria
}

fn split_query_tokens(input: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < chars.len() {
        let (pos, c) = chars[i];
        if !c.is_whitespace() {
            i += 1;
            continue;
        }
        let pipe_separator = matches!(
            (chars.get(i + 1), chars.get(i + 2)),
            (Some((_, '|')), Some((_, after))) if after.is_whitespace()
        );
        if pipe_separator {
            tokens.push(&input[start..pos]);
            i += 3;
            start = chars.get(i).map_or(input.len(), |(p, _)| *p);
            continue;
        }
        let after_colon = i > 0 && chars[i - 1].1 == ':';
        if !after_colon {
            tokens.push(&input[start..pos]);
            start = pos + c.len_utf8();
        }
        i += 1;
    }
    tokens.push(&input[start..]);
    tokens
}

/// Serializes search fields into the canonical display form.
///
/// A job id wins over every other field and is upper-cased.
pub fn create_search_label(
    owner: Option<&str>,
    prefix: Option<&str>,
    job_id: Option<&str>,
    status: Option<&str>,
) -> String {
    if let Some(job_id) = job_id.map(str::trim).filter(|id| !id.is_empty()) {
        return format!("{JOB_ID_KEY}{}", job_id.to_uppercase());
    }
    let parts: Vec<String> = [(OWNER_KEY, owner), (PREFIX_KEY, prefix), (STATUS_KEY, status)]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| format!("{key}{v}"))
        })
        .collect();
    parts.join(SEPARATOR)
}

/// Validates an owner or prefix typed by the user.
pub fn validate_job_string(text: &str, property: JobProperty) -> Result<(), String> {
    if text.chars().count() <= JOBS_MAX_PREFIX {
        return Ok(());
    }
    Err(match property {
        JobProperty::Owner => "Invalid job owner".to_string(),
        JobProperty::Prefix | JobProperty::Status => "Invalid job prefix".to_string(),
    })
}

/// How the user chose to search a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMenuChoice {
    /// Build a query field by field.
    QuerySearch,
    /// Look up a single job id.
    IdSearch,
    /// Reuse an entry from the search history.
    History(String),
}

impl SearchMenuChoice {
    pub fn label(&self) -> &str {
        match self {
            SearchMenuChoice::QuerySearch => CREATE_FILTER_LABEL,
            SearchMenuChoice::IdSearch => SEARCH_BY_ID_LABEL,
            SearchMenuChoice::History(entry) => entry,
        }
    }
}

/// Menu offered before a search: the two input modes followed by recent searches.
pub fn search_menu(history: &[String]) -> Vec<SearchMenuChoice> {
    let mut choices = vec![SearchMenuChoice::QuerySearch, SearchMenuChoice::IdSearch];
    choices.extend(history.iter().cloned().map(SearchMenuChoice::History));
    choices
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobProperty {
    Owner,
    Prefix,
    Status,
}

impl JobProperty {
    pub fn label(self) -> &'static str {
        match self {
            JobProperty::Owner => "Job Owner",
            JobProperty::Prefix => "Job Prefix",
            JobProperty::Status => "Job Status",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            JobProperty::Owner => "Enter job owner ID",
            JobProperty::Prefix => "Enter job prefix",
            JobProperty::Status => "Enter job status",
        }
    }
}

/// One row of the structured query editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerItem {
    pub label: String,
    pub description: Option<String>,
}

/// Result of selecting a row in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorStep {
    /// Prompt for a new owner or prefix value.
    EditField(JobProperty),
    /// Offer [`JOB_STATUS_OPTIONS`].
    ChooseStatus,
    /// The query is complete; the editor has been reset.
    Submit(JobSearchCriteria),
    /// The selection matched no row; show the editor again.
    Unchanged,
}

/// Structured owner/prefix/status editing with a "submit" sentinel row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQueryEditor {
    owner: Option<String>,
    prefix: Option<String>,
    status: Option<String>,
}

impl Default for JobQueryEditor {
    fn default() -> Self {
        Self {
            owner: Some(String::new()),
            prefix: Some("*".to_string()),
            status: Some("*".to_string()),
        }
    }
}

impl JobQueryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor prefilled from a search reused from history.
    pub fn from_criteria(criteria: &JobSearchCriteria) -> Self {
        Self {
            owner: criteria.owner.clone(),
            prefix: criteria.prefix.clone(),
            status: criteria.status.clone(),
        }
    }

    pub fn value(&self, property: JobProperty) -> Option<&str> {
        match property {
            JobProperty::Owner => self.owner.as_deref(),
            JobProperty::Prefix => self.prefix.as_deref(),
            JobProperty::Status => self.status.as_deref(),
        }
    }

    pub fn set_value(&mut self, property: JobProperty, value: Option<String>) {
        match property {
            JobProperty::Owner => self.owner = value,
            JobProperty::Prefix => self.prefix = value,
            JobProperty::Status => self.status = value,
        }
    }

    /// Rows to display; an empty owner is filled in with the session user first.
    pub fn items(&mut self, session_user: Option<&str>) -> Vec<PickerItem> {
        if self.owner.as_deref().map_or(true, str::is_empty) {
            self.owner = session_user.map(str::to_string);
        }
        let mut items = vec![PickerItem {
            label: SUBMIT_QUERY_LABEL.to_string(),
            description: None,
        }];
        for property in [JobProperty::Owner, JobProperty::Prefix, JobProperty::Status] {
            items.push(PickerItem {
                label: property.label().to_string(),
                description: self.value(property).map(str::to_string),
            });
        }
        items
    }

    pub fn select(&mut self, label: &str, session_user: Option<&str>) -> EditorStep {
        if label == SUBMIT_QUERY_LABEL {
            let owner = match self.owner.as_deref().filter(|o| !o.is_empty()) {
                Some(owner) => owner.to_string(),
                None => session_user.unwrap_or("*").to_string(),
            };
            let prefix = self
                .prefix
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "*".to_string());
            let status = self
                .status
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "*".to_string());
            *self = Self::default();
            return EditorStep::Submit(JobSearchCriteria {
                owner: Some(owner),
                prefix: Some(prefix),
                job_id: None,
                status: Some(status),
            });
        }
        match label {
            l if l == JobProperty::Status.label() => EditorStep::ChooseStatus,
            l if l == JobProperty::Owner.label() => EditorStep::EditField(JobProperty::Owner),
            l if l == JobProperty::Prefix.label() => EditorStep::EditField(JobProperty::Prefix),
            _ => EditorStep::Unchanged,
        }
    }
}
