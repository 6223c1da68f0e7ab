use serde::{Deserialize, Serialize};

/// A batch job as reported by the JES job listing API.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Job {
    pub jobid: String,
    pub jobname: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub retcode: Option<String>,
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub subsystem: Option<String>,
    #[serde(default, rename = "exec-member")]
    pub exec_member: Option<String>,
    #[serde(default, rename = "exec-submitted")]
    pub exec_submitted: Option<String>,
    #[serde(default, rename = "exec-started")]
    pub exec_started: Option<String>,
    #[serde(default, rename = "exec-ended")]
    pub exec_ended: Option<String>,
}

impl Job {
    pub fn new(jobname: impl Into<String>, jobid: impl Into<String>) -> Self {
        Self {
            jobname: jobname.into(),
            jobid: jobid.into(),
            ..Self::default()
        }
    }

    /// Recovers name and id from a `JOBNAME(JOBID)` style label.
    ///
    /// Used for favorites restored from persisted lines, which only carry the label.
    pub fn from_label(label: &str) -> Self {
        let open = label.find('(');
        let close = label.find(')');
        let jobname = open.map(|i| &label[..i]).unwrap_or_default();
        let jobid = match (open, close) {
            (Some(o), Some(c)) if c > o => &label[o + 1..c],
            _ => "",
        };
        Self::new(jobname, jobid)
    }

    /// `JOBNAME(JOBID)`, the stable part of every job label.
    pub fn display_name(&self) -> String {
        format!("{}({})", self.jobname, self.jobid)
    }

    fn member(&self) -> Option<&str> {
        self.exec_member.as_deref().filter(|m| !m.is_empty())
    }

    fn retcode(&self) -> Option<&str> {
        self.retcode.as_deref().filter(|rc| !rc.is_empty())
    }

    /// Label shown in the tree: return code when the job has one, status otherwise.
    pub fn tree_label(&self) -> String {
        match (self.retcode(), self.member()) {
            (Some(rc), Some(member)) => format!("{} - {member} - {rc}", self.display_name()),
            (Some(rc), None) => format!("{} - {rc}", self.display_name()),
            (None, _) => format!(
                "{} - {}",
                self.display_name(),
                self.status.as_deref().unwrap_or_default()
            ),
        }
    }

    /// Composite string the local filter matches against.
    pub fn filter_text(&self) -> String {
        let rc = self.retcode.as_deref().unwrap_or_default();
        match self.member() {
            Some(member) => format!("{} - {member} - {rc}", self.display_name()),
            None => format!("{} - {rc}", self.display_name()),
        }
    }

    /// Jobs that already ended through a cancel or an abend cannot be cancelled again.
    pub fn is_cancelled_or_abended(&self) -> bool {
        self.retcode
            .as_deref()
            .is_some_and(|rc| rc.contains("CANCEL") || rc.contains("ABEND"))
    }
}

/// A spool file (JES output data set) belonging to a job.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpoolFile {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub ddname: Option<String>,
    #[serde(default)]
    pub stepname: Option<String>,
    #[serde(default)]
    pub procstep: Option<String>,
    #[serde(default)]
    pub jobname: Option<String>,
    #[serde(default)]
    pub jobid: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default, rename = "record-count")]
    pub record_count: Option<u64>,
    #[serde(default, rename = "byte-count")]
    pub byte_count: Option<u64>,
}

/// Identity of a spool file within a job, independent of its numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpoolKey {
    pub stepname: Option<String>,
    pub ddname: Option<String>,
    pub procstep: Option<String>,
}

impl SpoolFile {
    pub fn new(stepname: &str, ddname: &str, id: u32) -> Self {
        Self {
            id: Some(id),
            stepname: Some(stepname.to_string()),
            ddname: Some(ddname.to_string()),
            ..Self::default()
        }
    }

    pub fn with_procstep(mut self, procstep: &str) -> Self {
        self.procstep = Some(procstep.to_string());
        self
    }

    /// Some JES implementations return entries that carry none of the identifying fields.
    pub fn is_well_formed(&self) -> bool {
        self.id.is_some() || self.ddname.is_some() || self.stepname.is_some()
    }

    fn procstep(&self) -> Option<&str> {
        self.procstep.as_deref().filter(|p| !p.is_empty())
    }

    pub fn key(&self) -> SpoolKey {
        SpoolKey {
            stepname: self.stepname.clone(),
            ddname: self.ddname.clone(),
            procstep: self.procstep().map(str::to_string),
        }
    }

    /// `STEP:DD(ID)`, suffixed with ` - PROCSTEP` when the spool file has one.
    pub fn tree_label(&self) -> String {
        let base = format!(
            "{}:{}({})",
            self.stepname.as_deref().unwrap_or_default(),
            self.ddname.as_deref().unwrap_or_default(),
            self.id.map(|id| id.to_string()).unwrap_or_default()
        );
        match self.procstep() {
            Some(procstep) => format!("{base} - {procstep}"),
            None => base,
        }
    }

    /// File name used for this spool file in the virtual file system.
    pub fn unique_name(&self) -> String {
        let id = self.id.map(|id| id.to_string());
        [
            self.stepname.as_deref(),
            self.procstep(),
            self.ddname.as_deref(),
            id.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".")
        .replace('/', "")
    }
}

/// Encoding override applied when downloading spool content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpoolEncoding {
    Text,
    Binary,
    Other { codepage: String },
}
