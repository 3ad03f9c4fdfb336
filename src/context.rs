//! Context snapshot consumed by the rule evaluator
//!
//! A fixed-size vector of string variables describing the current UI state.
//! Whoever builds menus fills it in; the evaluator only reads it.

/// Context subjects, indexed exactly as they appear in rule strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    MimeType,
    Filename,
    Directory,
    DirWriteAccess,
    FileIsText,
    FileIsDir,
    FileIsLink,
    UserIsRoot,
    MultipleSelected,
    ClipboardHasFiles,
    ClipboardHasText,
    CurrentPanel,
    PanelCount,
    CurrentTab,
    TabCount,
    Bookmark,
    Device,
    DeviceMountPoint,
    DeviceLabel,
    DeviceFstype,
    DeviceUdi,
    DeviceProperties,
    TaskCount,
    TaskDirectory,
    TaskName,
    Panel1Directory,
    Panel2Directory,
    Panel3Directory,
    Panel4Directory,
    Panel1HasSel,
    Panel2HasSel,
    Panel3HasSel,
    Panel4HasSel,
    Panel1Device,
    Panel2Device,
    Panel3Device,
    Panel4Device,
}

/// Number of context subjects
pub const SUBJECT_COUNT: usize = Subject::ALL.len();

impl Subject {
    pub const ALL: [Subject; 37] = [
        Subject::MimeType,
        Subject::Filename,
        Subject::Directory,
        Subject::DirWriteAccess,
        Subject::FileIsText,
        Subject::FileIsDir,
        Subject::FileIsLink,
        Subject::UserIsRoot,
        Subject::MultipleSelected,
        Subject::ClipboardHasFiles,
        Subject::ClipboardHasText,
        Subject::CurrentPanel,
        Subject::PanelCount,
        Subject::CurrentTab,
        Subject::TabCount,
        Subject::Bookmark,
        Subject::Device,
        Subject::DeviceMountPoint,
        Subject::DeviceLabel,
        Subject::DeviceFstype,
        Subject::DeviceUdi,
        Subject::DeviceProperties,
        Subject::TaskCount,
        Subject::TaskDirectory,
        Subject::TaskName,
        Subject::Panel1Directory,
        Subject::Panel2Directory,
        Subject::Panel3Directory,
        Subject::Panel4Directory,
        Subject::Panel1HasSel,
        Subject::Panel2HasSel,
        Subject::Panel3HasSel,
        Subject::Panel4HasSel,
        Subject::Panel1Device,
        Subject::Panel2Device,
        Subject::Panel3Device,
        Subject::Panel4Device,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    /// Human-readable name shown in the rule editor
    pub fn label(self) -> &'static str {
        match self {
            Subject::MimeType => "MIME Type",
            Subject::Filename => "Filename",
            Subject::Directory => "Directory",
            Subject::DirWriteAccess => "Dir Write Access",
            Subject::FileIsText => "File Is Text",
            Subject::FileIsDir => "File Is Dir",
            Subject::FileIsLink => "File Is Link",
            Subject::UserIsRoot => "User Is Root",
            Subject::MultipleSelected => "Multiple Selected",
            Subject::ClipboardHasFiles => "Clipboard Has Files",
            Subject::ClipboardHasText => "Clipboard Has Text",
            Subject::CurrentPanel => "Current Panel",
            Subject::PanelCount => "Panel Count",
            Subject::CurrentTab => "Current Tab",
            Subject::TabCount => "Tab Count",
            Subject::Bookmark => "Bookmark",
            Subject::Device => "Device",
            Subject::DeviceMountPoint => "Device Mount Point",
            Subject::DeviceLabel => "Device Label",
            Subject::DeviceFstype => "Device FSType",
            Subject::DeviceUdi => "Device UDI",
            Subject::DeviceProperties => "Device Properties",
            Subject::TaskCount => "Task Count",
            Subject::TaskDirectory => "Task Directory",
            Subject::TaskName => "Task Name",
            Subject::Panel1Directory => "Panel 1 Directory",
            Subject::Panel2Directory => "Panel 2 Directory",
            Subject::Panel3Directory => "Panel 3 Directory",
            Subject::Panel4Directory => "Panel 4 Directory",
            Subject::Panel1HasSel => "Panel 1 Has Sel",
            Subject::Panel2HasSel => "Panel 2 Has Sel",
            Subject::Panel3HasSel => "Panel 3 Has Sel",
            Subject::Panel4HasSel => "Panel 4 Has Sel",
            Subject::Panel1Device => "Panel 1 Device",
            Subject::Panel2Device => "Panel 2 Device",
            Subject::Panel3Device => "Panel 3 Device",
            Subject::Panel4Device => "Panel 4 Device",
        }
    }
}

/// Snapshot of the current UI context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSnapshot {
    vars: Vec<String>,
    /// False until the producer has filled in the variables
    pub valid: bool,
    /// Global policy: every enable/disable rule resolves to Disable
    pub actions_disabled: bool,
}

impl Default for ContextSnapshot {
    fn default() -> Self {
        Self {
            vars: vec![String::new(); SUBJECT_COUNT],
            valid: false,
            actions_disabled: false,
        }
    }
}

impl ContextSnapshot {
    /// Empty snapshot marked valid
    pub fn new() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    pub fn get(&self, subject: Subject) -> &str {
        &self.vars[subject.index()]
    }

    pub fn set(&mut self, subject: Subject, value: impl Into<String>) {
        self.vars[subject.index()] = value.into();
    }

    /// Builder-style variant of `set`
    pub fn with(mut self, subject: Subject, value: impl Into<String>) -> Self {
        self.set(subject, value);
        self
    }

    /// Set a boolean subject using the "true"/"false" convention
    pub fn set_flag(&mut self, subject: Subject, value: bool) {
        self.set(subject, if value { "true" } else { "false" });
    }
}
