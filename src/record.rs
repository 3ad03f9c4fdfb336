//! XSet records
//!
//! One record is one configurable item: a menu entry, a toolbar button, a
//! stored preference or a user-defined command. Records refer to each other
//! only by name; the store resolves those names on demand.

use std::path::PathBuf;

/// Boolean that also remembers whether it was ever set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriState {
    #[default]
    Unset,
    True,
    False,
}

impl TriState {
    /// On-disk code, `None` when the value is not written at all
    pub fn code(self) -> Option<u8> {
        match self {
            TriState::Unset => None,
            TriState::True => Some(1),
            TriState::False => Some(2),
        }
    }

    /// Parse an on-disk code; anything unrecognized reads as unset
    pub fn from_code(value: &str) -> Self {
        match value.trim() {
            "1" => TriState::True,
            "2" => TriState::False,
            _ => TriState::Unset,
        }
    }

    pub fn from_bool(value: bool) -> Self {
        if value { TriState::True } else { TriState::False }
    }

    pub fn is_true(self) -> bool {
        self == TriState::True
    }
}

/// How a record presents itself in a menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuStyle {
    #[default]
    Normal,
    Checkbox,
    StringInput,
    Radio,
    FilePicker,
    FontPicker,
    IconPicker,
    ColorPicker,
    Confirm,
    Submenu,
    Separator,
}

impl MenuStyle {
    pub fn code(self) -> i32 {
        match self {
            MenuStyle::Normal => 0,
            MenuStyle::Checkbox => 1,
            MenuStyle::StringInput => 2,
            MenuStyle::Radio => 3,
            MenuStyle::FilePicker => 4,
            MenuStyle::FontPicker => 5,
            MenuStyle::IconPicker => 6,
            MenuStyle::ColorPicker => 7,
            MenuStyle::Confirm => 8,
            MenuStyle::Submenu => 17,
            MenuStyle::Separator => 18,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        let style = match code {
            0 => MenuStyle::Normal,
            1 => MenuStyle::Checkbox,
            2 => MenuStyle::StringInput,
            3 => MenuStyle::Radio,
            4 => MenuStyle::FilePicker,
            5 => MenuStyle::FontPicker,
            6 => MenuStyle::IconPicker,
            7 => MenuStyle::ColorPicker,
            8 => MenuStyle::Confirm,
            17 => MenuStyle::Submenu,
            18 => MenuStyle::Separator,
            _ => return None,
        };
        Some(style)
    }
}

/// Toolbar role of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Not on a toolbar
    #[default]
    None,
    /// User item placed on a toolbar
    Custom,
    Devices,
    Bookmarks,
    Tree,
    Home,
    Default,
    Up,
    Back,
    BackMenu,
    Forward,
    ForwardMenu,
    Refresh,
    NewTab,
    NewTabHere,
    ShowHidden,
    ShowThumb,
    LargeIcons,
}

impl Tool {
    const ALL: [Tool; 18] = [
        Tool::None,
        Tool::Custom,
        Tool::Devices,
        Tool::Bookmarks,
        Tool::Tree,
        Tool::Home,
        Tool::Default,
        Tool::Up,
        Tool::Back,
        Tool::BackMenu,
        Tool::Forward,
        Tool::ForwardMenu,
        Tool::Refresh,
        Tool::NewTab,
        Tool::NewTabHere,
        Tool::ShowHidden,
        Tool::ShowThumb,
        Tool::LargeIcons,
    ];

    pub fn code(self) -> i32 {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0) as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    /// Built-in toolbar buttons (everything past `Custom`)
    pub fn is_builtin(self) -> bool {
        !matches!(self, Tool::None | Tool::Custom)
    }
}

/// What a custom command runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandKind {
    #[default]
    Line,
    Script,
    App,
    Bookmark,
}

impl CommandKind {
    pub fn code(self) -> i32 {
        match self {
            CommandKind::Line => 0,
            CommandKind::Script => 1,
            CommandKind::App => 2,
            CommandKind::Bookmark => 3,
        }
    }

    pub fn from_code(value: &str) -> Option<Self> {
        match value.trim() {
            "0" => Some(CommandKind::Line),
            "1" => Some(CommandKind::Script),
            "2" => Some(CommandKind::App),
            "3" => Some(CommandKind::Bookmark),
            _ => None,
        }
    }
}

/// Keyboard shortcut; a zero key means "no binding"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyBinding {
    pub key: u32,
    pub modifiers: u32,
}

impl KeyBinding {
    pub fn new(key: u32, modifiers: u32) -> Self {
        Self { key, modifiers }
    }

    pub fn is_set(&self) -> bool {
        self.key != 0
    }
}

/// Run and task options of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunFlags {
    pub in_terminal: TriState,
    pub keep_terminal: TriState,
    pub task: TriState,
    pub task_pop: TriState,
    pub task_err: TriState,
    pub task_out: TriState,
    pub scroll_lock: TriState,
}

/// Raw storage slots; their meaning depends on the record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Slots {
    pub s: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
    pub z: Option<String>,
    pub line: Option<String>,
}

/// A user-defined command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    pub kind: CommandKind,
    /// Run as this user instead of the current one
    pub run_as: Option<String>,
    /// Application path or bookmark target
    pub target: Option<String>,
    /// Command line for `CommandKind::Line`
    pub line: Option<String>,
    /// Last value entered for string-input items
    pub input: Option<String>,
}

/// Selector for one raw slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    S,
    X,
    Y,
    Z,
    Line,
}

/// Item-type dependent payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Slots(Slots),
    Command(Command),
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Slots(Slots::default())
    }
}

impl Payload {
    /// Raw view of the payload, as written to disk
    pub fn to_slots(&self) -> Slots {
        match self {
            Payload::Slots(slots) => slots.clone(),
            Payload::Command(cmd) => Slots {
                s: cmd.input.clone(),
                x: Some(cmd.kind.code().to_string()),
                y: cmd.run_as.clone(),
                z: cmd.target.clone(),
                line: cmd.line.clone(),
            },
        }
    }

    pub fn get(&self, slot: Slot) -> Option<String> {
        let slots = self.to_slots();
        match slot {
            Slot::S => slots.s,
            Slot::X => slots.x,
            Slot::Y => slots.y,
            Slot::Z => slots.z,
            Slot::Line => slots.line,
        }
    }

    pub fn set(&mut self, slot: Slot, value: Option<String>) {
        match self {
            Payload::Slots(slots) => {
                let field = match slot {
                    Slot::S => &mut slots.s,
                    Slot::X => &mut slots.x,
                    Slot::Y => &mut slots.y,
                    Slot::Z => &mut slots.z,
                    Slot::Line => &mut slots.line,
                };
                *field = value;
            }
            Payload::Command(cmd) => match slot {
                Slot::S => cmd.input = value,
                Slot::X => {
                    // A kind that no longer parses turns the command back into raw slots
                    match value.as_deref().and_then(CommandKind::from_code) {
                        Some(kind) => cmd.kind = kind,
                        None => {
                            let mut slots = self.to_slots();
                            slots.x = value;
                            *self = Payload::Slots(slots);
                        }
                    }
                }
                Slot::Y => cmd.run_as = value,
                Slot::Z => cmd.target = value,
                Slot::Line => cmd.line = value,
            },
        }
    }
}

/// Name references forming the custom menu tree
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Links {
    pub prev: Option<String>,
    pub next: Option<String>,
    /// Only set on the first child of a submenu
    pub parent: Option<String>,
    /// First item of a submenu
    pub child: Option<String>,
}

impl Links {
    pub fn is_empty(&self) -> bool {
        self.prev.is_none() && self.next.is_none() && self.parent.is_none() && self.child.is_none()
    }
}

/// Where a plugin-sourced record came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginSource {
    pub dir: PathBuf,
    /// Name of the item inside the plugin file
    pub name: String,
    /// First item of the plugin
    pub top: bool,
}

/// The plugin item a mirror holds overrides for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorTarget {
    pub plugin_dir: PathBuf,
    pub plugin_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    name: String,

    /// Built-in (true) or user-custom (false)
    pub lock: bool,
    pub plugin: Option<PluginSource>,
    pub mirror_of: Option<MirrorTarget>,
    /// Record this one mirrors or is mirrored by
    pub shared_key: Option<String>,

    pub menu_label: Option<String>,
    /// Built-in label overridden by the user
    pub label_customized: bool,
    pub icon: Option<String>,
    /// Built-in icon overridden by the user
    pub icon_customized: bool,
    pub desc: Option<String>,
    pub title: Option<String>,
    pub menu_style: MenuStyle,

    pub b: TriState,
    pub payload: Payload,
    pub links: Links,
    pub tool: Tool,
    pub run: RunFlags,
    pub opener: i32,
    pub key: KeyBinding,
    /// Serialized context rules
    pub context: Option<String>,
    /// Fallback state when a hide rule does not match
    pub disable: bool,
}

impl Record {
    /// Default-initialized built-in record
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lock: true,
            plugin: None,
            mirror_of: None,
            shared_key: None,
            menu_label: None,
            label_customized: false,
            icon: None,
            icon_customized: false,
            desc: None,
            title: None,
            menu_style: MenuStyle::Normal,
            b: TriState::Unset,
            payload: Payload::default(),
            links: Links::default(),
            tool: Tool::None,
            run: RunFlags::default(),
            opener: 0,
            key: KeyBinding::default(),
            context: None,
            disable: false,
        }
    }

    pub fn new_custom(name: impl Into<String>) -> Self {
        Self {
            lock: false,
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_custom(&self) -> bool {
        !self.lock
    }

    pub fn is_plugin(&self) -> bool {
        self.plugin.is_some()
    }

    pub fn is_mirror(&self) -> bool {
        self.mirror_of.is_some()
    }

    pub fn is_submenu(&self) -> bool {
        self.menu_style == MenuStyle::Submenu
    }

    pub fn command(&self) -> Option<&Command> {
        match &self.payload {
            Payload::Command(cmd) => Some(cmd),
            Payload::Slots(_) => None,
        }
    }

    pub fn slot(&self, slot: Slot) -> Option<String> {
        self.payload.get(slot)
    }

    pub fn set_slot(&mut self, slot: Slot, value: Option<String>) {
        self.payload.set(slot, value);
    }

    /// Turn raw slots of a custom command into a typed `Command`
    ///
    /// Separators, submenus and built-ins keep their raw slots.
    pub fn normalize_payload(&mut self) {
        if self.lock || matches!(self.menu_style, MenuStyle::Separator | MenuStyle::Submenu) {
            return;
        }
        if let Payload::Slots(slots) = &self.payload
            && let Some(kind) = slots.x.as_deref().and_then(CommandKind::from_code)
        {
            let slots = slots.clone();
            self.payload = Payload::Command(Command {
                kind,
                run_as: slots.y,
                target: slots.z,
                line: slots.line,
                input: slots.s,
            });
        }
    }

    /// Copy every field except the name and tree links into a new custom record
    pub fn duplicate_as(&self, name: impl Into<String>) -> Record {
        Record {
            name: name.into(),
            lock: false,
            plugin: None,
            mirror_of: None,
            shared_key: None,
            links: Links::default(),
            // Shortcuts are unique per item and never duplicated
            key: KeyBinding::default(),
            ..self.clone()
        }
    }
}
