//! Field suffixes of `name-field=value` lines

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    S,
    X,
    Y,
    Z,
    /// Label of a custom record
    Label,
    /// Customized label of a built-in record
    Lbl,
    Icon,
    Icn,
    B,
    Key,
    KeyMod,
    Style,
    Desc,
    Title,
    Next,
    Prev,
    Parent,
    Child,
    Context,
    Line,
    Tool,
    Task,
    TaskPop,
    TaskErr,
    TaskOut,
    Term,
    Keep,
    Scroll,
    Opener,
}

impl Field {
    pub fn suffix(self) -> &'static str {
        match self {
            Field::S => "s",
            Field::X => "x",
            Field::Y => "y",
            Field::Z => "z",
            Field::Label => "label",
            Field::Lbl => "lbl",
            Field::Icon => "icon",
            Field::Icn => "icn",
            Field::B => "b",
            Field::Key => "key",
            Field::KeyMod => "keymod",
            Field::Style => "style",
            Field::Desc => "desc",
            Field::Title => "title",
            Field::Next => "next",
            Field::Prev => "prev",
            Field::Parent => "parent",
            Field::Child => "child",
            Field::Context => "cxt",
            Field::Line => "line",
            Field::Tool => "tool",
            Field::Task => "task",
            Field::TaskPop => "task_pop",
            Field::TaskErr => "task_err",
            Field::TaskOut => "task_out",
            Field::Term => "term",
            Field::Keep => "keep",
            Field::Scroll => "scroll",
            Field::Opener => "op",
        }
    }

    /// Fields whose value names another record
    pub fn is_link(self) -> bool {
        matches!(self, Field::Next | Field::Prev | Field::Parent | Field::Child)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field suffix '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "s" => Field::S,
            "x" => Field::X,
            "y" => Field::Y,
            "z" => Field::Z,
            "label" => Field::Label,
            "lbl" => Field::Lbl,
            "icon" => Field::Icon,
            "icn" => Field::Icn,
            "b" => Field::B,
            "key" => Field::Key,
            "keymod" => Field::KeyMod,
            "style" => Field::Style,
            "desc" => Field::Desc,
            "title" => Field::Title,
            "next" => Field::Next,
            "prev" => Field::Prev,
            "parent" => Field::Parent,
            "child" => Field::Child,
            "cxt" => Field::Context,
            "line" => Field::Line,
            "tool" => Field::Tool,
            "task" => Field::Task,
            "task_pop" => Field::TaskPop,
            "task_err" => Field::TaskErr,
            "task_out" => Field::TaskOut,
            "term" => Field::Term,
            "keep" => Field::Keep,
            "scroll" => Field::Scroll,
            "op" => Field::Opener,
            other => return Err(UnknownField(other.to_string())),
        };
        Ok(field)
    }
}
