//! Context rules: parse, build and evaluate
//!
//! A rule string decides whether a menu item is shown, hidden, enabled or
//! disabled for a given context snapshot. Every element is separated by
//! `%%%%%`:
//!
//! ```text
//! action SEP match SEP [subject SEP comparator SEP value SEP]...
//! ```
//!
//! Evaluation fails open: anything malformed yields `Decision::Show`.

use tracing::debug;

use crate::constants::rules::{AND, OR, SEP};
use crate::context::{ContextSnapshot, Subject};

/// What the item does when the rules match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Show,
    Enable,
    Hide,
    Disable,
}

impl Action {
    pub fn code(self) -> i64 {
        match self {
            Action::Show => 0,
            Action::Enable => 1,
            Action::Hide => 2,
            Action::Disable => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Action::Show),
            1 => Some(Action::Enable),
            2 => Some(Action::Hide),
            3 => Some(Action::Disable),
            _ => None,
        }
    }
}

/// How rule results are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Any,
    All,
    NotAny,
    NotAll,
}

impl MatchMode {
    pub fn code(self) -> i64 {
        match self {
            MatchMode::Any => 0,
            MatchMode::All => 1,
            MatchMode::NotAny => 2,
            MatchMode::NotAll => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(MatchMode::Any),
            1 => Some(MatchMode::All),
            2 => Some(MatchMode::NotAny),
            3 => Some(MatchMode::NotAll),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    BeginsWith,
    NotBeginsWith,
    EndsWith,
    NotEndsWith,
    LessThan,
    GreaterThan,
    GlobMatch,
    NotGlobMatch,
}

impl Comparator {
    pub const ALL: [Comparator; 12] = [
        Comparator::Equals,
        Comparator::NotEquals,
        Comparator::Contains,
        Comparator::NotContains,
        Comparator::BeginsWith,
        Comparator::NotBeginsWith,
        Comparator::EndsWith,
        Comparator::NotEndsWith,
        Comparator::LessThan,
        Comparator::GreaterThan,
        Comparator::GlobMatch,
        Comparator::NotGlobMatch,
    ];

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn label(self) -> &'static str {
        match self {
            Comparator::Equals => "equals",
            Comparator::NotEquals => "does not equal",
            Comparator::Contains => "contains",
            Comparator::NotContains => "does not contain",
            Comparator::BeginsWith => "begins with",
            Comparator::NotBeginsWith => "does not begin with",
            Comparator::EndsWith => "ends with",
            Comparator::NotEndsWith => "does not end with",
            Comparator::LessThan => "is less than",
            Comparator::GreaterThan => "is greater than",
            Comparator::GlobMatch => "matches",
            Comparator::NotGlobMatch => "does not match",
        }
    }
}

/// Outcome handed to the menu builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Show,
    Hide,
    Disable,
}

/// One `subject comparator value` rule
///
/// Subject and comparator are kept as raw indices so rule strings written by
/// newer versions survive a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub subject: i64,
    pub comparator: i64,
    pub value: String,
}

impl Rule {
    /// Build a rule from typed parts; the value is trimmed
    pub fn new(subject: Subject, comparator: Comparator, value: &str) -> Self {
        Self {
            subject: subject.index() as i64,
            comparator: comparator.code(),
            value: value.trim().to_string(),
        }
    }

    pub fn subject(&self) -> Option<Subject> {
        Subject::from_index(self.subject)
    }

    pub fn comparator(&self) -> Option<Comparator> {
        Comparator::from_code(self.comparator)
    }

    /// Test this rule against the snapshot; unknown indices never match
    pub fn test(&self, snapshot: &ContextSnapshot) -> bool {
        let (Some(subject), Some(comparator)) = (self.subject(), self.comparator()) else {
            debug!(subject = self.subject, comparator = self.comparator, "Unknown rule index, treating rule as non-matching");
            return false;
        };
        test_value(snapshot.get(subject), comparator, &self.value)
    }
}

/// A parsed rule string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRules {
    pub action: Action,
    pub match_mode: MatchMode,
    pub rules: Vec<Rule>,
}

impl ContextRules {
    pub fn new(action: Action, match_mode: MatchMode) -> Self {
        Self {
            action,
            match_mode,
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Parse a rule string; `None` when the action or match token is malformed
    ///
    /// A trailing incomplete rule is dropped.
    pub fn parse(text: &str) -> Option<Self> {
        let mut elements = Elements::new(text);

        let action = Action::from_code(atoi(elements.next()?));
        let match_mode = MatchMode::from_code(atoi(elements.next()?));
        let (Some(action), Some(match_mode)) = (action, match_mode) else {
            debug!(rules = %text, "Malformed action or match token in rule string");
            return None;
        };

        let mut rules = Vec::new();
        while let Some(subject) = elements.next() {
            let Some(comparator) = elements.next() else { break };
            let Some(value) = elements.next() else { break };
            rules.push(Rule {
                subject: atoi(subject),
                comparator: atoi(comparator),
                value: value.to_string(),
            });
        }

        Some(Self {
            action,
            match_mode,
            rules,
        })
    }

    /// Canonical serialized form; every element is followed by the separator
    pub fn to_rule_string(&self) -> String {
        let mut out = format!("{}{SEP}{}{SEP}", self.action.code(), self.match_mode.code());
        for rule in &self.rules {
            out.push_str(&format!("{}{SEP}{}{SEP}{}{SEP}", rule.subject, rule.comparator, rule.value));
        }
        out
    }

    /// Combine rule results; `None` when there are no rules at all
    pub fn is_match(&self, snapshot: &ContextSnapshot) -> Option<bool> {
        if self.rules.is_empty() {
            return None;
        }

        let mut all_match = true;
        let mut any_match = false;
        let mut no_match = true;

        for rule in &self.rules {
            let test = rule.test(snapshot);
            all_match &= test;
            if test {
                any_match = true;
                no_match = false;
            }
            match self.match_mode {
                MatchMode::Any if test => break,
                MatchMode::All if !test => break,
                _ => {}
            }
        }

        let is_match = match self.match_mode {
            MatchMode::All => all_match,
            MatchMode::NotAll => !all_match,
            MatchMode::NotAny => no_match,
            MatchMode::Any => !no_match,
        };
        debug_assert_eq!(any_match, !no_match);
        Some(is_match)
    }

    /// Full decision including the global disable policy and the item's fallback
    pub fn decide(&self, snapshot: &ContextSnapshot, def_disable: bool) -> Decision {
        if snapshot.actions_disabled && matches!(self.action, Action::Enable | Action::Disable) {
            return Decision::Disable;
        }

        let Some(is_match) = self.is_match(snapshot) else {
            return Decision::Show;
        };

        match (self.action, is_match) {
            (Action::Show, true) => Decision::Show,
            (Action::Show, false) => Decision::Hide,
            (Action::Enable, true) => Decision::Show,
            (Action::Enable, false) => Decision::Disable,
            (Action::Disable, true) => Decision::Disable,
            (Action::Disable, false) => Decision::Show,
            (Action::Hide, true) => Decision::Hide,
            (Action::Hide, false) if def_disable => Decision::Disable,
            (Action::Hide, false) => Decision::Show,
        }
    }
}

/// Evaluate a stored rule string against a snapshot
pub fn evaluate(rules: &str, snapshot: &ContextSnapshot, def_disable: bool) -> Decision {
    if !snapshot.valid {
        return Decision::Show;
    }
    match ContextRules::parse(rules) {
        Some(parsed) => parsed.decide(snapshot, def_disable),
        None => Decision::Show,
    }
}

/// Splits on the rule separator the way the stored format expects
///
/// A trailing separator does not produce an empty final element.
struct Elements<'a> {
    rest: Option<&'a str>,
}

impl<'a> Elements<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: Some(text) }
    }
}

impl<'a> Iterator for Elements<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let text = self.rest?;
        match text.find(SEP) {
            Some(at) => {
                self.rest = Some(&text[at + SEP.len()..]);
                Some(&text[..at])
            }
            None => {
                self.rest = None;
                if text.is_empty() { None } else { Some(text) }
            }
        }
    }
}

/// Best-effort integer parse: leading whitespace, optional sign, digits; anything else is 0
pub fn atoi(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let mut value: i64 = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(byte - b'0'));
    }
    if negative { -value } else { value }
}

/// Test a possibly `||`/`&&`-joined value left to right
///
/// The separator is looked up again for every element, `||` first, so a value
/// mixing both switches short-circuit behavior part way through.
fn test_value(var: &str, comparator: Comparator, value: &str) -> bool {
    enum Joiner {
        Or,
        And,
    }

    let mut rest = value;
    loop {
        let (element, remainder, joiner) = if let Some(at) = rest.find(OR) {
            (&rest[..at], Some(&rest[at + OR.len()..]), Some(Joiner::Or))
        } else if let Some(at) = rest.find(AND) {
            (&rest[..at], Some(&rest[at + AND.len()..]), Some(Joiner::And))
        } else {
            (rest, None, None)
        };

        let result = compare(var, comparator, element.trim());
        match (joiner, remainder) {
            (Some(Joiner::Or), _) if result => return result,
            (Some(Joiner::And), _) if !result => return result,
            (_, Some(remainder)) => rest = remainder,
            (_, None) => return result,
        }
    }
}

fn compare(var: &str, comparator: Comparator, element: &str) -> bool {
    match comparator {
        Comparator::Equals => var == element,
        Comparator::NotEquals => var != element,
        Comparator::Contains => var.contains(element),
        Comparator::NotContains => !var.contains(element),
        Comparator::BeginsWith => var.starts_with(element),
        Comparator::NotBeginsWith => !var.starts_with(element),
        Comparator::EndsWith => var.ends_with(element),
        Comparator::NotEndsWith => !var.ends_with(element),
        Comparator::LessThan => atoi(var) < atoi(element),
        Comparator::GreaterThan => atoi(var) > atoi(element),
        Comparator::GlobMatch => glob_match(element, var),
        Comparator::NotGlobMatch => !glob_match(element, var),
    }
}

/// Shell-glob match, case-sensitive only when the pattern has an uppercase letter
fn glob_match(pattern: &str, var: &str) -> bool {
    let lowered = pattern.to_lowercase();
    let case_sensitive = lowered != pattern;
    let compiled = match glob::Pattern::new(pattern) {
        Ok(compiled) => compiled,
        Err(e) => {
            debug!(pattern = %pattern, error = %e, "Invalid glob pattern in rule");
            return false;
        }
    };
    if case_sensitive {
        compiled.matches(var)
    } else {
        compiled.matches(&var.to_lowercase())
    }
}
