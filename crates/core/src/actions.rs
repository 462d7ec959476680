//! Menu and toolbar action strings, and the undo/redo history.

use std::collections::VecDeque;

use crate::error::{DrillError, Result};
use crate::messages::EditorCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Undo,
    Redo,
    AddSheet,
    RemoveSheet,
    CloneSheet,
    Recompute,
}

const ACTIONS: [(&str, ActionKind); 6] = [
    ("undo", ActionKind::Undo),
    ("redo", ActionKind::Redo),
    ("addSheet", ActionKind::AddSheet),
    ("removeSheet", ActionKind::RemoveSheet),
    ("cloneSheet", ActionKind::CloneSheet),
    ("recompute", ActionKind::Recompute),
];

/// A parsed action with its typed arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Undo,
    Redo,
    /// `None` uses the configured default beat count.
    AddSheet { num_beats: Option<u32> },
    RemoveSheet { index: usize },
    CloneSheet { index: usize },
    Recompute { index: usize },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Undo => ActionKind::Undo,
            Action::Redo => ActionKind::Redo,
            Action::AddSheet { .. } => ActionKind::AddSheet,
            Action::RemoveSheet { .. } => ActionKind::RemoveSheet,
            Action::CloneSheet { .. } => ActionKind::CloneSheet,
            Action::Recompute { .. } => ActionKind::Recompute,
        }
    }
}

fn invalid(input: &str, reason: &str) -> DrillError {
    DrillError::InvalidAction(format!("{input:?}: {reason}"))
}

fn split_call(input: &str) -> Result<(&str, Vec<&str>)> {
    let trimmed = input.trim();
    let (name, args) = match trimmed.find('(') {
        Some(open) => {
            let inner = trimmed[open + 1..]
                .strip_suffix(')')
                .ok_or_else(|| invalid(input, "missing closing parenthesis"))?;
            if inner.contains(['(', ')']) {
                return Err(invalid(input, "nested parentheses"));
            }
            let args = if inner.trim().is_empty() {
                Vec::new()
            } else {
                inner.split(',').map(str::trim).collect()
            };
            (&trimmed[..open], args)
        }
        None => (trimmed, Vec::new()),
    };

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid(input, "bad action name"));
    }
    if args.iter().any(|arg| arg.is_empty()) {
        return Err(invalid(input, "empty argument"));
    }
    Ok((name, args))
}

fn number<T: std::str::FromStr>(input: &str, arg: &str) -> Result<T> {
    arg.parse()
        .map_err(|_| invalid(input, &format!("expected a number, got {arg:?}")))
}

/// Parse `"name"` or `"name(arg1, arg2)"` into an action.
pub fn parse_action(input: &str) -> Result<Action> {
    let (name, args) = split_call(input)?;
    let kind = ACTIONS
        .iter()
        .find(|(action, _)| *action == name)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| invalid(input, "unknown action"))?;

    let expect = |count: usize| {
        if args.len() == count {
            Ok(())
        } else {
            Err(invalid(
                input,
                &format!("expected {count} argument(s), got {}", args.len()),
            ))
        }
    };

    let action = match kind {
        ActionKind::Undo => {
            expect(0)?;
            Action::Undo
        }
        ActionKind::Redo => {
            expect(0)?;
            Action::Redo
        }
        ActionKind::AddSheet => match args.as_slice() {
            [] => Action::AddSheet { num_beats: None },
            [beats] => Action::AddSheet {
                num_beats: Some(number(input, beats)?),
            },
            _ => return Err(invalid(input, "expected at most 1 argument")),
        },
        ActionKind::RemoveSheet => {
            expect(1)?;
            Action::RemoveSheet {
                index: number(input, args[0])?,
            }
        }
        ActionKind::CloneSheet => {
            expect(1)?;
            Action::CloneSheet {
                index: number(input, args[0])?,
            }
        }
        ActionKind::Recompute => {
            expect(1)?;
            Action::Recompute {
                index: number(input, args[0])?,
            }
        }
    };
    Ok(action)
}

/// Undo and redo stacks of inverse commands.
#[derive(Debug)]
pub struct ActionHistory {
    undo: VecDeque<EditorCommand>,
    redo: Vec<EditorCommand>,
    limit: usize,
}

impl ActionHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record the inverse of a freshly applied command. Clears the redo
    /// stack.
    pub fn record(&mut self, inverse: EditorCommand) {
        self.redo.clear();
        self.push_undo(inverse);
    }

    pub(crate) fn push_undo(&mut self, inverse: EditorCommand) {
        self.undo.push_back(inverse);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
    }

    pub(crate) fn push_redo(&mut self, inverse: EditorCommand) {
        self.redo.push(inverse);
    }

    pub(crate) fn pop_undo(&mut self) -> Option<EditorCommand> {
        self.undo.pop_back()
    }

    pub(crate) fn pop_redo(&mut self) -> Option<EditorCommand> {
        self.redo.pop()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::show::SheetId;

    #[test]
    fn test_parse_actions() {
        assert_eq!(parse_action("undo").unwrap(), Action::Undo);
        assert_eq!(parse_action(" redo() ").unwrap(), Action::Redo);
        assert_eq!(
            parse_action("addSheet(32)").unwrap(),
            Action::AddSheet {
                num_beats: Some(32)
            }
        );
        assert_eq!(
            parse_action("addSheet").unwrap(),
            Action::AddSheet { num_beats: None }
        );
        assert_eq!(
            parse_action("cloneSheet( 2 )").unwrap(),
            Action::CloneSheet { index: 2 }
        );
        assert_eq!(parse_action("recompute(0)").unwrap().kind(), ActionKind::Recompute);
    }

    #[test]
    fn test_malformed_actions_fail_fast() {
        for input in [
            "",
            "addSheet(",
            "addSheet(4",
            "add sheet(4)",
            "removeSheet(1,)",
            "removeSheet((1))",
            "removeSheet(one)",
            "removeSheet()",
            "undo(1)",
            "explode(1)",
        ] {
            let err = parse_action(input).unwrap_err();
            assert!(matches!(err, DrillError::InvalidAction(_)), "{input}");
        }
    }

    #[test]
    fn test_history_limit_and_redo_clearing() {
        let mut history = ActionHistory::new(2);
        for name in ["a", "b", "c"] {
            history.record(EditorCommand::RemoveSheet {
                sheet: SheetId::new(name),
            });
        }
        let mut popped = Vec::new();
        while let Some(EditorCommand::RemoveSheet { sheet }) = history.pop_undo() {
            popped.push(sheet.as_str().to_string());
        }
        assert_eq!(popped, vec!["c", "b"]);

        history.push_redo(EditorCommand::AddSheet { num_beats: 8 });
        assert!(history.can_redo());
        history.record(EditorCommand::AddSheet { num_beats: 8 });
        assert!(!history.can_redo());
    }
}
