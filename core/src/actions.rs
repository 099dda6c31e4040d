//! End-of-life actions
//!
//! Action strings look like `Name arg1 "quoted arg"`. They are parsed once per
//! definition and handed to the host's action runner when a sprite expires.

/// An action string split into its name and arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAction {
    pub name: String,
    pub args: Vec<String>,
    /// Original action string
    pub raw: String,
}

/// Host capability that runs parsed actions
pub trait ActionRunner {
    /// Run an action. Returns the action's output message on success.
    fn try_run_action(&mut self, action: &ParsedAction) -> Result<Option<String>, String>;
}

/// Parse a single action string.
///
/// Arguments follow shell quoting rules. Returns `None` for blank strings
/// and unbalanced quotes.
pub fn parse_action(raw: &str) -> Option<ParsedAction> {
    let mut parts = shlex::split(raw)?.into_iter();
    let name = parts.next()?;
    Some(ParsedAction {
        name,
        args: parts.collect(),
        raw: raw.to_string(),
    })
}

/// Parse a list of action strings, dropping the ones that fail to parse
pub fn parse_actions(raw: &[String]) -> Vec<ParsedAction> {
    raw.iter()
        .filter_map(|action| {
            let parsed = parse_action(action);
            if parsed.is_none() {
                tracing::debug!(action = %action, "Dropping unparsable end action");
            }
            parsed
        })
        .collect()
}

/// Run actions in order, ignoring failures
pub fn run_actions(runner: &mut dyn ActionRunner, actions: &[ParsedAction]) {
    for action in actions {
        if let Err(e) = runner.try_run_action(action) {
            tracing::debug!(action = %action.raw, error = %e, "End action failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_and_args() {
        let action = parse_action("AddMail Current \"Some Letter\" now").unwrap();
        assert_eq!(action.name, "AddMail");
        assert_eq!(action.args, vec!["Current", "Some Letter", "now"]);
    }

    #[test]
    fn test_empty_quoted_argument_kept() {
        let action = parse_action("Say \"\"").unwrap();
        assert_eq!(action.args, vec![""]);
    }

    #[test]
    fn test_single_quotes_and_escapes() {
        let action = parse_action(r#"Say 'it is' "a \"big\" day""#).unwrap();
        assert_eq!(action.args, vec!["it is", "a \"big\" day"]);
    }

    #[test]
    fn test_parse_failures() {
        assert!(parse_action("").is_none());
        assert!(parse_action("   ").is_none());
        assert!(parse_action("Say \"unterminated").is_none());
        assert!(parse_action("Say 'unterminated").is_none());
    }

    struct FailingRunner {
        calls: usize,
    }

    impl ActionRunner for FailingRunner {
        fn try_run_action(&mut self, _action: &ParsedAction) -> Result<Option<String>, String> {
            self.calls += 1;
            Err("no such action".to_string())
        }
    }

    #[test]
    fn test_run_actions_continues_after_failure() {
        let actions = parse_actions(&["A".to_string(), "B x".to_string()]);
        let mut runner = FailingRunner { calls: 0 };
        run_actions(&mut runner, &actions);
        assert_eq!(runner.calls, 2);
    }
}
