//! Demo scripts replayed against a [`Session`](super::Session).
//!
//! A script is a `;` or newline separated list of steps:
//!
//! ```text
//! press; wait 2; wait 2; reset; cooldown; wait 60
//! ```

use crate::domain::{HoldSendError, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Longest single `wait` accepted: one week.
pub const MAX_WAIT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// One scripted interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptStep {
    Press,
    Release,
    Send,
    Reset,
    Cooldown,
    Teardown,
    /// Advance the virtual clock.
    Wait(Duration),
}

impl FromStr for ScriptStep {
    type Err = HoldSendError;

    fn from_str(s: &str) -> Result<Self> {
        let mut words = s.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(HoldSendError::Script("empty step".to_string()));
        };

        let step = match verb.to_ascii_lowercase().as_str() {
            "press" => Self::Press,
            "release" => Self::Release,
            "send" => Self::Send,
            "reset" => Self::Reset,
            "cooldown" => Self::Cooldown,
            "teardown" => Self::Teardown,
            "wait" => {
                let secs = words
                    .next()
                    .ok_or_else(|| HoldSendError::Script("wait needs a number of seconds".to_string()))?;
                let secs: f64 = secs
                    .parse()
                    .map_err(|_| HoldSendError::Script(format!("invalid wait duration '{secs}'")))?;
                let duration = Duration::try_from_secs_f64(secs)
                    .map_err(|_| HoldSendError::Script(format!("invalid wait duration '{secs}'")))?;
                if duration > MAX_WAIT {
                    return Err(HoldSendError::Script(format!(
                        "wait of {secs}s exceeds the {}s limit",
                        MAX_WAIT.as_secs()
                    )));
                }
                Self::Wait(duration)
            }
            other => return Err(HoldSendError::Script(format!("unknown step '{other}'"))),
        };

        if let Some(extra) = words.next() {
            return Err(HoldSendError::Script(format!("unexpected '{extra}' after '{verb}'")));
        }

        Ok(step)
    }
}

impl fmt::Display for ScriptStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Press => f.write_str("press"),
            Self::Release => f.write_str("release"),
            Self::Send => f.write_str("send"),
            Self::Reset => f.write_str("reset"),
            Self::Cooldown => f.write_str("cooldown"),
            Self::Teardown => f.write_str("teardown"),
            Self::Wait(duration) => write!(f, "wait {}", duration.as_secs_f64()),
        }
    }
}

/// Parses a whole script, skipping blank steps.
///
/// # Errors
///
/// Returns [`HoldSendError::Script`] naming the first invalid step.
pub fn parse_script(script: &str) -> Result<Vec<ScriptStep>> {
    script
        .split([';', '\n'])
        .map(str::trim)
        .filter(|step| !step.is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_verb() {
        let steps = parse_script("press; release\nsend;reset; cooldown; teardown; wait 1.5").unwrap();
        assert_eq!(
            steps,
            vec![
                ScriptStep::Press,
                ScriptStep::Release,
                ScriptStep::Send,
                ScriptStep::Reset,
                ScriptStep::Cooldown,
                ScriptStep::Teardown,
                ScriptStep::Wait(Duration::from_millis(1500)),
            ]
        );
    }

    #[test]
    fn blank_steps_are_skipped() {
        assert_eq!(parse_script(" ;; press ;\n").unwrap(), vec![ScriptStep::Press]);
        assert!(parse_script("").unwrap().is_empty());
    }

    #[test]
    fn verbs_are_case_insensitive() {
        assert_eq!("PRESS".parse::<ScriptStep>().unwrap(), ScriptStep::Press);
    }

    #[test]
    fn rejects_bad_steps() {
        for bad in ["jump", "wait", "wait soon", "wait -1", "press now"] {
            let err = bad.parse::<ScriptStep>().unwrap_err();
            assert!(matches!(err, HoldSendError::Script(_)), "{bad}: {err}");
        }
    }

    #[test]
    fn rejects_waits_beyond_a_week() {
        let err = parse_script("wait 1.8e19; wait 1.8e19").unwrap_err();
        assert!(matches!(err, HoldSendError::Script(_)), "{err}");
        assert!(parse_script("wait 604801").is_err());
        assert_eq!(parse_script("wait 604800").unwrap(), vec![ScriptStep::Wait(MAX_WAIT)]);
    }

    #[test]
    fn display_parses_back() {
        let step = ScriptStep::Wait(Duration::from_secs(60));
        assert_eq!(step.to_string().parse::<ScriptStep>().unwrap(), step);
    }
}
