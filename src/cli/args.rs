//! Positional and `--option` parsing for command arguments.

use std::str::FromStr;

use kranos_domain::EntityId;

use crate::cli::context::CommandError;

#[derive(Debug, Default)]
pub struct Args<'a> {
    positional: Vec<&'a str>,
    options: Vec<(&'a str, &'a str)>,
    flags: Vec<&'a str>,
}

impl<'a> Args<'a> {
    /// Splits `raw` into positionals, `value_options` (which consume the next
    /// token) and boolean `flags`. Any other `--name` is rejected.
    pub fn parse(
        raw: &[&'a str],
        value_options: &[&str],
        flags: &[&str],
    ) -> Result<Self, CommandError> {
        let mut parsed = Args::default();
        let mut tokens = raw.iter().copied();
        while let Some(token) = tokens.next() {
            if !token.starts_with("--") {
                parsed.positional.push(token);
            } else if value_options.contains(&token) {
                let value = tokens.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("{token} requires a value"))
                })?;
                parsed.options.push((token, value));
            } else if flags.contains(&token) {
                parsed.flags.push(token);
            } else {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `{token}`"
                )));
            }
        }
        Ok(parsed)
    }

    pub fn required(&self, idx: usize, name: &str) -> Result<&'a str, CommandError> {
        self.positional
            .get(idx)
            .copied()
            .ok_or_else(|| CommandError::InvalidArguments(format!("missing <{name}>")))
    }

    pub fn get(&self, idx: usize) -> Option<&'a str> {
        self.positional.get(idx).copied()
    }

    /// Last value given for `name`.
    pub fn option(&self, name: &str) -> Option<&'a str> {
        self.options
            .iter()
            .rev()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.flags.contains(&name)
    }
}

pub fn parse_id(raw: &str, what: &str) -> Result<EntityId, CommandError> {
    raw.parse::<EntityId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!("{what} id must be a positive number"))
        })
}

/// The lone `<id>` argument of commands such as `member show <id>`.
pub fn single_id(raw: &[&str], what: &str) -> Result<EntityId, CommandError> {
    let args = Args::parse(raw, &[], &[])?;
    parse_id(args.required(0, "id")?, what)
}

pub fn parse_number<T: FromStr>(raw: &str, what: &str) -> Result<T, CommandError> {
    raw.parse::<T>().map_err(|_| {
        CommandError::InvalidArguments(format!("{what} must be a number, got `{raw}`"))
    })
}
