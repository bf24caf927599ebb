//! Configuration loading for the CLI.
//!
//! Configuration flags come first on the command line. They are split off
//! and handed to `ortho_config`; everything from the first other token on
//! is parsed by clap.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use wonder_config::Config;

use crate::errors::AppError;

/// Configuration flags understood before the subcommand.
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--server-socket",
    "--stage-socket",
    "--dial-timeout-ms",
    "--log-filter",
    "--log-format",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the leading configuration arguments.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

/// Layers defaults, file, environment, and flags through `ortho_config`.
pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    if !text.starts_with("--") {
        return FlagAction::Stop;
    }
    let (flag, inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (text.as_ref(), false),
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Leading configuration arguments and where the clap arguments begin.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some(program) = args.first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut config_arguments = vec![program.clone()];
    let mut remaining = args.iter().skip(1);
    let mut command_start = 1;
    while let Some(argument) = remaining.next() {
        let FlagAction::Include { needs_value } = classify(argument) else {
            break;
        };
        config_arguments.push(argument.clone());
        command_start += 1;
        if needs_value {
            let Some(value) = remaining.next() else {
                break;
            };
            config_arguments.push(value.clone());
            command_start += 1;
        }
    }

    ConfigArgumentSplit {
        config_arguments,
        command_start,
    }
}

/// Program name followed by everything after the configuration flags.
pub(crate) fn command_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    args.first()
        .into_iter()
        .chain(args.iter().skip(split.command_start))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case("--log-filter=debug", FlagAction::Include { needs_value: false })]
    #[case("--stage-socket", FlagAction::Include { needs_value: true })]
    #[case("--output", FlagAction::Stop)]
    #[case("plant", FlagAction::Stop)]
    fn classifies_arguments(#[case] argument: &str, #[case] expected: FlagAction) {
        assert_eq!(classify(OsStr::new(argument)), expected);
    }

    #[test]
    fn splits_leading_configuration_flags() {
        let args = os_args(&[
            "wonder",
            "--stage-socket",
            "tcp://127.0.0.1:7000",
            "--log-filter=debug",
            "--output",
            "json",
            "list",
        ]);

        let split = split_config_arguments(&args);

        assert_eq!(
            split.config_arguments,
            os_args(&["wonder", "--stage-socket", "tcp://127.0.0.1:7000", "--log-filter=debug"])
        );
        assert_eq!(
            command_arguments(&args, &split),
            os_args(&["wonder", "--output", "json", "list"])
        );
    }

    #[test]
    fn flags_after_the_subcommand_stay_with_clap() {
        let args = os_args(&["wonder", "report", "--server-socket", "tcp://h:1"]);

        let split = split_config_arguments(&args);

        assert_eq!(split.config_arguments, os_args(&["wonder"]));
        assert_eq!(command_arguments(&args, &split), args);
    }

    #[test]
    fn empty_arguments_split_cleanly() {
        let split = split_config_arguments(&[]);
        assert!(split.config_arguments.is_empty());
        assert_eq!(split.command_start, 0);
    }
}
