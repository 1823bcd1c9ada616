//! Command-line flags shared by `gaou-bot` and `gaou-api`.

/// Parsed command-line flags.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// Log level derived from `-v` flags; `None` keeps the configured level.
    pub log_level: Option<&'static str>,
    /// `-f/--config <PATH>`.
    pub config_path: Option<String>,
    pub show_help: bool,
}

/// Parse flags from an argument iterator (without the program name).
pub fn parse_args<I>(args: I) -> Result<CliArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut verbosity = 0u8;
    let mut parsed = CliArgs::default();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => parsed.show_help = true,
            "-f" | "--config" => match iter.next() {
                Some(path) => parsed.config_path = Some(path),
                None => return Err("-f/--config requires a path argument".into()),
            },
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            other => return Err(format!("unexpected argument '{other}'")),
        }
    }

    //   -v     → warn
    //   -vv    → info
    //   -vvv   → debug
    //   -vvvv+ → trace
    parsed.log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    Ok(parsed)
}

/// Help text for `program`.
pub fn usage(program: &str, about: &str) -> String {
    format!(
        "{about}\n\n\
         Usage: {program} [OPTIONS]\n\n\
         Options:\n  \
         -h, --help             Print help\n  \
         -f, --config <PATH>    Path to configuration file (default: config/default.toml)\n  \
         -v, -vv, -vvv, -vvvv   Increase logging verbosity\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_flags() {
        assert_eq!(parse_args(args(&[])).unwrap(), CliArgs::default());
    }

    #[test]
    fn verbosity_tiers() {
        assert_eq!(parse_args(args(&["-v"])).unwrap().log_level, Some("warn"));
        assert_eq!(parse_args(args(&["-vvv"])).unwrap().log_level, Some("debug"));
        assert_eq!(parse_args(args(&["-vv", "-vv"])).unwrap().log_level, Some("trace"));
        assert_eq!(parse_args(args(&["--verbose", "-v"])).unwrap().log_level, Some("info"));
    }

    #[test]
    fn config_path() {
        let parsed = parse_args(args(&["-f", "custom.toml"])).unwrap();
        assert_eq!(parsed.config_path.as_deref(), Some("custom.toml"));
        assert!(parse_args(args(&["--config"])).is_err());
    }

    #[test]
    fn unknown_argument_errors() {
        assert!(parse_args(args(&["--bogus"])).is_err());
    }

    #[test]
    fn help_flag() {
        assert!(parse_args(args(&["--help"])).unwrap().show_help);
        assert!(usage("gaou-api", "Gaou API").contains("--config"));
    }
}
