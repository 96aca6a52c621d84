use std::ffi::OsString;

use clap::{Arg, ArgAction, Command};

pub mod flags;
pub mod options;

pub use flags::{Flag, FLAGS};
pub use options::{LogLevel, OptMode, Options};

pub const VERSION_TEXT: &str = concat!(env!("CARGO_PKG_VERSION"), " (IR 1.17)");

pub fn command() -> Command {
    let command = Command::new("scalajsld")
        .about("Links Scala.js IR into a JavaScript file")
        .version(VERSION_TEXT)
        .disable_version_flag(true)
        .args_override_self(true)
        .arg(
            Arg::new("version")
                .help("Print version information")
                .short('v')
                .long("version")
                .action(ArgAction::Version),
        );

    FLAGS.iter().fold(command, |command, flag| command.arg(flag.arg()))
}

/// Rewrites `-mm` and `-qq` into their long forms. Stops at `--`.
fn normalize<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut escaped = false;

    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if escaped {
                return arg;
            }
            if arg == "--" {
                escaped = true;
                return arg;
            }

            FLAGS
                .iter()
                .find(|flag| flag.legacy_short.is_some_and(|short| arg == short))
                .and_then(|flag| flag.long)
                .map(|long| OsString::from(format!("--{}", long)))
                .unwrap_or(arg)
        })
        .collect()
}

/// Scans the arguments (program name first) into [`Options`].
///
/// Flags are applied in the order they appeared. Exclusive flags have already
/// been reduced to the last one given by clap's overrides.
pub fn parse_args<I, T>(args: I) -> Result<Options, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let matches = command().try_get_matches_from(normalize(args))?;

    let mut present: Vec<(usize, &Flag)> = FLAGS
        .iter()
        .filter(|flag| flag.is_present(&matches))
        .map(|flag| (matches.index_of(flag.id).unwrap_or(usize::MAX), flag))
        .collect();
    present.sort_by_key(|(index, _)| *index);

    let mut options = Options::default();

    for (_, flag) in present {
        (flag.apply)(&mut options, &matches);
    }

    Ok(options)
}
