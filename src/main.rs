mod debug;
mod marker;

use anyhow::{Context, Result};
use clap::Parser;
use debug::debug_log;
use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::iter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Exit status for a missing argument or an unusable working directory
const EXIT_FAILURE: u8 = 1;

#[derive(Parser, Debug)]
#[command(name = "jjcb")]
#[command(about = "Print the working directory, then wait until a marker file is removed")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Args {
    /// Path whose removal tells this process to exit
    termination_path: OsString,

    /// Ignored
    #[arg(hide = true)]
    rest: Vec<OsString>,
}

/// Parse argv with every user argument placed behind an explicit `--`, so the
/// first one is always the marker path, even when it is `--` or `--help`.
fn parse_args<I, T>(argv: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut argv = argv.into_iter().map(Into::into);
    let program = argv.next().unwrap_or_else(|| OsString::from("jjcb"));
    Args::try_parse_from(iter::once(program).chain(iter::once(OsString::from("--"))).chain(argv))
}

/// Write the working directory as the single line the controller reads.
/// Flushed right away since we are about to block for an arbitrary time.
fn announce_cwd(out: &mut impl Write, cwd: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        out.write_all(cwd.as_os_str().as_bytes())?;
        out.write_all(b"\n")?;
    }
    #[cfg(not(unix))]
    writeln!(out, "{}", cwd.display())?;
    out.flush()
}

fn run() -> Result<()> {
    let args = parse_args(env::args_os()).context("Missing termination path")?;
    if !args.rest.is_empty() {
        debug_log(&format!("ignoring {} extra argument(s)", args.rest.len()));
    }
    let termination_path = PathBuf::from(args.termination_path);

    let cwd = env::current_dir().context("Failed to read current directory")?;
    debug::log_startup(&cwd, &termination_path);

    announce_cwd(&mut io::stdout().lock(), &cwd).context("Failed to write current directory")?;

    marker::wait_for_removal(&termination_path);
    Ok(())
}

fn main() -> ExitCode {
    debug::init_from_env();

    // Every outcome funnels through here; nothing else exits the process.
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug_log(&format!("exiting with status {}: {:#}", EXIT_FAILURE, e));
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_args_require_termination_path() {
        assert!(parse_args(["jjcb"]).is_err());
        assert!(parse_args(Vec::<OsString>::new()).is_err());
    }

    #[test]
    fn test_args_single_path() {
        let args = parse_args(["jjcb", "/tmp/marker"]).unwrap();
        assert_eq!(args.termination_path, OsString::from("/tmp/marker"));
        assert!(args.rest.is_empty());
    }

    #[test]
    fn test_args_extra_arguments_ignored() {
        let args = parse_args(["jjcb", "marker", "one", "--two"]).unwrap();
        assert_eq!(args.termination_path, OsString::from("marker"));
        assert_eq!(args.rest.len(), 2);
    }

    #[test]
    fn test_args_hyphen_path_is_literal() {
        // No flags exist, not even --help
        let args = parse_args(["jjcb", "-marker"]).unwrap();
        assert_eq!(args.termination_path, OsString::from("-marker"));

        let args = parse_args(["jjcb", "--help"]).unwrap();
        assert_eq!(args.termination_path, OsString::from("--help"));
    }

    #[test]
    fn test_args_double_dash_is_the_path() {
        let args = parse_args(["jjcb", "--"]).unwrap();
        assert_eq!(args.termination_path, OsString::from("--"));
        assert!(args.rest.is_empty());

        let args = parse_args(["jjcb", "--", "x"]).unwrap();
        assert_eq!(args.termination_path, OsString::from("--"));
        assert_eq!(args.rest, vec![OsString::from("x")]);
    }

    #[test]
    fn test_args_empty_path_accepted() {
        let args = parse_args(["jjcb", ""]).unwrap();
        assert!(args.termination_path.is_empty());
    }

    #[test]
    fn test_announce_cwd_single_line() {
        let mut out = Vec::new();
        announce_cwd(&mut out, Path::new("/some/dir")).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "/some/dir\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_announce_cwd_keeps_raw_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let cwd = Path::new(OsStr::from_bytes(b"/tmp/caf\xe9"));
        let mut out = Vec::new();
        announce_cwd(&mut out, cwd).unwrap();
        assert_eq!(out, b"/tmp/caf\xe9\n");
    }
}
