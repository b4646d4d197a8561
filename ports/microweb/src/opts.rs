/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Command-line flags (§6). Grounded on the original engine's
//! `getopts`-based `Opts`/`from_cmdline_args`: build an `Options` table,
//! match it against `env::args`, and fail loud (usage message, exit 1) on
//! a parse error rather than guessing at intent.

use std::io::{self, Write};
use std::process;

use getopts::Options;

/// Global flags for a single run, set once from the command line.
#[derive(Clone, Debug)]
pub struct Opts {
    /// The initial URL to load, if any (positional argument).
    pub url: Option<String>,
    /// `-noimages`: suppresses image loading entirely.
    pub no_images: bool,
    /// `-dumppage`: writes raw page bytes to `dump.htm`.
    pub dump_page: bool,
    /// `-i`: invert screen colors.
    pub invert: bool,
    /// `-useswap`: enable disk swap file `microweb.swp` (capped at 1 MiB).
    pub use_swap: bool,
    /// `-noems`: disable expanded-memory backing even if present.
    pub no_ems: bool,
    /// `-video=X`: video mode letter index into the mode table.
    pub video_mode: Option<char>,
}

impl Default for Opts {
    fn default() -> Self {
        Opts { url: None, no_images: false, dump_page: false, invert: false, use_swap: false, no_ems: false, video_mode: None }
    }
}

fn print_usage(program: &str, opts: &Options) {
    let message = format!("Usage: {} [options] [URL]", program);
    print!("{}", opts.usage(&message));
}

fn args_fail(msg: &str) -> ! {
    writeln!(io::stderr(), "{}", msg).unwrap();
    process::exit(1)
}

/// Names `getopts` only recognizes behind a `--` prefix, but which §6
/// documents (and the original engine accepts) as single-dash flags.
/// [`normalize_long_flags`] rewrites the single-dash spelling to the
/// double-dash one before handing the arguments to `getopts`.
const LONG_FLAG_NAMES: &[&str] = &["noimages", "dumppage", "useswap", "noems", "video"];

/// Rewrites a single leading `-` into `--` for any argument naming one of
/// [`LONG_FLAG_NAMES`] (with or without a trailing `=value`), so `-noimages`
/// and `--noimages` are accepted equally. Short flags (`-i`, `-h`) and
/// anything already double-dashed pass through untouched.
fn normalize_long_flags(args: &[String]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            if let Some(rest) = arg.strip_prefix('-') {
                if !rest.starts_with('-') {
                    let name = rest.split('=').next().unwrap_or(rest);
                    if LONG_FLAG_NAMES.contains(&name) {
                        return format!("-{arg}");
                    }
                }
            }
            arg.clone()
        })
        .collect()
}

/// Parses `args` (normally `env::args().collect()`) into an [`Opts`].
/// Prints usage and exits 0 on `-h`/`--help`; prints the getopts error
/// and exits 1 on anything it can't parse, matching §6's "exit code 1 on
/// fatal initialization failure".
pub fn from_args(args: &[String]) -> Opts {
    let program = args.first().cloned().unwrap_or_else(|| "microweb".to_string());
    let args = normalize_long_flags(args);
    let mut options = Options::new();
    options.optflag("", "noimages", "Suppress image loading entirely");
    options.optflag("", "dumppage", "Write raw page bytes to dump.htm");
    options.optflag("i", "", "Invert screen colors");
    options.optflag("", "useswap", "Enable disk swap file microweb.swp");
    options.optflag("", "noems", "Disable expanded-memory backing");
    options.optopt("", "video", "Video mode letter index into the mode table", "X");
    options.optflag("h", "help", "Print this message");

    let matches = match options.parse(&args[1.min(args.len())..]) {
        Ok(m) => m,
        Err(e) => args_fail(&e.to_string()),
    };

    if matches.opt_present("help") {
        print_usage(&program, &options);
        process::exit(0);
    }

    let video_mode = match matches.opt_str("video") {
        Some(s) => match s.chars().next() {
            Some(c) => Some(c),
            None => args_fail("error: -video requires a mode letter"),
        },
        None => None,
    };

    Opts {
        url: matches.free.first().cloned(),
        no_images: matches.opt_present("noimages"),
        dump_page: matches.opt_present("dumppage"),
        invert: matches.opt_present("i"),
        use_swap: matches.opt_present("useswap"),
        no_ems: matches.opt_present("noems"),
        video_mode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &[&str]) -> Vec<String> {
        std::iter::once("microweb".to_string()).chain(s.iter().map(|s| s.to_string())).collect()
    }

    #[test]
    fn parses_flags_and_the_positional_url() {
        let opts = from_args(&args(&["-noimages", "-i", "-video=c", "http://h.com/"]));
        assert!(opts.no_images);
        assert!(opts.invert);
        assert_eq!(opts.video_mode, Some('c'));
        assert_eq!(opts.url.as_deref(), Some("http://h.com/"));
    }

    #[test]
    fn double_dash_spelling_is_still_accepted() {
        let opts = from_args(&args(&["--dumppage", "--useswap", "--noems"]));
        assert!(opts.dump_page);
        assert!(opts.use_swap);
        assert!(opts.no_ems);
    }

    #[test]
    fn defaults_are_all_off_with_no_args() {
        let opts = from_args(&args(&[]));
        assert!(opts.url.is_none());
        assert!(!opts.no_images);
        assert!(!opts.dump_page);
        assert!(!opts.use_swap);
        assert!(!opts.no_ems);
        assert!(opts.video_mode.is_none());
    }
}
