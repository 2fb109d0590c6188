//! Turn what a user typed into a message Slack will accept, before anything
//! touches the network.
//!
//! Text can come from an argument or stdin. Blocks can come from one of an
//! inline argument, a file, or stdin. When neither blocks nor files are
//! given, text is wrapped in a default block unless plain text was asked
//! for.

use crate::{
    error::Error,
    slack::{block::Blocks, message::OutgoingMessage},
    timestamp,
};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The text argument which means "read the text from stdin".
pub const STDIN_SENTINEL: &str = "-";

/// Everything that shapes an outgoing message besides its text.
#[derive(Debug, Default, Clone)]
pub struct ComposeOptions {
    pub thread_ts: Option<String>,
    pub blocks_json: Option<String>,
    pub blocks_file: Option<PathBuf>,
    pub blocks_stdin: bool,
    /// Send bare text rather than wrapping it in a block.
    pub simple: bool,
    pub no_unfurl: bool,
    pub files: Vec<PathBuf>,
}

/// Where blocks are read from. At most one may be given.
#[derive(Debug, PartialEq, Eq)]
pub enum BlocksSource<'a> {
    Inline(&'a str),
    File(&'a Path),
    Stdin,
}

impl ComposeOptions {
    /// The single blocks source requested, if any. Empty values are treated
    /// as not given.
    pub fn blocks_source(&self) -> Result<Option<BlocksSource<'_>>, Error> {
        let inline = self
            .blocks_json
            .as_deref()
            .filter(|x| !x.is_empty())
            .map(BlocksSource::Inline);
        let file = self
            .blocks_file
            .as_deref()
            .filter(|x| !x.as_os_str().is_empty())
            .map(BlocksSource::File);
        let stdin = self.blocks_stdin.then_some(BlocksSource::Stdin);

        let given: Vec<_> = [inline, file, stdin].into_iter().flatten().collect();
        if given.len() > 1 {
            return Err(Error::ConflictingBlocksSource);
        }

        Ok(given.into_iter().next())
    }

    pub fn unfurl(&self) -> bool {
        !self.no_unfurl
    }
}

/// Validate and normalise a message. Each step's failure stops the rest.
///
/// `stdin` is only read if the text is [STDIN_SENTINEL] or blocks were asked
/// for from stdin, never both.
pub fn compose(
    text: &str,
    opts: &ComposeOptions,
    stdin: &mut dyn BufRead,
) -> Result<OutgoingMessage, Error> {
    let thread_ts = timestamp::normalize_opt(opts.thread_ts.as_deref())?;

    let source = opts.blocks_source()?;

    let text = if text == STDIN_SENTINEL {
        if source == Some(BlocksSource::Stdin) {
            return Err(Error::ConflictingStdinUsage);
        }
        read_all(stdin).map_err(Error::StdinUnreadable)?
    } else {
        text.to_owned()
    };

    let text = unescape_shell_chars(&text);

    let blocks = match source {
        None => None,
        Some(x) => read_blocks(x, stdin)?,
    };
    let blocks_given = blocks.is_some();
    let blocks = blocks.filter(|x| !x.is_empty());

    if text.is_empty() && blocks.is_none() && opts.files.is_empty() {
        return Err(Error::EmptyMessage);
    }

    let blocks = if !blocks_given && opts.files.is_empty() && !opts.simple && !text.is_empty() {
        debug!("Wrapping text in a default section block");
        Some(Blocks::section(&text))
    } else {
        blocks
    };

    Ok(OutgoingMessage {
        text: Some(text).filter(|x| !x.is_empty()),
        blocks,
        thread_ts,
        unfurl: opts.unfurl(),
    })
}

/// Read and validate blocks from their source. A source with no content at
/// all, such as an empty file, counts as no blocks; anything else must be a
/// JSON array, so whitespace alone is rejected.
fn read_blocks(source: BlocksSource, stdin: &mut dyn BufRead) -> Result<Option<Blocks>, Error> {
    let raw = match source {
        BlocksSource::Inline(x) => x.to_owned(),
        BlocksSource::File(path) => {
            std::fs::read_to_string(path).map_err(|source| Error::BlocksFileUnreadable {
                path: path.to_owned(),
                source,
            })?
        }
        BlocksSource::Stdin => read_all(stdin).map_err(Error::StdinUnreadable)?,
    };

    if raw.is_empty() {
        return Ok(None);
    }

    let blocks = Blocks::parse(&raw).map_err(Error::InvalidBlocksJSON)?;
    debug!(count = blocks.len(), "Parsed blocks");

    Ok(Some(blocks))
}

/// Read a whole stream line by line, joining lines with `\n`. A trailing
/// newline is therefore dropped, as are carriage returns before newlines.
pub fn read_all(r: &mut dyn BufRead) -> std::io::Result<String> {
    let lines = r.lines().collect::<Result<Vec<_>, _>>()?;

    Ok(lines.join("\n"))
}

/// Undo the `\!` escaping interactive shells such as zsh require to avoid
/// history expansion. Every other backslash is left alone, so Windows paths
/// and regular expressions survive.
///
/// ```
/// assert_eq!(unescape_shell_chars(r"Hello\! World\!"), "Hello! World!");
/// assert_eq!(unescape_shell_chars(r"Hello\nWorld"), r"Hello\nWorld");
/// ```
pub fn unescape_shell_chars(s: &str) -> String {
    s.replace(r"\!", "!")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;
    use serde_json::json;
    use std::io::{Cursor, Write};

    const BLOCKS: &str = r#"[{"type":"section","text":{"type":"mrkdwn","text":"Hello"}}]"#;

    fn no_stdin() -> Cursor<&'static [u8]> {
        Cursor::new(&b""[..])
    }

    fn compose_(text: &str, opts: &ComposeOptions) -> Result<OutgoingMessage, Error> {
        compose(text, opts, &mut no_stdin())
    }

    fn blocks_json(msg: &OutgoingMessage) -> serde_json::Value {
        serde_json::to_value(msg.blocks.as_ref().unwrap()).unwrap()
    }

    #[test]
    fn test_unescape_shell_chars() {
        for (input, expected) in [
            ("Hello World", "Hello World"),
            (r"Hello\! World\!", "Hello! World!"),
            (r"Test\!\!\!", "Test!!!"),
            (
                r"Hello\! This is a *bold* message\!",
                "Hello! This is a *bold* message!",
            ),
            ("", ""),
            (r"Hello\nWorld", r"Hello\nWorld"),
            (r"Hello\\nWorld", r"Hello\\nWorld"),
            (r"Hello\", r"Hello\"),
            (r"C:\Users\me", r"C:\Users\me"),
        ] {
            assert_eq!(unescape_shell_chars(input), expected, "input: {:?}", input);
        }
    }

    quickcheck! {
        fn test_unescape_without_backslash_is_identity(s: String) -> bool {
            s.contains('\\') || unescape_shell_chars(&s) == s
        }

        fn test_unescape_without_bang_is_identity(s: String) -> bool {
            s.contains('!') || unescape_shell_chars(&s) == s
        }

        fn test_unescape_only_drops_backslashes(s: String) -> bool {
            let x = unescape_shell_chars(&s);
            s.len() - x.len() == s.matches(r"\!").count()
        }
    }

    #[test]
    fn test_read_all() {
        assert_eq!(read_all(&mut Cursor::new("one")).unwrap(), "one");
        assert_eq!(read_all(&mut Cursor::new("one\ntwo\n")).unwrap(), "one\ntwo");
        assert_eq!(read_all(&mut Cursor::new("one\r\ntwo")).unwrap(), "one\ntwo");
        assert_eq!(read_all(&mut Cursor::new("one\n\nthree")).unwrap(), "one\n\nthree");
        assert_eq!(read_all(&mut Cursor::new("")).unwrap(), "");
    }

    #[test]
    fn test_default_section_block() {
        let msg = compose_("Hello World", &ComposeOptions::default()).unwrap();

        assert_eq!(msg.text.as_deref(), Some("Hello World"));
        assert_eq!(
            blocks_json(&msg),
            json!([{ "type": "section", "text": { "type": "mrkdwn", "text": "Hello World" } }])
        );
        assert!(msg.unfurl);
        assert_eq!(msg.thread_ts, None);
    }

    #[test]
    fn test_simple() {
        let opts = ComposeOptions {
            simple: true,
            ..Default::default()
        };
        let msg = compose_("Hello World", &opts).unwrap();

        assert_eq!(msg.text.as_deref(), Some("Hello World"));
        assert_eq!(msg.blocks, None);
    }

    #[test]
    fn test_no_unfurl() {
        let opts = ComposeOptions {
            no_unfurl: true,
            ..Default::default()
        };

        assert!(!compose_("Hello", &opts).unwrap().unfurl);
    }

    #[test]
    fn test_thread_ts_normalised() {
        let opts = ComposeOptions {
            thread_ts: Some("1234567890.5".into()),
            ..Default::default()
        };

        assert_eq!(
            compose_("Reply", &opts).unwrap().thread_ts.as_deref(),
            Some("1234567890.500000")
        );
    }

    #[test]
    fn test_invalid_thread_ts() {
        let opts = ComposeOptions {
            thread_ts: Some("yesterday".into()),
            // Would also fail, but later.
            blocks_json: Some("not valid json".into()),
            ..Default::default()
        };

        let err = compose_("Reply", &opts).unwrap_err();
        assert!(err.to_string().contains("invalid timestamp"));
    }

    #[test]
    fn test_conflicting_blocks_sources() {
        let inline = || Some(BLOCKS.to_owned());
        let file = || Some(PathBuf::from("blocks.json"));

        for opts in [
            ComposeOptions {
                blocks_json: inline(),
                blocks_file: file(),
                ..Default::default()
            },
            ComposeOptions {
                blocks_json: inline(),
                blocks_stdin: true,
                ..Default::default()
            },
            ComposeOptions {
                blocks_file: file(),
                blocks_stdin: true,
                ..Default::default()
            },
            ComposeOptions {
                blocks_json: inline(),
                blocks_file: file(),
                blocks_stdin: true,
                ..Default::default()
            },
        ] {
            let err = compose_("Hello", &opts).unwrap_err();

            assert!(matches!(err, Error::ConflictingBlocksSource));
            let x = err.to_string();
            assert!(x.contains("--blocks,"));
            assert!(x.contains("--blocks-file"));
            assert!(x.contains("--blocks-stdin"));
        }
    }

    #[test]
    fn test_empty_blocks_options_are_not_sources() {
        let opts = ComposeOptions {
            blocks_json: Some(String::new()),
            blocks_file: Some(PathBuf::new()),
            ..Default::default()
        };

        assert_eq!(opts.blocks_source().unwrap(), None);
    }

    #[test]
    fn test_text_from_stdin() {
        for (input, expected) in [
            ("Hello from stdin", "Hello from stdin"),
            ("Line 1\nLine 2\nLine 3", "Line 1\nLine 2\nLine 3"),
            ("Trailing newline\n", "Trailing newline"),
            (r"Escaped\! from stdin", "Escaped! from stdin"),
        ] {
            let opts = ComposeOptions {
                simple: true,
                ..Default::default()
            };
            let msg = compose("-", &opts, &mut Cursor::new(input)).unwrap();

            assert_eq!(msg.text.as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_empty_stdin() {
        let err = compose("-", &ComposeOptions::default(), &mut Cursor::new("")).unwrap_err();
        assert!(matches!(err, Error::EmptyMessage));
    }

    #[test]
    fn test_text_and_blocks_both_from_stdin() {
        let opts = ComposeOptions {
            blocks_stdin: true,
            ..Default::default()
        };

        let err = compose("-", &opts, &mut Cursor::new(BLOCKS)).unwrap_err();

        assert!(matches!(err, Error::ConflictingStdinUsage));
        assert!(err
            .to_string()
            .contains("cannot use '-' for text and --blocks-stdin together"));
    }

    #[test]
    fn test_inline_blocks() {
        let opts = ComposeOptions {
            blocks_json: Some(BLOCKS.to_owned()),
            ..Default::default()
        };
        let msg = compose_("Hello", &opts).unwrap();

        assert_eq!(msg.text.as_deref(), Some("Hello"));
        assert_eq!(msg.blocks.as_ref().map(Blocks::len), Some(1));
    }

    #[test]
    fn test_blocks_without_text_omit_text() {
        let opts = ComposeOptions {
            blocks_json: Some(BLOCKS.to_owned()),
            ..Default::default()
        };
        let msg = compose_("", &opts).unwrap();

        assert_eq!(msg.text, None);
        assert_eq!(blocks_json(&msg), serde_json::from_str::<serde_json::Value>(BLOCKS).unwrap());
    }

    #[test]
    fn test_invalid_inline_blocks() {
        let opts = ComposeOptions {
            blocks_json: Some("not valid json".into()),
            ..Default::default()
        };

        let err = compose_("Hello", &opts).unwrap_err();
        assert!(matches!(err, Error::InvalidBlocksJSON(_)));
        assert!(err.to_string().contains("invalid blocks JSON"));
    }

    #[test]
    fn test_blocks_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(BLOCKS.as_bytes()).unwrap();

        let opts = ComposeOptions {
            blocks_file: Some(f.path().to_owned()),
            ..Default::default()
        };
        let msg = compose_("", &opts).unwrap();

        assert_eq!(msg.text, None);
        assert_eq!(msg.blocks.as_ref().map(Blocks::len), Some(1));
    }

    #[test]
    fn test_blocks_file_not_found() {
        let opts = ComposeOptions {
            blocks_file: Some("/nonexistent/blocks.json".into()),
            ..Default::default()
        };

        let err = compose_("Hello", &opts).unwrap_err();
        assert!(matches!(err, Error::BlocksFileUnreadable { .. }));
        assert!(err.to_string().contains("reading blocks file"));
    }

    #[test]
    fn test_blocks_file_invalid_json() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"{ not json").unwrap();

        let opts = ComposeOptions {
            blocks_file: Some(f.path().to_owned()),
            ..Default::default()
        };

        let err = compose_("Hello", &opts).unwrap_err();
        assert!(matches!(err, Error::InvalidBlocksJSON(_)));
    }

    #[test]
    fn test_empty_blocks_file_with_no_text() {
        let f = tempfile::NamedTempFile::new().unwrap();

        let opts = ComposeOptions {
            blocks_file: Some(f.path().to_owned()),
            ..Default::default()
        };

        assert!(matches!(compose_("", &opts), Err(Error::EmptyMessage)));
    }

    #[test]
    fn test_whitespace_blocks_are_invalid() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"  \n\t\n").unwrap();

        let inline = ComposeOptions {
            blocks_json: Some("   ".into()),
            ..Default::default()
        };
        let file = ComposeOptions {
            blocks_file: Some(f.path().to_owned()),
            ..Default::default()
        };
        let stdin = ComposeOptions {
            blocks_stdin: true,
            ..Default::default()
        };

        for opts in [inline, file] {
            let err = compose_("Hello", &opts).unwrap_err();
            assert!(matches!(err, Error::InvalidBlocksJSON(_)), "{:?}", opts);
        }

        let err = compose("Hello", &stdin, &mut Cursor::new(" \t ")).unwrap_err();
        assert!(matches!(err, Error::InvalidBlocksJSON(_)));
    }

    #[test]
    fn test_empty_blocks_stdin_is_absent() {
        let opts = ComposeOptions {
            blocks_stdin: true,
            ..Default::default()
        };

        let msg = compose("Hello", &opts, &mut Cursor::new("")).unwrap();
        assert_eq!(msg.blocks.as_ref().map(Blocks::len), Some(1));
        assert!(matches!(
            compose("", &opts, &mut Cursor::new("")),
            Err(Error::EmptyMessage)
        ));
    }

    #[test]
    fn test_blocks_stdin() {
        let opts = ComposeOptions {
            blocks_stdin: true,
            ..Default::default()
        };

        let msg = compose("Fallback", &opts, &mut Cursor::new(BLOCKS)).unwrap();
        assert_eq!(msg.text.as_deref(), Some("Fallback"));
        assert_eq!(msg.blocks.as_ref().map(Blocks::len), Some(1));

        let err = compose("", &opts, &mut Cursor::new("nope")).unwrap_err();
        assert!(matches!(err, Error::InvalidBlocksJSON(_)));
    }

    #[test]
    fn test_empty_blocks_array() {
        let opts = ComposeOptions {
            blocks_json: Some("[]".into()),
            ..Default::default()
        };

        assert!(matches!(compose_("", &opts), Err(Error::EmptyMessage)));

        // Explicitly empty blocks don't trigger the default block either.
        let msg = compose_("Hello", &opts).unwrap();
        assert_eq!(msg.text.as_deref(), Some("Hello"));
        assert_eq!(msg.blocks, None);
    }

    #[test]
    fn test_empty_message() {
        let err = compose_("", &ComposeOptions::default()).unwrap_err();

        assert!(matches!(err, Error::EmptyMessage));
        assert!(err.to_string().contains("message text cannot be empty"));
    }

    #[test]
    fn test_files_alone() {
        let opts = ComposeOptions {
            files: vec!["report.pdf".into()],
            ..Default::default()
        };
        let msg = compose_("", &opts).unwrap();

        assert_eq!(msg.text, None);
        assert_eq!(msg.blocks, None);
    }

    #[test]
    fn test_files_skip_default_block() {
        let opts = ComposeOptions {
            files: vec!["report.pdf".into()],
            ..Default::default()
        };
        let msg = compose_("Here's the report", &opts).unwrap();

        assert_eq!(msg.text.as_deref(), Some("Here's the report"));
        assert_eq!(msg.blocks, None);
    }
}
