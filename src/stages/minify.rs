// src/stages/minify.rs

use crate::errors::StageError;
use crate::pipeline::{FileRecord, Stage};
use crate::stages::comments::strip_block_comments;

const STAGE_CSS: &str = "minify-css";
const STAGE_JS: &str = "minify-js";

/// Whitespace/comment collapse for CSS.
pub struct MinifyCss;

impl Stage for MinifyCss {
    fn name(&self) -> &'static str {
        STAGE_CSS
    }

    fn apply(&self, mut record: FileRecord) -> Result<Vec<FileRecord>, StageError> {
        let text = record
            .text()
            .map_err(|_| StageError::new(STAGE_CSS, &record.source, "file is not valid UTF-8"))?;

        record.set_text(squeeze_css(&strip_block_comments(text)));
        Ok(vec![record])
    }
}

/// Whitespace/comment collapse for JS.
///
/// Before touching the contents, the input is scanned for unbalanced
/// delimiters outside string literals; malformed files fail here instead
/// of producing a mangled artifact, so a syntax error surfaces as a stage
/// failure and no `.min` output is written for that file.
pub struct MinifyJs;

impl Stage for MinifyJs {
    fn name(&self) -> &'static str {
        STAGE_JS
    }

    fn apply(&self, mut record: FileRecord) -> Result<Vec<FileRecord>, StageError> {
        let text = record
            .text()
            .map_err(|_| StageError::new(STAGE_JS, &record.source, "file is not valid UTF-8"))?;

        check_syntax(text).map_err(|msg| StageError::new(STAGE_JS, &record.source, msg))?;
        record.set_text(squeeze_js(text));
        Ok(vec![record])
    }
}

fn is_css_punct(ch: char) -> bool {
    matches!(ch, '{' | '}' | ':' | ';' | ',' | '>')
}

fn squeeze_css(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_ws = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_ws = true;
            continue;
        }
        if pending_ws {
            if let Some(last) = out.chars().last() {
                if !is_css_punct(last) && !is_css_punct(ch) {
                    out.push(' ');
                }
            }
            pending_ws = false;
        }
        if ch == '}' && out.ends_with(';') {
            out.pop();
        }
        out.push(ch);
    }

    out
}

#[derive(Clone, Copy, PartialEq)]
enum Lex {
    Code,
    Str(char),
    LineComment,
    BlockComment,
}

/// Check delimiter balance outside strings and comments.
fn check_syntax(text: &str) -> Result<(), String> {
    let chars: Vec<char> = text.chars().collect();
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut state = Lex::Code;
    let mut escaped = false;
    let mut line = 1usize;

    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '\n' {
            line += 1;
        }

        match state {
            Lex::LineComment => {
                if ch == '\n' {
                    state = Lex::Code;
                }
            }
            Lex::BlockComment => {
                if ch == '*' && chars.get(i + 1) == Some(&'/') {
                    state = Lex::Code;
                    i += 1;
                }
            }
            Lex::Str(quote) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == quote {
                    state = Lex::Code;
                }
            }
            Lex::Code => match ch {
                '/' if chars.get(i + 1) == Some(&'/') => state = Lex::LineComment,
                '/' if chars.get(i + 1) == Some(&'*') => {
                    state = Lex::BlockComment;
                    i += 1;
                }
                '"' | '\'' | '`' => state = Lex::Str(ch),
                '(' | '[' | '{' => stack.push((ch, line)),
                ')' | ']' | '}' => {
                    let expected = match ch {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    match stack.pop() {
                        Some((open, _)) if open == expected => {}
                        _ => return Err(format!("unexpected '{ch}' on line {line}")),
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }

    if let Lex::Str(quote) = state {
        return Err(format!("unterminated {quote} string"));
    }
    if let Some((open, line)) = stack.pop() {
        return Err(format!("unclosed '{open}' opened on line {line}"));
    }
    Ok(())
}

fn is_ident(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

/// Collapse whitespace and drop comments, leaving string literals intact.
///
/// Whitespace runs containing a newline keep a single newline (automatic
/// semicolon insertion depends on them); pure spacing survives only
/// between identifier characters.
fn squeeze_js(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut state = Lex::Code;
    let mut escaped = false;
    let mut pending_space = false;
    let mut pending_newline = false;

    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];

        match state {
            Lex::LineComment => {
                if ch == '\n' {
                    state = Lex::Code;
                    pending_newline = true;
                }
            }
            Lex::BlockComment => {
                if ch == '*' && chars.get(i + 1) == Some(&'/') {
                    state = Lex::Code;
                    i += 1;
                }
            }
            Lex::Str(quote) => {
                out.push(ch);
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == quote {
                    state = Lex::Code;
                }
            }
            Lex::Code => match ch {
                '/' if chars.get(i + 1) == Some(&'/') => state = Lex::LineComment,
                '/' if chars.get(i + 1) == Some(&'*') => {
                    state = Lex::BlockComment;
                    i += 1;
                }
                '\n' => pending_newline = true,
                c if c.is_whitespace() => pending_space = true,
                _ => {
                    let last = out.chars().last();
                    if pending_newline {
                        if last.is_some() && last != Some('\n') {
                            out.push('\n');
                        }
                    } else if pending_space {
                        if let Some(last) = last {
                            if is_ident(last) && is_ident(ch) {
                                out.push(' ');
                            }
                        }
                    }
                    pending_space = false;
                    pending_newline = false;

                    if ch == '"' || ch == '\'' || ch == '`' {
                        state = Lex::Str(ch);
                    }
                    out.push(ch);
                }
            },
        }
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_collapses_around_punctuation() {
        let css = "body {\n    margin : 0 ;\n    color : red ;\n}\n";
        assert_eq!(squeeze_css(css), "body{margin:0;color:red}");
    }

    #[test]
    fn js_keeps_strings_and_drops_comments() {
        let js = "var a = \"x  //  y\"; // trailing\nuse(a);\n";
        let min = squeeze_js(js);
        assert!(min.contains("\"x  //  y\""));
        assert!(!min.contains("trailing"));
    }

    #[test]
    fn js_keyword_spacing_survives() {
        let min = squeeze_js("function  f ( ) { return   value ; }");
        assert!(min.contains("return value"));
        assert!(min.contains("function f"));
    }

    #[test]
    fn balanced_input_passes_the_check() {
        check_syntax("function f(a) { return [a, {b: 1}]; }").unwrap();
    }

    #[test]
    fn braces_inside_strings_do_not_count() {
        check_syntax("var s = \"}}}\"; var t = '((';").unwrap();
    }

    #[test]
    fn unclosed_brace_is_reported_with_its_line() {
        let err = check_syntax("function f() {\n  if (x) {\n}\n").unwrap_err();
        assert!(err.contains("unclosed '{'"));
    }

    #[test]
    fn stray_closer_is_reported() {
        let err = check_syntax("f());").unwrap_err();
        assert!(err.contains("unexpected ')'"));
    }

    #[test]
    fn malformed_js_fails_the_stage() {
        let rec = FileRecord::new("app.js", b"function f( {".to_vec());
        let err = MinifyJs.apply(rec).unwrap_err();
        assert_eq!(err.stage, "minify-js");
    }
}
