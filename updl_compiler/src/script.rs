//! Text building for generated scripts.
//!
//! Every value interpolated into a script goes through one of the helpers here:
//! strings and ids become escaped JSON string literals ([`js_str`]), ids used in identifier
//! position are reduced to `[A-Za-z0-9_]` ([`js_ident`]), bags of properties are embedded as
//! JSON ([`js_json`]) and numbers use [`js_num`].

use serde_json::Value;
use updl_project::CompileOptions;
use updl_structs::{Rgb, script_number};

use crate::CompileError;

const INDENT: &str = "    ";

pub struct ScriptWriter {
    out: String,
    depth: usize,
    comments: bool,
}

impl ScriptWriter {
    pub fn new(options: &CompileOptions) -> Self {
        Self {
            out: String::with_capacity(2048),
            depth: 0,
            comments: options.include_comments,
        }
    }

    /// No section comments; used for fragments requested outside a full compile.
    pub fn plain() -> Self {
        Self {
            out: String::with_capacity(512),
            depth: 0,
            comments: false,
        }
    }

    /// Writes each line of `text` at the current depth, keeping its relative indentation.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if text.is_empty() {
            self.out.push('\n');
            return self;
        }
        for l in text.lines() {
            if l.trim().is_empty() {
                self.out.push('\n');
                continue;
            }
            for _ in 0..self.depth {
                self.out.push_str(INDENT);
            }
            self.out.push_str(l);
            self.out.push('\n');
        }
        self
    }

    /// Single-line `//` comment. Every script line terminator in `text` becomes a space.
    pub fn comment(&mut self, text: impl AsRef<str>) -> &mut Self {
        if self.comments {
            let text = text
                .as_ref()
                .replace(['\r', '\n', '\u{2028}', '\u{2029}'], " ");
            self.line(format!("// {text}"));
        }
        self
    }

    pub fn open(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.line(text);
        self.depth += 1;
        self
    }

    pub fn close(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line(text)
    }

    pub fn finish(self) -> String {
        self.out
    }
}

pub fn js_str(s: &str) -> String {
    escape_separators(Value::String(s.to_string()).to_string())
}

pub fn js_ident(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 1);
    for c in s.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

pub fn js_json(value: &Value) -> Result<String, CompileError> {
    Ok(escape_separators(serde_json::to_string_pretty(value)?))
}

/// JSON leaves U+2028 and U+2029 raw inside strings; older script engines treat them as line
/// breaks, so they are written as escapes.
fn escape_separators(json: String) -> String {
    if !json.contains(['\u{2028}', '\u{2029}']) {
        return json;
    }
    json.replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

pub fn js_num(n: f64) -> String {
    script_number(n)
}

pub fn js_color(c: Rgb) -> String {
    format!(
        "new pc.Color({}, {}, {})",
        js_num(c.r),
        js_num(c.g),
        js_num(c.b)
    )
}
