//! Indentation-tracking writer for emitted source.
//!
//! Writes into an owned `String`, so no call can fail. Output uses four-space
//! indentation and never has trailing whitespace.

#[derive(Debug, Default)]
pub struct CodeWriter {
    out: String,
    indent: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line at the current indentation.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str("    ");
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// `///` doc lines.
    pub fn doc(&mut self, text: &str) {
        for line in text.lines() {
            if line.is_empty() {
                self.line("///");
            } else {
                self.line(format!("/// {line}"));
            }
        }
    }

    /// `//!` module doc lines.
    pub fn module_doc(&mut self, text: &str) {
        for line in text.lines() {
            if line.is_empty() {
                self.line("//!");
            } else {
                self.line(format!("//! {line}"));
            }
        }
    }

    /// Run `body` one level deeper.
    pub fn indented(&mut self, body: impl FnOnce(&mut Self)) {
        self.indent += 1;
        body(self);
        self.indent -= 1;
    }

    /// `header {` … `}`.
    pub fn block(&mut self, header: impl AsRef<str>, body: impl FnOnce(&mut Self)) {
        self.block_with(header, "}", body);
    }

    /// `header {` … `close`, for closers like `};` or `})?;`.
    pub fn block_with(&mut self, header: impl AsRef<str>, close: &str, body: impl FnOnce(&mut Self)) {
        self.line(format!("{} {{", header.as_ref()));
        self.indented(body);
        self.line(close);
    }

    pub fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_blocks() {
        let mut w = CodeWriter::new();
        w.doc("A thing.\n\nMore.");
        w.block("impl Thing", |w| {
            w.block("fn go(&self)", |w| {
                w.line("let x = 1;");
                w.blank();
                w.line("x");
            });
        });
        assert_eq!(
            w.finish(),
            "/// A thing.\n///\n/// More.\nimpl Thing {\n    fn go(&self) {\n        let x = 1;\n\n        x\n    }\n}\n"
        );
    }

    #[test]
    fn test_block_with_custom_close() {
        let mut w = CodeWriter::new();
        w.block_with("static X: T = T", "};", |w| w.line("a: 1,"));
        assert_eq!(w.finish(), "static X: T = T {\n    a: 1,\n};\n");
    }
}
