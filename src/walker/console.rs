use std::io::{BufRead, Write};
use super::ExecError;

/// The program's view of standard input and output. Tests hand it in-memory buffers.
pub struct Console<'a> {
    input: &'a mut dyn BufRead,
    output: &'a mut dyn Write,
}

impl<'a> Console<'a> {
    pub fn new(input: &'a mut dyn BufRead, output: &'a mut dyn Write) -> Self {
        Self { input, output }
    }

    pub fn print(&mut self, text: &[u8], newline: bool) -> Result<(), ExecError> {
        self.output.write_all(text)?;
        if newline {
            self.output.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ExecError> {
        Ok(self.output.flush()?)
    }

    fn peek_byte(&mut self) -> Result<Option<u8>, ExecError> {
        Ok(self.input.fill_buf()?.first().copied())
    }

    fn skip_whitespace(&mut self) -> Result<(), ExecError> {
        while let Some(b) = self.peek_byte()? {
            if !b.is_ascii_whitespace() {
                break;
            }
            self.input.consume(1);
        }
        Ok(())
    }

    /// Read the next whitespace-delimited word.
    pub fn read_word(&mut self) -> Result<Vec<u8>, ExecError> {
        // Prompts written with `print` must be visible before we block.
        self.flush()?;
        self.skip_whitespace()?;
        let mut word = Vec::new();
        while let Some(b) = self.peek_byte()? {
            if b.is_ascii_whitespace() {
                break;
            }
            word.push(b);
            self.input.consume(1);
        }
        if word.is_empty() {
            Err(ExecError::InputExhausted)
        } else {
            Ok(word)
        }
    }

    /// Read the next non-whitespace byte.
    pub fn read_char(&mut self) -> Result<u8, ExecError> {
        self.flush()?;
        self.skip_whitespace()?;
        let b = self.peek_byte()?.ok_or(ExecError::InputExhausted)?;
        self.input.consume(1);
        Ok(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_and_chars() {
        let mut input = &b"  12 abc\n\tx"[..];
        let mut output = Vec::new();
        let mut console = Console::new(&mut input, &mut output);
        assert_eq!(console.read_word().unwrap(), b"12");
        assert_eq!(console.read_char().unwrap(), b'a');
        assert_eq!(console.read_word().unwrap(), b"bc");
        assert_eq!(console.read_word().unwrap(), b"x");
        assert!(matches!(console.read_word(), Err(ExecError::InputExhausted)));
        assert!(matches!(console.read_char(), Err(ExecError::InputExhausted)));
    }

    #[test]
    fn printing() {
        let mut input = &b""[..];
        let mut output = Vec::new();
        let mut console = Console::new(&mut input, &mut output);
        console.print(b"a", false).unwrap();
        console.print(b"b", true).unwrap();
        assert_eq!(output, b"ab\n");
    }
}
