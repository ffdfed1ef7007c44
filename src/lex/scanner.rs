use crate::util::SrcLoc;

/// A single source byte and where it was found. `byte` is `None` past the end of input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Character {
    pub byte: Option<u8>,
    pub loc: SrcLoc,
}

impl Character {
    pub fn is(&self, b: u8) -> bool {
        self.byte == Some(b)
    }
}

pub struct Scanner<'a> {
    src: &'a [u8],
    pos: usize,
    loc: SrcLoc,
}

impl<'a> Scanner<'a> {
    pub fn new(code: &'a str) -> Self {
        Self {
            src: code.as_bytes(),
            pos: 0,
            loc: SrcLoc::start(),
        }
    }

    /// Consume the next character. Once input is exhausted this keeps returning the end marker.
    pub fn get(&mut self) -> Character {
        let c = Character {
            byte: self.src.get(self.pos).copied(),
            loc: self.loc,
        };
        if let Some(b) = c.byte {
            self.pos += 1;
            self.loc = if b == b'\n' { self.loc.next_line() } else { self.loc.next_col() };
        }
        c
    }

    /// Peek `steps` characters ahead without consuming anything. `lookahead(0)` is what `get` returns next.
    pub fn lookahead(&self, steps: usize) -> Character {
        let mut loc = self.loc;
        for &b in self.src.iter().skip(self.pos).take(steps) {
            loc = if b == b'\n' { loc.next_line() } else { loc.next_col() };
        }
        Character {
            byte: self.src.get(self.pos + steps).copied(),
            loc,
        }
    }
}
