use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SrcLoc {
    pub line: u32,
    pub col: u32,
}

impl SrcLoc {
    pub fn start() -> Self {
        Self { line: 1, col: 1 }
    }

    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    pub fn next_col(self) -> Self {
        Self { col: self.col + 1, ..self }
    }

    pub fn next_line(self) -> Self {
        Self { line: self.line + 1, col: 1 }
    }
}

impl Default for SrcLoc {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for SrcLoc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}, col {}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advancing() {
        let loc = SrcLoc::start().next_col().next_col();
        assert_eq!(loc, SrcLoc::new(1, 3));
        assert_eq!(loc.next_line(), SrcLoc::new(2, 1));
    }
}
