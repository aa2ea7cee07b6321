/// Selected scenario index with wraparound navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioCursor {
    index: usize,
    len: usize,
}

impl ScenarioCursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn next(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
        self.index
    }

    pub fn previous(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
        self.index
    }

    /// Selects `index`, resetting to the first scenario when it is out of range.
    pub fn select(&mut self, index: usize) -> usize {
        self.index = if index < self.len { index } else { 0 };
        self.index
    }
}
