use std::collections::VecDeque;

/// Lines received from the current log stream.
///
/// Holds at most `capacity` lines; once full, each new line evicts the oldest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogBuffer {
    /// Create an empty buffer. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, line: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lines in arrival order, exactly as received.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Lines in arrival order without their line terminators, for display.
    pub fn display_lines(&self) -> impl Iterator<Item = &str> {
        self.lines().map(|line| line.trim_end_matches(['\n', '\r']))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order() {
        let mut buffer = LogBuffer::new(10);
        buffer.push("starting\n".to_string());
        buffer.push("ready\n".to_string());

        assert_eq!(buffer.lines().collect::<Vec<_>>(), ["starting\n", "ready\n"]);
        assert_eq!(buffer.display_lines().collect::<Vec<_>>(), ["starting", "ready"]);
    }

    #[test]
    fn test_evicts_oldest_when_full() {
        let mut buffer = LogBuffer::new(2);
        for line in ["a", "b", "c"] {
            buffer.push(line.to_string());
        }

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.lines().collect::<Vec<_>>(), ["b", "c"]);
    }

    #[test]
    fn test_zero_capacity_keeps_last_line() {
        let mut buffer = LogBuffer::new(0);
        buffer.push("a".to_string());
        buffer.push("b".to_string());

        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.lines().collect::<Vec<_>>(), ["b"]);
    }

    #[test]
    fn test_clear() {
        let mut buffer = LogBuffer::new(4);
        buffer.push("a".to_string());
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
