//! Per-address crawl status over the decode range

use crate::Address;

/// Status of one byte of the decode range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Unvisited,
    /// Part of a decoded instruction
    Visited,
    /// First byte of a window that failed to decode
    DecodeError,
}

/// Status map over `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlState {
    start: Address,
    statuses: Vec<Status>,
}

impl CrawlState {
    pub fn new(start: Address, end: Address) -> Self {
        let len = end.saturating_sub(start) as usize;
        Self { start, statuses: vec![Status::Unvisited; len] }
    }

    pub fn start(&self) -> Address {
        self.start
    }

    pub fn end(&self) -> Address {
        self.start + self.statuses.len() as Address
    }

    pub fn contains(&self, address: Address) -> bool {
        self.index(address).is_some()
    }

    fn index(&self, address: Address) -> Option<usize> {
        let offset = address.checked_sub(self.start)? as usize;
        (offset < self.statuses.len()).then_some(offset)
    }

    /// Status at `address`; `None` outside the range.
    pub fn status(&self, address: Address) -> Option<Status> {
        self.index(address).map(|idx| self.statuses[idx])
    }

    pub fn is_visited(&self, address: Address) -> bool {
        self.status(address) == Some(Status::Visited)
    }

    /// True when every byte of `[address, address + size)` is in range and unvisited.
    pub fn span_is_free(&self, address: Address, size: usize) -> bool {
        let Some(first) = self.index(address) else {
            return false;
        };
        self.statuses
            .get(first..first + size)
            .is_some_and(|span| span.iter().all(|status| *status != Status::Visited))
    }

    /// Marks an instruction's bytes visited. Callers check `span_is_free` first.
    pub fn mark_visited(&mut self, address: Address, size: usize) {
        if let Some(first) = self.index(address) {
            let last = (first + size).min(self.statuses.len());
            for status in &mut self.statuses[first..last] {
                *status = Status::Visited;
            }
        }
    }

    pub fn mark_error(&mut self, address: Address) {
        if let Some(idx) = self.index(address) {
            if self.statuses[idx] == Status::Unvisited {
                self.statuses[idx] = Status::DecodeError;
            }
        }
    }

    pub fn visited_count(&self) -> usize {
        self.statuses.iter().filter(|s| **s == Status::Visited).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let state = CrawlState::new(0x100, 0x110);
        assert_eq!(state.end(), 0x110);
        assert_eq!(state.status(0xFF), None);
        assert_eq!(state.status(0x100), Some(Status::Unvisited));
        assert_eq!(state.status(0x110), None);
    }

    #[test]
    fn test_span_checks() {
        let mut state = CrawlState::new(0x100, 0x110);
        state.mark_visited(0x104, 3);
        assert!(state.is_visited(0x106));
        assert!(!state.is_visited(0x107));
        assert!(!state.span_is_free(0x102, 3));
        assert!(state.span_is_free(0x107, 4));
        // Leaves the range
        assert!(!state.span_is_free(0x10E, 3));
        assert_eq!(state.visited_count(), 3);
    }

    #[test]
    fn test_error_never_overwrites_visited() {
        let mut state = CrawlState::new(0, 4);
        state.mark_visited(0, 2);
        state.mark_error(1);
        state.mark_error(2);
        assert_eq!(state.status(1), Some(Status::Visited));
        assert_eq!(state.status(2), Some(Status::DecodeError));
        // An error byte can still be covered by an instruction decoded elsewhere
        assert!(state.span_is_free(2, 2));
    }
}
