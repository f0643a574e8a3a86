//! Pixel ranges and direction-aware cursor arithmetic

/// Direction of travel through a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Low index to high index
    #[default]
    Forward,
    /// High index to low index
    Reverse,
}

const DIRECTION_ID_FORWARD: u8 = 0;
const DIRECTION_ID_REVERSE: u8 = 1;

impl Direction {
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            DIRECTION_ID_FORWARD => Some(Self::Forward),
            DIRECTION_ID_REVERSE => Some(Self::Reverse),
            _ => None,
        }
    }

    pub const fn from_forward(forward: bool) -> Self {
        if forward { Self::Forward } else { Self::Reverse }
    }

    pub const fn is_forward(self) -> bool {
        matches!(self, Self::Forward)
    }

    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }
}

/// Inclusive range of pixels `start..=end`
///
/// Invariant: `start <= end`. Constructors that take untrusted input
/// clamp instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRange {
    start: u16,
    end: u16,
}

impl PixelRange {
    /// Create a range, swapping the bounds if they are inverted
    pub const fn new(start: u16, end: u16) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Clamp untrusted bounds onto a strip of `len` pixels
    ///
    /// Negative start becomes 0, an end past the strip becomes the last
    /// pixel and an end before the start collapses onto the start.
    /// Returns `None` when the start itself lies past the strip.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn clamped(start: i32, end: i32, len: u16) -> Option<Self> {
        if len == 0 {
            return None;
        }
        let last = i32::from(len) - 1;
        let start = start.max(0);
        if start > last {
            return None;
        }
        let end = end.min(last).max(start);
        Some(Self {
            start: start as u16,
            end: end as u16,
        })
    }

    pub const fn start(self) -> u16 {
        self.start
    }

    pub const fn end(self) -> u16 {
        self.end
    }

    /// Get the number of pixels in the range
    pub const fn len(self) -> u16 {
        self.end - self.start + 1
    }

    pub const fn is_empty(self) -> bool {
        false
    }

    pub const fn contains(self, index: u16) -> bool {
        index >= self.start && index <= self.end
    }

    /// Returns center of the range
    pub const fn midpoint(self) -> u16 {
        self.start + (self.end - self.start) / 2
    }

    /// Index a cursor starts from when moving in `direction`
    pub const fn initial(self, direction: Direction) -> u16 {
        match direction {
            Direction::Forward => self.start,
            Direction::Reverse => self.end,
        }
    }

    /// Bound the cursor approaches when moving in `direction`
    pub const fn terminal(self, direction: Direction) -> u16 {
        match direction {
            Direction::Forward => self.end,
            Direction::Reverse => self.start,
        }
    }

    /// Next cursor position, wrapping past the terminal bound
    pub const fn next(self, index: u16, direction: Direction) -> u16 {
        match direction {
            Direction::Forward => {
                if index >= self.end {
                    self.start
                } else {
                    index + 1
                }
            }
            Direction::Reverse => {
                if index <= self.start {
                    self.end
                } else {
                    index - 1
                }
            }
        }
    }

    /// Pixel behind the cursor, wrapping at the starting edge
    pub const fn previous(self, index: u16, direction: Direction) -> u16 {
        match direction {
            Direction::Forward => {
                if index <= self.start {
                    self.end
                } else {
                    index - 1
                }
            }
            Direction::Reverse => {
                if index >= self.end {
                    self.start
                } else {
                    index + 1
                }
            }
        }
    }

    /// Buffer indices covered by the range
    pub fn indices(self) -> core::ops::RangeInclusive<usize> {
        usize::from(self.start)..=usize::from(self.end)
    }
}
