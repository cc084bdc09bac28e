use crate::address;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Status {
    INVALID = 0,
    VALID,
}

pub trait Block: std::fmt::Debug + std::fmt::Display + Default + Sync + Send + 'static {
    /// Installs `tag` and marks the block valid.
    fn allocate(&mut self, tag: address);

    fn invalidate(&mut self);

    #[must_use]
    fn tag(&self) -> address;

    #[must_use]
    fn status(&self) -> Status;

    #[inline]
    #[must_use]
    fn is_valid(&self) -> bool {
        self.status() == Status::VALID
    }

    #[inline]
    #[must_use]
    fn is_invalid(&self) -> bool {
        self.status() == Status::INVALID
    }

    /// Whether this block currently holds `tag`.
    #[inline]
    #[must_use]
    fn holds(&self, tag: address) -> bool {
        self.is_valid() && self.tag() == tag
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Line {
    pub tag: address,
    pub valid: bool,
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Line")
            .field("tag", &self.tag)
            .field("status", &self.status())
            .finish()
    }
}

impl Line {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Block for Line {
    #[inline]
    fn allocate(&mut self, tag: address) {
        self.tag = tag;
        self.valid = true;
    }

    #[inline]
    fn invalidate(&mut self) {
        self.valid = false;
    }

    #[inline]
    fn tag(&self) -> address {
        self.tag
    }

    #[inline]
    fn status(&self) -> Status {
        if self.valid {
            Status::VALID
        } else {
            Status::INVALID
        }
    }
}
