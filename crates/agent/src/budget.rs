/// Bounded count of model round-trips for one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationBudget {
    ceiling: u32,
    used: u32,
}

impl IterationBudget {
    pub const DEFAULT_CEILING: u32 = 10;

    pub fn new(ceiling: u32) -> Self {
        Self { ceiling, used: 0 }
    }

    pub fn remaining(&self) -> u32 {
        self.ceiling.saturating_sub(self.used)
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Spend one iteration. Returns `false` without spending when none are left.
    pub fn consume(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.used += 1;
        true
    }
}

impl Default for IterationBudget {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CEILING)
    }
}
