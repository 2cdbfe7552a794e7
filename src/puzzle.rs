//! Arithmetic questions guarding obstacle tiles.

use rand::Rng;
use std::fmt;

/// Operands are drawn from this range.
const OPERAND_MIN: i32 = 1;
const OPERAND_MAX: i32 = 10;
/// Redraw while the sum exceeds this.
const MAX_SUM: i32 = 100;

/// Attempts granted per obstacle interaction.
pub const ATTEMPTS: u32 = 3;

/// A freshly generated two-operand addition question.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Question {
    pub left: i32,
    pub right: i32,
}

impl Question {
    pub fn random(rng: &mut impl Rng) -> Self {
        loop {
            let left = rng.gen_range(OPERAND_MIN..=OPERAND_MAX);
            let right = rng.gen_range(OPERAND_MIN..=OPERAND_MAX);
            if left + right <= MAX_SUM {
                return Question { left, right };
            }
        }
    }

    pub fn answer(&self) -> i32 {
        self.left + self.right
    }

    pub fn check(&self, answer: i32) -> bool {
        answer == self.answer()
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "What is {} + {}?", self.left, self.right)
    }
}
