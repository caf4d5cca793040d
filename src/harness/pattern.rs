//! Default data pattern for the three conventional buffer slots.
//!
//! The pattern is a pure function of (element type, slot, index): integer
//! types get fixed constants 3/4/5, byte/character types get 'a'/'b'/'c',
//! and floating types get a per-index offset on a fixed fractional base.
//! Determinism is what makes expected values reproducible after a round
//! trip through the runtime under test.

use half::f16;

/// The three conventional buffer slots of a scenario (two inputs, one
/// output/scratch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    A,
    B,
    C,
}

/// Element types that carry a default data pattern.
pub trait PatternElement:
    Copy + Default + PartialEq + std::fmt::Debug + Send + Sync + 'static
{
    fn slot_a(i: usize) -> Self;
    fn slot_b(i: usize) -> Self;
    fn slot_c(i: usize) -> Self;

    fn slot(slot: Slot, i: usize) -> Self {
        match slot {
            Slot::A => Self::slot_a(i),
            Slot::B => Self::slot_b(i),
            Slot::C => Self::slot_c(i),
        }
    }
}

macro_rules! int_pattern {
    ($($t:ty),*) => {
        $(impl PatternElement for $t {
            fn slot_a(_i: usize) -> Self { 3 }
            fn slot_b(_i: usize) -> Self { 4 }
            fn slot_c(_i: usize) -> Self { 5 }
        })*
    };
}

int_pattern!(i32, u32, i64, u64);

macro_rules! char_pattern {
    ($($t:ty),*) => {
        $(impl PatternElement for $t {
            fn slot_a(_i: usize) -> Self { b'a' as $t }
            fn slot_b(_i: usize) -> Self { b'b' as $t }
            fn slot_c(_i: usize) -> Self { b'c' as $t }
        })*
    };
}

char_pattern!(i8, u8);

impl PatternElement for f32 {
    fn slot_a(i: usize) -> Self {
        3.146 + i as f32
    }
    fn slot_b(i: usize) -> Self {
        1.618 + i as f32
    }
    fn slot_c(i: usize) -> Self {
        1.4 + i as f32
    }
}

impl PatternElement for f64 {
    fn slot_a(i: usize) -> Self {
        3.146 + i as f64
    }
    fn slot_b(i: usize) -> Self {
        1.618 + i as f64
    }
    fn slot_c(i: usize) -> Self {
        1.4 + i as f64
    }
}

impl PatternElement for f16 {
    fn slot_a(i: usize) -> Self {
        f16::from_f32(3.146 + i as f32)
    }
    fn slot_b(i: usize) -> Self {
        f16::from_f32(1.618 + i as f32)
    }
    fn slot_c(i: usize) -> Self {
        f16::from_f32(1.4 + i as f32)
    }
}

/// Fill a buffer with the default pattern for `slot`.
pub fn fill_pattern<T: PatternElement>(buf: &mut [T], slot: Slot) {
    for (i, v) in buf.iter_mut().enumerate() {
        *v = T::slot(slot, i);
    }
}
