//! Window geometry state
//!
//! Size constraints and the full-screen flag for one window. While the
//! window is full-screen the constraints are suspended, but the stored
//! values are never touched, so leaving full-screen restores them exactly.

use crate::domain::core::Size;

/// Minimum and maximum window size. A zero component leaves that axis
/// unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeConstraints {
    pub min: Size,
    pub max: Size,
}

impl SizeConstraints {
    pub const UNCONSTRAINED: SizeConstraints = SizeConstraints {
        min: Size::ZERO,
        max: Size::ZERO,
    };

    pub fn new(min: Size, max: Size) -> Self {
        Self { min, max }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.min.is_zero() && self.max.is_zero()
    }

    /// Clamps a requested size into the constraints, axis by axis
    pub fn clamp(&self, size: Size) -> Size {
        Size::new(
            clamp_axis(size.width, self.min.width, self.max.width),
            clamp_axis(size.height, self.min.height, self.max.height),
        )
    }
}

fn clamp_axis(value: i32, min: i32, max: i32) -> i32 {
    let value = if min > 0 { value.max(min) } else { value };
    if max > 0 { value.min(max) } else { value }
}

/// Constraint and presentation state owned by the window controller
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeometryState {
    constraints: SizeConstraints,
    full_screen: bool,
}

impl GeometryState {
    pub fn new(constraints: SizeConstraints) -> Self {
        Self {
            constraints,
            full_screen: false,
        }
    }

    /// The stored constraints, regardless of full-screen state
    pub fn constraints(&self) -> SizeConstraints {
        self.constraints
    }

    /// The constraints that should be in force at the platform right now
    pub fn effective_constraints(&self) -> SizeConstraints {
        if self.full_screen {
            SizeConstraints::UNCONSTRAINED
        } else {
            self.constraints
        }
    }

    pub fn set_min(&mut self, min: Size) {
        self.constraints.min = min;
    }

    pub fn set_max(&mut self, max: Size) {
        self.constraints.max = max;
    }

    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    /// Marks the window full-screen. Returns false if it already was.
    pub fn enter_full_screen(&mut self) -> bool {
        !std::mem::replace(&mut self.full_screen, true)
    }

    /// Clears the full-screen flag. Returns false if it was not set.
    pub fn exit_full_screen(&mut self) -> bool {
        std::mem::replace(&mut self.full_screen, false)
    }
}
