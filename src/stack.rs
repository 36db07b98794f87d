//! Holds the [`Stack`] and [`StackPusher`] types

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use core::cell::UnsafeCell;

/// Memory for one task stack, `LEN` bytes long.
///
/// `LEN` must be a multiple of 8, which is checked with an assert. Stacks
/// are 8-byte aligned, as AAPCS requires at a public interface.
#[repr(align(8))]
pub struct Stack<const LEN: usize> {
    /// The memory reserved for the task stack
    contents: UnsafeCell<[u8; LEN]>,
}

impl<const LEN: usize> Stack<LEN> {
    /// The size of this stack, in bytes
    pub const SIZE: usize = LEN;

    /// Create a new, zeroed, stack
    pub const fn new() -> Self {
        assert!(LEN.is_multiple_of(8), "stack size must be a multiple of 8");
        Self {
            contents: UnsafeCell::new([0u8; LEN]),
        }
    }

    /// Get the address one past the highest word of the stack
    pub const fn top(&self) -> *mut u32 {
        // SAFETY: Pointing one past this object is allowed. This is a full
        // descending stack, so nothing is ever written at the 'top' address.
        unsafe { self.contents.get().add(1) as *mut u32 }
    }
}

// SAFETY: The stack only hands out raw pointers to itself. Only the task that
// owns it ever writes through them.
unsafe impl<const LEN: usize> Sync for Stack<LEN> {}

impl<const LEN: usize> Default for Stack<LEN> {
    fn default() -> Self {
        Stack::new()
    }
}

/// Writes words into a full-descending stack, one below the other
pub(crate) struct StackPusher(*mut u32);

impl StackPusher {
    /// Start pushing below `stack_top`
    ///
    /// # Safety
    ///
    /// There must be room below `stack_top` for every word you push, and no
    /// one else may be using that memory.
    pub(crate) unsafe fn new(stack_top: *mut u32) -> StackPusher {
        StackPusher(stack_top)
    }

    /// Move down one word and store `value` there
    pub(crate) fn push(&mut self, value: u32) {
        // SAFETY: the caller of `new` promised there is room
        unsafe {
            self.0 = self.0.sub(1);
            self.0.write_volatile(value);
        }
    }

    /// The address of the last word pushed
    pub(crate) fn current(&self) -> *mut u32 {
        self.0
    }
}


// End of File
