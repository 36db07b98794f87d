//! Holds the [`Task`] and [`Priority`] types

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use core::sync::atomic::{AtomicBool, AtomicPtr, AtomicU32, Ordering};

use crate::{Stack, StackPusher, Ticks};

/// The function a task starts in. It never returns.
pub type TaskEntryFn = fn() -> !;

/// A fixed task priority. Larger numbers pre-empt smaller ones.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Priority(u8);

impl Priority {
    /// The priority of the idle task, and of nothing else
    pub const IDLE: Priority = Priority(0);

    /// Make a priority from a raw level
    pub const fn new(level: u8) -> Priority {
        Priority(level)
    }

    /// Get the raw level
    pub const fn level(self) -> u8 {
        self.0
    }

    /// Is this the idle priority?
    pub const fn is_idle(self) -> bool {
        self.0 == Self::IDLE.0
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Priority {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "P{=u8}", self.0);
    }
}

/// One task the scheduler is managing
///
/// The PendSV handler finds a task by shifting its index left by
/// [`Task::SIZE_BITS`], and keeps the saved stack pointer in the first word.
/// Hence `repr(C)` and the power-of-two alignment.
#[repr(C, align(32))]
pub struct Task {
    /// Saved stack pointer, valid while the task is switched out
    stack: AtomicPtr<u32>,
    entry_fn: TaskEntryFn,
    name: &'static str,
    priority: Priority,
    /// Set while the task is waiting in a delay
    parked: AtomicBool,
    /// The tick at which a parked task becomes ready again
    wake_at: AtomicU32,
    /// Ticks during which this task was the one running
    run_ticks: AtomicU32,
}

impl Task {
    /// log2 of the size of a [`Task`]
    pub(crate) const SIZE_BITS: u32 = {
        let size = core::mem::size_of::<Task>();
        assert!(size.is_power_of_two());
        size.trailing_zeros()
    };

    /// The smallest stack we accept
    ///
    /// Room for the seventeen words of initial task state, plus headroom.
    #[cfg(not(arm_abi = "eabihf"))]
    pub const MIN_STACK_SIZE: usize = (4 * 17) + 60;

    /// The smallest stack we accept
    ///
    /// Room for the task state including all thirty-two FPU registers and
    /// the FPU status register, plus headroom.
    #[cfg(arm_abi = "eabihf")]
    pub const MIN_STACK_SIZE: usize = (4 * 50) + 56;

    /// The value of xPSR when a task starts: just the Thumb bit
    const DEFAULT_XPSR: u32 = 1 << 24;

    /// EXC_RETURN value for 'Thread mode, Process Stack, no FPU frame'
    const EXC_RETURN_THREAD_PSP: u32 = 0xFFFF_FFFD;

    /// Create a new application [`Task`]
    ///
    /// Priority zero is reserved for the idle task.
    pub const fn new<const N: usize>(
        name: &'static str,
        priority: Priority,
        entry_fn: TaskEntryFn,
        stack: &'static Stack<N>,
    ) -> Task {
        assert!(!priority.is_idle(), "priority 0 belongs to the idle task");
        Task::build(name, priority, entry_fn, stack)
    }

    /// Create the idle task
    ///
    /// Every task list needs exactly one of these. It runs when nothing else
    /// can, calling the idle hook each time it is entered.
    pub const fn idle<const N: usize>(stack: &'static Stack<N>) -> Task {
        Task::build("IDLE", Priority::IDLE, crate::scheduler::idle_task, stack)
    }

    const fn build<const N: usize>(
        name: &'static str,
        priority: Priority,
        entry_fn: TaskEntryFn,
        stack: &'static Stack<N>,
    ) -> Task {
        assert!(N >= Self::MIN_STACK_SIZE, "task stack too small");
        Task {
            stack: AtomicPtr::new(stack.top()),
            entry_fn,
            name,
            priority,
            parked: AtomicBool::new(false),
            wake_at: AtomicU32::new(0),
            run_ticks: AtomicU32::new(0),
        }
    }

    /// Get the name this task was created with
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Get the priority this task was created with
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Get the initial entry function for this task
    pub const fn entry_fn(&self) -> TaskEntryFn {
        self.entry_fn
    }

    /// Get the current stack pointer for this task
    pub fn stack(&self) -> *mut u32 {
        self.stack.load(Ordering::Relaxed)
    }

    /// Set the current stack pointer for this task
    ///
    /// # Safety
    ///
    /// The task will execute using the stack given, so it must point to the
    /// last item in a valid Arm EABI stack, with a full task frame above it.
    pub unsafe fn set_stack(&self, new_stack: *mut u32) {
        self.stack.store(new_stack, Ordering::Relaxed)
    }

    /// Ticks this task has spent running
    pub fn run_ticks(&self) -> Ticks {
        self.run_ticks.load(Ordering::Relaxed)
    }

    /// Can this task run right now?
    pub fn is_ready(&self) -> bool {
        !self.parked.load(Ordering::Acquire)
    }

    /// Push the state the PendSV handler expects to pop when it first
    /// switches to this task
    ///
    /// # Safety
    ///
    /// Call this once, before the scheduler starts, while the stack is unused.
    pub(crate) unsafe fn prepare_frame(&self) {
        // SAFETY: `Task::build` checked the stack has room for this frame
        let mut pusher = unsafe { StackPusher::new(self.stack()) };

        // What the hardware pops on exception return: xPSR, PC, LR, R12, R3-R0
        pusher.push(Self::DEFAULT_XPSR);
        pusher.push(self.entry_fn as usize as u32);
        for _lr_r12_r3_r0 in 0..6 {
            pusher.push(0);
        }

        // What PendSV pops: the EXC_RETURN value, then R11 down to R4
        pusher.push(Self::EXC_RETURN_THREAD_PSP);
        for _r11_to_r4 in 0..8 {
            pusher.push(0);
        }

        // SAFETY: we just built a complete frame ending at this address
        unsafe {
            self.set_stack(pusher.current());
        }
    }

    /// Mark the task as waiting until tick `wake_at`
    pub(crate) fn park_until(&self, wake_at: Ticks) {
        self.wake_at.store(wake_at, Ordering::Relaxed);
        self.parked.store(true, Ordering::Release);
    }

    /// Make a parked task ready if its wake time has arrived
    ///
    /// Returns `true` if the task was woken.
    pub(crate) fn wake_if_due(&self, now: Ticks) -> bool {
        if self.is_ready() {
            return false;
        }
        let wake_at = self.wake_at.load(Ordering::Relaxed);
        // Wrap-safe 'now >= wake_at'
        if (now.wrapping_sub(wake_at) as i32) >= 0 {
            self.parked.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }

    /// Is this task still waiting?
    pub(crate) fn is_parked(&self) -> bool {
        !self.is_ready()
    }

    /// Account one tick of run time to this task
    ///
    /// Call with interrupts masked; the read-modify-write is not atomic.
    pub(crate) fn charge_tick(&self) {
        let ticks = self.run_ticks.load(Ordering::Relaxed);
        self.run_ticks.store(ticks.wrapping_add(1), Ordering::Relaxed);
    }
}

// SAFETY: all the mutable state is in atomics, and the stack memory is only
// touched by the task itself and the PendSV handler.
unsafe impl Sync for Task {}


// End of File
