//! Contains the [`Scheduler`] type

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use core::sync::atomic::{AtomicPtr, AtomicU32, AtomicUsize, Ordering};

use crate::{Kernel, Task, Ticks, port};

/// The location of our one and only [`Scheduler`] object.
///
/// We need this so that the free-standing SysTick and PendSV handlers know
/// where all our system state is.
pub(crate) static SCHEDULER_PTR: AtomicPtr<Scheduler> = AtomicPtr::new(core::ptr::null_mut());

/// Represents a Task
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TaskId(usize);

impl TaskId {
    /// Represents the Task ID we produce when the scheduler isn't running
    const INVALID_ID: usize = usize::MAX;

    /// Is this the invalid Task ID?
    pub const fn is_invalid(self) -> bool {
        self.0 == Self::INVALID_ID
    }

    /// The index of this task in the task list
    pub const fn index(self) -> usize {
        self.0
    }

    /// Create an invalid Task ID
    pub(crate) const fn invalid() -> TaskId {
        TaskId(Self::INVALID_ID)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TaskId {
    fn format(&self, fmt: defmt::Formatter) {
        if self.is_invalid() {
            defmt::write!(fmt, "T---");
        } else {
            defmt::write!(fmt, "T{=usize:03}", self.0);
        }
    }
}

impl core::fmt::Display for TaskId {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_invalid() {
            write!(fmt, "T---")
        } else {
            write!(fmt, "T{:03}", self.0)
        }
    }
}

/// Application callbacks the scheduler makes
#[derive(Copy, Clone)]
pub struct Hooks {
    /// Called from the SysTick exception, once per scheduler tick
    pub tick: fn(),
    /// Called by the idle task each time it gets the CPU
    pub idle: fn(),
}

impl Hooks {
    /// No hooks at all
    pub const NONE: Hooks = Hooks {
        tick: no_hook,
        idle: no_hook,
    };
}

fn no_hook() {}

/// A pre-emptive, fixed-priority, task-switching scheduler
///
/// The highest priority task that is not delayed always runs. Tasks of equal
/// priority take turns, one tick each.
///
/// The Arm hardware will push {xPSR, PC, LR, R12, R3, R2, R1, R0} to PSP when
/// an exception occurs. PendSV pushes the rest (EXC_RETURN, then R11 to R4).
#[repr(C)]
pub struct Scheduler {
    /// Which task is currently running
    current_task: AtomicUsize,
    /// Which task should PendSV switch to next
    next_task: AtomicUsize,
    /// A fixed, static list of all our tasks
    task_list: &'static [Task],
    /// Current tick count
    ticks: AtomicU32,
    /// Application callbacks
    hooks: Hooks,
}

impl Scheduler {
    /// The offset, in bytes, to the `current_task` field
    pub(crate) const CURRENT_TASK_OFFSET: usize = core::mem::offset_of!(Scheduler, current_task);

    /// The offset, in bytes, to the `next_task` field
    pub(crate) const NEXT_TASK_OFFSET: usize = core::mem::offset_of!(Scheduler, next_task);

    /// The offset, in bytes, to the `task_list` field
    pub(crate) const TASK_LIST_OFFSET: usize = core::mem::offset_of!(Scheduler, task_list);

    /// Build the scheduler
    ///
    /// The task list must contain exactly one [`Task::idle`] task.
    pub const fn new(task_list: &'static [Task], hooks: Hooks) -> Scheduler {
        let mut idle_tasks = 0;
        let mut idx = 0;
        while idx < task_list.len() {
            if task_list[idx].priority().is_idle() {
                idle_tasks += 1;
            }
            idx += 1;
        }
        assert!(idle_tasks == 1, "task list needs exactly one idle task");
        Scheduler {
            current_task: AtomicUsize::new(usize::MAX),
            next_task: AtomicUsize::new(0),
            task_list,
            ticks: AtomicU32::new(0),
            hooks,
        }
    }

    /// Run the scheduler
    ///
    /// You may only call this once, and you should call it from `fn main()`
    /// once all your hardware is configured. We should be in Privileged
    /// Thread mode on the Main stack.
    #[cfg(target_os = "none")]
    pub fn start(&'static self, syst: cortex_m::peripheral::SYST, systicks_per_sched_tick: u32) -> ! {
        if self.current_task.load(Ordering::SeqCst) != usize::MAX {
            panic!("Tried to re-start scheduler!");
        }

        info!(
            "Scheduler @ {=usize:08x}, {=usize} tasks",
            self as *const Scheduler as usize,
            self.task_list.len()
        );

        for (task_idx, task) in self.task_list.iter().enumerate() {
            // SAFETY: no task has run yet, so every stack is unused
            unsafe {
                task.prepare_frame();
            }
            debug!(
                "Task {=usize} {=str} ({}), stack @ 0x{=usize:08x}",
                task_idx,
                task.name(),
                task.priority(),
                task.stack() as usize
            );
        }

        // Must do this before the SysTick starts, because the SysTick handler
        // uses SCHEDULER_PTR
        SCHEDULER_PTR.store(self as *const Scheduler as *mut Scheduler, Ordering::Release);

        // Only choose here. Pending PendSV now would switch away for good,
        // and SysTick would never be started.
        self.select_next_task();
        port::start_systick(syst, systicks_per_sched_tick);
        port::pend_switch();
        // impossible to get here
        unreachable!();
    }

    /// Call once per tick, from the SysTick handler
    ///
    /// Charges the tick to the running task, wakes any task whose delay has
    /// expired, calls the tick hook, then switches to whichever task should
    /// be running now.
    pub fn sched_tick(&self) {
        let now = critical_section::with(|_cs| {
            let now = self.ticks.load(Ordering::Relaxed).wrapping_add(1);
            self.ticks.store(now, Ordering::Relaxed);
            if let Some(task) = self.task_list.get(self.current_task.load(Ordering::Relaxed)) {
                task.charge_tick();
            }
            for task in self.task_list {
                if task.wake_if_due(now) {
                    trace!("- woke {=str}", task.name());
                }
            }
            now
        });
        trace!("Tick {=u32}", now);
        (self.hooks.tick)();
        self.reschedule();
    }

    /// Get current tick count
    pub fn now(&self) -> Ticks {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Suspend the running task for at least `ticks` ticks
    ///
    /// `delay(0)` just offers the CPU to another task of the same priority.
    pub fn delay(&self, ticks: Ticks) {
        let Some(task) = self.task_list.get(self.current_task.load(Ordering::Relaxed)) else {
            // the scheduler isn't running, so there is nobody to switch to
            return;
        };
        if ticks == 0 {
            self.reschedule();
            return;
        }
        critical_section::with(|_cs| {
            task.park_until(self.now().wrapping_add(ticks));
        });
        trace!("- delay {=u32} on {=str}", ticks, task.name());
        self.reschedule();
        // PendSV switches us out; if nothing else could run, doze here until
        // the tick handler wakes us
        while task.is_parked() {
            port::wait_for_interrupt();
        }
    }

    /// Get the current Task ID
    pub fn current_task_id(&self) -> TaskId {
        TaskId(self.current_task.load(Ordering::Relaxed))
    }

    /// Get the task list
    pub fn tasks(&self) -> &'static [Task] {
        self.task_list
    }

    /// Write one line per task: name, ticks spent running, share of the total
    pub fn runtime_stats(&self, out: &mut dyn core::fmt::Write) -> core::fmt::Result {
        let total = self
            .task_list
            .iter()
            .fold(0u64, |sum, task| sum + u64::from(task.run_ticks()));
        if total == 0 {
            return Ok(());
        }
        for task in self.task_list {
            let ticks = task.run_ticks();
            let percent = u64::from(ticks) * 100 / total;
            if percent > 0 {
                write!(out, "{}\t\t{}\t\t{}%\r\n", task.name(), ticks, percent)?;
            } else {
                write!(out, "{}\t\t{}\t\t<1%\r\n", task.name(), ticks)?;
            }
        }
        Ok(())
    }

    /// Get the handler to the global scheduler
    pub(crate) fn get_scheduler() -> Option<&'static Scheduler> {
        // Get our stashed pointer
        let scheduler_ptr = SCHEDULER_PTR.load(Ordering::Acquire);
        // Are we intialised?
        if scheduler_ptr.is_null() {
            None
        } else {
            // SAFETY: Only [`Scheduler::start`] writes to [`SCHEDULER_PTR`] and it
            // always sets it to be a valid pointer to a `'static` [`Scheduler`].
            Some(unsafe { &*scheduler_ptr })
        }
    }

    /// Pick the task that should run, and pend a switch if it isn't the
    /// current one
    ///
    /// Picking and committing happen in one critical section, so a tick
    /// cannot slip in between and have its choice overwritten by ours.
    fn reschedule(&self) -> TaskSelection {
        critical_section::with(|_cs| {
            let selection = self.select_next_task();
            if let TaskSelection::NewTask(_) = selection {
                port::pend_switch();
            }
            selection
        })
    }

    /// Pick the task that should run and store it in `next_task`, without
    /// pending a switch
    fn select_next_task(&self) -> TaskSelection {
        critical_section::with(|_cs| {
            let selection = self.pick_next_task();
            if let TaskSelection::NewTask(task_id) = selection {
                self.next_task.store(task_id.0, Ordering::Relaxed);
            }
            selection
        })
    }

    /// Select the highest priority ready task
    ///
    /// Among equals we start looking just after the current task, and it is
    /// only picked again if no peer is ready. That gives round-robin between
    /// tasks of the same priority.
    fn pick_next_task(&self) -> TaskSelection {
        let task_sel = critical_section::with(|_cs| {
            let num_tasks = self.task_list.len();
            let current_task = self.current_task.load(Ordering::Relaxed);
            // Before the first switch, scan from the start of the list
            let start = if current_task == usize::MAX {
                num_tasks - 1
            } else {
                current_task
            };
            let mut selected: Option<(usize, &Task)> = None;
            for offset in 1..=num_tasks {
                let idx = (start + offset) % num_tasks;
                let task = &self.task_list[idx];
                if !task.is_ready() {
                    continue;
                }
                match selected {
                    Some((_, best)) if task.priority() <= best.priority() => {}
                    _ => selected = Some((idx, task)),
                }
            }

            match selected {
                Some((idx, _)) if idx == current_task => TaskSelection::CurrentTask,
                Some((idx, _)) => TaskSelection::NewTask(TaskId(idx)),
                None => TaskSelection::NoTasks,
            }
        });

        trace!("< picked {}", task_sel);
        task_sel
    }

    /// Called by the idle task every time it gets the CPU
    fn enter_idle(&self) {
        (self.hooks.idle)();
    }

    /// Do what PendSV does to the bookkeeping, without touching any stacks
    #[cfg(test)]
    fn complete_switch(&self) {
        self.current_task
            .store(self.next_task.load(Ordering::Relaxed), Ordering::Relaxed);
    }
}

impl Kernel for Scheduler {
    fn now(&self) -> Ticks {
        Scheduler::now(self)
    }

    fn delay(&self, ticks: Ticks) {
        Scheduler::delay(self, ticks)
    }

    fn runtime_stats(&self, out: &mut dyn core::fmt::Write) -> core::fmt::Result {
        Scheduler::runtime_stats(self, out)
    }
}

/// The body of the idle task
///
/// Calls the idle hook, then sleeps until the next interrupt. Never blocks,
/// so there is always something to run.
pub(crate) fn idle_task() -> ! {
    let Some(scheduler) = Scheduler::get_scheduler() else {
        panic!("idle task running without a scheduler");
    };
    loop {
        scheduler.enter_idle();
        port::wait_for_interrupt();
    }
}

/// Describes which task we picked
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum TaskSelection {
    /// We picked a new task - do a task switch
    NewTask(TaskId),
    /// We like the current task - no switch required
    CurrentTask,
    /// There are no tasks - you should probably sleep
    NoTasks,
}


// End of File
