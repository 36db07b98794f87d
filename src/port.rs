//! The few places the scheduler touches the Cortex-M core directly
//!
//! On the host these become no-ops, so the scheduling logic can be unit
//! tested.

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

#[cfg(target_os = "none")]
pub(crate) use self::cortex::*;

#[cfg(not(target_os = "none"))]
pub(crate) use self::host::*;

#[cfg(target_os = "none")]
mod cortex {
    use crate::Scheduler;

    /// Ask for a task switch once all other exceptions have finished
    pub(crate) fn pend_switch() {
        cortex_m::peripheral::SCB::set_pendsv();
        // flush the pipeline so the PendSV fires before we carry on
        cortex_m::asm::isb();
    }

    /// Sleep until something interrupts us
    pub(crate) fn wait_for_interrupt() {
        cortex_m::asm::wfi();
        cortex_m::asm::isb();
    }

    /// Start the SysTick timer firing every `reload` core clock cycles
    pub(crate) fn start_systick(mut syst: cortex_m::peripheral::SYST, reload: u32) {
        syst.set_reload(reload - 1);
        syst.set_clock_source(cortex_m::peripheral::syst::SystClkSource::Core);
        syst.clear_current();
        syst.enable_counter();
        syst.enable_interrupt();
    }

    /// SysTick Handler
    #[unsafe(no_mangle)]
    extern "C" fn SysTick() {
        if let Some(scheduler) = Scheduler::get_scheduler() {
            scheduler.sched_tick();
        }
    }
}

#[cfg(not(target_os = "none"))]
mod host {
    #[cfg(test)]
    std::thread_local! {
        static PENDED: core::cell::Cell<usize> = const { core::cell::Cell::new(0) };
    }

    /// Nothing to switch on the host
    pub(crate) fn pend_switch() {
        #[cfg(test)]
        PENDED.with(|pended| pended.set(pended.get() + 1));
    }

    /// How many switches this thread has pended
    #[cfg(test)]
    pub(crate) fn pended_switches() -> usize {
        PENDED.with(|pended| pended.get())
    }

    /// Spin instead of sleeping
    pub(crate) fn wait_for_interrupt() {
        core::hint::spin_loop();
    }
}

// End of File
