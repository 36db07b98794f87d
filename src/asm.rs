//! The PendSV task switch for Armv7-M and Armv8-M Mainline
//!
//! One handler serves both the soft-float (EABI) and hard-float (EABIHF)
//! ABIs. The hard-float build adds the `.fpu` directive and the lazy save and
//! restore of S16-S31.

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

#[cfg(arm_abi = "eabihf")]
macro_rules! fpu_directive {
    () => {
        // Workaround https://github.com/rust-lang/rust/issues/127269
        ".fpu vfpv3\n"
    };
}

#[cfg(arm_abi = "eabihf")]
macro_rules! stack_fpu {
    () => {
        r#"
    // Bit 4 of EXC_RETURN is clear if the task used the FPU. The hardware
    // stacked S0-S15; we do S16-S31.
    tst      lr, #0x10
    it       eq
    vstmdbeq r0!, {{ s16 - s31 }}
"#
    };
}

#[cfg(arm_abi = "eabihf")]
macro_rules! unstack_fpu {
    () => {
        r#"
    tst      lr, #0x10
    it       eq
    vldmiaeq r0!, {{ s16 - s31 }}
"#
    };
}

#[cfg(arm_abi = "eabi")]
macro_rules! fpu_directive {
    () => {
        ""
    };
}

#[cfg(arm_abi = "eabi")]
macro_rules! stack_fpu {
    () => {
        ""
    };
}

#[cfg(arm_abi = "eabi")]
macro_rules! unstack_fpu {
    () => {
        ""
    };
}

/// PendSV Handler
///
/// Called by hardware once the PendSV bit is set and every other exception
/// has finished.
///
/// On entry the hardware has stacked xPSR, PC, LR, R12 and R3-R0 (and maybe
/// S0-S15) on the PSP of the interrupted task. We stack R4-R11 and the
/// EXC_RETURN value below them, save the resulting PSP into the current
/// [`Task`](crate::Task), then do the reverse for `next_task`. Returning via
/// the popped EXC_RETURN makes the hardware unstack the rest.
///
/// Naked, because the compiler must not push anything or clobber R4-R11
/// before we have saved them.
#[cfg(all(
    any(arm_abi = "eabi", arm_abi = "eabihf"),
    not(any(arm_architecture = "v6-m", arm_architecture = "v8-m.base"))
))]
#[unsafe(no_mangle)]
#[unsafe(naked)]
unsafe extern "C" fn PendSV() {
    // Only r0-r3 and r12 may be used here; they were stacked on entry.
    core::arch::naked_asm!(
        concat!(
            fpu_directive!(),
            r#"
    // r1 = &Scheduler
    ldr      r1, ={scheduler_ptr}
    ldr      r1, [r1]

    // r2 = current task index, r3 = task list base
    ldr      r2, [r1, {current_task_offset}]
    ldr      r3, [r1, {task_list_offset}]

    // index -1 means the scheduler is only just starting: nothing to save
    cmp      r2, #-1
    beq      1f

    // r2 = byte offset of the current task, r0 = its stack pointer
    lsl      r2, {task_size_bits}
    mrs      r0, psp
"#,
            stack_fpu!(),
            r#"
    stmdb    r0!, {{ r4 - r11, lr }}

    // the saved stack pointer is the first word of the Task
    str      r0, [r3, r2]

1:
    // r2 = byte offset of the next task, r0 = its saved stack pointer
    ldr      r2, [r1, {next_task_offset}]
    lsl      r2, {task_size_bits}
    ldr      r0, [r3, r2]

    ldmia    r0!, {{ r4 - r11, lr }}
"#,
            unstack_fpu!(),
            r#"
    msr      psp, r0

    // current_task = next_task
    ldr      r2, [r1, {next_task_offset}]
    str      r2, [r1, {current_task_offset}]

    bx       lr
"#
        ),
        scheduler_ptr = sym crate::scheduler::SCHEDULER_PTR,
        current_task_offset = const crate::Scheduler::CURRENT_TASK_OFFSET,
        next_task_offset = const crate::Scheduler::NEXT_TASK_OFFSET,
        task_list_offset = const crate::Scheduler::TASK_LIST_OFFSET,
        task_size_bits = const crate::Task::SIZE_BITS,
    );
}

// End of File
