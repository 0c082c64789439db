//! Reset-persistent storage

use core::ptr::addr_of;
use core::slice;

use ecuguard_hal::PersistentStore;

/// Main SRAM left uninitialised by the runtime (`.uninit` sections)
///
/// SRAM content survives a warm reset on STM32F4, so a flush only has to
/// make sure the stores have landed before a reset is requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetainedSram;

impl PersistentStore for RetainedSram {
    fn flush(&mut self) {
        cortex_m::asm::dsb();
    }
}

extern "C" {
    static __vector_table: u32;
    static __sidata: u32;
}

/// Code and read-only data of the running image
///
/// Spans from the vector table to the load address of `.data`, as laid out
/// by the cortex-m-rt linker script.
pub fn program_image() -> &'static [u8] {
    // SAFETY: both symbols are provided by the cortex-m-rt linker script and
    // bound a contiguous region of flash that is never written at runtime
    unsafe {
        let start = addr_of!(__vector_table) as *const u8;
        let end = addr_of!(__sidata) as *const u8;
        slice::from_raw_parts(start, end as usize - start as usize)
    }
}
