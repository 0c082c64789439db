//! Integrity-protected circular fault log
//!
//! Fixed-capacity ring of [`FaultRecord`]s, each stored with a CRC-32. The
//! log is written from exception context and read from the foreground:
//!
//! - `record` never allocates, never blocks and touches one slot
//! - the running count is a single-word atomic so the foreground can read
//!   it while a fault handler is the only writer
//!
//! The struct is `#[repr(C)]` and made only of plain words so it can live in
//! a reset-persistent RAM section; [`FaultLog::adopt`] decides after a reset
//! whether that memory holds a previous log.

use portable_atomic::{AtomicU32, Ordering};

use super::context::FaultRecord;

/// Default number of records kept
pub const FAULT_LOG_CAPACITY: usize = 16;

/// Marks memory that holds an initialised log ("EGFL")
const LOG_MAGIC: u32 = 0x4547_464C;

/// A record as returned by [`FaultLog::read`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoggedFault {
    /// Checksum verified
    Intact(FaultRecord),
    /// Checksum mismatch; the stored payload is not trusted
    Corrupted { slot: usize },
}

impl LoggedFault {
    /// The record, if it passed verification
    pub fn intact(&self) -> Option<&FaultRecord> {
        match self {
            LoggedFault::Intact(record) => Some(record),
            LoggedFault::Corrupted { .. } => None,
        }
    }

    pub fn is_corrupted(&self) -> bool {
        matches!(self, LoggedFault::Corrupted { .. })
    }
}

#[derive(Debug, Clone, Copy)]
#[repr(C)]
struct StoredFault {
    record: FaultRecord,
    checksum: u32,
}

impl StoredFault {
    const EMPTY: Self = Self {
        record: FaultRecord {
            context: super::ExceptionContext {
                frame: super::StackedFrame {
                    r0: 0,
                    r1: 0,
                    r2: 0,
                    r3: 0,
                    r12: 0,
                    lr: 0,
                    pc: 0,
                    psr: 0,
                },
                status: ecuguard_hal::FaultStatus {
                    cfsr: 0,
                    hfsr: 0,
                    dfsr: 0,
                    mmfar: 0,
                    bfar: 0,
                    afsr: 0,
                },
            },
            timestamp_ms: 0,
        },
        // CRC-32 of 60 zero bytes is not zero, so an empty slot never verifies
        checksum: 0,
    };

    fn verify(&self, slot: usize) -> LoggedFault {
        if self.record.checksum() == self.checksum {
            LoggedFault::Intact(self.record)
        } else {
            LoggedFault::Corrupted { slot }
        }
    }
}

/// Circular CPU fault log with `N` slots
#[repr(C)]
pub struct FaultLog<const N: usize = FAULT_LOG_CAPACITY> {
    magic: u32,
    count: AtomicU32,
    slots: [StoredFault; N],
}

impl<const N: usize> Default for FaultLog<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FaultLog<N> {
    const CAPACITY_OK: () = assert!(N > 0, "fault log needs at least one slot");

    /// Create an empty log
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_OK;
        Self {
            magic: LOG_MAGIC,
            count: AtomicU32::new(0),
            slots: [StoredFault::EMPTY; N],
        }
    }

    /// Take ownership of a log that may have survived a reset
    ///
    /// Returns `true` when the memory already held a log, whose history is
    /// kept as is (individual records are still verified on read). Otherwise
    /// the region is reinitialised as an empty log.
    pub fn adopt(&mut self) -> bool {
        if self.magic == LOG_MAGIC {
            return true;
        }
        self.magic = LOG_MAGIC;
        self.clear();
        false
    }

    /// Append a fault record, overwriting the oldest one when full
    ///
    /// Safe to call from exception context. Returns the slot written.
    pub fn record(&mut self, record: FaultRecord) -> usize {
        let count = self.count.load(Ordering::Relaxed);
        let slot = count as usize % N;

        self.slots[slot] = StoredFault {
            record,
            checksum: record.checksum(),
        };

        self.count.store(count.wrapping_add(1), Ordering::Release);
        slot
    }

    /// Running number of records written since the last clear
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    /// Number of records currently readable
    pub fn len(&self) -> usize {
        (self.count() as usize).min(N)
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Read up to `max` of the most recent records, oldest first
    ///
    /// Every record's checksum is re-verified; a mismatch is reported as
    /// [`LoggedFault::Corrupted`] instead of returning the stored bytes.
    pub fn read(&self, max: usize) -> impl Iterator<Item = LoggedFault> + '_ {
        let count = self.count() as usize;
        let returned = count.min(N).min(max);
        let first = count - returned;

        (first..count).map(move |index| {
            let slot = index % N;
            self.slots[slot].verify(slot)
        })
    }

    /// Copy up to `out.len()` of the most recent records into `out`
    ///
    /// Returns the number of entries written.
    pub fn read_into(&self, out: &mut [LoggedFault]) -> usize {
        let max = out.len();
        let mut written = 0;
        for (dst, entry) in out.iter_mut().zip(self.read(max)) {
            *dst = entry;
            written += 1;
        }
        written
    }

    /// Logically empty the log
    ///
    /// The physical records stay in memory, but every stored checksum is
    /// replaced by the complement of the correct one so no stale entry can
    /// pass verification afterwards.
    pub fn clear(&mut self) {
        self.count.store(0, Ordering::Release);
        for stored in self.slots.iter_mut() {
            stored.checksum = !stored.record.checksum();
        }
    }
}
