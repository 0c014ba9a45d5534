//! Storage for the elements of string tensors.
//!
//! A string tensor can not store its elements in a flat buffer as every element has a different length. Instead the
//! encoded bytes of all elements live in a single arena, and every element is an `(offset, len)` pair into it. Both
//! the entry table and the arena are blocks obtained from the tensor's allocator.
//!
//! Overwriting an element with a string that is not longer than the previous one is done in place, otherwise the new
//! bytes are appended to the arena. When the arena is full it is replaced by a larger block holding only the bytes
//! that are still referenced, so unreferenced bytes are reclaimed on every growth.

use crate::memory::{Allocation, MemoryAllocator};
use crate::{Error, Result};

/// The smallest arena block ever requested from the allocator.
const MIN_ARENA_CAPACITY: usize = 64;

// The all-zeros pattern is the empty string at offset zero.
#[repr(C)]
#[derive(Clone, Copy, Default, Debug)]
struct Entry {
    offset: usize,
    len: usize,
}

#[derive(Debug)]
pub(crate) struct StringTable<'a> {
    len: usize,
    entries: Allocation<'a>,
    // Invariant: the bytes referenced by every entry are valid UTF-8.
    arena: Allocation<'a>,
    arena_len: usize,
    garbage: usize,
}
impl<'a> StringTable<'a> {
    /// Create a table of `len` empty strings.
    pub(crate) fn new(allocator: &'a dyn MemoryAllocator, len: usize) -> Result<Self> {
        let size = len
            .checked_mul(std::mem::size_of::<Entry>())
            .ok_or(Error::MemoryAllocationFailed { size: usize::MAX })?;
        Ok(Self {
            len,
            entries: Allocation::new_zeroed(allocator, size)?,
            arena: Allocation::new_zeroed(allocator, 0)?,
            arena_len: 0,
            garbage: 0,
        })
    }

    fn entries(&self) -> &[Entry] {
        // Safety: the block holds `len` entries, zeroed or written by `set`
        unsafe { self.entries.as_slice::<Entry>(self.len) }
    }

    fn entries_mut(&mut self) -> &mut [Entry] {
        // Safety: the block holds `len` entries, zeroed or written by `set`
        unsafe { self.entries.as_mut_slice::<Entry>(self.len) }
    }

    fn entry(&self, index: usize) -> Result<Entry> {
        self.entries()
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.len,
            })
    }

    fn bytes_of(&self, entry: Entry) -> &[u8] {
        &self.arena.as_bytes()[entry.offset..entry.offset + entry.len]
    }

    /// The UTF-8 encoded bytes of the element at `index`.
    pub(crate) fn get_bytes(&self, index: usize) -> Result<&[u8]> {
        let entry = self.entry(index)?;
        Ok(self.bytes_of(entry))
    }

    /// The element at `index`.
    pub(crate) fn get(&self, index: usize) -> Result<&str> {
        let bytes = self.get_bytes(index)?;
        // Safety: entries only reference bytes copied from a &str
        Ok(unsafe { std::str::from_utf8_unchecked(bytes) })
    }

    /// Overwrite the element at `index`, leaving all other elements untouched.
    ///
    /// On error the table is unchanged.
    pub(crate) fn set(&mut self, index: usize, text: &str) -> Result<()> {
        let entry = self.entry(index)?;
        let bytes = text.as_bytes();
        if bytes.len() <= entry.len {
            self.arena.as_bytes_mut()[entry.offset..entry.offset + bytes.len()]
                .copy_from_slice(bytes);
            self.garbage += entry.len - bytes.len();
            self.entries_mut()[index].len = bytes.len();
            return Ok(());
        }
        if self.arena.len() - self.arena_len < bytes.len() {
            self.grow(index, bytes.len())?;
        } else {
            self.garbage += entry.len;
        }
        let offset = self.arena_len;
        self.arena.as_bytes_mut()[offset..offset + bytes.len()].copy_from_slice(bytes);
        self.arena_len += bytes.len();
        self.entries_mut()[index] = Entry {
            offset,
            len: bytes.len(),
        };
        Ok(())
    }

    /// Replace the arena by a block that fits the live bytes of all elements except `skip`, plus `additional` bytes.
    fn grow(&mut self, skip: usize, additional: usize) -> Result<()> {
        let skipped = self.entry(skip)?.len;
        let needed = (self.content_len() - skipped)
            .checked_add(additional)
            .ok_or(Error::MemoryAllocationFailed { size: usize::MAX })?;
        let capacity = needed.saturating_mul(2).max(MIN_ARENA_CAPACITY);
        let mut arena = Allocation::new_zeroed(self.arena.allocator(), capacity)?;

        let mut arena_len = 0;
        for i in 0..self.len {
            let entry = self.entries()[i];
            if i == skip {
                continue;
            }
            arena.as_bytes_mut()[arena_len..arena_len + entry.len]
                .copy_from_slice(self.bytes_of(entry));
            self.entries_mut()[i].offset = arena_len;
            arena_len += entry.len;
        }
        self.entries_mut()[skip] = Entry::default();
        self.arena = arena;
        self.arena_len = arena_len;
        self.garbage = 0;
        Ok(())
    }

    /// Iterate over all elements in index order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries().iter().map(move |&entry| {
            // Safety: entries only reference bytes copied from a &str
            unsafe { std::str::from_utf8_unchecked(self.bytes_of(entry)) }
        })
    }

    /// The total number of bytes of all elements.
    pub(crate) fn content_len(&self) -> usize {
        self.arena_len - self.garbage
    }
}

#[cfg(test)]
mod tests {
    use std::alloc::Layout;
    use std::ptr::NonNull;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::memory::{AllocatorType, CpuAllocator, MemoryInfo, MemoryType};

    #[test]
    fn new_table_is_empty_strings() {
        let allocator = CpuAllocator::default();
        let table = StringTable::new(&allocator, 3).unwrap();
        assert_eq!(table.iter().count(), 3);
        for i in 0..3 {
            assert_eq!(table.get(i).unwrap(), "");
            assert!(table.get_bytes(i).unwrap().is_empty());
        }
        assert_eq!(table.content_len(), 0);
        // only the entry table is allocated
        let stats = allocator.stats();
        assert_eq!(stats.num_allocs, 1);
        assert_eq!(stats.bytes_in_use, 3 * std::mem::size_of::<Entry>());
    }

    #[test]
    fn out_of_range() {
        let allocator = CpuAllocator::default();
        let mut table = StringTable::new(&allocator, 2).unwrap();
        assert_eq!(
            table.get(2).unwrap_err(),
            Error::IndexOutOfRange { index: 2, len: 2 }
        );
        assert_eq!(
            table.set(5, "x").unwrap_err(),
            Error::IndexOutOfRange { index: 5, len: 2 }
        );
        let empty = StringTable::new(&allocator, 0).unwrap();
        assert!(empty.get_bytes(0).is_err());
    }

    #[test]
    fn overwrite_shorter_longer_and_empty() {
        let allocator = CpuAllocator::default();
        let mut table = StringTable::new(&allocator, 3).unwrap();
        table.set(0, "Hello").unwrap();
        table.set(1, "Ort").unwrap();
        table.set(2, "World").unwrap();

        table.set(1, "O").unwrap();
        assert_eq!(table.get(1).unwrap(), "O");
        table.set(1, "a much longer string").unwrap();
        assert_eq!(table.get(1).unwrap(), "a much longer string");
        table.set(0, "").unwrap();
        assert_eq!(table.get(0).unwrap(), "");

        assert_eq!(table.get(2).unwrap(), "World");
        assert_eq!(
            table.iter().collect::<Vec<_>>(),
            vec!["", "a much longer string", "World"]
        );
        assert_eq!(table.content_len(), "a much longer string".len() + 5);
    }

    #[test]
    fn multi_byte_characters() {
        let allocator = CpuAllocator::default();
        let mut table = StringTable::new(&allocator, 2).unwrap();
        table.set(0, "héllo wörld").unwrap();
        table.set(1, "日本語").unwrap();
        assert_eq!(table.get(0).unwrap(), "héllo wörld");
        assert_eq!(table.get_bytes(1).unwrap(), "日本語".as_bytes());
        assert_eq!(table.get_bytes(1).unwrap().len(), 9);
    }

    #[test]
    fn growth_reclaims_unreferenced_bytes() {
        let allocator = CpuAllocator::default();
        let mut table = StringTable::new(&allocator, 4).unwrap();
        for round in 0..200 {
            for i in 0..4 {
                let text = format!("{i}-{}", "x".repeat(round));
                table.set(i, &text).unwrap();
            }
        }
        for i in 0..4 {
            assert_eq!(table.get(i).unwrap(), format!("{i}-{}", "x".repeat(199)));
        }
        assert!(table.arena.len() <= (2 * table.content_len()).max(MIN_ARENA_CAPACITY));

        // the entry table and the current arena are the only live blocks
        let stats = allocator.stats();
        assert_eq!(stats.num_allocs - stats.num_frees, 2);
        assert_eq!(
            stats.bytes_in_use,
            4 * std::mem::size_of::<Entry>() + table.arena.len()
        );
        drop(table);
        assert_eq!(allocator.stats().bytes_in_use, 0);
    }

    /// Serves a fixed number of allocations, then fails.
    struct Limited {
        info: MemoryInfo,
        remaining: AtomicUsize,
        inner: CpuAllocator,
    }
    unsafe impl MemoryAllocator for Limited {
        fn memory_info(&self) -> &MemoryInfo {
            &self.info
        }
        fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
            self.remaining
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
                .ok()?;
            self.inner.allocate(layout)
        }
        unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
            unsafe { self.inner.deallocate(ptr, layout) }
        }
    }

    #[test]
    fn failed_growth_leaves_table_unchanged() {
        let allocator = Limited {
            info: MemoryInfo::cpu(AllocatorType::DeviceAllocator, MemoryType::Default),
            remaining: AtomicUsize::new(2),
            inner: CpuAllocator::default(),
        };
        let mut table = StringTable::new(&allocator, 2).unwrap();
        table.set(0, "Hello").unwrap();
        table.set(1, "Ort").unwrap();

        let long = "x".repeat(MIN_ARENA_CAPACITY * 4);
        assert!(matches!(
            table.set(1, &long),
            Err(Error::MemoryAllocationFailed { .. })
        ));
        assert_eq!(table.get(0).unwrap(), "Hello");
        assert_eq!(table.get(1).unwrap(), "Ort");
        // shorter writes never allocate
        table.set(1, "O").unwrap();
        assert_eq!(table.get(1).unwrap(), "O");
    }
}
