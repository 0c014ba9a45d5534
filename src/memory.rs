//! Memory allocators and memory descriptors.
//!
//! Every [`Value`](crate::value::Value) is created with a [`MemoryAllocator`] that supplies its backing storage, and
//! the allocator's [`MemoryInfo`] describes where that storage lives. The runtime environment owns a default
//! [`CpuAllocator`], available through [`CpuAllocator::default_instance`]. Other allocators can be passed to the value
//! constructors directly.

use std::alloc::Layout;
use std::borrow::Cow;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::environment::Environment;
use crate::log::error;
use crate::{Error, Result};

/// The name of the CPU device in a [`MemoryInfo`].
pub const CPU: &str = "Cpu";

/// The alignment of every block handed out for tensor data.
pub const ALIGNMENT: usize = 64;

/// The kind of memory a value resides in, from the point of view of the device.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryType {
    /// Any CPU memory used by non-CPU execution providers.
    CpuInput = -2,
    /// CPU accessible memory outputted by non-CPU execution providers.
    CpuOutput = -1,
    /// The default memory of the device.
    Default = 0,
}

/// The kind of allocator that owns a memory block.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocatorType {
    /// No valid allocator.
    Invalid = -1,
    /// An allocator that allocates directly from the device.
    DeviceAllocator = 0,
    /// An allocator that carves blocks out of larger chunks.
    ArenaAllocator = 1,
}

/// Describes where the backing storage of a value resides.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoryInfo {
    name: Cow<'static, str>,
    device_id: i32,
    memory_type: MemoryType,
    allocator_type: AllocatorType,
}
impl MemoryInfo {
    /// Create a new memory descriptor.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        allocator_type: AllocatorType,
        device_id: i32,
        memory_type: MemoryType,
    ) -> Self {
        Self {
            name: name.into(),
            device_id,
            memory_type,
            allocator_type,
        }
    }

    /// Create a descriptor of CPU memory.
    pub fn cpu(allocator_type: AllocatorType, memory_type: MemoryType) -> Self {
        Self::new(CPU, allocator_type, 0, memory_type)
    }

    /// The name of the device, [`CPU`] for host memory.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The id of the device.
    pub fn device_id(&self) -> i32 {
        self.device_id
    }

    /// The memory type.
    pub fn memory_type(&self) -> MemoryType {
        self.memory_type
    }

    /// The allocator type.
    pub fn allocator_type(&self) -> AllocatorType {
        self.allocator_type
    }
}

/// A source of memory blocks for tensor data.
///
/// # Safety
///
/// `allocate` must return either `None` or a pointer to a block that is valid for reads and writes of
/// `layout.size()` bytes and aligned to `layout.align()`, and that stays valid until it is passed to `deallocate`.
/// Implementations must be usable from multiple threads at once.
pub unsafe trait MemoryAllocator: Send + Sync {
    /// The descriptor of the memory this allocator hands out.
    fn memory_info(&self) -> &MemoryInfo;

    /// Allocate a block of memory described by `layout`.
    ///
    /// `layout.size()` is never zero. Returns `None` if the allocation failed.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Deallocate a block previously returned by [`allocate`](MemoryAllocator::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must have been allocated by this allocator with the same `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// Allocation counters of a [`CpuAllocator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocatorStats {
    /// The number of allocations performed.
    pub num_allocs: u64,
    /// The number of deallocations performed.
    pub num_frees: u64,
    /// The number of bytes currently allocated.
    pub bytes_in_use: usize,
    /// The highest value `bytes_in_use` ever reached.
    pub max_bytes_in_use: usize,
}

/// An allocator of host memory, backed by the global Rust allocator.
#[derive(Debug)]
pub struct CpuAllocator {
    info: MemoryInfo,
    num_allocs: AtomicU64,
    num_frees: AtomicU64,
    bytes_in_use: AtomicUsize,
    max_bytes_in_use: AtomicUsize,
}
impl CpuAllocator {
    /// Create a new CPU allocator reporting the given allocator type in its [`MemoryInfo`].
    pub fn new(allocator_type: AllocatorType) -> Self {
        Self {
            info: MemoryInfo::cpu(allocator_type, MemoryType::Default),
            num_allocs: AtomicU64::new(0),
            num_frees: AtomicU64::new(0),
            bytes_in_use: AtomicUsize::new(0),
            max_bytes_in_use: AtomicUsize::new(0),
        }
    }

    /// Get the process-wide default allocator.
    ///
    /// The allocator is owned by the runtime environment and lives as long as it does.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UninitializedEnvironment`] if [`Environment::init`] was not called yet.
    pub fn default_instance() -> Result<&'static CpuAllocator> {
        Ok(Environment::get()?.default_allocator())
    }

    /// Get a snapshot of the allocation counters.
    pub fn stats(&self) -> AllocatorStats {
        AllocatorStats {
            num_allocs: self.num_allocs.load(Ordering::Relaxed),
            num_frees: self.num_frees.load(Ordering::Relaxed),
            bytes_in_use: self.bytes_in_use.load(Ordering::Relaxed),
            max_bytes_in_use: self.max_bytes_in_use.load(Ordering::Relaxed),
        }
    }
}
impl Default for CpuAllocator {
    fn default() -> Self {
        Self::new(AllocatorType::DeviceAllocator)
    }
}
unsafe impl MemoryAllocator for CpuAllocator {
    fn memory_info(&self) -> &MemoryInfo {
        &self.info
    }

    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert_ne!(layout.size(), 0);
        // Safety: layout has a non zero size
        let ptr = NonNull::new(unsafe { std::alloc::alloc(layout) })?;
        self.num_allocs.fetch_add(1, Ordering::Relaxed);
        let in_use = self.bytes_in_use.fetch_add(layout.size(), Ordering::Relaxed) + layout.size();
        self.max_bytes_in_use.fetch_max(in_use, Ordering::Relaxed);
        Some(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // Safety: the caller guarantees ptr was allocated by us with this layout
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) };
        self.num_frees.fetch_add(1, Ordering::Relaxed);
        self.bytes_in_use.fetch_sub(layout.size(), Ordering::Relaxed);
    }
}

#[allow(dead_code)]
#[repr(C, align(64))]
struct Aligned([u8; ALIGNMENT]);

/// A block of zero-initialized memory obtained from a [`MemoryAllocator`].
///
/// The block is returned to its allocator when dropped. Empty blocks never reach the allocator.
pub struct Allocation<'a> {
    ptr: NonNull<u8>,
    layout: Layout,
    allocator: &'a dyn MemoryAllocator,
}
impl<'a> Allocation<'a> {
    /// Allocate `size` zeroed bytes aligned to [`ALIGNMENT`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemoryAllocationFailed`] if the size is too large or the allocator is out of memory.
    pub fn new_zeroed(allocator: &'a dyn MemoryAllocator, size: usize) -> Result<Self> {
        let layout = Layout::from_size_align(size, ALIGNMENT)
            .map_err(|_| Error::MemoryAllocationFailed { size })?;
        let ptr = if size == 0 {
            NonNull::<Aligned>::dangling().cast::<u8>()
        } else {
            let Some(ptr) = allocator.allocate(layout) else {
                error!(
                    "allocator '{}' failed to allocate {} bytes",
                    allocator.memory_info().name(),
                    size
                );
                return Err(Error::MemoryAllocationFailed { size });
            };
            // Safety: the allocator guarantees the block is valid for writes of `size` bytes
            unsafe { ptr.as_ptr().write_bytes(0, size) };
            ptr
        };
        Ok(Self {
            ptr,
            layout,
            allocator,
        })
    }

    /// The size of the block in bytes.
    pub fn len(&self) -> usize {
        self.layout.size()
    }

    /// Returns true if the block is empty.
    pub fn is_empty(&self) -> bool {
        self.layout.size() == 0
    }

    /// The allocator the block was obtained from.
    pub fn allocator(&self) -> &'a dyn MemoryAllocator {
        self.allocator
    }

    /// The contents of the block.
    pub fn as_bytes(&self) -> &[u8] {
        // Safety: the block is valid and initialized for `len` bytes
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }

    /// The contents of the block, for modification.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // Safety: the block is valid and initialized for `len` bytes, and uniquely borrowed
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }

    /// View the block as a slice of `len` elements of type `T`.
    ///
    /// # Safety
    ///
    /// The block must hold `len` valid values of `T`, and `T` must not require an alignment larger than
    /// [`ALIGNMENT`].
    pub(crate) unsafe fn as_slice<T>(&self, len: usize) -> &[T] {
        debug_assert!(len * std::mem::size_of::<T>() <= self.layout.size());
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr().cast::<T>(), len) }
    }

    /// View the block as a mutable slice of `len` elements of type `T`.
    ///
    /// # Safety
    ///
    /// Same as [`as_slice`](Allocation::as_slice).
    pub(crate) unsafe fn as_mut_slice<T>(&mut self, len: usize) -> &mut [T] {
        debug_assert!(len * std::mem::size_of::<T>() <= self.layout.size());
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr().cast::<T>(), len) }
    }
}
impl Drop for Allocation<'_> {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            // Safety: the block was allocated by this allocator with this layout and is not used anymore
            unsafe { self.allocator.deallocate(self.ptr, self.layout) };
        }
    }
}
impl std::fmt::Debug for Allocation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Allocation")
            .field("len", &self.layout.size())
            .field("memory_info", self.allocator.memory_info())
            .finish()
    }
}
// Safety: the block is exclusively owned, and the allocator is Send + Sync
unsafe impl Send for Allocation<'_> {}
// Safety: shared references only allow reads of the block
unsafe impl Sync for Allocation<'_> {}
