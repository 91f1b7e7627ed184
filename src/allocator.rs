use core::alloc::Layout;
use core::ptr::NonNull;

/// Storage backend for the nodes of an owning [`Redwood`](crate::Redwood).
///
/// The tree never checks for or recovers from allocation failure: an allocator
/// that cannot satisfy a request must terminate the process (for example with
/// [`alloc::alloc::handle_alloc_error`]).
///
/// # Safety
///
/// `allocate` must return memory that is valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and that stays valid
/// until it is passed back to `free` with the same layout.
pub unsafe trait NodeAllocator {
    /// `false` for allocators of intrusive trees, whose nodes belong to the
    /// caller. Such trees never free nodes on drop.
    const OWNS_NODES: bool = true;

    fn allocate(&mut self, layout: Layout) -> NonNull<u8>;

    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this allocator with the same `layout`
    /// and must not be used afterwards.
    unsafe fn free(&mut self, ptr: NonNull<u8>, layout: Layout);
}

/// Allocates nodes from the global allocator.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeapAllocator;

unsafe impl NodeAllocator for HeapAllocator {
    fn allocate(&mut self, layout: Layout) -> NonNull<u8> {
        // Nodes always hold three links, so the layout is never zero-sized.
        let ptr = unsafe { alloc::alloc::alloc(layout) };

        NonNull::new(ptr).unwrap_or_else(|| alloc::alloc::handle_alloc_error(layout))
    }

    unsafe fn free(&mut self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

/// Allocator of intrusive trees: the caller owns every node, so any call into
/// it is a bug.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopAllocator;

unsafe impl NodeAllocator for NoopAllocator {
    const OWNS_NODES: bool = false;

    fn allocate(&mut self, _layout: Layout) -> NonNull<u8> {
        panic!("intrusive tree should not use the node allocator");
    }

    unsafe fn free(&mut self, _ptr: NonNull<u8>, _layout: Layout) {
        panic!("intrusive tree should not use the node allocator");
    }
}
