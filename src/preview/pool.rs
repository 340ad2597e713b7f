use crate::filter::types::FilteredImage;

/// Which kind of buffer a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Input,
    Output,
}

/// Ticket for a pooled buffer.
///
/// The generation changes whenever the underlying storage is reallocated,
/// so a handle from before a reconfiguration no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle {
    kind: BufferKind,
    generation: u64,
}

impl BufferHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct Slot<T> {
    storage: Option<T>,
    generation: u64,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            storage: None,
            generation: 0,
        }
    }

    /// Reuse the current storage when `fits` accepts it, otherwise replace it.
    fn acquire(&mut self, fits: impl Fn(&T) -> bool, create: impl FnOnce() -> T) -> u64 {
        match &self.storage {
            Some(existing) if fits(existing) => {}
            _ => {
                self.storage = Some(create());
                self.generation += 1;
            }
        }
        self.generation
    }

    fn get(&self, generation: u64) -> Option<&T> {
        self.storage.as_ref().filter(|_| self.generation == generation)
    }

    fn get_mut(&mut self, generation: u64) -> Option<&mut T> {
        if self.generation != generation {
            return None;
        }
        self.storage.as_mut()
    }

    fn release(&mut self, generation: u64) {
        if self.generation == generation {
            self.storage = None;
        }
    }
}

/// Holds exactly one capture buffer and one output image for a pipeline.
///
/// Storage is only reallocated when the requested size changes; repeated
/// acquisitions at the same size hand back the same memory.
pub struct FrameBufferPool {
    input: Slot<Vec<u8>>,
    output: Slot<FilteredImage>,
}

impl FrameBufferPool {
    pub fn new() -> Self {
        Self {
            input: Slot::new(),
            output: Slot::new(),
        }
    }

    /// Acquire the raw input buffer, sized to `size` bytes.
    pub fn acquire_input_buffer(&mut self, size: usize) -> BufferHandle {
        let generation = self
            .input
            .acquire(|buf| buf.len() == size, || vec![0u8; size]);
        BufferHandle {
            kind: BufferKind::Input,
            generation,
        }
    }

    /// Acquire the RGBA output image for the given dimensions.
    pub fn acquire_output_image(&mut self, width: u32, height: u32) -> BufferHandle {
        let generation = self.output.acquire(
            |img| img.width() == width && img.height() == height,
            || FilteredImage::new(width, height),
        );
        BufferHandle {
            kind: BufferKind::Output,
            generation,
        }
    }

    /// Drop the storage behind `handle`. Idempotent; stale handles are ignored.
    pub fn release(&mut self, handle: BufferHandle) {
        match handle.kind {
            BufferKind::Input => self.input.release(handle.generation),
            BufferKind::Output => self.output.release(handle.generation),
        }
    }

    pub fn input(&self, handle: BufferHandle) -> Option<&[u8]> {
        if handle.kind != BufferKind::Input {
            return None;
        }
        self.input.get(handle.generation).map(Vec::as_slice)
    }

    pub fn output(&self, handle: BufferHandle) -> Option<&FilteredImage> {
        if handle.kind != BufferKind::Output {
            return None;
        }
        self.output.get(handle.generation)
    }

    pub fn output_mut(&mut self, handle: BufferHandle) -> Option<&mut FilteredImage> {
        if handle.kind != BufferKind::Output {
            return None;
        }
        self.output.get_mut(handle.generation)
    }

    /// Borrow the input buffer and output image together.
    pub fn split_mut(
        &mut self,
        input: BufferHandle,
        output: BufferHandle,
    ) -> Option<(&mut [u8], &mut FilteredImage)> {
        if input.kind != BufferKind::Input || output.kind != BufferKind::Output {
            return None;
        }
        let buf = self.input.get_mut(input.generation)?;
        let img = self.output.get_mut(output.generation)?;
        Some((buf.as_mut_slice(), img))
    }
}

impl Default for FrameBufferPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_size_returns_same_storage() {
        let mut pool = FrameBufferPool::new();
        let a = pool.acquire_input_buffer(24);
        let ptr_a = pool.input(a).unwrap().as_ptr();
        let b = pool.acquire_input_buffer(24);
        let ptr_b = pool.input(b).unwrap().as_ptr();
        assert_eq!(a, b);
        assert_eq!(ptr_a, ptr_b);
    }

    #[test]
    fn size_change_reallocates_and_invalidates_old_handle() {
        let mut pool = FrameBufferPool::new();
        let old = pool.acquire_output_image(4, 4);
        let new = pool.acquire_output_image(8, 4);
        assert_ne!(old, new);
        assert!(pool.output(old).is_none());
        assert_eq!(pool.output(new).unwrap().width(), 8);
    }

    #[test]
    fn release_is_idempotent() {
        let mut pool = FrameBufferPool::new();
        let h = pool.acquire_input_buffer(16);
        pool.release(h);
        pool.release(h);
        assert!(pool.input(h).is_none());
    }

    #[test]
    fn release_of_stale_handle_keeps_current_storage() {
        let mut pool = FrameBufferPool::new();
        let stale = pool.acquire_input_buffer(16);
        let current = pool.acquire_input_buffer(32);
        pool.release(stale);
        assert_eq!(pool.input(current).unwrap().len(), 32);
    }

    #[test]
    fn reacquire_after_release_allocates_fresh_generation() {
        let mut pool = FrameBufferPool::new();
        let first = pool.acquire_output_image(2, 2);
        pool.release(first);
        let second = pool.acquire_output_image(2, 2);
        assert!(second.generation() > first.generation());
        assert!(pool.output(second).is_some());
    }

    #[test]
    fn handles_do_not_cross_kinds() {
        let mut pool = FrameBufferPool::new();
        let input = pool.acquire_input_buffer(8);
        let output = pool.acquire_output_image(1, 1);
        assert!(pool.output(input).is_none());
        assert!(pool.input(output).is_none());
        assert!(pool.split_mut(output, input).is_none());
        assert!(pool.split_mut(input, output).is_some());
    }

    #[test]
    fn writes_through_split_borrow_persist() {
        let mut pool = FrameBufferPool::new();
        let input = pool.acquire_input_buffer(4);
        let output = pool.acquire_output_image(1, 1);
        {
            let (buf, img) = pool.split_mut(input, output).unwrap();
            buf.copy_from_slice(&[1, 2, 3, 4]);
            img.pixels_mut()[3] = 255;
        }
        assert_eq!(pool.input(input).unwrap(), &[1, 2, 3, 4]);
        assert_eq!(pool.output(output).unwrap().pixel(0, 0), [0, 0, 0, 255]);
    }
}
