//! Allocation accounting: wrapped memory is never allocated or freed by a
//! buffer, and owned planes are freed exactly once.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use refocus_image::{DataType, ImageBuffer, PixelFormat, Rotation, StoreMode};

struct Counting;

thread_local! {
    static ALLOCS: Cell<usize> = const { Cell::new(0) };
    static FREES: Cell<usize> = const { Cell::new(0) };
}

fn bump(counter: &'static std::thread::LocalKey<Cell<usize>>) {
    let _ = counter.try_with(|c| c.set(c.get() + 1));
}

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        bump(&ALLOCS);
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        bump(&FREES);
        unsafe { System.dealloc(ptr, layout) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        bump(&ALLOCS);
        unsafe { System.alloc_zeroed(layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        bump(&ALLOCS);
        bump(&FREES);
        unsafe { System.realloc(ptr, layout, new_size) }
    }
}

#[global_allocator]
static GLOBAL: Counting = Counting;

/// Allocation and free counts on this thread while running `f`.
fn counted<R>(f: impl FnOnce() -> R) -> (R, usize, usize) {
    let a0 = ALLOCS.with(Cell::get);
    let f0 = FREES.with(Cell::get);
    let r = f();
    let a1 = ALLOCS.with(Cell::get);
    let f1 = FREES.with(Cell::get);
    (r, a1 - a0, f1 - f0)
}

#[test]
fn wrapping_read_only_never_allocates_or_frees() {
    let data = vec![0x5au8; 16 * 8 * 3 / 2];
    let ((), allocs, frees) = counted(|| {
        let img = ImageBuffer::from_slice(
            16,
            8,
            &data,
            PixelFormat::Nv12,
            DataType::U8,
            Rotation::Deg90,
        )
        .unwrap();
        assert!(img.is_valid());
        assert_eq!(img.segment(1).unwrap().len(), 16 * 4);
        drop(img);
    });
    assert_eq!((allocs, frees), (0, 0));
    assert!(data.iter().all(|&b| b == 0x5a));
}

#[test]
fn wrapping_planes_never_allocates_or_frees() {
    let mut y = vec![1u8; 8 * 4];
    let mut u = vec![2u8; 4 * 2];
    let mut v = vec![3u8; 4 * 2];
    let ((), allocs, frees) = counted(|| {
        let mut img = ImageBuffer::from_planes_mut(
            8,
            4,
            [y.as_mut_slice(), u.as_mut_slice(), v.as_mut_slice()],
            PixelFormat::I420,
            DataType::U8,
            Rotation::Deg0,
        )
        .unwrap();
        img.plane_mut(2).unwrap().fill(9);
        img.set_rotation(Rotation::Deg180);
        img.set_image_wh(6, 4).unwrap();
    });
    assert_eq!((allocs, frees), (0, 0));
    assert_eq!(y, vec![1u8; 32]);
    assert_eq!(u, vec![2u8; 8]);
    assert_eq!(v, vec![9u8; 8]);
}

#[test]
fn owned_planes_freed_exactly_once() {
    for (format, store, planes) in [
        (PixelFormat::Rgba, StoreMode::All, 1),
        (PixelFormat::Nv21, StoreMode::LumaChroma, 2),
        (PixelFormat::Yv12, StoreMode::Separate, 3),
    ] {
        let (img, allocs, frees) =
            counted(|| ImageBuffer::new(32, 16, format, DataType::U8, store).unwrap());
        assert_eq!((allocs, frees), (planes, 0), "{format:?}");
        let ((), allocs, frees) = counted(|| drop(img));
        assert_eq!((allocs, frees), (0, planes), "{format:?}");
    }
}

#[test]
fn clone_of_borrowed_owns_its_copy() {
    let data = vec![7u8; 4 * 4 * 4];
    let img = ImageBuffer::from_slice(
        4,
        4,
        &data,
        PixelFormat::Bgra,
        DataType::U8,
        Rotation::Deg0,
    )
    .unwrap();

    let (copy, allocs, _) = counted(|| img.clone());
    assert_eq!(allocs, 1);
    assert!(copy.is_owned());

    let ((), allocs, frees) = counted(|| drop(img));
    assert_eq!((allocs, frees), (0, 0));
    let ((), _, frees) = counted(|| drop(copy));
    assert_eq!(frees, 1);
    assert!(data.iter().all(|&b| b == 7));
}

#[test]
fn create_on_borrowed_leaves_caller_memory() {
    let mut data = vec![3u8; 4 * 4];
    let mut img = ImageBuffer::from_slice_mut(
        4,
        4,
        &mut data,
        PixelFormat::Gray,
        DataType::U8,
        Rotation::Deg0,
    )
    .unwrap();
    let ((), allocs, frees) = counted(|| {
        img.create(4, 4, PixelFormat::Gray, DataType::U8, StoreMode::All)
            .unwrap()
    });
    assert_eq!((allocs, frees), (1, 0));
    img.plane_mut(0).unwrap().fill(0);
    drop(img);
    assert_eq!(data, vec![3u8; 16]);
}

#[test]
fn copy_to_does_not_allocate() {
    let src = ImageBuffer::new(16, 16, PixelFormat::I420, DataType::U8, StoreMode::All).unwrap();
    let mut dst =
        ImageBuffer::new(16, 16, PixelFormat::I420, DataType::U8, StoreMode::Separate).unwrap();
    let (result, allocs, frees) = counted(|| src.copy_to(&mut dst));
    result.unwrap();
    assert_eq!((allocs, frees), (0, 0));
}
