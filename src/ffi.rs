//! C ABI for shells that are not written in Rust.
//!
//! The shell owns exactly one drawing target at a time, so the engine tracks
//! the current surface itself and the shell only passes dimensions. A handle
//! may be used from several threads at once (e.g. draws from a render thread,
//! surface events from the UI thread); every call goes through the engine's
//! lock.

use crate::engine::SurfacingEngine;
use crate::surface::{SurfaceHandle, SurfaceSize};

#[repr(C)]
pub struct SurfacingEngineHandle(*mut SurfacingEngine);

/// Runs `f` against the engine behind `handle`, or returns `default` for a null handle.
fn with_engine<T>(handle: &SurfacingEngineHandle, default: T, f: impl FnOnce(&SurfacingEngine) -> T) -> T {
    if handle.0.is_null() {
        return default;
    }
    // SAFETY: non-null handles come from `surfacing_engine_new` and stay valid
    // until `surfacing_engine_free`. Only shared references are created here;
    // `SurfacingEngine` is `Sync` and keeps all mutable state behind its mutex.
    let engine = unsafe { &*handle.0 };
    f(engine)
}

#[no_mangle]
pub extern "C" fn surfacing_engine_new() -> SurfacingEngineHandle {
    SurfacingEngineHandle(Box::into_raw(Box::new(SurfacingEngine::new(None))))
}

#[no_mangle]
pub extern "C" fn surfacing_backend_count(handle: SurfacingEngineHandle) -> u32 {
    with_engine(&handle, 0, |e| e.descriptors().len() as u32)
}

#[no_mangle]
pub extern "C" fn surfacing_surface_available(handle: SurfacingEngineHandle, width: u32, height: u32) {
    with_engine(&handle, (), |e| e.on_surface_available(SurfaceHandle::new(SurfaceSize::new(width, height))))
}

#[no_mangle]
pub extern "C" fn surfacing_surface_resized(handle: SurfacingEngineHandle, width: u32, height: u32) {
    with_engine(&handle, (), |e| {
        e.resize_current_surface(width, height);
    })
}

#[no_mangle]
pub extern "C" fn surfacing_surface_destroyed(handle: SurfacingEngineHandle) -> bool {
    with_engine(&handle, true, SurfacingEngine::destroy_current_surface)
}

#[no_mangle]
pub extern "C" fn surfacing_select(handle: SurfacingEngineHandle, index: u32) {
    with_engine(&handle, (), |e| e.on_selection_changed(index as usize))
}

/// Returns `true` when a frame was drawn.
#[no_mangle]
pub extern "C" fn surfacing_draw(handle: SurfacingEngineHandle) -> bool {
    with_engine(&handle, false, |e| e.on_draw_requested().is_drawn())
}

#[no_mangle]
pub extern "C" fn surfacing_engine_free(handle: SurfacingEngineHandle) {
    if !handle.0.is_null() {
        // SAFETY: the pointer was produced by `Box::into_raw` in `surfacing_engine_new`,
        // no other call on this handle is in flight, and the shell does not use it afterwards.
        let engine = unsafe { Box::from_raw(handle.0) };
        engine.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn copy(h: &SurfacingEngineHandle) -> SurfacingEngineHandle {
        SurfacingEngineHandle(h.0)
    }

    #[test]
    fn lifecycle_through_c_abi() {
        let h = surfacing_engine_new();
        assert!(surfacing_backend_count(copy(&h)) >= 2);

        assert!(!surfacing_draw(copy(&h)));
        surfacing_select(copy(&h), 1);
        surfacing_surface_available(copy(&h), 4, 4);
        assert!(surfacing_draw(copy(&h)));
        surfacing_surface_resized(copy(&h), 2, 2);
        assert!(surfacing_draw(copy(&h)));
        assert!(surfacing_surface_destroyed(copy(&h)));
        assert!(!surfacing_draw(copy(&h)));

        surfacing_engine_free(h);
    }

    #[test]
    fn draws_and_surface_events_from_different_threads() {
        let h = surfacing_engine_new();
        surfacing_select(copy(&h), 1);
        surfacing_surface_available(copy(&h), 16, 16);

        // raw pointers are not `Send`; the address is
        let addr = h.0 as usize;
        let drawer = thread::spawn(move || {
            let h = SurfacingEngineHandle(addr as *mut SurfacingEngine);
            for _ in 0..200 {
                surfacing_draw(copy(&h));
            }
        });
        for i in 0..200u32 {
            match i % 3 {
                0 => surfacing_surface_resized(copy(&h), 8 + i % 5, 8),
                1 => assert!(surfacing_surface_destroyed(copy(&h))),
                _ => surfacing_surface_available(copy(&h), 16, 8 + i % 7),
            }
        }
        drawer.join().unwrap();

        assert!(surfacing_surface_destroyed(copy(&h)));
        assert!(!surfacing_draw(copy(&h)));
        surfacing_engine_free(h);
    }

    #[test]
    fn resize_without_surface_is_ignored() {
        let h = surfacing_engine_new();
        surfacing_select(copy(&h), 1);
        surfacing_surface_resized(copy(&h), 4, 4);
        assert!(!surfacing_draw(copy(&h)));
        surfacing_engine_free(h);
    }

    #[test]
    fn null_handle_is_harmless() {
        let null = SurfacingEngineHandle(std::ptr::null_mut());
        assert!(!surfacing_draw(SurfacingEngineHandle(std::ptr::null_mut())));
        assert!(surfacing_surface_destroyed(SurfacingEngineHandle(std::ptr::null_mut())));
        surfacing_engine_free(null);
    }
}
